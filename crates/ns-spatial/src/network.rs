//! Street network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeIdx n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_from[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All directed edge arrays (`edge_from`, `edge_to`, `edge_weights[i]`) are
//! sorted by source node and indexed by `EdgeIdx`.  Iteration over a node's
//! outgoing edges is a contiguous memory scan.
//!
//! Alongside the CSR arrays the network keeps the [`EdgeList`] it was built
//! from, in input order.  Reprojection rebuilds from that list rather than
//! from the CSR arrays so a `twoway` network is not doubled up.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(x, y)` in the network's CRS to the nearest
//! node.  Because the tree is keyed on coordinate values it cannot follow a
//! reprojection; see [`crate::project_network`].

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use ns_core::{EdgeIdx, NodeId, NodeIdx};

use crate::aggregate::{NodeVariable, Reach};
use crate::{SpatialError, SpatialResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [x, y]
    idx:   NodeIdx,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared planar distance.  Snapping in a geographic CRS therefore
    /// compares degrees, which is fine at city scale away from the poles.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── EdgeList ──────────────────────────────────────────────────────────────────

/// Edges as supplied by the caller, one entry per input row.
///
/// `weights` is column-major: `weights[i][e]` is impedance `i` of edge `e`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeList {
    pub from:    Vec<NodeId>,
    pub to:      Vec<NodeId>,
    pub weights: Vec<Vec<f64>>,
}

impl EdgeList {
    pub fn len(&self) -> usize {
        self.from.len()
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_empty()
    }
}

// ── StreetNetwork ─────────────────────────────────────────────────────────────

/// Routable street graph in CSR format plus a spatial index for node
/// snapping, attached node variables and precomputed search ranges.
///
/// Graph fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`StreetNetworkBuilder`].
pub struct StreetNetwork {
    // ── Node data (indexed by NodeIdx) ────────────────────────────────────
    /// External identifier of each node.
    pub node_ids: Vec<NodeId>,
    pub node_x:   Vec<f64>,
    pub node_y:   Vec<f64>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Directed edge data (indexed by EdgeIdx) ───────────────────────────
    /// Source node of each directed edge.  Redundant with CSR but needed to
    /// walk `prev_edge` back during route reconstruction.
    pub edge_from: Vec<NodeIdx>,
    pub edge_to:   Vec<NodeIdx>,
    /// `edge_weights[i][e]` is impedance `i` of directed edge `e`.
    pub edge_weights: Vec<Vec<f64>>,

    impedance_names: Vec<String>,
    twoway:          bool,
    input_edges:     EdgeList,
    id_to_idx:       FxHashMap<NodeId, NodeIdx>,
    spatial_idx:     RTree<NodeEntry>,

    // ── Mutable query state ───────────────────────────────────────────────
    pub(crate) variables:   FxHashMap<String, NodeVariable>,
    pub(crate) precomputed: FxHashMap<usize, Reach>,
}

impl StreetNetwork {
    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    /// Number of **directed** edges (twice the input rows for a twoway network).
    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    pub fn is_twoway(&self) -> bool {
        self.twoway
    }

    pub fn impedance_names(&self) -> &[String] {
        &self.impedance_names
    }

    /// The edges this network was built from, in input order.
    pub fn input_edges(&self) -> &EdgeList {
        &self.input_edges
    }

    /// Column position of an impedance; `None` selects the first.
    pub fn impedance_index(&self, name: Option<&str>) -> SpatialResult<usize> {
        match name {
            None => Ok(0),
            Some(n) => self
                .impedance_names
                .iter()
                .position(|s| s == n)
                .ok_or_else(|| SpatialError::UnknownImpedance(n.to_owned())),
        }
    }

    // ── Id mapping ────────────────────────────────────────────────────────

    /// Dense index of an external node id.
    pub fn idx_of(&self, id: NodeId) -> SpatialResult<NodeIdx> {
        self.id_to_idx
            .get(&id)
            .copied()
            .ok_or(SpatialError::NodeNotFound(id))
    }

    #[inline]
    pub fn id_of(&self, idx: NodeIdx) -> NodeId {
        self.node_ids[idx.index()]
    }

    /// Position of a node in the network's CRS.
    pub fn node_xy(&self, id: NodeId) -> SpatialResult<(f64, f64)> {
        let i = self.idx_of(id)?.index();
        Ok((self.node_x[i], self.node_y[i]))
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeIdx`s of all outgoing edges from `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeIdx) -> impl Iterator<Item = EdgeIdx> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeIdx(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeIdx) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// External id of the node nearest to `(x, y)`.
    ///
    /// Returns `None` only if the network has no nodes.
    pub fn nearest_node(&self, x: f64, y: f64) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[x, y])
            .map(|e| self.id_of(e.idx))
    }

    /// Snap every point to its nearest node.
    pub fn get_node_ids(&self, points: &[(f64, f64)]) -> SpatialResult<Vec<NodeId>> {
        points
            .iter()
            .map(|&(x, y)| self.nearest_node(x, y).ok_or(SpatialError::EmptyNetwork))
            .collect()
    }

    /// Up to `k` nearest nodes to `(x, y)`, sorted by ascending distance.
    pub fn k_nearest_nodes(&self, x: f64, y: f64, k: usize) -> Vec<NodeId> {
        self.spatial_idx
            .nearest_neighbor_iter(&[x, y])
            .take(k)
            .map(|e| self.id_of(e.idx))
            .collect()
    }
}

// ── StreetNetworkBuilder ──────────────────────────────────────────────────────

/// Construct a [`StreetNetwork`] incrementally, then call [`build`](Self::build).
///
/// Nodes and edges may arrive in any order; edge endpoints are resolved by
/// external id at build time.
///
/// # Example
///
/// ```
/// use ns_core::NodeId;
/// use ns_spatial::StreetNetworkBuilder;
///
/// let mut b = StreetNetworkBuilder::new(["distance"]);
/// b.add_node(NodeId(10), 0.0, 0.0);
/// b.add_node(NodeId(20), 100.0, 0.0);
/// b.add_edge(NodeId(10), NodeId(20), &[100.0]);
/// let net = b.build().unwrap();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // twoway by default
/// ```
pub struct StreetNetworkBuilder {
    impedance_names: Vec<String>,
    twoway:          bool,
    node_ids:        Vec<NodeId>,
    node_x:          Vec<f64>,
    node_y:          Vec<f64>,
    edges:           EdgeList,
    arity_error:     Option<usize>,
}

struct DirectedEdge {
    from:  NodeIdx,
    to:    NodeIdx,
    input: usize,
}

impl StreetNetworkBuilder {
    pub fn new<I, S>(impedance_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let impedance_names: Vec<String> = impedance_names.into_iter().map(Into::into).collect();
        let edges = EdgeList {
            weights: vec![Vec::new(); impedance_names.len()],
            ..EdgeList::default()
        };
        Self {
            impedance_names,
            twoway: true,
            node_ids: Vec::new(),
            node_x: Vec::new(),
            node_y: Vec::new(),
            edges,
            arity_error: None,
        }
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(mut self, nodes: usize, edges: usize) -> Self {
        self.node_ids.reserve(nodes);
        self.node_x.reserve(nodes);
        self.node_y.reserve(nodes);
        self.edges.from.reserve(edges);
        self.edges.to.reserve(edges);
        for w in &mut self.edges.weights {
            w.reserve(edges);
        }
        self
    }

    /// When `true` (the default) every edge is traversable in both directions.
    pub fn twoway(mut self, twoway: bool) -> Self {
        self.twoway = twoway;
        self
    }

    pub fn add_node(&mut self, id: NodeId, x: f64, y: f64) {
        self.node_ids.push(id);
        self.node_x.push(x);
        self.node_y.push(y);
    }

    /// Add an edge with one weight per impedance, in impedance order.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, weights: &[f64]) {
        if weights.len() != self.impedance_names.len() {
            self.arity_error.get_or_insert(weights.len());
            return;
        }
        self.edges.from.push(from);
        self.edges.to.push(to);
        for (col, &w) in self.edges.weights.iter_mut().zip(weights) {
            col.push(w);
        }
    }

    pub fn node_count(&self) -> usize { self.node_ids.len() }
    pub fn edge_count(&self) -> usize { self.edges.len() }

    /// Consume the builder and produce a [`StreetNetwork`].
    ///
    /// # Errors
    ///
    /// - [`SpatialError::NoImpedance`] if no impedance names were given.
    /// - [`SpatialError::WeightArity`] if any edge had the wrong weight count.
    /// - [`SpatialError::DuplicateNode`] if a node id was added twice.
    /// - [`SpatialError::NodeNotFound`] if an edge references a missing node.
    /// - [`SpatialError::InvalidWeight`] for negative or non-finite weights.
    pub fn build(self) -> SpatialResult<StreetNetwork> {
        if self.impedance_names.is_empty() {
            return Err(SpatialError::NoImpedance);
        }
        if let Some(got) = self.arity_error {
            return Err(SpatialError::WeightArity {
                expected: self.impedance_names.len(),
                got,
            });
        }

        let node_count = self.node_ids.len();
        let mut id_to_idx: FxHashMap<NodeId, NodeIdx> =
            FxHashMap::with_capacity_and_hasher(node_count, Default::default());
        for (i, &id) in self.node_ids.iter().enumerate() {
            if id_to_idx.insert(id, NodeIdx(i as u32)).is_some() {
                return Err(SpatialError::DuplicateNode(id));
            }
        }

        // Resolve endpoints and validate weights.
        let mut directed: Vec<DirectedEdge> =
            Vec::with_capacity(self.edges.len() * if self.twoway { 2 } else { 1 });
        for e in 0..self.edges.len() {
            let (fid, tid) = (self.edges.from[e], self.edges.to[e]);
            let from = *id_to_idx.get(&fid).ok_or(SpatialError::NodeNotFound(fid))?;
            let to   = *id_to_idx.get(&tid).ok_or(SpatialError::NodeNotFound(tid))?;
            for col in &self.edges.weights {
                let w = col[e];
                if !w.is_finite() || w < 0.0 {
                    return Err(SpatialError::InvalidWeight { from: fid, to: tid, value: w });
                }
            }
            directed.push(DirectedEdge { from, to, input: e });
            if self.twoway {
                directed.push(DirectedEdge { from: to, to: from, input: e });
            }
        }

        // Stable sort keeps input order within a node's out-edges.
        directed.sort_by_key(|e| e.from.0);

        let edge_from: Vec<NodeIdx> = directed.iter().map(|e| e.from).collect();
        let edge_to:   Vec<NodeIdx> = directed.iter().map(|e| e.to).collect();
        let edge_weights: Vec<Vec<f64>> = self
            .edges
            .weights
            .iter()
            .map(|col| directed.iter().map(|e| col[e.input]).collect())
            .collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &directed {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, directed.len());

        // Bulk-load R-tree for O(N log N) construction (faster than N inserts).
        let entries: Vec<NodeEntry> = (0..node_count)
            .map(|i| NodeEntry {
                point: [self.node_x[i], self.node_y[i]],
                idx:   NodeIdx(i as u32),
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        log::debug!(
            "built street network: {} nodes, {} input edges, {} directed edges",
            node_count,
            self.edges.len(),
            edge_to.len()
        );

        Ok(StreetNetwork {
            node_ids: self.node_ids,
            node_x: self.node_x,
            node_y: self.node_y,
            node_out_start,
            edge_from,
            edge_to,
            edge_weights,
            impedance_names: self.impedance_names,
            twoway: self.twoway,
            input_edges: self.edges,
            id_to_idx,
            spatial_idx,
            variables: FxHashMap::default(),
            precomputed: FxHashMap::default(),
        })
    }
}

/// Build a network from parallel node and edge arrays.
///
/// `weights` pairs each impedance name with one value per edge.
///
/// # Errors
///
/// - [`SpatialError::VariableLength`] if any two parallel arrays disagree
///   in length.
/// - [`SpatialError::WeightArity`] if the number of weight columns differs
///   from the number of impedance names.
/// - Anything [`StreetNetworkBuilder::build`] reports.
pub fn network_from_arrays(
    node_ids: &[NodeId],
    node_xy:  &[(f64, f64)],
    edges:    &EdgeList,
    impedance_names: &[String],
    twoway:   bool,
) -> SpatialResult<StreetNetwork> {
    if node_ids.len() != node_xy.len() {
        return Err(SpatialError::VariableLength {
            name:   "node coordinates".to_owned(),
            ids:    node_ids.len(),
            values: node_xy.len(),
        });
    }
    if edges.weights.len() != impedance_names.len() {
        return Err(SpatialError::WeightArity {
            expected: impedance_names.len(),
            got:      edges.weights.len(),
        });
    }

    if edges.to.len() != edges.from.len() {
        return Err(SpatialError::VariableLength {
            name:   "edge targets".to_owned(),
            ids:    edges.from.len(),
            values: edges.to.len(),
        });
    }
    for (name, col) in impedance_names.iter().zip(&edges.weights) {
        if col.len() != edges.len() {
            return Err(SpatialError::VariableLength {
                name:   name.clone(),
                ids:    edges.len(),
                values: col.len(),
            });
        }
    }

    let mut b = StreetNetworkBuilder::new(impedance_names.iter().cloned())
        .twoway(twoway)
        .with_capacity(node_ids.len(), edges.len());
    for (&id, &(x, y)) in node_ids.iter().zip(node_xy) {
        b.add_node(id, x, y);
    }
    let mut w = vec![0.0; impedance_names.len()];
    for e in 0..edges.len() {
        for (slot, col) in w.iter_mut().zip(&edges.weights) {
            *slot = col[e];
        }
        b.add_edge(edges.from[e], edges.to[e], &w);
    }
    b.build()
}

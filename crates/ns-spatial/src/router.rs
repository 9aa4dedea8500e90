//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! Cost-matrix computation calls routing via the [`Router`] trait, so callers
//! can swap in contraction hierarchies or a cached router without touching
//! the matrix code.  The default [`DijkstraRouter`] is a plain binary-heap
//! Dijkstra over the CSR graph.
//!
//! # Cost units
//!
//! Costs are whatever unit the selected impedance column is in (metres for
//! networks built from OSM).  Unreachable nodes cost `f64::INFINITY`.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use ns_core::{EdgeIdx, NodeId, NodeIdx};

use crate::network::StreetNetwork;
use crate::{SpatialError, SpatialResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a point-to-point query.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Nodes visited in order, source and destination included.
    pub nodes: Vec<NodeId>,
    /// Directed edges traversed in order.
    pub edges: Vec<EdgeIdx>,
    /// Total impedance along the route.
    pub cost: f64,
}

impl Route {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
pub trait Router: Send + Sync {
    /// Cheapest route from `from` to `to` under impedance column `imp`.
    fn route(
        &self,
        network: &StreetNetwork,
        from: NodeId,
        to: NodeId,
        imp: usize,
    ) -> SpatialResult<Route>;

    /// Cost from `from` to every node, indexed by `NodeIdx`.
    fn costs_from(
        &self,
        network: &StreetNetwork,
        from: NodeIdx,
        imp: usize,
    ) -> Vec<f64>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over the CSR street graph.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(
        &self,
        network: &StreetNetwork,
        from: NodeId,
        to: NodeId,
        imp: usize,
    ) -> SpatialResult<Route> {
        let src = network.idx_of(from)?;
        let dst = network.idx_of(to)?;
        dijkstra_route(network, src, dst, imp)
    }

    fn costs_from(
        &self,
        network: &StreetNetwork,
        from: NodeIdx,
        imp: usize,
    ) -> Vec<f64> {
        let mut dist = vec![f64::INFINITY; network.node_count()];
        search(network, from, imp, f64::INFINITY, |node, cost| {
            dist[node.index()] = cost;
        });
        dist
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Total order over non-negative finite costs for the heap.
#[derive(Copy, Clone, PartialEq, Debug)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Settle nodes in cost order from `source`, calling `visit(node, cost)` once
/// for every node whose final cost is `<= limit`.
pub(crate) fn search<F>(
    network: &StreetNetwork,
    source: NodeIdx,
    imp: usize,
    limit: f64,
    mut visit: F,
) where
    F: FnMut(NodeIdx, f64),
{
    let n = network.node_count();
    let weights = &network.edge_weights[imp];
    let mut dist = vec![f64::INFINITY; n];
    let mut settled = vec![false; n];

    dist[source.index()] = 0.0;

    // Reverse makes BinaryHeap (max) behave as min-heap; NodeIdx breaks ties.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeIdx)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), source)));

    while let Some(Reverse((Cost(cost), node))) = heap.pop() {
        if settled[node.index()] {
            continue;
        }
        if cost > limit {
            break;
        }
        settled[node.index()] = true;
        visit(node, cost);

        for edge in network.out_edges(node) {
            let neighbor = network.edge_to[edge.index()];
            let new_cost = cost + weights[edge.index()];
            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                heap.push(Reverse((Cost(new_cost), neighbor)));
            }
        }
    }
}

/// Every node reachable from `source` within `limit`, with its cost.
pub(crate) fn within(
    network: &StreetNetwork,
    source: NodeIdx,
    imp: usize,
    limit: f64,
) -> Vec<(NodeIdx, f64)> {
    let mut out = Vec::new();
    search(network, source, imp, limit, |node, cost| out.push((node, cost)));
    out
}

fn dijkstra_route(
    network: &StreetNetwork,
    from: NodeIdx,
    to: NodeIdx,
    imp: usize,
) -> SpatialResult<Route> {
    if from == to {
        return Ok(Route {
            nodes: vec![network.id_of(from)],
            edges: vec![],
            cost:  0.0,
        });
    }

    let n = network.node_count();
    let weights = &network.edge_weights[imp];
    let mut dist      = vec![f64::INFINITY; n];
    // prev_edge[v] = EdgeIdx that reached v; EdgeIdx::INVALID for unreached nodes.
    let mut prev_edge = vec![EdgeIdx::INVALID; n];

    dist[from.index()] = 0.0;

    let mut heap: BinaryHeap<Reverse<(Cost, NodeIdx)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), from)));

    while let Some(Reverse((Cost(cost), node))) = heap.pop() {
        if node == to {
            return Ok(reconstruct(network, &prev_edge, from, to, cost));
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in network.out_edges(node) {
            let neighbor = network.edge_to[edge.index()];
            let new_cost = cost + weights[edge.index()];

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((Cost(new_cost), neighbor)));
            }
        }
    }

    Err(SpatialError::NoRoute {
        from: network.id_of(from),
        to:   network.id_of(to),
    })
}

fn reconstruct(
    network: &StreetNetwork,
    prev_edge: &[EdgeIdx],
    from: NodeIdx,
    to: NodeIdx,
    cost: f64,
) -> Route {
    let mut edges = Vec::new();
    let mut nodes = vec![network.id_of(to)];
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        if e == EdgeIdx::INVALID {
            break;
        }
        edges.push(e);
        cur = network.edge_from[e.index()];
        nodes.push(network.id_of(cur));
    }
    edges.reverse();
    nodes.reverse();
    Route { nodes, edges, cost }
}

// ── StreetNetwork conveniences ────────────────────────────────────────────────

impl StreetNetwork {
    /// Cheapest route under the first impedance.
    pub fn shortest_path(&self, from: NodeId, to: NodeId) -> SpatialResult<Route> {
        DijkstraRouter.route(self, from, to, 0)
    }

    /// Cost of the cheapest route, `f64::INFINITY` when unreachable.
    pub fn shortest_path_length(
        &self,
        from: NodeId,
        to: NodeId,
        impedance: Option<&str>,
    ) -> SpatialResult<f64> {
        let imp = self.impedance_index(impedance)?;
        match DijkstraRouter.route(self, from, to, imp) {
            Ok(r) => Ok(r.cost),
            Err(SpatialError::NoRoute { .. }) => Ok(f64::INFINITY),
            Err(e) => Err(e),
        }
    }

    /// Pairwise costs: element `i` is the cost from `origins[i]` to
    /// `destinations[i]`.
    pub fn shortest_path_lengths(
        &self,
        origins: &[NodeId],
        destinations: &[NodeId],
        impedance: Option<&str>,
    ) -> SpatialResult<Vec<f64>> {
        if origins.len() != destinations.len() {
            return Err(SpatialError::VariableLength {
                name:   "destinations".to_owned(),
                ids:    origins.len(),
                values: destinations.len(),
            });
        }
        origins
            .iter()
            .zip(destinations)
            .map(|(&o, &d)| self.shortest_path_length(o, d, impedance))
            .collect()
    }

    /// Cost from `from` to each of `targets`, from a single search.
    pub fn one_to_many(
        &self,
        from: NodeId,
        targets: &[NodeId],
        impedance: Option<&str>,
    ) -> SpatialResult<Vec<f64>> {
        let imp = self.impedance_index(impedance)?;
        let src = self.idx_of(from)?;
        let target_idx = targets
            .iter()
            .map(|&t| self.idx_of(t))
            .collect::<SpatialResult<Vec<_>>>()?;
        let dist = DijkstraRouter.costs_from(self, src, imp);
        Ok(target_idx.iter().map(|t| dist[t.index()]).collect())
    }

    /// Nodes reachable from `from` within `distance`, with their costs, in
    /// ascending cost order.
    pub fn nodes_in_range(
        &self,
        from: NodeId,
        distance: f64,
        impedance: Option<&str>,
    ) -> SpatialResult<Vec<(NodeId, f64)>> {
        let imp = self.impedance_index(impedance)?;
        let src = self.idx_of(from)?;
        Ok(within(self, src, imp, distance)
            .into_iter()
            .map(|(n, c)| (self.id_of(n), c))
            .collect())
    }
}

//! Raw network acquisition.
//!
//! A [`NetworkSource`] answers "give me the street nodes and edges inside
//! this lon/lat box".  Coordinates in a [`RawNetwork`] are always EPSG:4326
//! degrees; turning them into a routable [`StreetNetwork`] in the caller's
//! CRS is [`RawNetwork::to_network`]'s job.
//!
//! | Source            | Availability             |
//! |-------------------|--------------------------|
//! | [`CsvSource`]     | always                   |
//! | `PbfSource`       | feature `osm`            |
//! | `OverpassSource`  | feature `overpass`       |

use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use ns_core::{BBox, NodeId, Transformer};

use crate::network::{StreetNetwork, StreetNetworkBuilder};
use crate::{SpatialError, SpatialResult};

/// Name of the single impedance column on fetched networks.
pub const DISTANCE: &str = "distance";

// ── Raw tables ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: i64,
    /// Longitude, degrees.
    pub x:  f64,
    /// Latitude, degrees.
    pub y:  f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawEdge {
    pub from:     i64,
    pub to:       i64,
    /// Length in metres.
    pub distance: f64,
}

/// Node and edge tables as fetched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawNetwork {
    pub nodes:  Vec<RawNode>,
    pub edges:  Vec<RawEdge>,
    /// When `true` each edge is traversable both ways.  When `false`, the
    /// edge table already lists both directions of every two-way street.
    pub twoway: bool,
}

impl RawNetwork {
    /// Drop every node outside the largest weakly connected component, and
    /// the edges touching them.
    ///
    /// Fragments (private driveways, mapping errors) would otherwise capture
    /// snapped points and report zero accessibility.
    pub fn retain_largest_component(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        let index: FxHashMap<i64, usize> =
            self.nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();

        let mut uf = UnionFind::new(self.nodes.len());
        for e in &self.edges {
            if let (Some(&a), Some(&b)) = (index.get(&e.from), index.get(&e.to)) {
                uf.union(a, b);
            }
        }

        let mut sizes: FxHashMap<usize, usize> = FxHashMap::default();
        for i in 0..self.nodes.len() {
            *sizes.entry(uf.find(i)).or_default() += 1;
        }
        // Ties go to the smallest root so the choice is deterministic.
        let Some(largest) = sizes
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(&root, _)| root)
        else {
            return;
        };

        let keep: FxHashSet<i64> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|&(i, _)| uf.find(i) == largest)
            .map(|(_, n)| n.id)
            .collect();

        let before = self.nodes.len();
        self.nodes.retain(|n| keep.contains(&n.id));
        self.edges.retain(|e| keep.contains(&e.from) && keep.contains(&e.to));
        log::debug!(
            "largest component keeps {} of {} nodes",
            self.nodes.len(),
            before
        );
    }

    /// Reproject node coordinates with `tf` and build a routable network
    /// with a single [`DISTANCE`] impedance.
    pub fn to_network(&self, tf: &Transformer) -> SpatialResult<StreetNetwork> {
        let mut b = StreetNetworkBuilder::new([DISTANCE])
            .twoway(self.twoway)
            .with_capacity(self.nodes.len(), self.edges.len());
        for n in &self.nodes {
            let (x, y) = tf.transform(n.x, n.y)?;
            b.add_node(NodeId(n.id), x, y);
        }
        for e in &self.edges {
            b.add_edge(NodeId(e.from), NodeId(e.to), &[e.distance]);
        }
        b.build()
    }
}

/// Minimal union-find with path halving.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect() }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

// ── Fetch parameters ──────────────────────────────────────────────────────────

/// Which street classes make up the network.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    /// Everything a pedestrian can use; one-way tags are ignored.
    #[default]
    Walk,
    /// Car-drivable roads; one-way tags are honoured unless `two_way` is set.
    Drive,
}

/// Options passed through to a [`NetworkSource`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchParams {
    pub network_type: NetworkType,
    /// Treat every street as traversable in both directions.
    pub two_way: bool,
    /// Keep only the largest connected component.
    pub remove_lcn: bool,
    /// Demote source progress messages from `info` to `debug`.
    pub quiet: bool,
    /// Request timeout for remote sources, seconds.
    pub timeout_secs: u64,
}

impl Default for FetchParams {
    fn default() -> Self {
        Self {
            network_type: NetworkType::Walk,
            two_way:      true,
            remove_lcn:   true,
            quiet:        true,
            timeout_secs: 180,
        }
    }
}

impl FetchParams {
    /// Whether the resulting network is undirected.
    pub fn is_twoway(&self) -> bool {
        self.two_way || self.network_type == NetworkType::Walk
    }
}

/// Log at `info`, or at `debug` when `quiet`.
macro_rules! chatter {
    ($params:expr, $($arg:tt)+) => {
        if $params.quiet {
            log::debug!($($arg)+);
        } else {
            log::info!($($arg)+);
        }
    };
}
pub(crate) use chatter;

// ── NetworkSource ─────────────────────────────────────────────────────────────

/// Something that can produce raw street data for a lon/lat bounding box.
pub trait NetworkSource {
    /// Short name for log messages.
    fn name(&self) -> &str;

    /// Fetch nodes and edges inside `bbox` (x = longitude, y = latitude).
    fn fetch(&self, bbox: BBox, params: &FetchParams) -> SpatialResult<RawNetwork>;
}

/// The best network source compiled into this build.
#[cfg(feature = "overpass")]
pub fn default_source() -> SpatialResult<Box<dyn NetworkSource>> {
    Ok(Box::new(crate::overpass::OverpassSource::default()))
}

/// The best network source compiled into this build.
///
/// # Errors
///
/// Always [`SpatialError::SourceUnavailable`]: this build has no download
/// backend.
#[cfg(not(feature = "overpass"))]
pub fn default_source() -> SpatialResult<Box<dyn NetworkSource>> {
    Err(SpatialError::SourceUnavailable {
        hint: "enable the `overpass` feature of ns-spatial to download OSM networks, \
               or pass a PbfSource (feature `osm`) or CsvSource explicitly",
    })
}

// ── CsvSource ─────────────────────────────────────────────────────────────────

/// Reads `nodes.csv` (`id,x,y`) and `edges.csv` (`from,to,distance`).
///
/// Node coordinates must be lon/lat degrees.  Only nodes inside the
/// requested box, and edges with both endpoints kept, are returned.
pub struct CsvSource {
    nodes_path: PathBuf,
    edges_path: PathBuf,
}

impl CsvSource {
    pub fn new(nodes_path: impl Into<PathBuf>, edges_path: impl Into<PathBuf>) -> Self {
        Self { nodes_path: nodes_path.into(), edges_path: edges_path.into() }
    }

    /// `dir/nodes.csv` and `dir/edges.csv`.
    pub fn from_dir(dir: &Path) -> Self {
        Self::new(dir.join("nodes.csv"), dir.join("edges.csv"))
    }
}

impl NetworkSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, bbox: BBox, params: &FetchParams) -> SpatialResult<RawNetwork> {
        let mut nodes = Vec::new();
        let mut kept: FxHashSet<i64> = FxHashSet::default();
        for row in csv::Reader::from_path(&self.nodes_path)?.deserialize::<RawNode>() {
            let node = row?;
            if bbox.contains(node.x, node.y) {
                kept.insert(node.id);
                nodes.push(node);
            }
        }

        let mut edges = Vec::new();
        for row in csv::Reader::from_path(&self.edges_path)?.deserialize::<RawEdge>() {
            let edge = row?;
            if kept.contains(&edge.from) && kept.contains(&edge.to) {
                edges.push(edge);
            }
        }

        chatter!(params, "csv source: {} nodes, {} edges inside {}", nodes.len(), edges.len(), bbox);

        let mut raw = RawNetwork { nodes, edges, twoway: params.is_twoway() };
        if params.remove_lcn {
            raw.retain_largest_component();
        }
        Ok(raw)
    }
}

// ── OSM tag helpers (shared by the PBF and Overpass sources) ──────────────────

/// Whether a way with `highway` value and `tags` belongs to a network type.
#[cfg_attr(not(any(feature = "osm", feature = "overpass")), allow(dead_code))]
pub(crate) fn highway_allowed(network_type: NetworkType, highway: &str, tags: &[(&str, &str)]) -> bool {
    let tag = |key: &str| tags.iter().find(|(k, _)| *k == key).map(|(_, v)| *v);
    if matches!(tag("area"), Some("yes")) {
        return false;
    }
    match network_type {
        NetworkType::Walk => {
            if matches!(tag("foot"), Some("no")) {
                return false;
            }
            !matches!(
                highway,
                "motorway" | "motorway_link" | "trunk" | "trunk_link"
                    | "construction" | "proposed" | "abandoned" | "platform" | "raceway"
                    | "bus_guideway" | "escape" | "bridleway" | "corridor"
            )
        }
        NetworkType::Drive => {
            if matches!(tag("motor_vehicle"), Some("no")) || matches!(tag("access"), Some("private" | "no")) {
                return false;
            }
            !matches!(
                highway,
                "footway" | "path" | "cycleway" | "pedestrian" | "steps" | "track"
                    | "construction" | "proposed" | "abandoned" | "platform" | "raceway"
                    | "bridleway" | "corridor" | "elevator" | "escape" | "bus_guideway"
            )
        }
    }
}

/// Whether a way is one-way for the network type.
///
/// Motorways and roundabouts are implicitly one-way in OSM convention.
#[cfg_attr(not(any(feature = "osm", feature = "overpass")), allow(dead_code))]
pub(crate) fn is_oneway(network_type: NetworkType, highway: &str, tags: &[(&str, &str)]) -> bool {
    if network_type == NetworkType::Walk {
        return false;
    }
    let explicit = tags.iter().any(|(k, v)| *k == "oneway" && matches!(*v, "yes" | "1" | "true"));
    let implicit = matches!(highway, "motorway" | "motorway_link")
        || tags.iter().any(|(k, v)| *k == "junction" && *v == "roundabout");
    explicit || implicit
}

/// Turn way node sequences into edges, keeping only segments whose
/// endpoints both have known coordinates.
#[cfg_attr(not(any(feature = "osm", feature = "overpass")), allow(dead_code))]
pub(crate) fn ways_to_raw(
    coords: &FxHashMap<i64, (f64, f64)>,
    ways: &[(Vec<i64>, bool)],
    twoway: bool,
) -> RawNetwork {
    let mut used: FxHashSet<i64> = FxHashSet::default();
    let mut edges = Vec::new();

    for (refs, oneway) in ways {
        for pair in refs.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a == b {
                continue;
            }
            let (Some(&(ax, ay)), Some(&(bx, by))) = (coords.get(&a), coords.get(&b)) else {
                continue;
            };
            let distance = ns_core::haversine_m(ax, ay, bx, by);
            edges.push(RawEdge { from: a, to: b, distance });
            if !twoway && !oneway {
                edges.push(RawEdge { from: b, to: a, distance });
            }
            used.insert(a);
            used.insert(b);
        }
    }

    let mut nodes: Vec<RawNode> = used
        .iter()
        .map(|&id| {
            let (x, y) = coords[&id];
            RawNode { id, x, y }
        })
        .collect();
    nodes.sort_unstable_by_key(|n| n.id);

    RawNetwork { nodes, edges, twoway }
}

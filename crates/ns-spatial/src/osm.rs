//! OSM PBF network source, enabled with the `osm` Cargo feature.
//!
//! # Usage
//!
//! ```ignore
//! use ns_spatial::osm::PbfSource;
//!
//! let source = PbfSource::new("california-latest.osm.pbf");
//! let raw = source.fetch(bbox, &FetchParams::default())?;
//! ```
//!
//! # What is loaded
//!
//! `highway=*` ways admitted by the requested [`NetworkType`], clipped to
//! the bounding box: a segment survives only when both of its nodes lie
//! inside the box.  Segment lengths are haversine metres.
//!
//! # Memory note
//!
//! Node coordinates inside the box are buffered in a hash map for the single
//! sequential pass, since ways reference nodes by OSM id and PBF files list
//! nodes before ways.

use std::path::PathBuf;

use osmpbf::{Element, ElementReader};
use rustc_hash::FxHashMap;

use ns_core::BBox;

use crate::source::{chatter, highway_allowed, is_oneway, ways_to_raw};
use crate::source::{FetchParams, NetworkSource, RawNetwork};
use crate::{SpatialError, SpatialResult};

/// Reads street networks out of a local `.osm.pbf` extract.
pub struct PbfSource {
    path: PathBuf,
}

impl PbfSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl NetworkSource for PbfSource {
    fn name(&self) -> &str {
        "osm-pbf"
    }

    /// # Errors
    ///
    /// Returns [`SpatialError::Osm`] on open or parse errors.
    fn fetch(&self, bbox: BBox, params: &FetchParams) -> SpatialResult<RawNetwork> {
        let reader = ElementReader::from_path(&self.path)
            .map_err(|e| SpatialError::Osm(format!("{}: {e}", self.path.display())))?;

        let mut coords: FxHashMap<i64, (f64, f64)> = FxHashMap::default();
        let mut ways: Vec<(Vec<i64>, bool)> = Vec::new();

        reader
            .for_each(|elem| match elem {
                Element::Node(n) => {
                    if bbox.contains(n.lon(), n.lat()) {
                        coords.insert(n.id(), (n.lon(), n.lat()));
                    }
                }
                Element::DenseNode(n) => {
                    if bbox.contains(n.lon(), n.lat()) {
                        coords.insert(n.id(), (n.lon(), n.lat()));
                    }
                }
                Element::Way(w) => {
                    // Collect tags eagerly so &str lifetimes don't escape the closure.
                    let tags: Vec<(&str, &str)> = w.tags().collect();
                    let Some(highway) = tags.iter().find(|(k, _)| *k == "highway").map(|(_, v)| *v)
                    else {
                        return;
                    };
                    if highway_allowed(params.network_type, highway, &tags) {
                        let oneway = is_oneway(params.network_type, highway, &tags);
                        ways.push((w.refs().collect(), oneway));
                    }
                }
                _ => {}
            })
            .map_err(|e| SpatialError::Osm(e.to_string()))?;

        chatter!(
            params,
            "{}: {} nodes inside {}, {} candidate ways",
            self.path.display(),
            coords.len(),
            bbox,
            ways.len()
        );

        let mut raw = ways_to_raw(&coords, &ways, params.is_twoway());
        if params.remove_lcn {
            raw.retain_largest_component();
        }
        chatter!(params, "pbf source: {} nodes, {} edges", raw.nodes.len(), raw.edges.len());
        Ok(raw)
    }
}

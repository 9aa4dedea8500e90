//! Overpass API network source, enabled with the `overpass` Cargo feature.
//!
//! Issues one blocking POST for every `highway=*` way in the box plus the
//! nodes they reference, then filters ways by [`NetworkType`] locally so the
//! query text stays the same for walk and drive networks.

use std::collections::HashMap;
use std::time::Duration;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use ns_core::BBox;

use crate::source::{chatter, highway_allowed, is_oneway, ways_to_raw};
use crate::source::{FetchParams, NetworkSource, RawNetwork};
use crate::SpatialResult;

/// Public Overpass endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Downloads street networks from an Overpass API server.
pub struct OverpassSource {
    endpoint: String,
}

impl OverpassSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into() }
    }

    /// The Overpass QL text for a box, `(south, west, north, east)` order.
    pub fn query(bbox: BBox, timeout_secs: u64) -> String {
        format!(
            "[out:json][timeout:{timeout_secs}];\
             (way[\"highway\"]({:.7},{:.7},{:.7},{:.7}););\
             (._;>;);out;",
            bbox.south(),
            bbox.west(),
            bbox.north(),
            bbox.east()
        )
    }
}

impl Default for OverpassSource {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl NetworkSource for OverpassSource {
    fn name(&self) -> &str {
        "overpass"
    }

    fn fetch(&self, bbox: BBox, params: &FetchParams) -> SpatialResult<RawNetwork> {
        let query = Self::query(bbox, params.timeout_secs);
        chatter!(params, "requesting {} for {}", self.endpoint, bbox);

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(params.timeout_secs))
            .build()?;
        let body = client
            .post(&self.endpoint)
            .form(&[("data", query)])
            .send()?
            .error_for_status()?
            .text()?;

        let raw = parse_response(&body, params)?;
        chatter!(params, "overpass source: {} nodes, {} edges", raw.nodes.len(), raw.edges.len());
        Ok(raw)
    }
}

// ── Response parsing ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Response {
    elements: Vec<OsmElement>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum OsmElement {
    Node {
        id:  i64,
        lat: f64,
        lon: f64,
    },
    Way {
        nodes: Vec<i64>,
        #[serde(default)]
        tags:  HashMap<String, String>,
    },
    #[serde(other)]
    Other,
}

/// Turn an Overpass JSON body into raw tables.
pub fn parse_response(body: &str, params: &FetchParams) -> SpatialResult<RawNetwork> {
    let response: Response = serde_json::from_str(body)?;

    let mut coords: FxHashMap<i64, (f64, f64)> = FxHashMap::default();
    let mut ways: Vec<(Vec<i64>, bool)> = Vec::new();

    for element in response.elements {
        match element {
            OsmElement::Node { id, lat, lon } => {
                coords.insert(id, (lon, lat));
            }
            OsmElement::Way { nodes, tags } => {
                let tags: Vec<(&str, &str)> =
                    tags.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                let Some(highway) = tags.iter().find(|(k, _)| *k == "highway").map(|(_, v)| *v)
                else {
                    continue;
                };
                if highway_allowed(params.network_type, highway, &tags) {
                    ways.push((nodes, is_oneway(params.network_type, highway, &tags)));
                }
            }
            OsmElement::Other => {}
        }
    }

    let mut raw = ways_to_raw(&coords, &ways, params.is_twoway());
    if params.remove_lcn {
        raw.retain_largest_component();
    }
    Ok(raw)
}

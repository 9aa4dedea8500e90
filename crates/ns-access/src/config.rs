//! Run configuration for acquisition and accessibility.
//!
//! Typically built in code or loaded from a TOML/JSON file by the
//! application crate (with the `serde` feature).

use ns_core::{Crs, Decay};
use ns_spatial::FetchParams;

// ── AccessConfig ──────────────────────────────────────────────────────────────

/// Parameters for [`calc_access`][crate::calc_access].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AccessConfig {
    /// Largest network distance considered accessible, in impedance units
    /// (metres for OSM networks).  Default: 2000.
    pub distance: f64,

    /// Distance decay.  `None` is rejected before any work is done.
    pub decay: Option<Decay>,

    /// Numeric columns of the study area to aggregate.
    pub variables: Vec<String>,

    /// Run [`precompute`](ns_spatial::StreetNetwork::precompute) first.
    /// Worth it when several variables share one network.  Default: true.
    pub precompute: bool,

    /// Return one row per snapped node instead of one per input geometry.
    pub return_node_data: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            distance:         2_000.0,
            decay:            Some(Decay::Linear),
            variables:        Vec::new(),
            precompute:       true,
            return_node_data: false,
        }
    }
}

impl AccessConfig {
    /// Defaults for everything except the variable list.
    pub fn new<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variables: variables.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    pub fn decay(mut self, decay: Option<Decay>) -> Self {
        self.decay = decay;
        self
    }

    pub fn precompute(mut self, precompute: bool) -> Self {
        self.precompute = precompute;
        self
    }

    pub fn node_level(mut self, return_node_data: bool) -> Self {
        self.return_node_data = return_node_data;
        self
    }
}

// ── NetworkQuery ──────────────────────────────────────────────────────────────

/// Parameters for [`get_osm_network`][crate::get_osm_network].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NetworkQuery {
    /// Buffer around the study area so the largest later query has enough
    /// network to avoid edge effects.  Study-area CRS units, or metres when
    /// that CRS is geographic.  Default: 5000.
    pub maxdist: f64,

    /// CRS of the returned network's node coordinates.  `None` uses the
    /// study area's CRS.
    pub output_crs: Option<Crs>,

    /// Passed through to the network source.
    pub fetch: FetchParams,
}

impl Default for NetworkQuery {
    fn default() -> Self {
        Self {
            maxdist:    5_000.0,
            output_crs: None,
            fetch:      FetchParams::default(),
        }
    }
}

//! `ns-access`: network-based accessibility and travel-cost measures for
//! segregation analysis.
//!
//! # Operations
//!
//! | Function                       | Purpose                                         |
//! |--------------------------------|-------------------------------------------------|
//! | [`get_osm_network`]            | Buffered study-area box → routable network      |
//! | [`calc_access`]                | Decayed sums of demographic variables per node  |
//! | [`compute_travel_cost_matrix`] | Origin × destination shortest-path costs        |
//! | [`project_network`]            | Rebuild a network in another CRS               |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `progress` | `ProgressBarObserver` for cost matrices (`indicatif`). |
//! | `serde`    | Derives on `AccessConfig` and `NetworkQuery`.          |
//! | `osm`      | Forwards to `ns-spatial/osm` (PBF source).             |
//! | `overpass` | Forwards to `ns-spatial/overpass` (download source).   |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ns_access::{calc_access, get_osm_network, AccessConfig, NetworkQuery};
//! use ns_spatial::default_source;
//!
//! let source = default_source()?;
//! let mut network = get_osm_network(&tracts, source.as_ref(), &NetworkQuery::default())?;
//! let access = calc_access(
//!     &tracts,
//!     &mut network,
//!     &AccessConfig::new(["total_pop", "black_pop"]).distance(1_000.0),
//! )?;
//! ```
//!
//! Calls are synchronous and single-threaded.  `calc_access` needs
//! `&mut StreetNetwork`, so two accessibility runs can never interleave
//! their variables on one network.

pub mod access;
pub mod acquire;
pub mod config;
pub mod error;
pub mod matrix;
pub mod observer;


pub use access::{calc_access, AccessTable};
pub use acquire::{fetch_bounds, get_osm_network};
pub use config::{AccessConfig, NetworkQuery};
pub use error::{AccessError, AccessResult};
pub use matrix::{compute_travel_cost_matrix, compute_travel_cost_matrix_with, CostMatrix};
pub use ns_spatial::project_network;
#[cfg(feature = "progress")]
pub use observer::ProgressBarObserver;
pub use observer::{MatrixObserver, NoopObserver};

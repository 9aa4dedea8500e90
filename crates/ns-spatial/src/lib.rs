//! `ns-spatial`: street network, spatial indexing, routing, and aggregation.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`network`]   | `StreetNetwork` (CSR + R-tree), `StreetNetworkBuilder`    |
//! | [`router`]    | `Router` trait, `Route`, `DijkstraRouter`                 |
//! | [`aggregate`] | `set`, `precompute`, decayed `aggregate`                  |
//! | [`source`]    | `NetworkSource`, `RawNetwork`, `FetchParams`, `CsvSource` |
//! | [`project`]   | `project_network`                                         |
//! | [`osm`]       | `PbfSource` (feature = `"osm"` only)                      |
//! | [`overpass`]  | `OverpassSource` (feature = `"overpass"` only)            |
//! | [`error`]     | `SpatialError`, `SpatialResult<T>`                        |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `osm`      | OSM PBF source via the `osmpbf` crate.                   |
//! | `overpass` | Overpass API source via blocking `reqwest`.              |
//!
//! # Concurrency
//!
//! `set` and `precompute` take `&mut self`; queries take `&self`.  A network
//! can be shared read-only across threads, but two accessibility runs cannot
//! interleave their variables on one instance.

pub mod aggregate;
pub mod error;
pub mod network;
pub mod project;
pub mod router;
pub mod source;

#[cfg(feature = "osm")]
pub mod osm;

#[cfg(feature = "overpass")]
pub mod overpass;

#[cfg(test)]
mod tests;

pub use aggregate::{AggregateQuery, Aggregation};
pub use error::{SpatialError, SpatialResult};
pub use network::{network_from_arrays, EdgeList, StreetNetwork, StreetNetworkBuilder};
pub use project::project_network;
pub use router::{DijkstraRouter, Route, Router};
pub use source::{
    default_source, CsvSource, FetchParams, NetworkSource, NetworkType, RawEdge, RawNetwork,
    RawNode, DISTANCE,
};

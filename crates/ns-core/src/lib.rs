//! `ns-core`: foundational types for the `netseg` toolkit.
//!
//! This crate is a dependency of every other `ns-*` crate.  It has no `ns-*`
//! dependencies of its own.
//!
//! # What lives here
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`ids`]     | `NodeId` (external), `NodeIdx`, `EdgeIdx` (internal)  |
//! | [`geo`]     | `BBox`, haversine distance                            |
//! | [`crs`]     | `Crs`, `Transformer` (via `proj4rs`)                  |
//! | [`frame`]   | `GeoFrame`, `Column`                                  |
//! | [`decay`]   | `Decay` weighting for accessibility                   |
//! | [`error`]   | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to public value types.      |

pub mod crs;
pub mod decay;
pub mod error;
pub mod frame;
pub mod geo;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use crs::{reproject_points, Crs, Transformer};
pub use decay::Decay;
pub use error::{CoreError, CoreResult};
pub use frame::{Column, GeoFrame};
pub use geo::{haversine_m, BBox};
pub use ids::{EdgeIdx, NodeId, NodeIdx};

//! `ns-output`: tabular IO for the netseg toolkit.
//!
//! | Function                  | Direction | Format                              |
//! |---------------------------|-----------|-------------------------------------|
//! | [`read_points_csv`]       | in        | points + attributes → `GeoFrame`    |
//! | [`write_access_csv`]      | out       | `AccessTable`                       |
//! | [`write_cost_matrix_csv`] | out       | `CostMatrix`                        |
//!
//! Each has a `*_reader` / `*_writer` twin over `std::io` for tests and
//! in-memory use.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ns_output::{read_points_csv, write_access_csv, PointColumns};
//!
//! let tracts = read_points_csv(Path::new("tracts.csv"), &PointColumns::default(), Some(Crs::WGS84))?;
//! let access = calc_access(&tracts, &mut network, &config)?;
//! write_access_csv(Path::new("access.csv"), &access)?;
//! ```

pub mod csv;
pub mod error;
pub mod loader;


pub use crate::csv::{
    write_access_csv, write_access_writer, write_cost_matrix_csv, write_cost_matrix_writer,
};
pub use error::{OutputError, OutputResult};
pub use loader::{read_points_csv, read_points_reader, PointColumns};

//! Core error type.
//!
//! Sub-crates wrap `CoreError` as one variant of their own enums via `#[from]`.

use thiserror::Error;

/// Errors produced by `ns-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unsupported EPSG code {0}")]
    UnsupportedEpsg(u32),

    #[error("invalid PROJ.4 definition {definition:?}: {reason}")]
    InvalidProj { definition: String, reason: String },

    #[error("coordinate transform failed at ({x}, {y}): {reason}")]
    Transform { x: f64, y: f64, reason: String },

    #[error("unknown decay function {0:?}: expected \"linear\", \"exp\" or \"flat\"")]
    UnknownDecay(String),

    #[error("frame has no CRS set")]
    MissingCrs,

    #[error("column {0:?} not found")]
    ColumnNotFound(String),

    #[error("column {0:?} is not numeric")]
    NotNumeric(String),

    #[error("column {name:?} has {got} values but the frame has {expected} rows")]
    ColumnLength {
        name:     String,
        expected: usize,
        got:      usize,
    },

    #[error("frame has no geometries to take bounds from")]
    EmptyFrame,
}

/// Shorthand result type for `ns-core`.
pub type CoreResult<T> = Result<T, CoreError>;

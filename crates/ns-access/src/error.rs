use ns_core::CoreError;
use ns_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("the study area must have a CRS set before a network can be fetched")]
    MissingCrs,

    #[error("a decay function is required, such as \"linear\"")]
    MissingDecay,

    #[error("cannot relabel columns: {origins} origins but {destinations} destinations")]
    LabelMismatch {
        origins:      usize,
        destinations: usize,
    },

    #[error("{what} row {row} has an empty geometry")]
    EmptyGeometry {
        what: &'static str,
        row:  usize,
    },

    #[error("network error: {0}")]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type AccessResult<T> = Result<T, AccessError>;

//! Spatial-subsystem error type.

use thiserror::Error;

use ns_core::{CoreError, NodeId};

/// Errors produced by `ns-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("node {0} added twice")]
    DuplicateNode(NodeId),

    #[error("network has no nodes")]
    EmptyNetwork,

    #[error("a network needs at least one impedance column")]
    NoImpedance,

    #[error("impedance {0:?} not found")]
    UnknownImpedance(String),

    #[error("edge carries {got} weights but the network has {expected} impedances")]
    WeightArity { expected: usize, got: usize },

    #[error("edge {from} → {to} has invalid weight {value}")]
    InvalidWeight { from: NodeId, to: NodeId, value: f64 },

    #[error("variable {0:?} has not been set on this network")]
    UnknownVariable(String),

    #[error("variable {name:?}: {ids} node ids but {values} values")]
    VariableLength { name: String, ids: usize, values: usize },

    #[error("an output CRS is required to reproject a network")]
    MissingOutputCrs,

    #[error("network source unavailable: {hint}")]
    SourceUnavailable { hint: &'static str },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "osm")]
    #[error("OSM parse error: {0}")]
    Osm(String),

    #[cfg(feature = "overpass")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[cfg(feature = "overpass")]
    #[error("Overpass response error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;

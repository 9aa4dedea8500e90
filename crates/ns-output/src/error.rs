//! Error types for ns-output.

use ns_core::CoreError;
use thiserror::Error;

/// Errors that can occur when reading or writing tables.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV has no {0:?} column")]
    MissingColumn(String),

    #[error("line {line}: {column:?} value {value:?} is not a number")]
    Parse {
        line:   u64,
        column: String,
        value:  String,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;

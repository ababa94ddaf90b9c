//! Error types for roikit-core.

use thiserror::Error;

/// Result type alias for roikit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for roikit operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Shape kind or geometry that cannot be represented.
    #[error("unsupported shape: {0}")]
    UnsupportedShape(String),

    /// Argument outside the accepted set of values.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Parallel sequences with different lengths.
    #[error("length mismatch: {what} has {found} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// Index past the end of a collection.
    #[error("index {index} out of range for collection of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

//! ImageJ-specific error types.

use thiserror::Error;

/// Result type for ImageJ operations.
pub type Result<T> = std::result::Result<T, Error>;

/// ImageJ-specific error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Record bytes do not follow the ImageJ layout.
    #[error("invalid ImageJ ROI record: {0}")]
    InvalidRecord(String),

    /// Record ended before a field could be read.
    #[error("record truncated: need {len} bytes at offset {offset}")]
    Truncated { offset: usize, len: usize },

    /// Type/subtype combination the codec does not translate.
    #[error("unsupported ImageJ ROI: type {roitype}, subtype {subtype}")]
    UnsupportedShape { roitype: String, subtype: String },

    /// Core library error.
    #[error("core error: {0}")]
    CoreError(#[from] roikit_core::Error),
}

//! I/O error types.

use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ROI set archive error.
    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Invalid file format.
    #[error("invalid file format: {0}")]
    InvalidFormat(String),

    /// ImageJ record or codec error.
    #[error("ImageJ error: {0}")]
    ImagejError(#[from] roikit_ij::Error),

    /// Core library error.
    #[error("core error: {0}")]
    CoreError(#[from] roikit_core::Error),
}

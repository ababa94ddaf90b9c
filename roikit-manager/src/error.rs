//! Manager error types.

use thiserror::Error;

/// Result type for manager operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Manager error types.
#[derive(Error, Debug)]
pub enum Error {
    /// ROI set file error.
    #[error("ROI file error: {0}")]
    IoError(#[from] roikit_io::Error),

    /// Core library error.
    #[error("core error: {0}")]
    CoreError(#[from] roikit_core::Error),

    /// Configuration file could not be read.
    #[error("config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Configuration file is not valid JSON for [`crate::ManagerConfig`].
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

//! roikit-io: ROI set files for roikit.
//!
//! This crate reads and writes whole ROI collections in three formats,
//! picked by file extension:
//!
//! - `.json` (and anything else) - the [`roikit_core::RoiData`] JSON form
//! - `.roi` - a single ImageJ record
//! - `.zip` - an ImageJ ROI set, one `.roi` record per entry
//!
//! ImageJ files are read through memory-mapped files via memmap2.

mod error;
mod format;
mod reader;
mod writer;

pub use error::{Error, Result};
pub use format::{is_imagej_path, RoiFileFormat};
pub use reader::{read_imagej_records, read_roiset, LoadedRois, MappedFileReader, ReadOptions};
pub use writer::{encode_rois, entry_names, write_roiset};

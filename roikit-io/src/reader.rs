//! Memory-mapped ROI set readers.
//!

use crate::{Error, Result, RoiFileFormat};
use memmap2::Mmap;
use roikit_core::{RoiData, RoiTuple};
use roikit_ij::{decode_batch, BatchPolicy, ImagejRoi, UnsupportedShapeWarning};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

/// A memory-mapped file reader.
///
/// Uses memmap2 to access file contents without copying them into an
/// owned buffer first.
pub struct MappedFileReader {
    mmap: Mmap,
    path: PathBuf,
}

impl MappedFileReader {
    /// Opens a file for memory-mapped reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        // SAFETY: The file is opened read-only and we assume it is not modified concurrently.
        // This is the standard safety contract for memory mapping.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self {
            mmap,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Returns the file contents as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap[..]
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Returns true if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Returns the path the reader was opened with.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn non_empty(&self) -> Result<&[u8]> {
        if self.is_empty() {
            return Err(Error::InvalidFormat(format!(
                "empty ROI file: {}",
                self.path.display()
            )));
        }
        Ok(self.as_bytes())
    }
}

/// Options for [`read_roiset`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Treatment of ImageJ records without a shape counterpart.
    pub policy: BatchPolicy,
}

impl ReadOptions {
    /// Sets the batch policy.
    #[must_use]
    pub fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Shapes read from a file, plus the records that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedRois {
    pub shapes: Vec<RoiTuple>,
    pub warnings: Vec<UnsupportedShapeWarning>,
}

impl LoadedRois {
    /// Number of shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns true if no shape was read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Collects the shapes into a record store.
    #[must_use]
    pub fn into_roi_data(self) -> RoiData {
        RoiData::from_tuples(self.shapes)
    }
}

/// Reads the raw ImageJ records of a `.roi` or `.zip` file.
///
/// Archive entries whose names do not end in `.roi` are ignored.
///
/// # Errors
/// Returns [`Error::InvalidFormat`] for an empty file or a non-ImageJ path,
/// and I/O, archive or record errors otherwise.
pub fn read_imagej_records<P: AsRef<Path>>(path: P) -> Result<Vec<ImagejRoi>> {
    let path = path.as_ref();
    match RoiFileFormat::from_path(path) {
        RoiFileFormat::ImagejRoi => {
            let reader = MappedFileReader::open(path)?;
            Ok(vec![ImagejRoi::from_bytes(reader.non_empty()?)?])
        }
        RoiFileFormat::ImagejZip => {
            let reader = MappedFileReader::open(path)?;
            let mut archive = zip::ZipArchive::new(Cursor::new(reader.non_empty()?))?;
            let mut rois = Vec::with_capacity(archive.len());
            let mut buf = Vec::new();
            for i in 0..archive.len() {
                let mut entry = archive.by_index(i)?;
                if entry.is_dir() || !entry.name().to_ascii_lowercase().ends_with(".roi") {
                    log::debug!("ignoring archive entry {}", entry.name());
                    continue;
                }
                buf.clear();
                entry.read_to_end(&mut buf)?;
                rois.push(ImagejRoi::from_bytes(&buf)?);
            }
            Ok(rois)
        }
        RoiFileFormat::Json => Err(Error::InvalidFormat(format!(
            "not an ImageJ ROI file: {}",
            path.display()
        ))),
    }
}

/// Reads a ROI set in the format given by the file extension.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, or, under
/// [`BatchPolicy::Strict`], if an ImageJ record has no shape counterpart.
pub fn read_roiset<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<LoadedRois> {
    let path = path.as_ref();
    let loaded = if RoiFileFormat::from_path(path).is_imagej() {
        let records = read_imagej_records(path)?;
        let batch = decode_batch(&records, options.policy)?;
        LoadedRois {
            shapes: batch.shapes,
            warnings: batch.warnings,
        }
    } else {
        let file = File::open(path)?;
        let rois = RoiData::from_reader(BufReader::new(file))?;
        LoadedRois {
            shapes: rois.iter_shapes()?.collect(),
            warnings: Vec::new(),
        }
    };
    log::debug!(
        "read {} ROIs from {} ({} skipped)",
        loaded.len(),
        path.display(),
        loaded.warnings.len()
    );
    Ok(loaded)
}

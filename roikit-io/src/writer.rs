//! ROI set writers.

use crate::{Error, Result, RoiFileFormat};
use roikit_core::RoiData;
use roikit_ij::{shape_to_roi, ImagejRoi};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Encodes every shape of `rois` as an ImageJ record.
///
/// Empty names are treated as missing.
///
/// # Errors
/// Returns an error if the collection is inconsistent or a shape cannot be
/// encoded.
pub fn encode_rois(rois: &RoiData) -> Result<Vec<ImagejRoi>> {
    rois.iter_shapes()?
        .map(|mut tuple| {
            if tuple.name.as_deref() == Some("") {
                tuple.name = None;
            }
            Ok(shape_to_roi(&tuple)?)
        })
        .collect()
}

/// Archive entry names: `<name>.roi`, or the ImageJ `yyyy-xxxx.roi` label
/// for unnamed records. Repeated names get a `-1`, `-2`, ... suffix.
#[must_use]
pub fn entry_names(rois: &[ImagejRoi]) -> Vec<String> {
    let mut used = HashSet::new();
    rois.iter()
        .map(|roi| {
            let base = roi.name.clone().unwrap_or_else(|| roi.auto_name());
            let mut name = base.clone();
            let mut k = 1;
            while !used.insert(name.clone()) {
                name = format!("{base}-{k}");
                k += 1;
            }
            format!("{name}.roi")
        })
        .collect()
}

/// Writes a ROI set in the format given by the file extension, replacing
/// any existing file.
///
/// # Errors
/// Returns [`Error::InvalidFormat`] when a `.roi` file is asked to hold
/// anything but exactly one ROI, and I/O, archive or encoding errors
/// otherwise.
pub fn write_roiset<P: AsRef<Path>>(path: P, rois: &RoiData) -> Result<()> {
    let path = path.as_ref();
    match RoiFileFormat::from_path(path) {
        RoiFileFormat::Json => {
            let mut writer = BufWriter::new(File::create(path)?);
            rois.to_writer(&mut writer)?;
            writer.flush()?;
        }
        RoiFileFormat::ImagejRoi => {
            if rois.len() != 1 {
                return Err(Error::InvalidFormat(format!(
                    "a .roi file holds exactly one ROI, got {}; use .zip",
                    rois.len()
                )));
            }
            let records = encode_rois(rois)?;
            let mut writer = BufWriter::new(File::create(path)?);
            for roi in &records {
                writer.write_all(&roi.to_bytes()?)?;
            }
            writer.flush()?;
        }
        RoiFileFormat::ImagejZip => {
            let records = encode_rois(rois)?;
            let names = entry_names(&records);
            let mut archive = ZipWriter::new(File::create(path)?);
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            for (roi, name) in records.iter().zip(names) {
                archive.start_file(name, options)?;
                archive.write_all(&roi.to_bytes()?)?;
            }
            archive.finish()?;
        }
    }
    log::debug!("wrote {} ROIs to {}", rois.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roikit_core::{RoiTuple, ShapeKind};

    fn line(name: Option<&str>) -> RoiTuple {
        let tuple = RoiTuple::new(vec![[10.0, 20.0], [30.0, 40.0]], ShapeKind::Line);
        match name {
            Some(name) => tuple.with_name(name),
            None => tuple,
        }
    }

    #[test]
    fn test_entry_names_deduplicated() {
        let rois = RoiData::from_tuples(vec![
            line(Some("cell")),
            line(Some("cell")),
            line(None),
            line(Some("cell")),
        ]);
        let records = encode_rois(&rois).unwrap();
        assert_eq!(
            entry_names(&records),
            vec!["cell.roi", "cell-1.roi", "0020-0030.roi", "cell-2.roi"]
        );
    }

    #[test]
    fn test_roi_file_needs_one_shape() {
        let dir = tempfile::tempdir().unwrap();
        let rois = RoiData::from_tuples(vec![line(None), line(None)]);
        let result = write_roiset(dir.path().join("two.roi"), &rois);
        assert!(matches!(result, Err(Error::InvalidFormat(_))));
        assert!(!dir.path().join("two.roi").exists());
    }
}

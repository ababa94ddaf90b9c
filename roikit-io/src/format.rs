//! File format detection by extension.

use std::path::Path;

/// On-disk ROI set format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoiFileFormat {
    /// `RoiData` JSON.
    Json,
    /// Single ImageJ `.roi` record.
    ImagejRoi,
    /// ImageJ `.zip` ROI set.
    ImagejZip,
}

impl RoiFileFormat {
    /// Picks the format from the file extension, case-insensitively.
    ///
    /// Anything that is not `.roi` or `.zip` is treated as JSON.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("roi") => RoiFileFormat::ImagejRoi,
            Some("zip") => RoiFileFormat::ImagejZip,
            _ => RoiFileFormat::Json,
        }
    }

    /// Returns true for the ImageJ formats.
    #[must_use]
    pub fn is_imagej(self) -> bool {
        matches!(self, RoiFileFormat::ImagejRoi | RoiFileFormat::ImagejZip)
    }
}

/// Returns true if `path` names an ImageJ `.roi` or `.zip` file.
#[must_use]
pub fn is_imagej_path<P: AsRef<Path>>(path: P) -> bool {
    RoiFileFormat::from_path(path).is_imagej()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(RoiFileFormat::from_path("a/b.roi"), RoiFileFormat::ImagejRoi);
        assert_eq!(RoiFileFormat::from_path("RoiSet.ZIP"), RoiFileFormat::ImagejZip);
        assert_eq!(RoiFileFormat::from_path("rois.json"), RoiFileFormat::Json);
        assert_eq!(RoiFileFormat::from_path("no_extension"), RoiFileFormat::Json);
    }

    #[test]
    fn test_is_imagej_path() {
        assert!(is_imagej_path("cells.roi"));
        assert!(is_imagej_path("RoiSet.zip"));
        assert!(!is_imagej_path("cells.json"));
        assert!(!is_imagej_path("cells.roi.bak"));
    }
}

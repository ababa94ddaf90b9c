//! Manager configuration.

use crate::shapes::{TextOptions, MAX_TEXT_SIZE, MIN_TEXT_SIZE};
use crate::Result;
use roikit_ij::BatchPolicy;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Configuration for a [`crate::RoiManager`].
///
/// Every field is optional in JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Initial visibility mode.
    pub show_all: bool,
    /// Prefix of generated ROI names (`ROI-0000`, `ROI-0001`, ...).
    pub name_prefix: String,
    /// Label text shown next to each shape.
    pub text: TextOptions,
    /// Drop ImageJ records the codec cannot translate instead of failing
    /// the whole load.
    pub skip_unsupported: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            show_all: true,
            name_prefix: "ROI-".to_string(),
            text: TextOptions::default(),
            skip_unsupported: false,
        }
    }
}

impl ManagerConfig {
    /// Sets the initial visibility mode.
    #[must_use]
    pub fn with_show_all(mut self, show_all: bool) -> Self {
        self.show_all = show_all;
        self
    }

    /// Sets the generated-name prefix.
    #[must_use]
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Sets the label text options.
    #[must_use]
    pub fn with_text(mut self, text: TextOptions) -> Self {
        self.text = text;
        self
    }

    /// Sets whether undecodable ImageJ records are skipped on load.
    #[must_use]
    pub fn with_skip_unsupported(mut self, skip: bool) -> Self {
        self.skip_unsupported = skip;
        self
    }

    /// Batch policy used when loading ImageJ files.
    #[must_use]
    pub fn batch_policy(&self) -> BatchPolicy {
        if self.skip_unsupported {
            BatchPolicy::SkipUnsupported
        } else {
            BatchPolicy::Strict
        }
    }

    /// Load configuration from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// holds an out-of-range text size.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON string.
    ///
    /// # Errors
    /// Returns an error if the string is not valid JSON or holds an
    /// out-of-range text size.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    /// Returns an invalid-argument error for a text size outside
    /// `4..=64`.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_TEXT_SIZE..=MAX_TEXT_SIZE).contains(&self.text.size) {
            return Err(roikit_core::Error::InvalidArgument(format!(
                "text size must be within {MIN_TEXT_SIZE}..={MAX_TEXT_SIZE}, got {}",
                self.text.size
            ))
            .into());
        }
        Ok(())
    }
}

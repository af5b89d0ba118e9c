//! Extractor configuration, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cascade::Confidence;
use crate::error::{OtpError, OtpResult};

/// Smallest accepted `max_text_chars`.
pub const MIN_TEXT_CHARS: usize = 64;

fn default_true() -> bool {
    true
}

fn default_max_text_chars() -> usize {
    20_000
}

/// Configuration for [`crate::extract::CodeExtractor`].
///
/// The defaults reproduce the plain subject-then-body pipeline exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Run the pipeline on the subject line.
    #[serde(default = "default_true")]
    pub scan_subject: bool,
    /// Run the pipeline on the body.
    #[serde(default = "default_true")]
    pub scan_body: bool,
    /// Results below this confidence are treated as no match.
    #[serde(default)]
    pub min_confidence: Confidence,
    /// Normalized text is cut to this many characters before matching.
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            scan_subject: default_true(),
            scan_body: default_true(),
            min_confidence: Confidence::Low,
            max_text_chars: default_max_text_chars(),
        }
    }
}

impl ExtractorConfig {
    pub fn validate(&self) -> OtpResult<()> {
        if self.max_text_chars < MIN_TEXT_CHARS {
            return Err(OtpError::Config {
                message: format!(
                    "max_text_chars must be at least {MIN_TEXT_CHARS}, got {}",
                    self.max_text_chars
                ),
            });
        }
        if !self.scan_subject && !self.scan_body {
            return Err(OtpError::Config {
                message: "scan_subject and scan_body are both disabled".to_string(),
            });
        }
        Ok(())
    }

    /// Load and validate from a TOML file.
    pub fn load(path: &Path) -> OtpResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| OtpError::ConfigRead {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| OtpError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> OtpResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| OtpError::ConfigSerialize {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| OtpError::ConfigWrite {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| OtpError::ConfigWrite {
            path: path.display().to_string(),
            source: e,
        })
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor configuration.
//!
//! Stored as RON next to the working directory:
//! - Where storage slots live and which slot opens by default
//! - Export metadata (contract type, target network)
//! - Whether destructive gestures ask for confirmation

use blockboard_graph::ExportMetadata;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current config format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "blockboard.ron";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid RON
    #[error("Config parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Config could not be encoded
    #[error("Config encoding error: {0}")]
    Encode(#[from] ron::Error),

    /// Written by a newer editor
    #[error("Config version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },
}

/// Metadata written into exported documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Contract type label
    pub contract_type: String,
    /// Target network label
    pub network: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            contract_type: "custom".to_string(),
            network: "ethereum".to_string(),
        }
    }
}

impl ExportSettings {
    /// Export metadata for documents
    pub fn metadata(&self) -> ExportMetadata {
        ExportMetadata::new(self.contract_type.clone(), self.network.clone())
    }
}

fn default_true() -> bool {
    true
}

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Format version
    pub version: u32,
    /// Directory holding storage slots
    pub storage_dir: PathBuf,
    /// Slot opened when none is given
    pub default_slot: String,
    /// Export metadata
    #[serde(default)]
    pub export: ExportSettings,
    /// Ask before deleting a selection or clearing the board
    #[serde(default = "default_true")]
    pub confirm_destructive: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            storage_dir: PathBuf::from(".blockboard"),
            default_slot: "workflow".to_string(),
            export: ExportSettings::default(),
            confirm_destructive: true,
        }
    }
}

impl EditorConfig {
    /// Load config from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: EditorConfig = ron::from_str(&content)?;

        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }

        Ok(config)
    }

    /// Load config from a file, or the defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {:?}, using defaults", path);
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let pretty = ron::ser::PrettyConfig::default().struct_names(true);
        let content = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the storage directory against `base` when it is relative
    pub fn storage_dir_in(&self, base: &Path) -> PathBuf {
        if self.storage_dir.is_absolute() {
            self.storage_dir.clone()
        } else {
            base.join(&self.storage_dir)
        }
    }
}

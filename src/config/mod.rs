//! Configuration for the trusted prompt store.
//!
//! A store configuration maps stable prompt ids to on-disk entries:
//!
//! ```json
//! {
//!   "prompts": {
//!     "metaMentorSystem": {
//!       "path": "prompts/meta_mentor.txt",
//!       "version": "2.1.0",
//!       "riskLevel": "critical",
//!       "checksum": "sha256:9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
//!     }
//!   }
//! }
//! ```
//!
//! Entry paths are resolved relative to the configuration file's directory.
//! JSON, TOML, and YAML are accepted, selected by file extension.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use validator::Validate;

/// Errors that can occur while loading a store configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("failed to read config file at {path}: {source}")]
    FileRead {
        /// Path that failed to read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Failed to parse the configuration
    #[error("failed to parse {format} config: {source}")]
    Parse {
        /// Format that failed to parse (JSON, TOML, YAML)
        format: String,
        /// Underlying parse error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Unsupported or unrecognised configuration file extension
    #[error("unsupported config file format: {message}")]
    UnsupportedFormat {
        /// Description of the problem
        message: String,
    },

    /// Configuration validation failed
    #[error("config validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("failed to parse environment variable {key}: {message}")]
    EnvParse {
        /// Environment variable key
        key: String,
        /// Error message
        message: String,
    },
}

/// One configured prompt: where its content lives and how to verify it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PromptEntry {
    /// Content file path, relative to the configuration file's directory.
    #[validate(length(min = 1))]
    pub path: String,

    /// Opaque version string; compared for equality and displayed, never parsed.
    #[validate(length(min = 1))]
    pub version: String,

    /// Risk classification; defaults to `"medium"` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,

    /// Expected content digest (`sha256:<64 lowercase hex>`). When present
    /// and enforcement is enabled, a mismatch aborts the load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

/// The full store configuration: prompt id → entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Configured prompts, keyed by stable id.
    #[serde(default)]
    pub prompts: HashMap<String, PromptEntry>,
}

impl StoreConfig {
    /// Load a configuration from a JSON, TOML, or YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or if an
    /// entry fails validation (empty `path` or `version`).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                    format: "JSON".to_string(),
                    source: Box::new(e),
                })?
            }
            Some("toml") => toml::from_str(&content).map_err(|e| ConfigError::Parse {
                format: "TOML".to_string(),
                source: Box::new(e),
            })?,
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
                    format: "YAML".to_string(),
                    source: Box::new(e),
                })?
            }
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    message: "file extension must be .json, .toml, .yaml, or .yml".to_string(),
                });
            }
        };

        config.validate_entries()?;

        tracing::debug!(path = %path.display(), prompts = config.prompts.len(), "store configuration loaded");
        Ok(config)
    }

    /// Look up a prompt entry by id.
    #[must_use]
    pub fn entry(&self, prompt_id: &str) -> Option<&PromptEntry> {
        self.prompts.get(prompt_id)
    }

    fn validate_entries(&self) -> Result<(), ConfigError> {
        for entry in self.prompts.values() {
            entry.validate()?;
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

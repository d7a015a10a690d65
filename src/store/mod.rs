//! Trusted prompt loading and integrity verification.
//!
//! The [`PromptStore`] is the system's sole provenance control: every prompt
//! fed to a model is expected to have passed through [`PromptStore::load`],
//! which reads the configured content file and — when a checksum is declared
//! and enforcement is enabled — verifies a SHA-256 digest over the raw bytes
//! before any content is returned. A prompt that did not come through this
//! gate must be treated as untrusted by the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use promptgate::store::PromptStore;
//!
//! let store = PromptStore::builder()
//!     .with_config_file("config/prompts.json")?
//!     .with_env()
//!     .build()?;
//!
//! let prompt = store.load("metaMentorSystem")?;
//! assert_eq!(prompt.risk_level(), "critical");
//! ```

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

use crate::config::{ConfigError, StoreConfig};

/// Risk classification applied when a configuration entry declares none.
const DEFAULT_RISK_LEVEL: &str = "medium";

/// Risk-level sentinel that activates stricter validation downstream.
const CRITICAL_SENTINEL: &str = "critical";

// ── checksum ───────────────────────────────────────────────────────────

/// Compute the integrity digest for prompt content.
///
/// Returns `"sha256:" + 64 lowercase hex characters` over the raw content
/// bytes. Deterministic: equal inputs always produce equal digests,
/// regardless of call count or calling thread.
#[must_use]
pub fn checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let digest = hasher.finalize();
    format!("sha256:{digest:x}")
}

// ── TrustedPrompt ──────────────────────────────────────────────────────

/// A versioned system prompt loaded through the provenance gate.
///
/// All fields are immutable after construction; reloading means invoking
/// [`PromptStore::load`] again and replacing the whole value.
#[derive(Debug, Clone)]
pub struct TrustedPrompt {
    id: String,
    content: String,
    version: String,
    risk_level: String,
    loaded_at: Instant,
}

impl TrustedPrompt {
    /// Construct a prompt directly, bypassing the store.
    ///
    /// Intended for tests and for callers that accept responsibility for an
    /// ad-hoc prompt's provenance.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        version: impl Into<String>,
        risk_level: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            version: version.into(),
            risk_level: risk_level.into(),
            loaded_at: Instant::now(),
        }
    }

    /// Stable identifier this prompt was loaded under.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The immutable prompt text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Opaque version string (compared for equality, never parsed).
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Risk classification (`"low"`, `"medium"`, `"high"`, `"critical"`, …).
    #[must_use]
    pub fn risk_level(&self) -> &str {
        &self.risk_level
    }

    /// Monotonic timestamp captured when the prompt was constructed.
    #[must_use]
    pub fn loaded_at(&self) -> Instant {
        self.loaded_at
    }

    /// Whether this prompt carries the `"critical"` sentinel (case-insensitive).
    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.risk_level.eq_ignore_ascii_case(CRITICAL_SENTINEL)
    }
}

impl std::fmt::Display for TrustedPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TrustedPrompt{{id='{}', version='{}', riskLevel='{}'}}",
            self.id, self.version, self.risk_level
        )
    }
}

// ── LoadError ──────────────────────────────────────────────────────────

/// Failure to establish trust in a prompt.
///
/// None of these are retried automatically; each surfaces exactly once at
/// the point of loading, never during pipeline execution.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The id is absent from the store configuration.
    #[error("prompt not found in configuration: {id}")]
    NotFound {
        /// The requested prompt id.
        id: String,
    },

    /// The configured content file does not exist on disk.
    #[error("prompt content file not found: {}", path.display())]
    Missing {
        /// The resolved content path.
        path: PathBuf,
    },

    /// The computed digest disagrees with the declared checksum.
    #[error("checksum verification failed for prompt: {id}")]
    IntegrityMismatch {
        /// The prompt id whose content failed verification.
        id: String,
        /// The checksum declared in configuration.
        expected: String,
        /// The digest computed over the on-disk content.
        actual: String,
    },

    /// An underlying read error.
    #[error("failed to read prompt content at {}: {source}", path.display())]
    Io {
        /// The content path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

// ── PromptStore ────────────────────────────────────────────────────────

/// Loads named prompts from disk, verifying integrity on the way in.
///
/// Construct via [`PromptStore::builder`]. The store is immutable once
/// built and safe to share across threads.
#[derive(Debug)]
pub struct PromptStore {
    config: StoreConfig,
    base_dir: PathBuf,
    require_checksum: bool,
}

impl PromptStore {
    /// Start building a store.
    #[must_use]
    pub fn builder() -> PromptStoreBuilder {
        PromptStoreBuilder::default()
    }

    /// Load a prompt by id, verifying its checksum when one is declared.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NotFound`] for an unconfigured id,
    /// [`LoadError::Missing`] when the content file is absent,
    /// [`LoadError::IntegrityMismatch`] when the computed digest disagrees
    /// with the declared checksum (no partial content is returned), and
    /// [`LoadError::Io`] for any other read failure.
    pub fn load(&self, prompt_id: &str) -> Result<TrustedPrompt, LoadError> {
        tracing::debug!(prompt = prompt_id, "loading prompt");

        let entry = self.config.entry(prompt_id).ok_or_else(|| LoadError::NotFound {
            id: prompt_id.to_string(),
        })?;

        let path = self.base_dir.join(&entry.path);
        if !path.exists() {
            return Err(LoadError::Missing { path });
        }

        let content = std::fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;

        if self.require_checksum
            && let Some(expected) = &entry.checksum
        {
            let actual = checksum(&content);
            if actual != *expected {
                tracing::error!(prompt = prompt_id, "checksum mismatch");
                return Err(LoadError::IntegrityMismatch {
                    id: prompt_id.to_string(),
                    expected: expected.clone(),
                    actual,
                });
            }
            tracing::debug!(prompt = prompt_id, "checksum verified");
        }

        let risk_level = entry
            .risk_level
            .clone()
            .unwrap_or_else(|| DEFAULT_RISK_LEVEL.to_string());

        tracing::info!(
            prompt = prompt_id,
            version = %entry.version,
            "prompt loaded"
        );

        Ok(TrustedPrompt::new(
            prompt_id,
            content,
            entry.version.clone(),
            risk_level,
        ))
    }

    /// Whether checksum enforcement is active for this store.
    #[must_use]
    pub fn require_checksum(&self) -> bool {
        self.require_checksum
    }
}

// ── PromptStoreBuilder ─────────────────────────────────────────────────

/// Builder for [`PromptStore`].
#[derive(Debug)]
pub struct PromptStoreBuilder {
    config: StoreConfig,
    base_dir: PathBuf,
    require_checksum: bool,
    use_env: bool,
}

impl Default for PromptStoreBuilder {
    fn default() -> Self {
        Self {
            config: StoreConfig::default(),
            base_dir: PathBuf::from("."),
            require_checksum: true,
            use_env: false,
        }
    }
}

impl PromptStoreBuilder {
    /// Load the store configuration from a JSON, TOML, or YAML file.
    ///
    /// Entry paths will be resolved relative to the file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn with_config_file(mut self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        self.config = StoreConfig::from_file(path)?;
        self.base_dir = path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok(self)
    }

    /// Use an already-parsed configuration with an explicit base directory.
    #[must_use]
    pub fn with_config(mut self, config: StoreConfig, base_dir: impl Into<PathBuf>) -> Self {
        self.config = config;
        self.base_dir = base_dir.into();
        self
    }

    /// Toggle checksum enforcement (default `true`).
    ///
    /// With enforcement disabled, declared checksums are ignored entirely.
    #[must_use]
    pub fn require_checksum(mut self, require: bool) -> Self {
        self.require_checksum = require;
        self
    }

    /// Enable overrides from environment variables.
    ///
    /// Reads `PROMPTGATE_REQUIRE_CHECKSUM` (`true`/`false`); a `.env` file is
    /// honoured if present.
    #[must_use]
    pub fn with_env(mut self) -> Self {
        self.use_env = true;
        self
    }

    /// Build the store.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EnvParse`] if an environment override cannot
    /// be parsed.
    pub fn build(mut self) -> Result<PromptStore, ConfigError> {
        if self.use_env {
            dotenvy::dotenv().ok();

            if let Ok(raw) = std::env::var("PROMPTGATE_REQUIRE_CHECKSUM") {
                self.require_checksum = raw.parse().map_err(|_| ConfigError::EnvParse {
                    key: "PROMPTGATE_REQUIRE_CHECKSUM".to_string(),
                    message: "must be 'true' or 'false'".to_string(),
                })?;
            }
        }

        Ok(PromptStore {
            config: self.config,
            base_dir: self.base_dir,
            require_checksum: self.require_checksum,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

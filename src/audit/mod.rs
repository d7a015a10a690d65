//! Append-only audit trail and the auditor stage.
//!
//! The [`AuditTrail`] owns two newline-delimited text destinations inside a
//! single directory: `access.log` (every pipeline execution) and
//! `security.log` (failed executions only). Both files and their parent
//! directories are created on first use. Writes to a destination are
//! serialized behind a per-destination mutex so concurrent invocations never
//! interleave partial lines — this is the system's only required
//! synchronization point.
//!
//! Auditing is best-effort, not a gate: a write failure is reported through
//! `tracing::error!` but never fails the pipeline result.
//!
//! # Line formats
//!
//! Stable for downstream parsing:
//!
//! ```text
//! [<yyyy-MM-dd HH:mm:ss>] ACTION=<action> | PROMPT=<id> | USER=<user> | STATUS=<PASSED|FAILED>
//! [<timestamp>] SECURITY_EVENT=<type> | PROMPT=<id> | DETAILS=<reason>
//! [<timestamp>] MODIFICATION | PROMPT=<id> | VERSION=<version> | MODIFIED_BY=<who> | REASON=<reason>
//! ```

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use crate::pipeline::{PipelineResult, SecurityStage, StageFault};

/// File name of the access-log destination.
const ACCESS_LOG: &str = "access.log";

/// File name of the security-event destination.
const SECURITY_LOG: &str = "security.log";

/// Timestamp layout shared by all line formats.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors that can occur while opening the audit destinations.
///
/// Only construction is fallible; once open, write failures are reported
/// through `tracing` and never propagate.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Failed to create the audit directory.
    #[error("failed to create audit directory {}: {source}", path.display())]
    CreateDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to open a log destination.
    #[error("failed to open audit log {}: {source}", path.display())]
    Open {
        /// The destination that could not be opened.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

// ── LogDestination ─────────────────────────────────────────────────────

/// One append-only destination with serialized writes.
#[derive(Debug)]
struct LogDestination {
    path: PathBuf,
    file: Mutex<File>,
}

impl LogDestination {
    fn open(path: PathBuf) -> Result<Self, AuditError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| AuditError::Open {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Append one newline-terminated record, best-effort.
    fn append(&self, line: &str) {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = writeln!(file, "{line}") {
            tracing::error!(
                path = %self.path.display(),
                error = %err,
                "failed to write audit log entry"
            );
        }
    }
}

// ── AuditTrail ─────────────────────────────────────────────────────────

/// Dual-destination append-only audit sink.
///
/// Safe to share across threads; typically wrapped in an [`Arc`] and handed
/// to an [`AuditorStage`].
#[derive(Debug)]
pub struct AuditTrail {
    access: LogDestination,
    security: LogDestination,
}

impl AuditTrail {
    /// Open (or create) the audit destinations inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] if the directory or either log file cannot be
    /// created.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, AuditError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| AuditError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        Ok(Self {
            access: LogDestination::open(dir.join(ACCESS_LOG))?,
            security: LogDestination::open(dir.join(SECURITY_LOG))?,
        })
    }

    /// Record one access-log line.
    pub fn log_access(&self, prompt_id: &str, action: &str, user: &str, status: &str) {
        let entry = format!(
            "[{}] ACTION={action} | PROMPT={prompt_id} | USER={user} | STATUS={status}",
            timestamp()
        );
        self.access.append(&entry);
        tracing::info!("{entry}");
    }

    /// Record one security-event line.
    pub fn log_security_event(&self, event_type: &str, prompt_id: &str, details: &str) {
        let entry = format!(
            "[{}] SECURITY_EVENT={event_type} | PROMPT={prompt_id} | DETAILS={details}",
            timestamp()
        );
        self.security.append(&entry);
        tracing::warn!("{entry}");
    }

    /// Record a prompt-modification line in the access log.
    pub fn log_modification(&self, prompt_id: &str, version: &str, modified_by: &str, reason: &str) {
        let entry = format!(
            "[{}] MODIFICATION | PROMPT={prompt_id} | VERSION={version} | MODIFIED_BY={modified_by} | REASON={reason}",
            timestamp()
        );
        self.access.append(&entry);
        tracing::info!("{entry}");
    }

    /// Path of the access-log destination.
    #[must_use]
    pub fn access_log_path(&self) -> &Path {
        &self.access.path
    }

    /// Path of the security-event destination.
    #[must_use]
    pub fn security_log_path(&self) -> &Path {
        &self.security.path
    }
}

fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

// ── AuditorStage ───────────────────────────────────────────────────────

/// Records the outcome of a pipeline invocation.
///
/// Writes one access line per processed result (action `EXECUTE`, user drawn
/// from `result.context("user")`, defaulting to `"unknown"`), plus one
/// security-event line when the result has failed. The stage itself never
/// fails the result.
#[derive(Debug)]
pub struct AuditorStage {
    trail: Arc<AuditTrail>,
}

impl AuditorStage {
    /// Create an auditor stage owning its trail.
    #[must_use]
    pub fn new(trail: AuditTrail) -> Self {
        Self {
            trail: Arc::new(trail),
        }
    }

    /// Create an auditor stage over a shared trail.
    #[must_use]
    pub fn shared(trail: Arc<AuditTrail>) -> Self {
        Self { trail }
    }

    /// The underlying audit trail.
    #[must_use]
    pub fn trail(&self) -> &AuditTrail {
        &self.trail
    }
}

impl SecurityStage for AuditorStage {
    fn name(&self) -> &str {
        "auditor"
    }

    fn process(&self, result: &mut PipelineResult<'_>) -> Result<(), StageFault> {
        let prompt_id = result.prompt().id();
        let user = result
            .context("user")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let status = if result.passed() { "PASSED" } else { "FAILED" };

        self.trail.log_access(prompt_id, "EXECUTE", &user, status);

        if !result.passed() {
            self.trail.log_security_event(
                "SECURITY_CHECK_FAILED",
                prompt_id,
                result.last_error().unwrap_or_default(),
            );
        }

        tracing::debug!(prompt = prompt_id, "audit log entry created");
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

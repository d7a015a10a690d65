//! The mutable per-invocation record threaded through the stage chain.

use std::collections::HashMap;

use crate::store::TrustedPrompt;

/// The shared state of one pipeline invocation.
///
/// A fresh `PipelineResult` is created by
/// [`SecurityPipeline::execute`](super::SecurityPipeline::execute) for every
/// call and handed to each stage in turn. Stages observe and mutate it; the
/// caller receives it back once the chain completes or short-circuits.
///
/// `passed` starts `true` and can only transition to `false` — there is no
/// way to un-fail a result. `last_error` always holds the most recent
/// failure reason; since the pipeline halts at the first failure, that is
/// the terminating stage's reason.
#[derive(Debug)]
pub struct PipelineResult<'p> {
    prompt: &'p TrustedPrompt,
    user_input: String,
    sanitized_input: String,
    context: HashMap<String, serde_json::Value>,
    errors: HashMap<String, String>,
    passed: bool,
    last_error: Option<String>,
}

impl<'p> PipelineResult<'p> {
    /// Create a fresh result for one invocation.
    ///
    /// `sanitized_input` starts equal to `user_input`.
    #[must_use]
    pub fn new(prompt: &'p TrustedPrompt, user_input: impl Into<String>) -> Self {
        let user_input = user_input.into();
        let sanitized_input = user_input.clone();
        Self {
            prompt,
            user_input,
            sanitized_input,
            context: HashMap::new(),
            errors: HashMap::new(),
            passed: true,
            last_error: None,
        }
    }

    /// The trusted prompt this invocation protects.
    #[must_use]
    pub fn prompt(&self) -> &'p TrustedPrompt {
        self.prompt
    }

    /// The original input, never mutated after construction.
    #[must_use]
    pub fn user_input(&self) -> &str {
        &self.user_input
    }

    /// The working input; meaningful only when the result passed.
    #[must_use]
    pub fn sanitized_input(&self) -> &str {
        &self.sanitized_input
    }

    /// Replace the working input with a sanitized value.
    pub fn set_sanitized_input(&mut self, sanitized: impl Into<String>) {
        self.sanitized_input = sanitized.into();
    }

    /// Whether every stage so far has accepted the input.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Mark the result failed with a human-readable reason.
    ///
    /// Repeated calls overwrite `last_error`; the `passed` flag never
    /// transitions back to `true`.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.passed = false;
        self.last_error = Some(reason.into());
    }

    /// The most recent failure reason, if any stage failed.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Read one context value.
    #[must_use]
    pub fn context(&self, key: &str) -> Option<&serde_json::Value> {
        self.context.get(key)
    }

    /// Read-only snapshot of the full context map.
    #[must_use]
    pub fn all_context(&self) -> &HashMap<String, serde_json::Value> {
        &self.context
    }

    /// Insert one context entry; duplicate keys overwrite.
    pub fn insert_context(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.context.insert(key.into(), value.into());
    }

    /// Merge a batch of context entries; duplicate keys overwrite.
    pub fn merge_context(&mut self, entries: HashMap<String, serde_json::Value>) {
        self.context.extend(entries);
    }

    /// Record a failure under a stage's name.
    ///
    /// Each stage runs at most once per result, so the map holds at most
    /// one entry per stage name.
    pub fn record_error(&mut self, stage: impl Into<String>, reason: impl Into<String>) {
        self.errors.insert(stage.into(), reason.into());
    }

    /// Per-stage failure map (stage name → reason).
    #[must_use]
    pub fn errors(&self) -> &HashMap<String, String> {
        &self.errors
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

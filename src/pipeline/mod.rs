//! The security pipeline — ordered, short-circuiting stage execution.
//!
//! # Execution model
//!
//! 1. [`execute`](SecurityPipeline::execute) creates a fresh
//!    [`PipelineResult`] seeded with the pipeline's base context.
//! 2. Stages run sequentially in registration order.
//! 3. The first stage to mark the result failed short-circuits the chain:
//!    its name and the failure reason are recorded in the result's error
//!    map and no subsequent stage executes.
//! 4. A stage that returns a [`StageFault`] is converted into an ordinary
//!    failure at the pipeline boundary — faults never escape `execute`.
//!
//! Stage order is a policy decision with observable consequences: running
//! the length validator before the pattern sanitizer rejects oversized
//! payloads before the more expensive scan, and determines which failure
//! reason a borderline input reports.
//!
//! # Example
//!
//! ```rust,ignore
//! use promptgate::prelude::*;
//!
//! let pipeline = SecurityPipeline::new()
//!     .with_context("user", "system-admin")
//!     .add_stage(InputValidator::default())
//!     .add_stage(InputSanitizer::new());
//!
//! let result = pipeline.execute(&prompt, user_input);
//! if result.passed() {
//!     forward(prompt.content(), result.sanitized_input());
//! }
//! ```

pub mod result;
pub mod stage;

pub use result::PipelineResult;
pub use stage::{SecurityStage, StageFault};

use std::collections::HashMap;

use crate::store::TrustedPrompt;

/// An ordered chain of [`SecurityStage`]s with a base context.
///
/// # Concurrency contract
///
/// Configuration follows a single-writer-then-many-readers discipline:
/// finish all [`add_stage`](Self::add_stage) /
/// [`with_context`](Self::with_context) calls before sharing the pipeline,
/// then [`execute`](Self::execute) freely from any number of threads — each
/// call owns an independent [`PipelineResult`] and stages only read the
/// shared, effectively-immutable configuration.
#[derive(Default)]
pub struct SecurityPipeline {
    stages: Vec<Box<dyn SecurityStage>>,
    base_context: HashMap<String, serde_json::Value>,
}

impl SecurityPipeline {
    /// Create an empty pipeline.
    ///
    /// An empty pipeline trivially passes every input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage to the ordered chain.
    #[must_use]
    pub fn add_stage(mut self, stage: impl SecurityStage + 'static) -> Self {
        tracing::debug!(stage = stage.name(), "stage registered");
        self.stages.push(Box::new(stage));
        self
    }

    /// Merge one entry into the base context copied into every future result.
    ///
    /// Duplicate keys overwrite.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.base_context.insert(key.into(), value.into());
        self
    }

    /// Number of registered stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Run the stage chain against one input.
    ///
    /// Always returns a complete [`PipelineResult`]; stage-level problems are
    /// reported through [`passed`](PipelineResult::passed) /
    /// [`last_error`](PipelineResult::last_error), never as a program-level
    /// error.
    pub fn execute<'p>(&self, prompt: &'p TrustedPrompt, raw_input: &str) -> PipelineResult<'p> {
        tracing::debug!(prompt = prompt.id(), "executing security pipeline");

        let mut result = PipelineResult::new(prompt, raw_input);
        result.merge_context(self.base_context.clone());

        for stage in &self.stages {
            tracing::trace!(stage = stage.name(), "executing stage");

            if let Err(fault) = stage.process(&mut result) {
                tracing::error!(stage = stage.name(), error = %fault, "stage raised an unexpected fault");
                result.fail(format!("stage execution error: {fault}"));
            }

            if !result.passed() {
                tracing::warn!(stage = stage.name(), "security check failed");
                let reason = result.last_error().unwrap_or_default().to_string();
                result.record_error(stage.name(), reason);
                break;
            }
        }

        tracing::debug!(
            prompt = prompt.id(),
            passed = result.passed(),
            "pipeline execution completed"
        );
        result
    }
}

impl std::fmt::Debug for SecurityPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityPipeline")
            .field("stages", &self.stages.len())
            .field("base_context", &self.base_context)
            .finish()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

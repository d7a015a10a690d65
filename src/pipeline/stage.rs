//! The [`SecurityStage`] trait — the unit of work in the pipeline.
//!
//! A stage receives the invocation's mutable [`PipelineResult`] and either
//! accepts the input, rejects it by calling
//! [`fail`](super::PipelineResult::fail), or — exceptionally — returns a
//! [`StageFault`] when it could not complete its analysis at all. Rejection
//! is the expected, first-class outcome; a fault is converted into a
//! rejection at the pipeline boundary and never escapes
//! [`execute`](super::SecurityPipeline::execute).
//!
//! # Implementing a stage
//!
//! ```rust
//! use promptgate::pipeline::{PipelineResult, SecurityStage, StageFault};
//!
//! struct BlockEverything;
//!
//! impl SecurityStage for BlockEverything {
//!     fn name(&self) -> &str {
//!         "block_everything"
//!     }
//!
//!     fn process(&self, result: &mut PipelineResult<'_>) -> Result<(), StageFault> {
//!         result.fail("nothing gets through");
//!         Ok(())
//!     }
//! }
//! ```

use thiserror::Error;

use super::result::PipelineResult;

/// An unexpected fault raised inside a stage.
///
/// This is distinct from a rejection — it means the stage *could not
/// complete its analysis*. The pipeline catches it, converts it into an
/// ordinary failure on the result, and halts the chain.
#[derive(Debug, Error)]
pub enum StageFault {
    /// The input could not be processed at all (shape mismatch, limits).
    #[error("invalid input for stage '{stage}': {reason}")]
    InvalidInput {
        /// Stage identifier.
        stage: String,
        /// What went wrong.
        reason: String,
    },

    /// Catch-all for unexpected failures.
    #[error("internal error in stage '{stage}': {source}")]
    Internal {
        /// Stage identifier.
        stage: String,
        /// Underlying error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// A single composable security check.
///
/// Implementations must be safe to share across threads; `process` is called
/// with `&self` and may run concurrently for different results. The concrete
/// stage set is closed — extending it is a recompilation-time decision, not
/// a runtime one.
pub trait SecurityStage: Send + Sync {
    /// Stable identifier for this stage, used as the key in the result's
    /// error map and in log output.
    fn name(&self) -> &str;

    /// Inspect (and possibly mutate) the shared result.
    ///
    /// Mark rejection via [`PipelineResult::fail`] and return `Ok(())`.
    ///
    /// # Errors
    ///
    /// Returns [`StageFault`] only when the stage cannot complete its
    /// analysis; the pipeline converts this into a failure on the result.
    fn process(&self, result: &mut PipelineResult<'_>) -> Result<(), StageFault>;
}

// ── Tests ──────────────────────────────────────────────────────────────

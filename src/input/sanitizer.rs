//! Injection-pattern rejection and stripping stage.

use crate::pipeline::{PipelineResult, SecurityStage, StageFault};

use super::patterns::InjectionScanner;

/// Rejects inputs containing blacklisted injection patterns.
///
/// If the input is unclean the stage fails the result immediately and the
/// working `sanitized_input` is left untouched: unclean input is never
/// exposed as a sanitized value. Clean input is passed through
/// [`InjectionScanner::sanitize`], which is a no-op apart from trimming
/// leading/trailing whitespace.
#[derive(Debug, Default)]
pub struct InputSanitizer {
    scanner: InjectionScanner,
}

impl InputSanitizer {
    /// Create a sanitizer stage with a freshly compiled scanner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecurityStage for InputSanitizer {
    fn name(&self) -> &str {
        "sanitizer"
    }

    fn process(&self, result: &mut PipelineResult<'_>) -> Result<(), StageFault> {
        tracing::debug!(prompt = result.prompt().id(), "sanitizing user input");

        if !self.scanner.is_clean(result.user_input()) {
            tracing::warn!("dangerous patterns detected in user input");
            result.fail("potential prompt injection attempt detected");
            return Ok(());
        }

        let sanitized = self.scanner.sanitize(result.user_input());
        result.set_sanitized_input(sanitized);

        tracing::debug!("input sanitization passed");
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

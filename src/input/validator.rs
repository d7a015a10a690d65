//! Bounds and encoding validation stage.

use crate::pipeline::{PipelineResult, SecurityStage, StageFault};

/// Default maximum input length, in characters.
const DEFAULT_MAX_LENGTH: usize = 32_768;

/// Rejects inputs that break length, encoding, or critical-context bounds.
///
/// Checks run in order; the first failure wins:
///
/// 1. character count (not byte count) above the configured maximum;
/// 2. UTF-8 encode/decode round-trip must reproduce the input unchanged;
/// 3. for prompts carrying the `"critical"` risk sentinel, inputs containing
///    the literal `".."` or `"//"` are rejected.
///
/// The third check is a coarse path-traversal heuristic, not a parser: it
/// false-positives on legitimate double slashes (URLs, comments). That
/// over-blocking is a known, deliberately preserved limitation.
#[derive(Debug, Clone)]
pub struct InputValidator {
    max_length: usize,
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LENGTH)
    }
}

impl InputValidator {
    /// Create a validator with an explicit maximum input length.
    #[must_use]
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    /// The configured maximum input length, in characters.
    #[must_use]
    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl SecurityStage for InputValidator {
    fn name(&self) -> &str {
        "validator"
    }

    fn process(&self, result: &mut PipelineResult<'_>) -> Result<(), StageFault> {
        tracing::debug!(prompt = result.prompt().id(), "validating input");

        let char_count = result.user_input().chars().count();
        if char_count > self.max_length {
            tracing::warn!(
                length = char_count,
                max = self.max_length,
                "user input exceeds maximum length"
            );
            result.fail(format!(
                "input exceeds maximum allowed length: {char_count} > {}",
                self.max_length
            ));
            return Ok(());
        }

        if !round_trips_utf8(result.user_input()) {
            tracing::warn!("invalid character encoding detected in input");
            result.fail("invalid character encoding detected");
            return Ok(());
        }

        if result.prompt().is_critical() {
            let dangerous =
                result.user_input().contains("..") || result.user_input().contains("//");
            if dangerous {
                tracing::warn!("path traversal patterns detected in critical context");
                result.fail("dangerous patterns detected in critical prompt context");
                return Ok(());
            }
        }

        tracing::debug!("input validation passed");
        Ok(())
    }
}

/// Whether `input` survives a UTF-8 encode/decode cycle unchanged.
fn round_trips_utf8(input: &str) -> bool {
    std::str::from_utf8(input.as_bytes()).is_ok_and(|decoded| decoded == input)
}

// ── Tests ──────────────────────────────────────────────────────────────

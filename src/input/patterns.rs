//! Static blacklist for prompt injection detection.
//!
//! A fixed, compiled-in set of case-insensitive literals spanning SQL
//! keywords, script/eval markers, and shell/process markers. The
//! [`InjectionScanner`] compiles the set into an Aho-Corasick automaton for
//! O(n) multi-pattern containment checks.
//!
//! Matching is pure substring containment, not tokenized or word-boundary
//! matching: `"interexecute"` matches `"execute"`. This over-blocks on
//! legitimate text and is a known, deliberately preserved limitation.

use aho_corasick::AhoCorasick;

/// The compiled-in injection blacklist.
///
/// Ordering is significant for [`InjectionScanner::sanitize`], which strips
/// entries in list order.
pub const INJECTION_PATTERNS: [&str; 17] = [
    // SQL keywords
    "SELECT",
    "INSERT",
    "UPDATE",
    "DELETE",
    "DROP",
    // Script / eval markers
    "exec",
    "execute",
    "script",
    "javascript",
    "eval",
    // Shell / process markers
    "system",
    "os.system",
    "__import__",
    "subprocess",
    "Popen",
    "cmd.exe",
    "/bin/bash",
];

/// Case-insensitive multi-pattern scanner over [`INJECTION_PATTERNS`].
///
/// Cheap to construct, immutable afterwards, and safe to share across
/// threads; build one per sanitizer stage and reuse it for every input.
#[derive(Debug)]
pub struct InjectionScanner {
    automaton: AhoCorasick,
}

impl Default for InjectionScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl InjectionScanner {
    /// Compile the blacklist into a case-insensitive automaton.
    #[must_use]
    pub fn new() -> Self {
        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(INJECTION_PATTERNS)
            .expect("injection patterns are valid literals");
        Self { automaton }
    }

    /// True iff no blacklist entry occurs as a case-insensitive substring.
    ///
    /// Empty input is vacuously clean.
    #[must_use]
    pub fn is_clean(&self, text: &str) -> bool {
        !self.automaton.is_match(text)
    }

    /// Strip every blacklist entry present in `text`, then trim whitespace.
    ///
    /// Entries are removed in [`INJECTION_PATTERNS`] list order; removing an
    /// earlier entry can leave fragments of a later one behind (stripping
    /// `exec` out of `execute` leaves `ute`). Empty input passes through
    /// unchanged.
    #[must_use]
    pub fn sanitize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        tracing::debug!("sanitizing input");
        let mut sanitized = text.to_string();

        for pattern in INJECTION_PATTERNS {
            if find_ignore_ascii_case(&sanitized, pattern).is_some() {
                tracing::warn!(pattern, "detected potential injection pattern");
                sanitized = strip_pattern(&sanitized, pattern);
            }
        }

        sanitized.trim().to_string()
    }
}

/// Byte offset of the first case-insensitive occurrence of `needle`.
///
/// `needle` must be ASCII, which guarantees any match starts and ends on a
/// char boundary of `haystack`.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || n.len() > h.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

/// Remove all case-insensitive occurrences of an ASCII `pattern`.
fn strip_pattern(text: &str, pattern: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = find_ignore_ascii_case(rest, pattern) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + pattern.len()..];
    }
    out.push_str(rest);
    out
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_is_clean() {
        let scanner = InjectionScanner::new();
        assert!(scanner.is_clean("What are the core principles of prompt security?"));
    }

    #[test]
    fn detection_is_case_insensitive() {
        let scanner = InjectionScanner::new();
        assert!(!scanner.is_clean("select * from users"));
        assert!(!scanner.is_clean("SELECT * FROM users"));
        assert!(!scanner.is_clean("SeLeCt * FrOm users"));
    }

    #[test]
    fn every_pattern_is_detected() {
        let scanner = InjectionScanner::new();
        for pattern in INJECTION_PATTERNS {
            assert!(
                !scanner.is_clean(&format!("prefix {pattern} suffix")),
                "pattern {pattern} was not detected",
            );
        }
    }

    #[test]
    fn containment_has_no_word_boundaries() {
        let scanner = InjectionScanner::new();
        // "interexecute" contains both "exec" and "execute".
        assert!(!scanner.is_clean("interexecute"));
        // "ecosystem" contains "system".
        assert!(!scanner.is_clean("ecosystem"));
    }

    #[test]
    fn empty_input_is_vacuously_clean() {
        let scanner = InjectionScanner::new();
        assert!(scanner.is_clean(""));
        assert_eq!(scanner.sanitize(""), "");
    }

    #[test]
    fn sanitize_strips_patterns_and_trims() {
        let scanner = InjectionScanner::new();
        assert_eq!(scanner.sanitize("SELECT * FROM users"), "* FROM users");
        assert_eq!(scanner.sanitize("  run eval now  "), "run  now");
    }

    #[test]
    fn sanitize_strips_all_occurrences_case_insensitively() {
        let scanner = InjectionScanner::new();
        let out = scanner.sanitize("DROP drop DrOp");
        assert!(!out.to_lowercase().contains("drop"));
    }

    #[test]
    fn sanitize_preserves_clean_text_modulo_trim() {
        let scanner = InjectionScanner::new();
        let clean = "Please help me understand machine learning";
        assert_eq!(scanner.sanitize(clean), clean);
        assert_eq!(scanner.sanitize("  padded  "), "padded");
    }

    #[test]
    fn sanitize_is_idempotent_on_clean_text() {
        let scanner = InjectionScanner::new();
        for input in [
            "What are the core principles of prompt security?",
            "  whitespace padded question  ",
            "résumé ünïcode text",
            "",
        ] {
            let once = scanner.sanitize(input);
            let twice = scanner.sanitize(&once);
            assert_eq!(once, twice, "sanitize not idempotent for {input:?}");
        }
    }

    #[test]
    fn list_order_removal_leaves_later_fragments() {
        let scanner = InjectionScanner::new();
        // "exec" precedes "execute" in the list, so "execute" loses its
        // "exec" prefix first and the remainder "ute" survives.
        assert_eq!(scanner.sanitize("execute"), "ute");
    }

    #[test]
    fn multibyte_neighbours_survive_stripping() {
        let scanner = InjectionScanner::new();
        let out = scanner.sanitize("héllo DROP wörld");
        assert_eq!(out, "héllo  wörld");
    }
}

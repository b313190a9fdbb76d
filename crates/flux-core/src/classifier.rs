//! Diagnostic line classifier.
//!
//! Normalizes raw `gcc`-style diagnostic lines
//! (`<file>:<line>:<col>: <severity>: <text>`) into structured
//! [`ValidationIssue`] entries. Keyword matching, not a grammar: ambiguous
//! messages resolve to the first matching bucket in the rule table below.

use crate::domain::{IssueCategory, Severity, ValidationIssue};
use regex::Regex;
use std::sync::OnceLock;

/// Ordered (keywords, category) rules, evaluated top to bottom.
///
/// Undeclared is checked ahead of syntax so a message like
/// "'foo' undeclared; expected declaration" never lands in Syntax.
const CATEGORY_RULES: &[(&[&str], IssueCategory)] = &[
    (
        &["undeclared", "undefined", "not declared", "implicit declaration"],
        IssueCategory::Undeclared,
    ),
    (
        &["expected", "syntax", "parse", "stray", "unterminated"],
        IssueCategory::Syntax,
    ),
    (
        &["incompatible type", "type mismatch", "conversion", "type"],
        IssueCategory::Type,
    ),
    (&["unused", "set but not used"], IssueCategory::Unused),
    (
        &["uninitialized", "may be used", "control reaches", "return"],
        IssueCategory::Semantic,
    ),
];

fn location_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":(\d+):(\d+):").expect("valid location regex"))
}

fn suggestion_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"did you mean '([^']+)'").expect("valid suggestion regex"))
}

/// Assign a category to a diagnostic message.
///
/// Deterministic: the same message always yields the same category.
pub fn categorize(message: &str) -> IssueCategory {
    let lower = message.to_ascii_lowercase();
    for (keywords, category) in CATEGORY_RULES {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return *category;
        }
    }
    IssueCategory::Other
}

/// Parse one raw diagnostic line into a structured issue.
pub fn classify_line(raw: &str) -> ValidationIssue {
    let severity = if raw.contains("error:") {
        Severity::Error
    } else {
        Severity::Warning
    };

    // First colon-delimited numeric pair is the location.
    let (line, column) = match location_re().captures(raw) {
        Some(caps) => (
            caps.get(1).and_then(|m| m.as_str().parse().ok()),
            caps.get(2).and_then(|m| m.as_str().parse().ok()),
        ),
        None => (None, None),
    };

    // Strip everything up to and including the severity marker.
    let marker = if severity == Severity::Error {
        "error:"
    } else {
        "warning:"
    };
    let message = match raw.find(marker) {
        Some(pos) => raw[pos + marker.len()..].trim().to_string(),
        None => raw.trim().to_string(),
    };

    let mut issue = ValidationIssue {
        category: categorize(&message),
        full_message: raw.to_string(),
        message,
        severity,
        line,
        column,
        suggestion: None,
    };

    if let Some(caps) = suggestion_re().captures(raw) {
        issue.suggestion = caps.get(1).map(|m| m.as_str().to_string());
    }

    issue
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_extracts_location_and_message() {
        let issue = classify_line("main.c:12:5: error: expected ';' before 'return'");
        assert_eq!(issue.severity, Severity::Error);
        assert_eq!(issue.line, Some(12));
        assert_eq!(issue.column, Some(5));
        assert_eq!(issue.message, "expected ';' before 'return'");
        assert_eq!(issue.category, IssueCategory::Syntax);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let raw = "main.c:3:9: warning: unused variable 'x' [-Wunused-variable]";
        let a = classify_line(raw);
        let b = classify_line(raw);
        assert_eq!(a, b);
        assert_eq!(a.category, IssueCategory::Unused);
        assert_eq!(a.severity, Severity::Warning);
    }

    #[test]
    fn test_undeclared_beats_expected() {
        // Contains both "undeclared" and "expected"; must never be Syntax.
        let issue = classify_line(
            "main.c:7:5: error: 'printz' undeclared (first use in this function); expected a declaration",
        );
        assert_eq!(issue.category, IssueCategory::Undeclared);
    }

    #[test]
    fn test_type_category() {
        let issue =
            classify_line("main.c:9:12: error: incompatible type for argument 1 of 'foo'");
        assert_eq!(issue.category, IssueCategory::Type);
    }

    #[test]
    fn test_semantic_category() {
        let issue = classify_line("main.c:20:1: warning: control reaches end of non-void function");
        assert_eq!(issue.category, IssueCategory::Semantic);
    }

    #[test]
    fn test_other_category_fallback() {
        let issue = classify_line("main.c:1:1: warning: pragma ignored");
        assert_eq!(issue.category, IssueCategory::Other);
    }

    #[test]
    fn test_suggestion_surfaced() {
        let issue = classify_line(
            "main.c:7:5: error: 'printz' undeclared; did you mean 'printf'?",
        );
        assert_eq!(issue.suggestion.as_deref(), Some("printf"));
    }

    #[test]
    fn test_line_without_location() {
        let issue = classify_line("error: linker command failed");
        assert_eq!(issue.line, None);
        assert_eq!(issue.column, None);
        assert_eq!(issue.message, "linker command failed");
    }

    #[test]
    fn test_full_message_preserved() {
        let raw = "main.c:2:1: warning: unused variable 'y'";
        let issue = classify_line(raw);
        assert_eq!(issue.full_message, raw);
    }
}

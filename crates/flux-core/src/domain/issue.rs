//! Structured validation issues derived from compiler diagnostics.

use serde::{Deserialize, Serialize};

/// Severity of a validation issue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// Coarse category assigned to a diagnostic by keyword matching.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Syntax,
    Undeclared,
    Type,
    Unused,
    Semantic,
    Other,
}

/// One diagnostic line, normalized.
///
/// Derived deterministically from the raw line; carries no identity beyond
/// its fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Cleaned message with location and severity prefix stripped.
    pub message: String,

    /// Error or warning.
    pub severity: Severity,

    /// Source line (1-indexed) when the diagnostic carried one.
    pub line: Option<u32>,

    /// Source column (1-indexed) when the diagnostic carried one.
    pub column: Option<u32>,

    /// Keyword-matched category.
    pub category: IssueCategory,

    /// Compiler "did you mean" suggestion, when present.
    pub suggestion: Option<String>,

    /// The raw diagnostic line, untouched.
    pub full_message: String,
}

impl ValidationIssue {
    /// Create an issue with no location information.
    pub fn new(severity: Severity, category: IssueCategory, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            full_message: message.clone(),
            message,
            severity,
            line: None,
            column: None,
            category,
            suggestion: None,
        }
    }

    /// Attach a source location.
    pub fn with_location(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Attach a compiler suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_issue_builder() {
        let issue = ValidationIssue::new(Severity::Error, IssueCategory::Undeclared, "msg")
            .with_location(12, 5)
            .with_suggestion("printf");
        assert_eq!(issue.line, Some(12));
        assert_eq!(issue.column, Some(5));
        assert_eq!(issue.suggestion.as_deref(), Some("printf"));
        assert_eq!(issue.full_message, "msg");
    }

    #[test]
    fn test_serde_roundtrip() {
        let issue = ValidationIssue::new(Severity::Warning, IssueCategory::Unused, "unused x");
        let json = serde_json::to_string(&issue).expect("serialize");
        let back: ValidationIssue = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(issue, back);
    }

    #[test]
    fn test_category_serde_names() {
        let json = serde_json::to_string(&IssueCategory::Undeclared).expect("serialize");
        assert_eq!(json, "\"undeclared\"");
    }
}

//! Validation report assembly and rendering.
//!
//! Combines lexical pre-checks with classified compiler diagnostics into a
//! single report the orchestrator logs between repair attempts.

use crate::classifier::classify_line;
use crate::domain::{GeneratedCode, Severity, ValidationIssue};
use crate::prevalidate::prevalidate;

/// Structured view over everything wrong with a candidate source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// All issues, errors first, in discovery order within each severity.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Build a report from the last compile attempt.
    pub fn from_generated(generated: &GeneratedCode) -> Self {
        let mut issues = prevalidate(&generated.code);
        issues.extend(generated.errors.iter().map(|l| classify_line(l)));
        issues.extend(generated.warnings.iter().map(|l| classify_line(l)));
        issues.sort_by(|a, b| b.severity.cmp(&a.severity));
        Self { issues }
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    /// One-paragraph summary for log output.
    pub fn summary(&self) -> String {
        let errors = self.errors().count();
        let warnings = self.warnings().count();
        if errors == 0 && warnings == 0 {
            return "no issues found".to_string();
        }
        let mut lines = vec![format!("{} error(s), {} warning(s)", errors, warnings)];
        for issue in self.errors().take(3) {
            let loc = issue
                .line
                .map(|l| format!("line {}", l))
                .unwrap_or_else(|| "?".to_string());
            lines.push(format!("  [{}] {}", loc, issue.message));
            if let Some(suggestion) = &issue.suggestion {
                lines.push(format!("    suggestion: {}", suggestion));
            }
        }
        lines.join("\n")
    }
}

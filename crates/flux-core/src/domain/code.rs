//! Result of one compile attempt over a candidate source.

use serde::{Deserialize, Serialize};

/// Snapshot of a source string plus the diagnostics one compile produced.
///
/// Immutable: each probe attempt yields a fresh value, the previous one is
/// discarded. The orchestrator replaces the source wholesale between
/// attempts, never merges.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedCode {
    /// The candidate C source.
    pub code: String,

    /// Raw warning lines from the compiler, in emission order.
    pub warnings: Vec<String>,

    /// Raw error lines from the compiler, in emission order.
    pub errors: Vec<String>,

    /// Number of lines in `code`.
    pub line_count: usize,
}

impl GeneratedCode {
    /// Build a result from a source plus captured diagnostics.
    pub fn new(code: String, warnings: Vec<String>, errors: Vec<String>) -> Self {
        let line_count = code.lines().count();
        Self {
            code,
            warnings,
            errors,
            line_count,
        }
    }

    /// A source that produced no diagnostics at all.
    pub fn clean(code: String) -> Self {
        Self::new(code, Vec::new(), Vec::new())
    }

    /// Whether the compile produced neither errors nor warnings.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Whether any error diagnostics remain.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

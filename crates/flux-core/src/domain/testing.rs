//! Shallow test verdicts produced by the oracle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Test category. Serde names match the JSON the tool persists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TestKind {
    #[serde(rename = "UX")]
    Ux,
    #[serde(rename = "regression")]
    Regression,
    #[serde(rename = "unit")]
    Unit,
    #[serde(rename = "blackbox")]
    Blackbox,
    #[serde(rename = "A-B")]
    Ab,
}

impl TestKind {
    /// Display name, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            TestKind::Ux => "UX",
            TestKind::Regression => "regression",
            TestKind::Unit => "unit",
            TestKind::Blackbox => "blackbox",
            TestKind::Ab => "A-B",
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pass/fail verdict. Ephemeral, regenerated fresh per run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestResult {
    #[serde(rename = "type")]
    pub kind: TestKind,
    pub passed: bool,
    pub message: String,
}

impl TestResult {
    pub fn new(kind: TestKind, passed: bool, message: impl Into<String>) -> Self {
        Self {
            kind,
            passed,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serde_names() {
        assert_eq!(
            serde_json::to_string(&TestKind::Ux).expect("serialize"),
            "\"UX\""
        );
        assert_eq!(
            serde_json::to_string(&TestKind::Ab).expect("serialize"),
            "\"A-B\""
        );
    }

    #[test]
    fn test_result_serializes_kind_as_type() {
        let result = TestResult::new(TestKind::Unit, true, "Found 3 functions");
        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(json["type"], "unit");
        assert_eq!(json["passed"], true);
    }

    #[test]
    fn test_result_roundtrip() {
        let result = TestResult::new(TestKind::Blackbox, false, "Code does not compile");
        let json = serde_json::to_string(&result).expect("serialize");
        let back: TestResult = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(result, back);
    }
}

//! Circuit compilation request/result types.

use crate::domain::target::HardwareTarget;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request sent to the circuit compiler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CircuitRequest {
    /// Finalized C source.
    pub source: String,

    /// Hardware family to compile for.
    pub target: HardwareTarget,

    /// Optimization level forwarded to the compiler (0-3).
    pub optimization_level: u8,
}

impl CircuitRequest {
    pub fn new(source: impl Into<String>, target: HardwareTarget, optimization_level: u8) -> Self {
        Self {
            source: source.into(),
            target,
            optimization_level,
        }
    }
}

/// Result of a circuit compilation, real or degraded-mode mock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CircuitResult {
    /// Schematic blob (opaque text or JSON) as returned by the compiler.
    pub schematic: String,

    /// Whether the compiler reports the schematic as optimized.
    pub optimized: bool,

    /// Target the schematic was produced for.
    pub target: HardwareTarget,

    /// Free-form metadata from the compiler. Degraded-mode results set
    /// `metadata["mock"] = true` so callers never mistake them for a
    /// genuine compilation.
    pub metadata: Value,
}

impl CircuitResult {
    /// Whether this result was synthesized locally instead of compiled.
    pub fn is_mock(&self) -> bool {
        self.metadata
            .get("mock")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_real_result_is_not_mock() {
        let result = CircuitResult {
            schematic: "{}".to_string(),
            optimized: true,
            target: HardwareTarget::Fpga,
            metadata: json!({"gate_count": 42}),
        };
        assert!(!result.is_mock());
    }

    #[test]
    fn test_mock_flag_detected() {
        let result = CircuitResult {
            schematic: "{}".to_string(),
            optimized: true,
            target: HardwareTarget::Asic,
            metadata: json!({"mock": true, "note": "compiler unavailable"}),
        };
        assert!(result.is_mock());
    }

    #[test]
    fn test_request_roundtrip() {
        let request = CircuitRequest::new("int main(void){}", HardwareTarget::Gpu, 3);
        let json = serde_json::to_string(&request).expect("serialize");
        let back: CircuitRequest = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(request, back);
    }
}

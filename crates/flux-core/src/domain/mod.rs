//! Domain types for the idea-to-circuit pipeline.

pub mod circuit;
pub mod code;
pub mod error;
pub mod issue;
pub mod target;
pub mod testing;

pub use circuit::{CircuitRequest, CircuitResult};
pub use code::GeneratedCode;
pub use error::{FluxError, Result};
pub use issue::{IssueCategory, Severity, ValidationIssue};
pub use target::HardwareTarget;
pub use testing::{TestKind, TestResult};

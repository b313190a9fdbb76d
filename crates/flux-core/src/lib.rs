//! Flux Circuits core library.
//!
//! Domain types and the conversion pipeline: diagnostic classification,
//! lexical pre-validation, the local compiler probe, the shallow test
//! oracle, and the bounded validate/repair orchestrator. Network clients
//! live in `flux-clients`; this crate only defines the capability traits
//! they implement.

pub mod classifier;
pub mod domain;
pub mod oracle;
pub mod pipeline;
pub mod prevalidate;
pub mod probe;
pub mod report;
pub mod telemetry;

pub use classifier::{categorize, classify_line};
pub use domain::{
    CircuitRequest, CircuitResult, FluxError, GeneratedCode, HardwareTarget, IssueCategory,
    Result, Severity, TestKind, TestResult, ValidationIssue,
};
pub use oracle::{has_double_free, CategoryWeights, DesignCheck, OracleConfig, TestOracle};
pub use pipeline::{
    annotate, CircuitCompiler, CodeGenerator, Conversion, Pipeline, PipelineConfig,
    DEFAULT_CHARACTERISTICS,
};
pub use prevalidate::prevalidate;
pub use probe::{partition_diagnostics, CompilerProbe, LocalCompilerProbe, ProbeConfig};
pub use report::ValidationReport;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

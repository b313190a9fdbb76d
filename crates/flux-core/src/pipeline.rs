//! Conversion pipeline: idea -> C source -> circuit.
//!
//! Strictly sequential per invocation, with one internal bounded loop: the
//! validate/repair cycle that drives generated code toward a warning-free,
//! error-free state. All per-run state is an immutable [`RepairState`]
//! value threaded through the loop; nothing is shared across runs.

use crate::domain::{
    CircuitRequest, CircuitResult, FluxError, GeneratedCode, HardwareTarget, Result, TestResult,
};
use crate::oracle::{DesignCheck, OracleConfig, TestOracle};
use crate::probe::CompilerProbe;
use crate::report::ValidationReport;
use async_trait::async_trait;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Buzzword characteristics embedded in every generation prompt.
pub const DEFAULT_CHARACTERISTICS: [&str; 16] = [
    "modular",
    "fault-tolerant",
    "security",
    "atomicity",
    "concurrent",
    "parallel",
    "distributed",
    "cache coherent",
    "encrypted",
    "protocol-driven",
    "robust",
    "asynchronous",
    "producer-consumer",
    "synchronized",
    "optimized",
    "lightweight",
];

/// Capability interface for the code-generation service.
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    /// Generate C source implementing an idea.
    async fn generate_code(&self, idea: &str, characteristics: &[String]) -> Result<String>;

    /// Request a repaired source citing the given diagnostics.
    async fn improve_code(
        &self,
        source: &str,
        warnings: &[String],
        errors: &[String],
    ) -> Result<String>;
}

/// Capability interface for the circuit compiler.
#[async_trait]
pub trait CircuitCompiler: Send + Sync {
    async fn compile_to_circuit(&self, request: &CircuitRequest) -> Result<CircuitResult>;
}

/// Pipeline tuning knobs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum repair attempts before the run fails.
    pub max_retries: u32,

    /// Optimization level forwarded to the circuit compiler.
    pub optimization_level: u8,

    /// Characteristics embedded in the generation prompt.
    pub characteristics: Vec<String>,

    /// Oracle configuration (tests per line, category split).
    pub oracle: OracleConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            optimization_level: 3,
            characteristics: DEFAULT_CHARACTERISTICS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            oracle: OracleConfig::default(),
        }
    }
}

/// Immutable per-iteration repair state.
///
/// The source is single-writer: each repair response replaces it wholesale,
/// never diffed or merged.
#[derive(Debug, Clone)]
struct RepairState {
    source: String,
    attempt: u32,
    validation: GeneratedCode,
}

/// Everything a successful run produces.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Unique run identifier.
    pub run_id: Uuid,

    /// Finalized, annotated C source.
    pub source: String,

    /// Shallow test verdicts.
    pub tests: Vec<TestResult>,

    /// Design-pattern battery outcome.
    pub design: DesignCheck,

    /// Circuit compilation result (possibly degraded-mode mock).
    pub circuit: CircuitResult,

    /// Number of repair requests made.
    pub repair_attempts: u32,

    /// Wall-clock duration of the whole run.
    pub duration_ms: u64,
}

/// The conversion orchestrator.
pub struct Pipeline<'a> {
    generator: &'a dyn CodeGenerator,
    circuits: &'a dyn CircuitCompiler,
    probe: &'a dyn CompilerProbe,
    config: PipelineConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        generator: &'a dyn CodeGenerator,
        circuits: &'a dyn CircuitCompiler,
        probe: &'a dyn CompilerProbe,
        config: PipelineConfig,
    ) -> Self {
        Self {
            generator,
            circuits,
            probe,
            config,
        }
    }

    /// Run the full pipeline for one idea.
    pub async fn convert(&self, idea: &str, target: HardwareTarget) -> Result<Conversion> {
        let start = Instant::now();
        let run_id = Uuid::new_v4();
        info!(%run_id, %target, idea, "starting conversion");

        // Stage 1: generate.
        let source = self
            .generator
            .generate_code(idea, &self.config.characteristics)
            .await?;
        info!(lines = source.lines().count(), "generated initial source");

        // Stage 2: validate and repair, bounded.
        let state = self.repair_loop(source).await?;
        if !state.validation.warnings.is_empty() {
            info!(
                warnings = state.validation.warnings.len(),
                "residual warnings accepted"
            );
        }

        // Stage 3: annotate.
        let source = annotate(&state.source);

        // Stage 4: shallow tests.
        let oracle = TestOracle::new(self.config.oracle.clone());
        let tests = oracle.generate_and_run_tests(&source, self.probe).await;
        let passed = tests.iter().filter(|t| t.passed).count();
        info!(passed, total = tests.len(), "shallow test battery complete");

        // Stage 5: design-pattern battery. Failures are reported, not fatal.
        let design = oracle.check_design_patterns(&source);
        if !design.passed {
            warn!(issues = ?design.issues, "design pattern check failed");
        }

        // Stage 6: compile to circuit.
        let request = CircuitRequest::new(&source, target, self.config.optimization_level);
        let circuit = self.circuits.compile_to_circuit(&request).await?;
        if circuit.is_mock() {
            warn!("circuit result is a degraded-mode mock");
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(%run_id, duration_ms, attempts = state.attempt, "conversion finished");

        Ok(Conversion {
            run_id,
            source,
            tests,
            design,
            circuit,
            repair_attempts: state.attempt,
            duration_ms,
        })
    }

    /// Bounded validate/repair loop.
    ///
    /// Terminates when the source is clean or `max_retries` attempts are
    /// spent, whichever comes first. Residual errors at exit are fatal;
    /// residual warnings are acceptable.
    async fn repair_loop(&self, source: String) -> Result<RepairState> {
        let validation = self.probe.compile(&source).await;
        let mut state = RepairState {
            source,
            attempt: 0,
            validation,
        };

        if !state.validation.is_clean() {
            let report = ValidationReport::from_generated(&state.validation);
            info!("initial validation:\n{}", report.summary());
        }

        while !state.validation.is_clean() && state.attempt < self.config.max_retries {
            let attempt = state.attempt + 1;
            let prev_errors = state.validation.errors.len();
            let prev_warnings = state.validation.warnings.len();
            info!(
                attempt,
                max = self.config.max_retries,
                errors = prev_errors,
                warnings = prev_warnings,
                "requesting repair"
            );

            // Errors get a repair citing everything; warnings-only runs
            // cite just the warnings.
            let improved = if state.validation.has_errors() {
                self.generator
                    .improve_code(
                        &state.source,
                        &state.validation.warnings,
                        &state.validation.errors,
                    )
                    .await?
            } else {
                self.generator
                    .improve_code(&state.source, &state.validation.warnings, &[])
                    .await?
            };

            let validation = self.probe.compile(&improved).await;

            if validation.errors.len() < prev_errors {
                info!(fixed = prev_errors - validation.errors.len(), "errors fixed");
            } else if validation.errors.len() > prev_errors {
                warn!(
                    from = prev_errors,
                    to = validation.errors.len(),
                    "errors increased after repair"
                );
            }
            if validation.warnings.len() < prev_warnings {
                info!(
                    fixed = prev_warnings - validation.warnings.len(),
                    "warnings fixed"
                );
            }

            state = RepairState {
                source: improved,
                attempt,
                validation,
            };
        }

        if state.validation.has_errors() {
            let report = ValidationReport::from_generated(&state.validation);
            warn!("final validation:\n{}", report.summary());
            return Err(FluxError::UnresolvedErrors {
                attempts: state.attempt,
                errors: state.validation.errors.clone(),
            });
        }

        Ok(state)
    }
}

/// Prepend a generation banner after any leading comment block.
///
/// Idempotent: a source already carrying the banner is returned unchanged.
pub fn annotate(source: &str) -> String {
    const BANNER: &str = "/*\n * Generated by Flux Circuits.\n */";
    if source.contains("Generated by Flux Circuits") {
        return source.to_string();
    }

    let lines: Vec<&str> = source.lines().collect();
    let mut insert_at = 0;
    while insert_at < lines.len() {
        let trimmed = lines[insert_at].trim();
        if trimmed.starts_with("/*")
            || trimmed.starts_with("//")
            || trimmed.starts_with('*')
            || trimmed.is_empty()
        {
            insert_at += 1;
        } else {
            break;
        }
    }

    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 4);
    out.extend(&lines[..insert_at]);
    out.extend(BANNER.lines());
    out.push("");
    out.extend(&lines[insert_at..]);
    out.join("\n")
}

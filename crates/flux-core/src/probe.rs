//! Local compiler probe.
//!
//! Compiles a candidate source with a local C compiler and captures its
//! diagnostics. The probe never fails the pipeline: a missing or crashing
//! compiler becomes a single synthetic error entry in the result.

use crate::domain::GeneratedCode;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tempfile::Builder;
use tokio::process::Command;
use tracing::{debug, warn};

/// Capability interface for compile probing.
///
/// The orchestrator and the test oracle only see this trait, so tests can
/// substitute deterministic stand-ins without a real compiler.
#[async_trait]
pub trait CompilerProbe: Send + Sync {
    /// Compile the source and capture classified diagnostics.
    async fn compile(&self, source: &str) -> GeneratedCode;

    /// Bare compilability check used by the blackbox oracle category.
    async fn check_compiles(&self, source: &str) -> bool {
        !self.compile(source).await.has_errors()
    }
}

/// Configuration for the local probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Compiler executable to invoke.
    pub compiler: String,

    /// Scratch directory for temporary source/object files.
    pub temp_dir: PathBuf,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            compiler: "gcc".to_string(),
            temp_dir: std::env::temp_dir().join("flux-circuits"),
        }
    }
}

/// Probe backed by a local C compiler subprocess.
pub struct LocalCompilerProbe {
    config: ProbeConfig,
}

impl LocalCompilerProbe {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    /// Run one compiler invocation and return its combined output, or the
    /// spawn error message if the compiler could not be started.
    async fn invoke(
        &self,
        source_path: &std::path::Path,
        object_path: &std::path::Path,
        strict: bool,
    ) -> Result<(bool, String), String> {
        let mut cmd = Command::new(&self.config.compiler);
        cmd.arg("-Wall").arg("-Wextra");
        if strict {
            cmd.arg("-Werror");
        }
        let output = cmd
            .arg("-pedantic")
            .arg("-std=c11")
            .arg("-c")
            .arg(source_path)
            .arg("-o")
            .arg(object_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| format!("failed to invoke '{}': {}", self.config.compiler, e))?;

        let mut combined = String::from_utf8_lossy(&output.stderr).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stdout));
        Ok((output.status.success(), combined))
    }
}

#[async_trait]
impl CompilerProbe for LocalCompilerProbe {
    async fn compile(&self, source: &str) -> GeneratedCode {
        if let Err(e) = std::fs::create_dir_all(&self.config.temp_dir) {
            return GeneratedCode::new(
                source.to_string(),
                Vec::new(),
                vec![format!("cannot create temp dir: {}", e)],
            );
        }

        let temp_file = match Builder::new()
            .prefix("flux_")
            .suffix(".c")
            .tempfile_in(&self.config.temp_dir)
        {
            Ok(f) => f,
            Err(e) => {
                return GeneratedCode::new(
                    source.to_string(),
                    Vec::new(),
                    vec![format!("cannot write temp file: {}", e)],
                );
            }
        };
        if let Err(e) = std::fs::write(temp_file.path(), source) {
            return GeneratedCode::new(
                source.to_string(),
                Vec::new(),
                vec![format!("cannot write temp file: {}", e)],
            );
        }

        let object_path = temp_file.path().with_extension("o");

        // Strict first: warnings promoted to errors. If that run exits
        // non-zero without emitting any diagnostics, retry relaxed.
        let output = match self.invoke(temp_file.path(), &object_path, true).await {
            Ok((success, output)) if !success && output.trim().is_empty() => {
                debug!("strict compile produced no output, retrying without -Werror");
                match self.invoke(temp_file.path(), &object_path, false).await {
                    Ok((_, output)) => output,
                    Err(e) => {
                        return GeneratedCode::new(source.to_string(), Vec::new(), vec![e]);
                    }
                }
            }
            Ok((_, output)) => output,
            Err(e) => {
                return GeneratedCode::new(source.to_string(), Vec::new(), vec![e]);
            }
        };

        // Object file cleanup is best-effort; the source temp file cleans
        // itself up on drop.
        if let Err(e) = std::fs::remove_file(&object_path) {
            debug!("object cleanup skipped: {}", e);
        }

        let (warnings, errors) = partition_diagnostics(&output);

        if !errors.is_empty() {
            warn!(errors = errors.len(), warnings = warnings.len(), "compile produced errors");
        }

        GeneratedCode::new(source.to_string(), warnings, errors)
    }
}

/// Split combined compiler output into (warnings, errors) by the
/// "warning:" / "error:" substring convention. Lines matching neither
/// (notes, carets, snippets) are dropped.
pub fn partition_diagnostics(output: &str) -> (Vec<String>, Vec<String>) {
    let mut warnings = Vec::new();
    let mut errors = Vec::new();
    for line in output.lines() {
        if line.contains("error:") {
            errors.push(line.trim().to_string());
        } else if line.contains("warning:") {
            warnings.push(line.trim().to_string());
        }
    }
    (warnings, errors)
}

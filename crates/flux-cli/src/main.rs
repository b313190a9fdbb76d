//! Flux Circuits - convert ideas into hardware circuits via C code.
//!
//! ## Commands
//!
//! - `convert`: run the full pipeline for one idea and persist the results

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use flux_clients::{CodegenClient, FluxCircuitClient};
use flux_core::{
    Conversion, HardwareTarget, LocalCompilerProbe, Pipeline, PipelineConfig, ProbeConfig,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser)]
#[command(name = "flux-circuits")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Convert ideas into hardware circuits via C code generation", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an idea into C code and a circuit schematic
    Convert {
        /// Natural-language description of what to build
        idea: String,

        /// Hardware target: ASIC, FPGA, TPU, QPU, OPU, LPU, GPU
        target: HardwareTarget,

        /// Maximum validate/repair attempts before giving up
        #[arg(long, default_value_t = 5)]
        max_retries: u32,

        /// Directory for the generated artifacts
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        /// Local C compiler used for validation
        #[arg(long, default_value = "gcc")]
        compiler: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    flux_core::telemetry::init(cli.json, level);

    match cli.command {
        Commands::Convert {
            idea,
            target,
            max_retries,
            output_dir,
            compiler,
        } => cmd_convert(&idea, target, max_retries, &output_dir, &compiler).await,
    }
}

async fn cmd_convert(
    idea: &str,
    target: HardwareTarget,
    max_retries: u32,
    output_dir: &Path,
    compiler: &str,
) -> Result<()> {
    let generator = CodegenClient::from_env().context("code-generation client setup failed")?;
    let circuits = FluxCircuitClient::from_env();
    let probe = LocalCompilerProbe::new(ProbeConfig {
        compiler: compiler.to_string(),
        ..ProbeConfig::default()
    });

    let config = PipelineConfig {
        max_retries,
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(&generator, &circuits, &probe, config);

    let conversion = pipeline
        .convert(idea, target)
        .await
        .context("conversion pipeline failed")?;

    let files = persist_results(&conversion, output_dir)
        .context("failed to write output files")?;
    print_summary(&conversion, &files);

    Ok(())
}

struct OutputFiles {
    code: PathBuf,
    tests: PathBuf,
    circuit: PathBuf,
}

/// Write the three per-run artifacts under the output directory,
/// timestamp-named so repeated runs never clobber each other.
fn persist_results(conversion: &Conversion, output_dir: &Path) -> Result<OutputFiles> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create {}", output_dir.display()))?;

    let prefix = format!("circuit_{}", Local::now().format("%Y-%m-%dT%H-%M-%S"));

    let code = output_dir.join(format!("{prefix}_code.c"));
    std::fs::write(&code, &conversion.source)?;

    let tests = output_dir.join(format!("{prefix}_tests.json"));
    std::fs::write(&tests, serde_json::to_string_pretty(&conversion.tests)?)?;

    let circuit = output_dir.join(format!("{prefix}_circuit.json"));
    std::fs::write(&circuit, serde_json::to_string_pretty(&conversion.circuit)?)?;

    Ok(OutputFiles {
        code,
        tests,
        circuit,
    })
}

fn print_summary(conversion: &Conversion, files: &OutputFiles) {
    println!("\n{}", "=".repeat(60));
    println!("RESULTS (run {})", conversion.run_id);
    println!("{}", "=".repeat(60));

    println!("\nGenerated C code:");
    println!("{}", "-".repeat(60));
    println!("{}", conversion.source);

    println!("\nTest results:");
    println!("{}", "-".repeat(60));
    for (kind, (passed, total)) in summarize_tests(conversion) {
        println!("{}: {}/{} passed", kind, passed, total);
    }

    if !conversion.design.passed {
        println!("\nDesign pattern issues: {}", conversion.design.issues.join(", "));
    }

    println!("\nCircuit schematic:");
    println!("{}", "-".repeat(60));
    println!("{}", conversion.circuit.schematic);
    if conversion.circuit.is_mock() {
        println!("(mock result - circuit compiler was unavailable)");
    }

    println!("\nFiles saved:");
    println!("  - C code:  {}", files.code.display());
    println!("  - Tests:   {}", files.tests.display());
    println!("  - Circuit: {}", files.circuit.display());
    println!(
        "\nConversion complete in {} ms after {} repair attempt(s).",
        conversion.duration_ms, conversion.repair_attempts
    );
}

/// Aggregate pass counts per test kind, in stable name order.
fn summarize_tests(conversion: &Conversion) -> BTreeMap<&'static str, (usize, usize)> {
    let mut summary: BTreeMap<&'static str, (usize, usize)> = BTreeMap::new();
    for test in &conversion.tests {
        let entry = summary.entry(test.kind.as_str()).or_insert((0, 0));
        entry.1 += 1;
        if test.passed {
            entry.0 += 1;
        }
    }
    summary
}

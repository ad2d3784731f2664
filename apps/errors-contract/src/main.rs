//! Canonical errors contract tool
//!
//! Guards the wire contract of the canonical error taxonomy: every category's
//! Problem output is checked against approved baselines and against the
//! schemas generated from the context types.
//!
//! # Usage
//!
//! ```bash
//! # Verify converter output (exit 0 on pass, 1 on fail)
//! errors-contract verify
//!
//! # Machine-readable report
//! errors-contract verify --json
//!
//! # Accept the current output as the new baselines
//! errors-contract approve
//!
//! # Write context and Problem schemas
//! errors-contract export-schemas --out schemas
//! ```

// CLI tools are expected to print to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use canonical_errors_verify::{Verifier, VerifyConfig, export_schemas};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

/// Canonical errors contract tool
///
/// Configuration layers: defaults, then the YAML file given with `--config`,
/// then `ERRORS_CONTRACT__*` environment variables.
#[derive(Parser, Debug)]
#[command(name = "errors-contract")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check converter output against baselines and generated schemas
    Verify {
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the current converter output as the approved baselines
    Approve,
    /// Write every context schema and the Problem schema
    ExportSchemas {
        /// Output directory (overrides `schema_dir`)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Print the effective configuration and exit
    PrintConfig,
}

fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8) {
    // RUST_LOG wins over -v
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config =
        VerifyConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(
        baseline_dir = %config.baseline_dir.display(),
        schema_dir = %config.schema_dir.display(),
        include_debug = config.include_debug,
        "configuration loaded"
    );

    match cli.command {
        Commands::Verify { json } => verify(&config, json),
        Commands::Approve => approve(&config),
        Commands::ExportSchemas { out } => {
            let dir = out.unwrap_or_else(|| config.schema_dir.clone());
            let written = export_schemas(&dir)
                .with_context(|| format!("failed to export schemas to {}", dir.display()))?;
            println!(
                "{}",
                format!("\u{2713} Wrote {} schemas to {}", written.len(), dir.display()).green()
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::PrintConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn verify(config: &VerifyConfig, json: bool) -> Result<ExitCode> {
    let verifier = Verifier::from_config(config).context("failed to prepare verifier")?;
    let report = verifier.verify().with_context(|| {
        format!(
            "verification aborted (baselines at {})",
            config.baseline_dir.display()
        )
    })?;

    if json {
        println!("{}", report::render_json(&report)?);
    } else {
        report::print_human(&report, &config.baseline_dir);
    }

    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn approve(config: &VerifyConfig) -> Result<ExitCode> {
    let verifier = Verifier::from_config(config).context("failed to prepare verifier")?;
    let written = verifier.approve().with_context(|| {
        format!("failed to write baselines to {}", config.baseline_dir.display())
    })?;
    for path in &written {
        println!("  {}", path.display());
    }
    println!(
        "{}",
        format!("\u{2713} Approved {} baselines", written.len()).green()
    );
    Ok(ExitCode::SUCCESS)
}

//! Command-line entry point
//!
//! ```text
//! lead-allocator-cli run <scenario.json>   # print the run report as JSON
//! lead-allocator-cli modes                 # list allocation modes
//! ```
//!
//! Logs go to stderr, filtered by `LEAD_ALLOCATOR_LOG` (default `info`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lead_allocator_core_rs::{AllocationMode, RunReport, Scenario};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "lead-allocator-cli",
    version,
    about = "Replay a lead table against an advisor pool"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and print the run report as JSON
    Run {
        /// Path to the scenario JSON file
        scenario: PathBuf,
    },

    /// List allocation modes and their parameters
    Modes,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("LEAD_ALLOCATOR_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(path: &Path) -> Result<()> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    let scenario = Scenario::from_json_str(&json)?;
    info!(
        path = %path.display(),
        advisors = scenario.advisors.len(),
        leads = scenario.leads.len(),
        "scenario loaded"
    );

    let outcome = scenario.run().context("allocation pass failed")?;
    let report = RunReport::from_outcome(&outcome)?;
    info!(fingerprint = %report.fingerprint, "run complete");

    println!("{}", report.to_json_pretty()?);
    Ok(())
}

fn list_modes() -> Result<()> {
    let modes: Vec<serde_json::Value> = AllocationMode::ALL
        .iter()
        .map(|mode| {
            serde_json::json!({
                "id": mode.id(),
                "key": mode.key(),
                "name": mode.name(),
                "description": mode.description(),
                "parameters": mode.parameters(),
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&modes)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Run { scenario } => run(&scenario),
        Commands::Modes => list_modes(),
    }
}

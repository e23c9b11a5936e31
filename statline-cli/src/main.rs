// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Statline CLI - incremental sports data extraction from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Extract every configured season of every source
//! statline extract
//!
//! # Refresh the current NBA season only
//! statline extract --source nba --season 2024 --mode incremental
//!
//! # What has been extracted, and what is stale
//! statline status --source pwhl
//!
//! # JSON output
//! statline status --source nba --format json --pretty
//!
//! # Start over
//! statline reset --source nba
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use statline_core::CoreError;
use statline_extract::ExtractError;
use statline_sources::SourceError;
use statline_store::StoreError;

use commands::{extract, reset, sources, status};

// ============================================================================
// CLI Definition
// ============================================================================

/// Statline CLI - incremental sports data extraction.
#[derive(Parser)]
#[command(name = "statline")]
#[command(about = "Incremental, rate-limit aware sports data extraction")]
#[command(long_about = r#"
Statline pulls league data from upstream APIs into local JSON files,
remembering what it has fetched so reruns only touch what changed.

Supported sources:
  • NBA (nba)   - REST, needs a token
  • PWHL (pwhl) - GraphQL

Examples:
  statline extract                          # Every source, every season
  statline extract --source nba --season 2024
  statline extract --mode incremental       # Refresh stale current seasons
  statline status --source pwhl             # Per-entity state
  statline reset --source nba               # Forget extraction state
"#)]
#[command(version)]
#[command(author = "Statline Contributors")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to the platform config directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Root directory for manifests and outputs.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no logging, no error messages).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Extract stale entities of one or all sources.
    #[command(visible_alias = "x")]
    Extract(extract::ExtractArgs),

    /// Show recorded extraction state and staleness.
    #[command(visible_alias = "st")]
    Status(status::StatusArgs),

    /// List sources with their entities and default seasons.
    Sources,

    /// Delete a source's manifest so the next run starts over.
    Reset(reset::ResetArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// A critical failure aborted an extraction.
    Critical = 2,
    /// Bad configuration or arguments.
    Config = 3,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    pub fn for_error(error: &anyhow::Error) -> Self {
        if error.downcast_ref::<ExtractError>().is_some() {
            return Self::Critical;
        }
        if error.downcast_ref::<SourceError>().is_some()
            || error.downcast_ref::<CoreError>().is_some()
        {
            return Self::Config;
        }
        match error.downcast_ref::<StoreError>() {
            Some(StoreError::Config(_)) => Self::Config,
            _ => Self::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: &str) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("statline=debug,info")
    } else {
        EnvFilter::try_new(format!("statline={level}"))
            .unwrap_or_else(|_| EnvFilter::new("statline=warn"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version land here too, on stdout.
            let code = if e.use_stderr() {
                ExitCode::Config
            } else {
                ExitCode::Success
            };
            let _ = e.print();
            std::process::exit(code as i32);
        }
    };

    let config = match commands::load_config(&cli) {
        Ok(config) => config,
        Err(e) => exit_with(&cli, &e),
    };
    setup_logging(cli.verbose, cli.quiet, &config.general.log_level);

    let result = match &cli.command {
        Commands::Extract(args) => extract::run(args, &cli, &config).await,
        Commands::Status(args) => status::run(args, &cli, &config).await,
        Commands::Sources => sources::run(&cli, &config),
        Commands::Reset(args) => reset::run(args, &cli, &config).await,
    };

    if let Err(e) = result {
        exit_with(&cli, &e);
    }
}

fn exit_with(cli: &Cli, error: &anyhow::Error) -> ! {
    if !cli.quiet {
        eprintln!("Error: {error:#}");
    }
    std::process::exit(ExitCode::for_error(error) as i32);
}

//! Extract command - run the pipeline for one or all sources.

use anyhow::Result;
use clap::Args;
use tracing::{info, warn};

use statline_core::{ExtractOptions, ExtractionMode, SourceKind};
use statline_extract::{ExtractorBuilder, RunReport, SeasonDriver};
use statline_sources::{SourceError, SourceRegistry};
use statline_store::Config;

use crate::commands::select_sources;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the extract command.
#[derive(Args, Debug, Default)]
pub struct ExtractArgs {
    /// Source to extract (nba, pwhl, or all).
    #[arg(long, short, default_value = "all")]
    pub source: String,

    /// Season key to extract; repeatable. Defaults to the source's seasons.
    #[arg(long)]
    pub season: Vec<String>,

    /// Extraction mode (full, skip-existing, incremental).
    #[arg(long, short)]
    pub mode: Option<ExtractionMode>,

    /// Refetch entities older than this many hours.
    #[arg(long)]
    pub max_age_hours: Option<f64>,

    /// Refetch entities that were already extracted.
    #[arg(long)]
    pub no_skip_existing: bool,
}

impl ExtractArgs {
    /// Builds run options from the flags.
    ///
    /// With no flags at all this is skip-existing. An age bound without a
    /// mode refetches extracted entities older than the bound, so it turns
    /// skip-existing off.
    pub fn options(&self) -> ExtractOptions {
        let mut options = ExtractOptions {
            mode: self.mode,
            ..ExtractOptions::default()
        };
        if self.no_skip_existing {
            options = options.skip_existing(false);
        }
        if let Some(hours) = self.max_age_hours {
            options = options.max_age_hours(hours);
            if self.mode.is_none() {
                options = options.skip_existing(false);
            }
        }
        options
    }

    fn seasons(&self, kind: SourceKind, config: &Config) -> Vec<String> {
        if self.season.is_empty() {
            SourceRegistry::seasons(kind, config)
        } else {
            self.season.clone()
        }
    }
}

/// Runs the extract command.
///
/// Sources run one after another. With `--source all`, a source whose
/// token is missing is skipped; a critical failure stops everything.
pub async fn run(args: &ExtractArgs, cli: &Cli, config: &Config) -> Result<()> {
    let kinds = select_sources(&args.source)?;
    let all = kinds.len() > 1;
    let options = args.options();

    let mut reports = Vec::with_capacity(kinds.len());
    let mut failure = None;

    for kind in kinds {
        let builder = match ExtractorBuilder::from_config(kind, config) {
            Ok(builder) => builder,
            Err(e @ SourceError::MissingToken { .. }) if all => {
                warn!(source = %kind, error = %e, "Skipping source");
                continue;
            }
            Err(e) => {
                failure = Some(anyhow::Error::new(e));
                break;
            }
        };

        let seasons = args.seasons(kind, config);
        info!(source = %kind, seasons = seasons.len(), "Starting extraction");

        let driver = SeasonDriver::configured(builder.build(), config);
        match driver.run(&seasons, &options).await {
            Ok(report) => reports.push(report),
            Err(e) => {
                failure = Some(anyhow::Error::new(e));
                break;
            }
        }
    }

    print_reports(&reports, cli)?;

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn print_reports(reports: &[RunReport], cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            if cli.quiet {
                return Ok(());
            }
            let formatter = TextFormatter::new(!cli.no_color);
            for report in reports {
                println!("{}", formatter.format_run_report(report));
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&reports)?);
        }
    }
    Ok(())
}

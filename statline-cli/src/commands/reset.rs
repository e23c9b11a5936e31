//! Reset command - forget a source's extraction state.
//!
//! Only the manifest goes; output artifacts stay on disk and are simply
//! overwritten by the next run.

use anyhow::Result;
use clap::Args;

use statline_store::{Config, ManifestStore};

use crate::commands::select_sources;
use crate::output::{JsonFormatter, ResetOutput, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the reset command.
#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Source to reset (nba, pwhl, or all).
    #[arg(long, short)]
    pub source: String,
}

/// Runs the reset command.
pub async fn run(args: &ResetArgs, cli: &Cli, config: &Config) -> Result<()> {
    let data_dir = config.data_dir();
    let mut outputs = Vec::new();

    for kind in select_sources(&args.source)? {
        let store = ManifestStore::in_data_dir(kind, &data_dir);
        let deleted = store.delete().await?;
        outputs.push(ResetOutput {
            source: kind.cli_name().to_string(),
            manifest_path: store.path().display().to_string(),
            deleted,
        });
    }

    match cli.format {
        OutputFormat::Text => {
            if cli.quiet {
                return Ok(());
            }
            let formatter = TextFormatter::new(!cli.no_color);
            for output in &outputs {
                println!("{}", formatter.format_reset(output));
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&outputs)?);
        }
    }

    Ok(())
}

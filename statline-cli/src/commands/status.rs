//! Status command - show recorded extraction state.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;

use statline_core::{ExtractOptions, ExtractionManifest, ExtractionMode, SourceKind, StalenessPolicy};
use statline_extract::configured_policy;
use statline_sources::SourceRegistry;
use statline_store::{Config, ManifestStore};

use crate::commands::select_sources;
use crate::output::{
    EntityStatusOutput, JsonFormatter, SeasonStatusOutput, SourceStatusOutput, TextFormatter,
};
use crate::{Cli, OutputFormat};

/// Arguments for the status command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Source to inspect (nba, pwhl, or all).
    #[arg(long, short, default_value = "all")]
    pub source: String,

    /// Season key to inspect. Defaults to every recorded season.
    #[arg(long)]
    pub season: Option<String>,
}

/// Runs the status command.
pub async fn run(args: &StatusArgs, cli: &Cli, config: &Config) -> Result<()> {
    let data_dir = config.data_dir();
    let mut outputs = Vec::new();

    for kind in select_sources(&args.source)? {
        let store = ManifestStore::in_data_dir(kind, &data_dir);
        let manifest = store.load().await;
        let policy = configured_policy(kind, config);
        let mut output = source_status(kind, &manifest, &policy, args.season.as_deref(), Utc::now());
        output.manifest_path = store.path().display().to_string();
        outputs.push(output);
    }

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            for output in &outputs {
                println!("{}", formatter.format_status(output));
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&outputs)?);
        }
    }

    Ok(())
}

/// Builds the status view of a manifest at `now`.
///
/// Staleness is what an incremental run would decide.
pub fn source_status(
    kind: SourceKind,
    manifest: &ExtractionManifest,
    policy: &StalenessPolicy,
    season: Option<&str>,
    now: DateTime<Utc>,
) -> SourceStatusOutput {
    let descriptor = SourceRegistry::get(kind);
    let incremental = ExtractOptions::with_mode(ExtractionMode::Incremental);
    let seasons: Vec<String> = match season {
        Some(season) => vec![season.to_string()],
        None => manifest.season_keys().map(str::to_string).collect(),
    };

    let seasons = seasons
        .into_iter()
        .map(|season| {
            let entities = descriptor
                .entity_names()
                .map(|entity| {
                    let status = manifest.entity_status(&season, entity);
                    EntityStatusOutput {
                        entity: entity.to_string(),
                        extracted: status.is_some_and(|s| s.extracted),
                        count: status.map_or(0, |s| s.count),
                        timestamp: status.and_then(|s| s.timestamp),
                        duration_ms: status.and_then(|s| s.duration_ms),
                        age_minutes: status
                            .and_then(|s| s.age(now))
                            .map(|age| age.num_minutes()),
                        stale: policy.should_extract_at(status, &season, &incremental, now),
                    }
                })
                .collect();
            SeasonStatusOutput {
                phase: policy.phase(&season),
                season,
                entities,
            }
        })
        .collect();

    SourceStatusOutput {
        source: kind.cli_name().to_string(),
        display_name: kind.display_name().to_string(),
        manifest_path: String::new(),
        last_run: manifest.last_run,
        seasons,
    }
}

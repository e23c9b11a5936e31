//! Sources command - list available sources.

use anyhow::Result;
use tracing::info;

use statline_sources::{SourceDescriptor, SourceRegistry};
use statline_store::Config;

use crate::output::{EntityInfoOutput, JsonFormatter, SourceInfoOutput, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the sources command.
pub fn run(cli: &Cli, config: &Config) -> Result<()> {
    info!("Listing sources");

    let sources: Vec<SourceInfoOutput> = SourceRegistry::all()
        .iter()
        .map(|desc| source_info(desc, config))
        .collect();

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_sources_header());
            println!("{}", "─".repeat(70));
            for source in &sources {
                println!("{}", formatter.format_source_info(source));
            }
            println!();
            println!("Total: {} sources", sources.len());
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&sources)?);
        }
    }

    Ok(())
}

/// Describes a source as configured.
pub fn source_info(desc: &SourceDescriptor, config: &Config) -> SourceInfoOutput {
    let source = config.source(desc.id);
    SourceInfoOutput {
        source: desc.cli_name().to_string(),
        display_name: desc.display_name().to_string(),
        protocol: desc.protocol.to_string(),
        base_url: source
            .base_url
            .clone()
            .unwrap_or_else(|| desc.default_base_url.to_string()),
        requires_token: desc.requires_token,
        token_configured: source.resolve_token(desc.id).is_some(),
        entities: desc
            .entities
            .iter()
            .map(|spec| EntityInfoOutput {
                name: spec.name.to_string(),
                parent: spec.parent().map(str::to_string),
            })
            .collect(),
        seasons: SourceRegistry::seasons(desc.id, config),
    }
}

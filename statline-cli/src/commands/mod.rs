//! CLI command implementations.

pub mod extract;
pub mod reset;
pub mod sources;
pub mod status;

use anyhow::Result;
use statline_core::{CoreError, SourceKind};
use statline_store::Config;

use crate::Cli;

/// Loads configuration, applying command-line overrides.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(data_dir) = &cli.data_dir {
        config.general.data_dir = Some(data_dir.clone());
    }
    Ok(config)
}

/// Resolves a `--source` value: a source name, or `all`.
pub fn select_sources(name: &str) -> Result<Vec<SourceKind>, CoreError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "all" => Ok(SourceKind::all().to_vec()),
        other => other.parse().map(|kind| vec![kind]),
    }
}

//! Source registry.
//!
//! The registry provides static access to every source descriptor and is
//! the one place a configured [`SourceFetcher`] is assembled.

use std::sync::{Arc, OnceLock};

use statline_core::SourceKind;
use statline_fetch::{FetchContext, GraphQlClient};
use statline_store::{Config, default_token_env};
use tracing::debug;

use crate::calendar::LeagueCalendar;
use crate::descriptor::SourceDescriptor;
use crate::error::SourceError;
use crate::fetcher::SourceFetcher;
use crate::nba::{NbaFetcher, nba_descriptor};
use crate::pwhl::{PWHL_GRAPHQL_ENDPOINT, PwhlFetcher, pwhl_descriptor};

// ============================================================================
// Static Registry
// ============================================================================

/// Static storage for all source descriptors, in [`SourceKind::all`] order.
static DESCRIPTORS: OnceLock<[SourceDescriptor; 2]> = OnceLock::new();

fn init_descriptors() -> [SourceDescriptor; 2] {
    [nba_descriptor(), pwhl_descriptor()]
}

// ============================================================================
// Source Registry
// ============================================================================

/// Global registry of source descriptors and fetcher factory.
pub struct SourceRegistry;

impl SourceRegistry {
    /// Returns all source descriptors.
    pub fn all() -> &'static [SourceDescriptor] {
        DESCRIPTORS.get_or_init(init_descriptors)
    }

    /// Gets a source descriptor by kind.
    pub fn get(kind: SourceKind) -> &'static SourceDescriptor {
        let [nba, pwhl] = DESCRIPTORS.get_or_init(init_descriptors);
        match kind {
            SourceKind::Nba => nba,
            SourceKind::Pwhl => pwhl,
        }
    }

    /// Looks up a source by CLI name.
    pub fn get_by_cli_name(name: &str) -> Option<&'static SourceDescriptor> {
        name.parse::<SourceKind>().ok().map(Self::get)
    }

    /// Returns all source kinds.
    pub fn kinds() -> Vec<SourceKind> {
        Self::all().iter().map(|d| d.id).collect()
    }

    /// Builds a configured fetcher for a source.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingToken`] when the source needs a token
    /// and none resolves, or [`SourceError::Client`] when the HTTP client
    /// cannot be built from the configured URL and headers.
    pub fn build_fetcher(
        kind: SourceKind,
        config: &Config,
    ) -> Result<Arc<dyn SourceFetcher>, SourceError> {
        Self::build_fetcher_with(kind, config, |name| std::env::var(name).ok())
    }

    /// Like [`build_fetcher`](Self::build_fetcher) with an injected
    /// environment lookup.
    pub fn build_fetcher_with<F>(
        kind: SourceKind,
        config: &Config,
        lookup: F,
    ) -> Result<Arc<dyn SourceFetcher>, SourceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let descriptor = Self::get(kind);
        let source = config.source(kind);
        let base_url = source
            .base_url
            .clone()
            .unwrap_or_else(|| descriptor.default_base_url.to_string());

        let token = source.resolve_token_with(kind, lookup);
        if descriptor.requires_token && token.is_none() {
            return Err(SourceError::MissingToken {
                source_name: kind.cli_name().to_string(),
                env_var: default_token_env(kind),
            });
        }

        let settings = config.fetch.settings();
        let mut builder = settings
            .client_builder(base_url.clone())
            .headers(source.headers);
        if let Some(token) = token {
            builder = builder.bearer_token(token);
        }
        let client = builder.build().map_err(|error| SourceError::Client {
            source_name: kind.cli_name().to_string(),
            error,
        })?;
        let ctx = FetchContext::with_settings(settings);

        debug!(source = %kind, base_url = %base_url, protocol = %descriptor.protocol, "Fetcher built");
        Ok(match kind {
            SourceKind::Nba => Arc::new(NbaFetcher::new(client, ctx)),
            SourceKind::Pwhl => Arc::new(PwhlFetcher::new(
                GraphQlClient::new(client, PWHL_GRAPHQL_ENDPOINT),
                ctx,
            )),
        })
    }

    /// Returns the season calendar of a source, with configured overrides.
    pub fn calendar(kind: SourceKind, config: &Config) -> LeagueCalendar {
        LeagueCalendar::new(Self::get(kind).season_start_month)
            .with_overrides(config.source(kind).current_seasons)
    }

    /// Returns the seasons a run covers by default.
    ///
    /// Configured seasons win; otherwise every season from the source's
    /// first through the current one, oldest first.
    pub fn seasons(kind: SourceKind, config: &Config) -> Vec<String> {
        match config.source(kind).seasons {
            Some(seasons) if !seasons.is_empty() => seasons,
            _ => Self::calendar(kind, config).seasons_since(Self::get(kind).first_season),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

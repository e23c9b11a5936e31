//! Configuration management.
//!
//! A JSON document at `<config_dir>/statline/config.json`. Every field has
//! a default, so a missing file or a partial document is always usable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use statline_core::SourceKind;
use statline_fetch::FetchSettings;

use crate::error::StoreError;
use crate::persistence::{default_config_path, default_data_dir};

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Upstream request settings.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Extraction pacing settings.
    #[serde(default)]
    pub extract: ExtractConfig,
    /// Source-specific configurations, keyed by source name.
    #[serde(default)]
    pub sources: BTreeMap<String, SourceConfig>,
}

/// General application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Root for manifests and outputs.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Timeout and retry settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Total attempts for transient failures.
    pub max_attempts: u32,
    /// Backoff base delay in milliseconds.
    pub retry_base_delay_ms: u64,
    /// Backoff cap in milliseconds.
    pub retry_max_delay_ms: u64,
    /// Rate-limit retries after the first call.
    pub rate_limit_max_retries: u32,
    /// Rate-limit wait without a `Retry-After` hint, in milliseconds.
    pub rate_limit_default_wait_ms: u64,
    /// Upper bound on any rate-limit wait, in milliseconds.
    pub rate_limit_max_wait_ms: u64,
}

/// Pacing and concurrency settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Delay after each extracted entity, in milliseconds.
    pub request_delay_ms: u64,
    /// Delay between seasons, in milliseconds.
    pub season_delay_ms: u64,
    /// Concurrent fan-out sub-requests.
    pub fan_out_concurrency: usize,
    /// Automatic max age of current seasons in incremental mode.
    pub current_season_max_age_hours: u64,
}

/// Source-specific configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Overrides the source's base URL.
    pub base_url: Option<String>,
    /// Bearer token.
    pub token: Option<String>,
    /// Environment variable holding the bearer token.
    pub token_env: Option<String>,
    /// Extra headers sent with every request.
    pub headers: BTreeMap<String, String>,
    /// Season keys to extract, in order.
    pub seasons: Option<Vec<String>>,
    /// Season keys forced to count as current.
    pub current_seasons: Vec<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: default_log_level(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_attempts: 3,
            retry_base_delay_ms: 1_000,
            retry_max_delay_ms: 30_000,
            rate_limit_max_retries: 3,
            rate_limit_default_wait_ms: 60_000,
            rate_limit_max_wait_ms: 300_000,
        }
    }
}

impl FetchConfig {
    /// Converts to fetch-layer settings.
    pub fn settings(&self) -> FetchSettings {
        FetchSettings {
            timeout: Duration::from_secs(self.timeout_secs),
            max_attempts: self.max_attempts,
            retry_base_delay: Duration::from_millis(self.retry_base_delay_ms),
            retry_max_delay: Duration::from_millis(self.retry_max_delay_ms),
            rate_limit_max_retries: self.rate_limit_max_retries,
            rate_limit_default_wait: Duration::from_millis(self.rate_limit_default_wait_ms),
            rate_limit_max_wait: Duration::from_millis(self.rate_limit_max_wait_ms),
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 500,
            season_delay_ms: 5_000,
            fan_out_concurrency: 4,
            current_season_max_age_hours: 24,
        }
    }
}

impl ExtractConfig {
    /// Delay after each extracted entity.
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Delay between seasons.
    pub fn season_delay(&self) -> Duration {
        Duration::from_millis(self.season_delay_ms)
    }
}

impl SourceConfig {
    /// Resolves the bearer token.
    ///
    /// Precedence: explicit `token`, then the `token_env` variable, then
    /// `STATLINE_<SOURCE>_TOKEN`.
    pub fn resolve_token(&self, kind: SourceKind) -> Option<String> {
        self.resolve_token_with(kind, |name| std::env::var(name).ok())
    }

    /// Like [`resolve_token`](Self::resolve_token) with an injected
    /// environment lookup.
    pub fn resolve_token_with<F>(&self, kind: SourceKind, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = self.token.as_ref().filter(|t| !t.is_empty()) {
            return Some(token.clone());
        }
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        if let Some(var) = &self.token_env {
            if let Some(token) = non_empty(lookup(var)) {
                return Some(token);
            }
        }
        non_empty(lookup(&default_token_env(kind)))
    }
}

/// Returns the fallback token variable of a source, e.g. `STATLINE_NBA_TOKEN`.
pub fn default_token_env(kind: SourceKind) -> String {
    format!("STATLINE_{}_TOKEN", kind.cli_name().to_uppercase())
}

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path())
    }

    /// Loads configuration from a specific path.
    ///
    /// A missing file yields defaults; an unparseable or invalid one is an
    /// error.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| StoreError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Checks value ranges and source names.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.fetch.max_attempts == 0 {
            return Err(StoreError::Config(
                "fetch.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(StoreError::Config(
                "fetch.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.extract.fan_out_concurrency == 0 {
            return Err(StoreError::Config(
                "extract.fan_out_concurrency must be at least 1".to_string(),
            ));
        }
        for name in self.sources.keys() {
            name.parse::<SourceKind>()
                .map_err(|e| StoreError::Config(format!("sources.{name}: {e}")))?;
        }
        Ok(())
    }

    /// Returns the data root: configured, or the platform default.
    pub fn data_dir(&self) -> PathBuf {
        self.general
            .data_dir
            .clone()
            .unwrap_or_else(default_data_dir)
    }

    /// Returns a source's configuration, defaulted if absent.
    pub fn source(&self, kind: SourceKind) -> SourceConfig {
        self.sources
            .get(kind.cli_name())
            .cloned()
            .unwrap_or_default()
    }
}

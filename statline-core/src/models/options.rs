//! Extraction options.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ============================================================================
// Extraction Mode
// ============================================================================

/// How an extraction run decides which entities to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMode {
    /// Fetch every entity regardless of recorded state.
    Full,
    /// Fetch only entities never extracted.
    SkipExisting,
    /// Fetch unextracted entities plus stale ones, using season-aware ages.
    Incremental,
}

impl ExtractionMode {
    /// Returns the CLI name for this mode.
    pub fn cli_name(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::SkipExisting => "skip-existing",
            Self::Incremental => "incremental",
        }
    }

    /// Returns all modes.
    pub fn all() -> &'static [ExtractionMode] {
        &[Self::Full, Self::SkipExisting, Self::Incremental]
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cli_name())
    }
}

impl FromStr for ExtractionMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "skip-existing" | "skip_existing" => Ok(Self::SkipExisting),
            "incremental" => Ok(Self::Incremental),
            _ => Err(CoreError::UnknownMode(s.to_string())),
        }
    }
}

// ============================================================================
// Extract Options
// ============================================================================

/// Caller-supplied options for one extraction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractOptions {
    /// Explicit mode. Takes precedence over the other fields.
    #[serde(default)]
    pub mode: Option<ExtractionMode>,
    /// Skip already extracted entities when no mode is set (default true).
    #[serde(default)]
    pub skip_existing: Option<bool>,
    /// Explicit maximum age in hours, used when no mode is set.
    #[serde(default)]
    pub max_age_hours: Option<f64>,
}

impl ExtractOptions {
    /// Options with an explicit mode.
    pub fn with_mode(mode: ExtractionMode) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }

    /// Sets the skip-existing flag.
    #[must_use]
    pub fn skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = Some(skip);
        self
    }

    /// Sets an explicit maximum age in hours.
    #[must_use]
    pub fn max_age_hours(mut self, hours: f64) -> Self {
        self.max_age_hours = Some(hours);
        self
    }

    /// Effective skip-existing flag.
    pub fn skips_existing(&self) -> bool {
        self.skip_existing.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse_roundtrip() {
        for mode in ExtractionMode::all() {
            assert_eq!(mode.cli_name().parse::<ExtractionMode>().unwrap(), *mode);
        }
        assert!("partial".parse::<ExtractionMode>().is_err());
    }

    #[test]
    fn test_skip_existing_defaults_to_true() {
        assert!(ExtractOptions::default().skips_existing());
        assert!(!ExtractOptions::default().skip_existing(false).skips_existing());
    }
}

//! Source-related types.
//!
//! A source is one upstream sports-data provider. Every source owns a fixed,
//! dependency-ordered list of entities: producers come before the fan-out
//! entities that read their output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ============================================================================
// Source Kind
// ============================================================================

/// Supported upstream sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// NBA statistics REST API.
    Nba,
    /// PWHL statistics GraphQL API.
    Pwhl,
}

/// Entities of the NBA source, in extraction order.
const NBA_ENTITIES: &[&str] = &["teams", "players", "games", "standings", "team_details"];

/// Entities of the PWHL source, in extraction order.
const PWHL_ENTITIES: &[&str] = &["teams", "players", "schedule", "standings", "rosters"];

impl SourceKind {
    /// Returns the display name for this source.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Nba => "NBA",
            Self::Pwhl => "PWHL",
        }
    }

    /// Returns all available source kinds.
    pub fn all() -> &'static [SourceKind] {
        &[Self::Nba, Self::Pwhl]
    }

    /// Returns the CLI name for this source (lowercase, no spaces).
    ///
    /// This is also the tag stored in manifests and the directory name used
    /// for output artifacts.
    pub fn cli_name(&self) -> &'static str {
        match self {
            Self::Nba => "nba",
            Self::Pwhl => "pwhl",
        }
    }

    /// Returns the entity names of this source in dependency order.
    pub fn entities(&self) -> &'static [&'static str] {
        match self {
            Self::Nba => NBA_ENTITIES,
            Self::Pwhl => PWHL_ENTITIES,
        }
    }

    /// Returns true if `entity` is one of this source's entities.
    pub fn has_entity(&self, entity: &str) -> bool {
        self.entities().contains(&entity)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cli_name())
    }
}

impl FromStr for SourceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.cli_name() == needle)
            .ok_or_else(|| CoreError::UnknownSource(s.to_string()))
    }
}

//! PWHL GraphQL queries and record types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fetcher::RecordId;

// ============================================================================
// Queries
// ============================================================================

pub(crate) const TEAMS_QUERY: &str = r"
query Teams($season: Int!) {
  teams(season: $season) { id name code city logoUrl }
}";

pub(crate) const PLAYERS_QUERY: &str = r"
query Players($season: Int!) {
  players(season: $season) { id firstName lastName position jerseyNumber teamId birthDate }
}";

pub(crate) const SCHEDULE_QUERY: &str = r"
query Schedule($season: Int!) {
  schedule(season: $season) { id date status venue homeTeamId awayTeamId homeScore awayScore }
}";

pub(crate) const STANDINGS_QUERY: &str = r"
query Standings($season: Int!) {
  standings(season: $season) { teamId rank gamesPlayed wins otWins otLosses losses points }
}";

pub(crate) const ROSTER_QUERY: &str = r"
query Roster($season: Int!, $teamId: ID!) {
  roster(season: $season, teamId: $teamId) { teamId players { id firstName lastName position } }
}";

// ============================================================================
// Records
// ============================================================================

/// A team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PwhlTeam {
    /// Team id.
    pub id: RecordId,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PwhlPlayer {
    /// Player id.
    pub id: RecordId,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A scheduled or played game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PwhlGame {
    /// Game id.
    pub id: RecordId,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A standings row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PwhlStanding {
    /// Team the row belongs to.
    pub team_id: RecordId,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A team's roster for a season.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PwhlRoster {
    /// Team id.
    pub team_id: RecordId,
    /// Rostered players.
    pub players: Vec<PwhlPlayer>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

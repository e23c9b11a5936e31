//! NBA API response types.
//!
//! Records keep their identifying fields typed and carry everything else
//! through `extra` untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fetcher::RecordId;

// ============================================================================
// Envelopes
// ============================================================================

/// A page of a listing endpoint.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    /// Records on this page.
    pub data: Vec<T>,
    /// Pagination metadata, absent on unpaginated endpoints.
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

/// Cursor pagination metadata.
#[derive(Debug, Default, Deserialize)]
pub struct PageMeta {
    /// Cursor of the next page; `None` on the last page.
    #[serde(default)]
    pub next_cursor: Option<u64>,
    /// Page size the server applied.
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// A single-record response.
#[derive(Debug, Deserialize)]
pub struct Single<T> {
    /// The record.
    pub data: T,
}

// ============================================================================
// Records
// ============================================================================

/// A team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbaTeam {
    /// Team id.
    pub id: RecordId,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbaPlayer {
    /// Player id.
    pub id: RecordId,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbaGame {
    /// Game id.
    pub id: RecordId,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Team reference embedded in other records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRef {
    /// Team id.
    pub id: RecordId,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A standings row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbaStanding {
    /// Team the row belongs to.
    pub team: TeamRef,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_fields_survive() {
        let raw = json!({"id": 14, "full_name": "Los Angeles Lakers", "conference": "West"});
        let team: NbaTeam = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(team.id, RecordId::Number(14));
        assert_eq!(serde_json::to_value(&team).unwrap(), raw);
    }

    #[test]
    fn test_standing_requires_team_id() {
        let ok = json!({"team": {"id": 2}, "wins": 50, "losses": 32});
        assert!(serde_json::from_value::<NbaStanding>(ok).is_ok());

        let missing = json!({"team": {"name": "Celtics"}, "wins": 50});
        assert!(serde_json::from_value::<NbaStanding>(missing).is_err());
    }

    #[test]
    fn test_page_meta_is_optional() {
        let page: Page<NbaTeam> = serde_json::from_value(json!({"data": [{"id": 1}]})).unwrap();
        assert_eq!(page.data.len(), 1);
        assert!(page.meta.is_none());
    }
}

//! JSON output formatting.
//!
//! Run reports serialize as they are; the status, source and reset views
//! are defined here and shared with the text formatter.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use statline_core::SeasonPhase;

// ============================================================================
// Output Types
// ============================================================================

/// Recorded state of one source.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatusOutput {
    pub source: String,
    pub display_name: String,
    pub manifest_path: String,
    #[serde(serialize_with = "serialize_datetime")]
    pub last_run: DateTime<Utc>,
    pub seasons: Vec<SeasonStatusOutput>,
}

/// Recorded state of one season.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonStatusOutput {
    pub season: String,
    pub phase: SeasonPhase,
    pub entities: Vec<EntityStatusOutput>,
}

/// Recorded state of one entity.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStatusOutput {
    pub entity: String,
    pub extracted: bool,
    pub count: u64,
    #[serde(
        serialize_with = "serialize_datetime_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_minutes: Option<i64>,
    /// Whether an incremental run would fetch it.
    pub stale: bool,
}

/// Source listing entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfoOutput {
    pub source: String,
    pub display_name: String,
    pub protocol: String,
    pub base_url: String,
    pub requires_token: bool,
    pub token_configured: bool,
    pub entities: Vec<EntityInfoOutput>,
    pub seasons: Vec<String>,
}

/// Entity listing entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityInfoOutput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// Result of a reset.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetOutput {
    pub source: String,
    pub manifest_path: String,
    pub deleted: bool,
}

// ============================================================================
// Serialization helpers
// ============================================================================

fn serialize_datetime<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339())
}

#[allow(clippy::ref_option)]
fn serialize_datetime_opt<S>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => s.serialize_str(&dt.to_rfc3339()),
        None => s.serialize_none(),
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }
}

//! Source fetcher trait and shared record helpers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use statline_core::SourceKind;
use statline_fetch::PipelineError;

use crate::descriptor::SourceDescriptor;

// ============================================================================
// Source Fetcher Trait
// ============================================================================

/// Fetches one source's entities.
///
/// Implementations validate upstream records into typed structs and hand
/// them back as untyped JSON, fields untouched. Every upstream call runs
/// under the fetch layer's retry loops, so errors returned here have
/// already survived retries.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Returns the static descriptor of the source.
    fn descriptor(&self) -> &SourceDescriptor;

    /// Returns the source kind.
    fn kind(&self) -> SourceKind {
        self.descriptor().id
    }

    /// Fetches every record of a listing entity for a season.
    async fn fetch_entity(&self, season: &str, entity: &str) -> Result<Vec<Value>, PipelineError>;

    /// Fetches one record of a fan-out entity, keyed by a parent id.
    async fn fetch_item(&self, season: &str, entity: &str, id: &str)
    -> Result<Value, PipelineError>;
}

/// Error for an entity name the source does not serve.
pub fn unsupported_entity(kind: SourceKind, entity: &str) -> PipelineError {
    PipelineError::Parse {
        url: format!("{kind}:{entity}"),
        cause: format!("{} does not serve entity '{entity}'", kind.display_name()),
    }
}

// ============================================================================
// Records
// ============================================================================

/// Upstream record identifier, numeric or textual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Numeric id.
    Number(u64),
    /// String id.
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Reads a fan-out key from a parent record.
///
/// Returns `None` when the field is absent or not a number or string.
pub fn record_key(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Converts validated records back into untyped JSON.
pub fn to_values<T: Serialize>(url: &str, records: &[T]) -> Result<Vec<Value>, PipelineError> {
    records.iter().map(|r| to_value(url, r)).collect()
}

/// Converts one validated record back into untyped JSON.
pub fn to_value<T: Serialize>(url: &str, record: &T) -> Result<Value, PipelineError> {
    serde_json::to_value(record).map_err(|e| PipelineError::Parse {
        url: url.to_string(),
        cause: e.to_string(),
    })
}

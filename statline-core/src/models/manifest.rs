//! Extraction manifest types.
//!
//! The manifest is the persisted, per-source ledger of what has been
//! extracted:
//! - [`ExtractionManifest`] - One document per source
//! - [`SeasonManifest`] - Entity statuses for one season key
//! - [`EntityStatus`] - Extraction state of one entity
//!
//! Every mutation here is pure: methods return a new manifest and never
//! touch the receiver. Persisting the result is the caller's job.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::source::SourceKind;

/// Manifest format version understood by this build.
///
/// Documents carrying any other version are treated as unreadable.
pub const MANIFEST_VERSION: u32 = 1;

// ============================================================================
// Entity Status
// ============================================================================

/// Extraction state of a single entity within a season.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStatus {
    /// Whether the entity has been extracted.
    pub extracted: bool,
    /// Number of records persisted by the last extraction.
    pub count: u64,
    /// When the last extraction completed.
    ///
    /// Always set when `extracted` is true.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Wall time of the last extraction in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl EntityStatus {
    /// Creates the status of an entity extracted at `at`.
    pub fn completed(count: u64, duration_ms: Option<u64>, at: DateTime<Utc>) -> Self {
        Self {
            extracted: true,
            count,
            timestamp: Some(at),
            duration_ms,
        }
    }

    /// Returns the time elapsed since extraction, if a timestamp is recorded.
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.timestamp.map(|ts| now - ts)
    }
}

// ============================================================================
// Season Manifest
// ============================================================================

/// Entity statuses for one season, keyed by entity name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeasonManifest {
    entities: BTreeMap<String, EntityStatus>,
}

impl SeasonManifest {
    /// Creates a season manifest with every entity of `source` unextracted.
    pub fn unextracted(source: SourceKind) -> Self {
        let entities = source
            .entities()
            .iter()
            .map(|name| ((*name).to_string(), EntityStatus::default()))
            .collect();
        Self { entities }
    }

    /// Returns the status of an entity, if recorded.
    pub fn get(&self, entity: &str) -> Option<&EntityStatus> {
        self.entities.get(entity)
    }

    /// Returns true if the entity is recorded as extracted.
    pub fn is_extracted(&self, entity: &str) -> bool {
        self.get(entity).is_some_and(|s| s.extracted)
    }

    /// Sets the status of an entity.
    pub fn set(&mut self, entity: impl Into<String>, status: EntityStatus) {
        self.entities.insert(entity.into(), status);
    }

    /// Iterates over `(entity, status)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityStatus)> {
        self.entities.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entities recorded as extracted.
    pub fn extracted_count(&self) -> usize {
        self.entities.values().filter(|s| s.extracted).count()
    }

    /// Number of entities recorded.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if no entity is recorded.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

// ============================================================================
// Extraction Manifest
// ============================================================================

/// Persisted extraction ledger for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionManifest {
    /// Source this manifest belongs to.
    pub source: SourceKind,
    /// Season manifests keyed by season key.
    #[serde(default)]
    pub seasons: BTreeMap<String, SeasonManifest>,
    /// When the manifest was last updated.
    pub last_run: DateTime<Utc>,
    /// Manifest format version.
    pub version: u32,
}

impl ExtractionManifest {
    /// Creates an empty manifest for a source.
    pub fn new(source: SourceKind) -> Self {
        Self::empty_at(source, Utc::now())
    }

    /// Creates an empty manifest with an explicit `last_run`.
    pub fn empty_at(source: SourceKind, now: DateTime<Utc>) -> Self {
        Self {
            source,
            seasons: BTreeMap::new(),
            last_run: now,
            version: MANIFEST_VERSION,
        }
    }

    /// Returns the manifest for a season.
    ///
    /// Unseen seasons, and entities missing from a recorded season, come
    /// back as unextracted rather than as an error.
    pub fn season(&self, season: &str) -> SeasonManifest {
        let mut manifest = SeasonManifest::unextracted(self.source);
        if let Some(recorded) = self.seasons.get(season) {
            for (entity, status) in recorded.iter() {
                manifest.set(entity, status.clone());
            }
        }
        manifest
    }

    /// Returns the recorded status of an entity, if any.
    pub fn entity_status(&self, season: &str, entity: &str) -> Option<&EntityStatus> {
        self.seasons.get(season).and_then(|s| s.get(entity))
    }

    /// Returns true if the entity is recorded as extracted.
    pub fn is_extracted(&self, season: &str, entity: &str) -> bool {
        self.entity_status(season, entity).is_some_and(|s| s.extracted)
    }

    /// Returns a new manifest with `entity` marked complete at `at`.
    ///
    /// `last_run` is bumped to `at`; `self` is left untouched.
    #[must_use]
    pub fn with_completed(
        &self,
        season: &str,
        entity: &str,
        count: u64,
        duration_ms: Option<u64>,
        at: DateTime<Utc>,
    ) -> Self {
        let mut next = self.clone();
        next.seasons
            .entry(season.to_string())
            .or_default()
            .set(entity, EntityStatus::completed(count, duration_ms, at));
        next.last_run = at;
        next
    }

    /// Season keys with any recorded state, in key order.
    pub fn season_keys(&self) -> impl Iterator<Item = &str> {
        self.seasons.keys().map(String::as_str)
    }
}

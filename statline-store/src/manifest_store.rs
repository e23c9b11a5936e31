//! Persisted extraction manifests.
//!
//! [`ManifestStore`] owns one source's manifest file. Loading never fails:
//! a missing, corrupt, foreign or outdated document is logged and replaced
//! by a fresh manifest. Mutation is pure ([`ManifestStore::mark_complete`]
//! returns a new value), and the caller saves after every entity so a crash
//! loses at most the entity in flight.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use statline_core::{ExtractionManifest, MANIFEST_VERSION, SeasonManifest, SourceKind, is_stale};

use crate::error::StoreError;
use crate::persistence::{remove_file_if_exists, save_json};

/// File name of a source's manifest inside its data directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Load/save access to one source's manifest.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    source: SourceKind,
    path: PathBuf,
}

impl ManifestStore {
    /// Creates a store for a manifest at an explicit path.
    pub fn new(source: SourceKind, path: impl Into<PathBuf>) -> Self {
        Self {
            source,
            path: path.into(),
        }
    }

    /// Creates a store at `<data_dir>/<source>/manifest.json`.
    pub fn in_data_dir(source: SourceKind, data_dir: &Path) -> Self {
        Self::new(
            source,
            data_dir.join(source.cli_name()).join(MANIFEST_FILE_NAME),
        )
    }

    /// Returns the source this store belongs to.
    pub fn source(&self) -> SourceKind {
        self.source
    }

    /// Returns the manifest path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted manifest, or a fresh one if it is unusable.
    #[instrument(skip(self), fields(source = %self.source))]
    pub async fn load(&self) -> ExtractionManifest {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "No manifest found, starting fresh");
                return ExtractionManifest::new(self.source);
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Manifest unreadable, starting fresh");
                return ExtractionManifest::new(self.source);
            }
        };

        match self.parse(&content) {
            Ok(manifest) => {
                debug!(
                    path = %self.path.display(),
                    seasons = manifest.seasons.len(),
                    "Manifest loaded"
                );
                manifest
            }
            Err(reason) => {
                warn!(path = %self.path.display(), reason = %reason, "Manifest rejected, starting fresh");
                ExtractionManifest::new(self.source)
            }
        }
    }

    /// Validates a manifest document.
    fn parse(&self, content: &str) -> Result<ExtractionManifest, String> {
        let value: Value = serde_json::from_str(content).map_err(|e| format!("corrupt JSON: {e}"))?;

        match value.get("version").and_then(Value::as_u64) {
            Some(v) if v == u64::from(MANIFEST_VERSION) => {}
            Some(v) => return Err(format!("unsupported version {v}")),
            None => return Err("missing version".to_string()),
        }

        let manifest: ExtractionManifest =
            serde_json::from_value(value).map_err(|e| format!("invalid manifest: {e}"))?;

        if manifest.source != self.source {
            return Err(format!("manifest belongs to '{}'", manifest.source));
        }
        if let Some((season, entity)) = first_untimed_extraction(&manifest) {
            return Err(format!("{season}/{entity} is extracted without a timestamp"));
        }
        Ok(manifest)
    }

    /// Persists a manifest atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest belongs to another source or the
    /// file cannot be written.
    #[instrument(skip(self, manifest), fields(source = %self.source))]
    pub async fn save(&self, manifest: &ExtractionManifest) -> Result<(), StoreError> {
        if manifest.source != self.source {
            return Err(StoreError::SourceMismatch {
                expected: self.source.to_string(),
                found: manifest.source.to_string(),
            });
        }
        save_json(&self.path, manifest).await?;
        debug!(path = %self.path.display(), "Manifest saved");
        Ok(())
    }

    /// Returns a new manifest with `entity` marked complete now.
    ///
    /// The input manifest is not modified.
    #[must_use]
    pub fn mark_complete(
        &self,
        manifest: &ExtractionManifest,
        season: &str,
        entity: &str,
        count: u64,
        duration_ms: Option<u64>,
    ) -> ExtractionManifest {
        self.mark_complete_at(manifest, season, entity, count, duration_ms, Utc::now())
    }

    /// Like [`mark_complete`](Self::mark_complete) with an explicit clock.
    #[must_use]
    pub fn mark_complete_at(
        &self,
        manifest: &ExtractionManifest,
        season: &str,
        entity: &str,
        count: u64,
        duration_ms: Option<u64>,
        at: DateTime<Utc>,
    ) -> ExtractionManifest {
        manifest.with_completed(season, entity, count, duration_ms, at)
    }

    /// Returns the season manifest, defaulting unseen seasons.
    pub fn get_season_manifest(&self, manifest: &ExtractionManifest, season: &str) -> SeasonManifest {
        manifest.season(season)
    }

    /// Returns true if the entity is recorded as extracted.
    pub fn is_extracted(&self, manifest: &ExtractionManifest, season: &str, entity: &str) -> bool {
        manifest.is_extracted(season, entity)
    }

    /// Returns true if the entity is stale under `max_age`.
    pub fn is_stale(
        &self,
        manifest: &ExtractionManifest,
        season: &str,
        entity: &str,
        max_age: Option<Duration>,
    ) -> bool {
        is_stale(manifest.entity_status(season, entity), max_age, Utc::now())
    }

    /// Deletes the persisted manifest, returning whether one existed.
    #[instrument(skip(self), fields(source = %self.source))]
    pub async fn delete(&self) -> Result<bool, StoreError> {
        let existed = remove_file_if_exists(&self.path).await?;
        if existed {
            info!(path = %self.path.display(), "Manifest deleted");
        }
        Ok(existed)
    }
}

fn first_untimed_extraction(manifest: &ExtractionManifest) -> Option<(String, String)> {
    manifest.seasons.iter().find_map(|(season, entities)| {
        entities
            .iter()
            .find(|(_, status)| status.extracted && status.timestamp.is_none())
            .map(|(entity, _)| (season.clone(), entity.to_string()))
    })
}

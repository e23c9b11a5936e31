//! Per-entity output artifacts.
//!
//! One JSON array per (source, season, entity), at
//! `<root>/<source>/<season>/<entity>.json`. Fan-out entities read their
//! parent's artifact back from here rather than from memory, so a resumed
//! run sees what an earlier process wrote.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use statline_core::SourceKind;
use statline_fetch::PipelineError;

use crate::error::StoreError;
use crate::persistence::{load_json, save_json};

/// Reads and writes entity artifacts under a data root.
#[derive(Debug, Clone)]
pub struct OutputStore {
    root: PathBuf,
}

impl OutputStore {
    /// Creates a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the data root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the artifact path for an entity.
    pub fn path_for(&self, source: SourceKind, season: &str, entity: &str) -> PathBuf {
        self.root
            .join(source.cli_name())
            .join(season)
            .join(format!("{entity}.json"))
    }

    /// Writes an entity's records.
    ///
    /// # Errors
    ///
    /// Any failure maps to [`PipelineError::FileWrite`], which is always
    /// critical: a result that was not persisted must not be marked complete.
    #[instrument(skip(self, records), fields(source = %source, count = records.len()))]
    pub async fn write(
        &self,
        source: SourceKind,
        season: &str,
        entity: &str,
        records: &[Value],
    ) -> Result<PathBuf, PipelineError> {
        let path = self.path_for(source, season, entity);
        save_json(&path, &records)
            .await
            .map_err(|e| PipelineError::FileWrite {
                path: path.clone(),
                cause: e.to_string(),
            })?;
        debug!(path = %path.display(), "Output written");
        Ok(path)
    }

    /// Reads an entity's records back.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact is missing or is not a JSON array.
    pub async fn read(
        &self,
        source: SourceKind,
        season: &str,
        entity: &str,
    ) -> Result<Vec<Value>, StoreError> {
        load_json(&self.path_for(source, season, entity)).await
    }

    /// Returns true if the entity's artifact exists.
    pub async fn exists(&self, source: SourceKind, season: &str, entity: &str) -> bool {
        tokio::fs::try_exists(self.path_for(source, season, entity))
            .await
            .unwrap_or(false)
    }
}

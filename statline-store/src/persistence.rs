//! File persistence helpers.
//!
//! Handles loading and saving JSON documents with crash-safe writes.

use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::StoreError;

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the default configuration directory.
///
/// - macOS: `~/Library/Application Support/statline`
/// - Linux: `~/.config/statline`
/// - Windows: `%APPDATA%\statline`
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|c| c.join("statline"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the default data directory for manifests and outputs.
///
/// - macOS: `~/Library/Application Support/statline`
/// - Linux: `~/.local/share/statline`
/// - Windows: `%APPDATA%\statline`
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("statline"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Returns the default config file path.
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.json")
}

// ============================================================================
// File Operations
// ============================================================================

/// Saves data to a JSON file.
///
/// Creates parent directories if they don't exist and writes atomically:
/// the document goes to a sibling temp file, is flushed to disk, then
/// renamed over the target. A crash leaves either the old or the new file.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    debug!(path = %path.display(), "Saving JSON file");

    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }

    let json = serde_json::to_vec_pretty(data)?;

    let temp_path = temp_path_for(path);
    let mut file = tokio::fs::File::create(&temp_path).await?;
    file.write_all(&json).await?;
    file.sync_all().await?;
    drop(file);

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }

    debug!(path = %path.display(), bytes = json.len(), "JSON file saved");
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Loads data from a JSON file.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    debug!(path = %path.display(), "Loading JSON file");

    let content = tokio::fs::read_to_string(path).await?;
    let data = serde_json::from_str(&content)?;

    debug!(path = %path.display(), "JSON file loaded");
    Ok(data)
}

/// Ensures a directory exists.
pub async fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Creating directory");
        tokio::fs::create_dir_all(path).await?;
    }
    Ok(())
}

/// Removes a file, returning whether it existed.
pub async fn remove_file_if_exists(path: &Path) -> Result<bool, StoreError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// Tests
// ============================================================================

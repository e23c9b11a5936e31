//! Persistence round-trip and edge case tests.
//!
//! Tests file I/O operations, JSON persistence, and manifest load/save.

use chrono::{Duration, Utc};
use std::path::PathBuf;
use tempfile::TempDir;

use crate::manifest_store::ManifestStore;
use crate::persistence::{ensure_dir, load_json, save_json};
use statline_core::{ExtractionManifest, SourceKind};

fn nba_store(dir: &TempDir) -> ManifestStore {
    ManifestStore::in_data_dir(SourceKind::Nba, dir.path())
}

// ============================================================================
// JSON Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_and_load_json_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("test.json");

    let data = serde_json::json!({"teams": [1, 2, 3]});
    save_json(&file_path, &data).await.unwrap();

    let loaded: serde_json::Value = load_json(&file_path).await.unwrap();
    assert_eq!(loaded, data);
}

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let nested_path = temp_dir
        .path()
        .join("deeply")
        .join("nested")
        .join("path")
        .join("test.json");

    let data = serde_json::json!({"key": "value"});

    let result = save_json(&nested_path, &data).await;
    assert!(result.is_ok());
    assert!(nested_path.exists());
}

#[tokio::test]
async fn test_save_leaves_no_temp_file() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("out.json");

    save_json(&file_path, &serde_json::json!([])).await.unwrap();

    let names: Vec<String> = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["out.json".to_string()]);
}

#[tokio::test]
async fn test_save_overwrites_existing_file() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("out.json");

    save_json(&file_path, &serde_json::json!({"v": 1})).await.unwrap();
    save_json(&file_path, &serde_json::json!({"v": 2})).await.unwrap();

    let loaded: serde_json::Value = load_json(&file_path).await.unwrap();
    assert_eq!(loaded["v"], 2);
}

#[tokio::test]
async fn test_load_nonexistent_file() {
    let file_path = PathBuf::from("/nonexistent/path/data.json");

    let result: Result<serde_json::Value, _> = load_json(&file_path).await;
    assert!(result.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_ensure_dir_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let dir_path = temp_dir.path().join("test_dir");

    ensure_dir(&dir_path).await.unwrap();
    ensure_dir(&dir_path).await.unwrap();

    assert!(dir_path.is_dir());
}

// ============================================================================
// Manifest Store Tests
// ============================================================================

#[tokio::test]
async fn test_manifest_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let store = nba_store(&temp_dir);

    let manifest = ExtractionManifest::new(SourceKind::Nba);
    let manifest = store.mark_complete(&manifest, "2024", "teams", 30, Some(210));
    let manifest = store.mark_complete(&manifest, "2024", "players", 530, None);
    let manifest = store.mark_complete(&manifest, "2023", "standings", 30, Some(95));
    store.save(&manifest).await.unwrap();

    let loaded = store.load().await;
    assert_eq!(loaded, manifest);
}

#[tokio::test]
async fn test_manifest_missing_file_is_fresh() {
    let temp_dir = TempDir::new().unwrap();
    let store = nba_store(&temp_dir);

    let manifest = store.load().await;
    assert_eq!(manifest.source, SourceKind::Nba);
    assert!(manifest.seasons.is_empty());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_manifest_corrupt_file_is_fresh() {
    let temp_dir = TempDir::new().unwrap();
    let store = nba_store(&temp_dir);
    ensure_dir(store.path().parent().unwrap()).await.unwrap();
    tokio::fs::write(store.path(), "{\"source\": \"nba\", \"seasons\": [")
        .await
        .unwrap();

    let manifest = store.load().await;
    assert_eq!(manifest.source, SourceKind::Nba);
    assert!(manifest.seasons.is_empty());
}

#[tokio::test]
async fn test_manifest_unknown_version_is_fresh() {
    let temp_dir = TempDir::new().unwrap();
    let store = nba_store(&temp_dir);

    let mut document = serde_json::to_value(
        ExtractionManifest::new(SourceKind::Nba).with_completed("2024", "teams", 30, None, Utc::now()),
    )
    .unwrap();
    document["version"] = serde_json::json!(99);
    save_json(store.path(), &document).await.unwrap();

    let manifest = store.load().await;
    assert!(!manifest.is_extracted("2024", "teams"));
}

#[tokio::test]
async fn test_manifest_foreign_source_is_fresh() {
    let temp_dir = TempDir::new().unwrap();
    let store = nba_store(&temp_dir);

    let foreign = ExtractionManifest::new(SourceKind::Pwhl)
        .with_completed("2024", "rosters", 140, None, Utc::now());
    save_json(store.path(), &foreign).await.unwrap();

    let manifest = store.load().await;
    assert_eq!(manifest.source, SourceKind::Nba);
    assert!(manifest.seasons.is_empty());
}

#[tokio::test]
async fn test_manifest_save_rejects_foreign_source() {
    let temp_dir = TempDir::new().unwrap();
    let store = nba_store(&temp_dir);

    let result = store.save(&ExtractionManifest::new(SourceKind::Pwhl)).await;
    assert!(result.is_err());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_manifest_is_stale_uses_recorded_age() {
    let temp_dir = TempDir::new().unwrap();
    let store = nba_store(&temp_dir);
    let manifest = ExtractionManifest::new(SourceKind::Nba).with_completed(
        "2024",
        "teams",
        30,
        None,
        Utc::now() - Duration::hours(30),
    );

    assert!(store.is_stale(&manifest, "2024", "teams", Some(Duration::hours(24))));
    assert!(!store.is_stale(&manifest, "2024", "teams", Some(Duration::hours(48))));
    assert!(!store.is_stale(&manifest, "2024", "teams", None));
}

#[tokio::test]
async fn test_manifest_delete() {
    let temp_dir = TempDir::new().unwrap();
    let store = nba_store(&temp_dir);

    store.save(&ExtractionManifest::new(SourceKind::Nba)).await.unwrap();
    assert!(store.delete().await.unwrap());
    assert!(!store.path().exists());
    assert!(!store.delete().await.unwrap());
}

// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Statline Store
//!
//! Everything Statline persists.
//!
//! This crate provides:
//!
//! - **ManifestStore**: Per-source extraction ledger, crash-tolerant
//! - **OutputStore**: One JSON artifact per source, season and entity
//! - **Config**: File-backed configuration with defaults
//! - **Persistence**: Atomic JSON file helpers
//!
//! ## Usage
//!
//! ```ignore
//! use statline_core::SourceKind;
//! use statline_store::ManifestStore;
//!
//! let store = ManifestStore::in_data_dir(SourceKind::Nba, &data_dir);
//! let manifest = store.load().await;
//! let manifest = store.mark_complete(&manifest, "2024", "teams", 30, Some(412));
//! store.save(&manifest).await?;
//! ```

pub mod config;
pub mod error;
pub mod manifest_store;
pub mod output;
pub mod persistence;

pub use config::{Config, ExtractConfig, FetchConfig, GeneralConfig, SourceConfig, default_token_env};
pub use error::StoreError;
pub use manifest_store::{MANIFEST_FILE_NAME, ManifestStore};
pub use output::OutputStore;
pub use persistence::{
    default_config_dir, default_config_path, default_data_dir, ensure_dir, load_json, save_json,
};
#[cfg(test)]
mod persistence_tests;

// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Statline Core
//!
//! Core types, models, and decision logic for the Statline extraction
//! pipeline.
//!
//! This crate is pure: nothing in it touches the network or the filesystem.
//! It provides:
//!
//! - Domain models (sources, manifests, extraction options)
//! - The [`SeasonCalendar`] trait consulted for season-aware staleness
//! - The [`StalenessPolicy`] deciding whether an entity should be fetched
//! - Error types
//!
//! ## Key Types
//!
//! ### Sources
//! - [`SourceKind`] - Enum of all supported upstream sources
//!
//! ### Manifest
//! - [`ExtractionManifest`] - Per-source ledger of extraction state
//! - [`SeasonManifest`] - Entity statuses for one season
//! - [`EntityStatus`] - Extraction state of one entity
//!
//! ### Options
//! - [`ExtractionMode`] - `full`, `skip-existing` or `incremental`
//! - [`ExtractOptions`] - Mode plus explicit staleness overrides
//!
//! ### Seasons
//! - [`SeasonPhase`] - Whether a season is still updating
//! - [`StaticCalendar`] - Fixed set of current seasons

pub mod error;
pub mod models;
pub mod staleness;
pub mod traits;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Sources
    SourceKind,
    // Manifest
    EntityStatus,
    ExtractionManifest,
    MANIFEST_VERSION,
    SeasonManifest,
    // Options
    ExtractOptions,
    ExtractionMode,
    // Seasons
    SeasonPhase,
    StaticCalendar,
};

// Re-export policy and traits
pub use staleness::{is_stale, StalenessPolicy, DEFAULT_CURRENT_SEASON_MAX_AGE_HOURS};
pub use traits::SeasonCalendar;

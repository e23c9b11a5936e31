// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Statline Sources
//!
//! Source-specific implementations for the Statline extraction pipeline.
//!
//! Each source module includes:
//!
//! - **Descriptor**: Static configuration (protocol, endpoint, entity plan)
//! - **API types**: Typed records that keep unknown fields
//! - **Fetcher**: A [`SourceFetcher`] running every call under retries
//!
//! ## Supported Sources
//!
//! | Source | Protocol | Auth | Season start | Fan-out |
//! |--------|----------|------|--------------|---------|
//! | NBA | REST | Bearer (required) | October | `team_details` over `teams` |
//! | PWHL | GraphQL | Bearer (optional) | November | `rosters` over `teams` |
//!
//! ## Usage
//!
//! ```ignore
//! use statline_core::SourceKind;
//! use statline_sources::SourceRegistry;
//! use statline_store::Config;
//!
//! let config = Config::load()?;
//! let fetcher = SourceRegistry::build_fetcher(SourceKind::Pwhl, &config)?;
//! let teams = fetcher.fetch_entity("2024", "teams").await?;
//! ```

pub mod calendar;
pub mod descriptor;
pub mod error;
pub mod fetcher;
pub mod registry;

// Source modules (alphabetical)
pub mod nba;
pub mod pwhl;

// Re-export key types
pub use calendar::{LeagueCalendar, season_key_for};
pub use descriptor::{EntityKind, EntitySpec, Protocol, SourceDescriptor};
pub use error::SourceError;
pub use fetcher::{RecordId, SourceFetcher, record_key, unsupported_entity};
pub use registry::SourceRegistry;

// Re-export source entry points
pub use nba::{NbaFetcher, nba_descriptor};
pub use pwhl::{PwhlFetcher, pwhl_descriptor};

// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Statline Extract
//!
//! Season orchestration for the Statline pipeline.
//!
//! ## Flow
//!
//! For each entity of a season, in dependency order:
//!
//! 1. Ask the [`StalenessPolicy`](statline_core::StalenessPolicy) whether to fetch
//! 2. Fetch through the source (both retry loops apply per request)
//! 3. Classify a surviving failure: critical aborts the season, anything
//!    else is recorded as an empty result
//! 4. Write the output artifact
//! 5. Mark the manifest and save it
//! 6. Pause before the next entity
//!
//! Fan-out entities read their parent's artifact from disk and fetch one
//! item per id under a concurrency bound.
//!
//! ## Usage
//!
//! ```ignore
//! use statline_core::{ExtractOptions, ExtractionMode, SourceKind};
//! use statline_extract::{ExtractorBuilder, SeasonDriver};
//!
//! let extractor = ExtractorBuilder::from_config(SourceKind::Nba, &config)?.build();
//! let driver = SeasonDriver::configured(extractor, &config);
//! let report = driver
//!     .run(&seasons, &ExtractOptions::with_mode(ExtractionMode::Incremental))
//!     .await?;
//! ```

pub mod driver;
pub mod error;
pub mod extractor;
pub mod fanout;
pub mod report;

pub use driver::{DEFAULT_SEASON_DELAY, SeasonDriver};
pub use error::ExtractError;
pub use extractor::{
    DEFAULT_FAN_OUT_CONCURRENCY, DEFAULT_REQUEST_DELAY, ExtractorBuilder, SourceExtractor,
    configured_policy,
};
pub use fanout::{FanOutResult, fan_out};
pub use report::{EntityOutcome, EntityReport, RunReport, SeasonReport};

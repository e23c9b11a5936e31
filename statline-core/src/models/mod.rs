//! Domain models for Statline.
//!
//! ## Submodules
//!
//! - [`source`] - Source kinds and their entity lists
//! - [`manifest`] - Extraction ledger (ExtractionManifest, SeasonManifest, EntityStatus)
//! - [`options`] - Extraction modes and options
//! - [`season`] - Season phases and a static calendar

mod manifest;
mod options;
mod season;
mod source;

// Re-export everything at the models level
pub use manifest::{EntityStatus, ExtractionManifest, MANIFEST_VERSION, SeasonManifest};
pub use options::{ExtractOptions, ExtractionMode};
pub use season::{SeasonPhase, StaticCalendar};
pub use source::SourceKind;

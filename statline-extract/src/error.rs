//! Extraction error types.

use thiserror::Error;

use statline_fetch::PipelineError;
use statline_store::StoreError;

/// Errors that abort a season.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A critical fetch or write failure.
    #[error("Critical failure in {source_name} {season}/{entity}: {error}")]
    Critical {
        /// Source CLI name.
        source_name: String,
        /// Season key.
        season: String,
        /// Entity being extracted.
        entity: String,
        /// The classified error.
        #[source]
        error: PipelineError,
    },

    /// A fan-out entity's parent output is missing or unreadable.
    #[error("{source_name} {season}/{entity} needs '{parent}' output, which cannot be read: {error}")]
    MissingDependency {
        /// Source CLI name.
        source_name: String,
        /// Season key.
        season: String,
        /// Fan-out entity.
        entity: String,
        /// Entity whose output supplies the ids.
        parent: String,
        /// Read failure.
        #[source]
        error: StoreError,
    },
}

impl ExtractError {
    /// Returns the season that was aborted.
    pub fn season(&self) -> &str {
        match self {
            Self::Critical { season, .. } | Self::MissingDependency { season, .. } => season,
        }
    }

    /// Returns the entity that failed.
    pub fn entity(&self) -> &str {
        match self {
            Self::Critical { entity, .. } | Self::MissingDependency { entity, .. } => entity,
        }
    }

    /// Returns the underlying pipeline error, if any.
    pub fn pipeline_error(&self) -> Option<&PipelineError> {
        match self {
            Self::Critical { error, .. } => Some(error),
            Self::MissingDependency { .. } => None,
        }
    }
}

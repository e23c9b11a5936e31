//! Error severity classification.
//!
//! Systemic failures abort the current season: the upstream is down or
//! unreachable, rate limiting outlasted every retry, or output cannot be
//! written. Isolated data defects are recoverable, and the entity is
//! recorded with an empty result so the season continues.

use std::fmt;

use serde::Serialize;

use crate::error::PipelineError;

/// Severity of a failure that survived both retry loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Abort the season.
    Critical,
    /// Log, record an empty result, continue.
    Recoverable,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::Recoverable => write!(f, "recoverable"),
        }
    }
}

/// Classifies an error.
///
/// Critical: network and timeout failures, HTTP 5xx, rate limits that
/// reach this point (retries exhausted), output write failures.
/// Recoverable: HTTP 4xx and any other status, malformed or mis-shaped
/// bodies, GraphQL errors.
pub fn classify(error: &PipelineError) -> Severity {
    match error {
        PipelineError::Network { .. }
        | PipelineError::Timeout { .. }
        | PipelineError::RateLimit { .. }
        | PipelineError::FileWrite { .. } => Severity::Critical,
        PipelineError::Http { status_code, .. } => {
            if *status_code >= 500 {
                Severity::Critical
            } else {
                Severity::Recoverable
            }
        }
        PipelineError::Parse { .. } | PipelineError::GraphQl { .. } => Severity::Recoverable,
    }
}

/// Returns true if the error should abort the current season.
pub fn is_critical(error: &PipelineError) -> bool {
    classify(error) == Severity::Critical
}

impl PipelineError {
    /// Returns true if the error should abort the current season.
    pub fn is_critical(&self) -> bool {
        is_critical(self)
    }
}

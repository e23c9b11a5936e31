//! Core error types for Statline.

use thiserror::Error;

/// Core error type for Statline operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Source name not recognized.
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// Extraction mode not recognized.
    #[error("Unknown extraction mode: {0}")]
    UnknownMode(String),
}

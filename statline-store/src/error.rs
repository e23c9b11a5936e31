//! Store error types.

use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A manifest was handed to the store of another source.
    #[error("Manifest for '{found}' cannot be saved by the '{expected}' store")]
    SourceMismatch {
        /// Source the store belongs to.
        expected: String,
        /// Source tag of the rejected manifest.
        found: String,
    },
}

impl StoreError {
    /// Returns true if the error is a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

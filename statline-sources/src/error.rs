//! Source setup errors.

use thiserror::Error;

use statline_fetch::ClientError;

/// Errors assembling a source from configuration.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source needs a token and none resolved.
    #[error("No token for {source_name}: set sources.{source_name}.token, token_env, or {env_var}")]
    MissingToken {
        /// Source CLI name.
        source_name: String,
        /// Fallback environment variable checked last.
        env_var: String,
    },

    /// The HTTP client could not be built.
    #[error("Client setup failed for {source_name}: {error}")]
    Client {
        /// Source CLI name.
        source_name: String,
        /// Underlying error.
        #[source]
        error: ClientError,
    },
}

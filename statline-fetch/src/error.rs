//! Fetch error types.
//!
//! [`PipelineError`] is the closed taxonomy every upstream failure is mapped
//! into. Adding a variant forces [`crate::classify`] to decide whether it is
//! critical, since that match has no wildcard arm.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Pipeline Error
// ============================================================================

/// Error type for a single upstream fetch, or for persisting its result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Connection-level failure (DNS, refused, reset, TLS).
    #[error("Network error for {url}: {cause}")]
    Network {
        /// Requested URL.
        url: String,
        /// Underlying cause.
        cause: String,
    },

    /// Request exceeded its timeout.
    #[error("Request to {url} timed out after {timeout_ms} ms")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// Non-2xx status other than 429, or a body that is not JSON.
    #[error("HTTP {status_code} from {method} {url}{kind}")]
    Http {
        /// Requested URL.
        url: String,
        /// HTTP method.
        method: String,
        /// Response status code.
        status_code: u16,
        /// What went wrong.
        kind: HttpErrorKind,
    },

    /// Server signaled rate limiting (HTTP 429).
    #[error("Rate limited by {url}{}", retry_hint(*.retry_after_ms))]
    RateLimit {
        /// Requested URL.
        url: String,
        /// Server-requested wait from `Retry-After`, in milliseconds.
        retry_after_ms: Option<u64>,
    },

    /// Well-formed JSON that does not match the expected shape.
    #[error("Unexpected response shape from {url}: {cause}")]
    Parse {
        /// Requested URL.
        url: String,
        /// Validation failure.
        cause: String,
    },

    /// HTTP 200 carrying a GraphQL `errors` array.
    #[error("GraphQL errors from {url}: {}", .messages.join("; "))]
    GraphQl {
        /// Requested URL.
        url: String,
        /// Error messages reported by the server.
        messages: Vec<String>,
    },

    /// A fetched result could not be persisted.
    #[error("Failed to write {}: {cause}", .path.display())]
    FileWrite {
        /// Output path.
        path: PathBuf,
        /// Underlying cause.
        cause: String,
    },
}

fn retry_hint(retry_after_ms: Option<u64>) -> String {
    retry_after_ms
        .map(|ms| format!(", retry after {ms} ms"))
        .unwrap_or_default()
}

/// Subtype of [`PipelineError::Http`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpErrorKind {
    /// The status code itself was the failure.
    Status,
    /// Successful status, but the body was not valid JSON.
    MalformedBody {
        /// JSON parser message.
        cause: String,
    },
}

impl fmt::Display for HttpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status => Ok(()),
            Self::MalformedBody { cause } => write!(f, ": malformed JSON body ({cause})"),
        }
    }
}

impl PipelineError {
    /// Returns the URL (or output path) the error refers to.
    pub fn location(&self) -> String {
        match self {
            Self::Network { url, .. }
            | Self::Timeout { url, .. }
            | Self::Http { url, .. }
            | Self::RateLimit { url, .. }
            | Self::Parse { url, .. }
            | Self::GraphQl { url, .. } => url.clone(),
            Self::FileWrite { path, .. } => path.display().to_string(),
        }
    }

    /// Short, stable name of the error kind (for logs and reports).
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Timeout { .. } => "timeout",
            Self::Http { .. } => "http",
            Self::RateLimit { .. } => "rate_limit",
            Self::Parse { .. } => "parse",
            Self::GraphQl { .. } => "graphql",
            Self::FileWrite { .. } => "file_write",
        }
    }

    /// Returns true for failures the transient retry loop handles.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }

    /// Returns true for server-signaled rate limiting.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimit { .. })
    }

    /// Returns the server-requested wait of a rate-limit error.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimit {
                retry_after_ms: Some(ms),
                ..
            } => Some(Duration::from_millis(*ms)),
            _ => None,
        }
    }
}

// ============================================================================
// Client Build Error
// ============================================================================

/// Error building a fetch client from configuration.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Base URL could not be parsed.
    #[error("Invalid base URL '{url}': {cause}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Parser message.
        cause: String,
    },

    /// A configured header name or value is invalid.
    #[error("Invalid header '{0}'")]
    InvalidHeader(String),

    /// The underlying HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Build(#[from] reqwest::Error),
}

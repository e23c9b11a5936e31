//! Fetch settings and the retrying call context.
//!
//! [`FetchContext`] is handed to every source fetcher; each upstream call
//! goes through [`FetchContext::call`], which applies both retry loops.

use std::future::Future;
use std::time::Duration;

use crate::client::{DEFAULT_TIMEOUT, FetchClient, FetchClientBuilder};
use crate::error::PipelineError;
use crate::retry::{
    DEFAULT_MAX_RATE_LIMIT_WAIT, DEFAULT_RATE_LIMIT_WAIT, RateLimitPolicy, RetryPolicy,
    with_retries,
};

// ============================================================================
// Fetch Settings
// ============================================================================

/// Settings for fetch operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// Timeout for a single request.
    pub timeout: Duration,
    /// Total attempts for transient failures, including the first.
    pub max_attempts: u32,
    /// Backoff base delay.
    pub retry_base_delay: Duration,
    /// Backoff delay cap.
    pub retry_max_delay: Duration,
    /// Rate-limit retries after the first call.
    pub rate_limit_max_retries: u32,
    /// Wait when a 429 carries no `Retry-After`.
    pub rate_limit_default_wait: Duration,
    /// Upper bound on any single rate-limit wait.
    pub rate_limit_max_wait: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_attempts: 3,
            retry_base_delay: Duration::from_secs(1),
            retry_max_delay: Duration::from_secs(30),
            rate_limit_max_retries: 3,
            rate_limit_default_wait: DEFAULT_RATE_LIMIT_WAIT,
            rate_limit_max_wait: DEFAULT_MAX_RATE_LIMIT_WAIT,
        }
    }
}

impl FetchSettings {
    /// Settings with no retries and no waits, for tests.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            retry_base_delay: Duration::ZERO,
            retry_max_delay: Duration::ZERO,
            rate_limit_max_retries: 0,
            rate_limit_default_wait: Duration::ZERO,
            rate_limit_max_wait: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the transient retry policy.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts)
            .with_base_delay(self.retry_base_delay)
            .with_max_delay(self.retry_max_delay)
    }

    /// Returns the rate-limit retry policy.
    pub fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(self.rate_limit_max_retries)
            .with_default_wait(self.rate_limit_default_wait)
            .with_max_wait(self.rate_limit_max_wait)
    }

    /// Starts a client builder with these settings applied.
    pub fn client_builder(&self, base_url: impl Into<String>) -> FetchClientBuilder {
        FetchClient::builder(base_url).timeout(self.timeout)
    }
}

// ============================================================================
// Fetch Context
// ============================================================================

/// Retry policies shared by every call a source makes.
#[derive(Debug, Clone)]
pub struct FetchContext {
    settings: FetchSettings,
    transient: RetryPolicy,
    rate_limit: RateLimitPolicy,
}

impl FetchContext {
    /// Creates a context with default settings.
    pub fn new() -> Self {
        Self::with_settings(FetchSettings::default())
    }

    /// Creates a context from settings.
    pub fn with_settings(settings: FetchSettings) -> Self {
        Self {
            transient: settings.retry_policy(),
            rate_limit: settings.rate_limit_policy(),
            settings,
        }
    }

    /// Returns the settings.
    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Runs one upstream call under both retry loops.
    pub async fn call<F, Fut, T>(&self, operation: F) -> Result<T, PipelineError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, PipelineError>>,
    {
        with_retries(&self.transient, &self.rate_limit, operation).await
    }
}

impl Default for FetchContext {
    fn default() -> Self {
        Self::new()
    }
}

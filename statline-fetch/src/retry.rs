//! Retry loops for upstream requests.
//!
//! Two independent loops wrap every fetch:
//!
//! - [`RetryPolicy`] retries transient failures (network, timeout) with
//!   exponential backoff. It never retries anything else.
//! - [`RateLimitPolicy`] retries HTTP 429 responses, waiting for the server's
//!   `Retry-After` hint or a default, always clamped to a maximum wait.
//!
//! [`with_retries`] composes them with the rate-limit loop outermost, so a
//! rate-limited call re-enters the transient loop with a fresh budget.

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::PipelineError;

/// Default wait when a 429 carries no usable `Retry-After`.
pub const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);

/// Default upper bound on any single rate-limit wait.
pub const DEFAULT_MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(300);

// ============================================================================
// Transient Retry
// ============================================================================

/// Exponential backoff for transient failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Cap on any single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the given total attempt budget.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Sets the base delay.
    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Sets the maximum delay.
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Calculates the delay after a given failed attempt (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Runs `operation`, retrying transient failures.
    ///
    /// Non-transient errors, including rate limits, are returned after the
    /// first attempt. Once the budget is spent the last error is returned.
    pub async fn run<F, Fut, T>(&self, operation: F) -> Result<T, PipelineError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, PipelineError>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        info!(attempts = attempt, "Request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) if error.is_transient() && attempt < self.max_attempts => {
                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        error = %error,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

// ============================================================================
// Rate-Limit Retry
// ============================================================================

/// Waits out HTTP 429 responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Retries after the first call (total calls is this plus one).
    pub max_retries: u32,
    /// Wait used when the server gives no hint.
    pub default_wait: Duration,
    /// Upper bound on any single wait, whatever the server asks for.
    pub max_wait: Duration,
}

impl RateLimitPolicy {
    /// Creates a policy with default waits.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            default_wait: DEFAULT_RATE_LIMIT_WAIT,
            max_wait: DEFAULT_MAX_RATE_LIMIT_WAIT,
        }
    }

    /// Sets the default wait.
    #[must_use]
    pub fn with_default_wait(mut self, wait: Duration) -> Self {
        self.default_wait = wait;
        self
    }

    /// Sets the maximum wait.
    #[must_use]
    pub fn with_max_wait(mut self, wait: Duration) -> Self {
        self.max_wait = wait;
        self
    }

    /// Returns the wait for a rate-limit error: the server hint or the
    /// default, clamped to `max_wait`.
    pub fn wait_for(&self, retry_after: Option<Duration>) -> Duration {
        retry_after.unwrap_or(self.default_wait).min(self.max_wait)
    }

    /// Runs `operation`, waiting out rate limits.
    ///
    /// Only [`PipelineError::RateLimit`] is retried here; every other error
    /// is returned immediately.
    pub async fn run<F, Fut, T>(&self, operation: F) -> Result<T, PipelineError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, PipelineError>>,
    {
        let mut retries = 0;
        loop {
            match operation().await {
                Err(error) if error.is_rate_limit() && retries < self.max_retries => {
                    let wait = self.wait_for(error.retry_after());
                    retries += 1;
                    warn!(
                        url = %error.location(),
                        retry = retries,
                        max_retries = self.max_retries,
                        wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                        "Rate limited, waiting before retry"
                    );
                    tokio::time::sleep(wait).await;
                }
                other => return other,
            }
        }
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Runs `operation` under both retry loops, rate limiting outermost.
pub async fn with_retries<F, Fut, T>(
    transient: &RetryPolicy,
    rate_limit: &RateLimitPolicy,
    operation: F,
) -> Result<T, PipelineError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, PipelineError>>,
{
    rate_limit.run(|| transient.run(&operation)).await
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn network_error() -> PipelineError {
        PipelineError::Network {
            url: "http://test".to_string(),
            cause: "connection reset".to_string(),
        }
    }

    fn rate_limited(retry_after_ms: Option<u64>) -> PipelineError {
        PipelineError::RateLimit {
            url: "http://test".to_string(),
            retry_after_ms,
        }
    }

    fn not_found() -> PipelineError {
        PipelineError::Http {
            url: "http://test".to_string(),
            method: "GET".to_string(),
            status_code: 404,
            kind: crate::error::HttpErrorKind::Status,
        }
    }

    #[test]
    fn test_exponential_backoff() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_secs(8));
    }

    #[test]
    fn test_max_delay_cap() {
        let policy = RetryPolicy::new(10).with_base_delay(Duration::from_secs(10));

        assert_eq!(policy.delay_for_attempt(5), Duration::from_secs(30));
        assert_eq!(policy.delay_for_attempt(200), Duration::from_secs(30));
    }

    #[test]
    fn test_rate_limit_wait_is_capped() {
        let policy = RateLimitPolicy::default();

        assert_eq!(policy.wait_for(None), DEFAULT_RATE_LIMIT_WAIT);
        assert_eq!(
            policy.wait_for(Some(Duration::from_secs(2))),
            Duration::from_secs(2)
        );
        assert_eq!(
            policy.wait_for(Some(Duration::from_secs(3600))),
            DEFAULT_MAX_RATE_LIMIT_WAIT
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_retries_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3);

        let result = policy
            .run(|| {
                let calls = calls.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(network_error())
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_gives_up_after_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3);

        let result: Result<(), _> = policy
            .run(|| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(network_error())
                }
            })
            .await;

        assert_eq!(result, Err(network_error()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_does_not_retry_http_or_rate_limit() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(5);

        let result: Result<(), _> = policy
            .run(|| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(not_found())
                }
            })
            .await;
        assert_eq!(result, Err(not_found()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        calls.store(0, Ordering::SeqCst);
        let result: Result<(), _> = policy
            .run(|| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(rate_limited(Some(10)))
                }
            })
            .await;
        assert!(result.is_err_and(|e| e.is_rate_limit()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_honors_retry_after() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RateLimitPolicy::new(3);
        let started = Instant::now();

        let result = policy
            .run(|| {
                let calls = calls.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(rate_limited(Some(2_000)))
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("ok"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_two_failures_then_success_takes_three_calls() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RateLimitPolicy::new(2);
        let started = Instant::now();

        let result = policy
            .run(|| {
                let calls = calls.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(rate_limited(Some(500)))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exhaustion_returns_rate_limit() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RateLimitPolicy::new(2).with_default_wait(Duration::from_millis(100));

        let result: Result<(), _> = policy
            .run(|| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(rate_limited(None))
                }
            })
            .await;

        assert!(result.is_err_and(|e| e.is_rate_limit()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_wait_never_exceeds_max() {
        let policy = RateLimitPolicy::new(1).with_max_wait(Duration::from_secs(5));
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let _ = policy
            .run(|| {
                let calls = calls.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(rate_limited(Some(86_400_000)))
                    } else {
                        Ok(())
                    }
                }
            })
            .await;

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(5));
        assert!(elapsed < Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retries_composes_both_loops() {
        let calls = Arc::new(AtomicU32::new(0));
        let transient = RetryPolicy::new(3).with_base_delay(Duration::from_millis(10));
        let rate_limit = RateLimitPolicy::new(2).with_default_wait(Duration::from_millis(10));

        // network, 429, network, ok
        let result = with_retries(&transient, &rate_limit, || {
            let calls = calls.clone();
            async move {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 | 2 => Err(network_error()),
                    1 => Err(rate_limited(None)),
                    _ => Ok(7),
                }
            }
        })
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}

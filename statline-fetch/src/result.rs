//! Successful fetch outcome.

use std::time::{Duration, Instant};

/// Data returned by a fetch, with its record count and wall time.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult<T> {
    /// Fetched payload.
    pub data: T,
    /// Number of records in the payload.
    pub count: u64,
    /// Wall time of the fetch, retries and waits included.
    pub duration_ms: u64,
}

impl<T> FetchResult<T> {
    /// Creates a result.
    pub fn new(data: T, count: u64, duration: Duration) -> Self {
        Self {
            data,
            count,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Creates a result timed from `started`.
    pub fn since(data: T, count: u64, started: Instant) -> Self {
        Self::new(data, count, started.elapsed())
    }
}

impl<V> FetchResult<Vec<V>> {
    /// Creates a result from a record list, counting its items.
    pub fn records(data: Vec<V>, started: Instant) -> Self {
        let count = data.len() as u64;
        Self::since(data, count, started)
    }
}

//! Bounded fan-out over parent records.
//!
//! One sub-request per id, at most `concurrency` in flight. Results keep
//! the order of the ids. A failed item is logged and dropped; the batch
//! only fails when nothing succeeded and a critical error was among the
//! failures, since that points at the upstream rather than at one item.

use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, warn};

use statline_fetch::PipelineError;
use statline_sources::SourceFetcher;

/// Outcome of a fan-out batch.
#[derive(Debug, Default)]
pub struct FanOutResult {
    /// Records of the successful items, in id order.
    pub records: Vec<Value>,
    /// Ids that failed, with their errors.
    pub dropped: Vec<(String, PipelineError)>,
}

impl FanOutResult {
    /// Number of dropped items.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.len() as u64
    }
}

/// Fetches one item per id under a concurrency bound.
///
/// # Errors
///
/// Returns the first critical error when every item failed and at least
/// one failure was critical.
pub async fn fan_out(
    fetcher: &dyn SourceFetcher,
    season: &str,
    entity: &str,
    ids: &[String],
    concurrency: usize,
) -> Result<FanOutResult, PipelineError> {
    let concurrency = concurrency.max(1);
    debug!(entity, items = ids.len(), concurrency, "Starting fan-out");

    let results: Vec<(String, Result<Value, PipelineError>)> = stream::iter(ids)
        .map(|id| async move { (id.clone(), fetcher.fetch_item(season, entity, id).await) })
        .buffered(concurrency)
        .collect()
        .await;

    let mut outcome = FanOutResult::default();
    for (id, result) in results {
        match result {
            Ok(record) => outcome.records.push(record),
            Err(error) => {
                warn!(entity, id = %id, kind = error.kind_name(), error = %error, "Fan-out item dropped");
                outcome.dropped.push((id, error));
            }
        }
    }

    if outcome.records.is_empty() {
        if let Some((_, error)) = outcome.dropped.iter().find(|(_, e)| e.is_critical()) {
            return Err(error.clone());
        }
    }

    debug!(
        entity,
        succeeded = outcome.records.len(),
        dropped = outcome.dropped.len(),
        "Fan-out complete"
    );
    Ok(outcome)
}

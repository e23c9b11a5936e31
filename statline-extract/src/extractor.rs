//! Season orchestration.
//!
//! [`SourceExtractor::extract_season`] walks a source's entity plan in
//! order. For each entity it asks the staleness policy, fetches (under the
//! fetch layer's retries), classifies whatever failure survives, writes the
//! output artifact, and then marks and saves the manifest before moving
//! on. The manifest is only ever touched between network calls, so a crash
//! loses at most the entity in flight.

use chrono::Duration as AgeDuration;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

use statline_core::{ExtractOptions, ExtractionManifest, SourceKind, StalenessPolicy};
use statline_fetch::{FetchResult, PipelineError};
use statline_sources::{
    EntityKind, EntitySpec, LeagueCalendar, SourceError, SourceFetcher, SourceRegistry,
    record_key,
};
use statline_store::{Config, ManifestStore, OutputStore};

use crate::error::ExtractError;
use crate::fanout::fan_out;
use crate::report::{EntityOutcome, EntityReport, SeasonReport};

/// Delay after each fetched entity when none is configured.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(500);

/// Fan-out sub-requests in flight when none is configured.
pub const DEFAULT_FAN_OUT_CONCURRENCY: usize = 4;

/// Upper bound on a configured current-season max age.
const MAX_CONFIGURED_AGE_HOURS: u64 = 24 * 365 * 100;

// ============================================================================
// Source Extractor
// ============================================================================

/// Extracts one source, one season at a time.
#[derive(Clone)]
pub struct SourceExtractor {
    fetcher: Arc<dyn SourceFetcher>,
    manifests: ManifestStore,
    outputs: OutputStore,
    policy: StalenessPolicy,
    request_delay: Duration,
    fan_out_concurrency: usize,
}

impl SourceExtractor {
    /// Starts a builder writing under `data_dir`.
    pub fn builder(
        fetcher: Arc<dyn SourceFetcher>,
        data_dir: impl AsRef<Path>,
    ) -> ExtractorBuilder {
        ExtractorBuilder::new(fetcher, data_dir)
    }

    /// Returns the source kind.
    pub fn kind(&self) -> SourceKind {
        self.fetcher.kind()
    }

    /// Returns the manifest store.
    pub fn manifests(&self) -> &ManifestStore {
        &self.manifests
    }

    /// Returns the output store.
    pub fn outputs(&self) -> &OutputStore {
        &self.outputs
    }

    /// Returns the staleness policy.
    pub fn policy(&self) -> &StalenessPolicy {
        &self.policy
    }

    /// Extracts every stale entity of a season.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Critical`] on the first critical failure,
    /// and [`ExtractError::MissingDependency`] when a fan-out entity finds
    /// no parent output. Entities completed before the failure stay
    /// recorded in the persisted manifest.
    #[instrument(skip(self, options), fields(source = %self.kind()))]
    pub async fn extract_season(
        &self,
        season: &str,
        options: &ExtractOptions,
    ) -> Result<SeasonReport, ExtractError> {
        let started = Instant::now();
        let kind = self.kind();
        let mut manifest = self.manifests.load().await;
        let plan = &self.fetcher.descriptor().entities;
        let mut entities = Vec::with_capacity(plan.len());

        info!(season, mode = ?options.mode, "Extracting season");

        for (index, spec) in plan.iter().enumerate() {
            let status = manifest.entity_status(season, spec.name);
            if !self.policy.should_extract(status, season, options) {
                debug!(season, entity = spec.name, "Entity is fresh, skipping");
                entities.push(EntityReport::new(spec.name, EntityOutcome::Skipped));
                continue;
            }

            let (result, outcome) = self.run_entity(season, spec).await?;
            manifest = self.mark_and_save(&manifest, season, spec.name, &result).await?;
            entities.push(EntityReport::new(spec.name, outcome));

            let has_next = index + 1 < plan.len();
            if has_next && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
        }

        let report = SeasonReport {
            source: kind,
            season: season.to_string(),
            entities,
            duration_ms: elapsed_ms(started),
        };
        info!(
            season,
            extracted = report.extracted_count(),
            skipped = report.skipped_count(),
            recovered = report.recovered_count(),
            records = report.records_written(),
            "Season complete"
        );
        Ok(report)
    }

    /// Fetches and writes one entity, classifying failures.
    async fn run_entity(
        &self,
        season: &str,
        spec: &EntitySpec,
    ) -> Result<(FetchResult<Vec<Value>>, EntityOutcome), ExtractError> {
        let started = Instant::now();
        let fetched = match spec.kind {
            EntityKind::Listing => self
                .fetcher
                .fetch_entity(season, spec.name)
                .await
                .map(|records| (records, 0)),
            EntityKind::FanOut { parent, key } => {
                let ids = self.parent_ids(season, spec.name, parent, key).await?;
                fan_out(
                    self.fetcher.as_ref(),
                    season,
                    spec.name,
                    &ids,
                    self.fan_out_concurrency,
                )
                .await
                .map(|batch| {
                    let dropped = batch.dropped_count();
                    (batch.records, dropped)
                })
            }
        };

        let (records, recovered, dropped) = match fetched {
            Ok((records, dropped)) => (records, None, dropped),
            Err(error) if error.is_critical() => {
                return Err(self.critical(season, spec.name, error));
            }
            Err(error) => {
                warn!(
                    season,
                    entity = spec.name,
                    kind = error.kind_name(),
                    error = %error,
                    "Recoverable failure, recording empty result"
                );
                (Vec::new(), Some(error), 0)
            }
        };

        self.outputs
            .write(self.kind(), season, spec.name, &records)
            .await
            .map_err(|error| self.critical(season, spec.name, error))?;

        let result = FetchResult::records(records, started);
        let outcome = match recovered {
            None => EntityOutcome::Extracted {
                count: result.count,
                duration_ms: result.duration_ms,
                dropped,
            },
            Some(error) => EntityOutcome::Recovered {
                kind: error.kind_name().to_string(),
                error: error.to_string(),
                duration_ms: result.duration_ms,
            },
        };
        Ok((result, outcome))
    }

    /// Reads fan-out ids from the parent's persisted output.
    async fn parent_ids(
        &self,
        season: &str,
        entity: &str,
        parent: &str,
        key: &str,
    ) -> Result<Vec<String>, ExtractError> {
        let records = self
            .outputs
            .read(self.kind(), season, parent)
            .await
            .map_err(|error| {
                error!(season, entity, parent, error = %error, "Parent output unavailable");
                ExtractError::MissingDependency {
                    source_name: self.kind().to_string(),
                    season: season.to_string(),
                    entity: entity.to_string(),
                    parent: parent.to_string(),
                    error,
                }
            })?;

        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(records.len());
        let mut keyless = 0usize;
        for record in &records {
            match record_key(record, key) {
                Some(id) if seen.insert(id.clone()) => ids.push(id),
                Some(_) => {}
                None => keyless += 1,
            }
        }
        if keyless > 0 {
            warn!(season, entity, parent, key, keyless, "Parent records without a key were skipped");
        }
        Ok(ids)
    }

    /// Marks an entity complete and persists the manifest.
    async fn mark_and_save(
        &self,
        manifest: &ExtractionManifest,
        season: &str,
        entity: &str,
        result: &FetchResult<Vec<Value>>,
    ) -> Result<ExtractionManifest, ExtractError> {
        let next = self.manifests.mark_complete(
            manifest,
            season,
            entity,
            result.count,
            Some(result.duration_ms),
        );
        self.manifests.save(&next).await.map_err(|e| {
            self.critical(
                season,
                entity,
                PipelineError::FileWrite {
                    path: self.manifests.path().to_path_buf(),
                    cause: e.to_string(),
                },
            )
        })?;
        debug!(season, entity, count = result.count, "Entity recorded");
        Ok(next)
    }

    fn critical(&self, season: &str, entity: &str, error: PipelineError) -> ExtractError {
        error!(
            source = %self.kind(),
            season,
            entity,
            kind = error.kind_name(),
            error = %error,
            "Critical failure, aborting season"
        );
        ExtractError::Critical {
            source_name: self.kind().to_string(),
            season: season.to_string(),
            entity: entity.to_string(),
            error,
        }
    }
}

impl std::fmt::Debug for SourceExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceExtractor")
            .field("source", &self.kind())
            .field("manifests", &self.manifests)
            .field("outputs", &self.outputs)
            .field("request_delay", &self.request_delay)
            .field("fan_out_concurrency", &self.fan_out_concurrency)
            .finish_non_exhaustive()
    }
}

/// Builds the staleness policy a source runs under with `config`.
///
/// The source's league calendar, with configured overrides, decides which
/// seasons are current.
pub fn configured_policy(kind: SourceKind, config: &Config) -> StalenessPolicy {
    let calendar = SourceRegistry::calendar(kind, config);
    let max_age_hours = config
        .extract
        .current_season_max_age_hours
        .min(MAX_CONFIGURED_AGE_HOURS);
    StalenessPolicy::new(Arc::new(calendar)).with_current_season_max_age(AgeDuration::hours(
        i64::try_from(max_age_hours).unwrap_or(0),
    ))
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Builder
// ============================================================================

/// Assembles a [`SourceExtractor`].
pub struct ExtractorBuilder {
    fetcher: Arc<dyn SourceFetcher>,
    manifests: ManifestStore,
    outputs: OutputStore,
    policy: Option<StalenessPolicy>,
    request_delay: Duration,
    fan_out_concurrency: usize,
}

impl ExtractorBuilder {
    /// Creates a builder writing manifests and outputs under `data_dir`.
    pub fn new(fetcher: Arc<dyn SourceFetcher>, data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        let kind = fetcher.kind();
        Self {
            manifests: ManifestStore::in_data_dir(kind, data_dir),
            outputs: OutputStore::new(data_dir),
            fetcher,
            policy: None,
            request_delay: DEFAULT_REQUEST_DELAY,
            fan_out_concurrency: DEFAULT_FAN_OUT_CONCURRENCY,
        }
    }

    /// Creates a builder for a source from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the source's fetcher cannot be built.
    pub fn from_config(kind: SourceKind, config: &Config) -> Result<Self, SourceError> {
        let fetcher = SourceRegistry::build_fetcher(kind, config)?;
        Ok(Self::configured(fetcher, config))
    }

    /// Creates a builder around an existing fetcher, applying configuration.
    pub fn configured(fetcher: Arc<dyn SourceFetcher>, config: &Config) -> Self {
        let policy = configured_policy(fetcher.kind(), config);
        Self::new(fetcher, config.data_dir())
            .policy(policy)
            .request_delay(config.extract.request_delay())
            .fan_out_concurrency(config.extract.fan_out_concurrency)
    }

    /// Sets the staleness policy.
    #[must_use]
    pub fn policy(mut self, policy: StalenessPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Sets the delay after each fetched entity.
    #[must_use]
    pub fn request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Sets the fan-out concurrency bound (at least 1).
    #[must_use]
    pub fn fan_out_concurrency(mut self, concurrency: usize) -> Self {
        self.fan_out_concurrency = concurrency.max(1);
        self
    }

    /// Overrides the manifest store.
    #[must_use]
    pub fn manifest_store(mut self, store: ManifestStore) -> Self {
        self.manifests = store;
        self
    }

    /// Builds the extractor.
    ///
    /// Without an explicit policy, the source's league calendar decides
    /// which seasons are current.
    pub fn build(self) -> SourceExtractor {
        let policy = self.policy.unwrap_or_else(|| {
            let descriptor = self.fetcher.descriptor();
            StalenessPolicy::new(Arc::new(LeagueCalendar::new(descriptor.season_start_month)))
        });
        SourceExtractor {
            fetcher: self.fetcher,
            manifests: self.manifests,
            outputs: self.outputs,
            policy,
            request_delay: self.request_delay,
            fan_out_concurrency: self.fan_out_concurrency,
        }
    }
}

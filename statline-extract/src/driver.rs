//! Multi-season driver.
//!
//! Seasons run one after another in the order given, never in parallel,
//! with a longer pause between them than between entities. The first
//! critical failure stops the run; every entity finished before it is
//! already in the persisted manifest, so rerunning resumes there.

use std::time::{Duration, Instant};
use tracing::{info, instrument};

use statline_core::ExtractOptions;
use statline_store::Config;

use crate::error::ExtractError;
use crate::extractor::SourceExtractor;
use crate::report::RunReport;

/// Pause between seasons when none is configured.
pub const DEFAULT_SEASON_DELAY: Duration = Duration::from_secs(5);

/// Runs a [`SourceExtractor`] over a list of seasons.
#[derive(Debug, Clone)]
pub struct SeasonDriver {
    extractor: SourceExtractor,
    season_delay: Duration,
}

impl SeasonDriver {
    /// Creates a driver with the default season delay.
    pub fn new(extractor: SourceExtractor) -> Self {
        Self {
            extractor,
            season_delay: DEFAULT_SEASON_DELAY,
        }
    }

    /// Creates a driver with the configured season delay.
    pub fn configured(extractor: SourceExtractor, config: &Config) -> Self {
        Self::new(extractor).with_season_delay(config.extract.season_delay())
    }

    /// Sets the pause between seasons.
    #[must_use]
    pub fn with_season_delay(mut self, delay: Duration) -> Self {
        self.season_delay = delay;
        self
    }

    /// Returns the extractor.
    pub fn extractor(&self) -> &SourceExtractor {
        &self.extractor
    }

    /// Extracts each season in order.
    ///
    /// The pause only follows a season that made upstream requests, so a
    /// fully fresh history is walked without waiting.
    ///
    /// # Errors
    ///
    /// Propagates the first season-aborting error.
    #[instrument(skip(self, seasons, options), fields(source = %self.extractor.kind(), seasons = seasons.len()))]
    pub async fn run(
        &self,
        seasons: &[String],
        options: &ExtractOptions,
    ) -> Result<RunReport, ExtractError> {
        let started = Instant::now();
        let mut reports = Vec::with_capacity(seasons.len());

        for (index, season) in seasons.iter().enumerate() {
            let report = self.extractor.extract_season(season, options).await?;
            let made_requests = report.made_requests();
            reports.push(report);

            let has_next = index + 1 < seasons.len();
            if has_next && made_requests && !self.season_delay.is_zero() {
                tokio::time::sleep(self.season_delay).await;
            }
        }

        let manifest = self.extractor.manifests().load().await;
        let report = RunReport {
            source: self.extractor.kind(),
            seasons: reports,
            manifest,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        info!(
            seasons = report.seasons.len(),
            records = report.records_written(),
            recovered = report.recovered_count(),
            "Run complete"
        );
        Ok(report)
    }
}

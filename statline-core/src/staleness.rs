//! Incremental extraction decisions.
//!
//! [`StalenessPolicy::should_extract`] answers one question: should this
//! entity be fetched now? Rules are evaluated in strict precedence:
//!
//! 1. `full` mode always extracts.
//! 2. `incremental` mode asks the [`SeasonCalendar`]: current seasons get a
//!    short automatic max age, historical seasons never go stale once
//!    extracted.
//! 3. `skip-existing` mode, or no mode with `skip_existing` left at its
//!    default of true, extracts only what was never extracted.
//! 4. No mode with an explicit `max_age_hours` applies that bound.
//! 5. No mode with `skip_existing = false` always extracts.
//!
//! Nothing here performs I/O; "now" is an argument of the `_at` variants.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::models::{EntityStatus, ExtractOptions, ExtractionMode, SeasonPhase};
use crate::traits::SeasonCalendar;

/// Automatic max age applied to current seasons in incremental mode.
pub const DEFAULT_CURRENT_SEASON_MAX_AGE_HOURS: i64 = 24;

/// Returns true if the entity should be considered stale.
///
/// Absent or unextracted entities are always stale. Extracted entities are
/// stale only under a bound, once older than it. An extracted entity with
/// no recorded timestamp has an unknown age and is stale under any bound.
pub fn is_stale(
    status: Option<&EntityStatus>,
    max_age: Option<Duration>,
    now: DateTime<Utc>,
) -> bool {
    let Some(status) = status else {
        return true;
    };
    if !status.extracted {
        return true;
    }

    match (max_age, status.age(now)) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(max_age), Some(age)) => age > max_age,
    }
}

/// Converts a fractional hour count to a duration.
///
/// NaN and non-positive counts clamp to zero; counts beyond the duration
/// range, infinity included, saturate to [`Duration::MAX`].
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn hours(hours: f64) -> Duration {
    if hours.is_nan() || hours <= 0.0 {
        return Duration::zero();
    }
    let millis = hours * 3_600_000.0;
    if millis >= i64::MAX as f64 {
        return Duration::MAX;
    }
    Duration::try_milliseconds(millis as i64).unwrap_or(Duration::MAX)
}

// ============================================================================
// Staleness Policy
// ============================================================================

/// Decides whether an entity should be extracted.
#[derive(Clone)]
pub struct StalenessPolicy {
    calendar: Arc<dyn SeasonCalendar>,
    current_season_max_age: Duration,
}

impl StalenessPolicy {
    /// Creates a policy backed by a season calendar.
    pub fn new(calendar: Arc<dyn SeasonCalendar>) -> Self {
        Self {
            calendar,
            current_season_max_age: Duration::hours(DEFAULT_CURRENT_SEASON_MAX_AGE_HOURS),
        }
    }

    /// Overrides the automatic max age of current seasons.
    #[must_use]
    pub fn with_current_season_max_age(mut self, max_age: Duration) -> Self {
        self.current_season_max_age = max_age;
        self
    }

    /// Returns the automatic max age for a season in incremental mode.
    ///
    /// `None` means the season is closed and never goes stale.
    pub fn incremental_max_age(&self, season: &str) -> Option<Duration> {
        match self.calendar.phase(season) {
            SeasonPhase::Current => Some(self.current_season_max_age),
            SeasonPhase::Historical => None,
        }
    }

    /// Returns the phase of a season according to the calendar.
    pub fn phase(&self, season: &str) -> SeasonPhase {
        self.calendar.phase(season)
    }

    /// Returns true if the entity should be extracted now.
    pub fn should_extract(
        &self,
        status: Option<&EntityStatus>,
        season: &str,
        options: &ExtractOptions,
    ) -> bool {
        self.should_extract_at(status, season, options, Utc::now())
    }

    /// Returns true if the entity should be extracted at `now`.
    pub fn should_extract_at(
        &self,
        status: Option<&EntityStatus>,
        season: &str,
        options: &ExtractOptions,
        now: DateTime<Utc>,
    ) -> bool {
        match options.mode {
            Some(ExtractionMode::Full) => true,
            Some(ExtractionMode::Incremental) => {
                is_stale(status, self.incremental_max_age(season), now)
            }
            Some(ExtractionMode::SkipExisting) => is_stale(status, None, now),
            None if options.skips_existing() => is_stale(status, None, now),
            None => match options.max_age_hours {
                Some(max_age_hours) => is_stale(status, Some(hours(max_age_hours)), now),
                None => true,
            },
        }
    }
}

impl std::fmt::Debug for StalenessPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StalenessPolicy")
            .field("current_season_max_age", &self.current_season_max_age)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

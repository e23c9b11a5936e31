//! League season calendars.
//!
//! Season keys are the year a season starts in: NBA `"2024"` is the
//! 2024-25 season. A [`LeagueCalendar`] derives the current key from the
//! month a league's season starts and today's date.

use chrono::{Datelike, Local, NaiveDate};
use std::collections::BTreeSet;

use statline_core::{SeasonCalendar, SeasonPhase};

/// Calendar derived from a season start month.
///
/// The season containing `today` and every later key are current. Keys
/// listed as overrides are always current. Keys that do not parse as a
/// year are treated as current so they never freeze by accident.
#[derive(Debug, Clone)]
pub struct LeagueCalendar {
    start_month: u32,
    overrides: BTreeSet<String>,
    today: NaiveDate,
}

impl LeagueCalendar {
    /// Creates a calendar for today's local date.
    pub fn new(start_month: u32) -> Self {
        Self::at(start_month, Local::now().date_naive())
    }

    /// Creates a calendar pinned to a date.
    pub fn at(start_month: u32, today: NaiveDate) -> Self {
        Self {
            start_month: start_month.clamp(1, 12),
            overrides: BTreeSet::new(),
            today,
        }
    }

    /// Adds keys that are always current.
    #[must_use]
    pub fn with_overrides<I, S>(mut self, seasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.overrides.extend(seasons.into_iter().map(Into::into));
        self
    }

    /// Returns the key of the season containing today.
    pub fn current_season_key(&self) -> i32 {
        season_key_for(self.start_month, self.today)
    }

    /// Returns every key from `first` through the current season.
    pub fn seasons_since(&self, first: i32) -> Vec<String> {
        (first..=self.current_season_key())
            .map(|year| year.to_string())
            .collect()
    }
}

impl SeasonCalendar for LeagueCalendar {
    fn phase(&self, season: &str) -> SeasonPhase {
        if self.overrides.contains(season) {
            return SeasonPhase::Current;
        }
        match season.trim().parse::<i32>() {
            Ok(year) if year < self.current_season_key() => SeasonPhase::Historical,
            _ => SeasonPhase::Current,
        }
    }
}

/// Returns the season key containing `date` for a league starting in
/// `start_month`.
pub fn season_key_for(start_month: u32, date: NaiveDate) -> i32 {
    if date.month() >= start_month {
        date.year()
    } else {
        date.year() - 1
    }
}

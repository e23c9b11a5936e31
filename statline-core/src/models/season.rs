//! Season phase types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::traits::SeasonCalendar;

/// Whether a season's data can still change upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonPhase {
    /// Actively updating; extracted data goes stale.
    Current,
    /// Closed; extracted data never goes stale.
    Historical,
}

/// Calendar with a fixed set of current season keys.
///
/// Every other key is historical.
#[derive(Debug, Clone, Default)]
pub struct StaticCalendar {
    current: BTreeSet<String>,
}

impl StaticCalendar {
    /// Creates a calendar treating the given keys as current.
    pub fn new<I, S>(current: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            current: current.into_iter().map(Into::into).collect(),
        }
    }
}

impl SeasonCalendar for StaticCalendar {
    fn phase(&self, season: &str) -> SeasonPhase {
        if self.current.contains(season) {
            SeasonPhase::Current
        } else {
            SeasonPhase::Historical
        }
    }
}

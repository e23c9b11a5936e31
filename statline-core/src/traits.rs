//! Trait definitions for Statline.

use crate::models::SeasonPhase;

/// Season configuration consulted by the staleness policy.
///
/// Implementors own all calendar knowledge: which season keys are still
/// being updated upstream and which are closed.
pub trait SeasonCalendar: Send + Sync {
    /// Returns the phase of a season key.
    fn phase(&self, season: &str) -> SeasonPhase;

    /// Returns true if the season is still updating.
    fn is_current(&self, season: &str) -> bool {
        self.phase(season) == SeasonPhase::Current
    }
}

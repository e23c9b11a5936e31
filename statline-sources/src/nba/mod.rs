//! NBA source.
//!
//! REST API with cursor pagination and bearer-token auth. Season keys are
//! the year a season starts in; seasons start in October.

mod api;
mod descriptor;
mod fetcher;

pub use api::{NbaGame, NbaPlayer, NbaStanding, NbaTeam, Page, PageMeta, Single, TeamRef};
pub use descriptor::{NBA_DEFAULT_BASE_URL, nba_descriptor};
pub use fetcher::{DEFAULT_MAX_PAGES, DEFAULT_PER_PAGE, NbaFetcher};

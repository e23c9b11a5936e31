//! PWHL source.
//!
//! A single GraphQL endpoint; every entity is one query with a `season`
//! variable. Rosters fan out over teams.

mod api;
mod descriptor;
mod fetcher;

pub use api::{PwhlGame, PwhlPlayer, PwhlRoster, PwhlStanding, PwhlTeam};
pub use descriptor::{PWHL_DEFAULT_BASE_URL, PWHL_GRAPHQL_ENDPOINT, pwhl_descriptor};
pub use fetcher::PwhlFetcher;

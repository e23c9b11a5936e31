//! NBA source descriptor.

use statline_core::SourceKind;

use crate::descriptor::{EntitySpec, Protocol, SourceDescriptor};

/// Public NBA statistics API.
pub const NBA_DEFAULT_BASE_URL: &str = "https://api.balldontlie.io/v1";

/// Returns the NBA descriptor.
pub fn nba_descriptor() -> SourceDescriptor {
    SourceDescriptor {
        id: SourceKind::Nba,
        protocol: Protocol::Rest,
        default_base_url: NBA_DEFAULT_BASE_URL,
        requires_token: true,
        season_start_month: 10,
        first_season: 2015,
        entities: vec![
            EntitySpec::listing("teams"),
            EntitySpec::listing("players"),
            EntitySpec::listing("games"),
            EntitySpec::listing("standings"),
            EntitySpec::fan_out("team_details", "teams", "id"),
        ],
    }
}

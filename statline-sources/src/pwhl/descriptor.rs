//! PWHL source descriptor.

use statline_core::SourceKind;

use crate::descriptor::{EntitySpec, Protocol, SourceDescriptor};

/// Public PWHL statistics API.
pub const PWHL_DEFAULT_BASE_URL: &str = "https://stats-api.thepwhl.com";

/// GraphQL endpoint, relative to the base URL.
pub const PWHL_GRAPHQL_ENDPOINT: &str = "graphql";

/// Returns the PWHL descriptor.
pub fn pwhl_descriptor() -> SourceDescriptor {
    SourceDescriptor {
        id: SourceKind::Pwhl,
        protocol: Protocol::GraphQl,
        default_base_url: PWHL_DEFAULT_BASE_URL,
        requires_token: false,
        season_start_month: 11,
        first_season: 2023,
        entities: vec![
            EntitySpec::listing("teams"),
            EntitySpec::listing("players"),
            EntitySpec::listing("schedule"),
            EntitySpec::listing("standings"),
            EntitySpec::fan_out("rosters", "teams", "id"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entities_match_source_kind() {
        let desc = pwhl_descriptor();
        let names: Vec<_> = desc.entity_names().collect();
        assert_eq!(names, SourceKind::Pwhl.entities());
        assert_eq!(desc.entity("rosters").and_then(EntitySpec::parent), Some("teams"));
    }
}

//! Source descriptor system.
//!
//! A descriptor contains all the static configuration for a source:
//! - Metadata (display name, protocol, default endpoint)
//! - The ordered entity plan, including fan-out dependencies
//! - Calendar facts (season start month, first season)

use statline_core::SourceKind;
use std::fmt;

// ============================================================================
// Source Descriptor
// ============================================================================

/// Complete static descriptor for a source.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    /// Source identifier.
    pub id: SourceKind,
    /// Wire protocol of the upstream API.
    pub protocol: Protocol,
    /// Base URL used when none is configured.
    pub default_base_url: &'static str,
    /// Whether requests need a bearer token.
    pub requires_token: bool,
    /// Month (1-12) in which a season starts.
    pub season_start_month: u32,
    /// Earliest season key the upstream serves.
    pub first_season: i32,
    /// Entities in extraction order.
    pub entities: Vec<EntitySpec>,
}

impl SourceDescriptor {
    /// Returns the display name.
    pub fn display_name(&self) -> &'static str {
        self.id.display_name()
    }

    /// Returns the CLI name.
    pub fn cli_name(&self) -> &'static str {
        self.id.cli_name()
    }

    /// Looks up an entity by name.
    pub fn entity(&self, name: &str) -> Option<&EntitySpec> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Returns the entity names in extraction order.
    pub fn entity_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entities.iter().map(|e| e.name)
    }
}

// ============================================================================
// Protocol
// ============================================================================

/// Upstream wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// REST with query-string parameters.
    Rest,
    /// GraphQL POST of `{query, variables}`.
    GraphQl,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rest => write!(f, "REST"),
            Self::GraphQl => write!(f, "GraphQL"),
        }
    }
}

// ============================================================================
// Entity Plan
// ============================================================================

/// One extractable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySpec {
    /// Entity name, used in manifests and output paths.
    pub name: &'static str,
    /// How the entity is fetched.
    pub kind: EntityKind,
}

impl EntitySpec {
    /// A single listing request per season.
    pub const fn listing(name: &'static str) -> Self {
        Self {
            name,
            kind: EntityKind::Listing,
        }
    }

    /// One request per record of a previously extracted entity.
    pub const fn fan_out(name: &'static str, parent: &'static str, key: &'static str) -> Self {
        Self {
            name,
            kind: EntityKind::FanOut { parent, key },
        }
    }

    /// Returns the parent entity of a fan-out entity.
    pub fn parent(&self) -> Option<&'static str> {
        match self.kind {
            EntityKind::Listing => None,
            EntityKind::FanOut { parent, .. } => Some(parent),
        }
    }
}

/// How an entity is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A single (possibly paginated) listing.
    Listing,
    /// One sub-request per parent record.
    FanOut {
        /// Entity whose persisted output supplies the ids.
        parent: &'static str,
        /// Field of each parent record holding the id.
        key: &'static str,
    },
}

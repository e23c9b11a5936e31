//! Season and run reports.

use serde::Serialize;

use statline_core::{ExtractionManifest, SourceKind};

// ============================================================================
// Entity Outcome
// ============================================================================

/// What happened to one entity during a season run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EntityOutcome {
    /// Fetched, written and marked complete.
    Extracted {
        /// Records written.
        count: u64,
        /// Fetch and write time.
        duration_ms: u64,
        /// Fan-out items dropped after failing.
        dropped: u64,
    },
    /// Fresh according to the staleness policy; not fetched.
    Skipped,
    /// Failed recoverably; an empty result was written and marked complete.
    Recovered {
        /// Error kind name.
        kind: String,
        /// Error message.
        error: String,
        /// Time spent before giving up.
        duration_ms: u64,
    },
}

/// Outcome of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityReport {
    /// Entity name.
    pub entity: String,
    /// What happened.
    #[serde(flatten)]
    pub outcome: EntityOutcome,
}

impl EntityReport {
    /// Creates a report.
    pub fn new(entity: impl Into<String>, outcome: EntityOutcome) -> Self {
        Self {
            entity: entity.into(),
            outcome,
        }
    }

    /// Returns true if the entity made upstream requests.
    pub fn was_fetched(&self) -> bool {
        !matches!(self.outcome, EntityOutcome::Skipped)
    }
}

// ============================================================================
// Season Report
// ============================================================================

/// Outcome of one season run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonReport {
    /// Source extracted.
    pub source: SourceKind,
    /// Season key.
    pub season: String,
    /// Per-entity outcomes, in extraction order.
    pub entities: Vec<EntityReport>,
    /// Wall time of the season, delays included.
    pub duration_ms: u64,
}

impl SeasonReport {
    /// Number of entities extracted successfully.
    pub fn extracted_count(&self) -> usize {
        self.count(|o| matches!(o, EntityOutcome::Extracted { .. }))
    }

    /// Number of entities skipped as fresh.
    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, EntityOutcome::Skipped))
    }

    /// Number of entities recovered from a non-critical failure.
    pub fn recovered_count(&self) -> usize {
        self.count(|o| matches!(o, EntityOutcome::Recovered { .. }))
    }

    /// Total records written this run.
    pub fn records_written(&self) -> u64 {
        self.entities
            .iter()
            .map(|e| match e.outcome {
                EntityOutcome::Extracted { count, .. } => count,
                EntityOutcome::Skipped | EntityOutcome::Recovered { .. } => 0,
            })
            .sum()
    }

    /// Returns true if any entity made upstream requests.
    pub fn made_requests(&self) -> bool {
        self.entities.iter().any(EntityReport::was_fetched)
    }

    fn count(&self, predicate: impl Fn(&EntityOutcome) -> bool) -> usize {
        self.entities.iter().filter(|e| predicate(&e.outcome)).count()
    }
}

// ============================================================================
// Run Report
// ============================================================================

/// Outcome of a multi-season run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Source extracted.
    pub source: SourceKind,
    /// Season reports, in run order.
    pub seasons: Vec<SeasonReport>,
    /// Manifest as persisted at the end of the run.
    pub manifest: ExtractionManifest,
    /// Wall time of the run.
    pub duration_ms: u64,
}

impl RunReport {
    /// Total records written across seasons.
    pub fn records_written(&self) -> u64 {
        self.seasons.iter().map(SeasonReport::records_written).sum()
    }

    /// Total entities recovered from non-critical failures.
    pub fn recovered_count(&self) -> usize {
        self.seasons.iter().map(SeasonReport::recovered_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report() -> SeasonReport {
        SeasonReport {
            source: SourceKind::Pwhl,
            season: "2024".to_string(),
            entities: vec![
                EntityReport::new(
                    "teams",
                    EntityOutcome::Extracted {
                        count: 8,
                        duration_ms: 40,
                        dropped: 0,
                    },
                ),
                EntityReport::new("players", EntityOutcome::Skipped),
                EntityReport::new(
                    "standings",
                    EntityOutcome::Recovered {
                        kind: "parse".to_string(),
                        error: "bad shape".to_string(),
                        duration_ms: 3,
                    },
                ),
            ],
            duration_ms: 60,
        }
    }

    #[test]
    fn test_counts() {
        let report = report();
        assert_eq!(report.extracted_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.recovered_count(), 1);
        assert_eq!(report.records_written(), 8);
        assert!(report.made_requests());
    }

    #[test]
    fn test_outcome_is_tagged() {
        let value = serde_json::to_value(&report().entities[1]).unwrap();
        assert_eq!(value, json!({"entity": "players", "outcome": "skipped"}));
    }
}

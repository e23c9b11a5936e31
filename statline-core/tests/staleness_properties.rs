//! Property tests for the staleness policy.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use statline_core::{
    is_stale, EntityStatus, ExtractOptions, ExtractionManifest, ExtractionMode, SourceKind,
    StalenessPolicy, StaticCalendar,
};

fn policy() -> StalenessPolicy {
    StalenessPolicy::new(Arc::new(StaticCalendar::new(["2024"])))
}

fn status_strategy() -> impl Strategy<Value = EntityStatus> {
    (any::<bool>(), 0u64..10_000, 0i64..(24 * 3650), proptest::option::of(0u64..600_000)).prop_map(
        |(extracted, count, minutes_ago, duration_ms)| {
            let now = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
            EntityStatus {
                extracted,
                count,
                timestamp: Some(now - Duration::minutes(minutes_ago)),
                duration_ms,
            }
        },
    )
}

proptest! {
    #[test]
    fn skip_existing_extracts_exactly_the_unextracted(
        status in status_strategy(),
        season in "(19|20)[0-9]{2}",
    ) {
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let options = ExtractOptions::with_mode(ExtractionMode::SkipExisting);
        prop_assert_eq!(
            policy().should_extract_at(Some(&status), &season, &options, now),
            !status.extracted
        );
    }

    #[test]
    fn full_mode_extracts_everything(
        status in proptest::option::of(status_strategy()),
        season in "(19|20)[0-9]{2}",
    ) {
        let options = ExtractOptions::with_mode(ExtractionMode::Full);
        prop_assert!(policy().should_extract(status.as_ref(), &season, &options));
    }

    #[test]
    fn is_stale_matches_definition(
        status in proptest::option::of(status_strategy()),
        bound_minutes in proptest::option::of(0i64..(24 * 3650)),
    ) {
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let bound = bound_minutes.map(Duration::minutes);

        let expected = match &status {
            None => true,
            Some(s) if !s.extracted => true,
            Some(s) => match bound {
                None => false,
                Some(m) => now - s.timestamp.unwrap() > m,
            },
        };
        prop_assert_eq!(is_stale(status.as_ref(), bound, now), expected);
    }

    #[test]
    fn unbounded_never_stale_once_extracted(status in status_strategy()) {
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let extracted = EntityStatus { extracted: true, ..status };
        prop_assert!(!is_stale(Some(&extracted), None, now));
    }

    #[test]
    fn mark_complete_is_idempotent_up_to_timestamp(
        count in 0u64..100_000,
        duration_ms in proptest::option::of(0u64..600_000),
        gap_ms in 0i64..10_000,
    ) {
        let first_at = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let second_at = first_at + Duration::milliseconds(gap_ms);
        let manifest = ExtractionManifest::empty_at(SourceKind::Nba, first_at);

        let once = manifest.with_completed("2024", "teams", count, duration_ms, first_at);
        let twice = once.with_completed("2024", "teams", count, duration_ms, second_at);

        let a = once.entity_status("2024", "teams").unwrap();
        let b = twice.entity_status("2024", "teams").unwrap();
        prop_assert_eq!(a.extracted, b.extracted);
        prop_assert_eq!(a.count, b.count);
        prop_assert_eq!(a.duration_ms, b.duration_ms);
        prop_assert!(b.timestamp >= a.timestamp);
    }
}

//! Property tests for the core invariants

mod common;

use chrono::Duration;
use proptest::prelude::*;
use riverwatch_core::{is_fresh, MalfunctionDetector, OffsetResolver, ValidityWindow};

use common::{epoch, offset, timed_series};

proptest! {
    #[test]
    fn resolve_is_idempotent(
        raw in -1.0e6f64..1.0e6,
        minutes in -10_000i64..10_000,
        value in -100.0f64..100.0,
        start in -5_000i64..5_000,
        length in proptest::option::of(0i64..5_000),
    ) {
        let from = epoch() + Duration::minutes(start);
        let window = match length {
            Some(len) => ValidityWindow::bounded(from, from + Duration::minutes(len)),
            None => ValidityWindow::ongoing(from),
        };
        let offsets = [offset(1, "pH-1", value, window)];
        let resolver = OffsetResolver::new(&offsets);
        let t = epoch() + Duration::minutes(minutes);

        let first = resolver.resolve(raw, t);
        let second = resolver.resolve(raw, t);
        prop_assert_eq!(first.corrected_value.to_bits(), second.corrected_value.to_bits());
        prop_assert_eq!(first.applied_offset.map(|o| o.id), second.applied_offset.map(|o| o.id));
    }

    #[test]
    fn no_matching_offset_returns_raw(raw in -1.0e6f64..1.0e6, before in 1i64..100_000) {
        let offsets = [offset(1, "pH-1", 3.0, ValidityWindow::ongoing(epoch()))];
        let resolution = OffsetResolver::new(&offsets).resolve(raw, epoch() - Duration::minutes(before));
        prop_assert_eq!(resolution.corrected_value, raw);
        prop_assert!(resolution.applied_offset.is_none());
    }

    #[test]
    fn ongoing_offset_matches_everything_after_start(after in 0i64..10_000_000, raw in -100.0f64..100.0) {
        let offsets = [offset(1, "pH-1", 0.5, ValidityWindow::ongoing(epoch()))];
        let resolution = OffsetResolver::new(&offsets).resolve(raw, epoch() + Duration::minutes(after));
        prop_assert_eq!(resolution.applied_offset.map(|o| o.id), Some(1));
        prop_assert_eq!(resolution.corrected_value, raw + 0.5);
    }

    #[test]
    fn never_fetched_is_never_fresh(minutes in -1_000_000i64..1_000_000, threshold in 0i64..100_000) {
        prop_assert!(!is_fresh(None, epoch() + Duration::minutes(minutes), threshold));
    }

    #[test]
    fn freshness_is_monotonic_in_now(
        threshold in 1i64..1_000,
        steps in proptest::collection::vec(0i64..120, 1..50),
    ) {
        let last = Some(epoch());
        let mut now = epoch();
        let mut was_fresh = is_fresh(last, now, threshold);
        for step in steps {
            now += Duration::seconds(step * 30);
            let fresh = is_fresh(last, now, threshold);
            prop_assert!(was_fresh || !fresh, "flipped back to fresh at {}", now);
            was_fresh = fresh;
        }
        prop_assert!(!is_fresh(last, epoch() + Duration::minutes(threshold), threshold));
    }

    #[test]
    fn short_history_never_flags(
        values in proptest::collection::vec(-1.0e4f64..1.0e4, 0..10),
        current in proptest::num::f64::ANY,
        name in "[A-Za-z ()%]{0,24}",
    ) {
        let history = timed_series(&values);
        let diagnosis = MalfunctionDetector::default().detect(&name, &history, current);
        prop_assert!(!diagnosis.is_malfunctioning());
    }
}

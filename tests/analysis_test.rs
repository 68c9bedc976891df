//! Batch-level tests for the analysis core.
//!
//! Run with: cargo test --test analysis_test

use owlog_dashboard::analysis::{
    Column, LineParser, MemorySession, RawRecord, RunningStat, SeriesBuckets, SeriesProjector,
    SeriesSelector, StatAggregator, TableSorter, TimeAxis,
};
use proptest::prelude::*;

fn stat_batch() -> Vec<RawRecord> {
    vec![
        RawRecord::new("08:00:00", "Temp", "68.2F"),
        RawRecord::new("08:05:00", "Temp", "69.0F"),
        RawRecord::new("08:10:00", "Humidity", "40%"),
    ]
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

#[test]
fn stat_view_end_to_end() {
    let parsed = LineParser::new(TimeAxis::Day).parse_batch(&stat_batch());
    let aggregator = StatAggregator::from_records(&parsed);

    let temp = aggregator.stat_for("Temp").unwrap();
    assert_eq!(temp.lines(), 2);
    assert_eq!(temp.count(), 2);
    assert!(close(temp.mean().unwrap(), 68.6));
    assert_eq!(temp.range(), Some((68.2, 69.0)));

    assert_eq!(aggregator.all().count(), 3);
    assert_eq!(aggregator.all().lines(), 3);
    assert_eq!(aggregator.keys().collect::<Vec<_>>(), vec!["Temp", "Humidity"]);
}

#[test]
fn parser_examples() {
    let parser = LineParser::new(TimeAxis::Day);
    let parsed = parser.parse(&RawRecord::new("12:30:00", "sensor", "T-20.5F, H-55%"));
    assert!(close(parsed.time, 12.5));
    // A dash directly before digits is a sign, even after a unit letter
    assert_eq!(parsed.readings, vec![-20.5, -55.0]);

    let spaced = parser.parse(&RawRecord::new("12:30:00", "sensor", "T-20.5F, H 55%"));
    assert_eq!(spaced.readings, vec![-20.5, 55.0]);

    let silent = parser.parse(&RawRecord::new("", "sensor", "offline"));
    assert_eq!(silent.time, 0.0);
    assert!(silent.readings.is_empty());
}

#[test]
fn projector_range_follows_visibility() {
    let parsed = LineParser::new(TimeAxis::Day).parse_batch(&[
        RawRecord::new("01:00", "a", "10"),
        RawRecord::new("02:00", "b", "20"),
        RawRecord::new("03:00", "c", "30"),
    ]);
    let buckets = SeriesBuckets::from_records(&parsed);
    let projector = SeriesProjector::new(TimeAxis::Day);
    let mut selector = SeriesSelector::new(buckets.keys());

    let domain = projector.compute_domain(&buckets, &selector.visible_keys(), 400.0, 300.0);
    assert_eq!((domain.y_min, domain.y_max), (8.0, 31.0));

    selector.toggle("c");
    let domain = projector.compute_domain(&buckets, &selector.visible_keys(), 400.0, 300.0);
    assert_eq!((domain.y_min, domain.y_max), (8.0, 21.0));
}

#[test]
fn sorting_round_trips_through_the_session() {
    let original = stat_batch();
    let mut session = MemorySession::default();
    let mut records = original.clone();

    TableSorter::sort_persisted(&mut records, None, &mut session).unwrap();
    assert_eq!(records, original);

    TableSorter::sort_persisted(&mut records, Some(Column::Time), &mut session).unwrap();
    let mut reversed = original.clone();
    reversed.reverse();
    assert_eq!(records, reversed);

    TableSorter::sort_persisted(&mut records, Some(Column::Time), &mut session).unwrap();
    assert_eq!(records, original);
}

fn reference(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

proptest! {
    #[test]
    fn running_stat_matches_population_formulas(
        values in prop::collection::vec(-1000.0f64..1000.0, 1..200)
    ) {
        let mut stat = RunningStat::new("x");
        stat.add_line(&values);
        let (mean, stddev) = reference(&values);

        prop_assert!(close(stat.mean().unwrap(), mean));
        prop_assert!((stat.stddev().unwrap() - stddev).abs() <= 1e-9 * stddev.max(1.0));

        let (min, max) = stat.range().unwrap();
        prop_assert!(min <= stat.mean().unwrap() + 1e-9 && stat.mean().unwrap() <= max + 1e-9);
    }

    #[test]
    fn order_does_not_matter(
        values in prop::collection::vec(-1000.0f64..1000.0, 1..100)
    ) {
        let mut forward = RunningStat::new("x");
        forward.add_line(&values);

        let mut reversed_values = values.clone();
        reversed_values.reverse();
        let mut backward = RunningStat::new("x");
        backward.add_line(&reversed_values);

        prop_assert!(close(forward.mean().unwrap(), backward.mean().unwrap()));
        prop_assert!((forward.stddev().unwrap() - backward.stddev().unwrap()).abs() <= 1e-9 * forward.stddev().unwrap().max(1.0));
        prop_assert_eq!(forward.range(), backward.range());
    }

    #[test]
    fn merged_batches_equal_one_batch(
        left in prop::collection::vec(-500.0f64..500.0, 0..60),
        right in prop::collection::vec(-500.0f64..500.0, 1..60),
    ) {
        let mut merged = RunningStat::new("k");
        merged.add_line(&left);
        let mut other = RunningStat::new("k");
        other.add_line(&right);
        merged.merge(&other);

        let mut direct = RunningStat::new("k");
        direct.add_line(&left);
        direct.add_line(&right);

        prop_assert_eq!(merged.count(), direct.count());
        prop_assert!(close(merged.mean().unwrap(), direct.mean().unwrap()));
        prop_assert!((merged.stddev().unwrap() - direct.stddev().unwrap()).abs() <= 1e-9 * direct.stddev().unwrap().max(1.0));
    }

    #[test]
    fn stable_sort_keeps_ties_in_order(
        sources in prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 0..40)
    ) {
        let mut records: Vec<RawRecord> = sources
            .iter()
            .enumerate()
            .map(|(i, s)| RawRecord::new(format!("{i:04}"), *s, ""))
            .collect();
        let mut session = MemorySession::default();
        TableSorter::sort_persisted(&mut records, Some(Column::Source), &mut session).unwrap();

        for pair in records.windows(2) {
            if pair[0].source == pair[1].source {
                prop_assert!(pair[0].time < pair[1].time);
            }
        }
    }
}

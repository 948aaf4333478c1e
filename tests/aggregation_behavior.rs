//! Behavior tests for the aggregation engine.
//!
//! These tests check the properties the dashboard relies on: one summary per
//! pool, ordered output, padded axis domains and total reductions.

use std::collections::BTreeSet;

use poolscope_core::format::{format_apr, format_currency};
use poolscope_core::{
    build_time_series, compute_domain, compute_summary_stats, group_latest_by_pool,
    resolve_time_range_filter, AprRecord, HistoryRow, LabelGranularity, PoolSnapshot,
    ProtocolAnalytics, ProtocolSelection, TimeRangeSelection, UtcDateTime, METRIC_APR,
    METRIC_TOTAL_TVL,
};

/// Small deterministic generator so the properties run over varied inputs.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }
}

fn ts(value: &str) -> UtcDateTime {
    UtcDateTime::parse(value).expect("valid timestamp")
}

fn snapshot(id: i64, pool: &str, tvl: Option<f64>, scraped_at: UtcDateTime) -> PoolSnapshot {
    PoolSnapshot::new(id, pool, Some(10.0), tvl, scraped_at).expect("valid snapshot")
}

fn random_snapshots(rng: &mut Lcg) -> Vec<PoolSnapshot> {
    let base = ts("2024-05-01T00:00:00Z").unix_timestamp();
    let count = rng.below(40);
    let mut rows = (0..count)
        .map(|id| {
            let pool = format!("pool-{}", rng.below(6));
            let tvl = (rng.below(4) > 0).then(|| rng.below(10_000) as f64);
            let scraped_at = UtcDateTime::from_unix_timestamp(base + rng.below(30) as i64 * 3_600)
                .expect("valid");
            snapshot(id as i64, &pool, tvl, scraped_at)
        })
        .collect::<Vec<_>>();
    rows.sort_by(|left, right| right.scraped_at.cmp(&left.scraped_at));
    rows
}

fn random_history(rng: &mut Lcg) -> Vec<HistoryRow> {
    let base = ts("2024-05-01T00:00:00Z").unix_timestamp();
    (0..rng.below(50))
        .map(|_| {
            let scraped_at = UtcDateTime::from_unix_timestamp(base + rng.below(96) as i64 * 1_800)
                .expect("valid");
            let apr = (rng.below(3) > 0).then(|| rng.below(500) as f64 / 10.0);
            let tvl = (rng.below(3) > 0).then(|| rng.below(1_000_000) as f64);
            HistoryRow::new(scraped_at, apr, tvl).expect("valid row")
        })
        .collect()
}

// =============================================================================
// Latest snapshot per pool
// =============================================================================

#[test]
fn when_rows_are_newest_first_latest_per_pool_is_first_occurrence() {
    // Given: rows for pool A at t1 and t2 (> t1) and pool B at t3, sorted newest first
    let t1 = ts("2024-05-01T00:00:00Z");
    let t2 = ts("2024-05-03T00:00:00Z");
    let t3 = ts("2024-05-02T00:00:00Z");
    let rows = vec![
        snapshot(2, "A", Some(200.0), t2),
        snapshot(3, "B", Some(50.0), t3),
        snapshot(1, "A", Some(100.0), t1),
    ];

    // When: the rows are grouped
    let summaries = group_latest_by_pool(&rows);

    // Then: A keeps its t2 row and ranks above B by TVL
    let shape = summaries
        .iter()
        .map(|summary| (summary.pool_name(), summary.total_tvl()))
        .collect::<Vec<_>>();
    assert_eq!(shape, vec![("A", Some(200.0)), ("B", Some(50.0))]);
    assert_eq!(summaries[0].snapshot_count, 2);
}

#[test]
fn grouping_yields_one_first_seen_entry_per_pool_sorted_by_tvl() {
    let mut rng = Lcg(7);
    for _ in 0..200 {
        // Given: arbitrary snapshots sorted newest first
        let rows = random_snapshots(&mut rng);

        // When: they are grouped
        let summaries = group_latest_by_pool(&rows);

        // Then: exactly one summary per distinct pool
        let distinct = rows.iter().map(|row| row.pool_name.as_str()).collect::<BTreeSet<_>>();
        assert_eq!(summaries.len(), distinct.len());

        // And: each summary is the first occurrence of that pool
        for summary in &summaries {
            let first = rows
                .iter()
                .find(|row| row.pool_name == summary.pool_name())
                .expect("pool present in input");
            assert_eq!(&summary.latest, first);
        }

        // And: TVL is non-increasing with null as zero
        assert!(summaries.windows(2).all(|pair| {
            pair[0].total_tvl().unwrap_or(0.0) >= pair[1].total_tvl().unwrap_or(0.0)
        }));
    }
}

// =============================================================================
// Time series
// =============================================================================

#[test]
fn series_is_sorted_by_timestamp_for_any_input_order() {
    let mut rng = Lcg(11);
    for _ in 0..200 {
        let rows = random_history(&mut rng);
        let series = build_time_series(&rows, &[METRIC_APR, METRIC_TOTAL_TVL], LabelGranularity::DayHour);

        assert!(series
            .points
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp));
        assert_eq!(series.raw_sample_count, rows.len());
        assert_eq!(
            series.points.iter().map(|point| point.sample_count).sum::<usize>(),
            rows.len()
        );
    }
}

#[test]
fn relabelling_point_timestamps_reproduces_the_grouping() {
    let mut rng = Lcg(19);
    for granularity in [
        LabelGranularity::CalendarDate,
        LabelGranularity::DayHour,
        LabelGranularity::DateHour,
        LabelGranularity::Hour,
    ] {
        for _ in 0..50 {
            let rows = random_history(&mut rng);
            let series = build_time_series(&rows, &[METRIC_APR], granularity);

            for point in &series.points {
                assert_eq!(granularity.label(point.timestamp), point.label);
            }
            let labels = series.points.iter().map(|point| point.label.as_str()).collect::<BTreeSet<_>>();
            assert_eq!(labels.len(), series.len(), "labels are unique per point");
        }
    }
}

#[test]
fn null_metrics_stay_distinguishable_from_zero() {
    let rows = vec![
        HistoryRow::new(ts("2024-05-01T00:00:00Z"), Some(0.0), None).expect("valid"),
        HistoryRow::new(ts("2024-05-02T00:00:00Z"), None, Some(0.0)).expect("valid"),
    ];

    let series = build_time_series(&rows, &[METRIC_APR, METRIC_TOTAL_TVL], LabelGranularity::CalendarDate);

    assert_eq!(series.points[0].value(METRIC_APR), Some(0.0));
    assert_eq!(series.points[0].value(METRIC_TOTAL_TVL), None);
    assert_eq!(series.points[1].value(METRIC_APR), None);
}

// =============================================================================
// Domains and stats
// =============================================================================

#[test]
fn domain_for_ten_to_twenty_is_padded_by_half_a_unit() {
    let domain = compute_domain([10.0, 20.0], 0.05, 0.1).expect("non-empty input");
    assert_eq!((domain.min, domain.max), (9.5, 20.5));
}

#[test]
fn domain_always_contains_every_value_and_never_goes_negative() {
    let mut rng = Lcg(23);
    for _ in 0..200 {
        let values = (0..=rng.below(20))
            .map(|_| rng.below(10_000) as f64 / 100.0)
            .collect::<Vec<_>>();

        let domain = compute_domain(values.iter().copied(), 0.05, 0.1).expect("non-empty input");

        assert!(domain.min >= 0.0);
        assert!(values.iter().all(|value| *value >= domain.min && *value <= domain.max));
    }
}

#[test]
fn stats_for_five_ten_fifteen() {
    let stats = compute_summary_stats([5.0, 10.0, 15.0]).expect("non-empty input");
    assert_eq!((stats.min, stats.max, stats.avg), (5.0, 15.0, 10.0));
}

#[test]
fn empty_reductions_report_no_data() {
    assert!(compute_summary_stats(std::iter::empty()).is_none());
    assert!(compute_domain(std::iter::empty(), 0.05, 0.1).is_none());
}

// =============================================================================
// Time range filters
// =============================================================================

#[test]
fn seven_day_window_has_only_a_lower_bound() {
    let now = ts("2024-05-10T08:15:00Z");

    let filter = resolve_time_range_filter(TimeRangeSelection::Relative { days: 7 }, now);

    assert_eq!(filter.gte, Some(ts("2024-05-03T08:15:00Z")));
    assert_eq!(filter.lte, None);
    assert!(filter.contains(now));
}

// =============================================================================
// Protocol chart
// =============================================================================

fn protocol_records() -> Vec<AprRecord> {
    let days = ["2024-05-01T00:00:00Z", "2024-05-02T00:00:00Z"];
    let mut records = Vec::new();
    for (day_index, day) in days.into_iter().enumerate() {
        for (protocol, apr) in [("aerodrome", 20.0), ("velodrome", 10.0)] {
            records.push(
                AprRecord::new(records.len() as i64 + 1, ts(day), apr + day_index as f64, protocol, "")
                    .expect("valid record"),
            );
        }
    }
    records
}

#[test]
fn empty_protocol_selection_shows_every_protocol() {
    // Given: two protocols over two days and nothing selected
    let records = protocol_records();

    // When: the chart data is built
    let analytics = ProtocolAnalytics::from_records(&records, &ProtocolSelection::default());

    // Then: both protocols appear as fields on each daily point
    assert_eq!(analytics.shown, vec!["aerodrome", "velodrome"]);
    assert_eq!(analytics.series.len(), 2);
    assert_eq!(analytics.series.points[1].value("aerodrome"), Some(21.0));
    assert_eq!(analytics.series.points[1].value("velodrome"), Some(11.0));
}

#[test]
fn toggling_a_protocol_narrows_the_chart() {
    let records = protocol_records();
    let mut selection = ProtocolSelection::default();

    assert!(selection.toggle("velodrome"));
    let analytics = ProtocolAnalytics::from_records(&records, &selection);

    assert_eq!(analytics.shown, vec!["velodrome"]);
    assert!(analytics.series.points.iter().all(|point| point.value("aerodrome").is_none()));
    let overview = analytics.overview.expect("records present");
    assert_eq!((overview.lowest, overview.highest), (10.0, 11.0));

    assert!(!selection.toggle("velodrome"));
    assert!(selection.is_empty());
}

// =============================================================================
// Formatting
// =============================================================================

#[test]
fn summary_values_format_for_display() {
    let rows = vec![snapshot(1, "A", Some(1_234_567.4), ts("2024-05-01T00:00:00Z"))];
    let summaries = group_latest_by_pool(&rows);

    assert_eq!(format_apr(summaries[0].apr()), "10.00%");
    assert_eq!(format_currency(summaries[0].total_tvl()), "$1,234,567");
    assert_eq!(format_currency(None), "$0");
}

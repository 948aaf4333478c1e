use serde::{Deserialize, Serialize};

use super::axis::{
    compute_domain_with, compute_scaled_domain, AxisDomain, AxisPadding, DEFAULT_APR_DOMAIN,
    DEFAULT_TVL_DOMAIN,
};
use super::protocol::{distinct_protocols, filter_by_protocol, ProtocolSelection};
use super::series::{build_time_series, LabelGranularity, TimeSeries, METRIC_APR, METRIC_TOTAL_TVL};
use super::stats::{compute_summary_stats, AprOverview, SummaryStats};
use crate::{AprRecord, HistoryRow, UtcDateTime};

const PROTOCOL_DOMAIN_LOW: f64 = 0.9;
const PROTOCOL_DOMAIN_HIGH: f64 = 1.1;

/// Most recent row of a pool's history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentSnapshot {
    pub scraped_at: UtcDateTime,
    pub apr: Option<f64>,
    pub total_tvl: Option<f64>,
}

/// Everything the pool detail view needs for one pool and time range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolAnalytics {
    pub pool_name: String,
    pub current: Option<CurrentSnapshot>,
    pub apr_stats: Option<SummaryStats>,
    pub tvl_stats: Option<SummaryStats>,
    pub apr_domain: AxisDomain,
    pub tvl_domain: AxisDomain,
    pub series: TimeSeries,
}

impl PoolAnalytics {
    /// Builds the view from history rows in ascending timestamp order.
    ///
    /// Stats and domains are computed over the raw rows, so values dropped
    /// from the chart by label collisions still count.
    pub fn from_history(pool_name: impl Into<String>, rows: &[HistoryRow]) -> Self {
        let current = rows.iter().max_by_key(|row| row.scraped_at).map(|row| CurrentSnapshot {
            scraped_at: row.scraped_at,
            apr: row.apr,
            total_tvl: row.total_tvl,
        });
        let aprs = || rows.iter().filter_map(|row| row.apr);
        let tvls = || rows.iter().filter_map(|row| row.total_tvl);

        let granularity = LabelGranularity::for_timestamps(rows.iter().map(|row| row.scraped_at));

        Self {
            pool_name: pool_name.into(),
            current,
            apr_stats: compute_summary_stats(aprs()),
            tvl_stats: compute_summary_stats(tvls()),
            apr_domain: compute_domain_with(aprs(), AxisPadding::APR).unwrap_or(DEFAULT_APR_DOMAIN),
            tvl_domain: compute_domain_with(tvls(), AxisPadding::TVL).unwrap_or(DEFAULT_TVL_DOMAIN),
            series: build_time_series(rows, &[METRIC_APR, METRIC_TOTAL_TVL], granularity),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Per-protocol APR comparison view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolAnalytics {
    /// Every protocol present in the source data.
    pub protocols: Vec<String>,
    /// Protocols plotted after applying the selection.
    pub shown: Vec<String>,
    pub overview: Option<AprOverview>,
    pub domain: AxisDomain,
    pub series: TimeSeries,
}

impl ProtocolAnalytics {
    pub fn from_records(records: &[AprRecord], selection: &ProtocolSelection) -> Self {
        let filtered = filter_by_protocol(records, selection)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        let shown = distinct_protocols(&filtered);

        Self {
            protocols: distinct_protocols(records),
            shown,
            overview: AprOverview::from_records(&filtered),
            domain: compute_scaled_domain(
                filtered.iter().map(|record| record.apr),
                PROTOCOL_DOMAIN_LOW,
                PROTOCOL_DOMAIN_HIGH,
            )
            .unwrap_or(DEFAULT_APR_DOMAIN),
            series: build_time_series(&filtered, &[METRIC_APR], LabelGranularity::CalendarDate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ts: &str, apr: Option<f64>, tvl: Option<f64>) -> HistoryRow {
        HistoryRow::new(UtcDateTime::parse(ts).expect("valid"), apr, tvl).expect("valid row")
    }

    #[test]
    fn empty_history_uses_fallback_domains() {
        let analytics = PoolAnalytics::from_history("WETH/USDC", &[]);

        assert!(analytics.is_empty());
        assert_eq!(analytics.current, None);
        assert_eq!(analytics.apr_stats, None);
        assert_eq!(analytics.apr_domain, DEFAULT_APR_DOMAIN);
        assert_eq!(analytics.tvl_domain, DEFAULT_TVL_DOMAIN);
    }

    #[test]
    fn rows_a_month_apart_stay_separate_points() {
        let rows = vec![
            row("2024-01-05T14:00:00Z", Some(10.0), Some(1000.0)),
            row("2024-02-05T14:00:00Z", Some(90.0), Some(2000.0)),
        ];

        let analytics = PoolAnalytics::from_history("WETH/USDC", &rows);

        let series = &analytics.series;
        assert_eq!(series.granularity, LabelGranularity::DateHour);
        assert_eq!(series.len(), 2);
        assert_eq!(series.overwritten_samples, 0);
        for (point, row) in series.points.iter().zip(&rows) {
            assert_eq!(point.timestamp, row.scraped_at);
            assert_eq!(point.value(METRIC_APR), row.apr);
        }
        assert_eq!(series.points[0].label, "2024-01-05 14");
    }

    #[test]
    fn current_snapshot_is_latest_row() {
        let rows = vec![
            row("2024-05-01T10:00:00Z", Some(10.0), Some(5000.0)),
            row("2024-05-01T11:00:00Z", Some(20.0), None),
        ];

        let analytics = PoolAnalytics::from_history("WETH/USDC", &rows);

        let current = analytics.current.expect("current");
        assert_eq!(current.apr, Some(20.0));
        assert_eq!(current.total_tvl, None);
        assert_eq!(analytics.apr_domain, AxisDomain::new(9.5, 20.5));
        assert_eq!(analytics.tvl_stats.map(|stats| stats.count), Some(1));
        assert_eq!(analytics.series.granularity, LabelGranularity::Hour);
    }

    #[test]
    fn protocol_view_respects_selection() {
        let record = |date: &str, protocol: &str, apr: f64| {
            AprRecord::new(0, UtcDateTime::parse(date).expect("valid"), apr, protocol, "")
                .expect("valid record")
        };
        let records = vec![
            record("2024-05-01", "aero", 10.0),
            record("2024-05-01", "velo", 40.0),
            record("2024-05-02", "aero", 30.0),
        ];

        let analytics = ProtocolAnalytics::from_records(&records, &ProtocolSelection::new(["aero"]));

        assert_eq!(analytics.protocols, vec!["aero", "velo"]);
        assert_eq!(analytics.shown, vec!["aero"]);
        assert_eq!(analytics.overview.map(|o| o.trend), Some(20.0));
        assert_eq!(analytics.domain, AxisDomain::new(9.0, 33.0));
        assert_eq!(analytics.series.len(), 2);
    }
}

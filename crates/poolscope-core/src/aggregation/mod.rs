//! # Aggregation Engine
//!
//! Pure functions turning fetched rows into display-ready values.
//!
//! | Function | Output |
//! |----------|--------|
//! | [`group_latest_by_pool`] | One [`PoolSummary`](crate::PoolSummary) per pool, by TVL |
//! | [`build_time_series`] | Labelled chart points |
//! | [`compute_domain`] | Padded axis bounds |
//! | [`compute_summary_stats`] | Min / max / mean |
//! | [`resolve_time_range_filter`] | Timestamp bounds for a range selection |
//!
//! Reductions over possibly-empty input return `Option`.

mod analytics;
mod axis;
mod filter;
mod latest;
mod protocol;
mod series;
mod stats;

pub use analytics::{CurrentSnapshot, PoolAnalytics, ProtocolAnalytics};
pub use axis::{
    compute_domain, compute_domain_with, compute_scaled_domain, AxisDomain, AxisPadding, Rounding,
    DEFAULT_APR_DOMAIN, DEFAULT_TVL_DOMAIN,
};
pub use filter::resolve_time_range_filter;
pub use latest::{group_latest_by_pool, search_pools};
pub use protocol::{distinct_protocols, filter_by_protocol, ProtocolSelection};
pub use series::{
    build_time_series, LabelGranularity, MetricRow, TimeSeries, TimeSeriesPoint, METRIC_APR,
    METRIC_TOTAL_FEES, METRIC_TOTAL_TVL, METRIC_TOTAL_VOLUME,
};
pub use stats::{compute_summary_stats, percent_change, AprOverview, SummaryStats};

//! # Domain Models
//!
//! Canonical types for pool snapshot data.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PoolSnapshot`] | One scraped observation of a pool |
//! | [`HistoryRow`] | Narrow `(scraped_at, apr, total_tvl)` history row |
//! | [`AprRecord`] | Per-protocol APR observation |
//! | [`PoolSummary`] | Latest snapshot for one pool name |
//! | [`TimeRange`] | Named lookback presets |
//! | [`TimeRangeSelection`] | Lookback window or explicit date pair |
//! | [`TimestampFilter`] | Inclusive bounds pushed to the data source |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Metric fields are nullable and, when present, must be finite and
//! non-negative. Construction helpers enforce that; rows decoded from the
//! data source are checked with `validate`.

mod snapshot;
mod time_range;
mod timestamp;

pub use snapshot::{AprRecord, HistoryRow, PoolSnapshot, PoolSummary};
pub use time_range::{TimeRange, TimeRangeSelection, TimestampFilter};
pub use timestamp::{format_date, parse_date, UtcDateTime};

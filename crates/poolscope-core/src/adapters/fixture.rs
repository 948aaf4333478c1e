use std::future::Future;
use std::pin::Pin;

use crate::data_source::{
    AprRequest, HealthStatus, HistoryRequest, RowBatch, SnapshotSource, SourceFuture, SourceId,
};
use crate::{AprRecord, HistoryRow, PoolSnapshot, UtcDateTime};

/// `(pool name, base, quote, base APR, base TVL)`
const FIXTURE_POOLS: [(&str, &str, &str, f64, f64); 5] = [
    ("vAMM-WETH/USDC", "WETH", "USDC", 24.0, 18_500_000.0),
    ("CL100-WETH/cbBTC", "WETH", "cbBTC", 31.5, 9_200_000.0),
    ("sAMM-USDC/USDbC", "USDC", "USDbC", 6.2, 4_100_000.0),
    ("vAMM-AERO/WETH", "AERO", "WETH", 58.0, 2_750_000.0),
    ("CL1-USDC/USDT", "USDC", "USDT", 3.4, 950_000.0),
];

/// `(protocol, base APR)`
const FIXTURE_PROTOCOLS: [(&str, f64); 3] = [("aerodrome", 28.0), ("velodrome", 21.0), ("uniswap", 12.0)];

/// In-memory source with deterministic data, used offline and in tests.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    snapshots: Vec<PoolSnapshot>,
    apr_records: Vec<AprRecord>,
}

impl FixtureSource {
    pub fn new(snapshots: Vec<PoolSnapshot>, apr_records: Vec<AprRecord>) -> Self {
        Self {
            snapshots,
            apr_records,
        }
    }

    /// Hourly snapshots for a fixed pool set and daily protocol APR covering
    /// the `days` days before `anchor`.
    pub fn generated(anchor: UtcDateTime, days: u32) -> Self {
        let hours = i64::from(days) * 24;
        let anchor_secs = anchor.unix_timestamp() - anchor.unix_timestamp().rem_euclid(3_600);
        let mut snapshots = Vec::with_capacity(FIXTURE_POOLS.len() * hours as usize);
        let mut id = 1;

        for hour in 0..hours {
            let Ok(scraped_at) = UtcDateTime::from_unix_timestamp(anchor_secs - hour * 3_600) else {
                continue;
            };
            for (index, (name, base, quote, apr, tvl)) in FIXTURE_POOLS.into_iter().enumerate() {
                let phase = hour as f64 / 9.0 + index as f64;
                let total_tvl = tvl * (1.0 + 0.04 * phase.cos());
                let total_volume = total_tvl * 0.08 * (1.0 + 0.3 * phase.sin().abs());
                snapshots.push(PoolSnapshot {
                    id,
                    pool_name: name.to_owned(),
                    base_token_symbol: base.to_owned(),
                    base_token_volume: Some(total_volume / 2.0),
                    base_token_fees: Some(total_volume * 0.0015),
                    base_token_tvl: Some(total_tvl / 2.0),
                    quote_token_symbol: quote.to_owned(),
                    quote_token_volume: Some(total_volume / 2.0),
                    quote_token_fees: Some(total_volume * 0.0015),
                    quote_token_tvl: Some(total_tvl / 2.0),
                    total_volume: Some(total_volume),
                    total_fees: Some(total_volume * 0.003),
                    total_tvl: Some(total_tvl),
                    apr: Some(round2(apr * (1.0 + 0.15 * phase.sin()))),
                    scraped_at,
                    created_at: Some(scraped_at),
                });
                id += 1;
            }
        }

        let mut apr_records = Vec::new();
        for day in (0..i64::from(days)).rev() {
            let Ok(date) = UtcDateTime::from_unix_timestamp(anchor_secs - day * 86_400) else {
                continue;
            };
            let date = UtcDateTime::start_of_day(date.date());
            for (index, (protocol, apr)) in FIXTURE_PROTOCOLS.into_iter().enumerate() {
                let phase = day as f64 / 3.0 + index as f64;
                apr_records.push(AprRecord {
                    id: apr_records.len() as i64 + 1,
                    date,
                    apr: round2(apr * (1.0 + 0.2 * phase.sin())),
                    protocol: protocol.to_owned(),
                    pool_name: String::new(),
                    created_at: Some(date),
                });
            }
        }

        Self::new(snapshots, apr_records)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl SnapshotSource for FixtureSource {
    fn id(&self) -> SourceId {
        SourceId::Fixture
    }

    fn list_snapshots<'a>(&'a self) -> SourceFuture<'a, RowBatch<PoolSnapshot>> {
        Box::pin(async move {
            let mut rows = self.snapshots.clone();
            rows.sort_by(|left, right| right.scraped_at.cmp(&left.scraped_at));
            Ok(RowBatch::new(rows))
        })
    }

    fn pool_history<'a>(&'a self, req: HistoryRequest) -> SourceFuture<'a, RowBatch<HistoryRow>> {
        Box::pin(async move {
            let mut rows = self
                .snapshots
                .iter()
                .filter(|row| row.pool_name == req.pool_name && req.filter.contains(row.scraped_at))
                .map(HistoryRow::from)
                .collect::<Vec<_>>();
            rows.sort_by_key(|row| row.scraped_at);
            Ok(RowBatch::new(rows))
        })
    }

    fn apr_records<'a>(&'a self, req: AprRequest) -> SourceFuture<'a, RowBatch<AprRecord>> {
        Box::pin(async move {
            let mut rows = self
                .apr_records
                .iter()
                .filter(|record| req.filter.contains(record.date))
                .cloned()
                .collect::<Vec<_>>();
            rows.sort_by_key(|record| record.date);
            Ok(RowBatch::new(rows))
        })
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async move { HealthStatus::healthy("fixture://in-memory") })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TimestampFilter;

    fn anchor() -> UtcDateTime {
        UtcDateTime::parse("2024-05-10T12:30:00Z").expect("valid")
    }

    #[tokio::test]
    async fn generated_data_is_deterministic() {
        let first = FixtureSource::generated(anchor(), 2);
        let second = FixtureSource::generated(anchor(), 2);

        let left = first.list_snapshots().await.expect("rows");
        let right = second.list_snapshots().await.expect("rows");

        assert_eq!(left, right);
        assert_eq!(left.rows.len(), FIXTURE_POOLS.len() * 48);
        assert_eq!(
            left.rows[0].scraped_at,
            UtcDateTime::parse("2024-05-10T12:00:00Z").expect("valid")
        );
        assert!(left.rows.iter().all(|row| row.validate().is_ok()));
    }

    #[tokio::test]
    async fn history_applies_pool_and_bounds() {
        let source = FixtureSource::generated(anchor(), 3);
        let filter = TimestampFilter {
            gte: Some(anchor().minus_days(1)),
            lte: None,
        };
        let req = HistoryRequest::new("vAMM-WETH/USDC", filter).expect("valid");

        let batch = source.pool_history(req).await.expect("rows");

        assert_eq!(batch.rows.len(), 24);
        assert!(batch.rows.windows(2).all(|pair| pair[0].scraped_at < pair[1].scraped_at));
    }

    #[tokio::test]
    async fn apr_records_are_daily_per_protocol() {
        let source = FixtureSource::generated(anchor(), 4);

        let batch = source.apr_records(AprRequest::all()).await.expect("rows");

        assert_eq!(batch.rows.len(), 4 * FIXTURE_PROTOCOLS.len());
        assert!(batch.rows.windows(2).all(|pair| pair[0].date <= pair[1].date));
    }
}

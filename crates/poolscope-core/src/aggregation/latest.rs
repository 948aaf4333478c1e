use std::collections::HashMap;

use crate::{PoolSnapshot, PoolSummary};

/// Collapses snapshots to one [`PoolSummary`] per distinct pool name.
///
/// The kept row is the one with the greatest `scraped_at`; rows with equal
/// timestamps keep whichever was seen first, so input already sorted
/// newest-first resolves to the first occurrence of each pool. The result is
/// ordered by total TVL descending with missing TVL counted as zero; pools
/// with equal TVL keep their first-seen order.
pub fn group_latest_by_pool(rows: &[PoolSnapshot]) -> Vec<PoolSummary> {
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(rows.len());
    let mut summaries: Vec<PoolSummary> = Vec::new();

    for row in rows {
        match positions.get(row.pool_name.as_str()) {
            Some(&position) => {
                let summary = &mut summaries[position];
                summary.snapshot_count += 1;
                if row.scraped_at > summary.latest.scraped_at {
                    summary.latest = row.clone();
                }
            }
            None => {
                positions.insert(row.pool_name.as_str(), summaries.len());
                summaries.push(PoolSummary {
                    latest: row.clone(),
                    snapshot_count: 1,
                });
            }
        }
    }

    summaries.sort_by(|left, right| {
        right
            .total_tvl()
            .unwrap_or(0.0)
            .total_cmp(&left.total_tvl().unwrap_or(0.0))
    });
    summaries
}

/// Case-insensitive substring search over pool names, ranked by APR
/// descending (missing APR counted as zero). An empty query matches every
/// pool.
pub fn search_pools<'a>(summaries: &'a [PoolSummary], query: &str) -> Vec<&'a PoolSummary> {
    let needle = query.trim().to_lowercase();
    let mut matches = summaries
        .iter()
        .filter(|summary| summary.pool_name().to_lowercase().contains(&needle))
        .collect::<Vec<_>>();

    matches.sort_by(|left, right| {
        right
            .apr()
            .unwrap_or(0.0)
            .total_cmp(&left.apr().unwrap_or(0.0))
    });
    matches
}

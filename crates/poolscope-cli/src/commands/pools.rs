use poolscope_core::format::{format_apr, format_currency};
use poolscope_core::{Dashboard, PoolSummary, SnapshotSource};
use serde::Serialize;

use crate::cli::PoolsArgs;
use crate::error::CliError;
use crate::output::TextTable;

use super::{skipped_rows_warning, CommandResult, SharedSource};

#[derive(Debug, Serialize)]
struct PoolsResponseData<'a> {
    total: usize,
    pools: &'a [PoolSummary],
}

pub async fn run(args: &PoolsArgs, dashboard: &Dashboard<SharedSource>) -> Result<CommandResult, CliError> {
    if args.limit == Some(0) {
        return Err(CliError::Command(String::from(
            "--limit must be greater than zero",
        )));
    }

    let source = Some(dashboard.source().id());
    if let Err(error) = dashboard.refresh_pools().await {
        let data = serde_json::to_value(PoolsResponseData {
            total: 0,
            pools: &[],
        })?;
        return Ok(CommandResult::ok(data, source).with_source_error(&error));
    }

    let state = dashboard.state();
    let shown = &state.pools[..args.limit.unwrap_or(usize::MAX).min(state.pools.len())];
    let data = serde_json::to_value(PoolsResponseData {
        total: state.pools.len(),
        pools: shown,
    })?;

    let mut result = CommandResult::ok(data, source).with_table(pool_table(shown));
    if let Some(warning) = skipped_rows_warning(state.skipped_rows) {
        result = result.with_warning(warning);
    }
    if state.pools.is_empty() {
        result = result.with_warning("no pools available");
    }
    Ok(result)
}

/// Shared by `pools` and `search`.
pub(super) fn pool_table<'a>(pools: impl IntoIterator<Item = &'a PoolSummary>) -> TextTable {
    let mut table = TextTable::new(["Pool", "APR", "TVL", "Volume", "Snapshots", "As of"]);
    for pool in pools {
        table.push_row(vec![
            pool.pool_name().to_owned(),
            format_apr(pool.apr()),
            format_currency(pool.total_tvl()),
            format_currency(pool.latest.total_volume),
            pool.snapshot_count.to_string(),
            pool.as_of().to_string(),
        ]);
    }
    table
}

use poolscope_core::{Dashboard, PoolSummary, SnapshotSource};
use serde::Serialize;

use crate::cli::SearchArgs;
use crate::error::CliError;

use super::pools::pool_table;
use super::{skipped_rows_warning, CommandResult, SharedSource};

#[derive(Debug, Serialize)]
struct SearchResponseData {
    query: String,
    results: Vec<PoolSummary>,
}

pub async fn run(args: &SearchArgs, dashboard: &Dashboard<SharedSource>) -> Result<CommandResult, CliError> {
    let query = args.query.trim();
    if query.is_empty() {
        return Err(CliError::Command(String::from("query must not be empty")));
    }

    let source = Some(dashboard.source().id());
    if let Err(error) = dashboard.refresh_pools().await {
        let data = serde_json::to_value(SearchResponseData {
            query: query.to_owned(),
            results: Vec::new(),
        })?;
        return Ok(CommandResult::ok(data, source).with_source_error(&error));
    }

    let results = dashboard.search(query);
    let table = pool_table(&results);
    let no_match = results.is_empty();
    let data = serde_json::to_value(SearchResponseData {
        query: query.to_owned(),
        results,
    })?;

    let mut result = CommandResult::ok(data, source).with_table(table);
    if let Some(warning) = skipped_rows_warning(dashboard.state().skipped_rows) {
        result = result.with_warning(warning);
    }
    if no_match {
        result = result.with_warning(format!("no pools match '{query}'"));
    }
    Ok(result)
}

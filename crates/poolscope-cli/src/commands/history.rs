use poolscope_core::format::{
    format_apr, format_currency, format_currency_compact, format_signed_percent,
};
use poolscope_core::{
    Dashboard, HistoryOutcome, PoolAnalytics, SnapshotSource, SummaryStats, TimeRange,
    TimeRangeSelection, UtcDateTime, ValidationError, METRIC_APR, METRIC_TOTAL_TVL,
};
use serde::Serialize;
use time::Date;

use crate::cli::HistoryArgs;
use crate::error::CliError;
use crate::output::TextTable;

use super::{skipped_rows_warning, CommandResult, SharedSource};

#[derive(Debug, Serialize)]
struct HistoryResponseData {
    pool: String,
    range: String,
    selection: TimeRangeSelection,
    #[serde(skip_serializing_if = "Option::is_none")]
    analytics: Option<PoolAnalytics>,
}

pub async fn run(args: &HistoryArgs, dashboard: &Dashboard<SharedSource>) -> Result<CommandResult, CliError> {
    let pool = args.pool.trim();
    if pool.is_empty() {
        return Err(ValidationError::EmptyPoolName.into());
    }

    let selection = selection_from_args(args, UtcDateTime::now().date());
    let range = selection.describe();
    let source = Some(dashboard.source().id());

    dashboard
        .set_time_range(selection)
        .await
        .map_err(|error| CliError::Command(error.to_string()))?;
    let outcome = dashboard.select_pool(pool).await;

    let mut warnings = Vec::new();
    if let TimeRangeSelection::Explicit {
        start: Some(start),
        end: Some(end),
    } = selection
    {
        if start > end {
            warnings.push(String::from("--start is after --end; no rows can match"));
        }
    }

    let analytics = match outcome {
        Ok(HistoryOutcome::Applied { .. }) => dashboard.analytics(),
        Ok(HistoryOutcome::Discarded | HistoryOutcome::NoSelection) => None,
        Err(error) => {
            let data = serde_json::to_value(HistoryResponseData {
                pool: pool.to_owned(),
                range,
                selection,
                analytics: None,
            })?;
            return Ok(CommandResult::ok(data, source)
                .with_warnings(warnings)
                .with_source_error(&error));
        }
    };

    if let Some(warning) = skipped_rows_warning(dashboard.state().skipped_rows) {
        warnings.push(warning);
    }

    let mut tables = Vec::new();
    match &analytics {
        Some(view) if !view.is_empty() => {
            let series = &view.series;
            if series.overwritten_samples > 0 {
                warnings.push(format!(
                    "{} value(s) were replaced by later samples sharing a chart label \
                     ({} raw rows, {} points); stats cover every row",
                    series.overwritten_samples,
                    series.raw_sample_count,
                    series.len()
                ));
            }
            tables.push(summary_table(view, &range));
            tables.push(series_table(view));
        }
        _ => warnings.push(format!("no history for '{pool}' in {range}")),
    }

    let data = serde_json::to_value(HistoryResponseData {
        pool: pool.to_owned(),
        range,
        selection,
        analytics,
    })?;

    let mut result = CommandResult::ok(data, source).with_warnings(warnings);
    for table in tables {
        result = result.with_table(table);
    }
    Ok(result)
}

/// Explicit dates switch the selection to a custom range.
fn selection_from_args(args: &HistoryArgs, today: Date) -> TimeRangeSelection {
    let range = if args.start.is_some() || args.end.is_some() {
        TimeRange::Custom
    } else {
        args.range
    };
    TimeRangeSelection::from_preset(range, args.start, args.end, today)
}

fn summary_table(view: &PoolAnalytics, range: &str) -> TextTable {
    let current = view.current.as_ref();
    let mut table = TextTable::new(["Metric", "Current", "Min", "Max", "Avg", "Axis"])
        .titled(format!("{} ({range})", view.pool_name));

    let stats_cells = |stats: Option<SummaryStats>, fmt: fn(Option<f64>) -> String| match stats {
        Some(stats) => [fmt(Some(stats.min)), fmt(Some(stats.max)), fmt(Some(stats.avg))],
        None => ["-".to_owned(), "-".to_owned(), "-".to_owned()],
    };

    let [min, max, avg] = stats_cells(view.apr_stats, format_apr);
    table.push_row(vec![
        String::from("APR"),
        format_apr(current.and_then(|snapshot| snapshot.apr)),
        min,
        max,
        avg,
        format!("{:.1} - {:.1}", view.apr_domain.min, view.apr_domain.max),
    ]);

    let [min, max, avg] = stats_cells(view.tvl_stats, format_currency);
    table.push_row(vec![
        String::from("TVL"),
        format_currency(current.and_then(|snapshot| snapshot.total_tvl)),
        min,
        max,
        avg,
        format!(
            "{} - {}",
            format_currency_compact(Some(view.tvl_domain.min)),
            format_currency_compact(Some(view.tvl_domain.max))
        ),
    ]);
    table
}

/// One row per chart point; change columns compare against the previous point.
fn series_table(view: &PoolAnalytics) -> TextTable {
    let series = &view.series;
    let apr_changes = series.percent_changes(METRIC_APR);
    let tvl_changes = series.percent_changes(METRIC_TOTAL_TVL);
    let change_cell = |change: Option<f64>| change.map_or_else(|| String::from("-"), format_signed_percent);

    let mut table = TextTable::new(["Label", "APR", "APR chg", "TVL", "TVL chg", "Samples"]);
    for ((point, apr_change), tvl_change) in series.points.iter().zip(apr_changes).zip(tvl_changes) {
        table.push_row(vec![
            point.label.clone(),
            point.value(METRIC_APR).map_or_else(|| String::from("-"), |apr| format_apr(Some(apr))),
            change_cell(apr_change),
            point
                .value(METRIC_TOTAL_TVL)
                .map_or_else(|| String::from("-"), |tvl| format_currency(Some(tvl))),
            change_cell(tvl_change),
            point.sample_count.to_string(),
        ]);
    }
    table
}

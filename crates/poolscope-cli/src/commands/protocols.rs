use poolscope_core::format::{format_apr, format_signed_percent};
use poolscope_core::{AprRequest, ProtocolAnalytics, ProtocolSelection, SnapshotSource};

use crate::cli::ProtocolsArgs;
use crate::error::CliError;
use crate::output::TextTable;

use super::{skipped_rows_warning, CommandResult};

pub async fn run(args: &ProtocolsArgs, source: &dyn SnapshotSource) -> Result<CommandResult, CliError> {
    let selection = ProtocolSelection::new(
        args.protocols
            .iter()
            .map(|protocol| protocol.trim())
            .filter(|protocol| !protocol.is_empty()),
    );

    let batch = match source.apr_records(AprRequest::all()).await {
        Ok(batch) => batch,
        Err(error) => {
            let data = serde_json::to_value(ProtocolAnalytics::from_records(&[], &selection))?;
            return Ok(CommandResult::ok(data, Some(source.id())).with_source_error(&error));
        }
    };

    let view = ProtocolAnalytics::from_records(&batch.rows, &selection);

    let mut warnings = Vec::new();
    for requested in selection.iter() {
        if !view.protocols.iter().any(|known| known == requested) {
            warnings.push(format!("protocol '{requested}' has no APR records"));
        }
    }
    if let Some(warning) = skipped_rows_warning(batch.skipped) {
        warnings.push(warning);
    }

    let mut result = CommandResult::ok(serde_json::to_value(&view)?, Some(source.id()))
        .with_warnings(warnings);
    match view.overview {
        Some(overview) => {
            let mut summary = TextTable::new(["Highest", "Lowest", "Average", "Records", "Trend"]);
            summary.push_row(vec![
                format_apr(Some(overview.highest)),
                format_apr(Some(overview.lowest)),
                format_apr(Some(overview.average)),
                overview.records.to_string(),
                format_signed_percent(overview.trend),
            ]);
            result = result
                .with_table(summary)
                .with_table(series_table(&view));
        }
        None => result = result.with_warning("no APR records available"),
    }
    Ok(result)
}

fn series_table(view: &ProtocolAnalytics) -> TextTable {
    let mut table = TextTable::new(
        std::iter::once(String::from("Date")).chain(view.shown.iter().cloned()),
    );
    for point in &view.series.points {
        let mut row = vec![point.label.clone()];
        row.extend(view.shown.iter().map(|protocol| {
            point
                .value(protocol)
                .map_or_else(|| String::from("-"), |apr| format_apr(Some(apr)))
        }));
        table.push_row(row);
    }
    table
}

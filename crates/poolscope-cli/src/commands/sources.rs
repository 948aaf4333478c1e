use poolscope_core::{HealthState, HealthStatus, Settings, SnapshotSource, SourceId};
use serde::Serialize;

use crate::error::CliError;
use crate::output::TextTable;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct SourcesResponseData {
    source: SourceId,
    health: HealthStatus,
    credentials_configured: bool,
    snapshot_table: String,
    apr_table: String,
}

pub async fn run(source: &dyn SnapshotSource, settings: &Settings) -> Result<CommandResult, CliError> {
    let health = source.health().await;

    let mut table = TextTable::new(["Source", "State", "Endpoint", "Detail"]);
    table.push_row(vec![
        source.id().to_string(),
        state_label(health.state).to_owned(),
        health.endpoint.clone(),
        health.detail.clone().unwrap_or_default(),
    ]);

    let unhealthy = (health.state == HealthState::Unhealthy).then(|| {
        format!(
            "data source is unreachable: {}",
            health.detail.as_deref().unwrap_or("no detail")
        )
    });

    let data = serde_json::to_value(SourcesResponseData {
        source: source.id(),
        health,
        credentials_configured: settings.has_valid_credentials(),
        snapshot_table: settings.snapshot_table.clone(),
        apr_table: settings.apr_table.clone(),
    })?;

    let mut result = CommandResult::ok(data, Some(source.id())).with_table(table);
    if let Some(warning) = unhealthy {
        result = result.with_warning(warning);
    }
    Ok(result)
}

const fn state_label(state: HealthState) -> &'static str {
    match state {
        HealthState::Healthy => "healthy",
        HealthState::Degraded => "degraded",
        HealthState::Unhealthy => "unhealthy",
    }
}

mod history;
mod pools;
mod protocols;
mod search;
mod sources;
mod theme;

use std::sync::Arc;
use std::time::Instant;

use poolscope_core::{
    Dashboard, Envelope, EnvelopeError, FixtureSource, PostgrestSource, ReqwestHttpClient,
    Settings, SnapshotSource, SourceError, SourceId, UtcDateTime,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::Metadata;
use crate::output::TextTable;

/// Days of generated history served by `--mock`.
const FIXTURE_DAYS: u32 = 180;

pub type SharedSource = Arc<dyn SnapshotSource>;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub source: Option<SourceId>,
    pub tables: Vec<TextTable>,
}

impl CommandResult {
    pub fn ok(data: Value, source: Option<SourceId>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            source,
            tables: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_source_error(mut self, error: &SourceError) -> Self {
        self.errors.push(EnvelopeError::from(error));
        self
    }

    pub fn with_table(mut self, table: TextTable) -> Self {
        self.tables.push(table);
        self
    }
}

/// Envelope plus the text tables used by `--format table`.
pub struct Rendered {
    pub envelope: Envelope<Value>,
    pub tables: Vec<TextTable>,
}

pub async fn run(cli: &Cli) -> Result<Rendered, CliError> {
    let started = Instant::now();
    let settings = Settings::from_env();
    info!(command = command_name(&cli.command), mock = cli.mock, "running command");

    let mut result = match &cli.command {
        Command::Theme(args) => theme::run(args, &settings)?,
        Command::Pools(args) => pools::run(args, &dashboard(cli, &settings)).await?,
        Command::Search(args) => search::run(args, &dashboard(cli, &settings)).await?,
        Command::History(args) => history::run(args, &dashboard(cli, &settings)).await?,
        Command::Protocols(args) => protocols::run(args, build_source(cli, &settings).as_ref()).await?,
        Command::Sources => sources::run(build_source(cli, &settings).as_ref(), &settings).await?,
    };
    if let Some(warning) = credentials_warning(result.source, &settings) {
        result = result.with_warning(warning);
    }

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut metadata = Metadata::new(result.source, latency_ms);
    for warning in result.warnings.drain(..) {
        metadata.push_warning(warning);
    }

    let envelope = Envelope::with_errors(metadata.into_envelope_meta()?, result.data, result.errors)?;
    Ok(Rendered {
        envelope,
        tables: result.tables,
    })
}

fn dashboard(cli: &Cli, settings: &Settings) -> Dashboard<SharedSource> {
    Dashboard::new(build_source(cli, settings))
}

fn build_source(cli: &Cli, settings: &Settings) -> SharedSource {
    if cli.mock {
        return Arc::new(FixtureSource::generated(UtcDateTime::now(), FIXTURE_DAYS));
    }

    if !settings.has_valid_credentials() {
        warn!(endpoint = %settings.supabase_url, "running with placeholder data source credentials");
    }
    Arc::new(
        PostgrestSource::new(settings.clone(), Arc::new(ReqwestHttpClient::new()))
            .with_timeout_ms(cli.timeout_ms),
    )
}

/// Only commands that queried the PostgREST source care about credentials.
fn credentials_warning(source: Option<SourceId>, settings: &Settings) -> Option<&'static str> {
    (source == Some(SourceId::Postgrest) && !settings.has_valid_credentials()).then_some(
        "data source credentials are not configured; set POOLSCOPE_SUPABASE_URL and \
         POOLSCOPE_SUPABASE_ANON_KEY or pass --mock",
    )
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Pools(_) => "pools",
        Command::Search(_) => "search",
        Command::History(_) => "history",
        Command::Protocols(_) => "protocols",
        Command::Sources => "sources",
        Command::Theme(_) => "theme",
    }
}

/// Warning for rows the source dropped as malformed, if any.
fn skipped_rows_warning(skipped: usize) -> Option<String> {
    (skipped > 0).then(|| format!("{skipped} malformed row(s) were skipped"))
}

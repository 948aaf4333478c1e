use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::ValidatedRow;
use crate::config::Settings;
use crate::data_source::{
    AprRequest, HealthStatus, HistoryRequest, RowBatch, SnapshotSource, SourceError, SourceFuture,
    SourceId,
};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, NoopHttpClient, DEFAULT_TIMEOUT_MS};
use crate::query::{SortOrder, TableQuery};
use crate::{AprRecord, HistoryRow, PoolSnapshot, TimestampFilter};

const HISTORY_COLUMNS: [&str; 3] = ["scraped_at", "apr", "total_tvl"];

/// Reads pool tables through a hosted PostgREST endpoint.
#[derive(Clone)]
pub struct PostgrestSource {
    settings: Settings,
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl Default for PostgrestSource {
    fn default() -> Self {
        Self::new(Settings::default(), Arc::new(NoopHttpClient))
    }
}

impl PostgrestSource {
    pub fn new(settings: Settings, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            settings,
            http_client,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Full `GET` URL for `query`.
    pub fn url_for(&self, query: &TableQuery) -> String {
        format!(
            "{}/rest/v1/{}?{}",
            self.settings.supabase_url,
            query.table(),
            query
        )
    }

    pub fn snapshots_query(&self) -> TableQuery {
        TableQuery::from_table(&self.settings.snapshot_table)
            .order("scraped_at", SortOrder::Descending)
    }

    pub fn history_query(&self, req: &HistoryRequest) -> TableQuery {
        let query = TableQuery::from_table(&self.settings.snapshot_table)
            .select(HISTORY_COLUMNS)
            .eq("pool_name", &req.pool_name);
        with_bounds(query, "scraped_at", req.filter).order("scraped_at", SortOrder::Ascending)
    }

    pub fn apr_query(&self, req: &AprRequest) -> TableQuery {
        let query = TableQuery::from_table(&self.settings.apr_table);
        with_bounds(query, "date", req.filter).order("date", SortOrder::Ascending)
    }

    async fn fetch<T>(&self, query: TableQuery) -> Result<RowBatch<T>, SourceError>
    where
        T: DeserializeOwned + ValidatedRow,
    {
        let url = self.url_for(&query);
        debug!(%url, "querying data source");

        let request = HttpRequest::get(url)
            .with_header("accept", "application/json")
            .with_auth(&HttpAuth::ApiKey(self.settings.anon_key.clone()))
            .with_timeout_ms(self.timeout_ms);

        let response = self.http_client.execute(request).await.map_err(|error| {
            if error.timed_out() {
                SourceError::unavailable(format!(
                    "request to '{}' timed out after {} ms",
                    query.table(),
                    self.timeout_ms
                ))
            } else {
                SourceError::unavailable(format!("transport error: {}", error.message()))
            }
        })?;

        if !response.is_success() {
            let message = format!(
                "data source returned status {} for table '{}'",
                response.status,
                query.table()
            );
            return Err(match response.status {
                400..=499 => SourceError::invalid_request(message),
                _ => SourceError::unavailable(message),
            });
        }

        decode_rows(query.table(), &response.body)
    }
}

fn with_bounds(query: TableQuery, column: &str, filter: TimestampFilter) -> TableQuery {
    let query = match filter.gte {
        Some(gte) => query.gte(column, gte),
        None => query,
    };
    match filter.lte {
        Some(lte) => query.lte(column, lte),
        None => query,
    }
}

/// Decodes a JSON array, skipping (and logging) rows that fail to decode or
/// validate.
pub(crate) fn decode_rows<T>(table: &str, body: &str) -> Result<RowBatch<T>, SourceError>
where
    T: DeserializeOwned + ValidatedRow,
{
    let values: Vec<Value> = serde_json::from_str(body).map_err(|error| {
        SourceError::decode(format!("response from '{table}' is not a JSON array: {error}"))
    })?;

    let mut batch = RowBatch::new(Vec::with_capacity(values.len()));
    for (index, value) in values.into_iter().enumerate() {
        let row = serde_json::from_value::<T>(value)
            .map_err(|error| error.to_string())
            .and_then(|row| row.check().map(|()| row).map_err(|error| error.to_string()));
        match row {
            Ok(row) => batch.rows.push(row),
            Err(reason) => {
                warn!(table, index, %reason, "skipping malformed row");
                batch.skipped += 1;
            }
        }
    }
    Ok(batch)
}

impl SnapshotSource for PostgrestSource {
    fn id(&self) -> SourceId {
        SourceId::Postgrest
    }

    fn list_snapshots<'a>(&'a self) -> SourceFuture<'a, RowBatch<PoolSnapshot>> {
        Box::pin(async move { self.fetch(self.snapshots_query()).await })
    }

    fn pool_history<'a>(&'a self, req: HistoryRequest) -> SourceFuture<'a, RowBatch<HistoryRow>> {
        Box::pin(async move { self.fetch(self.history_query(&req)).await })
    }

    fn apr_records<'a>(&'a self, req: AprRequest) -> SourceFuture<'a, RowBatch<AprRecord>> {
        Box::pin(async move { self.fetch(self.apr_query(&req)).await })
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async move {
            let endpoint = self.settings.supabase_url.clone();
            if !self.settings.has_valid_credentials() {
                return HealthStatus::degraded(
                    endpoint,
                    "data source credentials are not configured; using placeholders",
                );
            }

            let probe = TableQuery::from_table(&self.settings.snapshot_table)
                .select(["id"])
                .limit(1);
            match self.fetch::<ProbeRow>(probe).await {
                Ok(_) => HealthStatus::healthy(endpoint),
                Err(error) => HealthStatus::unhealthy(endpoint, error.to_string()),
            }
        })
    }
}

#[derive(serde::Deserialize)]
struct ProbeRow {}

impl ValidatedRow for ProbeRow {
    fn check(&self) -> Result<(), crate::ValidationError> {
        Ok(())
    }
}

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use poolscope_core::{
    AprRequest, FixtureSource, HealthState, HistoryRequest, HttpClient, HttpError, HttpRequest,
    HttpResponse, PostgrestSource, Settings, SnapshotSource, SourceId, TimestampFilter,
    UtcDateTime,
};

const SNAPSHOTS: &str = r#"[
    {"id": 3, "pool_name": "vAMM-WETH/USDC", "apr": 24.1, "total_tvl": 18000000, "scraped_at": "2024-05-10T12:00:00+00:00"},
    {"id": 2, "pool_name": "CL1-USDC/USDT", "apr": 3.4, "total_tvl": 950000, "scraped_at": "2024-05-10T11:00:00+00:00"},
    {"id": 1, "pool_name": "vAMM-WETH/USDC", "apr": 23.9, "total_tvl": 17900000, "scraped_at": "2024-05-10T11:00:00+00:00"}
]"#;

const HISTORY: &str = r#"[
    {"scraped_at": "2024-05-10T11:00:00+00:00", "apr": 23.9, "total_tvl": 17900000},
    {"scraped_at": "2024-05-10T12:00:00+00:00", "apr": 24.1, "total_tvl": 18000000}
]"#;

const APR: &str = r#"[
    {"id": 1, "date": "2024-05-09", "apr": 21.0, "protocol": "aerodrome"},
    {"id": 2, "date": "2024-05-10", "apr": 22.5, "protocol": "aerodrome"}
]"#;

/// Serves canned bodies keyed on the requested path and records every request.
#[derive(Default)]
struct CannedHttpClient {
    requests: Mutex<Vec<HttpRequest>>,
}

impl CannedHttpClient {
    fn recorded_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .iter()
            .map(|request| request.url.clone())
            .collect()
    }
}

impl HttpClient for CannedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let body = if request.url.contains("/apr_data?") {
            APR
        } else if request.url.contains("select=scraped_at") {
            HISTORY
        } else {
            SNAPSHOTS
        };
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .push(request);
        Box::pin(async move { Ok(HttpResponse::ok_json(body)) })
    }
}

fn configured_settings() -> Settings {
    Settings::from_lookup(|name| match name {
        "SUPABASE_URL" => Some(String::from("https://demo.supabase.co/")),
        "SUPABASE_ANON_KEY" => Some(String::from("anon-key")),
        _ => None,
    })
}

struct SourceCase {
    id: SourceId,
    source: Arc<dyn SnapshotSource>,
    pool: &'static str,
}

fn source_cases() -> Vec<SourceCase> {
    let anchor = UtcDateTime::parse("2024-05-10T12:00:00Z").expect("valid timestamp");
    vec![
        SourceCase {
            id: SourceId::Postgrest,
            source: Arc::new(PostgrestSource::new(
                configured_settings(),
                Arc::new(CannedHttpClient::default()),
            )),
            pool: "vAMM-WETH/USDC",
        },
        SourceCase {
            id: SourceId::Fixture,
            source: Arc::new(FixtureSource::generated(anchor, 3)),
            pool: "vAMM-WETH/USDC",
        },
    ]
}

#[tokio::test]
async fn snapshots_are_returned_newest_first_for_all_sources() {
    for case in source_cases() {
        assert_eq!(case.source.id(), case.id);

        let batch = case
            .source
            .list_snapshots()
            .await
            .unwrap_or_else(|error| panic!("source '{}' listing failed: {error}", case.id));

        assert!(!batch.rows.is_empty(), "source '{}': rows present", case.id);
        assert!(
            batch
                .rows
                .windows(2)
                .all(|pair| pair[0].scraped_at >= pair[1].scraped_at),
            "source '{}': newest first",
            case.id
        );
        assert!(
            batch.rows.iter().all(|row| row.validate().is_ok()),
            "source '{}': rows validate",
            case.id
        );
    }
}

#[tokio::test]
async fn history_is_returned_oldest_first_for_all_sources() {
    for case in source_cases() {
        let req = HistoryRequest::new(case.pool, TimestampFilter::unbounded())
            .expect("valid history request");

        let batch = case
            .source
            .pool_history(req)
            .await
            .unwrap_or_else(|error| panic!("source '{}' history failed: {error}", case.id));

        assert!(!batch.rows.is_empty(), "source '{}': rows present", case.id);
        assert!(
            batch
                .rows
                .windows(2)
                .all(|pair| pair[0].scraped_at <= pair[1].scraped_at),
            "source '{}': oldest first",
            case.id
        );
    }
}

#[tokio::test]
async fn apr_records_carry_protocols_for_all_sources() {
    for case in source_cases() {
        let batch = case
            .source
            .apr_records(AprRequest::all())
            .await
            .unwrap_or_else(|error| panic!("source '{}' apr failed: {error}", case.id));

        assert!(!batch.rows.is_empty(), "source '{}': rows present", case.id);
        assert!(
            batch.rows.iter().all(|record| !record.protocol.is_empty() && record.apr >= 0.0),
            "source '{}': protocol and apr",
            case.id
        );
        assert!(
            batch.rows.windows(2).all(|pair| pair[0].date <= pair[1].date),
            "source '{}': oldest first",
            case.id
        );
    }
}

#[tokio::test]
async fn configured_sources_report_healthy() {
    for case in source_cases() {
        let health = case.source.health().await;
        assert_eq!(health.state, HealthState::Healthy, "source '{}': health", case.id);
    }
}

#[tokio::test]
async fn postgrest_queries_push_filters_to_the_server() {
    // Given: a PostgREST source configured from environment-style lookup
    let client = Arc::new(CannedHttpClient::default());
    let source = PostgrestSource::new(configured_settings(), client.clone());
    let filter = TimestampFilter {
        gte: Some(UtcDateTime::parse("2024-05-03T12:00:00Z").expect("valid")),
        lte: Some(UtcDateTime::parse("2024-05-10T23:59:59Z").expect("valid")),
    };

    // When: history and APR data are requested with bounds
    source
        .pool_history(HistoryRequest::new("vAMM-WETH/USDC", filter).expect("valid"))
        .await
        .expect("history");
    source
        .apr_records(AprRequest::within(filter))
        .await
        .expect("apr records");

    // Then: the trailing slash is trimmed and both bounds are encoded into the query
    let urls = client.recorded_urls();
    assert_eq!(urls.len(), 2);
    assert!(urls[0].starts_with("https://demo.supabase.co/rest/v1/aerodrome_pools?"));
    assert!(urls[0].contains("pool_name=eq.vAMM-WETH%2FUSDC"));
    assert!(urls[0].contains("scraped_at=gte.2024-05-03T12%3A00%3A00Z"));
    assert!(urls[0].contains("scraped_at=lte.2024-05-10T23%3A59%3A59Z"));
    assert!(urls[0].ends_with("order=scraped_at.asc"));
    assert!(urls[1].starts_with("https://demo.supabase.co/rest/v1/apr_data?"));
    assert!(urls[1].contains("date=gte."));
    assert!(urls[1].ends_with("order=date.asc"));
}

#[tokio::test]
async fn missing_credentials_degrade_without_network_access() {
    // Given: no credentials in the environment
    let client = Arc::new(CannedHttpClient::default());
    let settings = Settings::from_lookup(|_| None);
    assert!(!settings.has_valid_credentials());
    let source = PostgrestSource::new(settings, client.clone());

    // When: health is checked
    let health = source.health().await;

    // Then: the source reports degraded and nothing is sent
    assert_eq!(health.state, HealthState::Degraded);
    assert!(health.detail.is_some());
    assert!(client.recorded_urls().is_empty());
}

//! Data source trait and request/response types.
//!
//! | Operation | Request | Response |
//! |-----------|---------|----------|
//! | [`list_snapshots`](SnapshotSource::list_snapshots) | none | [`RowBatch<PoolSnapshot>`] newest first |
//! | [`pool_history`](SnapshotSource::pool_history) | [`HistoryRequest`] | [`RowBatch<HistoryRow>`] oldest first |
//! | [`apr_records`](SnapshotSource::apr_records) | [`AprRequest`] | [`RowBatch<AprRecord>`] oldest first |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{AprRecord, HistoryRow, PoolSnapshot, TimestampFilter};

/// Identifies which adapter produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Postgrest,
    Fixture,
}

impl SourceId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Postgrest => "postgrest",
            Self::Fixture => "fixture",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    /// Reachable in principle but running on placeholder credentials.
    Degraded,
    Unhealthy,
}

/// Source health as reported by the `sources` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub state: HealthState,
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl HealthStatus {
    pub fn healthy(endpoint: impl Into<String>) -> Self {
        Self {
            state: HealthState::Healthy,
            endpoint: endpoint.into(),
            detail: None,
        }
    }

    pub fn degraded(endpoint: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            state: HealthState::Degraded,
            endpoint: endpoint.into(),
            detail: Some(detail.into()),
        }
    }

    pub fn unhealthy(endpoint: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            state: HealthState::Unhealthy,
            endpoint: endpoint.into(),
            detail: Some(detail.into()),
        }
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    InvalidRequest,
    Decode,
    Internal,
}

/// Structured error returned by every [`SnapshotSource`] operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Decode,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Decode => "source.decode",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// History query for a single pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub pool_name: String,
    pub filter: TimestampFilter,
}

impl HistoryRequest {
    pub fn new(pool_name: impl Into<String>, filter: TimestampFilter) -> Result<Self, SourceError> {
        let pool_name = pool_name.into();
        if pool_name.trim().is_empty() {
            return Err(SourceError::invalid_request(
                "history request must name a pool",
            ));
        }
        Ok(Self { pool_name, filter })
    }
}

/// Protocol APR query; the filter applies to the record date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AprRequest {
    pub filter: TimestampFilter,
}

impl AprRequest {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn within(filter: TimestampFilter) -> Self {
        Self { filter }
    }
}

/// Rows returned by a source plus the count of rows dropped during
/// validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowBatch<T> {
    pub rows: Vec<T>,
    pub skipped: usize,
}

impl<T> RowBatch<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self { rows, skipped: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Read-only access to pool snapshot data.
///
/// Implementations must be `Send + Sync`; the dashboard shares one source
/// across concurrent fetches.
pub trait SnapshotSource: Send + Sync {
    fn id(&self) -> SourceId;

    /// Every snapshot, newest first.
    fn list_snapshots<'a>(&'a self) -> SourceFuture<'a, RowBatch<PoolSnapshot>>;

    /// One pool's history within the request bounds, oldest first.
    fn pool_history<'a>(&'a self, req: HistoryRequest) -> SourceFuture<'a, RowBatch<HistoryRow>>;

    /// Per-protocol APR records, oldest first.
    fn apr_records<'a>(&'a self, req: AprRequest) -> SourceFuture<'a, RowBatch<AprRecord>>;

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>>;
}

impl<S: SnapshotSource + ?Sized> SnapshotSource for Arc<S> {
    fn id(&self) -> SourceId {
        (**self).id()
    }

    fn list_snapshots<'a>(&'a self) -> SourceFuture<'a, RowBatch<PoolSnapshot>> {
        (**self).list_snapshots()
    }

    fn pool_history<'a>(&'a self, req: HistoryRequest) -> SourceFuture<'a, RowBatch<HistoryRow>> {
        (**self).pool_history(req)
    }

    fn apr_records<'a>(&'a self, req: AprRequest) -> SourceFuture<'a, RowBatch<AprRecord>> {
        (**self).apr_records(req)
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        (**self).health()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_request_requires_pool_name() {
        let error = HistoryRequest::new("  ", TimestampFilter::unbounded())
            .expect_err("blank pool must fail");
        assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
        assert_eq!(error.code(), "source.invalid_request");
        assert!(!error.retryable());
    }

    #[test]
    fn unavailable_errors_are_retryable() {
        let error = SourceError::unavailable("upstream returned 503");
        assert!(error.retryable());
        assert_eq!(error.to_string(), "upstream returned 503 (source.unavailable)");
    }
}

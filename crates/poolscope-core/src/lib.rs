//! # Poolscope Core
//!
//! Data access and aggregation for liquidity-pool APR/TVL analytics.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | PostgREST and in-memory fixture sources |
//! | [`aggregation`] | Latest-per-pool grouping, chart series, axis domains, stats |
//! | [`config`] | Settings resolved from the environment |
//! | [`dashboard`] | Displayed state and stale-fetch handling |
//! | [`data_source`] | [`SnapshotSource`] trait and request/response types |
//! | [`domain`] | Snapshot, history and time-range types |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Core error types |
//! | [`format`] | APR and currency display helpers |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`query`] | PostgREST query-string builder |
//! | [`theme`] | Persisted light/dark preference |
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │ SnapshotSource   │────▶│ HttpClient       │
//! │ (PostgREST/fake) │     │ (reqwest/none)   │
//! └────────┬─────────┘     └──────────────────┘
//!          │ rows
//!          ▼
//! ┌──────────────────┐
//! │ Dashboard        │  fetch sequencing, retained state
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │ Aggregation      │  pure functions
//! └────────┬─────────┘
//!          ▼
//!   CLI presentation
//! ```

pub mod adapters;
pub mod aggregation;
pub mod config;
pub mod dashboard;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod format;
pub mod http_client;
pub mod query;
pub mod theme;

pub use adapters::{FixtureSource, PostgrestSource};
pub use aggregation::*;
pub use config::Settings;
pub use dashboard::{Dashboard, DashboardState, FetchSequencer, FetchTicket, HistoryOutcome};
pub use data_source::{
    AprRequest, HealthState, HealthStatus, HistoryRequest, RowBatch, SnapshotSource, SourceError,
    SourceErrorKind, SourceId,
};
pub use domain::*;
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};
pub use error::ValidationError;
pub use http_client::{HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient};
pub use query::{SortOrder, TableQuery};
pub use theme::{
    FilePreferenceStore, MemoryPreferenceStore, PreferenceError, PreferenceStore, ThemeContext,
    ThemePreference,
};

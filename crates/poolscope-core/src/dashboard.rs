//! Dashboard controller: the currently displayed pools, selection and
//! history, updated from a [`SnapshotSource`].
//!
//! History fetches may overlap when the selection changes quickly. Each fetch
//! takes a ticket from a [`FetchSequencer`] and only the most recently issued
//! ticket may write its result; older results are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, warn};

use crate::aggregation::{group_latest_by_pool, resolve_time_range_filter, search_pools, PoolAnalytics};
use crate::data_source::{HistoryRequest, SnapshotSource, SourceError};
use crate::{HistoryRow, PoolSummary, TimeRangeSelection, UtcDateTime};

/// Ordinal of an issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Monotonic ticket issuer.
#[derive(Debug, Default)]
pub struct FetchSequencer {
    latest: AtomicU64,
}

impl FetchSequencer {
    pub fn issue(&self) -> FetchTicket {
        FetchTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

/// Displayed dashboard state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardState {
    pub pools: Vec<PoolSummary>,
    pub selected_pool: Option<String>,
    pub selection: TimeRangeSelection,
    /// History for `history_pool`, oldest first.
    pub history: Vec<HistoryRow>,
    pub history_pool: Option<String>,
    pub loading_pools: bool,
    pub loading_history: bool,
    pub last_error: Option<String>,
    /// Rows dropped as malformed by the most recent successful fetches.
    pub skipped_rows: usize,
}

/// What became of a history fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOutcome {
    Applied { rows: usize },
    /// A newer fetch was issued while this one was in flight.
    Discarded,
    NoSelection,
}

pub struct Dashboard<S> {
    source: S,
    state: Mutex<DashboardState>,
    sequencer: FetchSequencer,
    clock: fn() -> UtcDateTime,
}

impl<S: SnapshotSource> Dashboard<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: Mutex::new(DashboardState::default()),
            sequencer: FetchSequencer::default(),
            clock: UtcDateTime::now,
        }
    }

    /// Replaces the clock used to anchor relative time ranges.
    pub fn with_clock(mut self, clock: fn() -> UtcDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn state(&self) -> DashboardState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reloads the pool list. On failure the previous list stays displayed.
    pub async fn refresh_pools(&self) -> Result<usize, SourceError> {
        self.lock().loading_pools = true;

        let result = self.source.list_snapshots().await;

        let mut state = self.lock();
        state.loading_pools = false;
        match result {
            Ok(batch) => {
                state.pools = group_latest_by_pool(&batch.rows);
                state.skipped_rows = batch.skipped;
                state.last_error = None;
                Ok(state.pools.len())
            }
            Err(error) => {
                warn!(source = %self.source.id(), %error, "pool list fetch failed");
                state.last_error = Some(error.to_string());
                Err(error)
            }
        }
    }

    pub fn search(&self, query: &str) -> Vec<PoolSummary> {
        let state = self.lock();
        search_pools(&state.pools, query).into_iter().cloned().collect()
    }

    pub async fn select_pool(&self, pool_name: impl Into<String>) -> Result<HistoryOutcome, SourceError> {
        self.lock().selected_pool = Some(pool_name.into());
        self.reload_history().await
    }

    pub async fn set_time_range(&self, selection: TimeRangeSelection) -> Result<HistoryOutcome, SourceError> {
        self.lock().selection = selection;
        self.reload_history().await
    }

    /// Fetches history for the selected pool and range.
    ///
    /// Results from a fetch superseded by a later call are discarded, whether
    /// they succeeded or failed. A failed current fetch keeps the previous
    /// history displayed and records the error.
    pub async fn reload_history(&self) -> Result<HistoryOutcome, SourceError> {
        let ticket = self.sequencer.issue();
        let (pool_name, selection) = {
            let mut state = self.lock();
            let Some(pool_name) = state.selected_pool.clone() else {
                return Ok(HistoryOutcome::NoSelection);
            };
            state.loading_history = true;
            (pool_name, state.selection)
        };

        let filter = resolve_time_range_filter(selection, (self.clock)());
        let result = match HistoryRequest::new(pool_name.clone(), filter) {
            Ok(request) => self.source.pool_history(request).await,
            Err(error) => Err(error),
        };

        let mut state = self.lock();
        if !self.sequencer.is_current(ticket) {
            debug!(pool = %pool_name, ticket = ticket.0, "discarding stale history response");
            return Ok(HistoryOutcome::Discarded);
        }
        state.loading_history = false;

        match result {
            Ok(batch) => {
                let rows = batch.rows.len();
                state.history = batch.rows;
                state.history_pool = Some(pool_name);
                state.skipped_rows = batch.skipped;
                state.last_error = None;
                Ok(HistoryOutcome::Applied { rows })
            }
            Err(error) => {
                warn!(pool = %pool_name, %error, "history fetch failed");
                state.last_error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Detail view for the pool whose history is displayed.
    pub fn analytics(&self) -> Option<PoolAnalytics> {
        let state = self.lock();
        let pool_name = state.history_pool.as_deref()?;
        Some(PoolAnalytics::from_history(pool_name, &state.history))
    }
}

use serde::{Deserialize, Serialize};

use crate::error::{validate_non_negative, validate_optional_non_negative};
use crate::{UtcDateTime, ValidationError};

/// One scraped observation of a pool, as stored in the snapshot table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub id: i64,
    pub pool_name: String,
    #[serde(default)]
    pub base_token_symbol: String,
    #[serde(default)]
    pub base_token_volume: Option<f64>,
    #[serde(default)]
    pub base_token_fees: Option<f64>,
    #[serde(default)]
    pub base_token_tvl: Option<f64>,
    #[serde(default)]
    pub quote_token_symbol: String,
    #[serde(default)]
    pub quote_token_volume: Option<f64>,
    #[serde(default)]
    pub quote_token_fees: Option<f64>,
    #[serde(default)]
    pub quote_token_tvl: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub total_fees: Option<f64>,
    #[serde(default)]
    pub total_tvl: Option<f64>,
    #[serde(default)]
    pub apr: Option<f64>,
    pub scraped_at: UtcDateTime,
    #[serde(default)]
    pub created_at: Option<UtcDateTime>,
}

impl PoolSnapshot {
    /// Minimal snapshot carrying only the metrics the dashboard reads.
    pub fn new(
        id: i64,
        pool_name: impl Into<String>,
        apr: Option<f64>,
        total_tvl: Option<f64>,
        scraped_at: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        let snapshot = Self {
            id,
            pool_name: pool_name.into(),
            base_token_symbol: String::new(),
            base_token_volume: None,
            base_token_fees: None,
            base_token_tvl: None,
            quote_token_symbol: String::new(),
            quote_token_volume: None,
            quote_token_fees: None,
            quote_token_tvl: None,
            total_volume: None,
            total_fees: None,
            total_tvl,
            apr,
            scraped_at,
            created_at: None,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.pool_name.trim().is_empty() {
            return Err(ValidationError::EmptyPoolName);
        }

        validate_optional_non_negative("apr", self.apr)?;
        validate_optional_non_negative("total_tvl", self.total_tvl)?;
        validate_optional_non_negative("total_volume", self.total_volume)?;
        validate_optional_non_negative("total_fees", self.total_fees)?;
        validate_optional_non_negative("base_token_volume", self.base_token_volume)?;
        validate_optional_non_negative("base_token_fees", self.base_token_fees)?;
        validate_optional_non_negative("base_token_tvl", self.base_token_tvl)?;
        validate_optional_non_negative("quote_token_volume", self.quote_token_volume)?;
        validate_optional_non_negative("quote_token_fees", self.quote_token_fees)?;
        validate_optional_non_negative("quote_token_tvl", self.quote_token_tvl)?;
        Ok(())
    }
}

/// Narrow row returned by the per-pool history query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub scraped_at: UtcDateTime,
    #[serde(default)]
    pub apr: Option<f64>,
    #[serde(default)]
    pub total_tvl: Option<f64>,
}

impl HistoryRow {
    pub fn new(
        scraped_at: UtcDateTime,
        apr: Option<f64>,
        total_tvl: Option<f64>,
    ) -> Result<Self, ValidationError> {
        let row = Self {
            scraped_at,
            apr,
            total_tvl,
        };
        row.validate()?;
        Ok(row)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_optional_non_negative("apr", self.apr)?;
        validate_optional_non_negative("total_tvl", self.total_tvl)
    }
}

impl From<&PoolSnapshot> for HistoryRow {
    fn from(value: &PoolSnapshot) -> Self {
        Self {
            scraped_at: value.scraped_at,
            apr: value.apr,
            total_tvl: value.total_tvl,
        }
    }
}

/// Per-protocol APR observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AprRecord {
    pub id: i64,
    pub date: UtcDateTime,
    pub apr: f64,
    pub protocol: String,
    #[serde(default)]
    pub pool_name: String,
    #[serde(default)]
    pub created_at: Option<UtcDateTime>,
}

impl AprRecord {
    pub fn new(
        id: i64,
        date: UtcDateTime,
        apr: f64,
        protocol: impl Into<String>,
        pool_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let record = Self {
            id,
            date,
            apr,
            protocol: protocol.into(),
            pool_name: pool_name.into(),
            created_at: None,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.protocol.trim().is_empty() {
            return Err(ValidationError::EmptyProtocol);
        }
        validate_non_negative("apr", self.apr)
    }
}

/// Latest known snapshot for one pool name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSummary {
    #[serde(flatten)]
    pub latest: PoolSnapshot,
    /// Number of snapshots seen for this pool in the fetch that produced it.
    pub snapshot_count: usize,
}

impl PoolSummary {
    pub fn pool_name(&self) -> &str {
        &self.latest.pool_name
    }

    pub fn apr(&self) -> Option<f64> {
        self.latest.apr
    }

    pub fn total_tvl(&self) -> Option<f64> {
        self.latest.total_tvl
    }

    pub fn as_of(&self) -> UtcDateTime {
        self.latest.scraped_at
    }
}

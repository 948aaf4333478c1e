mod fixture;
mod postgrest;

pub use fixture::FixtureSource;
pub use postgrest::PostgrestSource;

use crate::{AprRecord, HistoryRow, PoolSnapshot, ValidationError};

/// Row types that are checked after decoding; failures are skipped, not fatal.
pub(crate) trait ValidatedRow {
    fn check(&self) -> Result<(), ValidationError>;
}

impl ValidatedRow for PoolSnapshot {
    fn check(&self) -> Result<(), ValidationError> {
        self.validate()
    }
}

impl ValidatedRow for HistoryRow {
    fn check(&self) -> Result<(), ValidationError> {
        self.validate()
    }
}

impl ValidatedRow for AprRecord {
    fn check(&self) -> Result<(), ValidationError> {
        self.validate()
    }
}

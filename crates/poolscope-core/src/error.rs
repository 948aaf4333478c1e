use thiserror::Error;

/// Validation and contract errors exposed by `poolscope-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("pool name cannot be empty")]
    EmptyPoolName,
    #[error("protocol name cannot be empty")]
    EmptyProtocol,

    #[error("timestamp is not a valid RFC3339 or ISO-8601 instant: '{value}'")]
    InvalidTimestamp { value: String },
    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },

    #[error("invalid time range '{value}', expected one of 24h, 7d, 30d, 90d, 180d, custom")]
    InvalidTimeRange { value: String },
    #[error("lookback must be at least one day")]
    EmptyLookback,

    #[error("invalid theme '{value}', expected light or dark")]
    InvalidTheme { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },

    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Rejects negative and non-finite metric values.
pub(crate) fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

pub(crate) fn validate_optional_non_negative(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    match value {
        Some(value) => validate_non_negative(field, value),
        None => Ok(()),
    }
}

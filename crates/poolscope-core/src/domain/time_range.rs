use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::domain::timestamp::{format_date, optional_date};
use crate::{UtcDateTime, ValidationError};

/// Lookback used when a custom range is opened without any dates.
const DEFAULT_CUSTOM_LOOKBACK_DAYS: i64 = 7;

/// Named time-range presets offered by the history view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "24h")]
    Last24Hours,
    #[default]
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
    #[serde(rename = "180d")]
    Last180Days,
    #[serde(rename = "custom")]
    Custom,
}

impl TimeRange {
    pub const ALL: [Self; 6] = [
        Self::Last24Hours,
        Self::Last7Days,
        Self::Last30Days,
        Self::Last90Days,
        Self::Last180Days,
        Self::Custom,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Last24Hours => "24h",
            Self::Last7Days => "7d",
            Self::Last30Days => "30d",
            Self::Last90Days => "90d",
            Self::Last180Days => "180d",
            Self::Custom => "custom",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Last24Hours => "Last 24 Hours",
            Self::Last7Days => "Last 7 Days",
            Self::Last30Days => "Last 30 Days",
            Self::Last90Days => "Last 90 Days",
            Self::Last180Days => "Last 180 Days",
            Self::Custom => "Custom Range",
        }
    }

    /// Lookback in days; `None` for the custom range.
    pub const fn days(self) -> Option<u32> {
        match self {
            Self::Last24Hours => Some(1),
            Self::Last7Days => Some(7),
            Self::Last30Days => Some(30),
            Self::Last90Days => Some(90),
            Self::Last180Days => Some(180),
            Self::Custom => None,
        }
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|range| range.as_str() == normalized)
            .ok_or(ValidationError::InvalidTimeRange {
                value: value.to_owned(),
            })
    }
}

/// Either a lookback window ending now or an explicit, possibly open-ended,
/// date pair. An explicit `start` after `end` is passed through as-is; the
/// query then matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeRangeSelection {
    Relative { days: u32 },
    Explicit {
        #[serde(with = "optional_date")]
        start: Option<Date>,
        #[serde(with = "optional_date")]
        end: Option<Date>,
    },
}

impl Default for TimeRangeSelection {
    fn default() -> Self {
        Self::Relative { days: 7 }
    }
}

impl TimeRangeSelection {
    pub fn relative(days: u32) -> Result<Self, ValidationError> {
        if days == 0 {
            return Err(ValidationError::EmptyLookback);
        }
        Ok(Self::Relative { days })
    }

    pub const fn explicit(start: Option<Date>, end: Option<Date>) -> Self {
        Self::Explicit { start, end }
    }

    /// Builds a selection from a preset. A custom range with neither date
    /// set defaults to the last seven days ending `today`.
    pub fn from_preset(
        range: TimeRange,
        start: Option<Date>,
        end: Option<Date>,
        today: Date,
    ) -> Self {
        match range.days() {
            Some(days) => Self::Relative { days },
            None if start.is_none() && end.is_none() => Self::Explicit {
                start: Some(
                    today
                        .checked_sub(Duration::days(DEFAULT_CUSTOM_LOOKBACK_DAYS))
                        .unwrap_or(today),
                ),
                end: Some(today),
            },
            None => Self::Explicit { start, end },
        }
    }

    /// Human readable description used in headers.
    pub fn describe(&self) -> String {
        match self {
            Self::Relative { days } => TimeRange::ALL
                .into_iter()
                .find(|range| range.days() == Some(*days))
                .map(|range| range.label().to_owned())
                .unwrap_or_else(|| format!("Last {days} Days")),
            Self::Explicit {
                start: Some(start),
                end: Some(end),
            } => format!("{} - {}", format_date(*start), format_date(*end)),
            Self::Explicit { .. } => String::from(TimeRange::Custom.label()),
        }
    }
}

/// Inclusive timestamp bounds pushed down to the data source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<UtcDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<UtcDateTime>,
}

impl TimestampFilter {
    pub const fn unbounded() -> Self {
        Self {
            gte: None,
            lte: None,
        }
    }

    pub fn contains(&self, ts: UtcDateTime) -> bool {
        self.gte.is_none_or(|gte| ts >= gte) && self.lte.is_none_or(|lte| ts <= lte)
    }
}

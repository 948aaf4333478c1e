use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::macros::{format_description, time};
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::ValidationError;

/// UTC instant. Offsets are normalized to UTC on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    /// Parses RFC3339 input, an ISO-8601 timestamp without offset (PostgREST
    /// emits these for `timestamp without time zone` columns) or a bare
    /// `YYYY-MM-DD` date. Offset-less values are taken as UTC.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
            return Ok(Self::from_offset_datetime(parsed));
        }

        let with_fraction = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
        let without_fraction = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
        let normalized = trimmed.replacen(' ', "T", 1);

        PrimitiveDateTime::parse(&normalized, with_fraction)
            .or_else(|_| PrimitiveDateTime::parse(&normalized, without_fraction))
            .map(|value| Self(value.assume_utc()))
            .or_else(|_| parse_date(trimmed).map(Self::start_of_day))
            .map_err(|_| ValidationError::InvalidTimestamp {
                value: input.to_owned(),
            })
    }

    pub fn from_offset_datetime(value: OffsetDateTime) -> Self {
        Self(value.to_offset(UtcOffset::UTC))
    }

    pub fn from_unix_timestamp(seconds: i64) -> Result<Self, ValidationError> {
        OffsetDateTime::from_unix_timestamp(seconds)
            .map(Self)
            .map_err(|_| ValidationError::InvalidTimestamp {
                value: seconds.to_string(),
            })
    }

    /// First instant of `date` (00:00:00 UTC).
    pub fn start_of_day(date: Date) -> Self {
        Self(PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc())
    }

    /// Last whole second of `date` (23:59:59 UTC).
    pub fn end_of_day(date: Date) -> Self {
        Self(PrimitiveDateTime::new(date, time!(23:59:59)).assume_utc())
    }

    pub fn minus_days(self, days: u32) -> Self {
        Self(self.0 - Duration::days(i64::from(days)))
    }

    pub fn date(self) -> Date {
        self.0.date()
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn unix_timestamp(self) -> i64 {
        self.0.unix_timestamp()
    }

    pub fn format_rfc3339(self) -> String {
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.0.unix_timestamp().to_string())
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}

impl<'de> Deserialize<'de> for UtcDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<Date, ValidationError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(input.trim(), format).map_err(|_| ValidationError::InvalidDate {
        value: input.to_owned(),
    })
}

pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Serde adapter storing `Option<Date>` as `YYYY-MM-DD` or null.
pub(crate) mod optional_date {
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    use super::{format_date, parse_date};

    pub fn serialize<S>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&format_date(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|value| parse_date(&value).map_err(D::Error::custom))
            .transpose()
    }
}

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::stats::percent_change;
use crate::{AprRecord, HistoryRow, PoolSnapshot, UtcDateTime};

pub const METRIC_APR: &str = "apr";
pub const METRIC_TOTAL_TVL: &str = "total_tvl";
pub const METRIC_TOTAL_VOLUME: &str = "total_volume";
pub const METRIC_TOTAL_FEES: &str = "total_fees";

/// A row that can be plotted: a timestamp, an optional series key (for
/// example a protocol name) and nullable metrics looked up by key.
pub trait MetricRow {
    fn timestamp(&self) -> UtcDateTime;

    fn series_key(&self) -> Option<&str> {
        None
    }

    fn metric(&self, key: &str) -> Option<f64>;
}

impl MetricRow for HistoryRow {
    fn timestamp(&self) -> UtcDateTime {
        self.scraped_at
    }

    fn metric(&self, key: &str) -> Option<f64> {
        match key {
            METRIC_APR => self.apr,
            METRIC_TOTAL_TVL => self.total_tvl,
            _ => None,
        }
    }
}

impl MetricRow for PoolSnapshot {
    fn timestamp(&self) -> UtcDateTime {
        self.scraped_at
    }

    fn metric(&self, key: &str) -> Option<f64> {
        match key {
            METRIC_APR => self.apr,
            METRIC_TOTAL_TVL => self.total_tvl,
            METRIC_TOTAL_VOLUME => self.total_volume,
            METRIC_TOTAL_FEES => self.total_fees,
            _ => None,
        }
    }
}

impl MetricRow for AprRecord {
    fn timestamp(&self) -> UtcDateTime {
        self.date
    }

    fn series_key(&self) -> Option<&str> {
        Some(self.protocol.as_str())
    }

    fn metric(&self, key: &str) -> Option<f64> {
        (key == METRIC_APR).then_some(self.apr)
    }
}

impl<T: MetricRow + ?Sized> MetricRow for &T {
    fn timestamp(&self) -> UtcDateTime {
        (**self).timestamp()
    }

    fn series_key(&self) -> Option<&str> {
        (**self).series_key()
    }

    fn metric(&self, key: &str) -> Option<f64> {
        (**self).metric(key)
    }
}

/// How timestamps are bucketed into point labels (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelGranularity {
    /// `2024-05-01`
    CalendarDate,
    /// Day of month and hour: `1 14`
    DayHour,
    /// Calendar date and hour: `2024-05-01 14`
    DateHour,
    /// Hour only: `14`
    Hour,
}

impl LabelGranularity {
    pub fn label(self, ts: UtcDateTime) -> String {
        let inner = ts.into_inner();
        match self {
            Self::CalendarDate => crate::format_date(inner.date()),
            Self::DayHour => format!("{} {:02}", inner.day(), inner.hour()),
            Self::DateHour => format!("{} {:02}", crate::format_date(inner.date()), inner.hour()),
            Self::Hour => format!("{:02}", inner.hour()),
        }
    }

    /// Narrowest hourly label that stays unique across `timestamps`: hour
    /// alone within one UTC day, day-of-month plus hour within one calendar
    /// month, and the full date plus hour otherwise.
    pub fn for_timestamps<I>(timestamps: I) -> Self
    where
        I: IntoIterator<Item = UtcDateTime>,
    {
        let mut days = timestamps.into_iter().map(UtcDateTime::date);
        let Some(first) = days.next() else {
            return Self::DayHour;
        };

        let mut same_day = true;
        for day in days {
            if day.year() != first.year() || day.month() != first.month() {
                return Self::DateHour;
            }
            same_day &= day == first;
        }
        if same_day {
            Self::Hour
        } else {
            Self::DayHour
        }
    }
}

/// One plotted datum. Fields with no value are absent from `values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub label: String,
    /// Timestamp of the last row folded into this point, the one whose values
    /// win label collisions.
    pub timestamp: UtcDateTime,
    pub values: BTreeMap<String, f64>,
    pub sample_count: usize,
}

impl TimeSeriesPoint {
    pub fn value(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }
}

/// Chart-ready series plus the bookkeeping needed to spot label collisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub granularity: LabelGranularity,
    pub points: Vec<TimeSeriesPoint>,
    /// Rows fed into the series.
    pub raw_sample_count: usize,
    /// Metric values replaced by a later row sharing the same label and field.
    pub overwritten_samples: usize,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distinct field names across every point.
    pub fn fields(&self) -> BTreeSet<&str> {
        self.points
            .iter()
            .flat_map(|point| point.values.keys().map(String::as_str))
            .collect()
    }

    /// Percent change of `field` from the previous point, aligned with
    /// `points`. `None` for the first point and wherever either side is
    /// missing or the previous value is zero.
    pub fn percent_changes(&self, field: &str) -> Vec<Option<f64>> {
        let mut previous = None;
        self.points
            .iter()
            .map(|point| {
                let current = point.value(field);
                let change = previous
                    .zip(current)
                    .and_then(|(previous, current)| percent_change(previous, current));
                previous = current;
                change
            })
            .collect()
    }

    /// Present values for `field`, in point order.
    pub fn values(&self, field: &str) -> Vec<f64> {
        self.points
            .iter()
            .filter_map(|point| point.value(field))
            .collect()
    }
}

/// Groups rows into labelled points, sorted ascending by timestamp.
///
/// Rows sharing a label fold into one point carrying one field per present
/// metric. Rows without a series key use the metric key as the field name;
/// rows with one use the series key when a single metric is requested and
/// `series/metric` otherwise. When two rows write the same field of the same
/// point the later row in input order wins and the collision is counted in
/// [`TimeSeries::overwritten_samples`].
pub fn build_time_series<R: MetricRow>(
    rows: &[R],
    metric_keys: &[&str],
    granularity: LabelGranularity,
) -> TimeSeries {
    let single_metric = metric_keys.len() == 1;
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut points: Vec<TimeSeriesPoint> = Vec::new();
    let mut overwritten_samples = 0;

    for row in rows {
        let ts = row.timestamp();
        let label = granularity.label(ts);
        let position = match positions.get(&label) {
            Some(&position) => position,
            None => {
                positions.insert(label.clone(), points.len());
                points.push(TimeSeriesPoint {
                    label,
                    timestamp: ts,
                    values: BTreeMap::new(),
                    sample_count: 0,
                });
                points.len() - 1
            }
        };

        let point = &mut points[position];
        point.sample_count += 1;
        point.timestamp = ts;

        for key in metric_keys {
            let Some(value) = row.metric(key) else {
                continue;
            };
            let field = field_name(row.series_key(), key, single_metric);
            if point.values.insert(field, value).is_some() {
                overwritten_samples += 1;
            }
        }
    }

    points.sort_by_key(|point| point.timestamp);

    TimeSeries {
        granularity,
        points,
        raw_sample_count: rows.len(),
        overwritten_samples,
    }
}

fn field_name(series_key: Option<&str>, metric: &str, single_metric: bool) -> String {
    match series_key {
        Some(series) if single_metric => series.to_owned(),
        Some(series) => format!("{series}/{metric}"),
        None => metric.to_owned(),
    }
}

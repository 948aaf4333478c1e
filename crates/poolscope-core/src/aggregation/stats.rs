use serde::{Deserialize, Serialize};

use crate::AprRecord;

/// Min, max and arithmetic mean over a non-empty set of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub count: usize,
}

/// Returns `None` when there are no finite values, which callers render as
/// a "no data" state.
pub fn compute_summary_stats<I>(values: I) -> Option<SummaryStats>
where
    I: IntoIterator<Item = f64>,
{
    let mut stats: Option<SummaryStats> = None;
    let mut sum = 0.0;

    for value in values.into_iter().filter(|value| value.is_finite()) {
        sum += value;
        stats = Some(match stats {
            None => SummaryStats {
                min: value,
                max: value,
                avg: value,
                count: 1,
            },
            Some(current) => SummaryStats {
                min: current.min.min(value),
                max: current.max.max(value),
                avg: current.avg,
                count: current.count + 1,
            },
        });
    }

    stats.map(|stats| SummaryStats {
        avg: sum / stats.count as f64,
        ..stats
    })
}

/// Relative change from `previous` to `current`, in percent.
pub fn percent_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

/// Headline numbers for the protocol APR view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AprOverview {
    pub highest: f64,
    pub lowest: f64,
    pub average: f64,
    pub records: usize,
    /// Last APR minus first APR in date order.
    pub trend: f64,
}

impl AprOverview {
    pub fn from_records(records: &[AprRecord]) -> Option<Self> {
        let stats = compute_summary_stats(records.iter().map(|record| record.apr))?;

        let mut ordered = records.iter().collect::<Vec<_>>();
        ordered.sort_by_key(|record| record.date);
        let trend = match (ordered.first(), ordered.last()) {
            (Some(first), Some(last)) => last.apr - first.apr,
            _ => 0.0,
        };

        Some(Self {
            highest: stats.max,
            lowest: stats.min,
            average: stats.avg,
            records: records.len(),
            trend,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UtcDateTime;

    #[test]
    fn computes_min_max_avg() {
        let stats = compute_summary_stats([5.0, 10.0, 15.0]).expect("stats");
        assert_eq!(stats.min, 5.0);
        assert_eq!(stats.max, 15.0);
        assert_eq!(stats.avg, 10.0);
        assert_eq!(stats.count, 3);
    }

    #[test]
    fn empty_input_has_no_stats() {
        assert_eq!(compute_summary_stats(Vec::new()), None);
        assert_eq!(compute_summary_stats([f64::NAN]), None);
    }

    #[test]
    fn percent_change_guards_zero_baseline() {
        assert_eq!(percent_change(0.0, 5.0), None);
        assert_eq!(percent_change(10.0, 15.0), Some(50.0));
        assert_eq!(percent_change(10.0, 5.0), Some(-50.0));
    }

    #[test]
    fn overview_trend_uses_date_order() {
        let record = |date: &str, apr: f64| {
            AprRecord::new(0, UtcDateTime::parse(date).expect("valid"), apr, "aero", "")
                .expect("valid record")
        };
        let records = vec![
            record("2024-05-03", 9.0),
            record("2024-05-01", 4.0),
            record("2024-05-02", 8.0),
        ];

        let overview = AprOverview::from_records(&records).expect("overview");
        assert_eq!(overview.highest, 9.0);
        assert_eq!(overview.lowest, 4.0);
        assert_eq!(overview.average, 7.0);
        assert_eq!(overview.records, 3);
        assert_eq!(overview.trend, 5.0);
        assert_eq!(AprOverview::from_records(&[]), None);
    }
}

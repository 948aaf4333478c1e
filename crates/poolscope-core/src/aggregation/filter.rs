use crate::{TimeRangeSelection, TimestampFilter, UtcDateTime};

/// Converts a range selection into timestamp bounds.
///
/// A relative window only sets a lower bound of `now - days`; everything up
/// to the present is implied. Explicit dates cover whole UTC days, and an
/// unset side leaves that bound open.
pub fn resolve_time_range_filter(selection: TimeRangeSelection, now: UtcDateTime) -> TimestampFilter {
    match selection {
        TimeRangeSelection::Relative { days } => TimestampFilter {
            gte: Some(now.minus_days(days)),
            lte: None,
        },
        TimeRangeSelection::Explicit { start, end } => TimestampFilter {
            gte: start.map(UtcDateTime::start_of_day),
            lte: end.map(UtcDateTime::end_of_day),
        },
    }
}

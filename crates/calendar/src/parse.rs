//! Date parsing for table cells and command-line input.

use chrono::NaiveDate;

use crate::error::CalendarError;

/// Accepted calendar-day layouts, tried in order.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Parses a calendar day.
///
/// Leading and trailing whitespace is ignored. A time-of-day suffix
/// separated by `T` or a space (e.g. `2025-01-15T20:00:00`) is accepted and
/// discarded, since the almanac is keyed by timezone-naive days.
///
/// # Errors
///
/// Returns [`CalendarError::MissingDate`] for blank input and
/// [`CalendarError::InvalidDate`] when no accepted layout matches.
pub fn parse_date(input: &str) -> Result<NaiveDate, CalendarError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CalendarError::MissingDate);
    }

    let day_part = trimmed
        .split_once(['T', ' '])
        .map_or(trimmed, |(day, _time)| day);

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day_part, fmt).ok())
        .ok_or_else(|| CalendarError::InvalidDate {
            input: trimmed.to_string(),
        })
}

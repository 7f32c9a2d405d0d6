//! Error types for the selene-calendar crate.

use chrono::NaiveDate;

/// Error type for all fallible operations in the selene-calendar crate.
///
/// Covers inverted date ranges, out-of-range years and date strings that
/// cannot be interpreted as a calendar day.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    /// Returned when a range is requested with `start > end`.
    #[error("empty date range: start {start} is after end {end}")]
    EmptyRange {
        /// Requested first day.
        start: NaiveDate,
        /// Requested last day.
        end: NaiveDate,
    },

    /// Returned when a year cannot be represented as a calendar date.
    #[error("invalid year: {year}")]
    InvalidYear {
        /// The year that was provided.
        year: i32,
    },

    /// Returned when a date string is empty or blank.
    #[error("missing date")]
    MissingDate,

    /// Returned when a date string cannot be parsed.
    #[error("invalid date: '{input}' (expected YYYY-MM-DD)")]
    InvalidDate {
        /// The text that failed to parse.
        input: String,
    },
}

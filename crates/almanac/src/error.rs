//! Error types for selene-almanac.

use chrono::NaiveDate;
use selene_ephemeris::EphemerisError;

/// Error type for all fallible operations in the selene-almanac crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AlmanacError {
    /// Returned when the ephemeris cannot resolve a day of the series.
    #[error("cannot resolve ephemeris for {date}")]
    Ephemeris {
        /// The day that failed.
        date: NaiveDate,
        /// Underlying ephemeris failure.
        #[source]
        source: EphemerisError,
    },

    /// Returned when two distinct full moons fall implausibly close
    /// together, which means the daily sampling or phase bins are broken.
    #[error("ambiguous full moon: {first} and {second} are only {gap_days} days apart")]
    AmbiguousFullMoon {
        /// Earlier full-moon date.
        first: NaiveDate,
        /// Later full-moon date.
        second: NaiveDate,
        /// Days between them.
        gap_days: i64,
    },

    /// Returned when records handed to a series are not strictly increasing.
    #[error("series dates not strictly increasing: {date} follows {previous}")]
    UnorderedSeries {
        /// Date of the preceding record.
        previous: NaiveDate,
        /// Offending date.
        date: NaiveDate,
    },

    /// Returned when a configuration value is out of bounds.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Wraps an error originating from the selene-calendar crate.
    #[error("calendar error: {reason}")]
    Calendar {
        /// Description of the underlying calendar failure.
        reason: String,
    },
}

impl From<selene_calendar::CalendarError> for AlmanacError {
    fn from(e: selene_calendar::CalendarError) -> Self {
        AlmanacError::Calendar {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn display_ephemeris_keeps_source() {
        let err = AlmanacError::Ephemeris {
            date: date(2150, 1, 1),
            source: EphemerisError::InvalidConfig {
                reason: "x".to_string(),
            },
        };
        assert_eq!(err.to_string(), "cannot resolve ephemeris for 2150-01-01");
        assert!(err.source().is_some());
    }

    #[test]
    fn display_ambiguous_full_moon() {
        let err = AlmanacError::AmbiguousFullMoon {
            first: date(2025, 1, 13),
            second: date(2025, 1, 16),
            gap_days: 3,
        };
        assert_eq!(
            err.to_string(),
            "ambiguous full moon: 2025-01-13 and 2025-01-16 are only 3 days apart"
        );
    }

    #[test]
    fn from_calendar_empty_range() {
        let cal = selene_calendar::CalendarError::EmptyRange {
            start: date(2025, 2, 1),
            end: date(2025, 1, 1),
        };
        let err: AlmanacError = cal.into();
        assert_eq!(
            err.to_string(),
            "calendar error: empty date range: start 2025-02-01 is after end 2025-01-01"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AlmanacError>();
    }
}

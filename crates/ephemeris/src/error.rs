//! Error types for selene-ephemeris.

use chrono::{NaiveDate, NaiveDateTime};

/// Error type for all fallible operations in the selene-ephemeris crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EphemerisError {
    /// Returned when an instant lies outside the source's validity window.
    #[error("{at} is outside the ephemeris validity range {first}..={last}")]
    OutOfRange {
        /// Requested instant.
        at: NaiveDateTime,
        /// First supported day.
        first: NaiveDate,
        /// Last supported day.
        last: NaiveDate,
    },

    /// Returned when a computed quantity is NaN or infinite.
    #[error("non-finite {quantity} at {at}")]
    NonFinite {
        /// Name of the offending quantity.
        quantity: &'static str,
        /// Instant at which it was computed.
        at: NaiveDateTime,
    },

    /// Returned when observer coordinates are out of bounds.
    #[error("invalid observer: {details}")]
    InvalidObserver {
        /// Description of the violated bound.
        details: String,
    },

    /// Returned when a search configuration is unusable.
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

impl From<selene_calendar::CalendarError> for EphemerisError {
    fn from(e: selene_calendar::CalendarError) -> Self {
        EphemerisError::Calendar {
            reason: e.to_string(),
        }
    }
}

//! Closed, validated date interval.

use std::ops::RangeInclusive;

use chrono::{Datelike, Days, NaiveDate};

use crate::error::CalendarError;

/// A closed interval of calendar days `[start, end]`.
///
/// A `DateRange` always holds at least one day: constructors reject
/// `start > end` before any work is done on the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range covering `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::EmptyRange`] if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CalendarError> {
        if start > end {
            return Err(CalendarError::EmptyRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a range covering January 1 through December 31 of `year`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidYear`] if the year is outside the
    /// range chrono can represent.
    pub fn year(year: i32) -> Result<Self, CalendarError> {
        let start =
            NaiveDate::from_ymd_opt(year, 1, 1).ok_or(CalendarError::InvalidYear { year })?;
        let end =
            NaiveDate::from_ymd_opt(year, 12, 31).ok_or(CalendarError::InvalidYear { year })?;
        Ok(Self { start, end })
    }

    /// Creates a one-day range.
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Creates the range `center - radius ..= center + radius`.
    ///
    /// Bounds that would overflow chrono's representable dates are clamped
    /// to `center`.
    pub fn around(center: NaiveDate, radius_days: u32) -> Self {
        let radius = Days::new(u64::from(radius_days));
        Self {
            start: center.checked_sub_days(radius).unwrap_or(center),
            end: center.checked_add_days(radius).unwrap_or(center),
        }
    }

    /// Returns the first day of the range.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Returns the last day of the range.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns the number of days in the range, both endpoints included.
    pub fn n_days(&self) -> usize {
        // start <= end is guaranteed by the constructors.
        (self.end - self.start).num_days() as usize + 1
    }

    /// Returns `true` if `date` lies within the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Returns the calendar years touched by the range.
    pub fn years(&self) -> RangeInclusive<i32> {
        self.start.year()..=self.end.year()
    }

    /// Returns the overlap of two ranges, or `None` if they are disjoint.
    pub fn intersect(&self, other: &DateRange) -> Option<DateRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        DateRange::new(start, end).ok()
    }

    /// Iterates over every day in the range in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        self.start.iter_days().take(self.n_days())
    }
}

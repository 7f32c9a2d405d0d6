//! Read-only single-date queries against a built series.

use chrono::NaiveDate;
use selene_calendar::DateRange;

use crate::join::UserEvent;
use crate::record::DailyRecord;
use crate::series::DailySeries;

/// The record for one date plus its events.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup<'a> {
    pub record: &'a DailyRecord,
    pub events: Vec<&'a UserEvent>,
}

/// Record and same-date events for `date`, or `None` if the series has no
/// record for it.
pub fn lookup<'a>(
    series: &'a DailySeries,
    events: &'a [UserEvent],
    date: NaiveDate,
) -> Option<Lookup<'a>> {
    let record = series.get(date)?;
    let events = events.iter().filter(|e| e.date == date).collect();
    Some(Lookup { record, events })
}

/// Records within `radius_days` of `date`, inclusive.
pub fn neighbours(series: &DailySeries, date: NaiveDate, radius_days: u32) -> &[DailyRecord] {
    series.slice(DateRange::around(date, radius_days))
}

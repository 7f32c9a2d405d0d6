//! Left join of the daily series with user events, eclipses and the
//! classified lunar events.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use selene_ephemeris::EclipseRecord;
use serde::Serialize;
use tracing::debug;

use crate::classify::LunarEvents;
use crate::record::DailyRecord;
use crate::series::DailySeries;

/// One row of a user-supplied events table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserEvent {
    pub date: NaiveDate,
    pub title: String,
    pub category: String,
    pub notes: String,
}

/// A daily record with everything that happened on its date.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub record: DailyRecord,
    pub dark_sky: bool,
    pub full_moon: bool,
    pub supermoon: bool,
    pub blue_moon: bool,
    /// Same-date user events, in table order.
    pub events: Vec<UserEvent>,
    pub eclipse: Option<EclipseRecord>,
}

/// Joins `series` with `events` and `eclipses` by date.
///
/// Every record yields exactly one row, in series order. Events and
/// eclipses dated outside the series are dropped.
pub fn join(
    series: &DailySeries,
    events: &[UserEvent],
    eclipses: &[EclipseRecord],
    lunar: &LunarEvents,
) -> Vec<MergedRow> {
    let mut by_date: BTreeMap<NaiveDate, Vec<UserEvent>> = BTreeMap::new();
    for event in events {
        by_date.entry(event.date).or_default().push(event.clone());
    }

    let mut eclipse_by_date: BTreeMap<NaiveDate, EclipseRecord> = BTreeMap::new();
    for eclipse in eclipses {
        eclipse_by_date.entry(eclipse.date).or_insert(*eclipse);
    }

    let rows: Vec<MergedRow> = series
        .iter()
        .map(|record| {
            let date = record.date;
            MergedRow {
                record: record.clone(),
                dark_sky: lunar.is_dark_sky(date),
                full_moon: lunar.full_moon(date).is_some(),
                supermoon: lunar.is_supermoon(date),
                blue_moon: lunar.is_blue_moon(date),
                events: by_date.remove(&date).unwrap_or_default(),
                eclipse: eclipse_by_date.remove(&date),
            }
        })
        .collect();

    let unmatched: usize = by_date.values().map(Vec::len).sum();
    if unmatched > 0 {
        debug!(unmatched, "user events outside the series were not joined");
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PhaseName;
    use chrono::NaiveDateTime;
    use selene_ephemeris::{EclipseKind, LunarEclipseType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(n: u32) -> DailySeries {
        let records = (1..=n)
            .map(|d| DailyRecord {
                date: date(2025, 3, d),
                phase_angle_deg: 0.0,
                illumination: 0.0,
                distance_km: 384_400.0,
                phase_name: PhaseName::New,
                moonrise: None,
                moonset: None,
            })
            .collect();
        DailySeries::from_records(records).unwrap()
    }

    fn event(d: NaiveDate, title: &str) -> UserEvent {
        UserEvent {
            date: d,
            title: title.to_string(),
            category: "Observation".to_string(),
            notes: String::new(),
        }
    }

    fn midnight(d: NaiveDate) -> NaiveDateTime {
        d.and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn empty_events_keep_every_row() {
        let s = series(10);
        let rows = join(&s, &[], &[], &LunarEvents::default());
        assert_eq!(rows.len(), s.len());
        assert!(rows.iter().all(|r| r.events.is_empty() && r.eclipse.is_none()));
    }

    #[test]
    fn same_date_events_all_kept_in_order() {
        let s = series(5);
        let events = vec![
            event(date(2025, 3, 2), "first"),
            event(date(2025, 3, 4), "other"),
            event(date(2025, 3, 2), "second"),
            event(date(2025, 3, 2), "first"),
        ];
        let rows = join(&s, &events, &[], &LunarEvents::default());
        let titles: Vec<_> = rows[1].events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "first"]);
        assert_eq!(rows[3].events.len(), 1);
    }

    #[test]
    fn events_outside_series_are_dropped() {
        let s = series(5);
        let events = vec![event(date(2025, 4, 1), "later")];
        let rows = join(&s, &events, &[], &LunarEvents::default());
        assert!(rows.iter().all(|r| r.events.is_empty()));
    }

    #[test]
    fn eclipse_merged_by_date() {
        let s = series(20);
        let eclipse = EclipseRecord {
            date: date(2025, 3, 14),
            kind: EclipseKind::Lunar(LunarEclipseType::Total),
            greatest: midnight(date(2025, 3, 14)),
            magnitude: 1.18,
        };
        let rows = join(&s, &[], &[eclipse], &LunarEvents::default());
        assert_eq!(rows[13].eclipse, Some(eclipse));
        assert_eq!(rows.iter().filter(|r| r.eclipse.is_some()).count(), 1);
    }

    #[test]
    fn lunar_flags_follow_classification() {
        let s = series(3);
        let lunar = LunarEvents {
            dark_sky: vec![date(2025, 3, 1), date(2025, 3, 3)],
            ..LunarEvents::default()
        };
        let rows = join(&s, &[], &[], &lunar);
        let flags: Vec<_> = rows.iter().map(|r| r.dark_sky).collect();
        assert_eq!(flags, vec![true, false, true]);
    }
}

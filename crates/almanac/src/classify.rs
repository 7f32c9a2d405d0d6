//! Derived lunar events: dark-sky nights, full moons, supermoons and blue
//! moons.
//!
//! Classification is a pure function of the daily series. Full moons come
//! from the phase bins; because the "Full" bin spans 45 deg (about 3.7 days
//! of lunar motion), each lunation yields a run of adjacent full days that is
//! collapsed to the single day nearest 180 deg.

use chrono::{Datelike, NaiveDate};
use selene_calendar::YearMonth;
use serde::Serialize;
use tracing::debug;

use crate::config::ClassifierConfig;
use crate::error::AlmanacError;
use crate::record::DailyRecord;
use crate::series::DailySeries;

/// One full moon after run collapsing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullMoon {
    pub date: NaiveDate,
    pub phase_angle_deg: f64,
    pub illumination: f64,
    pub distance_km: f64,
    /// Number of adjacent "Full" days the record was chosen from.
    pub run_length: usize,
}

/// Every derived event set, each sorted by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LunarEvents {
    pub dark_sky: Vec<NaiveDate>,
    pub full_moons: Vec<FullMoon>,
    /// Full moon(s) nearest Earth in each calendar year.
    pub supermoons: Vec<NaiveDate>,
    /// Second and later full moons of a calendar month.
    pub blue_moons: Vec<NaiveDate>,
}

impl LunarEvents {
    pub fn is_dark_sky(&self, date: NaiveDate) -> bool {
        self.dark_sky.binary_search(&date).is_ok()
    }

    pub fn full_moon(&self, date: NaiveDate) -> Option<&FullMoon> {
        self.full_moons
            .binary_search_by_key(&date, |f| f.date)
            .ok()
            .map(|i| &self.full_moons[i])
    }

    pub fn is_supermoon(&self, date: NaiveDate) -> bool {
        self.supermoons.binary_search(&date).is_ok()
    }

    pub fn is_blue_moon(&self, date: NaiveDate) -> bool {
        self.blue_moons.binary_search(&date).is_ok()
    }
}

/// Strictly-below-threshold dark-sky test. A value equal to the threshold
/// is not dark.
pub fn is_dark_sky(record: &DailyRecord, threshold: f64) -> bool {
    record.illumination < threshold
}

/// Classifies a daily series.
///
/// # Errors
///
/// Returns [`AlmanacError::InvalidConfig`] for a bad configuration and
/// [`AlmanacError::AmbiguousFullMoon`] when two collapsed full moons are
/// closer than `min_lunation_gap_days`.
pub fn classify(
    series: &DailySeries,
    config: &ClassifierConfig,
) -> Result<LunarEvents, AlmanacError> {
    config.validate()?;
    let records = series.records();

    let dark_sky: Vec<NaiveDate> = records
        .iter()
        .filter(|r| is_dark_sky(r, config.dark_sky_threshold()))
        .map(|r| r.date)
        .collect();

    let full_moons = collapse_full_runs(records);
    check_lunation_gaps(&full_moons, config.min_lunation_gap_days())?;
    let supermoons = select_supermoons(&full_moons);
    let blue_moons = select_blue_moons(&full_moons);

    debug!(
        dark_sky = dark_sky.len(),
        full_moons = full_moons.len(),
        supermoons = supermoons.len(),
        blue_moons = blue_moons.len(),
        "classified series"
    );
    Ok(LunarEvents {
        dark_sky,
        full_moons,
        supermoons,
        blue_moons,
    })
}

/// Collapses each run of date-adjacent "Full" records to the one nearest
/// 180 deg; ties keep the earlier date. A skipped day breaks a run.
///
/// A run is closed when a non-full record sits on the day before its first
/// member and another on the day after its last. A run truncated by either
/// end of the series or by a skipped day is kept only if its phases bracket
/// 180 deg, so a lunation whose peak lies outside the series yields nothing.
pub fn collapse_full_runs(records: &[DailyRecord]) -> Vec<FullMoon> {
    let mut out = Vec::new();
    let mut start = 0;

    while start < records.len() {
        if !records[start].is_full() {
            start += 1;
            continue;
        }
        let mut end = start;
        while end + 1 < records.len()
            && records[end + 1].is_full()
            && next_day(&records[end], &records[end + 1])
        {
            end += 1;
        }

        let run = &records[start..=end];
        let closed_before = start > 0 && next_day(&records[start - 1], &records[start]);
        let closed_after = end + 1 < records.len() && next_day(&records[end], &records[end + 1]);
        if (closed_before && closed_after) || brackets_full(run) {
            out.push(full_moon(nearest_to_full(run), run.len()));
        } else {
            debug!(
                first = %run[0].date,
                len = run.len(),
                "dropping truncated full run"
            );
        }
        start = end + 1;
    }
    out
}

fn next_day(a: &DailyRecord, b: &DailyRecord) -> bool {
    a.date.succ_opt() == Some(b.date)
}

fn brackets_full(run: &[DailyRecord]) -> bool {
    run.iter().any(|r| r.phase_angle_deg <= 180.0) && run.iter().any(|r| r.phase_angle_deg >= 180.0)
}

fn nearest_to_full(run: &[DailyRecord]) -> &DailyRecord {
    run[1..].iter().fold(&run[0], |best, r| {
        if r.offset_from_full_deg() < best.offset_from_full_deg() {
            r
        } else {
            best
        }
    })
}

fn full_moon(record: &DailyRecord, run_length: usize) -> FullMoon {
    FullMoon {
        date: record.date,
        phase_angle_deg: record.phase_angle_deg,
        illumination: record.illumination,
        distance_km: record.distance_km,
        run_length,
    }
}

fn check_lunation_gaps(full_moons: &[FullMoon], min_gap_days: u32) -> Result<(), AlmanacError> {
    for pair in full_moons.windows(2) {
        let gap_days = (pair[1].date - pair[0].date).num_days();
        if gap_days < i64::from(min_gap_days) {
            return Err(AlmanacError::AmbiguousFullMoon {
                first: pair[0].date,
                second: pair[1].date,
                gap_days,
            });
        }
    }
    Ok(())
}

/// Per calendar year, every full moon at the year's minimum distance.
pub fn select_supermoons(full_moons: &[FullMoon]) -> Vec<NaiveDate> {
    full_moons
        .chunk_by(|a, b| a.date.year() == b.date.year())
        .flat_map(|year| {
            let min = year
                .iter()
                .map(|f| f.distance_km)
                .fold(f64::INFINITY, f64::min);
            year.iter()
                .filter(move |f| f.distance_km == min)
                .map(|f| f.date)
        })
        .collect()
}

/// Every full moon after the first within its calendar month.
pub fn select_blue_moons(full_moons: &[FullMoon]) -> Vec<NaiveDate> {
    full_moons
        .chunk_by(|a, b| YearMonth::of(a.date) == YearMonth::of(b.date))
        .flat_map(|month| month.iter().skip(1).map(|f| f.date))
        .collect()
}

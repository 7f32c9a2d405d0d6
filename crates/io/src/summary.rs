//! Run summary as JSON.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use selene_almanac::{DailySeries, FullMoon, LunarEvents};
use selene_ephemeris::EclipseRecord;
use serde::Serialize;
use tracing::info;

use crate::error::IoError;
use crate::events::{EventRowWarning, EventTable};

/// A day that could not be resolved and was left out of the series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedDaySummary {
    pub date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EclipseSummary {
    pub date: NaiveDate,
    /// e.g. `"total lunar"`.
    pub kind: String,
    pub greatest: NaiveDateTime,
    pub magnitude: f64,
}

impl From<&EclipseRecord> for EclipseSummary {
    fn from(e: &EclipseRecord) -> Self {
        Self {
            date: e.date,
            kind: e.kind.to_string(),
            greatest: e.greatest,
            magnitude: e.magnitude,
        }
    }
}

/// Everything a run derived, in one serialisable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlmanacSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: usize,
    pub skipped: Vec<SkippedDaySummary>,
    pub dark_sky_threshold: f64,
    pub dark_sky_days: usize,
    pub dark_sky_dates: Vec<NaiveDate>,
    pub full_moons: Vec<FullMoon>,
    pub supermoons: Vec<NaiveDate>,
    pub blue_moons: Vec<NaiveDate>,
    pub eclipses: Vec<EclipseSummary>,
    pub events_loaded: usize,
    /// Events whose date fell inside the series.
    pub events_joined: usize,
    pub event_warnings: Vec<EventRowWarning>,
}

impl AlmanacSummary {
    pub fn new(
        series: &DailySeries,
        lunar: &LunarEvents,
        eclipses: &[EclipseRecord],
        dark_sky_threshold: f64,
    ) -> Self {
        let range = series.range();
        Self {
            start: range.start(),
            end: range.end(),
            days: series.len(),
            skipped: series
                .skipped()
                .iter()
                .map(|s| SkippedDaySummary {
                    date: s.date,
                    reason: s.error.to_string(),
                })
                .collect(),
            dark_sky_threshold,
            dark_sky_days: lunar.dark_sky.len(),
            dark_sky_dates: lunar.dark_sky.clone(),
            full_moons: lunar.full_moons.clone(),
            supermoons: lunar.supermoons.clone(),
            blue_moons: lunar.blue_moons.clone(),
            eclipses: eclipses.iter().map(EclipseSummary::from).collect(),
            events_loaded: 0,
            events_joined: 0,
            event_warnings: Vec::new(),
        }
    }

    /// Records the events table and how many of its events were joined.
    pub fn with_events(mut self, table: &EventTable, joined: usize) -> Self {
        self.events_loaded = table.events.len();
        self.events_joined = joined;
        self.event_warnings = table.warnings.clone();
        self
    }
}

/// Writes `summary` to `path` as pretty-printed JSON.
pub fn write_summary(path: &Path, summary: &AlmanacSummary) -> Result<(), IoError> {
    let file = File::create(path).map_err(|e| IoError::filesystem(path, e))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, summary)?;
    out.write_all(b"\n").map_err(|e| IoError::filesystem(path, e))?;
    out.flush().map_err(|e| IoError::filesystem(path, e))?;

    info!(path = %path.display(), "wrote almanac summary");
    Ok(())
}

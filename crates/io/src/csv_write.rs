//! Merged almanac table as CSV.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use selene_almanac::MergedRow;
use serde::Serialize;
use tracing::info;

use crate::error::IoError;
use crate::flatten::{eclipse_label, event_titles, format_instant};

#[derive(Serialize)]
struct CsvRow<'a> {
    date: NaiveDate,
    phase_angle_deg: f64,
    illumination: f64,
    distance_km: f64,
    phase_name: &'a str,
    moonrise_utc: Option<String>,
    moonset_utc: Option<String>,
    dark_sky: bool,
    full_moon: bool,
    supermoon: bool,
    blue_moon: bool,
    event_count: usize,
    events: String,
    eclipse: Option<String>,
    eclipse_magnitude: Option<f64>,
}

impl<'a> From<&'a MergedRow> for CsvRow<'a> {
    fn from(row: &'a MergedRow) -> Self {
        let record = &row.record;
        Self {
            date: record.date,
            phase_angle_deg: record.phase_angle_deg,
            illumination: record.illumination,
            distance_km: record.distance_km,
            phase_name: record.phase_name.label(),
            moonrise_utc: format_instant(record.moonrise),
            moonset_utc: format_instant(record.moonset),
            dark_sky: row.dark_sky,
            full_moon: row.full_moon,
            supermoon: row.supermoon,
            blue_moon: row.blue_moon,
            event_count: row.events.len(),
            events: event_titles(row),
            eclipse: eclipse_label(row),
            eclipse_magnitude: row.eclipse.map(|e| e.magnitude),
        }
    }
}

/// Writes the merged almanac table to `path` as CSV with a header row.
///
/// Absent values (no rise, no eclipse) are written as empty fields.
pub fn write_csv(path: &Path, rows: &[MergedRow]) -> Result<(), IoError> {
    let file = File::create(path).map_err(|e| IoError::filesystem(path, e))?;
    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(CsvRow::from(row))?;
    }
    writer.flush().map_err(|e| IoError::filesystem(path, e))?;

    info!(path = %path.display(), rows = rows.len(), "wrote almanac csv");
    Ok(())
}

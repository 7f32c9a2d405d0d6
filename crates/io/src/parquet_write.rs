//! Low-level Parquet column building.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Date32Array, Float64Array, RecordBatch, StringArray,
    TimestampMillisecondArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use selene_almanac::MergedRow;

use crate::error::IoError;
use crate::flatten::{eclipse_label, event_titles};

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Builds the Arrow schema for the merged almanac table.
///
/// Rise/set and eclipse columns are nullable; everything else is always
/// populated.
pub(crate) fn build_schema() -> Schema {
    let timestamp = DataType::Timestamp(TimeUnit::Millisecond, None);
    Schema::new(vec![
        Field::new("date", DataType::Date32, false),
        Field::new("phase_angle_deg", DataType::Float64, false),
        Field::new("illumination", DataType::Float64, false),
        Field::new("distance_km", DataType::Float64, false),
        Field::new("phase_name", DataType::Utf8, false),
        Field::new("moonrise_utc", timestamp.clone(), true),
        Field::new("moonset_utc", timestamp, true),
        Field::new("dark_sky", DataType::Boolean, false),
        Field::new("full_moon", DataType::Boolean, false),
        Field::new("supermoon", DataType::Boolean, false),
        Field::new("blue_moon", DataType::Boolean, false),
        Field::new("event_count", DataType::UInt32, false),
        Field::new("events", DataType::Utf8, false),
        Field::new("eclipse", DataType::Utf8, true),
        Field::new("eclipse_magnitude", DataType::Float64, true),
    ])
}

fn date32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn millis(at: Option<NaiveDateTime>) -> Option<i64> {
    at.map(|t| t.and_utc().timestamp_millis())
}

/// Converts a slice of merged rows into an Arrow [`RecordBatch`] matching
/// [`build_schema`].
pub(crate) fn rows_to_record_batch(
    rows: &[MergedRow],
    schema: &Schema,
) -> Result<RecordBatch, IoError> {
    let event_count = rows
        .iter()
        .map(|r| {
            u32::try_from(r.events.len()).map_err(|_| IoError::Parquet {
                reason: format!("too many events on {}", r.record.date),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Date32Array::from(
            rows.iter().map(|r| date32(r.record.date)).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.record.phase_angle_deg).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.record.illumination).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            rows.iter().map(|r| r.record.distance_km).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            rows.iter().map(|r| r.record.phase_name.label()).collect::<Vec<_>>(),
        )),
        Arc::new(TimestampMillisecondArray::from(
            rows.iter().map(|r| millis(r.record.moonrise)).collect::<Vec<_>>(),
        )),
        Arc::new(TimestampMillisecondArray::from(
            rows.iter().map(|r| millis(r.record.moonset)).collect::<Vec<_>>(),
        )),
        Arc::new(BooleanArray::from(
            rows.iter().map(|r| r.dark_sky).collect::<Vec<_>>(),
        )),
        Arc::new(BooleanArray::from(
            rows.iter().map(|r| r.full_moon).collect::<Vec<_>>(),
        )),
        Arc::new(BooleanArray::from(
            rows.iter().map(|r| r.supermoon).collect::<Vec<_>>(),
        )),
        Arc::new(BooleanArray::from(
            rows.iter().map(|r| r.blue_moon).collect::<Vec<_>>(),
        )),
        Arc::new(UInt32Array::from(event_count)),
        Arc::new(StringArray::from(
            rows.iter().map(event_titles).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            rows.iter().map(eclipse_label).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(
            rows.iter()
                .map(|r| r.eclipse.map(|e| e.magnitude))
                .collect::<Vec<_>>(),
        )),
    ];

    RecordBatch::try_new(Arc::new(schema.clone()), columns).map_err(|e| IoError::Parquet {
        reason: e.to_string(),
    })
}

/// Writes a sequence of [`RecordBatch`]es to a Parquet file at `path`.
///
/// # Errors
///
/// Returns [`IoError::Filesystem`] if the file cannot be created and
/// [`IoError::Parquet`] if batch writing or file finalisation fails.
pub(crate) fn write_batches(
    path: &Path,
    batches: &[RecordBatch],
    schema: &Schema,
    props: WriterProperties,
) -> Result<(), IoError> {
    let file = std::fs::File::create(path).map_err(|e| IoError::filesystem(path, e))?;
    let mut writer = ArrowWriter::try_new(file, Arc::new(schema.clone()), Some(props))?;

    for batch in batches {
        writer.write(batch)?;
    }

    writer.close()?;
    Ok(())
}

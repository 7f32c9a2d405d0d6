//! Integration tests: merged table and summary writers.

use std::fs::File;

use arrow::array::{Array, AsArray, RecordBatch};
use arrow::datatypes::{Date32Type, Float64Type, TimestampMillisecondType, UInt32Type};
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use selene_almanac::{DailyRecord, DailySeries, LunarEvents, MergedRow, PhaseName, UserEvent, join};
use selene_ephemeris::{EclipseKind, EclipseRecord, LunarEclipseType};
use selene_io::{
    AlmanacSummary, Compression, EventTable, WriterConfig, read_events_from, write_csv,
    write_parquet, write_summary,
};

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

fn series() -> DailySeries {
    let records = (12..=16)
        .map(|d| {
            let phase = 150.0 + 12.0 * f64::from(d - 12);
            DailyRecord {
                date: date(d),
                phase_angle_deg: phase,
                illumination: (1.0 - phase.to_radians().cos()) / 2.0,
                distance_km: 390_000.0 - 1_000.0 * f64::from(d),
                phase_name: PhaseName::from_angle(phase),
                moonrise: date(d).and_hms_opt(18, 0, 0),
                moonset: if d == 14 { None } else { date(d).and_hms_opt(6, 15, 0) },
            }
        })
        .collect();
    DailySeries::from_records(records).unwrap()
}

fn eclipse() -> EclipseRecord {
    EclipseRecord {
        date: date(14),
        kind: EclipseKind::Lunar(LunarEclipseType::Total),
        greatest: date(14).and_hms_opt(6, 58, 43).unwrap(),
        magnitude: 1.178,
    }
}

fn events() -> EventTable {
    let csv = "date,title,category,notes\n\
               2025-03-14,Eclipse watch,observing,\n\
               2025-03-14,Call Sam,social,\n\
               2025-04-01,Outside,social,\n\
               bad,row,x,\n";
    read_events_from(csv.as_bytes()).unwrap()
}

fn rows() -> (DailySeries, LunarEvents, Vec<MergedRow>) {
    let series = series();
    let lunar = LunarEvents {
        dark_sky: vec![],
        full_moons: vec![],
        supermoons: vec![],
        blue_moons: vec![],
    };
    let rows = join(&series, &events().events, &[eclipse()], &lunar);
    (series, lunar, rows)
}

fn read_batches(path: &std::path::Path) -> Vec<RecordBatch> {
    let file = File::open(path).expect("open parquet");
    ParquetRecordBatchReaderBuilder::try_new(file)
        .expect("parquet metadata")
        .build()
        .expect("reader")
        .collect::<Result<Vec<_>, _>>()
        .expect("batches")
}

#[test]
fn parquet_round_trip() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("almanac.parquet");
    let (_, _, rows) = rows();

    let config = WriterConfig::default().with_compression(Compression::Zstd);
    write_parquet(&path, &rows, &config).expect("write succeeds");

    let batches = read_batches(&path);
    let total: usize = batches.iter().map(RecordBatch::num_rows).sum();
    assert_eq!(total, 5);

    let batch = &batches[0];
    let dates = batch.column(0).as_primitive::<Date32Type>();
    assert_eq!(dates.value_as_date(0), Some(date(12)));

    let illumination = batch.column(2).as_primitive::<Float64Type>();
    assert!((illumination.value(1) - rows[1].record.illumination).abs() < 1e-12);

    let phase_names = batch.column(4).as_string::<i32>();
    assert_eq!(phase_names.value(0), rows[0].record.phase_name.label());

    let moonset = batch.column(6).as_primitive::<TimestampMillisecondType>();
    assert!(moonset.is_null(2));
    assert!(moonset.is_valid(3));

    let event_count = batch.column(11).as_primitive::<UInt32Type>();
    assert_eq!(event_count.value(2), 2);

    let titles = batch.column(12).as_string::<i32>();
    assert_eq!(titles.value(2), "Eclipse watch; Call Sam");

    let eclipse = batch.column(13).as_string::<i32>();
    assert_eq!(eclipse.null_count(), 4);
    assert_eq!(eclipse.value(2), "total lunar");
}

#[test]
fn parquet_honours_row_group_size() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("small_groups.parquet");
    let (_, _, rows) = rows();

    write_parquet(&path, &rows, &WriterConfig::default().with_row_group_size(2))
        .expect("write succeeds");

    let file = File::open(&path).unwrap();
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
    assert_eq!(builder.metadata().num_row_groups(), 3);
}

#[test]
fn csv_output() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("almanac.csv");
    let (_, _, rows) = rows();

    write_csv(&path, &rows).expect("write succeeds");

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "date");
    assert_eq!(&headers[12], "events");

    let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(records.len(), 5);
    assert_eq!(&records[2][0], "2025-03-14");
    assert_eq!(&records[2][6], "");
    assert_eq!(&records[2][12], "Eclipse watch; Call Sam");
    assert_eq!(&records[2][13], "total lunar");
    assert_eq!(&records[0][5], "2025-03-12T18:00:00");
    assert_eq!(&records[0][13], "");
}

#[test]
fn summary_json() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("summary.json");
    let (series, lunar, rows) = rows();
    let table = events();
    let joined: usize = rows.iter().map(|r| r.events.len()).sum();

    let summary = AlmanacSummary::new(&series, &lunar, &[eclipse()], 0.2).with_events(&table, joined);
    write_summary(&path, &summary).expect("write succeeds");

    let value: serde_json::Value =
        serde_json::from_reader(File::open(&path).unwrap()).expect("valid json");
    assert_eq!(value["start"], "2025-03-12");
    assert_eq!(value["end"], "2025-03-16");
    assert_eq!(value["days"], 5);
    assert_eq!(value["dark_sky_threshold"], 0.2);
    assert_eq!(value["eclipses"][0]["kind"], "total lunar");
    assert_eq!(value["eclipses"][0]["date"], "2025-03-14");
    assert_eq!(value["events_loaded"], 3);
    assert_eq!(value["events_joined"], 2);
    assert_eq!(value["event_warnings"][0]["line"], 5);
    assert!(value["skipped"].as_array().unwrap().is_empty());
}

#[test]
fn unjoined_events_keep_rows_intact() {
    let (_, _, rows) = rows();
    let extra = UserEvent {
        date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        title: "Far future".to_string(),
        category: String::new(),
        notes: String::new(),
    };
    let joined = join(&series(), &[extra], &[], &LunarEvents::default());
    assert_eq!(joined.len(), rows.len());
    assert!(joined.iter().all(|r| r.events.is_empty()));
}

//! Loading the user events table.
//!
//! The table is CSV with a header row. Recognised columns are `date`,
//! `title` (or `event_name`), `category` (or `event_type`) and `notes`;
//! header names are matched case-insensitively and anything else is
//! ignored. A bad header is fatal. A bad row is not: it is dropped and
//! reported as an [`EventRowWarning`] while the rest of the table loads.

use std::fmt;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use selene_almanac::UserEvent;
use selene_calendar::parse_date;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::IoError;
use crate::validate::validate_event_headers;

/// A dropped events-table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRowWarning {
    /// 1-based line number in the file (the header is line 1).
    pub line: u64,
    pub reason: String,
}

impl fmt::Display for EventRowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

/// Events that loaded plus warnings for the rows that did not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTable {
    pub events: Vec<UserEvent>,
    pub warnings: Vec<EventRowWarning>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    date: Option<String>,
    #[serde(default, alias = "event_name")]
    title: Option<String>,
    #[serde(default, alias = "event_type")]
    category: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

/// Reads an events table from `path`.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist,
/// [`IoError::Validation`] for an unusable header, and [`IoError::Csv`]
/// for failures that prevent reading the file at all.
pub fn read_events(path: &Path) -> Result<EventTable, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = std::fs::File::open(path).map_err(|e| IoError::filesystem(path, e))?;
    let table = read_events_from(file)?;
    info!(
        path = %path.display(),
        events = table.events.len(),
        warnings = table.warnings.len(),
        "loaded events table"
    );
    Ok(table)
}

/// Reads an events table from any CSV byte stream.
pub fn read_events_from<R: Read>(input: R) -> Result<EventTable, IoError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);

    let headers: StringRecord = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();
    let names: Vec<&str> = headers.iter().collect();
    validate_event_headers(&names).finish()?;
    reader.set_headers(headers.clone());

    let mut table = EventTable::default();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map_or(0, |p| p.line());
                table.warnings.push(row_warning(line, e.to_string()));
                continue;
            }
        };
        let line = record.position().map_or(0, |p| p.line());

        if record.len() != headers.len() {
            let reason = format!("expected {} fields, got {}", headers.len(), record.len());
            table.warnings.push(row_warning(line, reason));
            continue;
        }

        match parse_row(&record, &headers) {
            Ok(event) => table.events.push(event),
            Err(reason) => table.warnings.push(row_warning(line, reason)),
        }
    }
    Ok(table)
}

fn parse_row(record: &StringRecord, headers: &StringRecord) -> Result<UserEvent, String> {
    let raw: RawEvent = record.deserialize(Some(headers)).map_err(|e| e.to_string())?;
    let date = parse_date(raw.date.as_deref().unwrap_or("")).map_err(|e| e.to_string())?;
    Ok(UserEvent {
        date,
        title: raw.title.unwrap_or_default(),
        category: raw.category.unwrap_or_default(),
        notes: raw.notes.unwrap_or_default(),
    })
}

fn row_warning(line: u64, reason: String) -> EventRowWarning {
    let warning = EventRowWarning { line, reason };
    warn!(line = warning.line, reason = %warning.reason, "skipping events row");
    warning
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn canonical_columns() {
        let csv = "date,title,category,notes\n2025-03-14,Eclipse watch,Observation,Total lunar\n";
        let table = read_events_from(csv.as_bytes()).unwrap();
        assert!(table.warnings.is_empty());
        assert_eq!(
            table.events,
            vec![UserEvent {
                date: date(2025, 3, 14),
                title: "Eclipse watch".to_string(),
                category: "Observation".to_string(),
                notes: "Total lunar".to_string(),
            }]
        );
    }

    #[test]
    fn aliases_and_extra_columns() {
        let csv = "Date,Event_Name,event_type,priority,notes\n\
                   2025-01-15,New Year Observing,observing,high,Dark sky session\n";
        let table = read_events_from(csv.as_bytes()).unwrap();
        assert_eq!(table.events.len(), 1);
        assert_eq!(table.events[0].title, "New Year Observing");
        assert_eq!(table.events[0].category, "observing");
    }

    #[test]
    fn bad_date_row_dropped_with_warning() {
        let csv = "date,title,category,notes\n\
                   2025-01-01,ok,a,\n\
                   not-a-date,broken,b,\n\
                   2025-01-03,also ok,c,\n";
        let table = read_events_from(csv.as_bytes()).unwrap();
        let titles: Vec<_> = table.events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["ok", "also ok"]);
        assert_eq!(table.warnings.len(), 1);
        assert_eq!(table.warnings[0].line, 3);
        assert!(table.warnings[0].reason.contains("not-a-date"));
    }

    #[test]
    fn missing_date_and_wrong_width_rows() {
        let csv = "date,title,category,notes\n\
                   ,no date,a,\n\
                   2025-01-02,short\n\
                   2025-01-03,fine,b,c\n";
        let table = read_events_from(csv.as_bytes()).unwrap();
        assert_eq!(table.events.len(), 1);
        assert_eq!(table.warnings.len(), 2);
        assert!(table.warnings[0].reason.contains("missing date"));
        assert!(table.warnings[1].reason.contains("expected 4 fields, got 2"));
    }

    #[test]
    fn datetime_values_keep_the_day() {
        let csv = "date,title\n2025-02-14T21:00:00,Late\n";
        let table = read_events_from(csv.as_bytes()).unwrap();
        assert_eq!(table.events[0].date, date(2025, 2, 14));
        assert_eq!(table.events[0].category, "");
    }

    #[test]
    fn missing_date_column_is_fatal() {
        let csv = "day,title\n2025-01-01,x\n";
        let err = read_events_from(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, IoError::Validation { count: 1, .. }));
    }

    #[test]
    fn missing_file() {
        let err = read_events(Path::new("/definitely/not/here/events.csv")).unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }

    #[test]
    fn warning_display() {
        let w = EventRowWarning {
            line: 7,
            reason: "missing date".to_string(),
        };
        assert_eq!(w.to_string(), "line 7: missing date");
    }
}

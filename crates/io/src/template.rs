//! Starter events table.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::IoError;

#[derive(Serialize)]
struct TemplateRow {
    date: &'static str,
    event_name: &'static str,
    event_type: &'static str,
    priority: &'static str,
    notes: &'static str,
}

const TEMPLATE_ROWS: [TemplateRow; 3] = [
    TemplateRow {
        date: "2025-01-15",
        event_name: "New Year Observing",
        event_type: "observing",
        priority: "high",
        notes: "Dark sky session",
    },
    TemplateRow {
        date: "2025-02-14",
        event_name: "Valentine Stargazing",
        event_type: "social",
        priority: "medium",
        notes: "Romantic stargazing",
    },
    TemplateRow {
        date: "2025-03-20",
        event_name: "Spring Equinox Party",
        event_type: "celebration",
        priority: "low",
        notes: "Equinox celebration",
    },
];

/// Writes a three-row example events table to `path`.
///
/// The file uses the `event_name`/`event_type` spellings and carries a
/// `priority` column, all of which [`read_events`](crate::read_events)
/// accepts.
///
/// # Errors
///
/// Returns [`IoError::FileExists`] if `path` already exists.
pub fn write_events_template(path: &Path) -> Result<(), IoError> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => IoError::FileExists {
                path: path.to_path_buf(),
            },
            _ => IoError::filesystem(path, e),
        })?;

    let mut writer = csv::Writer::from_writer(file);
    for row in &TEMPLATE_ROWS {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| IoError::filesystem(path, e))?;

    info!(path = %path.display(), rows = TEMPLATE_ROWS.len(), "wrote events template");
    Ok(())
}

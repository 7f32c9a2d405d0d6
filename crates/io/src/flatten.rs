//! Scalar views of a [`MergedRow`] shared by the tabular writers.

use chrono::NaiveDateTime;
use selene_almanac::MergedRow;

pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Titles of all same-day events, in table order, joined with `"; "`.
pub(crate) fn event_titles(row: &MergedRow) -> String {
    row.events
        .iter()
        .map(|e| e.title.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) fn eclipse_label(row: &MergedRow) -> Option<String> {
    row.eclipse.map(|e| e.kind.to_string())
}

pub(crate) fn format_instant(at: Option<NaiveDateTime>) -> Option<String> {
    at.map(|t| t.format(TIMESTAMP_FORMAT).to_string())
}

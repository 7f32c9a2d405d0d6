//! Accumulated validation of events-table headers.
//!
//! [`ValidationCollector`] gathers every header problem into a single
//! [`IoError::Validation`] so a user sees them all at once.

use crate::error::IoError;

/// Accumulates validation errors and converts them into a single
/// [`IoError::Validation`].
pub(crate) struct ValidationCollector {
    errors: Vec<String>,
}

impl ValidationCollector {
    /// Create an empty collector.
    pub(crate) fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record one validation error.
    pub(crate) fn push(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Returns the number of recorded errors.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.errors.len()
    }

    /// `Ok(())` if nothing was recorded, otherwise one `Validation` error
    /// whose details join all messages with `"; "`.
    pub(crate) fn finish(self) -> Result<(), IoError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(IoError::Validation {
                count: self.errors.len(),
                details: self.errors.join("; "),
            })
        }
    }
}

/// Accepted spellings for each logical events column, canonical name first.
pub(crate) const COLUMN_ALIASES: [&[&str]; 4] = [
    &["date"],
    &["title", "event_name"],
    &["category", "event_type"],
    &["notes"],
];

/// Checks an events-table header: `date` must be present and no logical
/// column may appear under two spellings.
pub(crate) fn validate_event_headers(headers: &[&str]) -> ValidationCollector {
    let mut c = ValidationCollector::new();
    let has = |name: &str| headers.contains(&name);

    if !has("date") {
        c.push("missing 'date' column");
    }
    for aliases in COLUMN_ALIASES {
        let present: Vec<&str> = aliases.iter().copied().filter(|a| has(a)).collect();
        if present.len() > 1 {
            c.push(format!("columns {} name the same field", present.join(" and ")));
        }
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_empty_is_ok() {
        let c = ValidationCollector::new();
        assert_eq!(c.len(), 0);
        assert!(c.finish().is_ok());
    }

    #[test]
    fn collector_non_empty_is_err_with_correct_count() {
        let mut c = ValidationCollector::new();
        c.push("error one");
        c.push("error two");
        match c.finish().unwrap_err() {
            IoError::Validation { count, details } => {
                assert_eq!(count, 2);
                assert_eq!(details, "error one; error two");
            }
            other => panic!("expected IoError::Validation, got {other:?}"),
        }
    }

    #[test]
    fn template_headers_are_valid() {
        let headers = ["date", "event_name", "event_type", "priority", "notes"];
        assert!(validate_event_headers(&headers).finish().is_ok());
    }

    #[test]
    fn canonical_headers_are_valid() {
        let headers = ["date", "title", "category", "notes"];
        assert!(validate_event_headers(&headers).finish().is_ok());
    }

    #[test]
    fn missing_date_and_duplicate_alias_both_reported() {
        let headers = ["day", "title", "event_name"];
        let c = validate_event_headers(&headers);
        assert_eq!(c.len(), 2);
        let err = c.finish().unwrap_err().to_string();
        assert!(err.contains("missing 'date' column"));
        assert!(err.contains("title and event_name"));
    }
}

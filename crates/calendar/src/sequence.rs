//! Date sequence generation on the Gregorian calendar.

use chrono::NaiveDate;

/// Generates a contiguous sequence of calendar days.
///
/// Starting from `start`, produces up to `n_days` consecutive dates by
/// repeatedly advancing to the next day. Month, leap-day and year boundaries
/// are handled by chrono. The sequence stops early only if chrono's maximum
/// representable date is reached.
///
/// # Example
///
/// ```ignore
/// let start = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
/// let dates = date_sequence(start, 4);
/// assert_eq!(dates.len(), 4);
/// // Dec 30, Dec 31, Jan 1 (2025), Jan 2 (2025)
/// ```
pub fn date_sequence(start: NaiveDate, n_days: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(n_days);
    if n_days == 0 {
        return dates;
    }
    dates.push(start);
    let mut current = start;
    for _ in 1..n_days {
        match current.succ_opt() {
            Some(next) => {
                current = next;
                dates.push(current);
            }
            None => break,
        }
    }
    dates
}

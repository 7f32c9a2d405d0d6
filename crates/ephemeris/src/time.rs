//! Julian day arithmetic, sidereal time and angle normalisation.
//!
//! All instants are UTC `NaiveDateTime`s. The difference between UTC and
//! dynamical time (about a minute over the supported range) is ignored.

use chrono::{DateTime, NaiveDateTime};

/// Julian day of the Unix epoch, 1970-01-01 00:00 UTC.
pub const JD_UNIX_EPOCH: f64 = 2_440_587.5;

/// Julian day of the J2000.0 epoch, 2000-01-01 12:00.
pub const JD_J2000: f64 = 2_451_545.0;

/// Days per Julian century.
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Converts a UTC instant to a Julian day number.
pub fn julian_day(at: NaiveDateTime) -> f64 {
    at.and_utc().timestamp_millis() as f64 / MILLIS_PER_DAY + JD_UNIX_EPOCH
}

/// Converts a Julian day back to a UTC instant, rounded to the millisecond.
///
/// Returns `None` when the value is non-finite or outside chrono's range.
pub fn from_julian_day(jd: f64) -> Option<NaiveDateTime> {
    if !jd.is_finite() {
        return None;
    }
    let millis = ((jd - JD_UNIX_EPOCH) * MILLIS_PER_DAY).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64).map(|dt| dt.naive_utc())
}

/// Julian centuries elapsed since J2000.0.
pub fn centuries_since_j2000(jd: f64) -> f64 {
    (jd - JD_J2000) / DAYS_PER_CENTURY
}

/// Greenwich mean sidereal time in degrees, `[0, 360)`.
pub fn gmst_deg(jd: f64) -> f64 {
    let t = centuries_since_j2000(jd);
    normalize_deg(
        280.460_618_37 + 360.985_647_366_29 * (jd - JD_J2000) + 0.000_387_933 * t * t
            - t * t * t / 38_710_000.0,
    )
}

/// Mean obliquity of the ecliptic in degrees.
pub fn mean_obliquity_deg(jd: f64) -> f64 {
    23.439_291_1 - 0.013_004_2 * centuries_since_j2000(jd)
}

/// Wraps an angle into `[0, 360)`.
pub fn normalize_deg(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if r >= 360.0 { 0.0 } else { r }
}

/// Wraps an angle into `[-180, 180)`.
pub fn normalize_pm180(deg: f64) -> f64 {
    let r = normalize_deg(deg);
    if r >= 180.0 { r - 360.0 } else { r }
}

//! Whole-year sanity checks on the analytic ephemeris.

use chrono::NaiveDate;
use selene_calendar::DateRange;
use selene_ephemeris::{AnalyticEphemeris, EphemerisError, EphemerisSource};

#[test]
fn daily_geometry_stays_in_physical_bounds() {
    let eph = AnalyticEphemeris::new();
    for date in DateRange::year(2025).unwrap().dates() {
        let g = eph.daily_geometry(date).unwrap();
        assert!((0.0..360.0).contains(&g.phase_angle_deg), "{date}");
        assert!((0.0..=1.0).contains(&g.illumination), "{date}");
        assert!(g.distance_km > 356_000.0 && g.distance_km < 407_000.0, "{date}");
        assert!(g.moon_latitude_deg.abs() < 5.4, "{date}");
    }
}

#[test]
fn phase_advances_about_twelve_degrees_a_day() {
    let eph = AnalyticEphemeris::new();
    let dates: Vec<_> = DateRange::year(2030).unwrap().dates().collect();
    for pair in dates.windows(2) {
        let a = eph.daily_geometry(pair[0]).unwrap().phase_angle_deg;
        let b = eph.daily_geometry(pair[1]).unwrap().phase_angle_deg;
        let step = (b - a).rem_euclid(360.0);
        assert!(step > 9.5 && step < 15.5, "{}: {step}", pair[0]);
    }
}

#[test]
fn perigee_of_november_2025() {
    // 2025-11-05 22:27 UTC, 356 833 km
    let eph = AnalyticEphemeris::new();
    let at = NaiveDate::from_ymd_opt(2025, 11, 5)
        .unwrap()
        .and_hms_opt(22, 27, 0)
        .unwrap();
    let g = eph.geometry_at(at).unwrap();
    assert!((g.distance_km - 356_833.0).abs() < 300.0, "{}", g.distance_km);
}

#[test]
fn daily_geometry_outside_validity() {
    let eph = AnalyticEphemeris::new();
    let err = eph
        .daily_geometry(NaiveDate::from_ymd_opt(2101, 1, 1).unwrap())
        .unwrap_err();
    assert!(matches!(err, EphemerisError::OutOfRange { .. }));
}

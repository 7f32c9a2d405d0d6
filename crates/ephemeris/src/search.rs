//! Coarse scan plus bisection for instants when the lunar phase angle
//! reaches a target value.

use chrono::{NaiveDateTime, TimeDelta, Timelike};

use crate::error::EphemerisError;
use crate::source::{EphemerisSource, LunarGeometry};
use crate::time::normalize_pm180;

/// Bisection stops once the bracket is narrower than this.
const CONVERGENCE: TimeDelta = TimeDelta::seconds(1);

/// Upper bound on bisection steps; a half-day bracket converges in ~16.
const MAX_ITERATIONS: usize = 64;

/// A refined phase crossing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PhaseCrossing {
    /// Instant of the crossing, to the second.
    pub instant: NaiveDateTime,
    /// Geometry at that instant.
    pub geometry: LunarGeometry,
}

fn phase_offset<S: EphemerisSource + ?Sized>(
    source: &S,
    at: NaiveDateTime,
    target_deg: f64,
) -> Result<(f64, LunarGeometry), EphemerisError> {
    let g = source.geometry_at(at)?;
    Ok((normalize_pm180(g.phase_angle_deg - target_deg), g))
}

/// A sign change that is a real zero crossing rather than the +-180 wrap.
fn is_genuine_crossing(f_a: f64, f_b: f64) -> bool {
    f_a * f_b < 0.0 && (f_a - f_b).abs() < 270.0
}

fn bisect<S: EphemerisSource + ?Sized>(
    source: &S,
    target_deg: f64,
    mut t_a: NaiveDateTime,
    mut f_a: f64,
    mut t_b: NaiveDateTime,
) -> Result<PhaseCrossing, EphemerisError> {
    for _ in 0..MAX_ITERATIONS {
        if t_b - t_a < CONVERGENCE {
            break;
        }
        let t_mid = t_a + (t_b - t_a) / 2;
        let (f_mid, _) = phase_offset(source, t_mid, target_deg)?;
        if f_a * f_mid <= 0.0 {
            t_b = t_mid;
        } else {
            t_a = t_mid;
            f_a = f_mid;
        }
    }
    let instant = t_a + (t_b - t_a) / 2;
    let instant = instant.with_nanosecond(0).unwrap_or(instant);
    let geometry = source.geometry_at(instant)?;
    Ok(PhaseCrossing { instant, geometry })
}

/// All instants in `[start, end]` where the phase angle passes `target_deg`.
///
/// `step` must be shorter than half a synodic month so no crossing is
/// skipped; callers validate it.
pub(crate) fn phase_crossings<S: EphemerisSource + ?Sized>(
    source: &S,
    start: NaiveDateTime,
    end: NaiveDateTime,
    target_deg: f64,
    step: TimeDelta,
) -> Result<Vec<PhaseCrossing>, EphemerisError> {
    let mut found = Vec::new();
    let mut t_prev = start;
    let (mut f_prev, _) = phase_offset(source, t_prev, target_deg)?;

    while t_prev < end {
        let t_curr = (t_prev + step).min(end);
        let (f_curr, _) = phase_offset(source, t_curr, target_deg)?;
        if f_curr == 0.0 {
            let geometry = source.geometry_at(t_curr)?;
            found.push(PhaseCrossing {
                instant: t_curr,
                geometry,
            });
        } else if is_genuine_crossing(f_prev, f_curr) {
            found.push(bisect(source, target_deg, t_prev, f_prev, t_curr)?);
        }
        t_prev = t_curr;
        f_prev = f_curr;
    }
    Ok(found)
}

/// Golden-section search for the instant in `[center - half_window,
/// center + half_window]` that minimises `objective`.
pub(crate) fn minimize_around<S, F>(
    source: &S,
    center: NaiveDateTime,
    half_window: TimeDelta,
    objective: F,
) -> Result<PhaseCrossing, EphemerisError>
where
    S: EphemerisSource + ?Sized,
    F: Fn(&LunarGeometry) -> f64,
{
    const INV_PHI: f64 = 0.618_033_988_749_895;

    let origin = center - half_window;
    let span_ms = (half_window * 2).num_milliseconds() as f64;
    let at = |x: f64| origin + TimeDelta::milliseconds(x.round() as i64);
    let eval = |x: f64| -> Result<f64, EphemerisError> { Ok(objective(&source.geometry_at(at(x))?)) };

    let (mut a, mut b) = (0.0_f64, span_ms);
    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let (mut fc, mut fd) = (eval(c)?, eval(d)?);

    for _ in 0..MAX_ITERATIONS {
        if b - a < CONVERGENCE.num_milliseconds() as f64 {
            break;
        }
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            fc = eval(c)?;
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            fd = eval(d)?;
        }
    }

    let instant = at((a + b) / 2.0);
    let instant = instant.with_nanosecond(0).unwrap_or(instant);
    let geometry = source.geometry_at(instant)?;
    Ok(PhaseCrossing { instant, geometry })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic::AnalyticEphemeris;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn wrap_is_not_a_crossing() {
        assert!(!is_genuine_crossing(179.0, -179.0));
        assert!(is_genuine_crossing(-3.0, 2.0));
        assert!(!is_genuine_crossing(1.0, 2.0));
    }

    #[test]
    fn twelve_or_thirteen_full_moons_per_year() {
        let eph = AnalyticEphemeris::new();
        let hits = phase_crossings(&eph, at(2025, 1, 1), at(2026, 1, 1), 180.0, TimeDelta::hours(12))
            .unwrap();
        assert_eq!(hits.len(), 12);
        // 2025-01-13 22:27 UTC
        let first = hits[0].instant;
        assert_eq!(first.date(), NaiveDate::from_ymd_opt(2025, 1, 13).unwrap());
        let expected = NaiveDate::from_ymd_opt(2025, 1, 13)
            .unwrap()
            .and_hms_opt(22, 27, 0)
            .unwrap();
        assert!((first - expected).num_minutes().abs() <= 3);
    }

    #[test]
    fn new_moons_found_across_the_wrap() {
        let eph = AnalyticEphemeris::new();
        let hits =
            phase_crossings(&eph, at(2025, 1, 1), at(2025, 3, 1), 0.0, TimeDelta::hours(12)).unwrap();
        let dates: Vec<_> = hits.iter().map(|h| h.instant.date()).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 1, 29).unwrap(),
                NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
            ]
        );
    }

    #[test]
    fn minimize_finds_illumination_peak() {
        let eph = AnalyticEphemeris::new();
        let center = NaiveDate::from_ymd_opt(2025, 1, 13)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();
        let best = minimize_around(&eph, center, TimeDelta::hours(6), |g| -g.illumination).unwrap();
        assert!(best.geometry.illumination > 0.99);
        assert!(best.instant > center - TimeDelta::hours(6));
        assert!(best.instant < center + TimeDelta::hours(6));
    }
}

//! Analytic Sun/Moon positions from truncated periodic series.
//!
//! The Moon uses the principal terms of the ELP-2000/82 based series
//! (about 10" in longitude), the Sun the low-precision equation-of-centre
//! theory (about 0.01 deg). Both are far below the resolution a daily
//! almanac needs.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use selene_calendar::DateRange;
use tracing::trace;

use crate::error::EphemerisError;
use crate::source::{EphemerisSource, LunarGeometry, illumination_from_phase};
use crate::time::{centuries_since_j2000, julian_day, normalize_deg};

/// Kilometres per astronomical unit.
pub const AU_KM: f64 = 149_597_870.7;

/// First and last day the analytic series are trusted for.
const VALID_FIRST: (i32, u32, u32) = (1900, 1, 1);
const VALID_LAST: (i32, u32, u32) = (2100, 12, 31);

/// Longitude and distance terms: multiples of (D, M, M', F), then the sine
/// coefficient for longitude (1e-6 deg) and the cosine coefficient for
/// distance (1e-3 km).
#[rustfmt::skip]
const LON_DIST_TERMS: [(i8, i8, i8, i8, f64, f64); 60] = [
    (0, 0, 1, 0, 6_288_774.0, -20_905_355.0),
    (2, 0, -1, 0, 1_274_027.0, -3_699_111.0),
    (2, 0, 0, 0, 658_314.0, -2_955_968.0),
    (0, 0, 2, 0, 213_618.0, -569_925.0),
    (0, 1, 0, 0, -185_116.0, 48_888.0),
    (0, 0, 0, 2, -114_332.0, -3_149.0),
    (2, 0, -2, 0, 58_793.0, 246_158.0),
    (2, -1, -1, 0, 57_066.0, -152_138.0),
    (2, 0, 1, 0, 53_322.0, -170_733.0),
    (2, -1, 0, 0, 45_758.0, -204_586.0),
    (0, 1, -1, 0, -40_923.0, -129_620.0),
    (1, 0, 0, 0, -34_720.0, 108_743.0),
    (0, 1, 1, 0, -30_383.0, 104_755.0),
    (2, 0, 0, -2, 15_327.0, 10_321.0),
    (0, 0, 1, 2, -12_528.0, 0.0),
    (0, 0, 1, -2, 10_980.0, 79_661.0),
    (4, 0, -1, 0, 10_675.0, -34_782.0),
    (0, 0, 3, 0, 10_034.0, -23_210.0),
    (4, 0, -2, 0, 8_548.0, -21_636.0),
    (2, 1, -1, 0, -7_888.0, 24_208.0),
    (2, 1, 0, 0, -6_766.0, 30_824.0),
    (1, 0, -1, 0, -5_163.0, -8_379.0),
    (1, 1, 0, 0, 4_987.0, -16_675.0),
    (2, -1, 1, 0, 4_036.0, -12_831.0),
    (2, 0, 2, 0, 3_994.0, -10_445.0),
    (4, 0, 0, 0, 3_861.0, -11_650.0),
    (2, 0, -3, 0, 3_665.0, 14_403.0),
    (0, 1, -2, 0, -2_689.0, -7_003.0),
    (2, 0, -1, 2, -2_602.0, 0.0),
    (2, -1, -2, 0, 2_390.0, 10_056.0),
    (1, 0, 1, 0, -2_348.0, 6_322.0),
    (2, -2, 0, 0, 2_236.0, -9_884.0),
    (0, 1, 2, 0, -2_120.0, 5_751.0),
    (0, 2, 0, 0, -2_069.0, 0.0),
    (2, -2, -1, 0, 2_048.0, -4_950.0),
    (2, 0, 1, -2, -1_773.0, 4_130.0),
    (2, 0, 0, 2, -1_595.0, 0.0),
    (4, -1, -1, 0, 1_215.0, -3_958.0),
    (0, 0, 2, 2, -1_110.0, 0.0),
    (3, 0, -1, 0, -892.0, 3_258.0),
    (2, 1, 1, 0, -810.0, 2_616.0),
    (4, -1, -2, 0, 759.0, -1_897.0),
    (0, 2, -1, 0, -713.0, -2_117.0),
    (2, 2, -1, 0, -700.0, 2_354.0),
    (2, 1, -2, 0, 691.0, 0.0),
    (2, -1, 0, -2, 596.0, 0.0),
    (4, 0, 1, 0, 549.0, -1_423.0),
    (0, 0, 4, 0, 537.0, -1_117.0),
    (4, -1, 0, 0, 520.0, -1_571.0),
    (1, 0, -2, 0, -487.0, -1_739.0),
    (2, 1, 0, -2, -399.0, 0.0),
    (0, 0, 2, -2, -381.0, -4_421.0),
    (1, 1, 1, 0, 351.0, 0.0),
    (3, 0, -2, 0, -340.0, 0.0),
    (4, 0, -3, 0, 330.0, 0.0),
    (2, -1, 2, 0, 327.0, 0.0),
    (0, 2, 1, 0, -323.0, 1_165.0),
    (1, 1, -1, 0, 299.0, 0.0),
    (2, 0, 3, 0, 294.0, 0.0),
    (2, 0, -1, -2, 0.0, 8_752.0),
];

/// Latitude terms: multiples of (D, M, M', F), then the sine coefficient
/// (1e-6 deg).
#[rustfmt::skip]
const LAT_TERMS: [(i8, i8, i8, i8, f64); 60] = [
    (0, 0, 0, 1, 5_128_122.0),
    (0, 0, 1, 1, 280_602.0),
    (0, 0, 1, -1, 277_693.0),
    (2, 0, 0, -1, 173_237.0),
    (2, 0, -1, 1, 55_413.0),
    (2, 0, -1, -1, 46_271.0),
    (2, 0, 0, 1, 32_573.0),
    (0, 0, 2, 1, 17_198.0),
    (2, 0, 1, -1, 9_266.0),
    (0, 0, 2, -1, 8_822.0),
    (2, -1, 0, -1, 8_216.0),
    (2, 0, -2, -1, 4_324.0),
    (2, 0, 1, 1, 4_200.0),
    (2, 1, 0, -1, -3_359.0),
    (2, -1, -1, 1, 2_463.0),
    (2, -1, 0, 1, 2_211.0),
    (2, -1, -1, -1, 2_065.0),
    (0, 1, -1, -1, -1_870.0),
    (4, 0, -1, -1, 1_828.0),
    (0, 1, 0, 1, -1_794.0),
    (0, 0, 0, 3, -1_749.0),
    (0, 1, -1, 1, -1_565.0),
    (1, 0, 0, 1, -1_491.0),
    (0, 1, 1, 1, -1_475.0),
    (0, 1, 1, -1, -1_410.0),
    (0, 1, 0, -1, -1_344.0),
    (1, 0, 0, -1, -1_335.0),
    (0, 0, 3, 1, 1_107.0),
    (4, 0, 0, -1, 1_021.0),
    (4, 0, -1, 1, 833.0),
    (0, 0, 1, -3, 777.0),
    (4, 0, -2, 1, 671.0),
    (2, 0, 0, -3, 607.0),
    (2, 0, 2, -1, 596.0),
    (2, -1, 1, -1, 491.0),
    (2, 0, -2, 1, -451.0),
    (0, 0, 3, -1, 439.0),
    (2, 0, 2, 1, 422.0),
    (2, 0, -3, -1, 421.0),
    (2, 1, -1, 1, -366.0),
    (2, 1, 0, 1, -351.0),
    (4, 0, 0, 1, 331.0),
    (2, -1, 1, 1, 315.0),
    (2, -2, 0, -1, 302.0),
    (0, 0, 1, 3, -283.0),
    (2, 1, 1, -1, -229.0),
    (1, 1, 0, -1, 223.0),
    (1, 1, 0, 1, 223.0),
    (0, 1, -2, -1, -220.0),
    (2, 1, -1, -1, -220.0),
    (1, 0, 1, 1, -185.0),
    (2, -1, -2, -1, 181.0),
    (0, 1, 2, 1, -177.0),
    (4, 0, -2, -1, 176.0),
    (4, -1, -1, -1, 166.0),
    (1, 0, 1, -1, -164.0),
    (4, 0, 1, -1, 132.0),
    (1, 0, -1, -1, -119.0),
    (4, -1, 0, -1, 115.0),
    (2, -2, 0, 1, 107.0),
];

/// Geocentric ecliptic position of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipticPosition {
    /// Longitude, degrees `[0, 360)`.
    pub longitude_deg: f64,
    /// Latitude, degrees.
    pub latitude_deg: f64,
    /// Distance from Earth's centre, km.
    pub distance_km: f64,
}

/// Eccentricity correction for terms involving the solar anomaly.
fn eccentricity_factor(e: f64, m_multiple: i8) -> f64 {
    match m_multiple.unsigned_abs() {
        0 => 1.0,
        1 => e,
        _ => e * e,
    }
}

/// Geometric position of the Moon at Julian day `jd`.
pub fn moon_position(jd: f64) -> EclipticPosition {
    let t = centuries_since_j2000(jd);
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;

    let lp = normalize_deg(
        218.316_447_7 + 481_267.881_234_21 * t - 0.001_578_6 * t2 + t3 / 538_841.0
            - t4 / 65_194_000.0,
    );
    let d = normalize_deg(
        297.850_192_1 + 445_267.111_403_4 * t - 0.001_881_9 * t2 + t3 / 545_868.0
            - t4 / 113_065_000.0,
    );
    let m = normalize_deg(357.529_109_2 + 35_999.050_290_9 * t - 0.000_153_6 * t2 + t3 / 24_490_000.0);
    let mp = normalize_deg(
        134.963_396_4 + 477_198.867_505_5 * t + 0.008_741_4 * t2 + t3 / 69_699.0
            - t4 / 14_712_000.0,
    );
    let f = normalize_deg(
        93.272_095_0 + 483_202.017_523_3 * t - 0.003_653_9 * t2 - t3 / 3_526_000.0
            + t4 / 863_310_000.0,
    );
    let a1 = 119.75 + 131.849 * t;
    let a2 = 53.09 + 479_264.290 * t;
    let a3 = 313.45 + 481_266.484 * t;
    let e = 1.0 - 0.002_516 * t - 0.000_007_4 * t2;

    let arg = |cd: i8, cm: i8, cmp: i8, cf: i8| {
        (f64::from(cd) * d + f64::from(cm) * m + f64::from(cmp) * mp + f64::from(cf) * f)
            .to_radians()
    };

    let mut sum_l = 0.0;
    let mut sum_r = 0.0;
    for &(cd, cm, cmp, cf, sl, cr) in &LON_DIST_TERMS {
        let a = arg(cd, cm, cmp, cf);
        let k = eccentricity_factor(e, cm);
        sum_l += sl * k * a.sin();
        sum_r += cr * k * a.cos();
    }

    let mut sum_b = 0.0;
    for &(cd, cm, cmp, cf, sb) in &LAT_TERMS {
        sum_b += sb * eccentricity_factor(e, cm) * arg(cd, cm, cmp, cf).sin();
    }

    let sin = |deg: f64| deg.to_radians().sin();
    sum_l += 3958.0 * sin(a1) + 1962.0 * sin(lp - f) + 318.0 * sin(a2);
    sum_b += -2235.0 * sin(lp) + 382.0 * sin(a3) + 175.0 * sin(a1 - f) + 175.0 * sin(a1 + f)
        + 127.0 * sin(lp - mp)
        - 115.0 * sin(lp + mp);

    EclipticPosition {
        longitude_deg: normalize_deg(lp + sum_l / 1e6),
        latitude_deg: sum_b / 1e6,
        distance_km: 385_000.56 + sum_r / 1000.0,
    }
}

/// Geometric position of the Sun at Julian day `jd`.
pub fn sun_position(jd: f64) -> EclipticPosition {
    let t = centuries_since_j2000(jd);
    let t2 = t * t;

    let l0 = 280.466_46 + 36_000.769_83 * t + 0.000_303_2 * t2;
    let m = (357.529_11 + 35_999.050_29 * t - 0.000_153_7 * t2).to_radians();
    let e = 0.016_708_634 - 0.000_042_037 * t - 0.000_000_126_7 * t2;
    let c = (1.914_602 - 0.004_817 * t - 0.000_014 * t2) * m.sin()
        + (0.019_993 - 0.000_101 * t) * (2.0 * m).sin()
        + 0.000_289 * (3.0 * m).sin();

    let true_anomaly = m + c.to_radians();
    let r_au = 1.000_001_018 * (1.0 - e * e) / (1.0 + e * true_anomaly.cos());

    EclipticPosition {
        longitude_deg: normalize_deg(l0 + c),
        latitude_deg: 0.0,
        distance_km: r_au * AU_KM,
    }
}

/// Built-in [`EphemerisSource`] backed by analytic series.
///
/// Valid from 1900-01-01 through 2100-12-31; the closing midnight of the
/// last day is accepted so whole-day scans can finish.
#[derive(Debug, Clone)]
pub struct AnalyticEphemeris {
    validity: DateRange,
}

impl AnalyticEphemeris {
    /// Creates the ephemeris with its full validity window.
    pub fn new() -> Self {
        let date = |(y, m, d): (i32, u32, u32)| {
            NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
        };
        let (first, last) = (date(VALID_FIRST), date(VALID_LAST));
        Self {
            validity: DateRange::new(first, last).unwrap_or_else(|_| DateRange::single(first)),
        }
    }

    fn covers(&self, at: NaiveDateTime) -> bool {
        let first = self.validity.start().and_time(NaiveTime::MIN);
        let closing = self
            .validity
            .end()
            .and_time(NaiveTime::MIN)
            .checked_add_signed(TimeDelta::days(1));
        at >= first && closing.is_some_and(|c| at <= c)
    }
}

impl Default for AnalyticEphemeris {
    fn default() -> Self {
        Self::new()
    }
}

impl EphemerisSource for AnalyticEphemeris {
    fn geometry_at(&self, at: NaiveDateTime) -> Result<LunarGeometry, EphemerisError> {
        if !self.covers(at) {
            return Err(EphemerisError::OutOfRange {
                at,
                first: self.validity.start(),
                last: self.validity.end(),
            });
        }

        let jd = julian_day(at);
        let moon = moon_position(jd);
        let sun = sun_position(jd);
        let phase = normalize_deg(moon.longitude_deg - sun.longitude_deg);

        let geometry = LunarGeometry {
            phase_angle_deg: phase,
            illumination: illumination_from_phase(phase),
            distance_km: moon.distance_km,
            moon_longitude_deg: moon.longitude_deg,
            moon_latitude_deg: moon.latitude_deg,
            sun_longitude_deg: sun.longitude_deg,
            sun_distance_km: sun.distance_km,
        };

        if let Some(quantity) = geometry.first_non_finite() {
            return Err(EphemerisError::NonFinite { quantity, at });
        }
        trace!(%at, phase, distance_km = geometry.distance_km, "geometry");
        Ok(geometry)
    }

    fn validity(&self) -> DateRange {
        self.validity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn moon_position_reference_instant() {
        // 1992 April 12, 0h
        let pos = moon_position(2_448_724.5);
        assert_relative_eq!(pos.longitude_deg, 133.162_655, epsilon = 1e-3);
        assert_relative_eq!(pos.latitude_deg, -3.229_126, epsilon = 1e-3);
        assert_relative_eq!(pos.distance_km, 368_409.7, epsilon = 1.0);
    }

    #[test]
    fn sun_position_reference_instant() {
        // 1992 October 13, 0h
        let pos = sun_position(2_448_908.5);
        assert_relative_eq!(pos.longitude_deg, 199.909_88, epsilon = 1e-3);
        assert_relative_eq!(pos.distance_km / AU_KM, 0.997_66, epsilon = 1e-4);
    }

    #[test]
    fn validity_window() {
        let eph = AnalyticEphemeris::new();
        assert_eq!(eph.validity().start(), NaiveDate::from_ymd_opt(1900, 1, 1).unwrap());
        assert_eq!(eph.validity().end(), NaiveDate::from_ymd_opt(2100, 12, 31).unwrap());
    }

    #[test]
    fn out_of_range_instants_rejected() {
        let eph = AnalyticEphemeris::new();
        assert!(matches!(
            eph.geometry_at(at(1899, 12, 31, 23, 59)),
            Err(EphemerisError::OutOfRange { .. })
        ));
        assert!(matches!(
            eph.geometry_at(at(2101, 1, 1, 0, 10)),
            Err(EphemerisError::OutOfRange { .. })
        ));
        assert!(eph.geometry_at(at(2101, 1, 1, 0, 0)).is_ok());
        assert!(eph.geometry_at(at(1900, 1, 1, 0, 0)).is_ok());
    }

    #[test]
    fn full_moon_of_january_2025() {
        // Opposition at 2025-01-13 22:27 UTC.
        let eph = AnalyticEphemeris::new();
        let g = eph.geometry_at(at(2025, 1, 13, 22, 27)).unwrap();
        assert_relative_eq!(g.phase_angle_deg, 180.0, epsilon = 0.1);
        assert!(g.illumination > 0.999);
    }

    #[test]
    fn new_moon_of_january_2025() {
        // Conjunction at 2025-01-29 12:36 UTC.
        let eph = AnalyticEphemeris::new();
        let g = eph.geometry_at(at(2025, 1, 29, 12, 36)).unwrap();
        assert!(crate::time::normalize_pm180(g.phase_angle_deg).abs() < 0.1);
        assert!(g.illumination < 0.001);
    }

    #[test]
    fn geometry_is_deterministic() {
        let eph = AnalyticEphemeris::new();
        let t = at(2040, 6, 1, 0, 0);
        assert_eq!(eph.geometry_at(t).unwrap(), eph.geometry_at(t).unwrap());
    }
}

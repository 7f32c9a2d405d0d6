//! Moonrise and moonset for an observer on a UTC day.
//!
//! The Moon's altitude is sampled every ten minutes across the day; each
//! sign change of `altitude - h0` is bisected to the second. `h0` combines
//! the Moon's parallax, semidiameter and standard refraction.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use crate::error::EphemerisError;
use crate::source::EphemerisSource;
use crate::time::{gmst_deg, julian_day, mean_obliquity_deg};

const EARTH_RADIUS_KM: f64 = 6378.14;

const SCAN_STEP: TimeDelta = TimeDelta::minutes(10);

const BISECT_ITERATIONS: usize = 12;

/// Geographic position of an observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    /// Geodetic latitude in degrees, north positive. Range: [-90, 90].
    pub latitude_deg: f64,
    /// Longitude in degrees, east positive. Range: [-180, 180].
    pub longitude_deg: f64,
}

impl Observer {
    /// Creates an observer, checking both coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`EphemerisError::InvalidObserver`] if either coordinate is
    /// non-finite or out of range.
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Result<Self, EphemerisError> {
        let observer = Self {
            latitude_deg,
            longitude_deg,
        };
        observer.validate()?;
        Ok(observer)
    }

    /// Checks the coordinate bounds.
    pub fn validate(&self) -> Result<(), EphemerisError> {
        if !self.latitude_deg.is_finite() || !(-90.0..=90.0).contains(&self.latitude_deg) {
            return Err(EphemerisError::InvalidObserver {
                details: format!("latitude {} outside -90..=90", self.latitude_deg),
            });
        }
        if !self.longitude_deg.is_finite() || !(-180.0..=180.0).contains(&self.longitude_deg) {
            return Err(EphemerisError::InvalidObserver {
                details: format!("longitude {} outside -180..=180", self.longitude_deg),
            });
        }
        Ok(())
    }
}

/// First moonrise and moonset within a UTC day. Either may be absent: the
/// Moon skips one rise and one set each lunation, and at high latitude may
/// stay above or below the horizon all day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RiseSet {
    pub rise: Option<NaiveDateTime>,
    pub set: Option<NaiveDateTime>,
}

/// Topocentric-horizon altitude of the Moon's centre minus the standard
/// rise/set altitude, degrees. Positive means above the horizon.
pub(crate) fn altitude_above_horizon<S: EphemerisSource + ?Sized>(
    source: &S,
    at: NaiveDateTime,
    observer: &Observer,
) -> Result<f64, EphemerisError> {
    let g = source.geometry_at(at)?;
    let jd = julian_day(at);

    let eps = mean_obliquity_deg(jd).to_radians();
    let lon = g.moon_longitude_deg.to_radians();
    let lat = g.moon_latitude_deg.to_radians();
    let ra = (lon.sin() * eps.cos() - lat.tan() * eps.sin()).atan2(lon.cos());
    let dec = (lat.sin() * eps.cos() + lat.cos() * eps.sin() * lon.sin()).asin();

    let hour_angle = (gmst_deg(jd) + observer.longitude_deg).to_radians() - ra;
    let phi = observer.latitude_deg.to_radians();
    let altitude = (phi.sin() * dec.sin() + phi.cos() * dec.cos() * hour_angle.cos())
        .clamp(-1.0, 1.0)
        .asin()
        .to_degrees();

    let parallax = (EARTH_RADIUS_KM / g.distance_km).asin().to_degrees();
    let h0 = 0.7275 * parallax - 0.5667;
    Ok(altitude - h0)
}

fn bisect<S: EphemerisSource + ?Sized>(
    source: &S,
    observer: &Observer,
    mut t_a: NaiveDateTime,
    mut f_a: f64,
    mut t_b: NaiveDateTime,
) -> Result<NaiveDateTime, EphemerisError> {
    for _ in 0..BISECT_ITERATIONS {
        let t_mid = t_a + (t_b - t_a) / 2;
        let f_mid = altitude_above_horizon(source, t_mid, observer)?;
        if f_a * f_mid <= 0.0 {
            t_b = t_mid;
        } else {
            t_a = t_mid;
            f_a = f_mid;
        }
    }
    let t = t_a + (t_b - t_a) / 2;
    Ok(t.with_nanosecond(0).unwrap_or(t))
}

/// Moonrise and moonset on `date` (UTC) for `observer`.
///
/// # Errors
///
/// Propagates [`EphemerisError`] from the source, including
/// [`EphemerisError::OutOfRange`] for days outside its validity, and
/// returns [`EphemerisError::InvalidObserver`] for bad coordinates.
pub fn moon_rise_set<S: EphemerisSource + ?Sized>(
    source: &S,
    date: NaiveDate,
    observer: &Observer,
) -> Result<RiseSet, EphemerisError> {
    observer.validate()?;

    let start = date.and_time(NaiveTime::MIN);
    let end = start + TimeDelta::days(1);
    let mut result = RiseSet::default();

    let mut t_prev = start;
    let mut f_prev = altitude_above_horizon(source, t_prev, observer)?;
    while t_prev < end && (result.rise.is_none() || result.set.is_none()) {
        let t_curr = t_prev + SCAN_STEP;
        let f_curr = altitude_above_horizon(source, t_curr, observer)?;

        if f_prev < 0.0 && f_curr >= 0.0 && result.rise.is_none() {
            result.rise = Some(bisect(source, observer, t_prev, f_prev, t_curr)?);
        } else if f_prev >= 0.0 && f_curr < 0.0 && result.set.is_none() {
            result.set = Some(bisect(source, observer, t_prev, f_prev, t_curr)?);
        }

        t_prev = t_curr;
        f_prev = f_curr;
    }

    // a crossing bisected into the closing midnight belongs to the next day
    result.rise = result.rise.filter(|t| t.date() == date);
    result.set = result.set.filter(|t| t.date() == date);
    Ok(result)
}

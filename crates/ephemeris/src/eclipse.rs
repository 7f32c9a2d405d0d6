//! Eclipse search: lunar (penumbral/partial/total) and solar
//! (partial/annular/total) eclipses by shadow geometry.
//!
//! Lunar eclipses:
//!   1. Find full moons (phase angle crossing 180 deg)
//!   2. Skip those with ecliptic latitude above the candidacy threshold
//!   3. Refine to the instant of closest approach to the shadow axis
//!   4. Compare the Moon's limbs to the Danjon-enlarged shadow radii
//!
//! Solar eclipses:
//!   1. Find new moons (phase angle crossing 0 deg)
//!   2. Refine to the instant of minimum Sun-Moon separation
//!   3. Compare separation to disk radii widened by the lunar parallax,
//!      so eclipses visible anywhere on Earth are found

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use selene_calendar::DateRange;
use tracing::debug;

use crate::error::EphemerisError;
use crate::search::{minimize_around, phase_crossings};
use crate::source::{EphemerisSource, LunarGeometry};

/// Earth equatorial radius in km.
const EARTH_RADIUS_KM: f64 = 6378.137;

/// Sun nominal radius in km.
const SUN_RADIUS_KM: f64 = 696_000.0;

/// Moon mean radius in km.
const MOON_RADIUS_KM: f64 = 1737.4;

/// Atmospheric enlargement of Earth's shadow.
const DANJON_ENLARGEMENT: f64 = 1.02;

/// Full/new moons with larger ecliptic latitude cannot produce an eclipse.
const ECLIPSE_LAT_THRESHOLD_DEG: f64 = 2.0;

/// Half-width of the window searched for greatest eclipse.
const REFINE_HALF_WINDOW: TimeDelta = TimeDelta::hours(3);

/// Type of lunar eclipse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LunarEclipseType {
    /// Moon passes only through the penumbra.
    Penumbral,
    /// Part of the Moon enters the umbra.
    Partial,
    /// The whole Moon is inside the umbra.
    Total,
}

/// Type of solar eclipse, as seen from the best-placed point on Earth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolarEclipseType {
    /// Moon covers part of the Sun.
    Partial,
    /// Moon centred on the Sun but too small to cover it.
    Annular,
    /// Moon covers the Sun completely.
    Total,
}

/// What kind of eclipse a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EclipseKind {
    Lunar(LunarEclipseType),
    Solar(SolarEclipseType),
}

impl EclipseKind {
    pub fn is_lunar(&self) -> bool {
        matches!(self, EclipseKind::Lunar(_))
    }
}

impl fmt::Display for LunarEclipseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LunarEclipseType::Penumbral => "penumbral",
            LunarEclipseType::Partial => "partial",
            LunarEclipseType::Total => "total",
        })
    }
}

impl fmt::Display for SolarEclipseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SolarEclipseType::Partial => "partial",
            SolarEclipseType::Annular => "annular",
            SolarEclipseType::Total => "total",
        })
    }
}

impl fmt::Display for EclipseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EclipseKind::Lunar(t) => write!(f, "{t} lunar"),
            EclipseKind::Solar(t) => write!(f, "{t} solar"),
        }
    }
}

/// One eclipse, dated by the UTC day of greatest eclipse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipseRecord {
    /// UTC date of greatest eclipse.
    pub date: NaiveDate,
    /// Eclipse kind.
    pub kind: EclipseKind,
    /// Instant of greatest eclipse, to the second.
    pub greatest: NaiveDateTime,
    /// Umbral magnitude for lunar eclipses (penumbral magnitude when the
    /// umbra is missed); fraction of the solar diameter covered for solar.
    pub magnitude: f64,
}

/// Lists the eclipses that fall in a calendar year.
pub trait EclipseFinder {
    /// Eclipses whose greatest instant falls in `year` (UTC), in
    /// chronological order.
    ///
    /// # Errors
    ///
    /// Returns an error if the year lies outside the finder's coverage or
    /// the underlying geometry fails.
    fn eclipses_in_year(&self, year: i32) -> Result<Vec<EclipseRecord>, EphemerisError>;
}

/// Configuration for [`ShadowEclipseFinder`].
#[derive(Debug, Clone)]
pub struct EclipseConfig {
    include_penumbral: bool,
    scan_step: TimeDelta,
}

impl Default for EclipseConfig {
    fn default() -> Self {
        Self {
            include_penumbral: true,
            scan_step: TimeDelta::hours(12),
        }
    }
}

impl EclipseConfig {
    /// Whether penumbral-only lunar eclipses are reported.
    pub fn with_include_penumbral(mut self, include: bool) -> Self {
        self.include_penumbral = include;
        self
    }

    /// Step of the coarse scan for new and full moons.
    pub fn with_scan_step(mut self, step: TimeDelta) -> Self {
        self.scan_step = step;
        self
    }

    pub fn include_penumbral(&self) -> bool {
        self.include_penumbral
    }

    pub fn scan_step(&self) -> TimeDelta {
        self.scan_step
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EphemerisError::InvalidConfig`] if the scan step is not
    /// positive or is long enough to skip a lunation's crossing.
    pub fn validate(&self) -> Result<(), EphemerisError> {
        if self.scan_step <= TimeDelta::zero() || self.scan_step > TimeDelta::days(7) {
            return Err(EphemerisError::InvalidConfig {
                reason: format!(
                    "scan_step must be in (0, 7 days], got {}s",
                    self.scan_step.num_seconds()
                ),
            });
        }
        Ok(())
    }
}

/// [`EclipseFinder`] that applies shadow geometry to an [`EphemerisSource`].
#[derive(Debug, Clone)]
pub struct ShadowEclipseFinder<'a, S: ?Sized> {
    source: &'a S,
    config: EclipseConfig,
}

impl<'a, S: EphemerisSource + ?Sized> ShadowEclipseFinder<'a, S> {
    /// Creates a finder over `source` with default configuration.
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            config: EclipseConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EclipseConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EclipseConfig {
        &self.config
    }

    /// Scan window for `year`: one day of margin on each side, clamped to
    /// the source's validity.
    fn window(&self, year: i32) -> Result<(NaiveDateTime, NaiveDateTime), EphemerisError> {
        let validity = self.source.validity();
        let requested = DateRange::year(year)?;
        let Some(overlap) = requested.intersect(&validity) else {
            return Err(EphemerisError::OutOfRange {
                at: requested.start().and_time(NaiveTime::MIN),
                first: validity.start(),
                last: validity.end(),
            });
        };

        let floor = validity.start().and_time(NaiveTime::MIN);
        let ceiling = validity.end().and_time(NaiveTime::MIN) + TimeDelta::days(1);
        let start = (overlap.start().and_time(NaiveTime::MIN) - TimeDelta::days(1)).max(floor);
        let end = (overlap.end().and_time(NaiveTime::MIN) + TimeDelta::days(2)).min(ceiling);
        Ok((start, end))
    }

    fn lunar_eclipse(
        &self,
        full_moon: NaiveDateTime,
    ) -> Result<Option<EclipseRecord>, EphemerisError> {
        let greatest = match self.refine(full_moon, |g| 180.0 - g.elongation_deg()) {
            Ok(hit) => hit,
            Err(EphemerisError::OutOfRange { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        let g = &greatest.geometry;
        let (penumbral_r, umbral_r) = shadow_radii_deg(g.sun_distance_km, g.distance_km);
        let moon_r = angular_radius_deg(MOON_RADIUS_KM, g.distance_km);
        let offset = (180.0 - g.elongation_deg()).abs();

        let Some(kind) = classify_lunar(offset, moon_r, umbral_r, penumbral_r) else {
            return Ok(None);
        };
        if kind == LunarEclipseType::Penumbral && !self.config.include_penumbral {
            return Ok(None);
        }

        let magnitude = match kind {
            LunarEclipseType::Penumbral => (penumbral_r - offset + moon_r) / (2.0 * moon_r),
            _ => (umbral_r - offset + moon_r) / (2.0 * moon_r),
        };
        Ok(Some(EclipseRecord {
            date: greatest.instant.date(),
            kind: EclipseKind::Lunar(kind),
            greatest: greatest.instant,
            magnitude,
        }))
    }

    fn solar_eclipse(
        &self,
        new_moon: NaiveDateTime,
    ) -> Result<Option<EclipseRecord>, EphemerisError> {
        let greatest = match self.refine(new_moon, |g| g.elongation_deg()) {
            Ok(hit) => hit,
            Err(EphemerisError::OutOfRange { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        let g = &greatest.geometry;
        let sun_r = angular_radius_deg(SUN_RADIUS_KM, g.sun_distance_km);
        let moon_r = angular_radius_deg(MOON_RADIUS_KM, g.distance_km);
        let parallax = parallax_deg(g.distance_km) - parallax_deg(g.sun_distance_km);
        let separation = g.elongation_deg();

        let Some(kind) = classify_solar(sun_r, moon_r, parallax, separation) else {
            return Ok(None);
        };
        let magnitude = match kind {
            SolarEclipseType::Partial => {
                // separation as seen from the point on Earth closest to the axis
                let local = separation - parallax;
                ((sun_r + moon_r - local) / (2.0 * sun_r)).clamp(0.0, 1.0)
            }
            _ => moon_r / sun_r,
        };
        Ok(Some(EclipseRecord {
            date: greatest.instant.date(),
            kind: EclipseKind::Solar(kind),
            greatest: greatest.instant,
            magnitude,
        }))
    }

    fn refine(
        &self,
        around: NaiveDateTime,
        objective: impl Fn(&LunarGeometry) -> f64,
    ) -> Result<crate::search::PhaseCrossing, EphemerisError> {
        minimize_around(self.source, around, REFINE_HALF_WINDOW, objective)
    }
}

impl<S: EphemerisSource + ?Sized> EclipseFinder for ShadowEclipseFinder<'_, S> {
    fn eclipses_in_year(&self, year: i32) -> Result<Vec<EclipseRecord>, EphemerisError> {
        self.config.validate()?;
        let (start, end) = self.window(year)?;
        let step = self.config.scan_step;

        let mut records = Vec::new();
        for full in phase_crossings(self.source, start, end, 180.0, step)? {
            if full.geometry.moon_latitude_deg.abs() > ECLIPSE_LAT_THRESHOLD_DEG {
                continue;
            }
            if let Some(r) = self.lunar_eclipse(full.instant)? {
                records.push(r);
            }
        }
        for new in phase_crossings(self.source, start, end, 0.0, step)? {
            if new.geometry.moon_latitude_deg.abs() > ECLIPSE_LAT_THRESHOLD_DEG {
                continue;
            }
            if let Some(r) = self.solar_eclipse(new.instant)? {
                records.push(r);
            }
        }

        records.retain(|r| r.date.year() == year);
        records.sort_by_key(|r| r.greatest);
        debug!(year, count = records.len(), "eclipse search complete");
        Ok(records)
    }
}

/// Angular radius in degrees of a sphere of `radius_km` at `distance_km`.
fn angular_radius_deg(radius_km: f64, distance_km: f64) -> f64 {
    (radius_km / distance_km).asin().to_degrees()
}

/// Horizontal parallax in degrees of a body at `distance_km`.
fn parallax_deg(distance_km: f64) -> f64 {
    angular_radius_deg(EARTH_RADIUS_KM, distance_km)
}

/// Penumbral and umbral radii of Earth's shadow at the Moon's distance, in
/// degrees.
fn shadow_radii_deg(sun_distance_km: f64, moon_distance_km: f64) -> (f64, f64) {
    let pi_sun = parallax_deg(sun_distance_km);
    let pi_moon = parallax_deg(moon_distance_km);
    let s_sun = angular_radius_deg(SUN_RADIUS_KM, sun_distance_km);
    (
        DANJON_ENLARGEMENT * (pi_moon + pi_sun + s_sun),
        DANJON_ENLARGEMENT * (pi_moon + pi_sun - s_sun),
    )
}

fn classify_lunar(
    shadow_offset_deg: f64,
    moon_radius_deg: f64,
    umbral_radius_deg: f64,
    penumbral_radius_deg: f64,
) -> Option<LunarEclipseType> {
    let near_limb = shadow_offset_deg - moon_radius_deg;
    let far_limb = shadow_offset_deg + moon_radius_deg;

    if near_limb >= penumbral_radius_deg {
        None
    } else if far_limb <= umbral_radius_deg {
        Some(LunarEclipseType::Total)
    } else if near_limb < umbral_radius_deg {
        Some(LunarEclipseType::Partial)
    } else {
        Some(LunarEclipseType::Penumbral)
    }
}

/// `parallax_deg` is the Moon's parallax less the Sun's: the largest shift
/// in Sun-Moon separation any observer on Earth can see.
fn classify_solar(
    sun_radius_deg: f64,
    moon_radius_deg: f64,
    parallax_deg: f64,
    separation_deg: f64,
) -> Option<SolarEclipseType> {
    if separation_deg >= sun_radius_deg + moon_radius_deg + parallax_deg {
        None
    } else if separation_deg < parallax_deg {
        // shadow axis meets the Earth
        if moon_radius_deg >= sun_radius_deg {
            Some(SolarEclipseType::Total)
        } else {
            Some(SolarEclipseType::Annular)
        }
    } else {
        Some(SolarEclipseType::Partial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic::AnalyticEphemeris;

    #[test]
    fn classify_lunar_cases() {
        // shadow radii roughly umbra 0.72, penumbra 1.28, moon 0.26
        assert_eq!(classify_lunar(0.1, 0.26, 0.72, 1.28), Some(LunarEclipseType::Total));
        assert_eq!(classify_lunar(0.6, 0.26, 0.72, 1.28), Some(LunarEclipseType::Partial));
        assert_eq!(classify_lunar(1.2, 0.26, 0.72, 1.28), Some(LunarEclipseType::Penumbral));
        assert_eq!(classify_lunar(1.6, 0.26, 0.72, 1.28), None);
    }

    #[test]
    fn classify_solar_cases() {
        assert_eq!(classify_solar(0.266, 0.270, 0.93, 0.2), Some(SolarEclipseType::Total));
        assert_eq!(classify_solar(0.266, 0.250, 0.93, 0.2), Some(SolarEclipseType::Annular));
        assert_eq!(classify_solar(0.266, 0.260, 0.93, 1.1), Some(SolarEclipseType::Partial));
        assert_eq!(classify_solar(0.266, 0.260, 0.93, 1.5), None);
    }

    #[test]
    fn shadow_radii_are_ordered() {
        let (pen, umb) = shadow_radii_deg(149_600_000.0, 384_400.0);
        assert!(pen > umb);
        assert!(umb > 0.6 && umb < 0.8);
        assert!(pen > 1.2 && pen < 1.4);
    }

    #[test]
    fn display_strings() {
        assert_eq!(EclipseKind::Lunar(LunarEclipseType::Total).to_string(), "total lunar");
        assert_eq!(EclipseKind::Solar(SolarEclipseType::Annular).to_string(), "annular solar");
        assert_eq!(
            EclipseKind::Lunar(LunarEclipseType::Penumbral).to_string(),
            "penumbral lunar"
        );
    }

    #[test]
    fn config_rejects_bad_step() {
        assert!(EclipseConfig::default().validate().is_ok());
        let zero = EclipseConfig::default().with_scan_step(TimeDelta::zero());
        assert!(matches!(zero.validate(), Err(EphemerisError::InvalidConfig { .. })));
        let long = EclipseConfig::default().with_scan_step(TimeDelta::days(10));
        assert!(long.validate().is_err());
    }

    #[test]
    fn year_outside_validity_is_out_of_range() {
        let eph = AnalyticEphemeris::new();
        let finder = ShadowEclipseFinder::new(&eph);
        assert!(matches!(
            finder.eclipses_in_year(2300),
            Err(EphemerisError::OutOfRange { .. })
        ));
    }
}

//! The [`EphemerisSource`] abstraction and the geometry it yields.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use selene_calendar::DateRange;

use crate::error::EphemerisError;

/// Geocentric Sun/Moon geometry at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LunarGeometry {
    /// Moon minus Sun ecliptic longitude, `[0, 360)`. 0 is new, 180 is full.
    pub phase_angle_deg: f64,
    /// Illuminated fraction of the lunar disk, `[0, 1]`.
    pub illumination: f64,
    /// Earth-Moon centre distance in km.
    pub distance_km: f64,
    /// Geometric ecliptic longitude of the Moon, degrees.
    pub moon_longitude_deg: f64,
    /// Ecliptic latitude of the Moon, degrees.
    pub moon_latitude_deg: f64,
    /// Geometric ecliptic longitude of the Sun, degrees.
    pub sun_longitude_deg: f64,
    /// Earth-Sun distance in km.
    pub sun_distance_km: f64,
}

impl LunarGeometry {
    /// Angular separation of the Moon from the Sun as seen from Earth's
    /// centre, degrees `[0, 180]`. The solar latitude is taken as zero.
    pub fn elongation_deg(&self) -> f64 {
        let dlon = (self.moon_longitude_deg - self.sun_longitude_deg).to_radians();
        let cos_e = self.moon_latitude_deg.to_radians().cos() * dlon.cos();
        cos_e.clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Returns the name of the first non-finite field, if any.
    pub(crate) fn first_non_finite(&self) -> Option<&'static str> {
        [
            ("phase_angle_deg", self.phase_angle_deg),
            ("illumination", self.illumination),
            ("distance_km", self.distance_km),
            ("moon_longitude_deg", self.moon_longitude_deg),
            ("moon_latitude_deg", self.moon_latitude_deg),
            ("sun_longitude_deg", self.sun_longitude_deg),
            ("sun_distance_km", self.sun_distance_km),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }
}

/// Illuminated fraction of the disk for a given phase angle.
///
/// `(1 - cos(phase)) / 2`: 0 at new moon, 1 at full moon.
pub fn illumination_from_phase(phase_angle_deg: f64) -> f64 {
    ((1.0 - phase_angle_deg.to_radians().cos()) / 2.0).clamp(0.0, 1.0)
}

/// Supplies Sun/Moon geometry for arbitrary UTC instants.
///
/// Implementations must be deterministic: the same instant always yields
/// the same geometry.
pub trait EphemerisSource {
    /// Geometry at one instant.
    ///
    /// # Errors
    ///
    /// Returns [`EphemerisError::OutOfRange`] outside [`validity`](Self::validity)
    /// and [`EphemerisError::NonFinite`] if the computation degenerates.
    fn geometry_at(&self, at: NaiveDateTime) -> Result<LunarGeometry, EphemerisError>;

    /// Inclusive range of days this source can answer for.
    fn validity(&self) -> DateRange;

    /// Geometry at 00:00 UTC on `date`, the almanac's daily sampling instant.
    ///
    /// Days outside [`validity`](Self::validity) are rejected even if the
    /// source could still answer for their midnight.
    fn daily_geometry(&self, date: NaiveDate) -> Result<LunarGeometry, EphemerisError> {
        let at = date.and_time(NaiveTime::MIN);
        let validity = self.validity();
        if !validity.contains(date) {
            return Err(EphemerisError::OutOfRange {
                at,
                first: validity.start(),
                last: validity.end(),
            });
        }
        self.geometry_at(at)
    }
}

impl<S: EphemerisSource + ?Sized> EphemerisSource for &S {
    fn geometry_at(&self, at: NaiveDateTime) -> Result<LunarGeometry, EphemerisError> {
        (**self).geometry_at(at)
    }

    fn validity(&self) -> DateRange {
        (**self).validity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn illumination_endpoints() {
        assert_relative_eq!(illumination_from_phase(0.0), 0.0);
        assert_relative_eq!(illumination_from_phase(90.0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(illumination_from_phase(180.0), 1.0);
        assert_relative_eq!(illumination_from_phase(270.0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn illumination_is_symmetric_about_full() {
        for d in [10.0, 45.0, 100.0, 170.0] {
            assert_relative_eq!(
                illumination_from_phase(180.0 - d),
                illumination_from_phase(180.0 + d),
                epsilon = 1e-12
            );
        }
    }

    fn geometry(moon_lon: f64, moon_lat: f64, sun_lon: f64) -> LunarGeometry {
        LunarGeometry {
            phase_angle_deg: crate::time::normalize_deg(moon_lon - sun_lon),
            illumination: 0.5,
            distance_km: 384_400.0,
            moon_longitude_deg: moon_lon,
            moon_latitude_deg: moon_lat,
            sun_longitude_deg: sun_lon,
            sun_distance_km: 149_597_870.7,
        }
    }

    #[test]
    fn elongation_at_opposition_equals_180_minus_latitude() {
        let g = geometry(190.0, 0.4, 10.0);
        assert_relative_eq!(g.elongation_deg(), 179.6, epsilon = 1e-9);
    }

    #[test]
    fn elongation_at_conjunction_equals_latitude() {
        let g = geometry(10.0, -1.2, 10.0);
        assert_relative_eq!(g.elongation_deg(), 1.2, epsilon = 1e-9);
    }

    #[test]
    fn first_non_finite_names_field() {
        let mut g = geometry(0.0, 0.0, 0.0);
        assert_eq!(g.first_non_finite(), None);
        g.distance_km = f64::NAN;
        assert_eq!(g.first_non_finite(), Some("distance_km"));
    }
}

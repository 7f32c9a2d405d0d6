//! The per-day almanac record and its phase label.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use selene_ephemeris::{LunarGeometry, RiseSet};
use serde::{Serialize, Serializer};

/// Eight 45 deg phase bins centred on 0, 45, 90, ... 315 deg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseName {
    New,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    Full,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl PhaseName {
    /// All bins in order of increasing phase angle.
    pub const ALL: [PhaseName; 8] = [
        PhaseName::New,
        PhaseName::WaxingCrescent,
        PhaseName::FirstQuarter,
        PhaseName::WaxingGibbous,
        PhaseName::Full,
        PhaseName::WaningGibbous,
        PhaseName::LastQuarter,
        PhaseName::WaningCrescent,
    ];

    /// Bin for a phase angle in degrees. Any finite angle is accepted and
    /// wrapped; each bin is half-open, `[centre - 22.5, centre + 22.5)`.
    pub fn from_angle(phase_angle_deg: f64) -> Self {
        let shifted = (phase_angle_deg + 22.5).rem_euclid(360.0);
        let bin = (shifted / 45.0).floor() as usize;
        Self::ALL[bin.min(7)]
    }

    /// Canonical angle at the centre of the bin.
    pub fn centre_deg(self) -> f64 {
        Self::ALL
            .iter()
            .position(|p| *p == self)
            .map_or(0.0, |i| i as f64 * 45.0)
    }

    /// Display label, e.g. `"Waxing Gibbous"`.
    pub fn label(self) -> &'static str {
        match self {
            PhaseName::New => "New",
            PhaseName::WaxingCrescent => "Waxing Crescent",
            PhaseName::FirstQuarter => "First Quarter",
            PhaseName::WaxingGibbous => "Waxing Gibbous",
            PhaseName::Full => "Full",
            PhaseName::WaningGibbous => "Waning Gibbous",
            PhaseName::LastQuarter => "Last Quarter",
            PhaseName::WaningCrescent => "Waning Crescent",
        }
    }
}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for PhaseName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One calendar day of the almanac, sampled at 00:00 UTC.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    /// Moon minus Sun ecliptic longitude, `[0, 360)`.
    pub phase_angle_deg: f64,
    /// Illuminated fraction of the disk, `[0, 1]`.
    pub illumination: f64,
    /// Earth-Moon distance in km.
    pub distance_km: f64,
    pub phase_name: PhaseName,
    /// First moonrise of the UTC day, when an observer is configured.
    pub moonrise: Option<NaiveDateTime>,
    /// First moonset of the UTC day, when an observer is configured.
    pub moonset: Option<NaiveDateTime>,
}

impl DailyRecord {
    /// Builds a record from raw geometry; rise/set are left empty.
    pub fn from_geometry(date: NaiveDate, geometry: &LunarGeometry) -> Self {
        Self {
            date,
            phase_angle_deg: geometry.phase_angle_deg,
            illumination: geometry.illumination,
            distance_km: geometry.distance_km,
            phase_name: PhaseName::from_angle(geometry.phase_angle_deg),
            moonrise: None,
            moonset: None,
        }
    }

    /// Attaches moonrise/moonset times.
    pub fn with_rise_set(mut self, rise_set: RiseSet) -> Self {
        self.moonrise = rise_set.rise;
        self.moonset = rise_set.set;
        self
    }

    pub fn is_full(&self) -> bool {
        self.phase_name == PhaseName::Full
    }

    /// Absolute angular distance from exact opposition, degrees `[0, 180]`.
    pub fn offset_from_full_deg(&self) -> f64 {
        (self.phase_angle_deg.rem_euclid(360.0) - 180.0).abs()
    }
}

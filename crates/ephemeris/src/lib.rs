//! # selene-ephemeris
//!
//! Geometry providers behind the almanac: where the Moon and Sun are, how
//! much of the lunar disk is lit, when the Moon rises and sets for an
//! observer, and which eclipses fall in a year.
//!
//! Both external capabilities are traits so the numerical backend can be
//! swapped:
//!
//! | Trait | Input | Output | Bundled implementation |
//! |-------|-------|--------|------------------------|
//! | [`EphemerisSource`] | instant (UTC) | [`LunarGeometry`] | [`AnalyticEphemeris`] |
//! | [`EclipseFinder`] | year | `Vec<`[`EclipseRecord`]`>` | [`ShadowEclipseFinder`] |
//!
//! # Architecture
//!
//! ```text
//! AnalyticEphemeris::geometry_at()
//!   ├─ moon_position()        (analytic.rs, truncated lunar series)
//!   └─ sun_position()         (analytic.rs, low-precision solar theory)
//!
//! moon_rise_set()             (riseset.rs)
//!   ├─ moon_altitude_deg()    ecliptic -> equatorial -> horizontal
//!   └─ bisect sign changes    10-minute scan over the UTC day
//!
//! ShadowEclipseFinder::eclipses_in_year()   (eclipse.rs)
//!   ├─ phase_crossings()      (search.rs, 180 deg and 0 deg)
//!   ├─ classify_lunar()       Danjon-enlarged shadow radii
//!   └─ classify_solar()       disk overlap + lunar parallax
//! ```
//!
//! The ephemeris is an explicit read-only value: callers borrow it for the
//! duration of a run instead of reaching for process-wide state.

pub mod analytic;
pub mod eclipse;
pub mod error;
pub mod riseset;
pub mod source;
pub mod time;

pub(crate) mod search;

pub use analytic::AnalyticEphemeris;
pub use eclipse::{
    EclipseConfig, EclipseFinder, EclipseKind, EclipseRecord, LunarEclipseType,
    ShadowEclipseFinder, SolarEclipseType,
};
pub use error::EphemerisError;
pub use riseset::{Observer, RiseSet, moon_rise_set};
pub use source::{EphemerisSource, LunarGeometry, illumination_from_phase};

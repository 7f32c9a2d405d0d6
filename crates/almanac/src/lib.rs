//! # selene-almanac
//!
//! Turns an [`EphemerisSource`](selene_ephemeris::EphemerisSource) into a
//! daily lunar almanac and derives the events an observer cares about.
//!
//! # Pipeline
//!
//! ```text
//!  ┌───────────────────┐     ┌──────────────┐     ┌──────────────────┐
//!  │ build_daily_series│────▶│   classify   │────▶│       join       │
//!  │ (one call per day)│     │ (dark/full/  │     │ (user events,    │
//!  │                   │     │  super/blue) │     │  eclipses)       │
//!  └───────────────────┘     └──────────────┘     └──────────────────┘
//!            │
//!            ▼
//!     lookup / neighbours (read-only queries)
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use selene_almanac::{ClassifierConfig, SeriesConfig, build_daily_series, classify, join};
//! use selene_calendar::DateRange;
//! use selene_ephemeris::AnalyticEphemeris;
//!
//! let eph = AnalyticEphemeris::new();
//! let range = DateRange::year(2025).unwrap();
//! let series = build_daily_series(&eph, range, &SeriesConfig::new()).unwrap();
//! let events = classify(&series, &ClassifierConfig::new()).unwrap();
//! let rows = join(&series, &[], &[], &events);
//! assert_eq!(rows.len(), 365);
//! ```
//!
//! # Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`record`] | [`DailyRecord`], [`PhaseName`] |
//! | [`series`] | [`DailySeries`], [`build_daily_series`] |
//! | [`config`] | [`SeriesConfig`], [`GapPolicy`], [`ClassifierConfig`] |
//! | [`classify`] | [`classify()`], [`LunarEvents`], [`FullMoon`] |
//! | [`join`] | [`UserEvent`], [`MergedRow`], [`join()`] |
//! | [`lookup`] | [`lookup()`], [`neighbours`] |

pub mod classify;
pub mod config;
pub mod error;
pub mod join;
pub mod lookup;
pub mod record;
pub mod series;

pub use classify::{FullMoon, LunarEvents, classify, is_dark_sky};
pub use config::{ClassifierConfig, GapPolicy, SeriesConfig};
pub use error::AlmanacError;
pub use join::{MergedRow, UserEvent, join};
pub use lookup::{Lookup, lookup, neighbours};
pub use record::{DailyRecord, PhaseName};
pub use series::{DailySeries, SkippedDay, build_daily_series};

//! Configuration for building and classifying the daily series.

use selene_ephemeris::Observer;

use crate::error::AlmanacError;

/// What to do when the ephemeris cannot resolve a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapPolicy {
    /// Fail the whole build, naming the offending date.
    #[default]
    Abort,
    /// Leave the day out and record it in [`DailySeries::skipped`](crate::DailySeries::skipped).
    /// The resulting series is no longer contiguous.
    Skip,
}

/// Configuration for [`build_daily_series`](crate::build_daily_series).
///
/// # Example
///
/// ```
/// use selene_almanac::{GapPolicy, SeriesConfig};
///
/// let config = SeriesConfig::new()
///     .with_on_error(GapPolicy::Skip)
///     .with_parallel(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SeriesConfig {
    on_error: GapPolicy,
    observer: Option<Observer>,
    parallel: bool,
}

impl SeriesConfig {
    /// Creates a configuration with defaults: abort on gaps, no observer,
    /// sequential evaluation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the gap policy.
    pub fn with_on_error(mut self, policy: GapPolicy) -> Self {
        self.on_error = policy;
        self
    }

    /// Sets the observer used for moonrise/moonset.
    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Evaluates days on the rayon thread pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn on_error(&self) -> GapPolicy {
        self.on_error
    }

    pub fn observer(&self) -> Option<&Observer> {
        self.observer.as_ref()
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Validates the observer, if any.
    pub fn validate(&self) -> Result<(), AlmanacError> {
        if let Some(observer) = &self.observer {
            observer
                .validate()
                .map_err(|e| AlmanacError::InvalidConfig {
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }
}

/// Configuration for [`classify`](crate::classify).
///
/// # Example
///
/// ```
/// use selene_almanac::ClassifierConfig;
///
/// let config = ClassifierConfig::new().with_dark_sky_threshold(0.1);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    dark_sky_threshold: f64,
    min_lunation_gap_days: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifierConfig {
    /// Creates a configuration with defaults.
    ///
    /// Defaults: `dark_sky_threshold = 0.20`, `min_lunation_gap_days = 20`.
    pub fn new() -> Self {
        Self {
            dark_sky_threshold: 0.20,
            min_lunation_gap_days: 20,
        }
    }

    /// Sets the illumination below which a night counts as dark.
    pub fn with_dark_sky_threshold(mut self, threshold: f64) -> Self {
        self.dark_sky_threshold = threshold;
        self
    }

    /// Sets the smallest plausible spacing between distinct full moons.
    pub fn with_min_lunation_gap_days(mut self, days: u32) -> Self {
        self.min_lunation_gap_days = days;
        self
    }

    /// Returns the dark-sky illumination threshold.
    pub fn dark_sky_threshold(&self) -> f64 {
        self.dark_sky_threshold
    }

    /// Returns the minimum full-moon spacing in days.
    pub fn min_lunation_gap_days(&self) -> u32 {
        self.min_lunation_gap_days
    }

    /// Validates this configuration.
    ///
    /// The threshold must be finite and within `[0, 1]`; the lunation gap
    /// must be below the 29-day synodic minimum.
    pub fn validate(&self) -> Result<(), AlmanacError> {
        let t = self.dark_sky_threshold;
        if !t.is_finite() || !(0.0..=1.0).contains(&t) {
            return Err(AlmanacError::InvalidConfig {
                reason: format!("dark_sky_threshold must be in [0, 1], got {t}"),
            });
        }
        if self.min_lunation_gap_days >= 29 {
            return Err(AlmanacError::InvalidConfig {
                reason: format!(
                    "min_lunation_gap_days must be below 29, got {}",
                    self.min_lunation_gap_days
                ),
            });
        }
        Ok(())
    }
}

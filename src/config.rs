use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Config file read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_PATH: &str = "selene.toml";

/// Top-level Selene configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeleneConfig {
    /// Dates to cover.
    #[serde(default)]
    pub range: RangeToml,

    /// Event classification settings.
    #[serde(default)]
    pub classify: ClassifyToml,

    /// Daily series evaluation settings.
    #[serde(default)]
    pub ephemeris: EphemerisToml,

    /// Eclipse search settings.
    #[serde(default)]
    pub eclipses: EclipsesToml,

    /// Observer location; rise/set times are computed only when present.
    #[serde(default)]
    pub observer: Option<ObserverToml>,

    /// I/O settings.
    #[serde(default)]
    pub io: IoToml,
}

/// Either `year`, or both `start` and `end` as `"YYYY-MM-DD"` strings.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeToml {
    pub year: Option<i32>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifyToml {
    #[serde(default = "default_dark_sky_threshold")]
    pub dark_sky_threshold: f64,
    #[serde(default = "default_min_lunation_gap_days")]
    pub min_lunation_gap_days: u32,
}

impl Default for ClassifyToml {
    fn default() -> Self {
        Self {
            dark_sky_threshold: default_dark_sky_threshold(),
            min_lunation_gap_days: default_min_lunation_gap_days(),
        }
    }
}

fn default_dark_sky_threshold() -> f64 {
    0.20
}
fn default_min_lunation_gap_days() -> u32 {
    20
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EphemerisToml {
    /// `"abort"` or `"skip"`.
    #[serde(default = "default_on_error")]
    pub on_error: String,
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for EphemerisToml {
    fn default() -> Self {
        Self {
            on_error: default_on_error(),
            parallel: true,
        }
    }
}

fn default_on_error() -> String {
    "abort".to_string()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EclipsesToml {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub include_penumbral: bool,
}

impl Default for EclipsesToml {
    fn default() -> Self {
        Self {
            enabled: true,
            include_penumbral: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObserverToml {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IoToml {
    pub events: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub csv_output: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    #[serde(default = "default_compression")]
    pub compression: String,
    #[serde(default = "default_zstd_level")]
    pub zstd_level: i32,
    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,
}

impl Default for IoToml {
    fn default() -> Self {
        Self {
            events: None,
            output: None,
            csv_output: None,
            summary: None,
            compression: default_compression(),
            zstd_level: default_zstd_level(),
            row_group_size: default_row_group_size(),
        }
    }
}

fn default_compression() -> String {
    "snappy".to_string()
}
fn default_zstd_level() -> i32 {
    3
}
fn default_row_group_size() -> usize {
    65_536
}

/// Loads `path`, or `selene.toml` if it exists, or the built-in defaults.
pub fn load(path: Option<&Path>) -> Result<SeleneConfig> {
    let path = match path {
        Some(p) => p,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Path::new(DEFAULT_CONFIG_PATH),
        None => return Ok(SeleneConfig::default()),
    };
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    toml::from_str(&toml_str).context("failed to parse TOML config")
}

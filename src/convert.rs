//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Context, Result, bail};

use selene_almanac::{ClassifierConfig, GapPolicy, SeriesConfig};
use selene_calendar::{DateRange, parse_date};
use selene_ephemeris::{EclipseConfig, Observer};
use selene_io::{Compression, WriterConfig};

use crate::config::*;

/// Parses a compression algorithm name string into the corresponding enum variant.
pub fn parse_compression(s: &str) -> Result<Compression> {
    match s.to_lowercase().as_str() {
        "none" => Ok(Compression::None),
        "snappy" => Ok(Compression::Snappy),
        "zstd" => Ok(Compression::Zstd),
        other => bail!("unknown compression: {other:?}"),
    }
}

/// Parses an `on_error` policy name.
pub fn parse_gap_policy(s: &str) -> Result<GapPolicy> {
    match s.to_lowercase().as_str() {
        "abort" => Ok(GapPolicy::Abort),
        "skip" => Ok(GapPolicy::Skip),
        other => bail!("unknown on_error policy: {other:?} (expected \"abort\" or \"skip\")"),
    }
}

/// Resolves the `[range]` section into a [`DateRange`].
///
/// Exactly one of `year` or the `start`/`end` pair must be set.
pub fn build_range(range: &RangeToml) -> Result<DateRange> {
    match (range.year, range.start.as_deref(), range.end.as_deref()) {
        (Some(year), None, None) => {
            DateRange::year(year).with_context(|| format!("invalid year {year}"))
        }
        (None, Some(start), Some(end)) => {
            let start = parse_date(start).context("invalid [range].start")?;
            let end = parse_date(end).context("invalid [range].end")?;
            Ok(DateRange::new(start, end)?)
        }
        (Some(_), _, _) => bail!("range must have either year or start/end, got both"),
        (None, None, None) => {
            bail!("no date range: set [range] in config or use --year / --start --end")
        }
        (None, _, _) => bail!("range start and end must be given together"),
    }
}

/// Builds a [`ClassifierConfig`] from the TOML classify configuration.
pub fn build_classifier_config(classify: &ClassifyToml) -> Result<ClassifierConfig> {
    let cfg = ClassifierConfig::new()
        .with_dark_sky_threshold(classify.dark_sky_threshold)
        .with_min_lunation_gap_days(classify.min_lunation_gap_days);
    cfg.validate()?;
    Ok(cfg)
}

pub fn build_observer(observer: &ObserverToml) -> Result<Observer> {
    Ok(Observer::new(observer.latitude, observer.longitude)?)
}

/// Builds a [`SeriesConfig`] from the TOML ephemeris and observer sections.
pub fn build_series_config(
    ephemeris: &EphemerisToml,
    observer: Option<&ObserverToml>,
) -> Result<SeriesConfig> {
    let mut cfg = SeriesConfig::new()
        .with_on_error(parse_gap_policy(&ephemeris.on_error)?)
        .with_parallel(ephemeris.parallel);
    if let Some(o) = observer {
        cfg = cfg.with_observer(build_observer(o)?);
    }
    cfg.validate()?;
    Ok(cfg)
}

pub fn build_eclipse_config(eclipses: &EclipsesToml) -> EclipseConfig {
    EclipseConfig::default().with_include_penumbral(eclipses.include_penumbral)
}

/// Builds a [`WriterConfig`] from the TOML I/O configuration.
pub fn build_writer_config(io: &IoToml) -> Result<WriterConfig> {
    let compression = parse_compression(&io.compression)?;
    let cfg = WriterConfig::default()
        .with_compression(compression)
        .with_zstd_level(io.zstd_level)
        .with_row_group_size(io.row_group_size);
    cfg.validate()?;
    Ok(cfg)
}

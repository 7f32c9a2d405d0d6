//! Almanac command: series, classification, eclipses, events and output.

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use selene_almanac::{LunarEvents, MergedRow, build_daily_series, classify, join};
use selene_calendar::DateRange;
use selene_ephemeris::{
    AnalyticEphemeris, EclipseFinder, EclipseRecord, EphemerisSource, ShadowEclipseFinder,
};
use selene_io::{AlmanacSummary, EventTable, read_events, write_csv, write_parquet, write_summary};

use crate::cli::AlmanacArgs;
use crate::config::{ObserverToml, SeleneConfig};
use crate::convert;

/// Run the almanac pipeline.
pub fn run(args: AlmanacArgs) -> Result<()> {
    let _cmd = info_span!("almanac").entered();

    // 1. Load config and apply CLI overrides
    let mut config = crate::config::load(args.config.as_deref())?;
    apply_overrides(&mut config, &args);

    // 2. Build library configs
    let range = convert::build_range(&config.range)?;
    let classifier_cfg = convert::build_classifier_config(&config.classify)?;
    let series_cfg = convert::build_series_config(&config.ephemeris, config.observer.as_ref())?;
    let writer_cfg = convert::build_writer_config(&config.io)?;
    let eclipse_cfg = convert::build_eclipse_config(&config.eclipses);

    // 3. Daily series
    let ephemeris = AnalyticEphemeris::new();
    let series = build_daily_series(&ephemeris, range, &series_cfg)
        .context("failed to build daily series")?;
    if !series.skipped().is_empty() {
        warn!(skipped = series.skipped().len(), "some days could not be resolved");
    }

    // 4. Classify
    let lunar = classify(&series, &classifier_cfg).context("failed to classify lunar events")?;
    info!(
        dark_sky = lunar.dark_sky.len(),
        full_moons = lunar.full_moons.len(),
        supermoons = lunar.supermoons.len(),
        blue_moons = lunar.blue_moons.len(),
        "classified lunar events"
    );

    // 5. Eclipses
    let eclipses = if config.eclipses.enabled {
        let finder = ShadowEclipseFinder::new(&ephemeris).with_config(eclipse_cfg);
        find_eclipses(&finder, range, ephemeris.validity())?
    } else {
        Vec::new()
    };
    info!(eclipses = eclipses.len(), "eclipse search complete");

    // 6. Events
    let table = match &config.io.events {
        Some(path) => read_events(path)
            .with_context(|| format!("failed to read events: {}", path.display()))?,
        None => EventTable::default(),
    };

    // 7. Join
    let rows = join(&series, &table.events, &eclipses, &lunar);
    let joined: usize = rows.iter().map(|r| r.events.len()).sum();

    // 8. Outputs
    if let Some(path) = &config.io.output {
        write_parquet(path, &rows, &writer_cfg)
            .with_context(|| format!("failed to write Parquet: {}", path.display()))?;
    }
    if let Some(path) = &config.io.csv_output {
        write_csv(path, &rows).with_context(|| format!("failed to write CSV: {}", path.display()))?;
    }
    if let Some(path) = &config.io.summary {
        let summary = AlmanacSummary::new(
            &series,
            &lunar,
            &eclipses,
            classifier_cfg.dark_sky_threshold(),
        )
        .with_events(&table, joined);
        write_summary(path, &summary)
            .with_context(|| format!("failed to write summary: {}", path.display()))?;
    }

    print_report(range, &rows, &lunar, &eclipses, &table);
    Ok(())
}

fn apply_overrides(config: &mut SeleneConfig, args: &AlmanacArgs) {
    if let Some(year) = args.year {
        config.range.year = Some(year);
        config.range.start = None;
        config.range.end = None;
    }
    if let (Some(start), Some(end)) = (args.start, args.end) {
        config.range.year = None;
        config.range.start = Some(start.to_string());
        config.range.end = Some(end.to_string());
    }
    if let (Some(latitude), Some(longitude)) = (args.lat, args.lon) {
        config.observer = Some(ObserverToml {
            latitude,
            longitude,
        });
    }
    if let Some(threshold) = args.threshold {
        config.classify.dark_sky_threshold = threshold;
    }
    if args.events.is_some() {
        config.io.events.clone_from(&args.events);
    }
    if args.output.is_some() {
        config.io.output.clone_from(&args.output);
    }
    if args.csv.is_some() {
        config.io.csv_output.clone_from(&args.csv);
    }
    if args.summary.is_some() {
        config.io.summary.clone_from(&args.summary);
    }
}

/// Eclipses whose date falls inside `range`, for every year the range touches.
fn find_eclipses<F: EclipseFinder>(
    finder: &F,
    range: DateRange,
    validity: DateRange,
) -> Result<Vec<EclipseRecord>> {
    let Some(searchable) = range.intersect(&validity) else {
        return Ok(Vec::new());
    };
    let mut eclipses = Vec::new();
    for year in searchable.years() {
        let found = finder
            .eclipses_in_year(year)
            .with_context(|| format!("eclipse search failed for {year}"))?;
        eclipses.extend(found.into_iter().filter(|e| range.contains(e.date)));
    }
    Ok(eclipses)
}

fn print_report(
    range: DateRange,
    rows: &[MergedRow],
    lunar: &LunarEvents,
    eclipses: &[EclipseRecord],
    table: &EventTable,
) {
    println!(
        "Lunar almanac {} to {} ({} days)",
        range.start(),
        range.end(),
        rows.len()
    );
    println!("  dark-sky days: {}", lunar.dark_sky.len());

    println!("  full moons:");
    for full in &lunar.full_moons {
        let mut tags = Vec::new();
        if lunar.is_supermoon(full.date) {
            tags.push("supermoon");
        }
        if lunar.is_blue_moon(full.date) {
            tags.push("blue moon");
        }
        println!(
            "    {}  {:5.1}%  {:>9.0} km  {}",
            full.date,
            full.illumination * 100.0,
            full.distance_km,
            tags.join(", ")
        );
    }

    if !eclipses.is_empty() {
        println!("  eclipses:");
        for e in eclipses {
            println!(
                "    {}  {:<16} greatest {} UTC  magnitude {:.3}",
                e.date,
                e.kind.to_string(),
                e.greatest.time(),
                e.magnitude
            );
        }
    }

    let with_events: Vec<&MergedRow> = rows.iter().filter(|r| !r.events.is_empty()).collect();
    if !with_events.is_empty() {
        println!("  events:");
        for row in with_events {
            let flags = row_flags(row);
            for event in &row.events {
                println!(
                    "    {}  {}  ({:.0}% lit{})",
                    row.record.date,
                    event.title,
                    row.record.illumination * 100.0,
                    flags
                );
            }
        }
    }
    if !table.warnings.is_empty() {
        println!("  skipped {} malformed event row(s)", table.warnings.len());
    }
}

fn row_flags(row: &MergedRow) -> String {
    let mut flags = String::new();
    if row.dark_sky {
        flags.push_str(", dark sky");
    }
    if row.full_moon {
        flags.push_str(", full moon");
    }
    if let Some(e) = row.eclipse {
        flags.push_str(&format!(", {} eclipse", e.kind));
    }
    flags
}

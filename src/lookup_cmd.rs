//! Lookup command: one date, its events and the surrounding days.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use tracing::{debug, info_span};

use selene_almanac::{
    ClassifierConfig, DailyRecord, SeriesConfig, UserEvent, build_daily_series, is_dark_sky,
    lookup, neighbours,
};
use selene_calendar::DateRange;
use selene_ephemeris::{AnalyticEphemeris, EphemerisSource, Observer};
use selene_io::read_events;

use crate::cli::LookupArgs;

/// Events table read when `--events` is not given, if it exists.
const DEFAULT_EVENTS_PATH: &str = "events.csv";

pub fn run(args: LookupArgs) -> Result<()> {
    let _cmd = info_span!("lookup", date = %args.date).entered();

    let mut classifier = ClassifierConfig::new();
    if let Some(t) = args.threshold {
        classifier = classifier.with_dark_sky_threshold(t);
    }
    classifier.validate()?;
    let threshold = classifier.dark_sky_threshold();

    let ephemeris = AnalyticEphemeris::new();
    let validity = ephemeris.validity();
    if !validity.contains(args.date) {
        bail!(
            "{} is outside the supported range {} to {}",
            args.date,
            validity.start(),
            validity.end()
        );
    }

    let mut series_cfg = SeriesConfig::new();
    let with_observer = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => {
            series_cfg = series_cfg.with_observer(Observer::new(lat, lon)?);
            true
        }
        _ => false,
    };

    let window = DateRange::around(args.date, args.radius)
        .intersect(&validity)
        .context("lookup window lies outside the ephemeris")?;
    let series = build_daily_series(&ephemeris, window, &series_cfg)
        .context("failed to compute lunar data")?;

    let events = load_events(args.events.as_deref())?;

    let Some(found) = lookup(&series, events.as_deref().unwrap_or(&[]), args.date) else {
        bail!("no lunar data for {}", args.date);
    };
    let record = found.record;

    println!("Results for {}", args.date);
    println!("  Phase:        {}", record.phase_name);
    println!("  Illumination: {:.1}%", record.illumination * 100.0);
    println!("  Distance:     {:.0} km", record.distance_km);
    println!(
        "  Dark-sky day (<{:.0}% illumination)? {}",
        threshold * 100.0,
        if is_dark_sky(record, threshold) { "Yes" } else { "No" }
    );

    if with_observer {
        println!("  Rise / Set (UTC):");
        println!("    Moonrise: {}", format_instant(record.moonrise));
        println!("    Moonset:  {}", format_instant(record.moonset));
    }

    match &events {
        Some(_) if found.events.is_empty() => println!("\nNo events for this date."),
        Some(_) => {
            println!("\nEvents on this date:");
            for event in &found.events {
                print_event(event);
            }
        }
        None => println!("\n(No events table found, skipping events.)"),
    }

    if args.radius > 0 {
        println!("\nNearby dates:");
        println!(
            "  {:<10}  {:<15}  {:>12}  {:<9}  {:>13}",
            "Date", "Phase", "Illumination", "Dark sky?", "Distance (km)"
        );
        for r in neighbours(&series, args.date, args.radius) {
            print_neighbour(r, threshold);
        }
    }
    Ok(())
}

/// Events from `path`, else from `./events.csv` if present, else `None`.
fn load_events(path: Option<&Path>) -> Result<Option<Vec<UserEvent>>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None if Path::new(DEFAULT_EVENTS_PATH).exists() => PathBuf::from(DEFAULT_EVENTS_PATH),
        None => {
            debug!("no events table");
            return Ok(None);
        }
    };
    let table = read_events(&path)
        .with_context(|| format!("failed to read events: {}", path.display()))?;
    Ok(Some(table.events))
}

fn format_instant(at: Option<NaiveDateTime>) -> String {
    at.map_or_else(|| "-".to_string(), |t| t.format("%H:%M:%S").to_string())
}

fn print_event(event: &UserEvent) {
    let mut line = format!("  - {}", event.title);
    if !event.category.is_empty() {
        line.push_str(&format!(" [{}]", event.category));
    }
    if !event.notes.is_empty() {
        line.push_str(&format!(": {}", event.notes));
    }
    println!("{line}");
}

fn print_neighbour(r: &DailyRecord, threshold: f64) {
    println!(
        "  {:<10}  {:<15}  {:>11.1}%  {:<9}  {:>13.0}",
        r.date.to_string(),
        r.phase_name.to_string(),
        r.illumination * 100.0,
        if is_dark_sky(r, threshold) { "yes" } else { "no" },
        r.distance_km
    );
}

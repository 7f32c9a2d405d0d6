use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Selene daily lunar almanac.
#[derive(Parser)]
#[command(
    name = "selene",
    version,
    about = "Daily lunar almanac: phases, dark-sky nights, supermoons, blue moons and eclipses"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Build the almanac for a date range and write it out.
    Almanac(AlmanacArgs),
    /// Show the Moon for one date and its neighbours.
    Lookup(LookupArgs),
    /// Write a starter events table.
    Template(TemplateArgs),
}

/// Arguments for the `almanac` subcommand.
#[derive(clap::Args)]
pub struct AlmanacArgs {
    /// Path to TOML configuration file (defaults to ./selene.toml when present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Calendar year to cover.
    #[arg(short, long, conflicts_with_all = ["start", "end"])]
    pub year: Option<i32>,

    /// First date to cover (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date_arg, requires = "end")]
    pub start: Option<NaiveDate>,

    /// Last date to cover (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date_arg, requires = "start")]
    pub end: Option<NaiveDate>,

    /// Events table (CSV) to join onto the almanac.
    #[arg(short, long)]
    pub events: Option<PathBuf>,

    /// Parquet output path.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// CSV output path.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// JSON summary output path.
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Dark-sky illumination threshold in [0, 1].
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Observer latitude in degrees, enables moonrise/moonset.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Observer longitude in degrees (east positive).
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

/// Arguments for the `lookup` subcommand.
#[derive(clap::Args)]
pub struct LookupArgs {
    /// Date to look up (YYYY-MM-DD).
    #[arg(short, long, value_parser = parse_date_arg)]
    pub date: NaiveDate,

    /// Observer latitude in degrees, enables moonrise/moonset.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Observer longitude in degrees (east positive).
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Events table (CSV); ./events.csv is used when present.
    #[arg(short, long)]
    pub events: Option<PathBuf>,

    /// Number of neighbouring days to show on each side.
    #[arg(short, long, default_value_t = 3)]
    pub radius: u32,

    /// Dark-sky illumination threshold in [0, 1].
    #[arg(short, long)]
    pub threshold: Option<f64>,
}

/// Arguments for the `template` subcommand.
#[derive(clap::Args)]
pub struct TemplateArgs {
    /// Where to write the template.
    #[arg(short, long, default_value = "events.csv")]
    pub path: PathBuf,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    selene_calendar::parse_date(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn almanac_year_and_flags() {
        let cli = Cli::try_parse_from([
            "selene", "-vv", "almanac", "--year", "2025", "--threshold", "0.1", "--lat",
            "-33.9", "--lon", "18.4",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Almanac(args) = cli.command else {
            panic!("expected almanac");
        };
        assert_eq!(args.year, Some(2025));
        assert_eq!(args.threshold, Some(0.1));
        assert_eq!(args.lat, Some(-33.9));
    }

    #[test]
    fn year_conflicts_with_start() {
        let res = Cli::try_parse_from([
            "selene", "almanac", "--year", "2025", "--start", "2025-01-01", "--end", "2025-02-01",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn lookup_defaults() {
        let cli = Cli::try_parse_from(["selene", "lookup", "--date", "2025-03-14"]).unwrap();
        let Command::Lookup(args) = cli.command else {
            panic!("expected lookup");
        };
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        assert_eq!(args.radius, 3);
        assert!(args.lat.is_none());
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(Cli::try_parse_from(["selene", "lookup", "--date", "14/03/2025"]).is_err());
    }
}

//! Daily series construction: one ephemeris evaluation per calendar day.

use chrono::NaiveDate;
use rayon::prelude::*;
use selene_calendar::DateRange;
use selene_ephemeris::{EphemerisError, EphemerisSource, Observer, moon_rise_set};
use tracing::{debug, info, warn};

use crate::config::{GapPolicy, SeriesConfig};
use crate::error::AlmanacError;
use crate::record::DailyRecord;

/// A day left out of the series under [`GapPolicy::Skip`].
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedDay {
    pub date: NaiveDate,
    pub error: EphemerisError,
}

/// Date-ordered daily records.
///
/// Dates are strictly increasing. Unless days were skipped they are also
/// contiguous, one record per day of [`range`](Self::range).
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    range: DateRange,
    records: Vec<DailyRecord>,
    skipped: Vec<SkippedDay>,
}

impl DailySeries {
    /// Wraps pre-built records, checking that dates strictly increase.
    ///
    /// # Errors
    ///
    /// Returns [`AlmanacError::UnorderedSeries`] on a repeated or
    /// out-of-order date, and [`AlmanacError::InvalidConfig`] when empty.
    pub fn from_records(records: Vec<DailyRecord>) -> Result<Self, AlmanacError> {
        for pair in records.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(AlmanacError::UnorderedSeries {
                    previous: pair[0].date,
                    date: pair[1].date,
                });
            }
        }
        let (Some(first), Some(last)) = (records.first(), records.last()) else {
            return Err(AlmanacError::InvalidConfig {
                reason: "a series needs at least one record".to_string(),
            });
        };
        let range = DateRange::new(first.date, last.date)?;
        Ok(Self {
            range,
            records,
            skipped: Vec::new(),
        })
    }

    /// Requested date range.
    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    /// Days omitted under [`GapPolicy::Skip`], in date order.
    pub fn skipped(&self) -> &[SkippedDay] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when every day of the range has exactly one record.
    pub fn is_contiguous(&self) -> bool {
        self.records.len() == self.range.n_days()
            && self
                .records
                .windows(2)
                .all(|w| w[0].date.succ_opt() == Some(w[1].date))
    }

    /// Record for `date`, if present.
    pub fn get(&self, date: NaiveDate) -> Option<&DailyRecord> {
        self.records
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|i| &self.records[i])
    }

    /// Records whose date lies in `range`, as a contiguous slice.
    pub fn slice(&self, range: DateRange) -> &[DailyRecord] {
        let lo = self.records.partition_point(|r| r.date < range.start());
        let hi = self.records.partition_point(|r| r.date <= range.end());
        &self.records[lo..hi]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DailyRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a DailySeries {
    type Item = &'a DailyRecord;
    type IntoIter = std::slice::Iter<'a, DailyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn resolve_day<S: EphemerisSource + ?Sized>(
    source: &S,
    date: NaiveDate,
    observer: Option<&Observer>,
) -> Result<DailyRecord, EphemerisError> {
    let geometry = source.daily_geometry(date)?;
    let record = DailyRecord::from_geometry(date, &geometry);
    match observer {
        Some(obs) => Ok(record.with_rise_set(moon_rise_set(source, date, obs)?)),
        None => Ok(record),
    }
}

/// Builds the daily series for `range`, calling the ephemeris once per day
/// (plus the rise/set scan when an observer is configured).
///
/// With [`SeriesConfig::parallel`] the days are evaluated on the rayon pool;
/// results are collected back in date order.
///
/// # Errors
///
/// Under [`GapPolicy::Abort`], the first unresolved day is returned as
/// [`AlmanacError::Ephemeris`]. Under [`GapPolicy::Skip`] an error is
/// returned only if every day failed.
pub fn build_daily_series<S>(
    source: &S,
    range: DateRange,
    config: &SeriesConfig,
) -> Result<DailySeries, AlmanacError>
where
    S: EphemerisSource + Sync + ?Sized,
{
    config.validate()?;
    info!(
        start = %range.start(),
        end = %range.end(),
        days = range.n_days(),
        parallel = config.parallel(),
        "building daily series"
    );

    let observer = config.observer();
    let results: Vec<(NaiveDate, Result<DailyRecord, EphemerisError>)> = if config.parallel() {
        let dates: Vec<NaiveDate> = range.dates().collect();
        dates
            .par_iter()
            .map(|&d| (d, resolve_day(source, d, observer)))
            .collect()
    } else {
        let mut out = Vec::with_capacity(range.n_days());
        for date in range.dates() {
            let result = resolve_day(source, date, observer);
            let failed = result.is_err();
            out.push((date, result));
            if failed && config.on_error() == GapPolicy::Abort {
                break;
            }
        }
        out
    };

    let mut records = Vec::with_capacity(results.len());
    let mut skipped = Vec::new();
    for (date, result) in results {
        match result {
            Ok(record) => records.push(record),
            Err(error) => match config.on_error() {
                GapPolicy::Abort => {
                    return Err(AlmanacError::Ephemeris {
                        date,
                        source: error,
                    });
                }
                GapPolicy::Skip => {
                    warn!(%date, %error, "skipping unresolved day");
                    skipped.push(SkippedDay { date, error });
                }
            },
        }
    }

    if records.is_empty()
        && let Some(first) = skipped.first()
    {
        return Err(AlmanacError::Ephemeris {
            date: first.date,
            source: first.error.clone(),
        });
    }

    debug!(records = records.len(), skipped = skipped.len(), "daily series complete");
    Ok(DailySeries {
        range,
        records,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PhaseName;
    use chrono::NaiveDateTime;
    use selene_ephemeris::{LunarGeometry, illumination_from_phase};

    /// Phase advances 12 deg per day from 0 at 2025-01-01; fails on listed dates.
    struct Linear {
        failing: Vec<NaiveDate>,
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    impl EphemerisSource for Linear {
        fn geometry_at(&self, at: NaiveDateTime) -> Result<LunarGeometry, EphemerisError> {
            if self.failing.contains(&at.date()) {
                return Err(EphemerisError::NonFinite {
                    quantity: "distance_km",
                    at,
                });
            }
            let days = (at.date() - date(2025, 1, 1)).num_days() as f64;
            let phase = (days * 12.0).rem_euclid(360.0);
            Ok(LunarGeometry {
                phase_angle_deg: phase,
                illumination: illumination_from_phase(phase),
                distance_km: 384_400.0,
                moon_longitude_deg: phase,
                moon_latitude_deg: 0.0,
                sun_longitude_deg: 0.0,
                sun_distance_km: 1.496e8,
            })
        }

        fn validity(&self) -> DateRange {
            DateRange::year(2025).unwrap()
        }
    }

    fn january() -> DateRange {
        DateRange::new(date(2025, 1, 1), date(2025, 1, 31)).unwrap()
    }

    #[test]
    fn one_record_per_day() {
        let src = Linear { failing: vec![] };
        let series = build_daily_series(&src, january(), &SeriesConfig::new()).unwrap();
        assert_eq!(series.len(), 31);
        assert!(series.is_contiguous());
        assert_eq!(series.records()[0].phase_name, PhaseName::New);
        assert_eq!(series.records()[15].phase_name, PhaseName::Full);
    }

    #[test]
    fn abort_names_the_failing_date() {
        let src = Linear {
            failing: vec![date(2025, 1, 10)],
        };
        let err = build_daily_series(&src, january(), &SeriesConfig::new()).unwrap_err();
        assert!(matches!(err, AlmanacError::Ephemeris { date: d, .. } if d == date(2025, 1, 10)));
    }

    #[test]
    fn skip_records_gaps() {
        let src = Linear {
            failing: vec![date(2025, 1, 10), date(2025, 1, 20)],
        };
        let config = SeriesConfig::new().with_on_error(GapPolicy::Skip);
        let series = build_daily_series(&src, january(), &config).unwrap();
        assert_eq!(series.len(), 29);
        assert!(!series.is_contiguous());
        let skipped: Vec<_> = series.skipped().iter().map(|s| s.date).collect();
        assert_eq!(skipped, vec![date(2025, 1, 10), date(2025, 1, 20)]);
        assert!(series.get(date(2025, 1, 10)).is_none());
    }

    #[test]
    fn skip_with_everything_failing_is_an_error() {
        let src = Linear {
            failing: vec![date(2025, 1, 1)],
        };
        let range = DateRange::single(date(2025, 1, 1));
        let config = SeriesConfig::new().with_on_error(GapPolicy::Skip);
        assert!(build_daily_series(&src, range, &config).is_err());
    }

    #[test]
    fn parallel_matches_sequential() {
        let src = Linear {
            failing: vec![date(2025, 1, 5)],
        };
        let seq = SeriesConfig::new().with_on_error(GapPolicy::Skip);
        let par = seq.clone().with_parallel(true);
        assert_eq!(
            build_daily_series(&src, january(), &seq).unwrap(),
            build_daily_series(&src, january(), &par).unwrap()
        );
    }

    #[test]
    fn from_records_rejects_duplicates() {
        let src = Linear { failing: vec![] };
        let series = build_daily_series(&src, january(), &SeriesConfig::new()).unwrap();
        let mut records = series.records().to_vec();
        records.insert(1, records[0].clone());
        assert!(matches!(
            DailySeries::from_records(records),
            Err(AlmanacError::UnorderedSeries { .. })
        ));
        assert!(DailySeries::from_records(vec![]).is_err());
    }

    #[test]
    fn slice_and_get() {
        let src = Linear { failing: vec![] };
        let series = build_daily_series(&src, january(), &SeriesConfig::new()).unwrap();
        let window = DateRange::around(date(2025, 1, 15), 3);
        let slice = series.slice(window);
        assert_eq!(slice.len(), 7);
        assert_eq!(slice[0].date, date(2025, 1, 12));
        assert_eq!(series.get(date(2025, 1, 31)).unwrap().date, date(2025, 1, 31));
        assert!(series.get(date(2025, 2, 1)).is_none());
    }
}

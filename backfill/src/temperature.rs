use std::collections::{BTreeMap, HashSet};

use average::Mean;
use backfill_quantities::temperature::Celsius;
use chrono::{DurationRound, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone};
use chrono_tz::Tz;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::{
    api::meteostat::{Api, Location, Observation},
    core::{
        date_range::DateRange,
        time_of_day::{HALF_HOURS_PER_DAY, TimeOfDay},
    },
    prelude::*,
};

/// Decimal places the interpolated temperatures are rounded to.
const PRECISION: i32 = 2;

#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct DayTemperatures(#[serde_as(as = "[_; HALF_HOURS_PER_DAY]")] [Celsius; HALF_HOURS_PER_DAY]);

/// Half-hourly temperatures per date, derived from the hourly observations.
///
/// Always regenerated from the raw observations and never treated as a source of truth.
#[must_use]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSeries {
    days: BTreeMap<NaiveDate, DayTemperatures>,

    /// Local half-hour instants not backed by an observation of their hour,
    /// or not resolvable because of a daylight saving transition.
    missing: Vec<NaiveDateTime>,
}

impl FromIterator<(NaiveDate, [Celsius; HALF_HOURS_PER_DAY])> for TemperatureSeries {
    fn from_iter<T: IntoIterator<Item = (NaiveDate, [Celsius; HALF_HOURS_PER_DAY])>>(
        iter: T,
    ) -> Self {
        Self {
            days: iter.into_iter().map(|(date, values)| (date, DayTemperatures(values))).collect(),
            missing: Vec::new(),
        }
    }
}

impl TemperatureSeries {
    /// Fetch the observations over the range and interpolate them to half-hours.
    #[instrument(skip_all, fields(range = %range))]
    pub async fn fetch(api: &Api, location: Location, range: DateRange) -> Result<Self> {
        let observations = api.get_hourly(location, range).await?;
        Self::interpolate(&observations, range, api.timezone())
    }

    /// Sample a piecewise-linear interpolation of the observations at every half-hour of the range.
    #[instrument(skip_all, fields(range = %range, n_observations = observations.len()))]
    pub fn interpolate(
        observations: &[Observation],
        range: DateRange,
        timezone: Tz,
    ) -> Result<Self> {
        let observed_hours: HashSet<NaiveDateTime> = observations
            .iter()
            .filter_map(|observation| {
                observation.timestamp.duration_trunc(TimeDelta::hours(1)).ok()
            })
            .collect();
        let interpolator = Interpolator::new(observations.iter().filter_map(|observation| {
            let ordinate = match timezone.from_local_datetime(&observation.timestamp) {
                LocalResult::Single(timestamp) | LocalResult::Ambiguous(timestamp, _) => timestamp,
                LocalResult::None => return None,
            };
            Some((ordinate.timestamp(), observation.temperature.get()))
        }))
        .ok_or_else(|| Error::InsufficientData(format!("no temperature observations in {range}")))?;

        let mut days = BTreeMap::new();
        let mut missing = Vec::new();
        for date in range.iter() {
            let mut values = [Celsius::from(0.0); HALF_HOURS_PER_DAY];
            for (index, value) in values.iter_mut().enumerate() {
                let time = TimeOfDay::from_bucket(index)?.to_naive_time().ok_or_else(|| {
                    Error::InvalidInput(format!("bucket {index} has no start time"))
                })?;
                let local = date.and_time(time);
                let (ordinate, is_resolved) = resolve(timezone, local);
                let is_observed = local
                    .duration_trunc(TimeDelta::hours(1))
                    .is_ok_and(|hour| observed_hours.contains(&hour));
                if !is_resolved || !is_observed {
                    missing.push(local);
                }
                *value = Celsius::from(interpolator.at(ordinate)).round_to(PRECISION);
            }
            days.insert(date, DayTemperatures(values));
        }

        if !missing.is_empty() {
            warn!(n_missing = missing.len(), "some half-hours are not backed by observations");
        }
        Ok(Self { days, missing })
    }

    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<&[Celsius; HALF_HOURS_PER_DAY]> {
        self.days.get(&date).map(|day| &day.0)
    }

    /// Mean temperature of the date.
    #[must_use]
    pub fn average_on(&self, date: NaiveDate) -> Option<Celsius> {
        let mean: Mean = self.get(date)?.iter().map(|temperature| temperature.get()).collect();
        Some(Celsius::from(mean.mean()))
    }

    #[must_use]
    pub fn missing(&self) -> &[NaiveDateTime] {
        &self.missing
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        self.days.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Resolve the local time to a Unix timestamp, `false` when it is ambiguous or non-existent.
///
/// Ambiguous times resolve to the earliest instant, non-existent ones through the offset
/// in effect at the same wall-clock reading in UTC.
fn resolve(timezone: Tz, local: NaiveDateTime) -> (i64, bool) {
    match timezone.from_local_datetime(&local) {
        LocalResult::Single(timestamp) => (timestamp.timestamp(), true),
        LocalResult::Ambiguous(earliest, _) => (earliest.timestamp(), false),
        LocalResult::None => {
            let offset = timezone.offset_from_utc_datetime(&local).fix();
            ((local - offset).and_utc().timestamp(), false)
        }
    }
}

/// Piecewise-linear interpolation over points sorted by the ordinate.
///
/// Outside the points, the nearest endpoint value holds.
struct Interpolator {
    points: Vec<(i64, f64)>,
}

impl Interpolator {
    /// `None` when there are no points. Repeated ordinates keep the first point.
    fn new(points: impl IntoIterator<Item = (i64, f64)>) -> Option<Self> {
        let points = points
            .into_iter()
            .sorted_by_key(|(ordinate, _)| *ordinate)
            .dedup_by(|(lhs, _), (rhs, _)| lhs == rhs)
            .collect_vec();
        (!points.is_empty()).then_some(Self { points })
    }

    #[expect(clippy::cast_precision_loss)]
    fn at(&self, ordinate: i64) -> f64 {
        let index = self.points.partition_point(|(x, _)| *x <= ordinate);
        if index == 0 {
            return self.points[0].1;
        }
        let (left_x, left_y) = self.points[index - 1];
        let Some(&(right_x, right_y)) = self.points.get(index) else {
            return left_y;
        };
        let dydx = (right_y - left_y) / (right_x - left_x) as f64;
        left_y + dydx * (ordinate - left_x) as f64
    }
}

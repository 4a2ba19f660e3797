use std::{collections::BTreeMap, time::Instant};

use backfill_quantities::{energy::KilowattHours, temperature::Celsius};
use chrono::NaiveDate;
use itertools::Itertools;
use linfa::{Dataset, traits::Fit};
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};

use crate::{
    core::{
        calendar::{Calendar, DayType},
        date_range::DateRange,
        series::{DaySeries, HalfHourlySeries},
        time_of_day::HALF_HOURS_PER_DAY,
    },
    prelude::*,
    settings::DegreeDaySettings,
    statistics::FitSufficiency,
    temperature::TemperatureSeries,
};

/// Daily consumption regressed on heating degree days, one segment per day type.
#[must_use]
#[derive(Clone, Debug)]
pub struct DegreeDayModel {
    baseline: DateRange,
    base_temperature: Celsius,
    segments: BTreeMap<DayType, Segment>,
    is_sufficient: bool,
}

#[derive(Clone, Debug)]
struct Segment {
    /// kWh per heating degree day.
    slope: f64,

    /// kWh on a day without heating.
    intercept: f64,

    n_samples: usize,

    /// Mean share of the daily total in each half-hour.
    profile: [f64; HALF_HOURS_PER_DAY],
}

impl DegreeDayModel {
    /// Fit the model over the days of the baseline that have both readings and temperatures.
    ///
    /// An empty baseline yields a model that is never sufficient for predictions.
    #[instrument(skip_all, fields(baseline = %baseline))]
    pub fn fit(
        baseline: DateRange,
        amr: &HalfHourlySeries,
        temperatures: &TemperatureSeries,
        calendar: &impl Calendar,
        settings: &DegreeDaySettings,
    ) -> Self {
        let start_time = Instant::now();

        let mut samples: BTreeMap<DayType, Vec<(f64, &DaySeries)>> = BTreeMap::new();
        for day in amr.range(baseline) {
            let Some(temperature) = temperatures.average_on(day.date) else {
                continue;
            };
            samples
                .entry(calendar.day_type(day.date))
                .or_default()
                .push((temperature.degrees_below(settings.base_temperature), day));
        }
        if samples.is_empty() {
            warn!("no days with both readings and temperatures");
        }

        let segments: BTreeMap<DayType, Segment> = samples
            .into_iter()
            .map(|(day_type, samples)| (day_type, Segment::fit(day_type, &samples)))
            .collect();
        let is_sufficient = !segments.is_empty()
            && settings.required_day_types.iter().all(|day_type| {
                segments
                    .get(&day_type)
                    .is_some_and(|segment| segment.n_samples >= settings.min_samples)
            });
        info!(
            n_segments = segments.len(),
            n_samples = segments.values().map(|segment| segment.n_samples).sum::<usize>(),
            is_sufficient,
            elapsed = ?start_time.elapsed(),
            "fitted",
        );
        Self { baseline, base_temperature: settings.base_temperature, segments, is_sufficient }
    }

    pub const fn baseline(&self) -> DateRange {
        self.baseline
    }

    /// Slope and intercept fitted for the day type, if it had any samples.
    #[must_use]
    pub fn coefficients(&self, day_type: DayType) -> Option<(f64, f64)> {
        self.segments.get(&day_type).map(|segment| (segment.slope, segment.intercept))
    }

    #[must_use]
    pub fn n_samples(&self, day_type: DayType) -> usize {
        self.segments.get(&day_type).map_or(0, |segment| segment.n_samples)
    }

    /// Heating degrees of the temperature relative to the model's base temperature.
    #[must_use]
    pub fn heating_degrees(&self, temperature: Celsius) -> f64 {
        temperature.degrees_below(self.base_temperature)
    }

    /// Predict the date's half-hourly consumption at the given daily mean temperature.
    pub fn predict(
        &self,
        date: NaiveDate,
        temperature: Celsius,
        calendar: &impl Calendar,
    ) -> Result<DaySeries> {
        if self.segments.is_empty() {
            return Err(Error::InsufficientData(format!("baseline {} is empty", self.baseline)));
        }
        if !self.is_sufficient {
            return Err(Error::InsufficientData(format!(
                "degree-day model over {} lacks samples for a good fit",
                self.baseline
            )));
        }
        let segment = self.segment_for(calendar.day_type(date))?;
        let total = segment.intercept + segment.slope * self.heating_degrees(temperature);
        Ok(DaySeries::from_profile(date, KilowattHours::from(total.max(0.0)), &segment.profile))
    }

    /// Predict every date of the range, each of which must have temperatures.
    pub fn predict_range(
        &self,
        range: DateRange,
        temperatures: &TemperatureSeries,
        calendar: &impl Calendar,
    ) -> Result<HalfHourlySeries> {
        self.predict_dates(range.iter(), temperatures, calendar)
    }

    pub fn predict_dates(
        &self,
        dates: impl IntoIterator<Item = NaiveDate>,
        temperatures: &TemperatureSeries,
        calendar: &impl Calendar,
    ) -> Result<HalfHourlySeries> {
        dates
            .into_iter()
            .map(|date| {
                let temperature = temperatures
                    .average_on(date)
                    .ok_or_else(|| Error::insufficient_data_on(date, "temperatures"))?;
                self.predict(date, temperature, calendar)
            })
            .collect()
    }

    /// Segment of the day type, or of its closest substitute when it had no samples.
    fn segment_for(&self, day_type: DayType) -> Result<&Segment> {
        self.segments
            .get(&day_type)
            .or_else(|| {
                day_type.substitutes().iter().find_map(|substitute| self.segments.get(substitute))
            })
            .ok_or_else(|| Error::InsufficientData(format!("no segment to predict a {day_type}")))
    }
}

impl FitSufficiency for DegreeDayModel {
    fn enough_data_for_good_fit(&self) -> bool {
        self.is_sufficient
    }
}

impl Segment {
    /// Fit the samples, falling back to the mean daily total when a regression is not possible.
    fn fit(day_type: DayType, samples: &[(f64, &DaySeries)]) -> Self {
        let n_samples = samples.len();
        let totals = samples.iter().map(|(_, day)| day.total().get()).collect::<Array1<f64>>();
        let profile = mean_profile(samples.iter().map(|(_, day)| *day));
        let mean = totals.mean().unwrap_or_default();
        let constant = Self { slope: 0.0, intercept: mean, n_samples, profile };

        if n_samples < 2 || samples.iter().map(|(degrees, _)| degrees).all_equal() {
            debug!(%day_type, n_samples, mean, "constant segment");
            return constant;
        }
        let records = Array2::from_shape_fn((n_samples, 1), |(i, _)| samples[i].0);
        match LinearRegression::new().fit(&Dataset::new(records, totals)) {
            Ok(regression)
                if regression.params()[0].is_finite() && regression.intercept().is_finite() =>
            {
                let (slope, intercept) = (regression.params()[0], regression.intercept());
                debug!(%day_type, n_samples, slope, intercept, "regression has been fit");
                Self { slope, intercept, n_samples, profile }
            }
            Ok(_) => {
                warn!(%day_type, n_samples, "regression is degenerate, using the mean");
                constant
            }
            Err(error) => {
                warn!(%day_type, n_samples, "failed to fit a regression, using the mean: {error}");
                constant
            }
        }
    }
}

/// Mean intraday shape of the days with consumption, uniform when there are none.
#[expect(clippy::cast_precision_loss)]
pub fn mean_profile<'a>(
    days: impl IntoIterator<Item = &'a DaySeries>,
) -> [f64; HALF_HOURS_PER_DAY] {
    let mut sum = [0.0; HALF_HOURS_PER_DAY];
    let mut n_days = 0_usize;
    for shares in days.into_iter().filter_map(DaySeries::shares) {
        for (sum, share) in sum.iter_mut().zip(shares) {
            *sum += share;
        }
        n_days += 1;
    }
    if n_days == 0 {
        [1.0 / HALF_HOURS_PER_DAY as f64; HALF_HOURS_PER_DAY]
    } else {
        sum.map(|sum| sum / n_days as f64)
    }
}

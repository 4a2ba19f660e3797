use std::{
    fmt::{Display, Formatter},
    sync::Arc,
};

use backfill_quantities::{energy::KilowattHours, power::Kilowatts, time::Hours};
use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    core::{date_range::DateRange, series::HalfHourlySeries, time_of_day::HALF_HOURS_PER_DAY},
    prelude::*,
    settings::BaseloadSettings,
};

/// Which half-hours are candidates for the baseload.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BaseloadMode {
    /// Any half-hour of the day.
    Statistical,

    /// Half-hours of the configured night window.
    Overnight,

    /// Half-hours either side of the midnight starting the day.
    AroundMidnight,
}

impl Display for BaseloadMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Statistical => write!(f, "statistical"),
            Self::Overnight => write!(f, "overnight"),
            Self::AroundMidnight => write!(f, "around midnight"),
        }
    }
}

/// Estimates the minimum sustained power draw from the lowest half-hourly readings.
#[must_use]
pub struct BaseloadEstimator {
    amr: Arc<HalfHourlySeries>,
    mode: BaseloadMode,
    settings: BaseloadSettings,
}

impl BaseloadEstimator {
    pub const fn new(
        amr: Arc<HalfHourlySeries>,
        mode: BaseloadMode,
        settings: BaseloadSettings,
    ) -> Self {
        Self { amr, mode, settings }
    }

    #[must_use]
    pub const fn mode(&self) -> BaseloadMode {
        self.mode
    }

    /// Baseload on the date, which must have readings.
    pub fn baseload_on(&self, date: NaiveDate) -> Result<Kilowatts> {
        let day =
            self.amr.get(date).ok_or_else(|| Error::insufficient_data_on(date, "meter readings"))?;
        let candidates = match self.mode {
            BaseloadMode::Statistical => day.values().to_vec(),
            BaseloadMode::Overnight => day
                .values()
                .get(self.settings.overnight_buckets.clone())
                .ok_or_else(|| {
                    Error::InvalidInput(format!(
                        "overnight buckets {:?} are out of the day",
                        self.settings.overnight_buckets
                    ))
                })?
                .to_vec(),
            BaseloadMode::AroundMidnight => {
                let n_before = self.settings.n_before_midnight.min(HALF_HOURS_PER_DAY);
                let n_after = self.settings.n_after_midnight.min(HALF_HOURS_PER_DAY);
                let before = date
                    .pred_opt()
                    .and_then(|previous| self.amr.get(previous))
                    .map(|previous| &previous.values()[HALF_HOURS_PER_DAY - n_before..]);
                if before.is_none() {
                    debug!(%date, "no readings on the previous date, using this date only");
                }
                before.into_iter().flatten().chain(&day.values()[..n_after]).copied().collect()
            }
        };
        lowest_mean(&candidates, self.settings.n_lowest)
            .ok_or_else(|| Error::insufficient_data_on(date, "baseload candidates"))
    }

    /// Mean daily baseload over the dates of the range that have readings.
    #[expect(clippy::cast_precision_loss)]
    pub fn average_baseload(&self, range: DateRange) -> Result<Kilowatts> {
        let baseloads = self
            .amr
            .range(range)
            .map(|day| self.baseload_on(day.date))
            .collect::<Result<Vec<_>>>()?;
        if baseloads.is_empty() {
            return Err(Error::InsufficientData(format!("no meter readings in {range}")));
        }
        let n_days = baseloads.len() as f64;
        Ok(baseloads.into_iter().sum::<Kilowatts>() / n_days)
    }
}

/// Mean power of the `n` lowest half-hourly values, `None` when there are no values.
///
/// Ranks copies: the input slice stays intact.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub fn lowest_mean(values: &[KilowattHours], n: usize) -> Option<Kilowatts> {
    let lowest = values.iter().copied().k_smallest(n).collect_vec();
    if lowest.is_empty() {
        return None;
    }
    let mean = lowest.iter().copied().sum::<KilowattHours>() / lowest.len() as f64;
    Some(mean / Hours::HALF_HOUR)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{core::series::DaySeries, testing::date};

    fn estimator(
        days: impl IntoIterator<Item = DaySeries>,
        mode: BaseloadMode,
    ) -> BaseloadEstimator {
        let amr = Arc::new(days.into_iter().collect());
        BaseloadEstimator::new(amr, mode, BaseloadSettings::default())
    }

    /// Day with the half-hour readings `0.1, 0.2, …, 4.8` kWh.
    fn ramp(date: NaiveDate) -> DaySeries {
        let readings = (1..=48).map(|i| f64::from(i) / 10.0).collect_vec();
        DaySeries::try_from_readings(date, &readings).unwrap()
    }

    #[test]
    fn test_statistical_flat_day() -> Result {
        let day = DaySeries::constant(date(2024, 1, 1), KilowattHours::from(0.1));
        let estimator = estimator([day], BaseloadMode::Statistical);
        assert_abs_diff_eq!(estimator.baseload_on(date(2024, 1, 1))?.get(), 0.2, epsilon = 1e-7);
        Ok(())
    }

    #[test]
    fn test_lowest_mean_does_not_mutate_input() {
        let values = [0.7, 0.1, 0.9, 0.3, 0.5, 0.2, 0.8, 0.4, 0.6, 1.0].map(KilowattHours::from);
        let before = values;
        let baseload = lowest_mean(&values, 3).unwrap();
        assert_abs_diff_eq!(baseload.get(), 0.4, epsilon = 1e-9);
        assert_eq!(values, before);
    }

    #[test]
    fn test_absent_date() {
        let estimator = estimator([ramp(date(2024, 1, 1))], BaseloadMode::Statistical);
        assert!(matches!(estimator.baseload_on(date(2024, 1, 2)), Err(Error::InsufficientData(_))));
    }

    #[test]
    fn test_statistical_picks_lowest() -> Result {
        let estimator = estimator([ramp(date(2024, 1, 1))], BaseloadMode::Statistical);
        // Mean of 0.1…0.8 kWh is 0.45 kWh per half-hour:
        assert_abs_diff_eq!(estimator.baseload_on(date(2024, 1, 1))?.get(), 0.9, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_overnight() -> Result {
        let mut readings = (1..=48).map(|i| f64::from(i) / 10.0).collect_vec();
        readings[30] = 0.0;
        let day = DaySeries::try_from_readings(date(2024, 1, 1), &readings)?;
        let overnight = estimator([day.clone()], BaseloadMode::Overnight);

        // The zero reading at 15:00 is outside the night window:
        assert_abs_diff_eq!(overnight.baseload_on(date(2024, 1, 1))?.get(), 0.9, epsilon = 1e-9);
        let statistical = estimator(Some(day), BaseloadMode::Statistical);
        assert!(statistical.baseload_on(date(2024, 1, 1))?.get() < 0.9);
        Ok(())
    }

    #[test]
    fn test_around_midnight() -> Result {
        let previous = DaySeries::constant(date(2024, 1, 1), KilowattHours::from(0.05));
        let estimator = estimator([previous, ramp(date(2024, 1, 2))], BaseloadMode::AroundMidnight);

        // Four readings of 0.05 before midnight and 0.1…0.4 after:
        assert_abs_diff_eq!(estimator.baseload_on(date(2024, 1, 2))?.get(), 0.3, epsilon = 1e-9);

        // Without the previous date, only the first four half-hours remain:
        assert_abs_diff_eq!(estimator.baseload_on(date(2024, 1, 1))?.get(), 0.1, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_average_baseload() -> Result {
        let estimator = estimator(
            [
                DaySeries::constant(date(2024, 1, 1), KilowattHours::from(0.1)),
                DaySeries::constant(date(2024, 1, 3), KilowattHours::from(0.3)),
            ],
            BaseloadMode::Statistical,
        );
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 5))?;
        assert_abs_diff_eq!(estimator.average_baseload(range)?.get(), 0.4, epsilon = 1e-9);
        assert!(matches!(
            estimator.average_baseload(DateRange::single(date(2024, 2, 1))),
            Err(Error::InsufficientData(_))
        ));
        Ok(())
    }
}

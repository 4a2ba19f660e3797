use std::collections::BTreeMap;

use backfill_quantities::energy::KilowattHours;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::{
    core::{date_range::DateRange, time_of_day::HALF_HOURS_PER_DAY},
    prelude::*,
};

/// One calendar date of half-hourly consumption.
#[serde_as]
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySeries {
    pub date: NaiveDate,

    #[serde_as(as = "[_; HALF_HOURS_PER_DAY]")]
    values: [KilowattHours; HALF_HOURS_PER_DAY],
}

impl DaySeries {
    pub const fn new(date: NaiveDate, values: [KilowattHours; HALF_HOURS_PER_DAY]) -> Self {
        Self { date, values }
    }

    /// Build from raw kWh readings, which must be exactly one per half-hour.
    pub fn try_from_readings(date: NaiveDate, readings: &[f64]) -> Result<Self> {
        let values = readings
            .iter()
            .copied()
            .map(KilowattHours::from)
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|values: Vec<_>| {
                Error::InvalidInput(format!(
                    "{date} has {} half-hourly readings instead of {HALF_HOURS_PER_DAY}",
                    values.len()
                ))
            })?;
        Ok(Self { date, values })
    }

    pub fn constant(date: NaiveDate, value: KilowattHours) -> Self {
        Self { date, values: [value; HALF_HOURS_PER_DAY] }
    }

    /// Spread the daily total over the day proportionally to the shares, which should sum to 1.
    pub fn from_profile(
        date: NaiveDate,
        total: KilowattHours,
        shares: &[f64; HALF_HOURS_PER_DAY],
    ) -> Self {
        Self { date, values: shares.map(|share| total * share) }
    }

    #[must_use]
    pub const fn values(&self) -> &[KilowattHours; HALF_HOURS_PER_DAY] {
        &self.values
    }

    pub fn total(&self) -> KilowattHours {
        self.values.iter().copied().sum()
    }

    /// Share of the daily total in each half-hour, `None` when the day has no consumption.
    #[must_use]
    pub fn shares(&self) -> Option<[f64; HALF_HOURS_PER_DAY]> {
        let total = self.total();
        (total > KilowattHours::ZERO).then(|| self.values.map(|value| value / total))
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self { date: self.date, values: self.values.map(|value| value * factor) }
    }

    /// Same readings moved onto another date.
    pub fn with_date(&self, date: NaiveDate) -> Self {
        Self { date, values: self.values }
    }
}

/// Half-hourly meter readings keyed by date.
///
/// Absent dates are gaps and are never zero-filled. Cloning copies every reading.
#[must_use]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalfHourlySeries(BTreeMap<NaiveDate, DaySeries>);

impl FromIterator<DaySeries> for HalfHourlySeries {
    fn from_iter<T: IntoIterator<Item = DaySeries>>(iter: T) -> Self {
        Self(iter.into_iter().map(|day| (day.date, day)).collect())
    }
}

impl Extend<DaySeries> for HalfHourlySeries {
    fn extend<T: IntoIterator<Item = DaySeries>>(&mut self, iter: T) {
        self.0.extend(iter.into_iter().map(|day| (day.date, day)));
    }
}

impl HalfHourlySeries {
    /// Insert or replace the readings on the day's date.
    pub fn insert(&mut self, day: DaySeries) {
        self.0.insert(day.date, day);
    }

    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<&DaySeries> {
        self.0.get(&date)
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.contains_key(&date)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.0.keys().next().copied()
    }

    #[must_use]
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.0.keys().next_back().copied()
    }

    /// Span from the first to the last available date, gaps included.
    #[must_use]
    pub fn date_range(&self) -> Option<DateRange> {
        DateRange::new(self.start_date()?, self.end_date()?).ok()
    }

    pub fn days(&self) -> impl Iterator<Item = &DaySeries> {
        self.0.values()
    }

    /// Days available within the range, in date order.
    pub fn range(&self, range: DateRange) -> impl Iterator<Item = &DaySeries> {
        self.0.range(range.start()..=range.end()).map(|(_, day)| day)
    }

    /// Independent copy of the days within the range.
    pub fn slice(&self, range: DateRange) -> Self {
        self.range(range).cloned().collect()
    }

    /// Dates of the range that have no readings.
    pub fn missing_dates(&self, range: DateRange) -> impl Iterator<Item = NaiveDate> {
        range.iter().filter(|date| !self.contains(*date))
    }

    #[must_use]
    pub fn n_days_in(&self, range: DateRange) -> usize {
        self.range(range).count()
    }

    pub fn total(&self) -> KilowattHours {
        self.days().map(DaySeries::total).sum()
    }

    pub fn total_in(&self, range: DateRange) -> KilowattHours {
        self.range(range).map(DaySeries::total).sum()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use itertools::Itertools;

    use super::*;
    use crate::testing::date;

    #[test]
    fn test_try_from_readings_rejects_wrong_length() {
        assert!(DaySeries::try_from_readings(date(2024, 1, 1), &[0.1; 47]).is_err());
        assert!(DaySeries::try_from_readings(date(2024, 1, 1), &[0.1; 49]).is_err());
        assert!(DaySeries::try_from_readings(date(2024, 1, 1), &[0.1; 48]).is_ok());
    }

    #[test]
    fn test_total_and_shares() {
        let day = DaySeries::constant(date(2024, 1, 1), KilowattHours::from(0.5));
        assert_abs_diff_eq!(day.total().get(), 24.0);
        let shares = day.shares().unwrap();
        assert_abs_diff_eq!(shares.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert!(DaySeries::constant(date(2024, 1, 1), KilowattHours::ZERO).shares().is_none());
    }

    #[test]
    fn test_gaps_are_not_filled() -> Result {
        let series: HalfHourlySeries = [date(2024, 1, 1), date(2024, 1, 3)]
            .into_iter()
            .map(|date| DaySeries::constant(date, KilowattHours::from(1)))
            .collect();
        let range = series.date_range().unwrap();
        assert_eq!(range.n_days(), 3);
        assert_eq!(series.len(), 2);
        assert_eq!(series.missing_dates(range).collect_vec(), [date(2024, 1, 2)]);
        Ok(())
    }

    #[test]
    fn test_slice_does_not_alias() -> Result {
        let original: HalfHourlySeries = DateRange::new(date(2024, 1, 1), date(2024, 1, 5))?
            .iter()
            .map(|date| DaySeries::constant(date, KilowattHours::from(1)))
            .collect();
        let mut slice = original.slice(DateRange::new(date(2024, 1, 2), date(2024, 1, 3))?);
        assert_eq!(slice.len(), 2);

        slice.insert(DaySeries::constant(date(2024, 1, 2), KilowattHours::from(7)));
        assert_abs_diff_eq!(original.get(date(2024, 1, 2)).unwrap().total().get(), 48.0);
        Ok(())
    }
}

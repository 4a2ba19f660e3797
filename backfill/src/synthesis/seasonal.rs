use chrono::{Days, NaiveDate};
use itertools::Itertools;

use crate::{
    core::{
        date_range::DateRange,
        series::{DaySeries, HalfHourlySeries},
    },
    prelude::*,
    settings::SeasonalMirrorSettings,
    statistics::FitSufficiency,
    synthesis::estimation::{EstimationResult, RuleId},
};

/// Same weekday a year earlier.
const DAYS_IN_MIRROR: u64 = 364;

/// Replaces irregular periods of demand by the same season a year earlier.
pub struct SeasonalMirror<'a> {
    amr: &'a HalfHourlySeries,
    window: DateRange,
    settings: &'a SeasonalMirrorSettings,

    /// Configured irregular periods intersecting the window.
    periods: Vec<DateRange>,
}

impl<'a> SeasonalMirror<'a> {
    pub fn new(
        amr: &'a HalfHourlySeries,
        window: DateRange,
        settings: &'a SeasonalMirrorSettings,
    ) -> Self {
        let periods = settings
            .irregular_periods
            .iter()
            .filter(|period| period.intersection(window).is_some())
            .copied()
            .collect();
        Self { amr, window, settings, periods }
    }

    /// Fraction of the affected dates having readings a year earlier.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn source_coverage(&self) -> f64 {
        let (n_affected, n_sourced) = self
            .affected_dates()
            .fold((0_usize, 0_usize), |(n_affected, n_sourced), date| {
                (n_affected + 1, n_sourced + usize::from(self.source_of(date).is_some()))
            });
        if n_affected == 0 { 0.0 } else { n_sourced as f64 / n_affected as f64 }
    }

    /// Dates of the window without readings that mirroring cannot fill: those outside every
    /// irregular period, or inside one but with no readings a year earlier.
    #[must_use]
    pub fn n_unfilled_gaps(&self) -> usize {
        self.amr
            .missing_dates(self.window)
            .filter(|date| {
                !self.periods.iter().any(|period| period.contains(*date))
                    || self.source_of(*date).is_none()
            })
            .count()
    }

    /// Mirror every affected date that has a source, scaled per irregular period.
    #[instrument(skip_all, fields(window = %self.window))]
    pub fn apply(&self) -> Result<EstimationResult> {
        if !self.enough_data_for_good_fit() {
            return Err(Error::InsufficientData(format!(
                "{:.0}% of the irregular dates have readings a year earlier, \
                 {} dates without readings cannot be filled",
                self.source_coverage() * 100.0,
                self.n_unfilled_gaps(),
            )));
        }
        let mut mirrored = HalfHourlySeries::default();
        let mut scales = Vec::with_capacity(self.periods.len());
        for period in &self.periods {
            let scale = self.scale_for(*period);
            for date in period.iter().filter(|date| self.window.contains(*date)) {
                if let Some(source) = self.source_of(date) {
                    mirrored.insert(source.scaled(scale).with_date(date));
                }
            }
            debug!(%period, scale, "mirrored");
            scales.push(format!("{period} (×{scale:.3})"));
        }
        let description = format!(
            "{} days within irregular periods replaced by the same weekdays a year earlier: {}",
            mirrored.len(),
            scales.iter().join(", "),
        );
        Ok(EstimationResult::merged(
            self.amr,
            self.window,
            mirrored,
            RuleId::SeasonalMirror,
            description,
        ))
    }

    /// Ratio of the mean daily consumption before the period to the same days a year earlier.
    ///
    /// `1.0` when either side has no readings.
    fn scale_for(&self, period: DateRange) -> f64 {
        let before = period
            .start()
            .checked_sub_days(Days::new(self.settings.scaling_window_days))
            .zip(period.start().pred_opt())
            .and_then(|(start, end)| DateRange::new(start, end).ok());
        let Some(before) = before else {
            return 1.0;
        };
        let earlier =
            before.shifted_back(DAYS_IN_MIRROR).and_then(|earlier| self.mean_daily(earlier));
        match (self.mean_daily(before), earlier) {
            (Some(recent), Some(earlier)) if earlier > 0.0 => recent / earlier,
            _ => 1.0,
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn mean_daily(&self, range: DateRange) -> Option<f64> {
        let n_days = self.amr.n_days_in(range);
        (n_days != 0).then(|| self.amr.total_in(range).get() / n_days as f64)
    }

    fn affected_dates(&self) -> impl Iterator<Item = NaiveDate> {
        self.periods
            .iter()
            .filter_map(|period| period.intersection(self.window))
            .flat_map(DateRange::iter)
    }

    fn source_of(&self, date: NaiveDate) -> Option<&'a DaySeries> {
        self.amr.get(date.checked_sub_days(Days::new(DAYS_IN_MIRROR))?)
    }
}

impl FitSufficiency for SeasonalMirror<'_> {
    fn enough_data_for_good_fit(&self) -> bool {
        !self.periods.is_empty()
            && self.source_coverage() >= self.settings.min_source_coverage
            && self.n_unfilled_gaps() == 0
    }
}

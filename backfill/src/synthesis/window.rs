use serde::Serialize;

use crate::{
    core::{date_range::DateRange, series::HalfHourlySeries},
    prelude::*,
};

/// Benchmark window to be filled, along with the span of the meter's real readings.
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TargetDateWindow {
    pub benchmark: DateRange,
    pub meter: DateRange,
}

impl TargetDateWindow {
    pub const fn new(benchmark: DateRange, meter: DateRange) -> Self {
        Self { benchmark, meter }
    }

    /// Window over the meter's readings, which must not be empty.
    pub fn for_meter(benchmark: DateRange, amr: &HalfHourlySeries) -> Result<Self> {
        let meter = amr
            .date_range()
            .ok_or_else(|| Error::InsufficientData("the meter has no readings".to_string()))?;
        Ok(Self { benchmark, meter })
    }

    /// Whether the first and last readings enclose the benchmark window of at least a year.
    ///
    /// Says nothing about gaps between them, see [`Self::is_full_year`].
    #[must_use]
    pub fn spans_full_year(&self, min_days_in_year: usize) -> bool {
        self.benchmark.n_days() >= min_days_in_year
            && self.meter.start() <= self.benchmark.start()
            && self.benchmark.end() <= self.meter.end()
    }

    /// Whether the readings cover every date of the benchmark window of at least a year.
    #[must_use]
    pub fn is_full_year(&self, amr: &HalfHourlySeries, min_days_in_year: usize) -> bool {
        self.spans_full_year(min_days_in_year)
            && amr.n_days_in(self.benchmark) == self.benchmark.n_days()
    }

    /// Period to fit models over: from the later of both starts to the end of the readings.
    ///
    /// `None` when the readings end before the benchmark starts.
    pub fn baseline(&self) -> Option<DateRange> {
        DateRange::new(self.benchmark.start().max(self.meter.start()), self.meter.end()).ok()
    }
}

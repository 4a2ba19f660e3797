use std::{fs, num::NonZeroUsize, ops::Range, path::Path};

use backfill_quantities::temperature::Celsius;
use chrono::NaiveDate;
use enumset::EnumSet;
use serde::{Deserialize, Serialize};

use crate::{
    core::{calendar::DayType, date_range::DateRange},
    prelude::*,
};

/// Tunable thresholds and windows of the synthesis, normally read from a TOML file.
///
/// Every field has a default, so an empty file is a valid configuration.
#[must_use]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub degree_days: DegreeDaySettings,
    pub baseload: BaseloadSettings,
    pub seasonal_mirror: SeasonalMirrorSettings,
    pub synthesis: SynthesisSettings,

    /// Bound the memoized model fits of a session, evicting the oldest first.
    ///
    /// Meant for batch tooling analysing many meters in one process; unbounded when unset.
    pub model_cache_capacity: Option<NonZeroUsize>,
}

impl Settings {
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read_from(path: &Path) -> Result<Self> {
        let settings = toml::from_str(&fs::read_to_string(path)?)?;
        info!("loaded");
        Ok(settings)
    }
}

#[must_use]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DegreeDaySettings {
    /// Temperature below which the school is assumed to heat.
    pub base_temperature: Celsius,

    /// Samples each required day type needs for the fit to be trusted.
    pub min_samples: usize,

    pub required_day_types: EnumSet<DayType>,
}

impl Default for DegreeDaySettings {
    fn default() -> Self {
        Self {
            base_temperature: Celsius::from(15.5),
            min_samples: 10,
            required_day_types: DayType::occupied(),
        }
    }
}

#[must_use]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseloadSettings {
    /// Number of the lowest half-hours averaged into the baseload.
    pub n_lowest: usize,

    /// Half-hour buckets of the night, `0..10` being 00:00–05:00.
    pub overnight_buckets: Range<usize>,

    /// Half-hours taken from the end of the previous date.
    pub n_before_midnight: usize,

    /// Half-hours taken from the start of the requested date.
    pub n_after_midnight: usize,
}

impl Default for BaseloadSettings {
    fn default() -> Self {
        Self { n_lowest: 8, overnight_buckets: 0..10, n_before_midnight: 4, n_after_midnight: 4 }
    }
}

#[must_use]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalMirrorSettings {
    /// Periods of atypical demand to be replaced by the same season a year earlier.
    pub irregular_periods: Vec<DateRange>,

    /// Fraction of the affected dates that must have a source a year earlier.
    pub min_source_coverage: f64,

    /// Days before an irregular period used to scale the mirrored consumption.
    pub scaling_window_days: u64,
}

impl Default for SeasonalMirrorSettings {
    fn default() -> Self {
        // England's lockdowns of spring 2020 and early 2021:
        let irregular_periods = [((2020, 3, 23), (2020, 6, 30)), ((2021, 1, 4), (2021, 3, 7))]
            .into_iter()
            .filter_map(|((start_year, start_month, start_day), (end_year, end_month, end_day))| {
                DateRange::new(
                    NaiveDate::from_ymd_opt(start_year, start_month, start_day)?,
                    NaiveDate::from_ymd_opt(end_year, end_month, end_day)?,
                )
                .ok()
            })
            .collect();
        Self { irregular_periods, min_source_coverage: 0.9, scaling_window_days: 28 }
    }
}

#[must_use]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisSettings {
    /// Fraction of real days in the benchmark window that allows passing the readings through.
    pub sufficient_real_data_fraction: f64,

    /// Longest span of missing days that may be synthesized.
    pub max_synthesized_days: usize,

    /// Shortest benchmark window that counts as a full year.
    pub min_days_in_year: usize,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            sufficient_real_data_fraction: 1.0,
            max_synthesized_days: 365,
            min_days_in_year: 365,
        }
    }
}

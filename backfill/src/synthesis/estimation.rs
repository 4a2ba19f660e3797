use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::core::{date_range::DateRange, series::HalfHourlySeries};

/// Branch of the cascade that produced a series.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    ModelFitExtension,
    SeasonalMirror,
    SufficientRealData,
    MissingGasEstimation,
}

impl RuleId {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ModelFitExtension => "model-fit-extension",
            Self::SeasonalMirror => "seasonal-mirror",
            Self::SufficientRealData => "sufficient-real-data",
            Self::MissingGasEstimation => "missing-gas-estimation",
        }
    }
}

impl Display for RuleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy that synthesized the missing gas days.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Methodology {
    /// Predictions of the fitted degree-day regression.
    Model,

    /// Heating degree day proportionality, no regression involved.
    DegreeDays,
}

impl Methodology {
    /// Strategies in the order they are tried.
    pub const PREFERENCE: [Self; 2] = [Self::Model, Self::DegreeDays];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::DegreeDays => "degree_days",
        }
    }
}

impl Display for Methodology {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one cascade branch, the audit trail of a synthesized series.
///
/// Read-only once built.
#[must_use]
#[derive(Clone, Debug, Serialize)]
pub struct EstimationResult {
    series: HalfHourlySeries,

    /// Fraction of the window's dates backed by real readings.
    percent_real_data: f64,

    adjustment_description: String,

    #[serde(rename = "rule_id")]
    rule: RuleId,

    #[serde(skip_serializing_if = "Option::is_none")]
    methodology: Option<Methodology>,
}

impl EstimationResult {
    /// Real readings of the window, unchanged.
    pub fn pass_through(amr: &HalfHourlySeries, window: DateRange) -> Self {
        let series = amr.slice(window);
        Self {
            percent_real_data: real_fraction(series.len(), window),
            adjustment_description: format!("{} days of real readings kept", series.len()),
            series,
            rule: RuleId::SufficientRealData,
            methodology: None,
        }
    }

    /// Real readings of the window completed with the synthesized days.
    ///
    /// Synthesized days take precedence over real readings on the same date.
    pub fn merged(
        amr: &HalfHourlySeries,
        window: DateRange,
        synthesized: HalfHourlySeries,
        rule: RuleId,
        adjustment_description: String,
    ) -> Self {
        let mut series = amr.slice(window);
        let n_real_days = window
            .iter()
            .filter(|date| amr.contains(*date) && !synthesized.contains(*date))
            .count();
        series.extend(synthesized.days().cloned());
        Self {
            series,
            percent_real_data: real_fraction(n_real_days, window),
            adjustment_description,
            rule,
            methodology: None,
        }
    }

    pub const fn with_methodology(mut self, methodology: Methodology) -> Self {
        self.methodology = Some(methodology);
        self
    }

    pub const fn series(&self) -> &HalfHourlySeries {
        &self.series
    }

    #[must_use]
    pub const fn percent_real_data(&self) -> f64 {
        self.percent_real_data
    }

    #[must_use]
    pub fn adjustment_description(&self) -> &str {
        &self.adjustment_description
    }

    #[must_use]
    pub const fn rule(&self) -> RuleId {
        self.rule
    }

    #[must_use]
    pub const fn methodology(&self) -> Option<Methodology> {
        self.methodology
    }
}

#[expect(clippy::cast_precision_loss)]
fn real_fraction(n_real_days: usize, window: DateRange) -> f64 {
    n_real_days as f64 / window.n_days() as f64
}

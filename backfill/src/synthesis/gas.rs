use std::{collections::BTreeMap, rc::Rc};

use backfill_quantities::{energy::KilowattHours, temperature::Celsius};
use chrono::NaiveDate;
use enumset::EnumSet;
use itertools::Itertools;

use crate::{
    core::{
        calendar::{Calendar, DayType},
        meter::Meter,
        series::{DaySeries, HalfHourlySeries},
        time_of_day::HALF_HOURS_PER_DAY,
    },
    prelude::*,
    statistics::{
        FitSufficiency,
        degree_days::{DegreeDayModel, mean_profile},
    },
    synthesis::{
        estimation::{EstimationResult, Methodology, RuleId},
        session::AnalysisSession,
        window::TargetDateWindow,
    },
};

/// Missing days of a gas meter's benchmark window and the consumption left to spread over them.
pub struct MissingGas<'a> {
    meter: &'a Meter,
    window: TargetDateWindow,
    missing: Vec<NaiveDate>,

    /// Annual estimate less the consumption already observed.
    remaining: KilowattHours,
}

impl MissingGas<'_> {
    fn has_temperatures(&self) -> bool {
        self.missing.iter().all(|date| self.meter.temperatures.average_on(*date).is_some())
    }
}

/// Synthesizes the missing days of a gas meter.
pub trait MissingGasEstimator: FitSufficiency {
    fn estimate(&self) -> Result<HalfHourlySeries>;
}

impl Methodology {
    /// Estimator implementing the methodology for the gap.
    pub fn estimator<'a>(
        self,
        gap: &'a MissingGas<'a>,
        session: &mut AnalysisSession,
    ) -> Box<dyn MissingGasEstimator + 'a> {
        match self {
            Self::Model => Box::new(ModelEstimator {
                gap,
                model: gap
                    .window
                    .baseline()
                    .map(|baseline| session.heating_model(gap.meter, baseline)),
            }),
            Self::DegreeDays => Box::new(DegreeDayCountEstimator {
                gap,
                base_temperature: session.settings().degree_days.base_temperature,
            }),
        }
    }
}

/// Predictions of the meter's degree-day model, scaled to the remaining consumption.
struct ModelEstimator<'a> {
    gap: &'a MissingGas<'a>,

    /// `None` when the meter has no readings to fit over.
    model: Option<Rc<DegreeDayModel>>,
}

impl FitSufficiency for ModelEstimator<'_> {
    fn enough_data_for_good_fit(&self) -> bool {
        self.model.as_ref().is_some_and(|model| model.enough_data_for_good_fit())
            && self.gap.has_temperatures()
    }
}

impl MissingGasEstimator for ModelEstimator<'_> {
    fn estimate(&self) -> Result<HalfHourlySeries> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| Error::InsufficientData("no readings to fit a model over".to_string()))?;
        let meter = self.gap.meter;
        let predicted = model.predict_dates(
            self.gap.missing.iter().copied(),
            &meter.temperatures,
            &meter.calendar,
        )?;
        let predicted_total = predicted.total();
        if predicted_total <= KilowattHours::ZERO {
            return Ok(predicted);
        }
        let scale = self.gap.remaining / predicted_total;
        debug!(%predicted_total, scale, "scaling the predictions to the annual estimate");
        Ok(predicted.days().map(|day| day.scaled(scale)).collect())
    }
}

/// Spreads the remaining consumption in proportion to the heating degree days.
struct DegreeDayCountEstimator<'a> {
    gap: &'a MissingGas<'a>,
    base_temperature: Celsius,
}

impl DegreeDayCountEstimator<'_> {
    /// Mean shape of the real days of each day type within the window.
    fn profiles(&self) -> BTreeMap<DayType, [f64; HALF_HOURS_PER_DAY]> {
        let meter = self.gap.meter;
        EnumSet::<DayType>::all()
            .iter()
            .map(|day_type| {
                let days = meter
                    .amr
                    .range(self.gap.window.benchmark)
                    .filter(|day| meter.calendar.day_type(day.date) == day_type);
                (day_type, mean_profile(days))
            })
            .collect()
    }
}

impl FitSufficiency for DegreeDayCountEstimator<'_> {
    fn enough_data_for_good_fit(&self) -> bool {
        self.gap.has_temperatures()
    }
}

impl MissingGasEstimator for DegreeDayCountEstimator<'_> {
    #[expect(clippy::cast_precision_loss)]
    fn estimate(&self) -> Result<HalfHourlySeries> {
        let meter = self.gap.meter;
        let degrees: Vec<(NaiveDate, f64)> = self
            .gap
            .missing
            .iter()
            .map(|date| {
                let temperature = meter
                    .temperatures
                    .average_on(*date)
                    .ok_or_else(|| Error::insufficient_data_on(*date, "temperatures"))?;
                Ok((*date, temperature.degrees_below(self.base_temperature)))
            })
            .collect::<Result<_>>()?;
        let total_degrees: f64 = degrees.iter().map(|(_, degrees)| degrees).sum();
        if total_degrees <= 0.0 {
            debug!("no heating degree days, spreading evenly");
        }

        let profiles = self.profiles();
        let n_days = degrees.len() as f64;
        degrees
            .into_iter()
            .map(|(date, degrees)| {
                let weight =
                    if total_degrees > 0.0 { degrees / total_degrees } else { 1.0 / n_days };
                let profile = profiles
                    .get(&meter.calendar.day_type(date))
                    .ok_or_else(|| Error::insufficient_data_on(date, "consumption profile"))?;
                Ok(DaySeries::from_profile(date, self.gap.remaining * weight, profile))
            })
            .collect()
    }
}

/// Pass a full year through, otherwise fill the missing days up to the annual estimate.
#[instrument(skip_all, fields(meter = %meter.id, benchmark = %window.benchmark))]
pub fn synthesize(
    meter: &Meter,
    window: TargetDateWindow,
    session: &mut AnalysisSession,
) -> Result<EstimationResult> {
    let settings = session.settings().synthesis.clone();
    if window.is_full_year(&meter.amr, settings.min_days_in_year) {
        return Ok(EstimationResult::pass_through(&meter.amr, window.benchmark));
    }

    let annual_estimate =
        meter.annual_estimate.ok_or(Error::AnnualEstimateRequired { fuel_type: meter.fuel_type })?;
    let observed_total = meter.amr.total_in(window.benchmark);
    if annual_estimate < observed_total {
        return Err(Error::Validation { annual_estimate, observed_total });
    }
    let missing = meter.amr.missing_dates(window.benchmark).collect_vec();
    if missing.len() > settings.max_synthesized_days {
        return Err(Error::PreconditionViolation {
            n_days: missing.len(),
            max_days: settings.max_synthesized_days,
        });
    }

    let gap = MissingGas { meter, window, missing, remaining: annual_estimate - observed_total };
    for methodology in Methodology::PREFERENCE {
        let estimator = methodology.estimator(&gap, session);
        if !estimator.enough_data_for_good_fit() {
            info!(%methodology, "not enough data, falling back");
            continue;
        }
        let synthesized = estimator.estimate()?;
        let description = format!(
            "{} missing days estimated with the {methodology} methodology, \
             topping the observed {observed_total} up to the annual estimate of {annual_estimate}",
            gap.missing.len(),
        );
        return Ok(EstimationResult::merged(
            &meter.amr,
            window.benchmark,
            synthesized,
            RuleId::MissingGasEstimation,
            description,
        )
        .with_methodology(methodology));
    }
    Err(Error::InsufficientData(format!(
        "no temperatures to estimate the missing gas days within {}",
        window.benchmark
    )))
}

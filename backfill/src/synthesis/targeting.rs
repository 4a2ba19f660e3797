use serde::Serialize;

use crate::{
    core::meter::{FuelType, Meter},
    prelude::*,
    synthesis::{
        electricity,
        estimation::EstimationResult,
        gas,
        session::AnalysisSession,
        window::TargetDateWindow,
    },
};

/// Synthesized year of a meter, with the window it was synthesized for.
#[must_use]
#[derive(Clone, Debug, Serialize)]
pub struct TargetingReport {
    pub fuel_type: FuelType,
    pub window: TargetDateWindow,

    #[serde(flatten)]
    pub estimation: EstimationResult,
}

/// Produces the complete benchmark year of a meter, whatever its fuel type.
pub struct TargetingSynthesizer<'s> {
    session: &'s mut AnalysisSession,
}

impl<'s> TargetingSynthesizer<'s> {
    pub const fn new(session: &'s mut AnalysisSession) -> Self {
        Self { session }
    }

    /// Whether the caller has to supply an annual estimate before synthesizing.
    #[must_use]
    pub fn annual_estimate_required(&self, meter: &Meter, window: TargetDateWindow) -> bool {
        let min_days_in_year = self.session.settings().synthesis.min_days_in_year;
        meter.fuel_type == FuelType::Gas
            && meter.annual_estimate.is_none()
            && !window.is_full_year(&meter.amr, min_days_in_year)
    }

    #[instrument(skip_all, fields(meter = %meter.id, fuel_type = %meter.fuel_type))]
    pub fn synthesize(
        &mut self,
        meter: &Meter,
        window: TargetDateWindow,
    ) -> Result<TargetingReport> {
        let estimation = match meter.fuel_type {
            FuelType::Electricity => electricity::synthesize(meter, window, self.session)?,
            FuelType::Gas => gas::synthesize(meter, window, self.session)?,
            FuelType::StorageHeater | FuelType::SolarPv => {
                return Err(Error::UnsupportedConfiguration(format!(
                    "no synthesis strategy for {} meters",
                    meter.fuel_type
                )));
            }
        };
        info!(
            rule = %estimation.rule(),
            methodology = ?estimation.methodology(),
            percent_real_data = estimation.percent_real_data(),
            n_days = estimation.series().len(),
            "synthesized",
        );
        Ok(TargetingReport { fuel_type: meter.fuel_type, window, estimation })
    }
}

#[cfg(test)]
mod tests {
    use backfill_quantities::energy::KilowattHours;

    use super::*;
    use crate::{
        core::{date_range::DateRange, meter::MeterId},
        synthesis::estimation::{Methodology, RuleId},
        testing::{date, heating_amr, meter, seasonal_temperatures},
    };

    fn partial_year(fuel_type: FuelType) -> Result<(Meter, TargetDateWindow)> {
        let benchmark = DateRange::new(date(2023, 1, 1), date(2023, 12, 31))?;
        let temperatures = seasonal_temperatures(benchmark);
        let amr =
            heating_amr(DateRange::new(date(2023, 4, 1), date(2023, 12, 31))?, &temperatures);
        let meter = meter(fuel_type, amr, temperatures);
        let window = TargetDateWindow::for_meter(benchmark, &meter.amr)?;
        Ok((meter, window))
    }

    #[test]
    fn test_dispatches_by_fuel_type() -> Result {
        let mut session = AnalysisSession::default();
        let mut synthesizer = TargetingSynthesizer::new(&mut session);

        let (meter, window) = partial_year(FuelType::Electricity)?;
        let report = synthesizer.synthesize(&meter, window)?;
        assert_eq!(report.estimation.rule(), RuleId::ModelFitExtension);
        assert_eq!(report.window, window);

        let (meter, window) = partial_year(FuelType::Gas)?;
        let meter = Meter {
            id: MeterId(2),
            annual_estimate: Some(KilowattHours::from(90_000)),
            ..meter
        };
        let report = synthesizer.synthesize(&meter, window)?;
        assert_eq!(report.estimation.rule(), RuleId::MissingGasEstimation);
        assert_eq!(report.estimation.methodology(), Some(Methodology::Model));

        // Each meter got its own fit:
        assert_eq!(session.n_models(), 2);
        Ok(())
    }

    #[test]
    fn test_gaps_inside_a_gas_year_require_estimate() -> Result {
        let benchmark = DateRange::new(date(2023, 1, 1), date(2023, 12, 31))?;
        let temperatures = seasonal_temperatures(benchmark);
        let spring = DateRange::new(date(2023, 3, 1), date(2023, 5, 31))?;
        let amr = heating_amr(benchmark, &temperatures)
            .days()
            .filter(|day| !spring.contains(day.date))
            .cloned()
            .collect();
        let meter = meter(FuelType::Gas, amr, temperatures);
        let window = TargetDateWindow::for_meter(benchmark, &meter.amr)?;

        let mut session = AnalysisSession::default();
        let mut synthesizer = TargetingSynthesizer::new(&mut session);
        assert!(synthesizer.annual_estimate_required(&meter, window));
        assert!(matches!(
            synthesizer.synthesize(&meter, window),
            Err(Error::AnnualEstimateRequired { fuel_type: FuelType::Gas })
        ));
        Ok(())
    }

    #[test]
    fn test_unsupported_fuel_types() -> Result {
        let mut session = AnalysisSession::default();
        let mut synthesizer = TargetingSynthesizer::new(&mut session);
        for fuel_type in [FuelType::StorageHeater, FuelType::SolarPv] {
            let (meter, window) = partial_year(fuel_type)?;
            assert!(matches!(
                synthesizer.synthesize(&meter, window),
                Err(Error::UnsupportedConfiguration(_))
            ));
        }
        Ok(())
    }

    #[test]
    fn test_annual_estimate_required() -> Result {
        let mut session = AnalysisSession::default();
        let mut synthesizer = TargetingSynthesizer::new(&mut session);

        let (gas_meter, window) = partial_year(FuelType::Gas)?;
        assert!(synthesizer.annual_estimate_required(&gas_meter, window));
        assert!(matches!(
            synthesizer.synthesize(&gas_meter, window),
            Err(Error::AnnualEstimateRequired { fuel_type: FuelType::Gas })
        ));

        let with_estimate =
            Meter { annual_estimate: Some(KilowattHours::from(90_000)), ..gas_meter };
        assert!(!synthesizer.annual_estimate_required(&with_estimate, window));

        let (electricity_meter, window) = partial_year(FuelType::Electricity)?;
        assert!(!synthesizer.annual_estimate_required(&electricity_meter, window));
        Ok(())
    }

    #[test]
    fn test_report_serializes_flat() -> Result {
        let mut session = AnalysisSession::default();
        let (meter, window) = partial_year(FuelType::Electricity)?;
        let report = TargetingSynthesizer::new(&mut session).synthesize(&meter, window)?;

        let json = serde_json::to_value(&report)?;
        assert_eq!(json["fuel_type"], "electricity");
        assert_eq!(json["rule_id"], "model-fit-extension");
        assert_eq!(json["window"]["benchmark"]["start"], "2023-01-01");
        assert!(json.get("methodology").is_none());
        Ok(())
    }
}

use crate::{
    core::{meter::Meter, series::HalfHourlySeries},
    prelude::*,
    statistics::FitSufficiency,
    synthesis::{
        estimation::{EstimationResult, RuleId},
        seasonal::SeasonalMirror,
        session::AnalysisSession,
        window::TargetDateWindow,
    },
};

/// Extend a partial year with the model, mirror irregular periods, or pass real readings through.
#[instrument(skip_all, fields(meter = %meter.id, benchmark = %window.benchmark))]
pub fn synthesize(
    meter: &Meter,
    window: TargetDateWindow,
    session: &mut AnalysisSession,
) -> Result<EstimationResult> {
    let settings = session.settings().clone();
    if !window.spans_full_year(settings.synthesis.min_days_in_year) {
        return extend_with_model(meter, window, session);
    }

    let mirror = SeasonalMirror::new(&meter.amr, window.benchmark, &settings.seasonal_mirror);
    if mirror.enough_data_for_good_fit() {
        return mirror.apply();
    }

    let result = EstimationResult::pass_through(&meter.amr, window.benchmark);
    if result.percent_real_data() >= settings.synthesis.sufficient_real_data_fraction {
        return Ok(result);
    }
    Err(Error::UnsupportedConfiguration(format!(
        "only {:.1}% of the electricity readings in {} are real with no irregular period to mirror",
        result.percent_real_data() * 100.0,
        window.benchmark,
    )))
}

/// Predict the days missing from the benchmark window with a model fitted over the readings.
fn extend_with_model(
    meter: &Meter,
    window: TargetDateWindow,
    session: &mut AnalysisSession,
) -> Result<EstimationResult> {
    let baseline = window.baseline().ok_or_else(|| {
        Error::InsufficientData(format!("no readings from {} onwards", window.benchmark.start()))
    })?;
    let model = session.heating_model(meter, baseline);
    if !model.enough_data_for_good_fit() {
        return Err(Error::InsufficientData(format!(
            "readings within {baseline} are not enough to fit a model"
        )));
    }
    let synthesized: HalfHourlySeries = model.predict_dates(
        meter.amr.missing_dates(window.benchmark),
        &meter.temperatures,
        &meter.calendar,
    )?;
    let description = format!(
        "{} missing days predicted by the degree-day model fitted over {baseline}",
        synthesized.len(),
    );
    Ok(EstimationResult::merged(
        &meter.amr,
        window.benchmark,
        synthesized,
        RuleId::ModelFitExtension,
        description,
    ))
}

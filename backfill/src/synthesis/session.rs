use std::{rc::Rc, sync::Arc};

use crate::{
    core::{
        cache::Memo,
        date_range::DateRange,
        meter::{Meter, MeterId},
    },
    prelude::*,
    settings::Settings,
    statistics::{
        baseload::{BaseloadEstimator, BaseloadMode},
        degree_days::DegreeDayModel,
    },
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ModelKey {
    pub meter: MeterId,
    pub baseline: DateRange,
}

/// Expensive artifacts of one analysis, shared by the calculations done for its meters.
///
/// Dropped together with the analysis. Not meant to be shared between threads.
#[must_use]
pub struct AnalysisSession {
    settings: Settings,
    models: Memo<ModelKey, DegreeDayModel>,
    baseloads: Memo<(MeterId, BaseloadMode), BaseloadEstimator>,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl AnalysisSession {
    pub fn new(settings: Settings) -> Self {
        let models = settings.model_cache_capacity.map_or_else(Memo::default, Memo::bounded);
        Self { settings, models, baseloads: Memo::default() }
    }

    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Heating model of the meter over the baseline, fitted on the first request.
    pub fn heating_model(&mut self, meter: &Meter, baseline: DateRange) -> Rc<DegreeDayModel> {
        let key = ModelKey { meter: meter.id, baseline };
        self.models.get_or_insert_with(key, || {
            debug!(meter = %meter.id, %baseline, "fitting a new model");
            meter.heating_model(baseline, &self.settings.degree_days)
        })
    }

    /// Baseload estimator of the meter's readings in the mode.
    pub fn baseload(&mut self, meter: &Meter, mode: BaseloadMode) -> Rc<BaseloadEstimator> {
        self.baseloads.get_or_insert_with((meter.id, mode), || {
            BaseloadEstimator::new(Arc::clone(&meter.amr), mode, self.settings.baseload.clone())
        })
    }

    #[must_use]
    pub fn n_models(&self) -> usize {
        self.models.len()
    }
}

pub mod baseload;
pub mod degree_days;

/// Whether an estimator has enough samples for its predictions to be relied upon.
///
/// Consulted before predicting, so that falling back to another strategy never depends on
/// catching a prediction error.
pub trait FitSufficiency {
    fn enough_data_for_good_fit(&self) -> bool;
}

use backfill_quantities::energy::KilowattHours;
use chrono::NaiveDate;

use crate::core::meter::FuelType;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed time of day, date range, or day series.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The supplied annual estimate contradicts the history already observed.
    #[error(
        "annual estimate of {annual_estimate} is less than the {observed_total} already observed"
    )]
    Validation { annual_estimate: KilowattHours, observed_total: KilowattHours },

    /// Synthesis is requested over a longer span than supported.
    #[error("{n_days} days require synthesis, at most {max_days} are supported")]
    PreconditionViolation { n_days: usize, max_days: usize },

    /// A model or estimator cannot produce a result from the available samples.
    #[error("not enough data: {0}")]
    InsufficientData(String),

    /// The temperature source kept rate-limiting until the backoff schedule ran out.
    #[error("temperature source is unavailable after {n_attempts} attempts")]
    UpstreamUnavailable { n_attempts: usize },

    /// The temperature source answered with a non-retryable status.
    #[error("temperature source responded with `{status}`")]
    UpstreamRejected { status: http::StatusCode },

    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// Missing gas data cannot be synthesized without an annual consumption estimate.
    #[error("an annual consumption estimate is required for the {fuel_type} meter")]
    AnnualEstimateRequired { fuel_type: FuelType },

    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode JSON")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse the settings")]
    Settings(#[from] toml::de::Error),

    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn insufficient_data_on(date: NaiveDate, what: &str) -> Self {
        Self::InsufficientData(format!("no {what} on {date}"))
    }
}

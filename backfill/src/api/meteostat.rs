use std::time::Duration;

use backfill_quantities::temperature::Celsius;
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use http::{HeaderMap, HeaderValue, StatusCode};
use reqwest::{Client, Url};
use serde::{Deserialize, Deserializer, de::Unexpected};

use crate::{core::date_range::DateRange, prelude::*};

/// Longest date range the API serves in a single request.
pub const MAX_DAYS_PER_REQUEST: u64 = 10;

/// Delays after each rate-limited attempt, one attempt per step.
pub const DEFAULT_BACKOFF: [Duration; 5] = [
    Duration::from_millis(100),
    Duration::from_millis(200),
    Duration::from_millis(500),
    Duration::from_secs(1),
    Duration::from_secs(5),
];

const DEFAULT_BASE_URL: &str = "https://meteostat.p.rapidapi.com";
const RAPID_API_HOST: &str = "meteostat.p.rapidapi.com";

/// Site to fetch the temperatures for.
#[derive(Copy, Clone, Debug)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,

    /// Metres above the sea level.
    pub altitude: i32,
}

impl Location {
    pub const DEFAULT_ALTITUDE: i32 = 30;

    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude, altitude: Self::DEFAULT_ALTITUDE }
    }

    pub const fn with_altitude(mut self, altitude: i32) -> Self {
        self.altitude = altitude;
        self
    }
}

/// Hourly temperature reading in the local time of the requested timezone.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub temperature: Celsius,
}

/// [Meteostat](https://dev.meteostat.net) hourly point data.
///
/// The API enforces a daily quota which this client does not track: callers must schedule their
/// requests accordingly.
pub struct Api {
    client: Client,
    base_url: Url,
    timezone: Tz,
    backoff: Vec<Duration>,
}

impl Api {
    pub fn new(api_key: &str, timezone: Tz) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.append(
            "X-RapidAPI-Key",
            HeaderValue::from_str(api_key).map_err(|_| {
                Error::InvalidInput("API key is not a valid header value".to_string())
            })?,
        );
        headers.append("X-RapidAPI-Host", HeaderValue::from_static(RAPID_API_HOST));
        let client = Client::builder()
            .user_agent("backfill")
            .timeout(Duration::from_secs(10))
            .default_headers(headers)
            .build()?;
        let base_url = Url::parse(DEFAULT_BASE_URL)
            .map_err(|error| Error::InvalidInput(format!("invalid base URL: {error}")))?;
        Ok(Self { client, base_url, timezone, backoff: DEFAULT_BACKOFF.to_vec() })
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_backoff(mut self, backoff: Vec<Duration>) -> Self {
        self.backoff = backoff;
        self
    }

    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Fetch the hourly observations over the date range, one request per chunk of days.
    #[instrument(skip_all, fields(range = %range))]
    pub async fn get_hourly(
        &self,
        location: Location,
        range: DateRange,
    ) -> Result<Vec<Observation>> {
        let mut observations = Vec::new();
        for chunk in range.chunks(MAX_DAYS_PER_REQUEST) {
            observations.extend(self.get_chunk(location, chunk).await?);
        }
        info!(n_observations = observations.len(), "fetched");
        Ok(observations)
    }

    #[instrument(skip_all, level = Level::DEBUG, fields(chunk = %chunk))]
    async fn get_chunk(&self, location: Location, chunk: DateRange) -> Result<Vec<Observation>> {
        let url = self.build_url(location, chunk)?;
        for (attempt, delay) in self.backoff.iter().enumerate() {
            let response = self.client.get(url.clone()).send().await?;
            match response.status() {
                StatusCode::OK => {
                    let body = response.text().await?;
                    return Ok(serde_json::from_str::<Response>(&body)?
                        .data
                        .into_iter()
                        .filter_map(Record::into_observation)
                        .collect());
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    warn!(attempt = attempt + 1, ?delay, "rate limited");
                    if attempt + 1 < self.backoff.len() {
                        tokio::time::sleep(*delay).await;
                    }
                }
                status => {
                    return Err(Error::UpstreamRejected { status });
                }
            }
        }
        Err(Error::UpstreamUnavailable { n_attempts: self.backoff.len() })
    }

    fn build_url(&self, location: Location, chunk: DateRange) -> Result<Url> {
        let mut url = self
            .base_url
            .join("point/hourly")
            .map_err(|error| Error::InvalidInput(format!("invalid base URL: {error}")))?;
        url.query_pairs_mut()
            .append_pair("lat", &location.latitude.to_string())
            .append_pair("lon", &location.longitude.to_string())
            .append_pair("alt", &location.altitude.to_string())
            .append_pair("start", &chunk.start().format("%Y-%m-%d").to_string())
            .append_pair("end", &chunk.end().format("%Y-%m-%d").to_string())
            .append_pair("tz", self.timezone.name());
        Ok(url)
    }
}

#[derive(Deserialize)]
struct Response {
    data: Vec<Record>,
}

#[derive(Deserialize)]
struct Record {
    #[serde(rename = "time", deserialize_with = "deserialize_timestamp")]
    timestamp: NaiveDateTime,

    #[serde(rename = "temp")]
    temperature: Option<f64>,
}

impl Record {
    fn into_observation(self) -> Option<Observation> {
        Some(Observation { timestamp: self.timestamp, temperature: self.temperature?.into() })
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let string = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&string, "%Y-%m-%d %H:%M:%S")
        .map_err(|_| serde::de::Error::invalid_value(Unexpected::Str(&string), &"local timestamp"))
}

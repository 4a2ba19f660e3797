use backfill::{
    api::meteostat::{Api, Location},
    core::date_range::DateRange,
    temperature::TemperatureSeries,
};
use chrono_tz::Tz;
use clap::Parser;

#[derive(Parser)]
pub struct MeteostatArgs {
    #[clap(long = "meteostat-api-key", env = "METEOSTAT_API_KEY")]
    api_key: String,

    /// Timezone the readings and the temperatures are dated in.
    #[clap(long, env = "TIMEZONE", default_value = "Europe/London")]
    timezone: Tz,

    #[clap(long, env = "LATITUDE", allow_hyphen_values = true)]
    latitude: f64,

    #[clap(long, env = "LONGITUDE", allow_hyphen_values = true)]
    longitude: f64,

    /// Metres above the sea level.
    #[clap(long, env = "ALTITUDE", default_value_t = Location::DEFAULT_ALTITUDE)]
    altitude: i32,
}

impl MeteostatArgs {
    pub async fn fetch(&self, range: DateRange) -> anyhow::Result<TemperatureSeries> {
        let api = Api::new(&self.api_key, self.timezone)?;
        let location = Location::new(self.latitude, self.longitude).with_altitude(self.altitude);
        Ok(TemperatureSeries::fetch(&api, location, range).await?)
    }
}

use std::{fs, path::PathBuf};

use anyhow::Context;
use backfill::{
    core::{
        calendar::SchoolCalendar,
        meter::{FuelType, Meter, MeterId},
        series::{DaySeries, HalfHourlySeries},
    },
    temperature::TemperatureSeries,
};
use backfill_quantities::energy::KilowattHours;
use clap::Parser;
use serde::Deserialize;
use tracing::info;

#[derive(Parser)]
pub struct MeterArgs {
    /// JSON file with the meter's readings, calendar, and optional annual estimate.
    #[clap(long = "meter", env = "METER_PATH")]
    path: PathBuf,
}

impl MeterArgs {
    pub fn read(&self) -> anyhow::Result<MeterFile> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read `{}`", self.path.display()))?;
        let file: MeterFile = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse `{}`", self.path.display()))?;
        info!(
            id = %file.id,
            fuel_type = %file.fuel_type,
            n_days = file.amr.len(),
            "loaded the meter",
        );
        Ok(file)
    }
}

#[derive(Deserialize)]
pub struct MeterFile {
    pub id: MeterId,
    pub fuel_type: FuelType,

    #[serde(default)]
    pub calendar: SchoolCalendar,

    #[serde(default)]
    pub annual_estimate: Option<KilowattHours>,

    #[serde(rename = "readings", deserialize_with = "deserialize_readings")]
    pub amr: HalfHourlySeries,
}

impl MeterFile {
    pub fn into_meter(self, temperatures: TemperatureSeries) -> Meter {
        Meter::builder()
            .id(self.id)
            .fuel_type(self.fuel_type)
            .amr(self.amr)
            .temperatures(temperatures)
            .calendar(self.calendar)
            .maybe_annual_estimate(self.annual_estimate)
            .build()
    }
}

/// Readings come as a list of days rather than keyed by date.
fn deserialize_readings<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> Result<HalfHourlySeries, D::Error> {
    Ok(Vec::<DaySeries>::deserialize(deserializer)?.into_iter().collect())
}

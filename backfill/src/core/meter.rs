use std::{
    fmt::{Display, Formatter},
    sync::Arc,
};

use backfill_quantities::energy::KilowattHours;
use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        calendar::SchoolCalendar,
        date_range::DateRange,
        series::HalfHourlySeries,
    },
    settings::DegreeDaySettings,
    statistics::degree_days::DegreeDayModel,
    temperature::TemperatureSeries,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Electricity,
    Gas,
    StorageHeater,
    SolarPv,
}

impl Display for FuelType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Electricity => write!(f, "electricity"),
            Self::Gas => write!(f, "gas"),
            Self::StorageHeater => write!(f, "storage heater"),
            Self::SolarPv => write!(f, "solar PV"),
        }
    }
}

#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct MeterId(pub u64);

/// Meter with everything the synthesis needs to know about it.
#[must_use]
#[derive(Clone, Builder)]
pub struct Meter {
    pub id: MeterId,

    pub fuel_type: FuelType,

    /// Real half-hourly readings.
    #[builder(into)]
    pub amr: Arc<HalfHourlySeries>,

    /// Half-hourly outdoor temperatures at the school.
    #[builder(into)]
    pub temperatures: Arc<TemperatureSeries>,

    #[builder(default)]
    pub calendar: SchoolCalendar,

    /// Consumption the school expects over a year, supplied by a user for gas meters.
    pub annual_estimate: Option<KilowattHours>,
}

impl Meter {
    /// Fit a heating model over an arbitrary period of this meter's readings.
    pub fn heating_model(&self, period: DateRange, settings: &DegreeDaySettings) -> DegreeDayModel {
        DegreeDayModel::fit(period, &self.amr, &self.temperatures, &self.calendar, settings)
    }
}

//! Fixtures shared by the unit tests.

use std::f64::consts::TAU;

use backfill_quantities::{energy::KilowattHours, temperature::Celsius};
use chrono::{Datelike, NaiveDate};

use crate::{
    core::{
        date_range::DateRange,
        meter::{FuelType, Meter, MeterId},
        series::{DaySeries, HalfHourlySeries},
        time_of_day::HALF_HOURS_PER_DAY,
    },
    temperature::TemperatureSeries,
};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Flat daily temperatures: about 2°C in early January and 18°C in early July.
pub fn seasonal_temperatures(range: DateRange) -> TemperatureSeries {
    daily_temperatures(range, |date| {
        10.0 - 8.0 * (TAU * f64::from(date.ordinal0()) / 365.0).cos()
    })
}

pub fn constant_temperatures(range: DateRange, temperature: f64) -> TemperatureSeries {
    daily_temperatures(range, |_| temperature)
}

fn daily_temperatures(range: DateRange, on: impl Fn(NaiveDate) -> f64) -> TemperatureSeries {
    range.iter().map(|date| (date, [Celsius::from(on(date)); HALF_HOURS_PER_DAY])).collect()
}

/// Readings spreading each daily total evenly over the half-hours.
#[expect(clippy::cast_precision_loss)]
pub fn daily_amr(range: DateRange, total_on: impl Fn(NaiveDate) -> f64) -> HalfHourlySeries {
    range
        .iter()
        .map(|date| {
            let value = KilowattHours::from(total_on(date) / HALF_HOURS_PER_DAY as f64);
            DaySeries::constant(date, value)
        })
        .collect()
}

/// Readings of a heated school: 100 kWh a day plus 20 kWh per heating degree day.
pub fn heating_amr(range: DateRange, temperatures: &TemperatureSeries) -> HalfHourlySeries {
    daily_amr(range, |date| 100.0 + 20.0 * heating_degrees(temperatures, date))
}

pub fn heating_degrees(temperatures: &TemperatureSeries, date: NaiveDate) -> f64 {
    temperatures.average_on(date).unwrap().degrees_below(Celsius::from(15.5))
}

pub fn meter(fuel_type: FuelType, amr: HalfHourlySeries, temperatures: TemperatureSeries) -> Meter {
    Meter::builder().id(MeterId(1)).fuel_type(fuel_type).amr(amr).temperatures(temperatures).build()
}

use average::Mean;
use backfill::{
    core::date_range::DateRange,
    statistics::baseload::BaseloadEstimator,
    temperature::TemperatureSeries,
};
use backfill_quantities::temperature::Celsius;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use itertools::Itertools;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

pub fn build_temperatures_table(temperatures: &TemperatureSeries) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Date", "Min", "Mean", "Max", "Missing"]);
    for date in temperatures.dates() {
        let Some(values) = temperatures.get(date) else { continue };
        let Some((min, max)) = values.iter().copied().minmax().into_option() else { continue };
        let mean: Mean = values.iter().map(|value| value.get()).collect();
        let n_missing =
            temperatures.missing().iter().filter(|timestamp| timestamp.date() == date).count();
        table.add_row(vec![
            Cell::new(date.format("%a %b %d")).add_attribute(Attribute::Dim),
            Cell::new(min).set_alignment(CellAlignment::Right).fg(Color::Blue),
            Cell::new(Celsius::from(mean.mean())).set_alignment(CellAlignment::Right),
            Cell::new(max).set_alignment(CellAlignment::Right).fg(Color::Red),
            Cell::new(n_missing)
                .set_alignment(CellAlignment::Right)
                .fg(if n_missing == 0 { Color::Green } else { Color::DarkYellow }),
        ]);
    }
    table
}

pub fn build_baseload_table(estimator: &BaseloadEstimator, range: DateRange) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Date", "Baseload"]);
    for date in range.iter() {
        let cell = match estimator.baseload_on(date) {
            Ok(baseload) => Cell::new(baseload),
            Err(_) => Cell::new("no readings").add_attribute(Attribute::Dim),
        };
        table.add_row(vec![
            Cell::new(date.format("%a %b %d")).add_attribute(Attribute::Dim),
            cell.set_alignment(CellAlignment::Right),
        ]);
    }
    if let Ok(average) = estimator.average_baseload(range) {
        table.add_row(vec![
            Cell::new(format!("Mean ({})", estimator.mode())).add_attribute(Attribute::Bold),
            Cell::new(average).set_alignment(CellAlignment::Right).add_attribute(Attribute::Bold),
        ]);
    }
    table
}

use std::sync::Arc;

use backfill::{
    core::date_range::DateRange,
    statistics::baseload::{BaseloadEstimator, BaseloadMode},
};
use chrono::NaiveDate;
use clap::Parser;

use crate::{
    cli::{meter::MeterArgs, settings::SettingsArgs},
    tables::build_baseload_table,
};

#[derive(Parser)]
pub struct BaseloadArgs {
    #[clap(flatten)]
    meter: MeterArgs,

    #[clap(flatten)]
    settings: SettingsArgs,

    #[clap(long, value_enum, default_value_t = BaseloadMode::Statistical)]
    mode: BaseloadMode,

    #[clap(long)]
    since: NaiveDate,

    #[clap(long)]
    until: NaiveDate,
}

impl BaseloadArgs {
    pub fn run(self) -> anyhow::Result<()> {
        let settings = self.settings.load()?;
        let file = self.meter.read()?;
        let range = DateRange::new(self.since, self.until)?;
        let estimator = BaseloadEstimator::new(Arc::new(file.amr), self.mode, settings.baseload);
        println!("{}", build_baseload_table(&estimator, range));
        Ok(())
    }
}

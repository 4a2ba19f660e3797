use backfill::core::date_range::DateRange;
use chrono::NaiveDate;
use clap::Parser;

use crate::{cli::meteostat::MeteostatArgs, tables::build_temperatures_table};

#[derive(Parser)]
pub struct TemperaturesArgs {
    #[clap(flatten)]
    meteostat: MeteostatArgs,

    /// First date to fetch, inclusive.
    #[clap(long)]
    since: NaiveDate,

    /// Last date to fetch, inclusive.
    #[clap(long)]
    until: NaiveDate,
}

impl TemperaturesArgs {
    pub async fn run(self) -> anyhow::Result<()> {
        let range = DateRange::new(self.since, self.until)?;
        let temperatures = self.meteostat.fetch(range).await?;
        println!("{}", build_temperatures_table(&temperatures));
        Ok(())
    }
}

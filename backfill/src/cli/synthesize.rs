use backfill::{
    core::date_range::DateRange,
    synthesis::{
        session::AnalysisSession,
        targeting::TargetingSynthesizer,
        window::TargetDateWindow,
    },
};
use chrono::NaiveDate;
use clap::Parser;
use tracing::warn;

use crate::cli::{meteostat::MeteostatArgs, meter::MeterArgs, settings::SettingsArgs};

#[derive(Parser)]
pub struct SynthesizeArgs {
    #[clap(flatten)]
    meter: MeterArgs,

    #[clap(flatten)]
    meteostat: MeteostatArgs,

    #[clap(flatten)]
    settings: SettingsArgs,

    /// First date of the benchmark year.
    #[clap(long)]
    since: NaiveDate,

    /// Last date of the benchmark year.
    #[clap(long)]
    until: NaiveDate,
}

impl SynthesizeArgs {
    pub async fn run(self) -> anyhow::Result<()> {
        let settings = self.settings.load()?;
        let file = self.meter.read()?;
        let benchmark = DateRange::new(self.since, self.until)?;
        let window = TargetDateWindow::for_meter(benchmark, &file.amr)?;

        // Models are fitted over the readings past the benchmark end too:
        let temperatures = self
            .meteostat
            .fetch(DateRange::new(benchmark.start(), benchmark.end().max(window.meter.end()))?)
            .await?;
        let meter = file.into_meter(temperatures);

        let mut session = AnalysisSession::new(settings);
        let mut synthesizer = TargetingSynthesizer::new(&mut session);
        if synthesizer.annual_estimate_required(&meter, window) {
            warn!("add `annual_estimate` to the meter file to synthesize its partial gas year");
        }
        let report = synthesizer.synthesize(&meter, window)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}

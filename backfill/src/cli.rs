mod baseload;
mod meter;
mod meteostat;
mod settings;
mod synthesize;
mod temperatures;

use clap::{Parser, Subcommand};

use crate::cli::{
    baseload::BaseloadArgs,
    settings::SettingsArgs,
    synthesize::SynthesizeArgs,
    temperatures::TemperaturesArgs,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch the outdoor temperatures and print their half-hourly summary per date.
    #[clap(name = "temperatures")]
    Temperatures(Box<TemperaturesArgs>),

    /// Complete a meter's benchmark year and print the result as JSON.
    #[clap(name = "synthesize")]
    Synthesize(Box<SynthesizeArgs>),

    /// Print the daily baseload of a meter.
    #[clap(name = "baseload")]
    Baseload(Box<BaseloadArgs>),

    /// Print the effective engine settings.
    #[clap(name = "settings")]
    Settings(SettingsArgs),
}

impl Command {
    pub async fn run(self) -> anyhow::Result<()> {
        match self {
            Self::Temperatures(args) => args.run().await,
            Self::Synthesize(args) => args.run().await,
            Self::Baseload(args) => args.run(),
            Self::Settings(args) => args.run(),
        }
    }
}

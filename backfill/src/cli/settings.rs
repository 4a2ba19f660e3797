use std::path::PathBuf;

use anyhow::Context;
use backfill::settings::Settings;
use clap::Parser;

#[derive(Parser)]
pub struct SettingsArgs {
    /// TOML file overriding the default thresholds and windows.
    #[clap(long = "settings", env = "BACKFILL_SETTINGS")]
    path: Option<PathBuf>,
}

impl SettingsArgs {
    pub fn load(&self) -> anyhow::Result<Settings> {
        match &self.path {
            Some(path) => Settings::read_from(path)
                .with_context(|| format!("failed to read the settings from `{}`", path.display())),
            None => Ok(Settings::default()),
        }
    }

    pub fn run(&self) -> anyhow::Result<()> {
        println!("{}", toml::to_string_pretty(&self.load()?)?);
        Ok(())
    }
}

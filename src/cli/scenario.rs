use std::path::PathBuf;

use clap::Parser;

use crate::{
    cli::battery::{BatteryArgs, GridArgs},
    core::{
        parameters::SimulationParameters,
        progress::Progress,
        reading::IntervalReading,
        strategy::Strategy,
    },
    io,
    prelude::*,
    quantity::{cost::Cost, time::Hours},
};

/// Input data and the installation, shared by all the commands.
#[derive(Parser)]
pub struct ScenarioArgs {
    /// CSV file with `timestamp,consumption_kwh,generation_kwh` records.
    #[clap(long = "readings", env = "READINGS_PATH")]
    pub readings_path: PathBuf,

    /// TOML file with the hourly rates and the force-charge hours.
    #[clap(long = "tariff", env = "TARIFF_PATH")]
    pub tariff_path: PathBuf,

    /// Reading interval length in minutes.
    #[clap(long, default_value = "30", env = "INTERVAL_MINUTES")]
    pub interval_minutes: u32,

    /// Installed system cost, used for the payback period.
    #[clap(long, default_value = "0", env = "SYSTEM_COST")]
    pub system_cost: Cost,

    #[clap(flatten)]
    pub battery: BatteryArgs,

    #[clap(flatten)]
    pub grid: GridArgs,
}

impl ScenarioArgs {
    pub fn load(&self, strategy: Strategy) -> Result<(Vec<IntervalReading>, SimulationParameters)> {
        let readings = io::readings::read_from(&self.readings_path)?;
        let parameters = SimulationParameters::builder()
            .battery(self.battery.into())
            .grid(self.grid.into())
            .tariff(io::tariff::read_from(&self.tariff_path)?)
            .strategy(strategy)
            .interval(Hours::from_minutes(self.interval_minutes))
            .system_cost(self.system_cost)
            .build();
        Ok((readings, parameters))
    }
}

/// Progress sink for the command line.
pub fn trace_progress(progress: Progress) {
    trace!(
        n_done = progress.n_done,
        n_total = progress.n_total,
        percent = progress.fraction() * 100.0,
        "Progress",
    );
}

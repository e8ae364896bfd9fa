use std::path::PathBuf;

use clap::Parser;

use crate::{
    cli::{compare::runnable_strategies, scenario::ScenarioArgs},
    core::{
        strategy::Strategy,
        sweep::{Sweep, candidate_sizes},
    },
    io::export,
    prelude::*,
    tables::build_sweep_table,
};

#[derive(Parser)]
pub struct SweepArgs {
    /// Strategies to sweep, all of them by default.
    #[clap(long = "strategies", env = "STRATEGIES", value_enum, value_delimiter = ',')]
    pub strategies: Vec<Strategy>,

    /// Write the savings by size into this JSON file.
    #[clap(long = "json-output", env = "JSON_OUTPUT_PATH")]
    pub json_output_path: Option<PathBuf>,

    #[clap(flatten)]
    pub scenario: ScenarioArgs,
}

#[instrument(skip_all)]
pub fn sweep(args: &SweepArgs) -> Result {
    let (readings, parameters) = args.scenario.load(Strategy::SelfConsumption)?;
    let sizes = candidate_sizes(parameters.battery.capacity);
    let series = Sweep::builder()
        .readings(&readings)
        .parameters(&parameters)
        .sizes(&sizes)
        .strategies(runnable_strategies(&args.strategies, &parameters)?)
        .run()?;

    println!("{}", build_sweep_table(&series));

    if let Some(path) = &args.json_output_path {
        export::write_json_to(&series, path)?;
    }
    Ok(())
}

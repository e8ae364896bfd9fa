use std::path::PathBuf;

use clap::Parser;

use crate::{
    cli::scenario::{ScenarioArgs, trace_progress},
    core::{progress::ProgressReporter, simulation::Simulation, strategy::Strategy},
    io::export,
    prelude::*,
    tables::{build_monthly_table, build_summary_table},
};

#[derive(Parser)]
pub struct SimulateArgs {
    #[clap(long, value_enum, default_value = "self-consumption", env = "STRATEGY")]
    pub strategy: Strategy,

    /// Write the per-interval log into this CSV file.
    #[clap(long = "log-output", env = "LOG_OUTPUT_PATH")]
    pub log_output_path: Option<PathBuf>,

    /// Write the complete result into this JSON file.
    #[clap(long = "json-output", env = "JSON_OUTPUT_PATH")]
    pub json_output_path: Option<PathBuf>,

    /// Report the progress every so many intervals.
    #[clap(long, default_value = "1440", env = "PROGRESS_EVERY")]
    pub progress_every: usize,

    #[clap(flatten)]
    pub scenario: ScenarioArgs,
}

#[instrument(skip_all, fields(strategy = %args.strategy))]
pub fn simulate(args: &SimulateArgs) -> Result {
    let (readings, parameters) = args.scenario.load(args.strategy)?;
    let result = Simulation::builder()
        .readings(&readings)
        .parameters(&parameters)
        .progress(ProgressReporter::new(args.progress_every, &trace_progress))
        .run()?;

    println!("{}", build_summary_table(&result));
    println!("{}", build_monthly_table(&result));

    if let Some(path) = &args.log_output_path {
        export::write_log_to(&result.log, path)?;
    }
    if let Some(path) = &args.json_output_path {
        export::write_json_to(&result, path)?;
    }
    Ok(())
}

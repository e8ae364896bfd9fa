use std::path::PathBuf;

use clap::Parser;
use enumset::EnumSet;

use crate::{
    cli::scenario::ScenarioArgs,
    core::{comparison::Comparison, parameters::SimulationParameters, strategy::Strategy},
    io::export,
    prelude::*,
    tables::build_comparison_table,
};

#[derive(Parser)]
pub struct CompareArgs {
    /// Strategies to compare, all of them by default.
    #[clap(long = "strategies", env = "STRATEGIES", value_enum, value_delimiter = ',')]
    pub strategies: Vec<Strategy>,

    /// Write the complete results into this JSON file.
    #[clap(long = "json-output", env = "JSON_OUTPUT_PATH")]
    pub json_output_path: Option<PathBuf>,

    #[clap(flatten)]
    pub scenario: ScenarioArgs,
}

/// Requested strategies which can run with the tariff.
///
/// Nothing requested means all of them, in which case the force-charging strategies
/// are skipped when the tariff has no force-charge hours. An explicitly requested one is an error.
pub fn runnable_strategies(
    strategies: &[Strategy],
    parameters: &SimulationParameters,
) -> Result<EnumSet<Strategy>> {
    if parameters.tariff.has_force_charge_hours() {
        return Ok(if strategies.is_empty() {
            EnumSet::all()
        } else {
            strategies.iter().copied().collect()
        });
    }
    if strategies.is_empty() {
        let skipped = EnumSet::<Strategy>::all()
            .iter()
            .filter(|strategy| strategy.is_force_charging())
            .collect::<EnumSet<Strategy>>();
        for strategy in skipped {
            warn!(%strategy, "Skipping: the tariff has no force-charge hours");
        }
        return Ok(EnumSet::all() - skipped);
    }
    if let Some(strategy) = strategies.iter().find(|strategy| strategy.is_force_charging()) {
        bail!("{strategy} strategy requires at least one force-charge hour in the tariff");
    }
    Ok(strategies.iter().copied().collect())
}

#[instrument(skip_all)]
pub fn compare(args: &CompareArgs) -> Result {
    let (readings, parameters) = args.scenario.load(Strategy::SelfConsumption)?;
    let results = Comparison::builder()
        .readings(&readings)
        .parameters(&parameters)
        .strategies(runnable_strategies(&args.strategies, &parameters)?)
        .run()?;

    println!("{}", build_comparison_table(&results));

    if let Some(path) = &args.json_output_path {
        export::write_json_to(&results, path)?;
    }
    Ok(())
}

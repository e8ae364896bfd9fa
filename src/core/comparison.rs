use bon::Builder;
use enumset::EnumSet;
use rayon::prelude::*;

use crate::{
    core::{
        parameters::SimulationParameters,
        reading::IntervalReading,
        simulation::{Simulation, SimulationResult},
        strategy::Strategy,
    },
    prelude::*,
};

/// Same readings and battery, run under several strategies at once.
#[derive(Builder)]
#[builder(finish_fn(vis = ""))]
pub struct Comparison<'a> {
    readings: &'a [IntervalReading],
    parameters: &'a SimulationParameters,
    strategies: EnumSet<Strategy>,
}

impl<S: comparison_builder::IsComplete> ComparisonBuilder<'_, S> {
    /// Results follow the strategy declaration order.
    pub fn run(self) -> Result<Vec<SimulationResult>> {
        self.build().run()
    }
}

impl Comparison<'_> {
    #[instrument(skip_all, name = "Comparing…", fields(n_strategies = self.strategies.len()))]
    fn run(self) -> Result<Vec<SimulationResult>> {
        ensure!(!self.strategies.is_empty(), "there are no strategies to compare");
        self.strategies
            .iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|strategy| {
                let parameters = self.parameters.clone().with_strategy(strategy);
                Simulation::builder()
                    .readings(self.readings)
                    .parameters(&parameters)
                    .run()
                    .with_context(|| format!("failed to simulate `{strategy}`"))
            })
            .collect()
    }
}

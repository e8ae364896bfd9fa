use std::collections::BTreeMap;

use bon::Builder;
use enumset::EnumSet;
use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    core::{
        parameters::SimulationParameters,
        reading::IntervalReading,
        simulation::Simulation,
        strategy::Strategy,
    },
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours},
};

/// Battery sizes which are always tried, in kWh.
pub const DEFAULT_BATTERY_SIZES: [f64; 8] = [2.5, 5.0, 7.5, 10.0, 12.5, 15.0, 17.5, 20.0];

/// Default ladder plus the chosen size, ascending and without duplicates.
#[must_use]
pub fn candidate_sizes(chosen: KilowattHours) -> Vec<KilowattHours> {
    let mut sizes: Vec<_> = DEFAULT_BATTERY_SIZES.into_iter().map(KilowattHours::from).collect();
    if !sizes.iter().any(|size| (*size - chosen).0.abs() <= KilowattHours::ONE_WATT_HOUR.0) {
        sizes.push(chosen);
    }
    sizes.sort_by(|lhs, rhs| lhs.0.total_cmp(&rhs.0));
    sizes
}

#[must_use]
#[derive(Copy, Clone, Debug, Serialize)]
pub struct SweepPoint {
    pub capacity: KilowattHours,
    pub annual_savings: Cost,
}

/// Savings by battery size for each of the strategies.
#[derive(Builder)]
#[builder(finish_fn(vis = ""))]
pub struct Sweep<'a> {
    readings: &'a [IntervalReading],

    /// Base parameters: every run rescales their battery capacity and sets its own strategy.
    parameters: &'a SimulationParameters,

    sizes: &'a [KilowattHours],
    strategies: EnumSet<Strategy>,
}

impl<S: sweep_builder::IsComplete> SweepBuilder<'_, S> {
    pub fn run(self) -> Result<BTreeMap<Strategy, Vec<SweepPoint>>> {
        self.build().run()
    }
}

impl Sweep<'_> {
    #[instrument(
        skip_all,
        name = "Sweeping…",
        fields(n_sizes = self.sizes.len(), n_strategies = self.strategies.len()),
    )]
    fn run(self) -> Result<BTreeMap<Strategy, Vec<SweepPoint>>> {
        ensure!(!self.sizes.is_empty(), "there are no battery sizes to try");
        let runs: Vec<_> = self
            .strategies
            .iter()
            .cartesian_product(self.sizes.iter().copied())
            .map(|(strategy, capacity)| {
                self.parameters.clone().with_strategy(strategy).with_battery_capacity(capacity)
            })
            .collect();

        let outcomes = runs
            .into_par_iter()
            .map(|parameters| -> Result<(Strategy, SweepPoint)> {
                let result =
                    Simulation::builder().readings(self.readings).parameters(&parameters).run()?;
                let point = SweepPoint {
                    capacity: result.battery_capacity,
                    annual_savings: result.annual.savings,
                };
                Ok((parameters.strategy, point))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut series = BTreeMap::<Strategy, Vec<SweepPoint>>::new();
        for (strategy, point) in outcomes {
            series.entry(strategy).or_default().push(point);
        }
        info!(n_runs = series.values().map(Vec::len).sum::<usize>(), "Swept");
        Ok(series)
    }
}

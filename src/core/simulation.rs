use std::collections::BTreeMap;

use bon::Builder;
use serde::Serialize;
use serde_with::{DisplayFromStr, serde_as};

use crate::{
    core::{
        dispatch::{Dispatcher, IntervalResult},
        month::{MonthKey, MonthlyAccumulator},
        parameters::SimulationParameters,
        progress::ProgressReporter,
        reading::IntervalReading,
        strategy::Strategy,
        summary::{AnnualSummary, MonthlySummary, Summary},
    },
    prelude::*,
    quantity::energy::KilowattHours,
};

/// Share of the maximum state of charge which counts as a full charge.
const FULL_CHARGE_THRESHOLD: f64 = 0.99;

/// Dispatched interval along with its reading.
#[must_use]
#[derive(Copy, Clone, Debug, Serialize)]
pub struct LogEntry {
    #[serde(flatten)]
    pub reading: IntervalReading,

    #[serde(flatten)]
    pub result: IntervalResult,
}

#[must_use]
#[serde_as]
#[derive(Clone, Debug, Serialize)]
pub struct SimulationResult {
    pub strategy: Strategy,
    pub battery_capacity: KilowattHours,
    pub annual: AnnualSummary,

    #[serde_as(as = "BTreeMap<DisplayFromStr, _>")]
    pub months: BTreeMap<MonthKey, MonthlySummary>,

    /// One entry per reading, in the input order.
    pub log: Vec<LogEntry>,
}

/// Single simulation run over a series of readings.
///
/// The readings must be sorted by timestamp.
#[derive(Builder)]
#[builder(finish_fn(vis = ""))]
pub struct Simulation<'a> {
    readings: &'a [IntervalReading],
    parameters: &'a SimulationParameters,
    progress: Option<ProgressReporter<'a>>,
}

impl<S: simulation_builder::IsComplete> SimulationBuilder<'_, S> {
    pub fn run(self) -> Result<SimulationResult> {
        self.build().run()
    }
}

impl Simulation<'_> {
    #[instrument(
        skip_all,
        name = "Simulating…",
        fields(
            strategy = %self.parameters.strategy,
            capacity = %self.parameters.battery.capacity,
        ),
    )]
    fn run(self) -> Result<SimulationResult> {
        ensure!(!self.readings.is_empty(), "there are no readings to simulate");
        self.parameters.validate()?;

        let intervals_per_day = self.parameters.intervals_per_day();
        let mut parameters = self.parameters.clone();
        let foresight = if parameters.strategy.uses_forecast() {
            let average_daily_consumption =
                average_daily_consumption(self.readings, intervals_per_day);
            debug!(?average_daily_consumption);
            parameters.average_daily_consumption = Some(average_daily_consumption);
            Some(Foresight::new(self.readings, intervals_per_day))
        } else {
            None
        };

        let dispatcher = Dispatcher::new(&parameters);
        let full_charge = dispatcher.max_residual_energy() * FULL_CHARGE_THRESHOLD;

        let mut residual_energy = dispatcher.min_residual_energy();
        let mut is_force_charge_scheduled_today = false;
        let mut daily_peak = residual_energy;
        let mut months = BTreeMap::<MonthKey, MonthlyAccumulator>::new();
        let mut log = Vec::with_capacity(self.readings.len());
        let mut previous_reading: Option<&IntervalReading> = None;

        for (index, reading) in self.readings.iter().enumerate() {
            if let Some(previous_reading) = previous_reading
                && previous_reading.date() != reading.date()
            {
                if is_force_charge_scheduled_today && daily_peak < full_charge {
                    let month_key = previous_reading.month_key();
                    debug!(date = %previous_reading.date(), ?daily_peak, "Missed a full charge");
                    months.entry(month_key).or_default().missed_full_charges += 1;
                }
                daily_peak = residual_energy;
                is_force_charge_scheduled_today = false;
            }

            let next_day_generation =
                foresight.as_ref().and_then(|foresight| foresight.next_day_generation(index));
            let result = dispatcher.dispatch(
                reading,
                residual_energy,
                is_force_charge_scheduled_today,
                next_day_generation,
            );
            residual_energy = result.residual_energy_after;
            is_force_charge_scheduled_today = result.is_force_charge_scheduled_today;
            if is_force_charge_scheduled_today {
                daily_peak = daily_peak.max(residual_energy);
            }

            months.entry(reading.month_key()).or_default().record(
                reading,
                &result,
                &parameters.tariff,
            );
            log.push(LogEntry { reading: *reading, result });

            if let Some(progress) = &self.progress {
                progress.report(index + 1, self.readings.len());
            }
            previous_reading = Some(reading);
        }

        let summary =
            Summary::new(&months, self.readings.len(), intervals_per_day, parameters.system_cost);
        info!(
            savings = %summary.annual.savings,
            self_sufficiency_percent = summary.annual.self_sufficiency_percent,
            missed_full_charges = summary.annual.missed_full_charges,
            "Simulated",
        );
        Ok(SimulationResult {
            strategy: parameters.strategy,
            battery_capacity: parameters.battery.capacity,
            annual: summary.annual,
            months: summary.months,
            log,
        })
    }
}

/// Total consumption over the number of simulated days.
#[expect(clippy::cast_precision_loss)]
fn average_daily_consumption(
    readings: &[IntervalReading],
    intervals_per_day: usize,
) -> KilowattHours {
    let total: KilowattHours = readings.iter().map(|reading| reading.consumption).sum();
    total / (readings.len() as f64 / intervals_per_day as f64)
}

/// Perfect-foresight stand-in for a generation forecast: it peeks at the actual readings.
struct Foresight {
    /// Running generation total, starting with zero.
    cumulative_generation: Vec<KilowattHours>,

    intervals_per_day: usize,
}

impl Foresight {
    fn new(readings: &[IntervalReading], intervals_per_day: usize) -> Self {
        let mut cumulative_generation = Vec::with_capacity(readings.len() + 1);
        let mut total = KilowattHours::ZERO;
        cumulative_generation.push(total);
        for reading in readings {
            total += reading.generation;
            cumulative_generation.push(total);
        }
        Self { cumulative_generation, intervals_per_day }
    }

    /// Generation over the day of readings following the one at `index`, if there is a full day.
    fn next_day_generation(&self, index: usize) -> Option<KilowattHours> {
        let start = index + 1;
        let end = start + self.intervals_per_day;
        let end_total = self.cumulative_generation.get(end)?;
        Some(*end_total - self.cumulative_generation[start])
    }
}

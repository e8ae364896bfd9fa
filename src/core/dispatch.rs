use serde::Serialize;

use crate::{
    core::{parameters::SimulationParameters, reading::IntervalReading},
    quantity::{energy::KilowattHours, power::Kilowatts, time::Hours},
};

/// Share of the average daily consumption which the next day's generation must exceed
/// to skip the force charge.
const FORECAST_SUFFICIENCY: f64 = 0.75;

/// Energy flows of a single dispatched interval.
#[must_use]
#[derive(Copy, Clone, Debug, Serialize)]
pub struct IntervalResult {
    /// Solar generation consumed directly by the household.
    pub self_consumption: KilowattHours,

    pub grid_import: KilowattHours,
    pub grid_export: KilowattHours,

    /// Energy sent into the battery, before the charging losses.
    pub to_battery: KilowattHours,

    /// Energy drawn out of the battery, before the discharging losses.
    pub from_battery: KilowattHours,

    pub residual_energy_after: KilowattHours,
    pub is_force_charge_scheduled_today: bool,
}

/// Per-interval dispatch between the solar panels, battery, household and grid.
///
/// The battery efficiency is applied once per direction: charging deposits `to_battery × η`,
/// and delivering `e` to the household drains `e / η`, where `η` is the one-way efficiency.
#[must_use]
pub struct Dispatcher<'a> {
    parameters: &'a SimulationParameters,
    efficiency: f64,
    min_residual_energy: KilowattHours,
    max_residual_energy: KilowattHours,
    max_charge: KilowattHours,
    max_discharge: KilowattHours,
    max_export: KilowattHours,
}

impl<'a> Dispatcher<'a> {
    pub fn new(parameters: &'a SimulationParameters) -> Self {
        let interval = parameters.interval;
        Self {
            parameters,
            efficiency: parameters.battery.one_way_efficiency(),
            min_residual_energy: parameters.battery.min_residual_energy(),
            max_residual_energy: parameters.battery.max_residual_energy(),
            max_charge: parameters.battery.max_charge_power * interval,
            max_discharge: parameters.battery.max_discharge_power * interval,
            max_export: parameters.grid.max_export * interval,
        }
    }

    pub const fn min_residual_energy(&self) -> KilowattHours {
        self.min_residual_energy
    }

    pub const fn max_residual_energy(&self) -> KilowattHours {
        self.max_residual_energy
    }

    /// Dispatch a single interval.
    ///
    /// `next_day_generation` is the actual generation over the following day, if the data
    /// extends that far. It is only consulted by the forecast strategy, which treats it
    /// as a perfect forecast.
    pub fn dispatch(
        &self,
        reading: &IntervalReading,
        residual_energy: KilowattHours,
        is_force_charge_scheduled_today: bool,
        next_day_generation: Option<KilowattHours>,
    ) -> IntervalResult {
        let strategy = self.parameters.strategy;
        let tariff = &self.parameters.tariff;
        let hour = reading.hour();

        let is_force_charge_hour =
            strategy.is_force_charging() && tariff.is_force_charge_hour(hour);
        let is_pre_charge_hour =
            !is_force_charge_hour && strategy.is_export_style() && tariff.is_pre_charge_hour(hour);

        let mut flow = Flow::new(residual_energy, is_force_charge_scheduled_today);

        // Solar goes to the household first:
        flow.self_consumption = reading.consumption.min(reading.generation);
        let mut demand = reading.consumption - flow.self_consumption;
        let mut excess = reading.generation - flow.self_consumption;

        // The battery covers what it can, unless it is being force-charged:
        if !is_force_charge_hour && demand.is_significant() {
            let delivered = demand.min(self.available_energy(&flow)).min(self.max_discharge);
            if delivered.is_significant() {
                self.discharge(&mut flow, delivered);
                demand -= delivered;
            }
        }

        // The grid covers the rest:
        flow.grid_import += demand.max(KilowattHours::ZERO);

        // Excess solar:
        if excess.is_significant() {
            if !is_pre_charge_hour {
                let accepted = excess
                    .min(self.headroom(&flow) / self.efficiency)
                    .min(self.max_charge);
                if accepted.is_significant() {
                    self.charge(&mut flow, accepted);
                    excess -= accepted;
                }
            }
            // Pre-charge hours keep the battery empty for the cheap window, so everything goes out:
            flow.grid_export += excess;
        }

        if is_pre_charge_hour && !strategy.holds_charge_in(reading.month()) {
            let dumped = self
                .available_energy(&flow)
                .min(self.max_discharge)
                .min(self.max_export - flow.grid_export);
            if dumped.is_significant() {
                self.discharge(&mut flow, dumped);
                flow.grid_export += dumped;
            }
        }

        if is_force_charge_hour && !self.is_forecast_sufficient(next_day_generation) {
            self.force_charge(&mut flow);
        }

        flow.grid_export = flow.grid_export.min(self.max_export);
        flow.into()
    }

    /// Charge from the grid as fast as the battery and the import capacity allow.
    fn force_charge(&self, flow: &mut Flow) {
        flow.is_force_charge_scheduled_today = true;

        let interval: Hours = self.parameters.interval;
        let household_power = flow.grid_import / interval;
        let available_grid_power =
            (self.parameters.grid.max_import - household_power).max(Kilowatts::ZERO);
        let power = self.parameters.battery.max_charge_power.min(available_grid_power);
        let accepted = (power * interval).min(self.headroom(flow) / self.efficiency);
        if accepted.is_significant() {
            self.charge(flow, accepted);
            flow.grid_import += accepted;
        }
    }

    /// Whether the next day's generation makes the force charge unnecessary.
    fn is_forecast_sufficient(&self, next_day_generation: Option<KilowattHours>) -> bool {
        if !self.parameters.strategy.uses_forecast() {
            return false;
        }
        match (next_day_generation, self.parameters.average_daily_consumption) {
            (Some(generation), Some(average_daily_consumption)) => {
                generation > average_daily_consumption * FORECAST_SUFFICIENCY
            }
            _ => false,
        }
    }

    /// Energy the battery is able to deliver, after the discharging losses.
    fn available_energy(&self, flow: &Flow) -> KilowattHours {
        (flow.residual_energy - self.min_residual_energy).max(KilowattHours::ZERO) * self.efficiency
    }

    /// Energy the battery is able to store, after the charging losses.
    fn headroom(&self, flow: &Flow) -> KilowattHours {
        (self.max_residual_energy - flow.residual_energy).max(KilowattHours::ZERO)
    }

    fn charge(&self, flow: &mut Flow, energy: KilowattHours) {
        flow.to_battery += energy;
        flow.residual_energy += energy * self.efficiency;
    }

    fn discharge(&self, flow: &mut Flow, delivered: KilowattHours) {
        let drawn = delivered / self.efficiency;
        flow.from_battery += drawn;
        flow.residual_energy -= drawn;
    }
}

/// Mutable per-interval working state.
struct Flow {
    residual_energy: KilowattHours,
    is_force_charge_scheduled_today: bool,
    self_consumption: KilowattHours,
    grid_import: KilowattHours,
    grid_export: KilowattHours,
    to_battery: KilowattHours,
    from_battery: KilowattHours,
}

impl Flow {
    const fn new(residual_energy: KilowattHours, is_force_charge_scheduled_today: bool) -> Self {
        Self {
            residual_energy,
            is_force_charge_scheduled_today,
            self_consumption: KilowattHours::ZERO,
            grid_import: KilowattHours::ZERO,
            grid_export: KilowattHours::ZERO,
            to_battery: KilowattHours::ZERO,
            from_battery: KilowattHours::ZERO,
        }
    }
}

impl From<Flow> for IntervalResult {
    fn from(flow: Flow) -> Self {
        Self {
            self_consumption: flow.self_consumption,
            grid_import: flow.grid_import,
            grid_export: flow.grid_export,
            to_battery: flow.to_battery,
            from_battery: flow.from_battery,
            residual_energy_after: flow.residual_energy,
            is_force_charge_scheduled_today: flow.is_force_charge_scheduled_today,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::core::{
        parameters::{BatteryParameters, GridLimits, tests::parameters},
        strategy::Strategy,
    };

    const EPSILON: f64 = 1e-9;

    fn reading(month: u32, hour: u32, consumption: f64, generation: f64) -> IntervalReading {
        IntervalReading::new(
            Utc.with_ymd_and_hms(2024, month, 15, hour, 0, 0).unwrap(),
            KilowattHours::from(consumption),
            KilowattHours::from(generation),
        )
    }

    /// Full battery covers the demand on its own.
    #[test]
    fn test_full_battery_covers_demand() {
        let parameters = parameters(Strategy::SelfConsumption);
        let dispatcher = Dispatcher::new(&parameters);
        let efficiency = parameters.battery.one_way_efficiency();

        let result = dispatcher.dispatch(
            &reading(6, 19, 1.0, 0.0),
            dispatcher.max_residual_energy(),
            false,
            None,
        );

        assert_abs_diff_eq!(result.grid_import.0, 0.0, epsilon = EPSILON);
        assert_abs_diff_eq!(result.grid_export.0, 0.0, epsilon = EPSILON);
        assert_abs_diff_eq!(result.from_battery.0, 1.0 / efficiency, epsilon = EPSILON);
        assert_abs_diff_eq!(
            result.residual_energy_after.0,
            10.0 - 1.0 / efficiency,
            epsilon = EPSILON,
        );
    }

    /// Force charge takes whatever the import capacity leaves after the household.
    #[test]
    fn test_force_charge_from_empty() {
        let parameters = SimulationParameters {
            battery: BatteryParameters {
                capacity: KilowattHours::from(20.0),
                usable_capacity: KilowattHours::from(20.0),
                ..parameters(Strategy::ImportMinimiser).battery
            },
            ..parameters(Strategy::ImportMinimiser)
        };
        let dispatcher = Dispatcher::new(&parameters);

        let result =
            dispatcher.dispatch(&reading(1, 3, 0.5, 0.0), KilowattHours::ZERO, false, None);

        assert_abs_diff_eq!(result.to_battery.0, 2.5, epsilon = EPSILON);
        assert_abs_diff_eq!(result.grid_import.0, 3.0, epsilon = EPSILON);
        assert_abs_diff_eq!(result.from_battery.0, 0.0, epsilon = EPSILON);
        assert_abs_diff_eq!(
            result.residual_energy_after.0,
            2.5 * parameters.battery.one_way_efficiency(),
            epsilon = EPSILON,
        );
        assert!(result.is_force_charge_scheduled_today);
    }

    /// Force charge comes on top of the excess solar already stored.
    #[test]
    fn force_charge_with_excess_solar() {
        let parameters = SimulationParameters {
            battery: BatteryParameters {
                capacity: KilowattHours::from(20.0),
                usable_capacity: KilowattHours::from(20.0),
                ..parameters(Strategy::ImportMinimiser).battery
            },
            ..parameters(Strategy::ImportMinimiser)
        };
        let dispatcher = Dispatcher::new(&parameters);

        let result =
            dispatcher.dispatch(&reading(1, 3, 0.0, 2.0), KilowattHours::ZERO, false, None);

        // 2 kWh from the panels, then 2.5 kWh from the grid:
        assert_abs_diff_eq!(result.to_battery.0, 4.5, epsilon = EPSILON);
        assert_abs_diff_eq!(result.grid_import.0, 2.5, epsilon = EPSILON);
        assert_abs_diff_eq!(result.grid_export.0, 0.0, epsilon = EPSILON);
        assert_abs_diff_eq!(
            result.residual_energy_after.0,
            4.5 * parameters.battery.one_way_efficiency(),
            epsilon = EPSILON,
        );
    }

    /// Import capacity limits the force charge.
    #[test]
    fn force_charge_limited_by_import_capacity() {
        let parameters = SimulationParameters {
            grid: GridLimits {
                max_import: Kilowatts::from(4.0),
                ..parameters(Strategy::ImportMinimiser).grid
            },
            ..parameters(Strategy::ImportMinimiser)
        };
        let dispatcher = Dispatcher::new(&parameters);

        // Household draws 2 kW, so 2 kW is left for the battery:
        let result =
            dispatcher.dispatch(&reading(1, 3, 1.0, 0.0), KilowattHours::ZERO, false, None);

        assert_abs_diff_eq!(result.to_battery.0, 1.0, epsilon = EPSILON);
        assert_abs_diff_eq!(result.grid_import.0, 2.0, epsilon = EPSILON);
    }

    /// Battery must not discharge while being force-charged, even if full.
    #[test]
    fn no_discharge_during_force_charge() {
        let parameters = parameters(Strategy::ExportMaximiser);
        let dispatcher = Dispatcher::new(&parameters);

        let result = dispatcher.dispatch(
            &reading(6, 2, 1.0, 0.0),
            dispatcher.max_residual_energy(),
            false,
            None,
        );

        assert_eq!(result.from_battery, KilowattHours::ZERO);
        assert_eq!(result.to_battery, KilowattHours::ZERO);
        assert_abs_diff_eq!(result.grid_import.0, 1.0, epsilon = EPSILON);
        assert!(result.is_force_charge_scheduled_today);
    }

    /// Headroom limits the force charge, adjusted for the charging losses.
    #[test]
    fn force_charge_limited_by_headroom() {
        let parameters = parameters(Strategy::ImportMinimiser);
        let dispatcher = Dispatcher::new(&parameters);
        let efficiency = parameters.battery.one_way_efficiency();

        let result =
            dispatcher.dispatch(&reading(6, 3, 0.0, 0.0), KilowattHours::from(9.0), false, None);

        assert_abs_diff_eq!(result.to_battery.0, 1.0 / efficiency, epsilon = EPSILON);
        assert_abs_diff_eq!(result.residual_energy_after.0, 10.0, epsilon = EPSILON);
    }

    /// Excess solar charges the battery and the rest is exported.
    #[test]
    fn solar_charging_then_export() {
        let parameters = parameters(Strategy::SelfConsumption);
        let dispatcher = Dispatcher::new(&parameters);
        let efficiency = parameters.battery.one_way_efficiency();

        // 4 kWh of excess, the charging rate allows 2.5 kWh per half an hour:
        let result =
            dispatcher.dispatch(&reading(6, 12, 1.0, 5.0), KilowattHours::ZERO, false, None);

        assert_abs_diff_eq!(result.self_consumption.0, 1.0, epsilon = EPSILON);
        assert_abs_diff_eq!(result.to_battery.0, 2.5, epsilon = EPSILON);
        assert_abs_diff_eq!(result.grid_export.0, 1.5, epsilon = EPSILON);
        assert_abs_diff_eq!(result.grid_import.0, 0.0, epsilon = EPSILON);
        assert_abs_diff_eq!(result.residual_energy_after.0, 2.5 * efficiency, epsilon = EPSILON);
    }

    /// Export is clipped at the export capacity.
    #[test]
    fn export_clipping() {
        let parameters = parameters(Strategy::SelfConsumption);
        let dispatcher = Dispatcher::new(&parameters);

        let result = dispatcher.dispatch(
            &reading(6, 12, 0.0, 8.0),
            dispatcher.max_residual_energy(),
            false,
            None,
        );

        // 6 kW for half an hour:
        assert_abs_diff_eq!(result.grid_export.0, 3.0, epsilon = EPSILON);
    }

    /// Pre-charge hours export all excess solar and dump the battery onto the grid.
    #[test]
    fn pre_charge_dump() {
        let parameters = parameters(Strategy::ExportMaximiser);
        let dispatcher = Dispatcher::new(&parameters);
        let efficiency = parameters.battery.one_way_efficiency();

        // 23:00 is within four hours of the 02:00 window:
        let result =
            dispatcher.dispatch(&reading(6, 23, 0.0, 1.0), KilowattHours::from(5.0), false, None);

        assert_eq!(result.to_battery, KilowattHours::ZERO);
        // 1 kWh of solar plus 2 kWh more until the export capacity of 3 kWh per interval:
        assert_abs_diff_eq!(result.grid_export.0, 3.0, epsilon = EPSILON);
        assert_abs_diff_eq!(result.from_battery.0, 2.0 / efficiency, epsilon = EPSILON);
        assert!(!result.is_force_charge_scheduled_today);
    }

    /// The pre-emptive dump gets the full discharging rate on top of covering the household.
    #[test]
    fn pre_charge_dump_after_household() {
        let parameters = parameters(Strategy::ExportMaximiser);
        let dispatcher = Dispatcher::new(&parameters);
        let efficiency = parameters.battery.one_way_efficiency();

        let result =
            dispatcher.dispatch(&reading(6, 0, 2.0, 0.0), KilowattHours::from(9.0), false, None);

        // 2 kWh to the household, then 2.5 kWh per interval onto the grid:
        assert_abs_diff_eq!(result.grid_export.0, 2.5, epsilon = EPSILON);
        assert_abs_diff_eq!(result.grid_import.0, 0.0, epsilon = EPSILON);
        assert_abs_diff_eq!(result.from_battery.0, 4.5 / efficiency, epsilon = EPSILON);
    }

    /// Balanced export maximiser holds the charge in winter, but not in summer.
    #[test]
    fn balanced_export_maximiser_holds_charge_in_winter() {
        let parameters = parameters(Strategy::BalancedExportMaximiser);
        let dispatcher = Dispatcher::new(&parameters);

        let winter =
            dispatcher.dispatch(&reading(12, 23, 0.0, 0.0), KilowattHours::from(5.0), false, None);
        assert_eq!(winter.grid_export, KilowattHours::ZERO);
        assert_eq!(winter.from_battery, KilowattHours::ZERO);

        let summer =
            dispatcher.dispatch(&reading(7, 23, 0.0, 0.0), KilowattHours::from(5.0), false, None);
        assert!(summer.grid_export.is_significant());
    }

    /// Import minimiser never dumps the battery before a force-charge window.
    #[test]
    fn import_minimiser_keeps_charge_before_window() {
        let parameters = parameters(Strategy::ImportMinimiser);
        let dispatcher = Dispatcher::new(&parameters);

        let result =
            dispatcher.dispatch(&reading(6, 23, 0.0, 1.0), KilowattHours::from(5.0), false, None);

        assert_eq!(result.from_battery, KilowattHours::ZERO);
        assert!(result.to_battery.is_significant());
    }

    /// Forecast strategy skips the force charge when the next day is sunny enough.
    #[test]
    fn forecast_gate() {
        let parameters = SimulationParameters {
            average_daily_consumption: Some(KilowattHours::from(10.0)),
            ..parameters(Strategy::HistoricalForecast)
        };
        let dispatcher = Dispatcher::new(&parameters);
        let reading = reading(6, 3, 0.0, 0.0);

        let sunny = dispatcher.dispatch(
            &reading,
            KilowattHours::ZERO,
            false,
            Some(KilowattHours::from(8.0)),
        );
        assert_eq!(sunny.to_battery, KilowattHours::ZERO);
        assert!(!sunny.is_force_charge_scheduled_today);

        let cloudy = dispatcher.dispatch(
            &reading,
            KilowattHours::ZERO,
            false,
            Some(KilowattHours::from(7.0)),
        );
        assert!(cloudy.to_battery.is_significant());
        assert!(cloudy.is_force_charge_scheduled_today);

        let unknown = dispatcher.dispatch(&reading, KilowattHours::ZERO, false, None);
        assert!(unknown.to_battery.is_significant());
    }

    /// The scheduled flag is carried over within the day.
    #[test]
    fn scheduled_flag_is_sticky() {
        let parameters = parameters(Strategy::SelfConsumption);
        let dispatcher = Dispatcher::new(&parameters);
        let result =
            dispatcher.dispatch(&reading(6, 12, 0.0, 0.0), KilowattHours::ZERO, true, None);
        assert!(result.is_force_charge_scheduled_today);
    }

    /// Tiny amounts are not worth moving.
    #[test]
    fn rounding_noise_is_ignored() {
        let parameters = parameters(Strategy::SelfConsumption);
        let dispatcher = Dispatcher::new(&parameters);

        let result = dispatcher.dispatch(
            &reading(6, 19, 0.0005, 0.0),
            KilowattHours::from(5.0),
            false,
            None,
        );

        assert_eq!(result.from_battery, KilowattHours::ZERO);
        assert_abs_diff_eq!(result.grid_import.0, 0.0005, epsilon = EPSILON);
    }

    /// Minimum state of charge is never crossed.
    #[test]
    fn min_soc_reserve() {
        let parameters = SimulationParameters {
            battery: BatteryParameters {
                min_soc_percent: 20.0,
                ..parameters(Strategy::SelfConsumption).battery
            },
            ..parameters(Strategy::SelfConsumption)
        };
        let dispatcher = Dispatcher::new(&parameters);
        let efficiency = parameters.battery.one_way_efficiency();

        let result =
            dispatcher.dispatch(&reading(6, 19, 2.0, 0.0), KilowattHours::from(3.0), false, None);

        assert_abs_diff_eq!(result.residual_energy_after.0, 2.0, epsilon = EPSILON);
        assert_abs_diff_eq!(result.grid_import.0, 2.0 - efficiency, epsilon = EPSILON);
    }

    /// Household and battery balance: what comes in equals what goes out.
    #[test]
    fn energy_conservation() {
        let efficiency = parameters(Strategy::SelfConsumption).battery.one_way_efficiency();
        for strategy in enumset::EnumSet::<Strategy>::all() {
            let parameters = parameters(strategy);
            let dispatcher = Dispatcher::new(&parameters);
            for (hour, consumption, generation, residual_energy) in [
                (1, 0.7, 0.0, 3.0),
                (3, 0.4, 0.0, 1.0),
                (12, 0.3, 4.0, 2.0),
                (19, 2.0, 0.5, 8.0),
                (23, 0.1, 0.6, 6.0),
            ] {
                let reading = reading(6, hour, consumption, generation);
                let result = dispatcher.dispatch(
                    &reading,
                    KilowattHours::from(residual_energy),
                    false,
                    None,
                );
                let delivered = result.from_battery * efficiency;
                let inflow = reading.generation + result.grid_import + delivered;
                let outflow = reading.consumption + result.grid_export + result.to_battery;
                // Export clipping may only lose energy:
                assert!(inflow.0 >= outflow.0 - EPSILON, "{strategy:?} at {hour}");
                assert_abs_diff_eq!(
                    result.residual_energy_after.0,
                    residual_energy + result.to_battery.0 * efficiency - result.from_battery.0,
                    epsilon = EPSILON,
                );
            }
        }
    }
}

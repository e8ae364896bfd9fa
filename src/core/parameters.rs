use bon::Builder;
use serde::Serialize;

use crate::{
    core::{strategy::Strategy, tariff::Tariff},
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours, power::Kilowatts, time::Hours},
};

#[must_use]
#[derive(Copy, Clone, Debug, Serialize)]
pub struct BatteryParameters {
    /// Nameplate capacity.
    pub capacity: KilowattHours,

    /// The part of the nameplate capacity which the battery management system allows to use.
    pub usable_capacity: KilowattHours,

    pub min_soc_percent: f64,
    pub max_soc_percent: f64,
    pub max_charge_power: Kilowatts,
    pub max_discharge_power: Kilowatts,

    /// Fraction of the energy recovered after a full charge and discharge cycle.
    pub round_trip_efficiency: f64,
}

impl BatteryParameters {
    pub fn min_residual_energy(&self) -> KilowattHours {
        self.usable_capacity * (self.min_soc_percent / 100.0)
    }

    pub fn max_residual_energy(&self) -> KilowattHours {
        self.usable_capacity * (self.max_soc_percent / 100.0)
    }

    /// The round-trip loss is split evenly between charging and discharging.
    #[must_use]
    pub fn one_way_efficiency(&self) -> f64 {
        self.round_trip_efficiency.sqrt()
    }

    /// Resize the battery keeping the usable share of the capacity.
    pub fn with_capacity(mut self, capacity: KilowattHours) -> Self {
        let usable_share = if self.capacity > KilowattHours::ZERO {
            self.usable_capacity / self.capacity
        } else {
            1.0
        };
        self.capacity = capacity;
        self.usable_capacity = capacity * usable_share;
        self
    }

    fn validate(&self) -> Result {
        ensure!(
            self.capacity.is_finite() && self.capacity >= KilowattHours::ZERO,
            "battery capacity must be a non-negative number: {}",
            self.capacity,
        );
        ensure!(
            self.usable_capacity.is_finite() && self.usable_capacity >= KilowattHours::ZERO,
            "usable capacity must be a non-negative number: {}",
            self.usable_capacity,
        );
        ensure!(
            self.usable_capacity <= self.capacity,
            "usable capacity ({}) exceeds the battery capacity ({})",
            self.usable_capacity,
            self.capacity,
        );
        ensure!(
            (0.0..=100.0).contains(&self.min_soc_percent)
                && (0.0..=100.0).contains(&self.max_soc_percent),
            "state-of-charge limits must be within 0-100%: {}% and {}%",
            self.min_soc_percent,
            self.max_soc_percent,
        );
        ensure!(
            self.min_soc_percent <= self.max_soc_percent,
            "minimum state-of-charge ({}%) is above the maximum ({}%)",
            self.min_soc_percent,
            self.max_soc_percent,
        );
        ensure!(
            self.max_charge_power.is_finite() && self.max_charge_power >= Kilowatts::ZERO,
            "maximum charging power must be a non-negative number: {}",
            self.max_charge_power,
        );
        ensure!(
            self.max_discharge_power.is_finite() && self.max_discharge_power >= Kilowatts::ZERO,
            "maximum discharging power must be a non-negative number: {}",
            self.max_discharge_power,
        );
        ensure!(
            self.round_trip_efficiency > 0.0 && self.round_trip_efficiency <= 1.0,
            "round-trip efficiency must be within (0, 1]: {}",
            self.round_trip_efficiency,
        );
        Ok(())
    }
}

/// Grid connection limits.
#[must_use]
#[derive(Copy, Clone, Debug, Serialize)]
pub struct GridLimits {
    /// Maximum import capacity.
    pub max_import: Kilowatts,

    /// Maximum export capacity.
    pub max_export: Kilowatts,
}

#[must_use]
#[derive(Clone, Debug, Builder, Serialize)]
pub struct SimulationParameters {
    pub battery: BatteryParameters,
    pub grid: GridLimits,
    pub tariff: Tariff,
    pub strategy: Strategy,

    /// Length of a single reading interval.
    #[builder(default = Hours::from_minutes(30))]
    pub interval: Hours,

    /// Installed system cost, used for the payback period.
    #[builder(default)]
    pub system_cost: Cost,

    /// Filled in by the simulation for the forecast-aware strategy.
    pub average_daily_consumption: Option<KilowattHours>,
}

impl SimulationParameters {
    /// Number of intervals in a day.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn intervals_per_day(&self) -> usize {
        (Hours::ONE_DAY / self.interval).round() as usize
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_battery_capacity(mut self, capacity: KilowattHours) -> Self {
        self.battery = self.battery.with_capacity(capacity);
        self
    }

    /// Reject the parameters which the dispatch engine cannot work with.
    pub fn validate(&self) -> Result {
        self.battery.validate().context("invalid battery parameters")?;
        ensure!(
            self.grid.max_import.is_finite() && self.grid.max_import >= Kilowatts::ZERO,
            "maximum import capacity must be a non-negative number: {}",
            self.grid.max_import,
        );
        ensure!(
            self.grid.max_export.is_finite() && self.grid.max_export >= Kilowatts::ZERO,
            "maximum export capacity must be a non-negative number: {}",
            self.grid.max_export,
        );
        ensure!(
            self.interval.is_finite() && self.interval > Hours::ZERO,
            "interval must be positive: {}",
            self.interval,
        );
        let intervals_per_day = Hours::ONE_DAY / self.interval;
        ensure!(
            (intervals_per_day - intervals_per_day.round()).abs() < 1e-9,
            "interval must divide a day evenly: {}",
            self.interval,
        );
        ensure!(
            self.tariff.rates().all(|rate| rate.is_finite()),
            "tariff rates must be finite numbers",
        );
        ensure!(
            self.system_cost.is_finite() && self.system_cost >= Cost::ZERO,
            "system cost must be a non-negative number: {}",
            self.system_cost,
        );
        if let Some(average_daily_consumption) = self.average_daily_consumption {
            ensure!(
                average_daily_consumption.is_finite(),
                "average daily consumption must be finite",
            );
        }
        if self.strategy.is_force_charging() {
            ensure!(
                self.tariff.has_force_charge_hours(),
                "{} strategy requires at least one force-charge hour",
                self.strategy,
            );
        }
        Ok(())
    }
}

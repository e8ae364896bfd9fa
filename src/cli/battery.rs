//! Battery and grid connection CLI arguments.

use clap::Parser;

use crate::{
    core::parameters::{BatteryParameters, GridLimits},
    quantity::{energy::KilowattHours, power::Kilowatts},
};

#[must_use]
#[derive(Copy, Clone, Parser)]
pub struct BatteryArgs {
    /// Total battery capacity in kilowatt-hours.
    #[clap(long = "battery-capacity-kwh", default_value = "10", env = "BATTERY_CAPACITY_KWH")]
    pub capacity: KilowattHours,

    /// Share of the total capacity which can actually be used.
    #[clap(long, default_value = "100", env = "BATTERY_USABLE_CAPACITY_PERCENT")]
    pub usable_capacity_percent: f64,

    /// Minimal state-of-charge percent of the usable capacity.
    #[clap(long, default_value = "10", env = "MIN_SOC_PERCENT")]
    pub min_soc_percent: f64,

    /// Maximal state-of-charge percent of the usable capacity.
    #[clap(long, default_value = "100", env = "MAX_SOC_PERCENT")]
    pub max_soc_percent: f64,

    /// Charging power in kilowatts.
    #[clap(long = "charging-power-kw", default_value = "5", env = "CHARGING_POWER_KW")]
    pub charging_power: Kilowatts,

    /// Discharging power in kilowatts.
    #[clap(long = "discharging-power-kw", default_value = "5", env = "DISCHARGING_POWER_KW")]
    pub discharging_power: Kilowatts,

    /// Share of the stored energy which survives a full charge and discharge cycle.
    #[clap(long, default_value = "0.9", env = "ROUND_TRIP_EFFICIENCY")]
    pub round_trip_efficiency: f64,
}

impl From<BatteryArgs> for BatteryParameters {
    fn from(args: BatteryArgs) -> Self {
        Self {
            capacity: args.capacity,
            usable_capacity: args.capacity * (args.usable_capacity_percent / 100.0),
            min_soc_percent: args.min_soc_percent,
            max_soc_percent: args.max_soc_percent,
            max_charge_power: args.charging_power,
            max_discharge_power: args.discharging_power,
            round_trip_efficiency: args.round_trip_efficiency,
        }
    }
}

#[must_use]
#[derive(Copy, Clone, Parser)]
pub struct GridArgs {
    /// Maximum import capacity (MIC) in kilowatts.
    #[clap(long = "max-import-kw", default_value = "10", env = "MAX_IMPORT_KW")]
    pub max_import: Kilowatts,

    /// Maximum export capacity (MEC) in kilowatts.
    #[clap(long = "max-export-kw", default_value = "6", env = "MAX_EXPORT_KW")]
    pub max_export: Kilowatts,
}

impl From<GridArgs> for GridLimits {
    fn from(args: GridArgs) -> Self {
        Self { max_import: args.max_import, max_export: args.max_export }
    }
}

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::{
    core::{dispatch::IntervalResult, reading::IntervalReading, tariff::Tariff},
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours},
};

/// Calendar month, displayed as `YYYY-MM`.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MonthKey {
    pub year: i32,

    /// Starting with 1.
    pub month: u32,
}

impl From<DateTime<Utc>> for MonthKey {
    fn from(timestamp: DateTime<Utc>) -> Self {
        Self { year: timestamp.year(), month: timestamp.month() }
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (year, month) = s.split_once('-').with_context(|| format!("`{s}` is not `YYYY-MM`"))?;
        let this = Self { year: year.parse()?, month: month.parse()? };
        ensure!((1..=12).contains(&this.month), "month must be within 1-12: `{s}`");
        Ok(this)
    }
}

/// Running monthly totals.
#[must_use]
#[derive(Copy, Clone, Debug, Default, Serialize)]
pub struct MonthlyAccumulator {
    pub cost_without_battery: Cost,
    pub cost_with_battery: Cost,
    pub export_revenue: Cost,

    pub consumption: KilowattHours,
    pub generation: KilowattHours,
    pub import_without_battery: KilowattHours,
    pub import_with_battery: KilowattHours,
    pub export_with_battery: KilowattHours,

    /// Energy sent into the battery.
    pub charged: KilowattHours,

    /// Energy drawn from the battery.
    pub discharged: KilowattHours,

    /// Days which had a force charge scheduled but never got the battery full.
    pub missed_full_charges: u32,

    pub n_intervals: usize,
}

impl MonthlyAccumulator {
    /// Add up a single dispatched interval.
    pub fn record(&mut self, reading: &IntervalReading, result: &IntervalResult, tariff: &Tariff) {
        let import_rate = tariff.import_rate(reading.hour());
        let export_rate = tariff.export_rate(reading.hour());
        let import_without_battery = reading.net_consumption();

        self.cost_without_battery += import_without_battery * import_rate;
        self.cost_with_battery += result.grid_import * import_rate;
        self.export_revenue += result.grid_export * export_rate;

        self.consumption += reading.consumption;
        self.generation += reading.generation;
        self.import_without_battery += import_without_battery;
        self.import_with_battery += result.grid_import;
        self.export_with_battery += result.grid_export;
        self.charged += result.to_battery;
        self.discharged += result.from_battery;
        self.n_intervals += 1;
    }

    /// Net bill with the battery: imports minus the export revenue.
    pub fn bill_with_battery(&self) -> Cost {
        self.cost_with_battery - self.export_revenue
    }

    pub fn savings(&self) -> Cost {
        self.cost_without_battery - self.bill_with_battery()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    use super::*;
    use crate::quantity::rate::KilowattHourRate;

    #[test]
    fn test_month_key_round_trip() {
        let key: MonthKey = "2023-11".parse().unwrap();
        assert_eq!(key, MonthKey { year: 2023, month: 11 });
        assert_eq!(key.to_string(), "2023-11");
    }

    #[test]
    fn test_month_key_rejects_garbage() {
        assert!("2023".parse::<MonthKey>().is_err());
        assert!("2023-13".parse::<MonthKey>().is_err());
        assert!("abcd-01".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_month_key_ordering() {
        let december = MonthKey { year: 2023, month: 12 };
        let january = MonthKey { year: 2024, month: 1 };
        assert!(december < january);
    }

    #[test]
    fn test_record() {
        let tariff = Tariff::flat(KilowattHourRate::from(0.4), KilowattHourRate::from(0.1));
        let reading = IntervalReading::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap(),
            KilowattHours::from(2.0),
            KilowattHours::from(0.5),
        );
        let result = IntervalResult {
            self_consumption: KilowattHours::from(0.5),
            grid_import: KilowattHours::from(0.5),
            grid_export: KilowattHours::from(0.2),
            to_battery: KilowattHours::ZERO,
            from_battery: KilowattHours::from(1.0),
            residual_energy_after: KilowattHours::from(3.0),
            is_force_charge_scheduled_today: false,
        };
        let mut accumulator = MonthlyAccumulator::default();
        accumulator.record(&reading, &result, &tariff);

        assert_abs_diff_eq!(accumulator.cost_without_battery.0, 0.6, epsilon = 1e-9);
        assert_abs_diff_eq!(accumulator.cost_with_battery.0, 0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(accumulator.export_revenue.0, 0.02, epsilon = 1e-9);
        assert_abs_diff_eq!(accumulator.savings().0, 0.6 - (0.2 - 0.02), epsilon = 1e-9);
        assert_eq!(accumulator.import_without_battery, KilowattHours::from(1.5));
        assert_eq!(accumulator.n_intervals, 1);
    }
}

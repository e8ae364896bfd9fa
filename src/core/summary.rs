use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    core::month::{MonthKey, MonthlyAccumulator},
    quantity::{cost::Cost, energy::KilowattHours},
};

const DAYS_PER_YEAR: f64 = 365.0;

/// Month totals with the savings worked out.
#[must_use]
#[derive(Copy, Clone, Debug, Serialize)]
pub struct MonthlySummary {
    #[serde(flatten)]
    pub totals: MonthlyAccumulator,

    pub savings: Cost,
}

/// Annualised figures.
///
/// All additive totals are linearly scaled from the simulated span to a 365-day year.
#[must_use]
#[derive(Copy, Clone, Debug, Serialize)]
pub struct AnnualSummary {
    pub savings: Cost,

    /// `None` means the battery never pays back.
    pub payback_years: Option<f64>,

    pub self_sufficiency_percent: f64,
    pub bill_before: Cost,
    pub bill_after: Cost,
    pub import_before: KilowattHours,
    pub import_after: KilowattHours,
    pub export_after: KilowattHours,
    pub charged: KilowattHours,
    pub discharged: KilowattHours,

    /// Not annualised.
    pub missed_full_charges: u32,

    pub simulated_days: f64,
}

#[must_use]
pub struct Summary {
    pub months: BTreeMap<MonthKey, MonthlySummary>,
    pub annual: AnnualSummary,
}

impl Summary {
    /// Finalise the monthly totals and annualise them.
    ///
    /// Pure function of its inputs.
    #[expect(clippy::cast_precision_loss)]
    pub fn new(
        months: &BTreeMap<MonthKey, MonthlyAccumulator>,
        n_intervals: usize,
        intervals_per_day: usize,
        system_cost: Cost,
    ) -> Self {
        let months: BTreeMap<_, _> = months
            .iter()
            .map(|(key, totals)| {
                (*key, MonthlySummary { totals: *totals, savings: totals.savings() })
            })
            .collect();

        let simulated_days = n_intervals as f64 / intervals_per_day as f64;
        let scale = if simulated_days > 0.0 { DAYS_PER_YEAR / simulated_days } else { 0.0 };

        let total = months.values().fold(Totals::default(), |mut total, month| {
            total.savings += month.savings;
            total.bill_before += month.totals.cost_without_battery;
            total.bill_after += month.totals.bill_with_battery();
            total.consumption += month.totals.consumption;
            total.import_before += month.totals.import_without_battery;
            total.import_after += month.totals.import_with_battery;
            total.export_after += month.totals.export_with_battery;
            total.charged += month.totals.charged;
            total.discharged += month.totals.discharged;
            total.missed_full_charges += month.totals.missed_full_charges;
            total
        });

        let self_sufficiency_percent = if total.consumption > KilowattHours::ZERO {
            (1.0 - total.import_after / total.consumption) * 100.0
        } else {
            0.0
        };
        let savings = total.savings * scale;
        let payback_years = (system_cost > Cost::ZERO && savings > Cost::ZERO)
            .then(|| system_cost / savings);

        Self {
            months,
            annual: AnnualSummary {
                savings,
                payback_years,
                self_sufficiency_percent,
                bill_before: total.bill_before * scale,
                bill_after: total.bill_after * scale,
                import_before: total.import_before * scale,
                import_after: total.import_after * scale,
                export_after: total.export_after * scale,
                charged: total.charged * scale,
                discharged: total.discharged * scale,
                missed_full_charges: total.missed_full_charges,
                simulated_days,
            },
        }
    }
}

#[derive(Default)]
struct Totals {
    savings: Cost,
    bill_before: Cost,
    bill_after: Cost,
    consumption: KilowattHours,
    import_before: KilowattHours,
    import_after: KilowattHours,
    export_after: KilowattHours,
    charged: KilowattHours,
    discharged: KilowattHours,
    missed_full_charges: u32,
}

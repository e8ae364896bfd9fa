use std::collections::BTreeMap;

use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use itertools::Itertools;

use crate::{
    core::{simulation::SimulationResult, strategy::Strategy, sweep::SweepPoint},
    quantity::cost::Cost,
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

fn savings_cell(savings: Cost) -> Cell {
    Cell::new(savings).set_alignment(CellAlignment::Right).fg(if savings > Cost::ZERO {
        Color::Green
    } else {
        Color::Red
    })
}

fn format_payback(payback_years: Option<f64>) -> String {
    payback_years.map_or_else(|| "never".to_string(), |years| format!("{years:.1} years"))
}

pub fn build_summary_table(result: &SimulationResult) -> Table {
    let annual = &result.annual;
    let mut table = new_table();
    table.set_header(vec![
        Cell::new(result.strategy).fg(result.strategy.color()),
        Cell::new(result.battery_capacity),
    ]);
    table.add_row(vec![Cell::new("Annual savings"), savings_cell(annual.savings)]);
    table.add_row(vec![
        Cell::new("Payback"),
        Cell::new(format_payback(annual.payback_years)).fg(if annual.payback_years.is_some() {
            Color::Reset
        } else {
            Color::Red
        }),
    ]);
    table.add_row(vec![
        Cell::new("Self-sufficiency"),
        Cell::new(format!("{:.1}%", annual.self_sufficiency_percent)),
    ]);
    table.add_row(vec![Cell::new("Bill before"), Cell::new(annual.bill_before)]);
    table.add_row(vec![Cell::new("Bill after"), Cell::new(annual.bill_after)]);
    table.add_row(vec![Cell::new("Import before"), Cell::new(annual.import_before)]);
    table.add_row(vec![Cell::new("Import after"), Cell::new(annual.import_after)]);
    table.add_row(vec![Cell::new("Export after"), Cell::new(annual.export_after)]);
    table.add_row(vec![Cell::new("Charged"), Cell::new(annual.charged)]);
    table.add_row(vec![Cell::new("Discharged"), Cell::new(annual.discharged)]);
    table.add_row(vec![
        Cell::new("Missed full charges"),
        Cell::new(annual.missed_full_charges).fg(if annual.missed_full_charges == 0 {
            Color::Reset
        } else {
            Color::DarkYellow
        }),
    ]);
    table.add_row(vec![
        Cell::new("Simulated days").add_attribute(Attribute::Dim),
        Cell::new(format!("{:.1}", annual.simulated_days)).add_attribute(Attribute::Dim),
    ]);
    table
}

pub fn build_monthly_table(result: &SimulationResult) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Month",
        "Consumption",
        "Generation",
        "Import before",
        "Import after",
        "Export",
        "Charged",
        "Discharged",
        "Bill before",
        "Bill after",
        "Savings",
        "Missed",
    ]);
    for (key, month) in &result.months {
        let totals = &month.totals;
        table.add_row(vec![
            Cell::new(key),
            Cell::new(totals.consumption).set_alignment(CellAlignment::Right),
            Cell::new(totals.generation).set_alignment(CellAlignment::Right),
            Cell::new(totals.import_without_battery)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(totals.import_with_battery).set_alignment(CellAlignment::Right),
            Cell::new(totals.export_with_battery).set_alignment(CellAlignment::Right),
            Cell::new(totals.charged).set_alignment(CellAlignment::Right),
            Cell::new(totals.discharged).set_alignment(CellAlignment::Right),
            Cell::new(totals.cost_without_battery)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(totals.bill_with_battery()).set_alignment(CellAlignment::Right),
            savings_cell(month.savings),
            Cell::new(totals.missed_full_charges).set_alignment(CellAlignment::Right).fg(
                if totals.missed_full_charges == 0 { Color::Reset } else { Color::DarkYellow },
            ),
        ]);
    }
    table
}

pub fn build_comparison_table(results: &[SimulationResult]) -> Table {
    let best_savings = results
        .iter()
        .map(|result| result.annual.savings)
        .max_by(|lhs, rhs| lhs.0.total_cmp(&rhs.0));

    let mut table = new_table();
    table.set_header(vec![
        "Strategy",
        "Savings",
        "Payback",
        "Self-sufficiency",
        "Import",
        "Export",
        "Missed",
    ]);
    for result in results {
        let annual = &result.annual;
        let mut strategy = Cell::new(result.strategy).fg(result.strategy.color());
        if Some(annual.savings) == best_savings {
            strategy = strategy.add_attribute(Attribute::Bold);
        }
        table.add_row(vec![
            strategy,
            savings_cell(annual.savings),
            Cell::new(format_payback(annual.payback_years)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1}%", annual.self_sufficiency_percent))
                .set_alignment(CellAlignment::Right),
            Cell::new(annual.import_after).set_alignment(CellAlignment::Right),
            Cell::new(annual.export_after).set_alignment(CellAlignment::Right),
            Cell::new(annual.missed_full_charges).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Battery sizes in rows, strategies in columns.
pub fn build_sweep_table(series: &BTreeMap<Strategy, Vec<SweepPoint>>) -> Table {
    let mut table = new_table();
    let mut header = vec![Cell::new("Capacity")];
    header.extend(series.keys().map(|strategy| Cell::new(strategy).fg(strategy.color())));
    table.set_header(header);

    let capacities = series
        .values()
        .flatten()
        .map(|point| point.capacity)
        .sorted_by(|lhs, rhs| lhs.0.total_cmp(&rhs.0))
        .dedup();
    for capacity in capacities {
        let mut row = vec![Cell::new(capacity)];
        row.extend(series.values().map(|points| {
            points
                .iter()
                .find(|point| point.capacity == capacity)
                .map_or_else(|| Cell::new("-"), |point| savings_cell(point.annual_savings))
        }));
        table.add_row(row);
    }
    table
}

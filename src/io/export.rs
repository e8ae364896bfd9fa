//! Detailed log and result export.

use std::{
    fmt::Debug,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use serde::Serialize;

use crate::{core::simulation::LogEntry, prelude::*};

const LOG_HEADER: [&str; 10] = [
    "timestamp",
    "consumption_kwh",
    "generation_kwh",
    "self_consumption_kwh",
    "grid_import_kwh",
    "grid_export_kwh",
    "to_battery_kwh",
    "from_battery_kwh",
    "residual_energy_kwh",
    "force_charge_scheduled",
];

#[instrument(skip_all, name = "Exporting the log…", fields(path = %path.as_ref().display()))]
pub fn write_log_to<P: AsRef<Path> + Debug>(log: &[LogEntry], path: P) -> Result {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("failed to create `{}`", path.display()))?;
    write_log(log, BufWriter::new(file))?;
    info!(n_entries = log.len(), "Exported");
    Ok(())
}

/// One row per log entry, in the log order.
pub fn write_log(log: &[LogEntry], writer: impl Write) -> Result {
    let mut writer = csv::WriterBuilder::new().from_writer(writer);
    writer.write_record(LOG_HEADER)?;
    for entry in log {
        let result = &entry.result;
        writer.write_record([
            entry.reading.timestamp.to_rfc3339(),
            format!("{:.4}", entry.reading.consumption.0),
            format!("{:.4}", entry.reading.generation.0),
            format!("{:.4}", result.self_consumption.0),
            format!("{:.4}", result.grid_import.0),
            format!("{:.4}", result.grid_export.0),
            format!("{:.4}", result.to_battery.0),
            format!("{:.4}", result.from_battery.0),
            format!("{:.4}", result.residual_energy_after.0),
            result.is_force_charge_scheduled_today.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[instrument(skip_all, name = "Exporting JSON…", fields(path = %path.as_ref().display()))]
pub fn write_json_to<T: Serialize, P: AsRef<Path> + Debug>(value: &T, path: P) -> Result {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("failed to create `{}`", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).context("failed to serialize")?;
    writer.flush()?;
    Ok(())
}

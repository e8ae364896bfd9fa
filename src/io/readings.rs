//! Interval readings from a CSV file.
//!
//! The file is expected to be already bucketed into fixed-width intervals:
//!
//! ```text
//! timestamp,consumption_kwh,generation_kwh
//! 2023-01-01T00:00:00Z,0.21,0.0
//! 2023-01-01T00:30:00Z,0.18,0.0
//! ```

use std::{fmt::Debug, io::Read, path::Path};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{core::reading::IntervalReading, prelude::*, quantity::energy::KilowattHours};

#[derive(Deserialize)]
struct Record {
    timestamp: DateTime<Utc>,

    #[serde(rename = "consumption_kwh")]
    consumption: KilowattHours,

    #[serde(rename = "generation_kwh")]
    generation: KilowattHours,
}

#[instrument(skip_all, name = "Loading readings…", fields(path = %path.as_ref().display()))]
pub fn read_from<P: AsRef<Path> + Debug>(path: P) -> Result<Vec<IntervalReading>> {
    let path = path.as_ref();
    let reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open `{}`", path.display()))?;
    let readings = parse(reader)?;
    info!(n_readings = readings.len(), "Loaded");
    Ok(readings)
}

/// Parse and check the readings: values must be non-negative, and timestamps strictly ascending.
pub fn parse<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<IntervalReading>> {
    let mut readings: Vec<IntervalReading> = Vec::new();
    for (index, record) in reader.deserialize::<Record>().enumerate() {
        // Header is the first line:
        let line = index + 2;
        let record = record.with_context(|| format!("malformed record at line {line}"))?;
        let values = [("consumption", record.consumption), ("generation", record.generation)];
        for (name, value) in values {
            ensure!(
                value.is_finite() && value >= KilowattHours::ZERO,
                "{name} must be a non-negative number at line {line}: {value:?}",
            );
        }
        if let Some(last) = readings.last() {
            ensure!(
                record.timestamp > last.timestamp,
                "timestamps must be strictly ascending at line {line}: `{}` follows `{}`",
                record.timestamp,
                last.timestamp,
            );
        }
        readings.push(IntervalReading::new(
            record.timestamp,
            record.consumption,
            record.generation,
        ));
    }
    ensure!(!readings.is_empty(), "there are no readings");
    Ok(readings)
}

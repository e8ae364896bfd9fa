//! Tariff definition in TOML:
//!
//! ```toml
//! import_rates = [0.25, 0.25, …] # 24 hourly rates
//! export_rates = [0.10, 0.10, …] # 24 hourly rates
//! force_charge_hours = [2, 3, 4]
//! ```

use std::{fmt::Debug, fs, path::Path};

use serde::Deserialize;

use crate::{core::tariff::Tariff, prelude::*, quantity::rate::KilowattHourRate};

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TariffFile {
    pub import_rates: Vec<KilowattHourRate>,
    pub export_rates: Vec<KilowattHourRate>,

    /// UTC hours of the day when force-charging strategies charge from the grid.
    #[serde(default)]
    pub force_charge_hours: Vec<usize>,
}

impl TryFrom<TariffFile> for Tariff {
    type Error = Error;

    fn try_from(file: TariffFile) -> Result<Self> {
        let import_rates = hourly_rates("import", file.import_rates)?;
        let export_rates = hourly_rates("export", file.export_rates)?;
        if let Some(hour) = file.force_charge_hours.iter().find(|hour| **hour >= 24) {
            bail!("force-charge hour must be within 0-23: {hour}");
        }
        Ok(Self { import_rates, export_rates, force_charge_hours: [false; 24] }
            .with_force_charge_hours(file.force_charge_hours))
    }
}

fn hourly_rates(kind: &str, rates: Vec<KilowattHourRate>) -> Result<[KilowattHourRate; 24]> {
    let rates: [KilowattHourRate; 24] = rates
        .try_into()
        .map_err(|rates: Vec<_>| anyhow!("expected 24 {kind} rates, got {}", rates.len()))?;
    ensure!(rates.iter().all(|rate| rate.is_finite()), "{kind} rates must be finite numbers");
    Ok(rates)
}

#[instrument(skip_all, name = "Loading the tariff…", fields(path = %path.as_ref().display()))]
pub fn read_from<P: AsRef<Path> + Debug>(path: P) -> Result<Tariff> {
    let path = path.as_ref();
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read `{}`", path.display()))?;
    let tariff = parse(&text)?;
    info!(
        n_force_charge_hours = tariff.force_charge_hours.iter().filter(|hour| **hour).count(),
        "Loaded",
    );
    Ok(tariff)
}

pub fn parse(text: &str) -> Result<Tariff> {
    let file: TariffFile = toml::from_str(text).context("failed to parse the tariff")?;
    Tariff::try_from(file)
}

use serde::Serialize;

use crate::quantity::rate::KilowattHourRate;

/// How many hours ahead a force-charge window is noticed.
pub const PRE_CHARGE_LOOKAHEAD_HOURS: usize = 4;

/// Hourly import and export rates along with the force-charge mask.
///
/// Hours are UTC hours of the day.
#[must_use]
#[derive(Clone, Debug, Serialize)]
pub struct Tariff {
    pub import_rates: [KilowattHourRate; 24],
    pub export_rates: [KilowattHourRate; 24],
    pub force_charge_hours: [bool; 24],
}

impl Tariff {
    pub const fn flat(import_rate: KilowattHourRate, export_rate: KilowattHourRate) -> Self {
        Self {
            import_rates: [import_rate; 24],
            export_rates: [export_rate; 24],
            force_charge_hours: [false; 24],
        }
    }

    pub fn with_force_charge_hours(mut self, hours: impl IntoIterator<Item = usize>) -> Self {
        for hour in hours {
            self.force_charge_hours[hour % 24] = true;
        }
        self
    }

    #[must_use]
    pub const fn import_rate(&self, hour: usize) -> KilowattHourRate {
        self.import_rates[hour]
    }

    #[must_use]
    pub const fn export_rate(&self, hour: usize) -> KilowattHourRate {
        self.export_rates[hour]
    }

    #[must_use]
    pub const fn is_force_charge_hour(&self, hour: usize) -> bool {
        self.force_charge_hours[hour]
    }

    #[must_use]
    pub fn has_force_charge_hours(&self) -> bool {
        self.force_charge_hours.contains(&true)
    }

    /// Whether a force-charge window opens within the next few hours, wrapping over midnight.
    #[must_use]
    pub fn is_pre_charge_hour(&self, hour: usize) -> bool {
        (1..=PRE_CHARGE_LOOKAHEAD_HOURS).any(|offset| self.force_charge_hours[(hour + offset) % 24])
    }

    pub fn rates(&self) -> impl Iterator<Item = KilowattHourRate> + '_ {
        self.import_rates.iter().chain(&self.export_rates).copied()
    }
}

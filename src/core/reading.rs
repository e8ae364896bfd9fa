use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use serde::Serialize;

use crate::{core::month::MonthKey, quantity::energy::KilowattHours};

/// Household energy over a single interval.
#[must_use]
#[derive(Copy, Clone, Debug, Serialize)]
pub struct IntervalReading {
    /// Interval start.
    pub timestamp: DateTime<Utc>,

    pub consumption: KilowattHours,
    pub generation: KilowattHours,
}

impl IntervalReading {
    pub const fn new(
        timestamp: DateTime<Utc>,
        consumption: KilowattHours,
        generation: KilowattHours,
    ) -> Self {
        Self { timestamp, consumption, generation }
    }

    /// Hour of the day, used to look up the tariff.
    #[must_use]
    pub fn hour(&self) -> usize {
        self.timestamp.hour() as usize
    }

    /// Month of the year, starting with 1.
    #[must_use]
    pub fn month(&self) -> u32 {
        self.timestamp.month()
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn month_key(&self) -> MonthKey {
        MonthKey::from(self.timestamp)
    }

    /// Consumption which the solar generation cannot cover on its own.
    pub fn net_consumption(&self) -> KilowattHours {
        (self.consumption - self.generation).max(KilowattHours::ZERO)
    }
}

use std::fmt::{Display, Formatter};

use comfy_table::Color;
use serde::{Deserialize, Serialize};

/// Battery control strategy.
#[derive(
    Debug, Hash, Ord, PartialOrd, Deserialize, Serialize, clap::ValueEnum, enumset::EnumSetType,
)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Charge on excess solar power, discharge to cover the household demand.
    SelfConsumption,

    /// Force charge on cheap hours, and empty the battery onto the grid in advance.
    ExportMaximiser,

    /// Export maximiser which holds its charge through the heating season.
    BalancedExportMaximiser,

    /// Force charge on cheap hours, and only ever discharge into the household.
    ImportMinimiser,

    /// Import minimiser which skips the force charge when the next day is sunny enough.
    HistoricalForecast,
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfConsumption => write!(f, "Self-consumption"),
            Self::ExportMaximiser => write!(f, "Export maximiser"),
            Self::BalancedExportMaximiser => write!(f, "Balanced export maximiser"),
            Self::ImportMinimiser => write!(f, "Import minimiser"),
            Self::HistoricalForecast => write!(f, "Historical forecast"),
        }
    }
}

impl Strategy {
    /// Whether the strategy charges from the grid during the force-charge hours.
    #[must_use]
    pub const fn is_force_charging(self) -> bool {
        !matches!(self, Self::SelfConsumption)
    }

    /// Whether the strategy frees up the battery before a force-charge window.
    #[must_use]
    pub const fn is_export_style(self) -> bool {
        matches!(self, Self::ExportMaximiser | Self::BalancedExportMaximiser)
    }

    /// Whether the strategy gates the force charge on the next day's solar generation.
    #[must_use]
    pub const fn uses_forecast(self) -> bool {
        matches!(self, Self::HistoricalForecast)
    }

    /// Whether the pre-emptive discharge is suppressed in the given month (1-based).
    ///
    /// November through February are the heating season.
    #[must_use]
    pub const fn holds_charge_in(self, month: u32) -> bool {
        matches!(self, Self::BalancedExportMaximiser) && matches!(month, 11 | 12 | 1 | 2)
    }

    pub const fn color(self) -> Color {
        match self {
            Self::SelfConsumption => Color::DarkYellow,
            Self::ExportMaximiser => Color::Blue,
            Self::BalancedExportMaximiser => Color::Cyan,
            Self::ImportMinimiser => Color::Green,
            Self::HistoricalForecast => Color::Magenta,
        }
    }
}

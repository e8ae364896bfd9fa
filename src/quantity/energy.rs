use std::{
    fmt::{Debug, Display, Formatter},
    ops::{Div, Mul},
};

use crate::quantity::{Quantity, cost::Cost, power::Kilowatts, rate::KilowattHourRate, time::Hours};

pub type KilowattHours = Quantity<1, 1, 0>;

impl KilowattHours {
    /// Anything at or below this is considered rounding noise.
    pub const ONE_WATT_HOUR: Self = Self(0.001);

    /// Whether the amount is large enough to act upon.
    #[must_use]
    pub fn is_significant(self) -> bool {
        self > Self::ONE_WATT_HOUR
    }
}

impl Display for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} kWh", self.0)
    }
}

impl Debug for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}kWh", self.0)
    }
}

impl Mul<KilowattHourRate> for KilowattHours {
    type Output = Cost;

    fn mul(self, rhs: KilowattHourRate) -> Self::Output {
        Quantity(self.0 * rhs.0)
    }
}

impl Div<Hours> for KilowattHours {
    type Output = Kilowatts;

    fn div(self, rhs: Hours) -> Self::Output {
        Quantity(self.0 / rhs.0)
    }
}

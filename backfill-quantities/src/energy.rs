use std::{
    fmt::{Debug, Display, Formatter},
    ops::Div,
};

use crate::{Quantity, power::Kilowatts, time::Hours};

pub type KilowattHours = Quantity<1, 1>;

impl Display for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} kWh", self.0)
    }
}

impl Debug for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}kWh", self.0)
    }
}

impl Div<Hours> for KilowattHours {
    type Output = Kilowatts;

    fn div(self, rhs: Hours) -> Self::Output {
        Quantity(self.0 / rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_half_hour_to_power() {
        let power = KilowattHours::from(0.1) / Hours::HALF_HOUR;
        assert_abs_diff_eq!(power.get(), 0.2);
    }
}

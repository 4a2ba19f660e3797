use std::fmt::{Debug, Display, Formatter};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Outdoor air temperature.
///
/// Not a [`crate::Quantity`]: temperatures are not additive the way energy is.
#[derive(
    Clone,
    Copy,
    Deserialize,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::From,
    derive_more::FromStr,
)]
#[from(f64, OrderedFloat<f64>)]
#[serde(transparent)]
#[must_use]
pub struct Celsius(pub OrderedFloat<f64>);

impl Celsius {
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0.0
    }

    /// Heating degrees of this temperature below the base temperature, never negative.
    #[must_use]
    pub fn degrees_below(self, base: Self) -> f64 {
        (base.0.0 - self.0.0).max(0.0)
    }

    /// Round to the specified number of decimal places.
    pub fn round_to(self, decimals: i32) -> Self {
        let factor = 10_f64.powi(decimals);
        Self(OrderedFloat((self.0.0 * factor).round() / factor))
    }
}

impl Display for Celsius {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} °C", self.0)
    }
}

impl Debug for Celsius {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}°C", self.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_degrees_below() {
        let base = Celsius::from(15.5);
        assert_abs_diff_eq!(Celsius::from(5.5).degrees_below(base), 10.0);
        assert_abs_diff_eq!(Celsius::from(20.0).degrees_below(base), 0.0);
    }

    #[test]
    fn test_round_to() {
        assert_abs_diff_eq!(Celsius::from(7.23456).round_to(2).get(), 7.23);
        assert_abs_diff_eq!(Celsius::from(-1.005).round_to(1).get(), -1.0);
    }
}

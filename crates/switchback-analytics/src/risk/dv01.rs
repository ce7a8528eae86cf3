//! DV01 (dollar value of a basis point).
//!
//! DV01 is the price change for a one basis point fall in yield, quoted per
//! 100 of face:
//!
//! ```text
//! DV01 = (P(y - h) - P(y + h)) / 2h × 0.0001
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price change per basis point, per 100 of face.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[repr(transparent)]
pub struct DV01(Decimal);

impl DV01 {
    /// Create a new DV01 value.
    #[must_use]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Get the DV01 value.
    #[must_use]
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Get the DV01 as f64.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    /// DV01 for a face amount other than 100.
    #[must_use]
    pub fn for_face(&self, face: f64) -> f64 {
        self.as_f64() * face / 100.0
    }
}

impl std::fmt::Display for DV01 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

impl From<Decimal> for DV01 {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl From<f64> for DV01 {
    fn from(f: f64) -> Self {
        Self(Decimal::from_f64_retain(f).unwrap_or(Decimal::ZERO))
    }
}

/// DV01 from prices bumped down and up by `bump` in yield.
#[must_use]
pub fn dv01_from_prices(price_down: f64, price_up: f64, bump: f64) -> DV01 {
    DV01::from((price_down - price_up) / (2.0 * bump) * 1e-4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_prices() {
        let dv01 = dv01_from_prices(100.045, 99.955, 1e-4);
        assert_relative_eq!(dv01.as_f64(), 0.045, epsilon = 1e-12);
    }

    #[test]
    fn test_bump_scaling() {
        // A 10bp bump still reports per basis point
        let dv01 = dv01_from_prices(100.45, 99.55, 1e-3);
        assert_relative_eq!(dv01.as_f64(), 0.045, epsilon = 1e-12);
    }

    #[test]
    fn test_for_face_and_display() {
        let dv01 = DV01::new(dec!(0.045));
        assert_relative_eq!(dv01.for_face(1_000_000.0), 450.0, epsilon = 1e-9);
        assert_eq!(dv01.to_string(), "0.045000");
    }
}

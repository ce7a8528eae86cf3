//! Parallel spread over a base curve.

use switchback_core::types::Date;

use crate::error::CurveResult;
use crate::traits::Curve;

/// A curve wrapper that adds a constant continuously compounded spread.
///
/// `DF_shifted(t) = DF_base(t) · exp(-spread · t)`
///
/// Z-spread, OAS and parallel curve bumps are all expressed through this
/// wrapper.
///
/// # Example
///
/// ```rust
/// use switchback_core::types::{Compounding, Date};
/// use switchback_curves::prelude::*;
///
/// let base = ZeroCurve::flat(Date::from_ymd(2025, 1, 1).unwrap(), 0.04, Compounding::Continuous).unwrap();
/// let shifted = ShiftedCurve::new(&base, 0.0050);
///
/// assert!(shifted.discount_factor(1.0).unwrap() < base.discount_factor(1.0).unwrap());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ShiftedCurve<'a, C: Curve + ?Sized> {
    base: &'a C,
    spread: f64,
}

impl<'a, C: Curve + ?Sized> ShiftedCurve<'a, C> {
    /// Creates a new shifted curve (spread as a decimal, 0.01 = 100bp).
    pub fn new(base: &'a C, spread: f64) -> Self {
        Self { base, spread }
    }

    /// Returns the spread applied to this curve.
    pub fn spread(&self) -> f64 {
        self.spread
    }

    /// Returns a reference to the base curve.
    pub fn base(&self) -> &C {
        self.base
    }
}

impl<C: Curve + ?Sized> Curve for ShiftedCurve<'_, C> {
    fn discount_factor(&self, t: f64) -> CurveResult<f64> {
        let base_df = self.base.discount_factor(t)?;
        Ok(base_df * (-self.spread * t).exp())
    }

    fn reference_date(&self) -> Date {
        self.base.reference_date()
    }
}

//! One-factor Hull-White model.
//!
//! ```text
//! dr = (θ(t) - a·r) dt + σ dW
//! ```
//!
//! `θ(t)` is never formed explicitly: the lattice fits it node by node, and
//! the closed forms below take the initial term structure from the curve.
//! Times are years from the curve's reference date.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use switchback_curves::Curve;

use crate::error::{AnalyticsError, AnalyticsResult};

/// Hull-White mean reversion and volatility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HullWhiteParams {
    mean_reversion: f64,
    volatility: f64,
}

impl Default for HullWhiteParams {
    fn default() -> Self {
        Self {
            mean_reversion: 0.03,
            volatility: 0.011,
        }
    }
}

/// Call or put on a zero-coupon bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Right to buy the bond at the strike.
    Call,
    /// Right to sell the bond at the strike.
    Put,
}

impl HullWhiteParams {
    /// Creates model parameters.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` unless both parameters are
    /// finite and strictly positive.
    pub fn new(mean_reversion: f64, volatility: f64) -> AnalyticsResult<Self> {
        if !(mean_reversion > 0.0 && mean_reversion.is_finite()) {
            return Err(AnalyticsError::configuration(format!(
                "mean reversion must be positive, got {mean_reversion}"
            )));
        }
        if !(volatility > 0.0 && volatility.is_finite()) {
            return Err(AnalyticsError::configuration(format!(
                "volatility must be positive, got {volatility}"
            )));
        }
        Ok(Self {
            mean_reversion,
            volatility,
        })
    }

    /// Mean reversion speed `a`.
    #[must_use]
    pub fn mean_reversion(&self) -> f64 {
        self.mean_reversion
    }

    /// Short-rate volatility `σ`.
    #[must_use]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// `B(t, T) = (1 - e^{-a(T-t)}) / a`.
    #[must_use]
    pub fn b(&self, t: f64, maturity: f64) -> f64 {
        let a = self.mean_reversion;
        (1.0 - (-a * (maturity - t)).exp()) / a
    }

    /// `A(t, T)` such that `P(t, T) = A(t, T)·exp(-B(t, T)·r(t))`.
    ///
    /// # Errors
    ///
    /// Propagates curve lookup failures.
    pub fn a(&self, curve: &dyn Curve, t: f64, maturity: f64) -> AnalyticsResult<f64> {
        let a = self.mean_reversion;
        let sigma = self.volatility;
        let p_t = curve.discount_factor(t)?;
        let p_maturity = curve.discount_factor(maturity)?;
        let forward = curve.instantaneous_forward(t)?;
        let b = self.b(t, maturity);
        let variance = sigma * sigma / (4.0 * a) * (1.0 - (-2.0 * a * t).exp()) * b * b;
        Ok(p_maturity / p_t * (b * forward - variance).exp())
    }

    /// Model price at `t` of a zero-coupon bond maturing at `maturity`,
    /// given the short rate `r` at `t`.
    ///
    /// # Errors
    ///
    /// Propagates curve lookup failures.
    pub fn bond_price(
        &self,
        curve: &dyn Curve,
        t: f64,
        maturity: f64,
        short_rate: f64,
    ) -> AnalyticsResult<f64> {
        Ok(self.a(curve, t, maturity)? * (-self.b(t, maturity) * short_rate).exp())
    }

    /// Price volatility of a bond maturing at `maturity` seen at `expiry`.
    #[must_use]
    pub fn bond_volatility(&self, expiry: f64, maturity: f64) -> f64 {
        let a = self.mean_reversion;
        self.volatility * ((1.0 - (-2.0 * a * expiry).exp()) / (2.0 * a)).sqrt()
            * self.b(expiry, maturity)
    }

    /// Today's value of an option expiring at `expiry` on a zero-coupon
    /// bond maturing at `maturity`, struck at `strike` per unit face.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` unless
    /// `0 <= expiry < maturity` and the strike is positive.
    pub fn zero_bond_option(
        &self,
        curve: &dyn Curve,
        kind: OptionKind,
        strike: f64,
        expiry: f64,
        maturity: f64,
    ) -> AnalyticsResult<f64> {
        if !(expiry >= 0.0 && maturity > expiry) {
            return Err(AnalyticsError::configuration(format!(
                "bond option needs 0 <= expiry < maturity, got {expiry} and {maturity}"
            )));
        }
        if strike <= 0.0 {
            return Err(AnalyticsError::configuration(format!(
                "bond option strike must be positive, got {strike}"
            )));
        }

        let p_expiry = curve.discount_factor(expiry)?;
        let p_maturity = curve.discount_factor(maturity)?;
        let sigma_p = self.bond_volatility(expiry, maturity);

        // Expired option: intrinsic value only
        if sigma_p <= 0.0 {
            let forward = p_maturity - strike * p_expiry;
            return Ok(match kind {
                OptionKind::Call => forward.max(0.0),
                OptionKind::Put => (-forward).max(0.0),
            });
        }

        let h = (p_maturity / (p_expiry * strike)).ln() / sigma_p + 0.5 * sigma_p;
        let n = standard_normal()?;
        Ok(match kind {
            OptionKind::Call => p_maturity * n.cdf(h) - strike * p_expiry * n.cdf(h - sigma_p),
            OptionKind::Put => strike * p_expiry * n.cdf(sigma_p - h) - p_maturity * n.cdf(-h),
        })
    }
}

/// The standard normal distribution.
pub(crate) fn standard_normal() -> AnalyticsResult<Normal> {
    Normal::new(0.0, 1.0)
        .map_err(|e| AnalyticsError::configuration(format!("standard normal: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use switchback_core::types::{Compounding, Date};
    use switchback_curves::ZeroCurve;

    fn curve() -> ZeroCurve {
        ZeroCurve::flat(Date::from_ymd(2025, 1, 2).unwrap(), 0.04, Compounding::Continuous)
            .unwrap()
    }

    #[test]
    fn test_rejects_non_positive_parameters() {
        assert!(HullWhiteParams::new(0.0, 0.01).is_err());
        assert!(HullWhiteParams::new(0.03, -0.01).is_err());
        assert!(HullWhiteParams::new(f64::NAN, 0.01).is_err());
        let params = HullWhiteParams::new(0.05, 0.01).unwrap();
        assert_relative_eq!(params.mean_reversion(), 0.05);
        assert_relative_eq!(params.volatility(), 0.01);
    }

    #[test]
    fn test_b_limits() {
        let params = HullWhiteParams::new(0.05, 0.01).unwrap();
        assert_relative_eq!(params.b(2.0, 2.0), 0.0);
        assert_relative_eq!(params.b(0.0, 1.0), (1.0 - (-0.05_f64).exp()) / 0.05);
    }

    #[test]
    fn test_bond_price_at_forward_rate_reprices_curve() {
        let curve = curve();
        let params = HullWhiteParams::default();
        // At t = 0 the short rate is the instantaneous forward
        let r0 = curve.instantaneous_forward(0.0).unwrap();
        let price = params.bond_price(&curve, 0.0, 5.0, r0).unwrap();
        assert_relative_eq!(price, curve.discount_factor(5.0).unwrap(), max_relative = 1e-9);
    }

    #[test]
    fn test_put_call_parity() {
        let curve = curve();
        let params = HullWhiteParams::new(0.05, 0.012).unwrap();
        let strike = 0.9;
        let call = params
            .zero_bond_option(&curve, OptionKind::Call, strike, 2.0, 5.0)
            .unwrap();
        let put = params
            .zero_bond_option(&curve, OptionKind::Put, strike, 2.0, 5.0)
            .unwrap();
        let forward =
            curve.discount_factor(5.0).unwrap() - strike * curve.discount_factor(2.0).unwrap();
        assert_relative_eq!(call - put, forward, epsilon = 1e-12);
        assert!(call > 0.0 && put > 0.0);
    }

    #[test]
    fn test_option_value_increases_with_volatility() {
        let curve = curve();
        let atm = curve.discount_factor(5.0).unwrap() / curve.discount_factor(2.0).unwrap();
        let low = HullWhiteParams::new(0.05, 0.005).unwrap();
        let high = HullWhiteParams::new(0.05, 0.02).unwrap();
        let p_low = low.zero_bond_option(&curve, OptionKind::Put, atm, 2.0, 5.0).unwrap();
        let p_high = high.zero_bond_option(&curve, OptionKind::Put, atm, 2.0, 5.0).unwrap();
        assert!(p_high > p_low);
    }

    #[test]
    fn test_invalid_option_dates() {
        let params = HullWhiteParams::default();
        assert!(params
            .zero_bond_option(&curve(), OptionKind::Call, 0.9, 5.0, 2.0)
            .is_err());
    }
}

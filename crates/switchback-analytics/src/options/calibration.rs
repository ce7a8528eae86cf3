//! Hull-White calibration to at-the-money swaption normal volatilities.
//!
//! Each quote is turned into a market premium with the Bachelier formula and
//! compared against the model premium from Jamshidian's decomposition of the
//! payer swaption into puts on zero-coupon bonds. `(a, σ)` minimize the sum
//! of squared relative premium errors by Levenberg-Marquardt.
//!
//! Swaptions are quoted on a fixed leg paying annually with ACT/360 accrual
//! and start at expiry; all times are years from the curve reference date.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, ContinuousCDF};

use switchback_curves::Curve;
use switchback_math::optimization::{levenberg_marquardt, OptimizationConfig};
use switchback_math::solvers::{brent, expand_bracket, SolverConfig};

use super::hull_white::{standard_normal, HullWhiteParams, OptionKind};
use crate::config::EngineConfig;
use crate::error::{AnalyticsError, AnalyticsResult};

/// Floor applied to both parameters during the fit.
pub const PARAMETER_FLOOR: f64 = 1e-6;

/// Residual assigned to a quote the model cannot price.
const PENALTY_RESIDUAL: f64 = 1e3;

/// Fixed-leg accrual scale from curve time (ACT/365F) to ACT/360.
const ACT_360_SCALE: f64 = 365.0 / 360.0;

/// An at-the-money swaption quote.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwaptionQuote {
    /// Option expiry in years.
    pub expiry: f64,
    /// Underlying swap tenor in years.
    pub tenor: f64,
    /// Normal (Bachelier) volatility, absolute.
    pub normal_vol: f64,
}

impl SwaptionQuote {
    /// Creates a quote.
    #[must_use]
    pub fn new(expiry: f64, tenor: f64, normal_vol: f64) -> Self {
        Self {
            expiry,
            tenor,
            normal_vol,
        }
    }

    fn check(&self) -> AnalyticsResult<()> {
        let ok = self.expiry > 0.0
            && self.tenor > 0.0
            && self.normal_vol > 0.0
            && self.expiry.is_finite()
            && self.tenor.is_finite()
            && self.normal_vol.is_finite();
        if ok {
            Ok(())
        } else {
            Err(AnalyticsError::calibration(format!(
                "invalid swaption quote {}x{} at vol {}",
                self.expiry, self.tenor, self.normal_vol
            )))
        }
    }
}

/// Fixed leg of the swap underlying a swaption.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapLeg {
    /// Swap start (option expiry).
    pub start: f64,
    /// Payment times.
    pub payment_times: Vec<f64>,
    /// ACT/360 accrual of each payment.
    pub accruals: Vec<f64>,
    /// Annuity `Σ δₖ P(Tₖ)`.
    pub annuity: f64,
    /// Par swap rate `(P(T₀) - P(Tₙ)) / annuity`.
    pub forward_rate: f64,
}

impl SwapLeg {
    /// Annual fixed leg starting at `expiry` and running `tenor` years.
    ///
    /// A fractional tenor ends on a short final period.
    ///
    /// # Errors
    ///
    /// Propagates curve lookup failures; returns
    /// `AnalyticsError::Calibration` for a non-positive tenor or annuity.
    pub fn new(curve: &dyn Curve, expiry: f64, tenor: f64) -> AnalyticsResult<Self> {
        if !(tenor > 0.0 && expiry >= 0.0) {
            return Err(AnalyticsError::calibration(format!(
                "swap needs positive tenor and expiry, got {expiry}x{tenor}"
            )));
        }
        let periods = tenor.ceil() as usize;
        let payment_times: Vec<f64> = (1..=periods)
            .map(|k| expiry + (k as f64).min(tenor))
            .collect();

        let mut accruals = Vec::with_capacity(periods);
        let mut annuity = 0.0;
        let mut previous = expiry;
        for &t in &payment_times {
            let accrual = (t - previous) * ACT_360_SCALE;
            annuity += accrual * curve.discount_factor(t)?;
            accruals.push(accrual);
            previous = t;
        }
        if annuity <= 0.0 {
            return Err(AnalyticsError::calibration(format!(
                "non-positive annuity for {expiry}x{tenor}"
            )));
        }

        let end = payment_times.last().copied().unwrap_or(expiry);
        let forward_rate =
            (curve.discount_factor(expiry)? - curve.discount_factor(end)?) / annuity;

        Ok(Self {
            start: expiry,
            payment_times,
            accruals,
            annuity,
            forward_rate,
        })
    }
}

/// Bachelier payer swaption premium.
///
/// # Errors
///
/// Returns `AnalyticsError::Configuration` if the normal distribution cannot
/// be built.
pub fn bachelier_payer(
    forward: f64,
    strike: f64,
    normal_vol: f64,
    expiry: f64,
    annuity: f64,
) -> AnalyticsResult<f64> {
    let stdev = normal_vol * expiry.max(0.0).sqrt();
    let moneyness = forward - strike;
    if stdev <= 0.0 {
        return Ok(annuity * moneyness.max(0.0));
    }
    let n = standard_normal()?;
    let d = moneyness / stdev;
    Ok(annuity * (moneyness * n.cdf(d) + stdev * n.pdf(d)))
}

/// Normal volatility at which an ATM swaption on `leg` is worth `premium`.
#[must_use]
pub fn atm_normal_vol(leg: &SwapLeg, premium: f64) -> f64 {
    premium / (leg.annuity * (leg.start / (2.0 * PI)).sqrt())
}

/// Model payer swaption premium by Jamshidian's decomposition.
///
/// # Errors
///
/// Returns `AnalyticsError::Numerical` if the critical short rate cannot be
/// bracketed, and propagates curve lookup failures.
pub fn jamshidian_payer(
    params: &HullWhiteParams,
    curve: &dyn Curve,
    leg: &SwapLeg,
    strike: f64,
) -> AnalyticsResult<f64> {
    if leg.payment_times.is_empty() || leg.payment_times.len() != leg.accruals.len() {
        return Err(AnalyticsError::calibration("swap leg has no consistent payments"));
    }
    let expiry = leg.start;
    let last = leg.payment_times.len() - 1;
    let coupons: Vec<f64> = leg
        .accruals
        .iter()
        .enumerate()
        .map(|(k, accrual)| strike * accrual + if k == last { 1.0 } else { 0.0 })
        .collect();
    let a_factors = leg
        .payment_times
        .iter()
        .map(|&t| params.a(curve, expiry, t))
        .collect::<AnalyticsResult<Vec<f64>>>()?;
    let b_factors: Vec<f64> = leg.payment_times.iter().map(|&t| params.b(expiry, t)).collect();

    let coupon_bond = |r: f64| -> f64 {
        coupons
            .iter()
            .zip(&a_factors)
            .zip(&b_factors)
            .map(|((c, a), b)| c * a * (-b * r).exp())
            .sum::<f64>()
            - 1.0
    };

    let solver = SolverConfig::new(1e-14, 200);
    let (lo, hi) = expand_bracket(&coupon_bond, -0.1, 0.2, f64::NEG_INFINITY, 30)?;
    let critical_rate = brent(&coupon_bond, lo, hi, &solver)?.root;

    let mut premium = 0.0;
    for ((coupon, (a, b)), &t) in coupons
        .iter()
        .zip(a_factors.iter().zip(&b_factors))
        .zip(&leg.payment_times)
    {
        let bond_strike = a * (-b * critical_rate).exp();
        premium +=
            coupon * params.zero_bond_option(curve, OptionKind::Put, bond_strike, expiry, t)?;
    }
    Ok(premium)
}

/// Outcome of a calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Fitted parameters.
    pub params: HullWhiteParams,
    /// Relative premium error per quote, `(model - market) / market`.
    pub errors: Vec<f64>,
    /// Root mean square of `errors`.
    pub rms: f64,
    /// Optimizer iterations used.
    pub iterations: u32,
}

/// Fits Hull-White parameters to a swaption volatility surface.
pub struct HullWhiteCalibrator<'a> {
    curve: &'a dyn Curve,
    initial: HullWhiteParams,
    config: OptimizationConfig,
}

impl fmt::Debug for HullWhiteCalibrator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HullWhiteCalibrator")
            .field("curve_reference", &self.curve.reference_date())
            .field("initial", &self.initial)
            .field("config", &self.config)
            .finish()
    }
}

impl<'a> HullWhiteCalibrator<'a> {
    /// Creates a calibrator on `curve` with the engine defaults.
    #[must_use]
    pub fn new(curve: &'a dyn Curve) -> Self {
        Self::from_config(curve, &EngineConfig::default())
    }

    /// Creates a calibrator taking its starting point and optimizer settings
    /// from `config`.
    #[must_use]
    pub fn from_config(curve: &'a dyn Curve, config: &EngineConfig) -> Self {
        Self {
            curve,
            initial: HullWhiteParams::new(config.mean_reversion, config.volatility)
                .unwrap_or_default(),
            config: config.calibration_config(),
        }
    }

    /// Sets the starting parameters.
    #[must_use]
    pub fn with_initial(mut self, initial: HullWhiteParams) -> Self {
        self.initial = initial;
        self
    }

    /// Calibrates to `quotes`.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Calibration` for an empty or invalid quote
    /// set, when the optimizer does not converge, or when a fitted parameter
    /// sits on its floor.
    pub fn calibrate(&self, quotes: &[SwaptionQuote]) -> AnalyticsResult<CalibrationResult> {
        if quotes.is_empty() {
            return Err(AnalyticsError::calibration("no swaption quotes"));
        }

        let mut targets = Vec::with_capacity(quotes.len());
        for quote in quotes {
            quote.check()?;
            let leg = SwapLeg::new(self.curve, quote.expiry, quote.tenor)?;
            let market = bachelier_payer(
                leg.forward_rate,
                leg.forward_rate,
                quote.normal_vol,
                quote.expiry,
                leg.annuity,
            )?;
            targets.push((leg, market));
        }

        let residuals = |p: &[f64]| -> Vec<f64> {
            let Ok(params) = HullWhiteParams::new(p[0], p[1]) else {
                return vec![PENALTY_RESIDUAL; targets.len()];
            };
            targets
                .iter()
                .map(|(leg, market)| {
                    jamshidian_payer(&params, self.curve, leg, leg.forward_rate)
                        .map_or(PENALTY_RESIDUAL, |model| (model - market) / market)
                })
                .collect()
        };

        let config = self
            .config
            .clone()
            .with_lower_bounds(vec![PARAMETER_FLOOR, PARAMETER_FLOOR]);
        let initial = [self.initial.mean_reversion(), self.initial.volatility()];
        let fit = levenberg_marquardt(residuals, &initial, &config)
            .map_err(|e| AnalyticsError::calibration(format!("optimizer failed: {e}")))?;

        let rms = (fit.residuals.iter().map(|r| r * r).sum::<f64>()
            / fit.residuals.len() as f64)
            .sqrt();
        if !fit.converged {
            return Err(AnalyticsError::calibration(format!(
                "no convergence after {} iterations, rms error {rms:.3e}",
                fit.iterations
            )));
        }
        if let Some(at_floor) = fit.parameters.iter().position(|p| *p <= PARAMETER_FLOOR) {
            let name = if at_floor == 0 { "mean reversion" } else { "volatility" };
            return Err(AnalyticsError::calibration(format!(
                "{name} pinned at its floor {PARAMETER_FLOOR}"
            )));
        }

        let params = HullWhiteParams::new(fit.parameters[0], fit.parameters[1])?;
        tracing::debug!(
            mean_reversion = params.mean_reversion(),
            volatility = params.volatility(),
            rms,
            iterations = fit.iterations,
            "hull-white calibrated"
        );

        Ok(CalibrationResult {
            params,
            errors: fit.residuals,
            rms,
            iterations: fit.iterations,
        })
    }
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

    fn synthetic_surface(curve: &dyn Curve, params: &HullWhiteParams) -> Vec<SwaptionQuote> {
        let mut quotes = Vec::new();
        for expiry in [1.0, 2.0, 3.0, 5.0] {
            for tenor in [2.0, 5.0, 10.0] {
                let leg = SwapLeg::new(curve, expiry, tenor).unwrap();
                let premium = jamshidian_payer(params, curve, &leg, leg.forward_rate).unwrap();
                quotes.push(SwaptionQuote::new(expiry, tenor, atm_normal_vol(&leg, premium)));
            }
        }
        quotes
    }

    #[test]
    fn test_swap_leg_annuity() {
        let curve = curve();
        let leg = SwapLeg::new(&curve, 1.0, 2.5).unwrap();
        assert_eq!(leg.payment_times, vec![2.0, 3.0, 3.5]);
        assert_relative_eq!(leg.accruals[2], 0.5 * 365.0 / 360.0, epsilon = 1e-12);
        let par_value = leg.forward_rate * leg.annuity + curve.discount_factor(3.5).unwrap();
        assert_relative_eq!(par_value, curve.discount_factor(1.0).unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn test_bachelier_atm_closed_form() {
        let premium = bachelier_payer(0.03, 0.03, 0.01, 4.0, 3.5).unwrap();
        assert_relative_eq!(premium, 3.5 * 0.01 * 2.0 / (2.0 * PI).sqrt(), epsilon = 1e-14);
        assert_relative_eq!(bachelier_payer(0.04, 0.03, 0.0, 1.0, 2.0).unwrap(), 0.02);
    }

    #[test]
    fn test_jamshidian_single_period_matches_bond_put() {
        let curve = curve();
        let params = HullWhiteParams::new(0.05, 0.01).unwrap();
        let leg = SwapLeg::new(&curve, 2.0, 1.0).unwrap();
        let strike = 0.04;
        let premium = jamshidian_payer(&params, &curve, &leg, strike).unwrap();
        let coupon = 1.0 + strike * leg.accruals[0];
        let put = params
            .zero_bond_option(&curve, OptionKind::Put, 1.0 / coupon, 2.0, 3.0)
            .unwrap();
        assert_relative_eq!(premium, coupon * put, max_relative = 1e-10);
    }

    #[test]
    fn test_recovers_synthetic_parameters() {
        let curve = curve();
        let truth = HullWhiteParams::new(0.05, 0.01).unwrap();
        let quotes = synthetic_surface(&curve, &truth);

        let result = HullWhiteCalibrator::new(&curve).calibrate(&quotes).unwrap();
        assert_relative_eq!(result.params.mean_reversion(), 0.05, max_relative = 1e-3);
        assert_relative_eq!(result.params.volatility(), 0.01, max_relative = 1e-3);
        assert!(result.rms < 1e-6);
        assert_eq!(result.errors.len(), quotes.len());
    }

    #[test]
    fn test_rejects_empty_and_invalid_quotes() {
        let curve = curve();
        let calibrator = HullWhiteCalibrator::new(&curve);
        assert!(matches!(
            calibrator.calibrate(&[]),
            Err(AnalyticsError::Calibration { .. })
        ));
        assert!(calibrator
            .calibrate(&[SwaptionQuote::new(1.0, 5.0, -0.01)])
            .is_err());
    }
}

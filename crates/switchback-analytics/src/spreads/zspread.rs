//! Z-spread (zero-volatility spread) calculator.
//!
//! The Z-spread is the constant continuously compounded shift to the
//! discount curve that reprices the cashflows to the market dirty price:
//!
//! ```text
//! Dirty Price = Σ CF_i × DF(t_i) × exp(-Z × t_i) / (DF(t_s) × exp(-Z × t_s))
//! ```

use switchback_bonds::cashflows::Cashflow;
use switchback_core::types::Date;
use switchback_curves::{Curve, ShiftedCurve};
use switchback_math::solvers::{brent, expand_bracket, SolverConfig};

use crate::config::EngineConfig;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::pricing::present_value;
use crate::risk::{dv01_from_prices, DV01};

/// One basis point.
const BASIS_POINT: f64 = 1e-4;

/// Z-spread calculator over a discount curve.
pub struct ZSpreadCalculator<'a> {
    /// Reference to the spot/zero curve.
    curve: &'a dyn Curve,
    /// Solver configuration.
    config: SolverConfig,
    bracket: (f64, f64),
    max_expansions: u32,
}

impl std::fmt::Debug for ZSpreadCalculator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZSpreadCalculator")
            .field("config", &self.config)
            .field("bracket", &self.bracket)
            .finish_non_exhaustive()
    }
}

impl<'a> ZSpreadCalculator<'a> {
    /// Creates a calculator with the engine defaults.
    #[must_use]
    pub fn new(curve: &'a dyn Curve) -> Self {
        Self::from_config(curve, &EngineConfig::default())
    }

    /// Creates a calculator with the solver settings of `config`.
    #[must_use]
    pub fn from_config(curve: &'a dyn Curve, config: &EngineConfig) -> Self {
        Self {
            curve,
            config: config.solver_config(),
            bracket: config.spread_bracket,
            max_expansions: config.max_bracket_expansions,
        }
    }

    /// Sets the solver tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config = SolverConfig::new(tolerance, self.config.max_iterations);
        self
    }

    /// Sets the maximum iterations for the solver.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.config = SolverConfig::new(self.config.tolerance, max_iterations);
        self
    }

    /// Dirty price of the cashflows at settlement with the curve shifted by
    /// `z_spread` (a decimal, 0.005 = 50bp).
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Interpolation` if the curve cannot be
    /// evaluated at a payment date.
    pub fn price_with_spread(
        &self,
        cashflows: &[Cashflow],
        settlement: Date,
        z_spread: f64,
    ) -> AnalyticsResult<f64> {
        present_value(cashflows, &ShiftedCurve::new(self.curve, z_spread), settlement)
    }

    /// Solves for the Z-spread that reprices the cashflows to `dirty_price`.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` when no cashflow remains on
    /// or after settlement, `AnalyticsError::Numerical` when the spread
    /// cannot be bracketed or the solver does not converge, and
    /// curve errors from the unshifted valuation.
    pub fn calculate(
        &self,
        cashflows: &[Cashflow],
        settlement: Date,
        dirty_price: f64,
    ) -> AnalyticsResult<f64> {
        if !cashflows.iter().any(|cf| cf.date > settlement) {
            return Err(AnalyticsError::configuration(format!(
                "no cashflows after settlement {settlement}"
            )));
        }
        if !(dirty_price > 0.0 && dirty_price.is_finite()) {
            return Err(AnalyticsError::configuration(format!(
                "target price must be positive, got {dirty_price}"
            )));
        }

        // Curve failures surface here; the shift itself cannot fail
        self.price_with_spread(cashflows, settlement, 0.0)?;

        let objective = |z: f64| {
            self.price_with_spread(cashflows, settlement, z)
                .map_or(f64::NAN, |pv| pv - dirty_price)
        };

        let (lo, hi) = self.bracket;
        let bracket = expand_bracket(&objective, lo, hi, f64::NEG_INFINITY, self.max_expansions)?;
        let result = brent(&objective, bracket.0, bracket.1, &self.config).map_err(|e| {
            match AnalyticsError::from(e) {
                AnalyticsError::Numerical {
                    reason,
                    iterations,
                    residual,
                    ..
                } => AnalyticsError::Numerical {
                    reason: format!("Z-spread solve: {reason}"),
                    iterations,
                    residual,
                    bracket: Some(bracket),
                },
                other => other,
            }
        })?;

        tracing::debug!(
            z_spread = result.root,
            iterations = result.iterations,
            "Z-spread solved"
        );
        Ok(result.root)
    }

    /// Price change per basis point of Z-spread, per 100 of face.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Interpolation` if the curve cannot be
    /// evaluated.
    pub fn spread_dv01(
        &self,
        cashflows: &[Cashflow],
        settlement: Date,
        z_spread: f64,
    ) -> AnalyticsResult<DV01> {
        let down = self.price_with_spread(cashflows, settlement, z_spread - BASIS_POINT)?;
        let up = self.price_with_spread(cashflows, settlement, z_spread + BASIS_POINT)?;
        Ok(dv01_from_prices(down, up, BASIS_POINT))
    }
}

/// Z-spread of `cashflows` over `curve` at `dirty_price`.
///
/// # Errors
///
/// See [`ZSpreadCalculator::calculate`].
pub fn z_spread(
    cashflows: &[Cashflow],
    curve: &dyn Curve,
    settlement: Date,
    dirty_price: f64,
    config: &EngineConfig,
) -> AnalyticsResult<f64> {
    ZSpreadCalculator::from_config(curve, config).calculate(cashflows, settlement, dirty_price)
}

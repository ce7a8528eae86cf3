//! Short-rate modelling for bonds with embedded calls.
//!
//! - [`HullWhiteParams`]: the one-factor Hull-White model and its
//!   zero-coupon bond option formulas
//! - [`TrinomialLattice`]: a trinomial tree fitted to the discount curve,
//!   used by the OAS engine for backward induction
//! - [`HullWhiteCalibrator`]: fits `(a, σ)` to ATM swaption normal vols

mod calibration;
mod hull_white;
mod lattice;

pub use calibration::{
    atm_normal_vol, bachelier_payer, jamshidian_payer, CalibrationResult, HullWhiteCalibrator,
    SwapLeg, SwaptionQuote, PARAMETER_FLOOR,
};
pub use hull_white::{HullWhiteParams, OptionKind};
pub use lattice::TrinomialLattice;

use switchback_core::types::Date;
use switchback_curves::Curve;

use crate::error::AnalyticsResult;

/// A short-rate model that can build a lattice fitted to a curve.
pub trait ShortRateModel: Send + Sync {
    /// Builds a lattice of `steps` periods over `horizon` years from
    /// `origin`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lattice geometry is invalid or the curve
    /// cannot be read.
    fn build_lattice(
        &self,
        curve: &dyn Curve,
        origin: Date,
        horizon: f64,
        steps: usize,
    ) -> AnalyticsResult<TrinomialLattice>;

    /// Mean reversion speed.
    fn mean_reversion(&self) -> f64;

    /// Short-rate volatility.
    fn volatility(&self) -> f64;

    /// Model name.
    fn name(&self) -> &'static str;
}

impl ShortRateModel for HullWhiteParams {
    fn build_lattice(
        &self,
        curve: &dyn Curve,
        origin: Date,
        horizon: f64,
        steps: usize,
    ) -> AnalyticsResult<TrinomialLattice> {
        TrinomialLattice::build(*self, curve, origin, horizon, steps)
    }

    fn mean_reversion(&self) -> f64 {
        HullWhiteParams::mean_reversion(self)
    }

    fn volatility(&self) -> f64 {
        HullWhiteParams::volatility(self)
    }

    fn name(&self) -> &'static str {
        "Hull-White"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_name_and_parameters() {
        let model: &dyn ShortRateModel = &HullWhiteParams::default();
        assert_eq!(model.name(), "Hull-White");
        assert!((model.mean_reversion() - 0.03).abs() < 1e-15);
        assert!((model.volatility() - 0.011).abs() < 1e-15);
    }
}

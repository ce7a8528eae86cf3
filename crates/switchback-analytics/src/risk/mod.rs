//! Yield risk measures.
//!
//! Duration, convexity and DV01 come from symmetric finite differences of
//! the closed-form yield pricer, never from re-solving the yield. Projected
//! floating coupons are held fixed under the bump. Option-adjusted
//! (effective) measures live with the OAS engine in
//! [`crate::spreads::OasCalculator`].

mod dv01;

pub use dv01::{dv01_from_prices, DV01};

use serde::{Deserialize, Serialize};

use switchback_bonds::cashflows::Cashflow;
use switchback_core::types::{Compounding, Date};

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::pricing::YieldConvention;
use crate::yields::price_from_yield;

/// Standard risk bump, one basis point.
pub const DEFAULT_BUMP_SIZE: f64 = 1e-4;

/// Yield risk of one cashflow set at one yield.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMeasures {
    /// Yield the measures were taken at.
    pub yield_value: f64,
    /// Dirty price at that yield, per 100.
    pub dirty_price: f64,
    /// Modified duration.
    pub modified_duration: f64,
    /// Macaulay duration.
    pub macaulay_duration: f64,
    /// Convexity.
    pub convexity: f64,
    /// Price change per basis point, per 100 of face.
    pub dv01: DV01,
}

struct BumpedPrices {
    base: f64,
    down: f64,
    up: f64,
    bump: f64,
}

fn bumped_prices(
    cashflows: &[Cashflow],
    settlement: Date,
    y: f64,
    convention: &YieldConvention,
    bump: f64,
) -> AnalyticsResult<BumpedPrices> {
    if !(bump > 0.0 && bump.is_finite()) {
        return Err(AnalyticsError::configuration(format!(
            "risk bump must be positive, got {bump}"
        )));
    }
    let base = price_from_yield(cashflows, settlement, y, convention);
    if !(base > 0.0 && base.is_finite()) {
        return Err(AnalyticsError::configuration(format!(
            "price at yield {y} is not positive: {base}"
        )));
    }
    Ok(BumpedPrices {
        base,
        down: price_from_yield(cashflows, settlement, y - bump, convention),
        up: price_from_yield(cashflows, settlement, y + bump, convention),
        bump,
    })
}

impl BumpedPrices {
    fn modified_duration(&self) -> f64 {
        (self.down - self.up) / (2.0 * self.base * self.bump)
    }

    fn convexity(&self) -> f64 {
        (self.down + self.up - 2.0 * self.base) / (self.base * self.bump * self.bump)
    }

    fn dv01(&self) -> DV01 {
        dv01_from_prices(self.down, self.up, self.bump)
    }
}

/// Modified duration at yield `y`.
///
/// # Errors
///
/// Returns `AnalyticsError::Configuration` for a non-positive bump or price.
pub fn duration(
    cashflows: &[Cashflow],
    settlement: Date,
    y: f64,
    convention: &YieldConvention,
    bump: f64,
) -> AnalyticsResult<f64> {
    Ok(bumped_prices(cashflows, settlement, y, convention, bump)?.modified_duration())
}

/// Convexity at yield `y`.
///
/// # Errors
///
/// Returns `AnalyticsError::Configuration` for a non-positive bump or price.
pub fn convexity(
    cashflows: &[Cashflow],
    settlement: Date,
    y: f64,
    convention: &YieldConvention,
    bump: f64,
) -> AnalyticsResult<f64> {
    Ok(bumped_prices(cashflows, settlement, y, convention, bump)?.convexity())
}

/// DV01 per 100 of face at yield `y`.
///
/// # Errors
///
/// Returns `AnalyticsError::Configuration` for a non-positive bump or price.
pub fn dv01(
    cashflows: &[Cashflow],
    settlement: Date,
    y: f64,
    convention: &YieldConvention,
    bump: f64,
) -> AnalyticsResult<DV01> {
    Ok(bumped_prices(cashflows, settlement, y, convention, bump)?.dv01())
}

/// Macaulay duration from modified duration.
///
/// `modified × (1 + y/f)` under periodic compounding; continuous
/// compounding has no distinction between the two.
#[must_use]
pub fn macaulay_from_modified(modified: f64, y: f64, compounding: Compounding) -> f64 {
    match compounding.periods_per_year() {
        Some(f) => modified * (1.0 + y / f64::from(f)),
        None => modified,
    }
}

/// Every yield risk measure at `y` from one set of bumped prices.
///
/// # Errors
///
/// Returns `AnalyticsError::Configuration` for a non-positive bump or price.
pub fn risk_measures(
    cashflows: &[Cashflow],
    settlement: Date,
    y: f64,
    convention: &YieldConvention,
    bump: f64,
) -> AnalyticsResult<RiskMeasures> {
    let prices = bumped_prices(cashflows, settlement, y, convention, bump)?;
    let modified = prices.modified_duration();
    Ok(RiskMeasures {
        yield_value: y,
        dirty_price: prices.base,
        modified_duration: modified,
        macaulay_duration: macaulay_from_modified(modified, y, convention.compounding),
        convexity: prices.convexity(),
        dv01: prices.dv01(),
    })
}

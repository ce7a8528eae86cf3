//! Closed-form yield pricer and its inverse.

use serde::{Deserialize, Serialize};

use switchback_bonds::cashflows::Cashflow;
use switchback_core::types::{Compounding, Date};
use switchback_math::solvers::{expand_bracket, hybrid};

use crate::config::EngineConfig;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::pricing::YieldConvention;

/// Distance kept from the edge of the compounding domain.
const DOMAIN_MARGIN: f64 = 1e-6;

/// Outcome of a yield solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldResult {
    /// The yield, annualized under the convention's compounding.
    pub yield_value: f64,
    /// Solver iterations used.
    pub iterations: u32,
    /// Price residual at the root.
    pub residual: f64,
}

/// Dirty price of the cashflows paid after `settlement` at yield `y`.
///
/// Cashflow times are year fractions from settlement under the
/// convention's day count.
#[must_use]
pub fn price_from_yield(
    cashflows: &[Cashflow],
    settlement: Date,
    y: f64,
    convention: &YieldConvention,
) -> f64 {
    remaining(cashflows, settlement, convention)
        .map(|(t, amount)| amount * discount(convention.compounding, y, t).0)
        .sum()
}

/// Analytic derivative of [`price_from_yield`] with respect to `y`.
#[must_use]
pub fn dprice_dyield(
    cashflows: &[Cashflow],
    settlement: Date,
    y: f64,
    convention: &YieldConvention,
) -> f64 {
    remaining(cashflows, settlement, convention)
        .map(|(t, amount)| amount * discount(convention.compounding, y, t).1)
        .sum()
}

/// Solves for the yield that reprices the cashflows to `dirty_price`.
///
/// The bracket starts at the configured yield bracket, clipped to the
/// compounding domain, and expands geometrically up to the configured cap.
/// Newton iterations run inside the bracket with Brent as the fallback.
///
/// # Errors
///
/// Returns `AnalyticsError::Numerical` carrying the last bracket when no
/// sign change is found, or when the solver does not converge, and
/// `AnalyticsError::Configuration` when no cashflow remains after
/// settlement.
pub fn yield_from_price(
    cashflows: &[Cashflow],
    settlement: Date,
    dirty_price: f64,
    convention: &YieldConvention,
    config: &EngineConfig,
) -> AnalyticsResult<YieldResult> {
    let horizon = remaining(cashflows, settlement, convention)
        .map(|(t, _)| t)
        .fold(0.0_f64, f64::max);
    if horizon <= 0.0 {
        return Err(AnalyticsError::configuration(format!(
            "no cashflows after settlement {settlement}"
        )));
    }
    if !dirty_price.is_finite() || dirty_price <= 0.0 {
        return Err(AnalyticsError::configuration(format!(
            "target price must be positive, got {dirty_price}"
        )));
    }

    let floor = domain_floor(convention.compounding, horizon);
    let (lo, hi) = config.yield_bracket;
    let lo = lo.max(floor);
    let hi = hi.max(lo + 0.01);

    let objective = |y: f64| price_from_yield(cashflows, settlement, y, convention) - dirty_price;
    let derivative = |y: f64| dprice_dyield(cashflows, settlement, y, convention);

    let bracket = expand_bracket(&objective, lo, hi, floor, config.max_bracket_expansions)?;
    let guess = if (bracket.0..=bracket.1).contains(&0.05) {
        0.05
    } else {
        0.5 * (bracket.0 + bracket.1)
    };

    let result = hybrid(
        objective,
        derivative,
        guess,
        Some(bracket),
        &config.solver_config(),
    )
    .map_err(|e| match AnalyticsError::from(e) {
        AnalyticsError::Numerical {
            reason,
            iterations,
            residual,
            ..
        } => AnalyticsError::Numerical {
            reason: format!("yield solve: {reason}"),
            iterations,
            residual,
            bracket: Some(bracket),
        },
        other => other,
    })?;

    tracing::debug!(
        yield_value = result.root,
        iterations = result.iterations,
        residual = result.residual,
        "yield solved"
    );

    Ok(YieldResult {
        yield_value: result.root,
        iterations: result.iterations,
        residual: result.residual,
    })
}

/// Lowest yield at which every discount factor out to `horizon` is finite
/// and positive.
fn domain_floor(compounding: Compounding, horizon: f64) -> f64 {
    match compounding {
        Compounding::Continuous => f64::NEG_INFINITY,
        Compounding::Simple => -1.0 / horizon.max(1.0) + DOMAIN_MARGIN,
        periodic => periodic.rate_floor() + DOMAIN_MARGIN,
    }
}

fn remaining<'a>(
    cashflows: &'a [Cashflow],
    settlement: Date,
    convention: &'a YieldConvention,
) -> impl Iterator<Item = (f64, f64)> + 'a {
    cashflows
        .iter()
        .filter(move |cf| cf.date > settlement)
        .map(move |cf| (convention.time(settlement, cf.date), cf.amount))
}

/// Discount factor and its derivative in `y` at time `t`.
fn discount(compounding: Compounding, y: f64, t: f64) -> (f64, f64) {
    match compounding {
        Compounding::Continuous => {
            let df = (-y * t).exp();
            (df, -t * df)
        }
        Compounding::Simple => {
            let base = 1.0 + y * t;
            (1.0 / base, -t / (base * base))
        }
        periodic => {
            let f = f64::from(periodic.periods_per_year().unwrap_or(1));
            let base = 1.0 + y / f;
            let df = base.powf(-f * t);
            (df, -t * df / base)
        }
    }
}

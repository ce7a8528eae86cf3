//! Option-adjusted spread on a Hull-White trinomial lattice.
//!
//! The OAS is the constant spread that, added to every short rate in the
//! lattice, makes the callable model price equal to the market price. The
//! issuer calls at a node whenever holding the bond is worth more than the
//! exercise amount (call price plus accrued).
//!
//! Cashflows between lattice dates are discounted from the payment date
//! back to the preceding lattice date along the curve, so without calls the
//! lattice price equals the curve price at a Z-spread of the same size.

use std::fmt;

use serde::{Deserialize, Serialize};

use switchback_curves::{Curve, ShiftedCurve};
use switchback_math::solvers::{brent, expand_bracket, SolverConfig};

use crate::config::EngineConfig;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::options::{HullWhiteParams, ShortRateModel, TrinomialLattice};
use crate::pricing::{BondCashflows, CallRight};

/// Option-adjusted risk at one OAS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveRisk {
    /// The OAS the measures were taken at.
    pub oas: f64,
    /// Callable model dirty price.
    pub dirty_price: f64,
    /// Duration under parallel curve shifts at fixed OAS.
    pub effective_duration: f64,
    /// Convexity under parallel curve shifts at fixed OAS.
    pub effective_convexity: f64,
    /// Straight price less callable price.
    pub option_value: f64,
}

/// A cashflow or exercise inside one lattice step.
#[derive(Debug, Clone, Copy)]
struct StepFlow {
    /// Years after the start of the step.
    offset: f64,
    amount: f64,
    /// Curve discount factor from the payment back to the step start.
    curve_factor: f64,
}

impl StepFlow {
    fn value(&self, oas: f64) -> f64 {
        self.amount * self.curve_factor * (-oas * self.offset).exp()
    }
}

/// The lattice and the cashflows mapped onto it. Independent of the OAS.
struct PreparedTree {
    lattice: TrinomialLattice,
    flows: Vec<Vec<StepFlow>>,
    exercises: Vec<Vec<StepFlow>>,
}

impl PreparedTree {
    fn price(&self, oas: f64) -> AnalyticsResult<f64> {
        let lattice = &self.lattice;
        let steps = lattice.steps();
        let mut values = vec![0.0; lattice.node_count(steps)];
        for i in (0..steps).rev() {
            let mut current = lattice.rollback(i, &values, oas)?;

            let coupons: f64 = self.flows[i].iter().map(|f| f.value(oas)).sum();
            for v in &mut current {
                *v += coupons;
            }

            for exercise in &self.exercises[i] {
                let paid_first: f64 = self.flows[i]
                    .iter()
                    .filter(|f| f.offset <= exercise.offset)
                    .map(|f| f.value(oas))
                    .sum();
                let called = paid_first + exercise.value(oas);
                for v in &mut current {
                    *v = v.min(called);
                }
            }
            values = current;
        }
        Ok(values[0])
    }
}

/// OAS calculator for callable instruments.
pub struct OasCalculator<'a> {
    curve: &'a dyn Curve,
    model: HullWhiteParams,
    steps: usize,
    solver: SolverConfig,
    bracket: (f64, f64),
    max_expansions: u32,
    bump: f64,
}

impl fmt::Debug for OasCalculator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OasCalculator")
            .field("model", &self.model)
            .field("steps", &self.steps)
            .field("bracket", &self.bracket)
            .finish_non_exhaustive()
    }
}

impl<'a> OasCalculator<'a> {
    /// Creates a calculator with the engine defaults.
    #[must_use]
    pub fn new(curve: &'a dyn Curve, model: HullWhiteParams) -> Self {
        Self::from_config(curve, model, &EngineConfig::default())
    }

    /// Creates a calculator with the lattice and solver settings of
    /// `config`.
    #[must_use]
    pub fn from_config(
        curve: &'a dyn Curve,
        model: HullWhiteParams,
        config: &EngineConfig,
    ) -> Self {
        Self {
            curve,
            model,
            steps: config.lattice_steps,
            solver: config.solver_config(),
            bracket: config.spread_bracket,
            max_expansions: config.max_bracket_expansions,
            bump: config.risk_bump,
        }
    }

    /// Sets the number of lattice steps.
    #[must_use]
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Number of lattice steps.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Model dirty price per 100 at `oas`, with the issuer exercising
    /// `calls` optimally.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` when no cashflow remains
    /// after settlement, and propagates lattice construction and curve
    /// errors.
    pub fn price_with_oas(
        &self,
        bond: &BondCashflows,
        calls: &[CallRight],
        oas: f64,
    ) -> AnalyticsResult<f64> {
        self.prepare(self.curve, bond, calls)?.price(oas)
    }

    /// Solves for the OAS that reprices to `dirty_price`.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` when no cashflow remains
    /// after settlement, and `AnalyticsError::Numerical` when the spread
    /// cannot be bracketed or the solver does not converge.
    pub fn calculate(
        &self,
        bond: &BondCashflows,
        calls: &[CallRight],
        dirty_price: f64,
    ) -> AnalyticsResult<f64> {
        if !(dirty_price > 0.0 && dirty_price.is_finite()) {
            return Err(AnalyticsError::configuration(format!(
                "target price must be positive, got {dirty_price}"
            )));
        }

        let tree = self.prepare(self.curve, bond, calls)?;
        tree.price(0.0)?;

        let objective = |oas: f64| tree.price(oas).map_or(f64::NAN, |p| p - dirty_price);
        let (lo, hi) = self.bracket;
        let bracket = expand_bracket(&objective, lo, hi, f64::NEG_INFINITY, self.max_expansions)?;
        let result = brent(&objective, bracket.0, bracket.1, &self.solver).map_err(|e| {
            match AnalyticsError::from(e) {
                AnalyticsError::Numerical {
                    reason,
                    iterations,
                    residual,
                    ..
                } => AnalyticsError::Numerical {
                    reason: format!("OAS solve: {reason}"),
                    iterations,
                    residual,
                    bracket: Some(bracket),
                },
                other => other,
            }
        })?;

        tracing::debug!(
            oas = result.root,
            iterations = result.iterations,
            calls = calls.len(),
            "OAS solved"
        );
        Ok(result.root)
    }

    /// Value of the issuer's call rights at `oas`: straight price less
    /// callable price.
    ///
    /// # Errors
    ///
    /// Propagates lattice construction and curve errors.
    pub fn option_value(
        &self,
        bond: &BondCashflows,
        calls: &[CallRight],
        oas: f64,
    ) -> AnalyticsResult<f64> {
        let straight = self.price_with_oas(bond, &[], oas)?;
        let callable = self.price_with_oas(bond, calls, oas)?;
        Ok(straight - callable)
    }

    /// Duration under a parallel curve shift at fixed OAS.
    ///
    /// # Errors
    ///
    /// Propagates lattice construction and curve errors.
    pub fn effective_duration(
        &self,
        bond: &BondCashflows,
        calls: &[CallRight],
        oas: f64,
    ) -> AnalyticsResult<f64> {
        Ok(self.effective_risk(bond, calls, oas)?.effective_duration)
    }

    /// Convexity under a parallel curve shift at fixed OAS.
    ///
    /// # Errors
    ///
    /// Propagates lattice construction and curve errors.
    pub fn effective_convexity(
        &self,
        bond: &BondCashflows,
        calls: &[CallRight],
        oas: f64,
    ) -> AnalyticsResult<f64> {
        Ok(self.effective_risk(bond, calls, oas)?.effective_convexity)
    }

    /// Sensitivity of the callable price to the OAS itself.
    ///
    /// # Errors
    ///
    /// Propagates lattice construction and curve errors.
    pub fn oas_duration(
        &self,
        bond: &BondCashflows,
        calls: &[CallRight],
        oas: f64,
    ) -> AnalyticsResult<f64> {
        let tree = self.prepare(self.curve, bond, calls)?;
        let price = positive(tree.price(oas)?)?;
        let up = tree.price(oas + self.bump)?;
        let down = tree.price(oas - self.bump)?;
        Ok((down - up) / (2.0 * price * self.bump))
    }

    /// Effective duration, convexity and option value at `oas`.
    ///
    /// The lattice is refitted to each shifted curve.
    ///
    /// # Errors
    ///
    /// Propagates lattice construction and curve errors.
    pub fn effective_risk(
        &self,
        bond: &BondCashflows,
        calls: &[CallRight],
        oas: f64,
    ) -> AnalyticsResult<EffectiveRisk> {
        let base = self.prepare(self.curve, bond, calls)?;
        let price = positive(base.price(oas)?)?;

        let up_curve = ShiftedCurve::new(self.curve, self.bump);
        let down_curve = ShiftedCurve::new(self.curve, -self.bump);
        let up = self.prepare(&up_curve, bond, calls)?.price(oas)?;
        let down = self.prepare(&down_curve, bond, calls)?.price(oas)?;
        let straight = self.prepare(self.curve, bond, &[])?.price(oas)?;

        Ok(EffectiveRisk {
            oas,
            dirty_price: price,
            effective_duration: (down - up) / (2.0 * price * self.bump),
            effective_convexity: (down + up - 2.0 * price) / (price * self.bump * self.bump),
            option_value: straight - price,
        })
    }

    fn prepare(
        &self,
        curve: &dyn Curve,
        bond: &BondCashflows,
        calls: &[CallRight],
    ) -> AnalyticsResult<PreparedTree> {
        let settlement = bond.settlement();
        let t0 = curve.year_fraction(settlement);
        let df0 = curve.discount_factor(t0)?;
        if df0 <= 0.0 {
            return Err(AnalyticsError::configuration(format!(
                "non-positive discount factor at settlement {settlement}"
            )));
        }

        // A coupon dated on settlement belongs to the seller
        let remaining: Vec<(f64, f64)> = bond
            .cashflows()
            .iter()
            .filter(|cf| cf.date > settlement)
            .map(|cf| (curve.year_fraction(cf.date) - t0, cf.amount))
            .collect();
        let horizon = remaining.iter().map(|(tau, _)| *tau).fold(0.0, f64::max);
        if horizon <= 0.0 {
            return Err(AnalyticsError::configuration(format!(
                "no cashflows after settlement {settlement}"
            )));
        }

        let lattice = self.model.build_lattice(curve, settlement, horizon, self.steps)?;
        let steps = lattice.steps();
        let dt = lattice.dt();

        let step_flow = |i: usize, tau: f64, amount: f64| -> AnalyticsResult<StepFlow> {
            let forward = curve.discount_factor(t0 + tau)? / df0;
            Ok(StepFlow {
                offset: tau - lattice.time(i),
                amount,
                curve_factor: forward / lattice.discount_factor(i),
            })
        };

        let mut flows = vec![Vec::new(); steps];
        for &(tau, amount) in remaining.iter().filter(|(tau, _)| *tau > 0.0) {
            let i = ((tau / dt).ceil() as usize).saturating_sub(1).min(steps - 1);
            flows[i].push(step_flow(i, tau, amount)?);
        }

        let mut exercises = vec![Vec::new(); steps];
        for call in calls {
            let tau = curve.year_fraction(call.date) - t0;
            if tau < 0.0 {
                continue;
            }
            // A call on the final lattice date is worth nothing to the issuer
            let i = (tau / dt).floor() as usize;
            if i < steps {
                exercises[i].push(step_flow(i, tau, call.exercise_amount())?);
            }
        }

        Ok(PreparedTree {
            lattice,
            flows,
            exercises,
        })
    }
}

fn positive(price: f64) -> AnalyticsResult<f64> {
    if price > 0.0 && price.is_finite() {
        Ok(price)
    } else {
        Err(AnalyticsError::configuration(format!(
            "model price must be positive, got {price}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use switchback_bonds::{CallEntry, CallSchedule, Instrument};
    use switchback_core::types::{Compounding, Date, Frequency};
    use switchback_curves::ZeroCurve;

    use crate::pricing::ValuationContext;
    use crate::spreads::ZSpreadCalculator;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn curve() -> ZeroCurve {
        ZeroCurve::flat(date(2025, 1, 2), 0.04, Compounding::Continuous).unwrap()
    }

    fn bond(callable: bool) -> Instrument {
        let calls = if callable {
            CallSchedule::new(vec![
                CallEntry::new(date(2027, 1, 15), dec!(100)),
                CallEntry::new(date(2029, 1, 15), dec!(100)),
            ])
            .unwrap()
        } else {
            CallSchedule::empty()
        };
        Instrument::builder()
            .issue_date(date(2024, 1, 15))
            .maturity_date(date(2034, 1, 15))
            .coupon_rate(dec!(0.06))
            .fixed_frequency(Frequency::SemiAnnual)
            .call_schedule(calls)
            .build()
            .unwrap()
    }

    fn context() -> ValuationContext {
        ValuationContext::new(date(2025, 3, 3), Arc::new(curve()))
    }

    #[test]
    fn test_straight_bond_oas_matches_z_spread() {
        let curve = curve();
        let ctx = context();
        let flows = BondCashflows::to_maturity(&bond(false), &ctx).unwrap();
        let dirty = 104.0 + flows.accrued();

        let z = ZSpreadCalculator::new(&curve)
            .calculate(flows.cashflows(), flows.settlement(), dirty)
            .unwrap();
        let oas = OasCalculator::new(&curve, HullWhiteParams::default())
            .calculate(&flows, &[], dirty)
            .unwrap();
        assert_relative_eq!(oas, z, epsilon = 1e-8);
    }

    #[test]
    fn test_coupon_on_settlement_is_not_priced() {
        let curve = curve();
        let ctx = ValuationContext::new(date(2025, 7, 15), Arc::new(curve.clone()));
        let flows = BondCashflows::to_maturity(&bond(false), &ctx).unwrap();
        assert!(flows.cashflows().iter().any(|cf| cf.date == date(2025, 7, 15)));
        assert_relative_eq!(flows.accrued(), 0.0);

        let z = ZSpreadCalculator::new(&curve)
            .calculate(flows.cashflows(), flows.settlement(), 104.0)
            .unwrap();
        let oas = OasCalculator::new(&curve, HullWhiteParams::default())
            .calculate(&flows, &[], 104.0)
            .unwrap();
        assert_relative_eq!(oas, z, epsilon = 1e-8);
    }

    #[test]
    fn test_call_lowers_price_and_oas() {
        let curve = curve();
        let ctx = context();
        let instrument = bond(true);
        let flows = BondCashflows::to_maturity(&instrument, &ctx).unwrap();
        let calls = flows.call_rights(&instrument);
        assert_eq!(calls.len(), 2);

        let calc = OasCalculator::new(&curve, HullWhiteParams::default());
        let option = calc.option_value(&flows, &calls, 0.0).unwrap();
        assert!(option > 0.0);

        let dirty = 104.0 + flows.accrued();
        let z = ZSpreadCalculator::new(&curve)
            .calculate(flows.cashflows(), flows.settlement(), dirty)
            .unwrap();
        let oas = calc.calculate(&flows, &calls, dirty).unwrap();
        assert!(oas < z);
        assert_relative_eq!(
            calc.price_with_oas(&flows, &calls, oas).unwrap(),
            dirty,
            epsilon = 1e-8
        );
    }

    #[test]
    fn test_effective_duration_shortened_by_call() {
        let curve = curve();
        let ctx = context();
        let instrument = bond(true);
        let flows = BondCashflows::to_maturity(&instrument, &ctx).unwrap();
        let calls = flows.call_rights(&instrument);
        let calc = OasCalculator::new(&curve, HullWhiteParams::default());

        let straight = calc.effective_risk(&flows, &[], 0.0).unwrap();
        let callable = calc.effective_risk(&flows, &calls, 0.0).unwrap();
        assert!(callable.effective_duration < straight.effective_duration);
        assert!(callable.effective_convexity < straight.effective_convexity);
        assert_relative_eq!(straight.option_value, 0.0, epsilon = 1e-12);
        assert!(callable.option_value > 0.0);
    }

    #[test]
    fn test_straight_effective_duration_matches_curve_duration() {
        let curve = curve();
        let ctx = context();
        let flows = BondCashflows::to_maturity(&bond(false), &ctx).unwrap();
        let calc = OasCalculator::new(&curve, HullWhiteParams::default());
        let risk = calc.effective_risk(&flows, &[], 0.0).unwrap();
        let spread_duration = calc.oas_duration(&flows, &[], 0.0).unwrap();
        assert_relative_eq!(risk.effective_duration, spread_duration, max_relative = 1e-6);
    }
}

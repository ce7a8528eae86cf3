//! Hull-White trinomial lattice.
//!
//! The standard two-stage construction: a mean-reverting trinomial tree for
//! `x = r - α(t)` on a uniform grid, then a forward induction on
//! Arrow-Debreu prices that fits `α` at each step so the lattice reprices
//! the initial discount curve exactly.
//!
//! Lattice time starts at the origin date; discount factors are forward
//! from the origin, `P(τ) = DF(t₀ + τ) / DF(t₀)`.

use switchback_core::types::Date;
use switchback_curves::Curve;

use super::HullWhiteParams;
use crate::error::{AnalyticsError, AnalyticsResult};

/// Truncation level of the tree, in units of `a·Δt`.
const BRANCHING_THRESHOLD: f64 = 0.184;

/// A fitted Hull-White trinomial lattice.
#[derive(Debug, Clone)]
pub struct TrinomialLattice {
    params: HullWhiteParams,
    steps: usize,
    dt: f64,
    dx: f64,
    /// `-a·Δt`, the expected change of `x` per unit `x` over a step.
    drift: f64,
    j_max: i64,
    alphas: Vec<f64>,
    discount_factors: Vec<f64>,
}

/// Destination centre and probabilities `(up, middle, down)` of a node.
#[derive(Debug, Clone, Copy)]
struct Branch {
    centre: i64,
    up: f64,
    middle: f64,
    down: f64,
}

impl TrinomialLattice {
    /// Builds a lattice of `steps` periods spanning `horizon` years from
    /// `origin`, fitted to `curve`.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` for a non-positive horizon or
    /// fewer than one step, and propagates curve lookup failures.
    pub fn build(
        params: HullWhiteParams,
        curve: &dyn Curve,
        origin: Date,
        horizon: f64,
        steps: usize,
    ) -> AnalyticsResult<Self> {
        if steps == 0 {
            return Err(AnalyticsError::configuration("lattice needs at least one step"));
        }
        if !(horizon > 0.0 && horizon.is_finite()) {
            return Err(AnalyticsError::configuration(format!(
                "lattice horizon must be positive, got {horizon}"
            )));
        }

        let dt = horizon / steps as f64;
        let a = params.mean_reversion();
        let dx = params.volatility() * (3.0 * dt).sqrt();
        let drift = -a * dt;
        let j_max = ((BRANCHING_THRESHOLD / (a * dt)).ceil() as i64).max(1);

        let t0 = curve.year_fraction(origin);
        let df0 = curve.discount_factor(t0)?;
        let discount_factors = (0..=steps)
            .map(|i| Ok(curve.discount_factor(t0 + i as f64 * dt)? / df0))
            .collect::<AnalyticsResult<Vec<f64>>>()?;

        let mut lattice = Self {
            params,
            steps,
            dt,
            dx,
            drift,
            j_max,
            alphas: Vec::with_capacity(steps),
            discount_factors,
        };
        lattice.fit();

        tracing::debug!(steps, dt, j_max, dx, "lattice built");
        Ok(lattice)
    }

    /// Forward induction on Arrow-Debreu prices.
    fn fit(&mut self) {
        let mut state = vec![1.0];
        for i in 0..self.steps {
            let width = self.width(i);
            let next_width = self.width(i + 1);

            let weighted: f64 = state
                .iter()
                .enumerate()
                .map(|(idx, q)| {
                    let j = idx as i64 - width;
                    q * (-(j as f64) * self.dx * self.dt).exp()
                })
                .sum();
            let alpha = (weighted / self.discount_factors[i + 1]).ln() / self.dt;
            self.alphas.push(alpha);

            let mut next = vec![0.0; (2 * next_width + 1) as usize];
            for (idx, q) in state.iter().enumerate() {
                let j = idx as i64 - width;
                let discounted = q * (-(alpha + j as f64 * self.dx) * self.dt).exp();
                let branch = self.branch(j);
                for (offset, p) in [(1, branch.up), (0, branch.middle), (-1, branch.down)] {
                    next[(branch.centre + offset + next_width) as usize] += discounted * p;
                }
            }
            state = next;
        }
    }

    fn branch(&self, j: i64) -> Branch {
        let jm = j as f64 * self.drift;
        let jm2 = jm * jm;
        if j >= self.j_max {
            Branch {
                centre: j - 1,
                up: 7.0 / 6.0 + 0.5 * (jm2 + 3.0 * jm),
                middle: -1.0 / 3.0 - jm2 - 2.0 * jm,
                down: 1.0 / 6.0 + 0.5 * (jm2 + jm),
            }
        } else if j <= -self.j_max {
            Branch {
                centre: j + 1,
                up: 1.0 / 6.0 + 0.5 * (jm2 - jm),
                middle: -1.0 / 3.0 - jm2 + 2.0 * jm,
                down: 7.0 / 6.0 + 0.5 * (jm2 - 3.0 * jm),
            }
        } else {
            Branch {
                centre: j,
                up: 1.0 / 6.0 + 0.5 * (jm2 + jm),
                middle: 2.0 / 3.0 - jm2,
                down: 1.0 / 6.0 + 0.5 * (jm2 - jm),
            }
        }
    }

    /// Model parameters.
    #[must_use]
    pub fn params(&self) -> HullWhiteParams {
        self.params
    }

    /// Number of time steps.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Step length in years.
    #[must_use]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Time of step `i` in years from the origin.
    #[must_use]
    pub fn time(&self, i: usize) -> f64 {
        i as f64 * self.dt
    }

    /// Largest node index at step `i`; nodes run from `-width` to `width`.
    #[must_use]
    pub fn width(&self, i: usize) -> i64 {
        (i as i64).min(self.j_max)
    }

    /// Number of nodes at step `i`.
    #[must_use]
    pub fn node_count(&self, i: usize) -> usize {
        (2 * self.width(i) + 1) as usize
    }

    /// Fitted drift `α` for step `i`.
    #[must_use]
    pub fn alpha(&self, i: usize) -> f64 {
        self.alphas[i]
    }

    /// Short rate over step `i` at node `j`.
    #[must_use]
    pub fn short_rate(&self, i: usize, j: i64) -> f64 {
        self.alphas[i] + j as f64 * self.dx
    }

    /// Curve discount factor from the origin to step `i`.
    #[must_use]
    pub fn discount_factor(&self, i: usize) -> f64 {
        self.discount_factors[i]
    }

    /// Discounted expectation at step `i` of `next`, the node values at
    /// step `i + 1`, with `spread` added to every short rate.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` if `i` is past the last step
    /// or `next` has the wrong number of nodes.
    pub fn rollback(&self, i: usize, next: &[f64], spread: f64) -> AnalyticsResult<Vec<f64>> {
        if i >= self.steps {
            return Err(AnalyticsError::configuration(format!(
                "rollback from step {i} of a {}-step lattice",
                self.steps
            )));
        }
        if next.len() != self.node_count(i + 1) {
            return Err(AnalyticsError::configuration(format!(
                "step {} has {} nodes, got {}",
                i + 1,
                self.node_count(i + 1),
                next.len()
            )));
        }

        let width = self.width(i);
        let next_width = self.width(i + 1);
        let value_at = |k: i64| next[(k + next_width) as usize];

        Ok((-width..=width)
            .map(|j| {
                let b = self.branch(j);
                let expected = b.up * value_at(b.centre + 1)
                    + b.middle * value_at(b.centre)
                    + b.down * value_at(b.centre - 1);
                (-(self.short_rate(i, j) + spread) * self.dt).exp() * expected
            })
            .collect())
    }

    /// Price at the origin of a unit zero-coupon bond paying at step `step`.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` if `step` is past the lattice.
    pub fn zero_bond_price(&self, step: usize, spread: f64) -> AnalyticsResult<f64> {
        if step > self.steps {
            return Err(AnalyticsError::configuration(format!(
                "step {step} beyond a {}-step lattice",
                self.steps
            )));
        }
        let mut values = vec![1.0; self.node_count(step)];
        for i in (0..step).rev() {
            values = self.rollback(i, &values, spread)?;
        }
        Ok(values[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use switchback_core::types::Compounding;
    use switchback_curves::{ExtrapolationMethod, InterpolationMethod, ZeroCurve};

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn upward_curve() -> ZeroCurve {
        ZeroCurve::new(
            date(2025, 1, 2),
            vec![0.5, 2.0, 5.0, 10.0, 30.0],
            vec![0.030, 0.034, 0.038, 0.042, 0.045],
            Compounding::Continuous,
            InterpolationMethod::Linear,
            ExtrapolationMethod::Flat,
        )
        .unwrap()
    }

    #[test]
    fn test_reprices_discount_factors() {
        let curve = upward_curve();
        let params = HullWhiteParams::new(0.05, 0.012).unwrap();
        let origin = date(2025, 4, 15);
        let lattice = TrinomialLattice::build(params, &curve, origin, 10.0, 120).unwrap();

        let t0 = curve.year_fraction(origin);
        let df0 = curve.discount_factor(t0).unwrap();
        for step in [1, 17, 60, 120] {
            let expected = curve.discount_factor(t0 + lattice.time(step)).unwrap() / df0;
            assert_relative_eq!(
                lattice.zero_bond_price(step, 0.0).unwrap(),
                expected,
                max_relative = 1e-10
            );
        }
    }

    #[test]
    fn test_spread_discounts_uniformly() {
        let curve = upward_curve();
        let lattice =
            TrinomialLattice::build(HullWhiteParams::default(), &curve, date(2025, 1, 2), 5.0, 50)
                .unwrap();
        let plain = lattice.zero_bond_price(50, 0.0).unwrap();
        let spread = lattice.zero_bond_price(50, 0.01).unwrap();
        assert_relative_eq!(spread, plain * (-0.01 * 5.0_f64).exp(), max_relative = 1e-10);
    }

    #[test]
    fn test_probabilities_valid_and_width_truncated() {
        let curve = upward_curve();
        let params = HullWhiteParams::new(0.1, 0.01).unwrap();
        let lattice = TrinomialLattice::build(params, &curve, date(2025, 1, 2), 30.0, 300).unwrap();
        assert!(lattice.width(300) < 300);
        let top = lattice.width(300);
        for j in -top..=top {
            let b = lattice.branch(j);
            assert!(b.up >= 0.0 && b.middle >= 0.0 && b.down >= 0.0);
            assert_relative_eq!(b.up + b.middle + b.down, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rejects_bad_geometry() {
        let curve = upward_curve();
        let params = HullWhiteParams::default();
        assert!(TrinomialLattice::build(params, &curve, date(2025, 1, 2), 5.0, 0).is_err());
        assert!(TrinomialLattice::build(params, &curve, date(2025, 1, 2), 0.0, 10).is_err());
        let lattice = TrinomialLattice::build(params, &curve, date(2025, 1, 2), 5.0, 10).unwrap();
        assert!(lattice.rollback(10, &[1.0], 0.0).is_err());
        assert!(lattice.rollback(0, &[1.0], 0.0).is_err());
    }
}

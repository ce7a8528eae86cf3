//! Levenberg-Marquardt least squares.

use nalgebra::{DMatrix, DVector};

use super::{OptimizationConfig, OptimizationResult};
use crate::error::{MathError, MathResult};

const MAX_DAMPING: f64 = 1e12;
const MIN_DAMPING: f64 = 1e-12;

/// Minimizes `½‖r(x)‖²` by Levenberg-Marquardt.
///
/// Damping follows Marquardt's scaling (`JᵀJ + λ·diag(JᵀJ)`), shrinking by
/// ten after an accepted step and growing by ten after a rejected one.
/// Converges when the gradient, the step, or the relative cost reduction
/// drops below `config.tolerance`, or when no damping level reduces the
/// cost any more.
///
/// # Errors
///
/// Returns `MathError::InvalidInput` for empty inputs or non-finite
/// residuals at the starting point.
///
/// # Example
///
/// ```rust
/// use switchback_math::optimization::{levenberg_marquardt, OptimizationConfig};
///
/// // Fit y = a·exp(b·t)
/// let ts = [0.0, 1.0, 2.0, 3.0];
/// let ys: Vec<f64> = ts.iter().map(|t: &f64| 2.0 * (0.5 * t).exp()).collect();
/// let residuals = |p: &[f64]| {
///     ts.iter().zip(&ys).map(|(t, y)| p[0] * (p[1] * t).exp() - y).collect::<Vec<_>>()
/// };
///
/// let result = levenberg_marquardt(residuals, &[1.0, 0.1], &OptimizationConfig::default()).unwrap();
/// assert!(result.converged);
/// assert!((result.parameters[0] - 2.0).abs() < 1e-6);
/// ```
pub fn levenberg_marquardt<F>(
    residuals: F,
    initial: &[f64],
    config: &OptimizationConfig,
) -> MathResult<OptimizationResult>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let n = initial.len();
    if n == 0 {
        return Err(MathError::invalid_input("no parameters to optimize"));
    }
    if let Some(bounds) = &config.lower_bounds {
        if bounds.len() != n {
            return Err(MathError::invalid_input(format!(
                "{} lower bounds for {n} parameters",
                bounds.len()
            )));
        }
    }

    let mut params = project(initial.to_vec(), config.lower_bounds.as_deref());
    let mut r = residuals(&params);
    if r.is_empty() {
        return Err(MathError::invalid_input("empty residual vector"));
    }
    if r.iter().any(|v| !v.is_finite()) {
        return Err(MathError::invalid_input("non-finite residual at starting point"));
    }
    let m = r.len();

    let mut cost = half_norm_sq(&r);
    let mut lambda = config.initial_damping;

    for iteration in 0..config.max_iterations {
        let jacobian = numeric_jacobian(&residuals, &params, &r, config.step_size);
        let r_vec = DVector::from_column_slice(&r);
        let gradient = jacobian.transpose() * &r_vec;

        if gradient.amax() < config.tolerance {
            log::debug!("LM converged on gradient after {iteration} iterations, cost {cost:.3e}");
            return Ok(finish(params, cost, r, iteration, true));
        }

        let jtj = jacobian.transpose() * &jacobian;
        let mut accepted = false;

        while lambda <= MAX_DAMPING {
            let mut damped = jtj.clone();
            for i in 0..n {
                damped[(i, i)] += lambda * jtj[(i, i)].max(1e-12);
            }

            let Some(step) = solve_normal_equations(damped, -gradient.clone()) else {
                lambda *= 10.0;
                continue;
            };

            let trial: Vec<f64> = params.iter().zip(step.iter()).map(|(p, d)| p + d).collect();
            let trial = project(trial, config.lower_bounds.as_deref());
            let trial_r = residuals(&trial);

            if trial_r.len() != m || trial_r.iter().any(|v| !v.is_finite()) {
                lambda *= 10.0;
                continue;
            }

            let trial_cost = half_norm_sq(&trial_r);
            if trial_cost < cost {
                let step_norm = trial
                    .iter()
                    .zip(&params)
                    .map(|(a, b)| (a - b).abs())
                    .fold(0.0, f64::max);
                let param_norm = params.iter().map(|p| p.abs()).fold(0.0, f64::max);
                let reduction = (cost - trial_cost) / cost.max(f64::MIN_POSITIVE);

                params = trial;
                r = trial_r;
                cost = trial_cost;
                lambda = (lambda / 10.0).max(MIN_DAMPING);
                accepted = true;

                if step_norm <= config.tolerance * (param_norm + config.tolerance)
                    || reduction <= config.tolerance
                {
                    log::debug!("LM converged on step after {} iterations", iteration + 1);
                    return Ok(finish(params, cost, r, iteration + 1, true));
                }
                break;
            }

            lambda *= 10.0;
        }

        if !accepted {
            log::debug!("LM stalled at cost {cost:.3e}, treating as stationary");
            return Ok(finish(params, cost, r, iteration + 1, true));
        }
    }

    Ok(finish(params, cost, r, config.max_iterations, false))
}

fn finish(
    parameters: Vec<f64>,
    objective_value: f64,
    residuals: Vec<f64>,
    iterations: u32,
    converged: bool,
) -> OptimizationResult {
    OptimizationResult {
        parameters,
        objective_value,
        residuals,
        iterations,
        converged,
    }
}

fn half_norm_sq(r: &[f64]) -> f64 {
    0.5 * r.iter().map(|v| v * v).sum::<f64>()
}

fn project(mut params: Vec<f64>, lower: Option<&[f64]>) -> Vec<f64> {
    if let Some(bounds) = lower {
        for (p, lb) in params.iter_mut().zip(bounds) {
            *p = p.max(*lb);
        }
    }
    params
}

fn numeric_jacobian<F>(residuals: &F, params: &[f64], r0: &[f64], step_size: f64) -> DMatrix<f64>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let m = r0.len();
    let n = params.len();
    let mut jacobian = DMatrix::zeros(m, n);
    let mut bumped = params.to_vec();

    for j in 0..n {
        let h = step_size * params[j].abs().max(1e-4);
        bumped[j] = params[j] + h;
        let r1 = residuals(&bumped);
        bumped[j] = params[j];

        for i in 0..m {
            let value = r1.get(i).copied().unwrap_or(r0[i]);
            jacobian[(i, j)] = (value - r0[i]) / h;
        }
    }

    jacobian
}

fn solve_normal_equations(matrix: DMatrix<f64>, rhs: DVector<f64>) -> Option<DVector<f64>> {
    if let Some(chol) = matrix.clone().cholesky() {
        return Some(chol.solve(&rhs));
    }
    matrix.lu().solve(&rhs)
}

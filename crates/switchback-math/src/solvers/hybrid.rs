//! Newton-Raphson with Brent fallback.

use crate::error::{MathError, MathResult};
use crate::solvers::{brent, SolverConfig, SolverResult};

/// Hybrid root-finding algorithm.
///
/// Runs a monitored Newton-Raphson iteration first. When Newton diverges,
/// hits a vanishing derivative, or leaves `bounds`, the search falls back to
/// Brent's method on `bounds` (or on a bracket found by stepping outward from
/// the initial guess when no bounds are given).
///
/// # Example
///
/// ```rust
/// use switchback_math::solvers::{hybrid, SolverConfig};
///
/// let f = |x: f64| x * x * x - x - 2.0;
/// let df = |x: f64| 3.0 * x * x - 1.0;
///
/// let result = hybrid(f, df, 1.5, Some((1.0, 2.0)), &SolverConfig::default()).unwrap();
/// assert!((f(result.root)).abs() < 1e-10);
/// ```
pub fn hybrid<F, DF>(
    f: F,
    df: DF,
    initial_guess: f64,
    bounds: Option<(f64, f64)>,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
    DF: Fn(f64) -> f64,
{
    match monitored_newton(&f, &df, initial_guess, bounds, config) {
        Ok(result) => Ok(result),
        Err(reason) => {
            log::debug!("Newton abandoned ({reason}), falling back to Brent");
            let (a, b) = match bounds {
                Some(bracket) => bracket,
                None => find_bracket(&f, initial_guess).ok_or_else(|| {
                    MathError::invalid_input(
                        "Newton-Raphson failed and no bracketing interval was found",
                    )
                })?,
            };
            brent(&f, a, b, config)
        }
    }
}

fn monitored_newton<F, DF>(
    f: &F,
    df: &DF,
    initial_guess: f64,
    bounds: Option<(f64, f64)>,
    config: &SolverConfig,
) -> MathResult<SolverResult>
where
    F: Fn(f64) -> f64,
    DF: Fn(f64) -> f64,
{
    const MAX_DIVERGENCE: u32 = 3;

    let (lo, hi) = bounds.map_or((f64::NEG_INFINITY, f64::INFINITY), |(a, b)| {
        (a.min(b), a.max(b))
    });
    let mut x = initial_guess;
    let mut prev_residual = f64::MAX;
    let mut divergence_count = 0;
    let newton_max_iter = config.max_iterations.min(30);

    for iteration in 0..newton_max_iter {
        let fx = f(x);
        let residual = fx.abs();

        if residual < config.tolerance {
            return Ok(SolverResult {
                root: x,
                iterations: iteration,
                residual: fx,
            });
        }

        if residual > prev_residual * 2.0 {
            divergence_count += 1;
            if divergence_count >= MAX_DIVERGENCE {
                return Err(MathError::invalid_input("Newton-Raphson diverging"));
            }
        } else {
            divergence_count = 0;
        }
        prev_residual = residual;

        let dfx = df(x);
        if dfx.abs() < 1e-15 || !dfx.is_finite() {
            return Err(MathError::DivisionByZero { value: dfx });
        }

        let step = fx / dfx;
        x -= step;

        if !x.is_finite() || x < lo || x > hi {
            return Err(MathError::invalid_input("Newton left the search interval"));
        }

        if step.abs() < config.tolerance * 1e-2 {
            let fx = f(x);
            if fx.abs() < config.tolerance {
                return Ok(SolverResult {
                    root: x,
                    iterations: iteration + 1,
                    residual: fx,
                });
            }
        }
    }

    Err(MathError::convergence_failed(newton_max_iter, f(x).abs()))
}

fn find_bracket<F>(f: &F, initial_guess: f64) -> Option<(f64, f64)>
where
    F: Fn(f64) -> f64,
{
    let f_init = f(initial_guess);
    let mut delta = 0.1;

    for _ in 0..30 {
        let left = initial_guess - delta;
        let right = initial_guess + delta;
        let f_left = f(left);
        let f_right = f(right);

        if f_left * f_init <= 0.0 {
            return Some((left, initial_guess));
        }
        if f_right * f_init <= 0.0 {
            return Some((initial_guess, right));
        }
        delta *= 2.0;
    }

    None
}

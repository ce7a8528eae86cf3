//! Root-finding algorithms.
//!
//! - [`newton_raphson`]: quadratic convergence when a derivative is available
//! - [`brent`]: guaranteed convergence on a sign-changing bracket
//! - [`bisection`]: the simplest bracketing method
//! - [`hybrid`]: Newton-Raphson with Brent fallback
//! - [`expand_bracket`]: geometric bracket search ahead of a bracketing solver
//!
//! # Example: YTM Calculation
//!
//! ```rust
//! use switchback_math::solvers::{hybrid, SolverConfig};
//!
//! // Bond: 5% annual coupon, 5 years, price 95
//! let price_fn = |y: f64| {
//!     let mut pv = 0.0;
//!     for t in 1..=5 {
//!         pv += 5.0 / (1.0 + y).powi(t);
//!     }
//!     pv += 100.0 / (1.0 + y).powi(5);
//!     pv - 95.0
//! };
//!
//! let d_price_fn = |y: f64| {
//!     let mut dpv = 0.0;
//!     for t in 1..=5 {
//!         dpv -= f64::from(t) * 5.0 / (1.0 + y).powi(t + 1);
//!     }
//!     dpv -= 5.0 * 100.0 / (1.0 + y).powi(6);
//!     dpv
//! };
//!
//! let result = hybrid(price_fn, d_price_fn, 0.05, Some((0.0, 0.20)), &SolverConfig::default()).unwrap();
//! assert!(result.root > 0.05);
//! ```

mod bisection;
mod brent;
mod hybrid;
mod newton;

pub use bisection::bisection;
pub use brent::brent;
pub use hybrid::hybrid;
pub use newton::newton_raphson;

use crate::error::{MathError, MathResult};

/// Default tolerance for root-finding algorithms.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default maximum iterations for root-finding algorithms.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Default cap on bracket expansions.
pub const DEFAULT_MAX_EXPANSIONS: u32 = 20;

/// Configuration for root-finding algorithms.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Tolerance for convergence.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Sets the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Result of a root-finding iteration.
#[derive(Debug, Clone, Copy)]
pub struct SolverResult {
    /// The root found.
    pub root: f64,
    /// Number of iterations used.
    pub iterations: u32,
    /// Final residual (function value at root).
    pub residual: f64,
}

/// Widens `[a, b]` geometrically until `f` changes sign across it.
///
/// Each expansion moves the end with the smaller `|f|` outward by 1.6 times
/// the current width. The lower end never goes below `lower_floor`; once it
/// sits on the floor only the upper end moves.
///
/// # Errors
///
/// Returns `MathError::BracketNotFound` with the last bracket after
/// `max_expansions` unsuccessful expansions, or `MathError::InvalidInput` if
/// `a >= b`.
pub fn expand_bracket<F>(
    f: F,
    a: f64,
    b: f64,
    lower_floor: f64,
    max_expansions: u32,
) -> MathResult<(f64, f64)>
where
    F: Fn(f64) -> f64,
{
    const FACTOR: f64 = 1.6;

    if a >= b || !a.is_finite() || !b.is_finite() {
        return Err(MathError::invalid_input(format!("invalid initial bracket [{a}, {b}]")));
    }

    let mut lo = a.max(lower_floor);
    let mut hi = b;
    let mut f_lo = f(lo);
    let mut f_hi = f(hi);

    for expansion in 0..=max_expansions {
        if f_lo * f_hi <= 0.0 {
            return Ok((lo, hi));
        }
        if expansion == max_expansions {
            break;
        }

        let width = hi - lo;
        let floor_reached = lo <= lower_floor;
        if f_lo.abs() < f_hi.abs() && !floor_reached {
            lo = (lo - FACTOR * width).max(lower_floor);
            f_lo = f(lo);
        } else {
            hi += FACTOR * width;
            f_hi = f(hi);
        }
        log::trace!("bracket expansion {}: [{lo}, {hi}]", expansion + 1);
    }

    Err(MathError::BracketNotFound {
        a: lo,
        b: hi,
        fa: f_lo,
        fb: f_hi,
        expansions: max_expansions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_all_solvers_agree() {
        let f = |x: f64| x * x * x - 2.0 * x - 5.0;
        let df = |x: f64| 3.0 * x * x - 2.0;
        let config = SolverConfig::default();

        let n = newton_raphson(f, df, 2.0, &config).unwrap();
        let b = brent(f, 2.0, 3.0, &config).unwrap();
        let bi = bisection(f, 2.0, 3.0, &config.with_max_iterations(200)).unwrap();
        let h = hybrid(f, df, 2.0, Some((2.0, 3.0)), &config).unwrap();

        assert_relative_eq!(n.root, 2.094_551_481_542_327, epsilon = 1e-9);
        assert_relative_eq!(b.root, n.root, epsilon = 1e-9);
        assert_relative_eq!(bi.root, n.root, epsilon = 1e-9);
        assert_relative_eq!(h.root, n.root, epsilon = 1e-9);
    }

    #[test]
    fn test_expand_bracket_upwards() {
        // Root at 3.0, initial bracket entirely below it
        let f = |x: f64| 3.0 - x;
        let (a, b) = expand_bracket(f, -0.99, 1.0, -2.0, 20).unwrap();
        assert!(f(a) * f(b) <= 0.0);
        assert!(a >= -2.0);
    }

    #[test]
    fn test_expand_bracket_respects_floor() {
        // Root at -5 sits below the floor
        let f = |x: f64| x + 5.0;
        let err = expand_bracket(f, -0.99, 1.0, -2.0, 20).unwrap_err();
        match err {
            MathError::BracketNotFound { a, expansions, .. } => {
                assert!(a >= -2.0);
                assert_eq!(expansions, 20);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_expand_bracket_already_bracketed() {
        let f = |x: f64| x - 0.05;
        assert_eq!(expand_bracket(f, -0.99, 1.0, -2.0, 20).unwrap(), (-0.99, 1.0));
    }

    #[test]
    fn test_expand_bracket_invalid() {
        assert!(expand_bracket(|x| x, 1.0, 1.0, -2.0, 20).is_err());
    }
}

//! Nonlinear least-squares optimization.
//!
//! [`levenberg_marquardt`] minimizes `½‖r(x)‖²` for a residual vector
//! `r(x)` with a forward-difference Jacobian.

mod levenberg_marquardt;

pub use levenberg_marquardt::levenberg_marquardt;

/// Configuration for optimization algorithms.
#[derive(Debug, Clone)]
pub struct OptimizationConfig {
    /// Tolerance for convergence (gradient, step and relative cost change).
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
    /// Relative step size for numerical derivatives.
    pub step_size: f64,
    /// Initial Levenberg-Marquardt damping.
    pub initial_damping: f64,
    /// Optional lower bounds, one per parameter; steps are projected onto them.
    pub lower_bounds: Option<Vec<f64>>,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 100,
            step_size: 1e-7,
            initial_damping: 1e-3,
            lower_bounds: None,
        }
    }
}

impl OptimizationConfig {
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

    /// Sets per-parameter lower bounds.
    #[must_use]
    pub fn with_lower_bounds(mut self, bounds: Vec<f64>) -> Self {
        self.lower_bounds = Some(bounds);
        self
    }
}

/// Result of an optimization run.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Optimal parameters found.
    pub parameters: Vec<f64>,
    /// Final objective value, `½‖r‖²`.
    pub objective_value: f64,
    /// Residuals at the optimum.
    pub residuals: Vec<f64>,
    /// Number of iterations used.
    pub iterations: u32,
    /// Whether the optimization converged.
    pub converged: bool,
}

//! # Switchback Math
//!
//! Numerical kernels for the Switchback valuation engine.
//!
//! - **Solvers**: Newton-Raphson, Brent, bisection, a Newton/Brent hybrid
//!   and geometric bracket expansion
//! - **Interpolation**: piecewise-linear with configurable extrapolation
//! - **Optimization**: Levenberg-Marquardt least squares

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::float_cmp)]

pub mod error;
pub mod interpolation;
pub mod optimization;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::interpolation::{Interpolator, LinearInterpolator};
    pub use crate::optimization::{levenberg_marquardt, OptimizationConfig, OptimizationResult};
    pub use crate::solvers::{
        bisection, brent, expand_bracket, hybrid, newton_raphson, SolverConfig, SolverResult,
    };
}

pub use error::{MathError, MathResult};

//! Curve implementations.
//!
//! - [`ZeroCurve`]: pillar zero rates with interpolation/extrapolation rules
//! - [`ShiftedCurve`]: a base curve plus a parallel continuous spread
//! - [`BenchmarkCurve`]: benchmark yields for G-spread and benchmark spread

mod benchmark;
mod shifted;
mod zero;

pub use benchmark::BenchmarkCurve;
pub use shifted::ShiftedCurve;
pub use zero::{ZeroCurve, ZeroCurveBuilder};

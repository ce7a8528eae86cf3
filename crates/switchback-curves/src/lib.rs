//! # Switchback Curves
//!
//! Curve objects consumed by the Switchback valuation engine.
//!
//! - **Curve Trait**: [`Curve`] with discount factors, zero and forward rates
//! - **Zero Curves**: [`ZeroCurve`] built from `(tenor, rate)` pillars
//! - **Shifts**: [`ShiftedCurve`] for Z-spread, OAS and parallel bumps
//! - **Benchmarks**: [`BenchmarkCurve`] of government yields
//!
//! Curves are immutable once built and are shared across threads behind
//! `Arc<dyn Curve>`.
//!
//! ## Quick Start
//!
//! ```rust
//! use switchback_core::types::{Compounding, Date};
//! use switchback_curves::prelude::*;
//!
//! let curve = ZeroCurveBuilder::new(Date::from_ymd(2025, 1, 15).unwrap())
//!     .add_pillar(0.25, 0.043)
//!     .add_pillar(2.0, 0.040)
//!     .add_pillar(10.0, 0.044)
//!     .with_interpolation(InterpolationMethod::LogLinear)
//!     .build()
//!     .unwrap();
//!
//! let fwd = curve.forward_rate(1.0, 1.25).unwrap();
//! let z = curve.zero_rate(5.0, Compounding::SemiAnnual).unwrap();
//! assert!(fwd > 0.0 && z > 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::doc_markdown)]

pub mod curves;
pub mod error;
pub mod interpolation;
pub mod traits;

pub use curves::{BenchmarkCurve, ShiftedCurve, ZeroCurve, ZeroCurveBuilder};
pub use error::{CurveError, CurveResult};
pub use interpolation::{ExtrapolationMethod, InterpolationMethod};
pub use traits::Curve;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::curves::{BenchmarkCurve, ShiftedCurve, ZeroCurve, ZeroCurveBuilder};
    pub use crate::error::{CurveError, CurveResult};
    pub use crate::interpolation::{ExtrapolationMethod, InterpolationMethod};
    pub use crate::traits::Curve;
}

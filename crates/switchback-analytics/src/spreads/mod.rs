//! Spread measures.
//!
//! Each spread measure answers a different question:
//!
//! | Spread | Question |
//! |--------|----------|
//! | G-spread | How far is the workout yield over the interpolated benchmark curve? |
//! | Benchmark spread | How far over the on-the-run benchmark chosen by step-down? |
//! | Z-spread | What parallel shift of the discount curve reprices the bond? |
//! | OAS | The same shift once the issuer's calls are valued on a lattice |
//!
//! G and benchmark spreads are measured at a workout date chosen by a
//! [`WorkoutPolicy`]; the Z-spread and OAS always use the cashflows to
//! maturity.

mod benchmark;
mod gspread;
mod oas;
mod zspread;

pub use benchmark::{
    benchmark_spread, original_tenor, select_benchmark, BenchmarkSelection,
    STEP_DOWN_ORIGINAL_TENOR,
};
pub use gspread::{g_spread, yield_from_g_spread};
pub use oas::{EffectiveRisk, OasCalculator};
pub use zspread::{z_spread, ZSpreadCalculator};

use serde::{Deserialize, Serialize};

/// How the workout date for yield spreads is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutPolicy {
    /// Always the maturity date.
    #[default]
    Maturity,
    /// The first call on or after settlement, or maturity if none remains.
    EarliestCall,
    /// The yield-to-worst workout.
    Worst,
}

/// A spread quote to price from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SpreadQuote {
    /// Over the interpolated benchmark curve at the workout.
    G(f64),
    /// Over the stepped-down benchmark.
    Benchmark(f64),
    /// Parallel shift of the discount curve.
    Z(f64),
}

impl SpreadQuote {
    /// The spread as a decimal.
    #[must_use]
    pub fn value(&self) -> f64 {
        match self {
            Self::G(s) | Self::Benchmark(s) | Self::Z(s) => *s,
        }
    }
}

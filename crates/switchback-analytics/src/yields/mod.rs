//! Price/yield conversion.
//!
//! [`price_from_yield`] is the closed-form pricer: each remaining cashflow
//! is discounted at the yield under the convention's compounding, at its
//! day-count time from settlement. [`yield_from_price`] inverts it with a
//! bracketed Newton iteration that falls back to Brent.
//!
//! # Example
//!
//! ```rust
//! use switchback_analytics::config::EngineConfig;
//! use switchback_analytics::pricing::YieldConvention;
//! use switchback_analytics::yields::{price_from_yield, yield_from_price};
//! use switchback_bonds::cashflows::Cashflow;
//! use switchback_core::types::Date;
//!
//! let settle = Date::from_ymd(2025, 1, 15).unwrap();
//! let flows = vec![Cashflow::redemption(Date::from_ymd(2026, 1, 15).unwrap(), 105.0)];
//! let convention = YieldConvention::default();
//!
//! let price = price_from_yield(&flows, settle, 0.05, &convention);
//! let solved = yield_from_price(&flows, settle, price, &convention, &EngineConfig::default()).unwrap();
//! assert!((solved.yield_value - 0.05).abs() < 1e-10);
//! ```

mod solver;

pub use solver::{dprice_dyield, price_from_yield, yield_from_price, YieldResult};

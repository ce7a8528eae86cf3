//! # Switchback Analytics
//!
//! Valuation and risk for fixed, floating and fix-to-float bonds with
//! optional Bermudan call schedules.
//!
//! - **Pricing**: curve discounting to settlement, clean/dirty/accrued
//! - **Yields**: yield from price and back under an explicit convention
//! - **Risk**: modified and Macaulay duration, convexity and DV01
//! - **Spreads**: G-spread, stepped-down benchmark spread, Z-spread and OAS
//! - **Workout**: yield to every call and maturity, and the worst of them
//! - **Options**: Hull-White model, fitted trinomial lattice and swaption
//!   calibration
//! - **Batch**: parallel valuation of many instruments over one context
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rust_decimal_macros::dec;
//! use switchback_analytics::prelude::*;
//! use switchback_bonds::Instrument;
//! use switchback_core::types::{Compounding, Date};
//! use switchback_curves::ZeroCurve;
//!
//! let settle = Date::from_ymd(2025, 1, 15).unwrap();
//! let curve = ZeroCurve::flat(settle, 0.04, Compounding::Continuous).unwrap();
//! let ctx = ValuationContext::new(settle, Arc::new(curve));
//!
//! let bond = Instrument::builder()
//!     .id("FIX5")
//!     .issue_date(Date::from_ymd(2024, 1, 15).unwrap())
//!     .maturity_date(Date::from_ymd(2030, 1, 15).unwrap())
//!     .coupon_rate(dec!(0.05))
//!     .build()
//!     .unwrap();
//!
//! let report = value(&bond, Some(101.0), &ctx).unwrap();
//! assert!(report.yield_to_maturity > 0.04);
//! assert!(report.risk.modified_duration > 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::float_cmp)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]

pub mod batch;
pub mod config;
pub mod error;
pub mod options;
pub mod pricing;
pub mod risk;
pub mod spreads;
pub mod valuation;
pub mod workout;
pub mod yields;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

pub use batch::{value_all, BatchItem, BatchResult};
pub use config::{EngineConfig, Validate, ValidationError};
pub use error::{AnalyticsError, AnalyticsResult};
pub use pricing::{PriceResult, ValuationContext, YieldConvention};
pub use risk::RiskMeasures;
pub use spreads::{SpreadQuote, WorkoutPolicy};
pub use valuation::{SpreadResult, ValuationReport, YieldOrPrice};
pub use workout::WorkoutResult;

/// Decimal reference data enters the numerics as `f64`.
pub(crate) fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::batch::{value_all, BatchItem, BatchResult};
    pub use crate::config::{EngineConfig, Validate};
    pub use crate::error::{AnalyticsError, AnalyticsResult};
    pub use crate::options::{
        HullWhiteCalibrator, HullWhiteParams, ShortRateModel, SwaptionQuote, TrinomialLattice,
    };
    pub use crate::pricing::{BondCashflows, PriceResult, ValuationContext, YieldConvention};
    pub use crate::risk::RiskMeasures;
    pub use crate::spreads::{
        BenchmarkSelection, EffectiveRisk, OasCalculator, SpreadQuote, WorkoutPolicy,
        ZSpreadCalculator,
    };
    pub use crate::valuation::{
        effective_risk, oas, price, price_from_spread, risk, spreads, value, workout, yield_of,
        SpreadResult, ValuationReport, YieldOrPrice,
    };
    pub use crate::workout::{worst_price, worst_yield, WorkoutCandidate, WorkoutResult};
}

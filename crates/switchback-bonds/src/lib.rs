//! # Switchback Bonds
//!
//! Instrument terms and cashflow generation for the Switchback fix-to-float
//! valuation engine.
//!
//! - **Instruments**: [`Instrument`] covering fixed bullets, floating-rate
//!   notes and fix-to-float bonds, with an optional [`CallSchedule`]
//! - **Schedules**: per-segment accrual periods rolled from the segment start
//! - **Cashflows**: fixed and projected floating coupons, redemption at
//!   maturity or at a call date
//! - **Accrued Interest**: at the coupon rate in effect on settlement
//!
//! ## Example
//!
//! ```rust
//! use rust_decimal_macros::dec;
//! use switchback_bonds::prelude::*;
//! use switchback_core::types::{Compounding, Date};
//! use switchback_curves::ZeroCurve;
//!
//! let bond = Instrument::builder()
//!     .issue_date(Date::from_ymd(2024, 1, 15).unwrap())
//!     .switch_date(Date::from_ymd(2027, 1, 15).unwrap())
//!     .maturity_date(Date::from_ymd(2034, 1, 15).unwrap())
//!     .coupon_rate(dec!(0.05))
//!     .floating(FloatingTerms::new(dec!(0.0125)))
//!     .build()
//!     .unwrap();
//!
//! let sofr = ZeroCurve::flat(Date::from_ymd(2025, 1, 15).unwrap(), 0.04, Compounding::Continuous)
//!     .unwrap();
//! let schedule = generate(&bond).unwrap();
//! let flows = build(&bond, &schedule, Some(&sofr)).unwrap();
//! assert_eq!(flows.len(), 6 + 28 + 1);
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

pub mod cashflows;
pub mod error;
pub mod instruments;

pub use error::{BondError, BondResult};
pub use instruments::{CallEntry, CallSchedule, FloatingTerms, Instrument, InstrumentBuilder};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::cashflows::{
        accrued_interest, build, build_to_call, generate, Cashflow, CashflowKind, Period,
        Schedule, ScheduleConfig, Segment,
    };
    pub use crate::error::{BondError, BondResult};
    pub use crate::instruments::{
        CallEntry, CallSchedule, FloatingTerms, Instrument, InstrumentBuilder, InstrumentKind,
    };
}

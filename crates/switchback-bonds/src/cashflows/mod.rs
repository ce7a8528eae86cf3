//! Schedules, cashflows and accrued interest.
//!
//! - [`generate`]: accrual schedule of an instrument
//! - [`build`] / [`build_to_call`]: coupon and redemption cashflows
//! - [`accrued_interest`]: accrued at settlement from a cashflow set

mod accrued;
mod builder;
mod cashflow;
mod schedule;

pub use accrued::{accrued_for_period, accrued_interest};
pub use builder::{build, build_to_call};
pub use cashflow::{Cashflow, CashflowKind};
pub use schedule::{generate, Period, Schedule, ScheduleConfig, Segment};

//! Discounting and projection.
//!
//! Prices are settlement-date prices per 100 of face. The dirty price is
//! the curve present value of every cashflow paid after settlement,
//! forward-valued to settlement; the clean price subtracts the coupon
//! accrued in the period containing settlement.

mod context;
mod discounting;

pub use context::{ValuationContext, YieldConvention};
pub use discounting::{
    per_hundred, present_value, price, BondCashflows, CallRight, PriceResult,
};

//! Domain types shared by every layer of the engine.
//!
//! - [`Date`]: calendar date with coupon-schedule arithmetic
//! - [`Frequency`]: coupon payment frequency
//! - [`Compounding`]: interest compounding convention

mod date;
mod frequency;

pub use date::Date;
pub use frequency::{Compounding, Frequency};

//! Instrument terms.
//!
//! A single [`Instrument`] value type covers fixed bullets, floating-rate
//! notes and fix-to-float bonds; a non-empty [`CallSchedule`] makes any of
//! them callable.

mod call_schedule;
mod instrument;

pub use call_schedule::{CallEntry, CallSchedule};
pub use instrument::{FloatingTerms, Instrument, InstrumentBuilder, InstrumentKind};

pub(crate) use instrument::to_f64;

//! # Switchback Core
//!
//! Dates, conventions and calendars for the Switchback fix-to-float
//! valuation engine.
//!
//! - **Types**: [`Date`], [`Frequency`], [`Compounding`]
//! - **Day Count Conventions**: ACT/360, ACT/365F, ACT/ACT, 30/360 families
//! - **Business Day Calendars**: weekend-only and US government bond
//!
//! ## Example
//!
//! ```rust
//! use switchback_core::prelude::*;
//!
//! let cal = CalendarKind::UsGovernmentBond.calendar();
//! let trade = Date::from_ymd(2025, 7, 3).unwrap();
//! let settle = settlement_date(trade, 1, cal).unwrap();
//! assert_eq!(settle, Date::from_ymd(2025, 7, 7).unwrap());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::trivially_copy_pass_by_ref)]

pub mod calendars;
pub mod daycounts;
pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::calendars::{
        settlement_date, BusinessDayConvention, Calendar, CalendarKind, UsGovernmentBondCalendar,
        WeekendCalendar,
    };
    pub use crate::daycounts::{day_count_fraction, DayCount, DayCountConvention};
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::types::{Compounding, Date, Frequency};
}

pub use error::{CoreError, CoreResult};
pub use types::{Compounding, Date, Frequency};

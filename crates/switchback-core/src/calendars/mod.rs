//! Business day calendars and conventions.
//!
//! - [`Calendar`]: business day test plus adjustment and rolling
//! - [`WeekendCalendar`]: Saturdays and Sundays only
//! - [`UsGovernmentBondCalendar`]: US government bond market holidays
//! - [`settlement_date`]: trade date plus a settlement lag in business days

mod conventions;
mod us_calendar;

pub use conventions::{adjust, BusinessDayConvention};
pub use us_calendar::UsGovernmentBondCalendar;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::Date;

/// Trait for business day calendars.
pub trait Calendar: Send + Sync {
    /// Returns the name of the calendar.
    fn name(&self) -> &'static str;

    /// Returns true if the date is a business day.
    fn is_business_day(&self, date: Date) -> bool;

    /// Returns true if the date is not a business day.
    fn is_holiday(&self, date: Date) -> bool {
        !self.is_business_day(date)
    }

    /// Adjusts a date according to the given business day convention.
    fn adjust(&self, date: Date, convention: BusinessDayConvention) -> Date {
        conventions::adjust(date, convention, self)
    }

    /// Advances a date by a number of business days (negative moves back).
    fn add_business_days(&self, date: Date, days: i32) -> Date {
        let mut result = date;
        let mut remaining = days.unsigned_abs();
        let direction: i64 = if days >= 0 { 1 } else { -1 };

        while remaining > 0 {
            result = result.add_days(direction);
            if self.is_business_day(result) {
                remaining -= 1;
            }
        }

        result
    }

    /// Returns the next business day on or after the given date.
    fn next_business_day(&self, date: Date) -> Date {
        self.adjust(date, BusinessDayConvention::Following)
    }
}

/// A weekend-only calendar (no holidays).
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendCalendar;

impl Calendar for WeekendCalendar {
    fn name(&self) -> &'static str {
        "Weekend Only"
    }

    fn is_business_day(&self, date: Date) -> bool {
        !date.is_weekend()
    }
}

/// Serializable calendar selector carried on instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CalendarKind {
    /// Saturdays and Sundays only.
    WeekendOnly,
    /// US government bond market.
    #[default]
    UsGovernmentBond,
}

impl CalendarKind {
    /// Returns the calendar implementation.
    #[must_use]
    pub fn calendar(&self) -> &'static dyn Calendar {
        match self {
            CalendarKind::WeekendOnly => &WeekendCalendar,
            CalendarKind::UsGovernmentBond => &UsGovernmentBondCalendar,
        }
    }
}

/// Settlement date for a trade: `lag` business days after `trade_date`.
///
/// A zero lag still rolls a non-business trade date forward.
///
/// # Errors
///
/// Returns `CoreError::CalendarError` for lags above 30 business days.
pub fn settlement_date(trade_date: Date, lag: u32, calendar: &dyn Calendar) -> CoreResult<Date> {
    if lag > 30 {
        return Err(CoreError::calendar_error(format!(
            "settlement lag of {lag} business days is not supported"
        )));
    }
    if lag == 0 {
        return Ok(calendar.next_business_day(trade_date));
    }
    let lag = i32::try_from(lag).map_err(|e| CoreError::calendar_error(e.to_string()))?;
    let settle = calendar.add_business_days(trade_date, lag);
    log::trace!("settlement {trade_date} + {lag}bd -> {settle} ({})", calendar.name());
    Ok(settle)
}

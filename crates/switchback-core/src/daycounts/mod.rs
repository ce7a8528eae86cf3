//! Day count conventions.
//!
//! A day count turns two dates into a year fraction. Coupon accruals use
//! the instrument's convention; yields use the convention of the
//! valuation context.
//!
//! # Supported Conventions
//!
//! - [`Act360`]: Actual/360, SOFR-linked floating coupons
//! - [`Act365Fixed`]: Actual/365 Fixed, curve time
//! - [`ActActIsda`]: Actual/Actual ISDA, year-based split
//! - [`ActActIcma`]: Actual/Actual ICMA, period-based
//! - [`Thirty360US`]: 30/360 US with February end-of-month rules
//! - [`Thirty360E`]: 30E/360 Eurobond basis
//!
//! # Usage
//!
//! ```rust
//! use switchback_core::daycounts::{DayCount, DayCountConvention};
//! use switchback_core::types::Date;
//!
//! let dc: DayCountConvention = "D30360".parse().unwrap();
//! let start = Date::from_ymd(2025, 1, 15).unwrap();
//! let end = Date::from_ymd(2025, 7, 15).unwrap();
//!
//! assert_eq!(dc.to_day_count().day_count(start, end), 180);
//! ```

mod act360;
mod act365;
mod actact;
mod thirty360;

pub use act360::Act360;
pub use act365::Act365Fixed;
pub use actact::{ActActIcma, ActActIsda};
pub use thirty360::{Thirty360E, Thirty360US};

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Date;

/// Trait for day count conventions.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait DayCount: Send + Sync {
    /// Returns the name of the day count convention.
    fn name(&self) -> &'static str;

    /// Calculates the year fraction between two dates.
    ///
    /// Negative if `end` is before `start`.
    fn year_fraction(&self, start: Date, end: Date) -> Decimal;

    /// Calculates the day count between two dates under the convention.
    fn day_count(&self, start: Date, end: Date) -> i64;
}

/// Runtime selector for the supported day count conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DayCountConvention {
    /// Actual/360
    Act360,
    /// Actual/365 Fixed
    Act365Fixed,
    /// Actual/Actual ISDA
    ActActIsda,
    /// Actual/Actual ICMA (semi-annual reference periods)
    ActActIcma,
    /// 30/360 US (Bond Basis)
    #[default]
    Thirty360US,
    /// 30E/360 (Eurobond Basis)
    Thirty360E,
}

impl DayCountConvention {
    /// Creates a boxed day count implementation.
    #[must_use]
    pub fn to_day_count(&self) -> Box<dyn DayCount> {
        match self {
            DayCountConvention::Act360 => Box::new(Act360),
            DayCountConvention::Act365Fixed => Box::new(Act365Fixed),
            DayCountConvention::ActActIsda => Box::new(ActActIsda),
            DayCountConvention::ActActIcma => Box::new(ActActIcma::default()),
            DayCountConvention::Thirty360US => Box::new(Thirty360US),
            DayCountConvention::Thirty360E => Box::new(Thirty360E),
        }
    }

    /// Returns the market name of the convention.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DayCountConvention::Act360 => "ACT/360",
            DayCountConvention::Act365Fixed => "ACT/365F",
            DayCountConvention::ActActIsda => "ACT/ACT ISDA",
            DayCountConvention::ActActIcma => "ACT/ACT ICMA",
            DayCountConvention::Thirty360US => "30/360 US",
            DayCountConvention::Thirty360E => "30E/360",
        }
    }

    /// Nominal days in a year under the convention.
    #[must_use]
    pub fn basis(&self) -> u32 {
        match self {
            DayCountConvention::Act360
            | DayCountConvention::Thirty360US
            | DayCountConvention::Thirty360E => 360,
            DayCountConvention::Act365Fixed
            | DayCountConvention::ActActIsda
            | DayCountConvention::ActActIcma => 365,
        }
    }

    /// Returns true for the 30/360 family.
    #[must_use]
    pub fn is_thirty_360(&self) -> bool {
        matches!(
            self,
            DayCountConvention::Thirty360US | DayCountConvention::Thirty360E
        )
    }

    /// Year fraction between two dates under this convention.
    #[must_use]
    pub fn year_fraction(&self, start: Date, end: Date) -> Decimal {
        self.to_day_count().year_fraction(start, end)
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DayCountConvention {
    type Err = CoreError;

    /// Parses market strings such as `ACT360`, `ACT/365`, `30/360` or `D30360`.
    ///
    /// Case, spaces, slashes, dashes and underscores are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '/' | ' ' | '-' | '_' | '.'))
            .collect::<String>()
            .to_uppercase();

        match key.as_str() {
            "ACT360" | "A360" | "ACTUAL360" => Ok(DayCountConvention::Act360),
            "ACT365" | "ACT365F" | "ACT365FIXED" | "A365" | "A365F" => {
                Ok(DayCountConvention::Act365Fixed)
            }
            "ACTACT" | "ACTACTISDA" | "AA" => Ok(DayCountConvention::ActActIsda),
            "ACTACTICMA" | "ACTACTISMA" => Ok(DayCountConvention::ActActIcma),
            "30360" | "D30360" | "30360US" | "BONDBASIS" | "THIRTY360" => {
                Ok(DayCountConvention::Thirty360US)
            }
            "30E360" | "D30E360" | "EUROBOND" => Ok(DayCountConvention::Thirty360E),
            _ => Err(CoreError::UnknownDayCount {
                name: s.to_string(),
            }),
        }
    }
}

/// Year fraction between two dates as `f64`.
///
/// Numerical code works in `f64`; this is the boundary conversion.
#[must_use]
pub fn day_count_fraction(start: Date, end: Date, convention: DayCountConvention) -> f64 {
    convention
        .year_fraction(start, end)
        .to_f64()
        .unwrap_or(0.0)
}

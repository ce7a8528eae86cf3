//! Accrued interest.
//!
//! Accrued interest at settlement is the coupon rate in effect for the
//! period containing the settlement date, applied over the day count
//! fraction from the period start to settlement.
//!
//! # Example
//!
//! ```rust
//! use switchback_bonds::cashflows::accrued_for_period;
//! use switchback_core::daycounts::DayCountConvention;
//! use switchback_core::types::Date;
//!
//! let accrued = accrued_for_period(
//!     Date::from_ymd(2025, 1, 15).unwrap(),
//!     Date::from_ymd(2025, 7, 15).unwrap(),
//!     Date::from_ymd(2025, 4, 15).unwrap(),
//!     0.05,
//!     100.0,
//!     DayCountConvention::Thirty360US,
//! );
//! assert!((accrued - 1.25).abs() < 1e-12);
//! ```

use switchback_core::daycounts::DayCountConvention;
use switchback_core::types::Date;

use super::cashflow::Cashflow;
use crate::instruments::to_f64;

/// Accrued interest on `face` at `rate` for settlement inside
/// `[period_start, period_end)`, using the day count year fraction from the
/// period start.
#[must_use]
pub fn accrued_for_period(
    period_start: Date,
    period_end: Date,
    settlement: Date,
    rate: f64,
    face: f64,
    day_count: DayCountConvention,
) -> f64 {
    if settlement <= period_start || settlement >= period_end {
        return 0.0;
    }
    face * rate * to_f64(day_count.year_fraction(period_start, settlement))
}

/// Accrued interest at `settlement` from a cashflow set.
///
/// Uses the coupon whose accrual period contains settlement; zero on a
/// coupon date or outside the schedule. Under ACT/ACT ICMA the accrued is
/// the actual-day share of that coupon.
#[must_use]
pub fn accrued_interest(
    cashflows: &[Cashflow],
    settlement: Date,
    face: f64,
    day_count: DayCountConvention,
) -> f64 {
    let Some(coupon) = cashflows
        .iter()
        .find(|cf| cf.is_coupon() && cf.accrues_on(settlement))
    else {
        return 0.0;
    };
    let (Some(start), Some(end)) = (coupon.accrual_start, coupon.accrual_end) else {
        return 0.0;
    };

    if day_count == DayCountConvention::ActActIcma {
        let elapsed = start.days_between(&settlement) as f64;
        let full = start.days_between(&end) as f64;
        return coupon.amount * elapsed / full;
    }

    accrued_for_period(start, end, settlement, coupon.rate, face, day_count)
}

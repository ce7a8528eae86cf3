//! Actual/Actual day count conventions.

use rust_decimal::Decimal;

use super::DayCount;
use crate::types::Date;

/// Actual/Actual ISDA.
///
/// Splits the accrual period by calendar year and divides each portion by
/// the length of its own year.
///
/// # Formula
///
/// $$\text{YF} = \frac{\text{days in non-leap years}}{365} + \frac{\text{days in leap years}}{366}$$
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActActIsda;

impl DayCount for ActActIsda {
    fn name(&self) -> &'static str {
        "ACT/ACT ISDA"
    }

    fn year_fraction(&self, start: Date, end: Date) -> Decimal {
        if start > end {
            return -self.year_fraction(end, start);
        }

        let mut total = Decimal::ZERO;
        let mut current = start;

        while current.year() < end.year() {
            let days_in_year = current.days_in_year();
            let to_new_year = i64::from(days_in_year - current.day_of_year() + 1);
            total += Decimal::from(to_new_year) / Decimal::from(days_in_year);
            current = current.add_days(to_new_year);
        }

        total + Decimal::from(current.days_between(&end)) / Decimal::from(current.days_in_year())
    }

    fn day_count(&self, start: Date, end: Date) -> i64 {
        start.days_between(&end)
    }
}

/// Actual/Actual ICMA.
///
/// The year fraction is the actual days accrued divided by the frequency
/// times the actual length of the reference coupon period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActActIcma {
    frequency: u32,
}

impl ActActIcma {
    /// Creates the convention for a given coupon frequency (periods per year).
    #[must_use]
    pub fn new(frequency: u32) -> Self {
        Self {
            frequency: frequency.max(1),
        }
    }

    /// Year fraction measured against an explicit reference coupon period.
    #[must_use]
    pub fn year_fraction_with_period(
        &self,
        start: Date,
        end: Date,
        period_start: Date,
        period_end: Date,
    ) -> Decimal {
        let days_in_period = period_start.days_between(&period_end);
        if days_in_period == 0 {
            return Decimal::ZERO;
        }

        Decimal::from(start.days_between(&end))
            / (Decimal::from(self.frequency) * Decimal::from(days_in_period))
    }
}

impl Default for ActActIcma {
    fn default() -> Self {
        Self::new(2)
    }
}

impl DayCount for ActActIcma {
    fn name(&self) -> &'static str {
        "ACT/ACT ICMA"
    }

    /// Without a reference period the regular coupon period starting at
    /// `start` is used.
    fn year_fraction(&self, start: Date, end: Date) -> Decimal {
        let months = (12 / self.frequency) as i32;
        match start.add_months(months) {
            Ok(period_end) => self.year_fraction_with_period(start, end, start, period_end),
            Err(_) => ActActIsda.year_fraction(start, end),
        }
    }

    fn day_count(&self, start: Date, end: Date) -> i64 {
        start.days_between(&end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_isda_within_year() {
        let dc = ActActIsda;
        let start = Date::from_ymd(2025, 1, 1).unwrap();
        let end = Date::from_ymd(2025, 7, 1).unwrap();
        assert_eq!(dc.year_fraction(start, end), dec!(181) / dec!(365));
    }

    #[test]
    fn test_isda_spanning_leap_year() {
        let dc = ActActIsda;
        let start = Date::from_ymd(2023, 11, 1).unwrap();
        let end = Date::from_ymd(2024, 3, 1).unwrap();
        // 61 days in 2023 and 60 days in 2024
        let expected = dec!(61) / dec!(365) + dec!(60) / dec!(366);
        assert_eq!(dc.year_fraction(start, end), expected);
    }

    #[test]
    fn test_isda_full_years() {
        let dc = ActActIsda;
        let start = Date::from_ymd(2023, 1, 1).unwrap();
        let end = Date::from_ymd(2025, 1, 1).unwrap();
        assert_eq!(dc.year_fraction(start, end), dec!(2));
        assert_eq!(dc.year_fraction(end, start), dec!(-2));
    }

    #[test]
    fn test_icma_regular_period() {
        let dc = ActActIcma::new(2);
        let start = Date::from_ymd(2024, 1, 15).unwrap();
        let end = Date::from_ymd(2024, 7, 15).unwrap();
        assert_eq!(dc.year_fraction(start, end), dec!(0.5));
    }

    #[test]
    fn test_icma_partial_period() {
        let dc = ActActIcma::new(2);
        let period_start = Date::from_ymd(2024, 1, 15).unwrap();
        let period_end = Date::from_ymd(2024, 7, 15).unwrap();
        let settle = Date::from_ymd(2024, 4, 15).unwrap();
        // 91 of 182 days
        let yf = dc.year_fraction_with_period(period_start, settle, period_start, period_end);
        assert_eq!(yf, dec!(91) / dec!(364));
    }
}

//! US government bond market calendar.

use chrono::Weekday;

use super::Calendar;
use crate::types::Date;

/// US government bond market calendar.
///
/// Federal holidays with weekend observance (Saturday holidays are observed
/// on the preceding Friday, Sunday holidays on the following Monday), plus
/// Good Friday when the bond market is closed.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsGovernmentBondCalendar;

impl UsGovernmentBondCalendar {
    /// Returns true if the date is a market holiday (weekends excluded).
    #[must_use]
    pub fn is_holiday_date(&self, date: Date) -> bool {
        let year = date.year();
        let month = date.month();

        if is_observed_fixed_holiday(date, 1, 1)
            || is_observed_fixed_holiday(date, 7, 4)
            || is_observed_fixed_holiday(date, 11, 11)
            || is_observed_fixed_holiday(date, 12, 25)
            || (year >= 2022 && is_observed_fixed_holiday(date, 6, 19))
        {
            return true;
        }

        let floating = match month {
            // MLK Day and Presidents Day
            1 | 2 => is_nth_weekday(date, Weekday::Mon, 3),
            5 => is_last_weekday(date, Weekday::Mon),
            9 => is_nth_weekday(date, Weekday::Mon, 1),
            10 => is_nth_weekday(date, Weekday::Mon, 2),
            11 => is_nth_weekday(date, Weekday::Thu, 4),
            _ => false,
        };

        floating || is_good_friday(date)
    }
}

impl Calendar for UsGovernmentBondCalendar {
    fn name(&self) -> &'static str {
        "US Government Bond"
    }

    fn is_business_day(&self, date: Date) -> bool {
        !date.is_weekend() && !self.is_holiday_date(date)
    }
}

/// Fixed-date holiday on `(month, day)` or its weekday observance.
///
/// A Saturday New Year's Day is not moved back into December.
fn is_observed_fixed_holiday(date: Date, month: u32, day: u32) -> bool {
    let weekday = date.weekday();
    if date.month() == month && date.day() == day {
        return true;
    }

    // Friday before a Saturday holiday
    let next = date.add_days(1);
    if weekday == Weekday::Fri && next.month() == month && next.day() == day && month != 1 {
        return true;
    }

    // Monday after a Sunday holiday
    let prev = date.add_days(-1);
    weekday == Weekday::Mon && prev.month() == month && prev.day() == day
}

fn is_nth_weekday(date: Date, weekday: Weekday, n: u32) -> bool {
    date.weekday() == weekday && (date.day() - 1) / 7 + 1 == n
}

fn is_last_weekday(date: Date, weekday: Weekday) -> bool {
    date.weekday() == weekday && date.add_days(7).month() != date.month()
}

fn is_good_friday(date: Date) -> bool {
    if date.weekday() != Weekday::Fri || !(3..=4).contains(&date.month()) {
        return false;
    }
    let (month, day) = easter_sunday(date.year());
    let sunday = date.add_days(2);
    sunday.month() == month && sunday.day() == day
}

/// Gregorian Easter Sunday as `(month, day)` (anonymous Gregorian algorithm).
fn easter_sunday(year: i32) -> (u32, u32) {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    (month as u32, day as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_weekend() {
        let cal = UsGovernmentBondCalendar;
        assert!(!cal.is_business_day(d(2025, 1, 4)));
        assert!(!cal.is_business_day(d(2025, 1, 5)));
        assert!(cal.is_business_day(d(2025, 1, 6)));
    }

    #[test]
    fn test_fixed_holidays_and_observance() {
        let cal = UsGovernmentBondCalendar;
        assert!(!cal.is_business_day(d(2025, 1, 1)));
        assert!(!cal.is_business_day(d(2025, 7, 4)));
        assert!(!cal.is_business_day(d(2025, 12, 25)));
        // 2021-07-04 was a Sunday, observed Monday 5th
        assert!(!cal.is_business_day(d(2021, 7, 5)));
        // 2026-07-04 is a Saturday, observed Friday 3rd
        assert!(!cal.is_business_day(d(2026, 7, 3)));
        // 2022-01-01 was a Saturday; 2021-12-31 stays open
        assert!(cal.is_business_day(d(2021, 12, 31)));
    }

    #[test]
    fn test_floating_holidays() {
        let cal = UsGovernmentBondCalendar;
        assert!(!cal.is_business_day(d(2025, 1, 20))); // MLK
        assert!(!cal.is_business_day(d(2025, 2, 17))); // Presidents
        assert!(!cal.is_business_day(d(2025, 5, 26))); // Memorial
        assert!(!cal.is_business_day(d(2025, 9, 1))); // Labor
        assert!(!cal.is_business_day(d(2025, 10, 13))); // Columbus
        assert!(!cal.is_business_day(d(2025, 11, 27))); // Thanksgiving
        assert!(cal.is_business_day(d(2025, 11, 20)));
    }

    #[test]
    fn test_good_friday() {
        let cal = UsGovernmentBondCalendar;
        assert_eq!(easter_sunday(2024), (3, 31));
        assert_eq!(easter_sunday(2025), (4, 20));
        assert!(!cal.is_business_day(d(2024, 3, 29)));
        assert!(!cal.is_business_day(d(2025, 4, 18)));
        assert!(cal.is_business_day(d(2025, 4, 17)));
    }

    #[test]
    fn test_juneteenth() {
        let cal = UsGovernmentBondCalendar;
        assert!(!cal.is_business_day(d(2024, 6, 19)));
        assert!(cal.is_business_day(d(2021, 6, 18)));
    }
}

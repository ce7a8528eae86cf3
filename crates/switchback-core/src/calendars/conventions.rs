//! Business day adjustment conventions.

use serde::{Deserialize, Serialize};

use super::Calendar;
use crate::types::Date;

/// How a date that falls on a non-business day is moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BusinessDayConvention {
    /// Keep the date even if it is not a business day.
    Unadjusted,

    /// Move to the following business day.
    #[default]
    Following,

    /// Following, unless that crosses into the next month, then preceding.
    ModifiedFollowing,

    /// Move to the preceding business day.
    Preceding,

    /// Preceding, unless that crosses into the previous month, then following.
    ModifiedPreceding,
}

impl std::fmt::Display for BusinessDayConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BusinessDayConvention::Unadjusted => "Unadjusted",
            BusinessDayConvention::Following => "Following",
            BusinessDayConvention::ModifiedFollowing => "Modified Following",
            BusinessDayConvention::Preceding => "Preceding",
            BusinessDayConvention::ModifiedPreceding => "Modified Preceding",
        };
        write!(f, "{name}")
    }
}

/// Adjusts a date according to the given business day convention.
pub fn adjust<C: Calendar + ?Sized>(
    date: Date,
    convention: BusinessDayConvention,
    calendar: &C,
) -> Date {
    if calendar.is_business_day(date) {
        return date;
    }

    match convention {
        BusinessDayConvention::Unadjusted => date,
        BusinessDayConvention::Following => following(date, calendar),
        BusinessDayConvention::ModifiedFollowing => {
            let adjusted = following(date, calendar);
            if adjusted.month() == date.month() {
                adjusted
            } else {
                preceding(date, calendar)
            }
        }
        BusinessDayConvention::Preceding => preceding(date, calendar),
        BusinessDayConvention::ModifiedPreceding => {
            let adjusted = preceding(date, calendar);
            if adjusted.month() == date.month() {
                adjusted
            } else {
                following(date, calendar)
            }
        }
    }
}

fn following<C: Calendar + ?Sized>(mut date: Date, calendar: &C) -> Date {
    while !calendar.is_business_day(date) {
        date = date.add_days(1);
    }
    date
}

fn preceding<C: Calendar + ?Sized>(mut date: Date, calendar: &C) -> Date {
    while !calendar.is_business_day(date) {
        date = date.add_days(-1);
    }
    date
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendars::WeekendCalendar;

    #[test]
    fn test_following_and_preceding() {
        let cal = WeekendCalendar;
        let saturday = Date::from_ymd(2025, 1, 4).unwrap();

        assert_eq!(
            adjust(saturday, BusinessDayConvention::Following, &cal),
            Date::from_ymd(2025, 1, 6).unwrap()
        );
        assert_eq!(
            adjust(saturday, BusinessDayConvention::Preceding, &cal),
            Date::from_ymd(2025, 1, 3).unwrap()
        );
        assert_eq!(adjust(saturday, BusinessDayConvention::Unadjusted, &cal), saturday);
    }

    #[test]
    fn test_modified_following_stays_in_month() {
        let cal = WeekendCalendar;
        // Saturday 2025-05-31: following would land in June
        let date = Date::from_ymd(2025, 5, 31).unwrap();
        assert_eq!(
            adjust(date, BusinessDayConvention::ModifiedFollowing, &cal),
            Date::from_ymd(2025, 5, 30).unwrap()
        );
    }

    #[test]
    fn test_modified_preceding_stays_in_month() {
        let cal = WeekendCalendar;
        // Saturday 2025-03-01: preceding would land in February
        let date = Date::from_ymd(2025, 3, 1).unwrap();
        assert_eq!(
            adjust(date, BusinessDayConvention::ModifiedPreceding, &cal),
            Date::from_ymd(2025, 3, 3).unwrap()
        );
    }

    #[test]
    fn test_business_day_unchanged() {
        let cal = WeekendCalendar;
        let wednesday = Date::from_ymd(2025, 1, 15).unwrap();
        for conv in [
            BusinessDayConvention::Following,
            BusinessDayConvention::ModifiedFollowing,
            BusinessDayConvention::Preceding,
            BusinessDayConvention::ModifiedPreceding,
        ] {
            assert_eq!(adjust(wednesday, conv, &cal), wednesday);
        }
    }
}

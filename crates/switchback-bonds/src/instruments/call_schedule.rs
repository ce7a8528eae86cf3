//! Issuer call schedules.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use switchback_core::types::Date;

use crate::error::{BondError, BondResult};

/// A single call date and its redemption price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEntry {
    /// Date on which the issuer may redeem.
    pub call_date: Date,
    /// Redemption price per 100 of face (e.g. 100 = par).
    pub call_price: Decimal,
}

impl CallEntry {
    /// Creates a new call entry.
    #[must_use]
    pub fn new(call_date: Date, call_price: Decimal) -> Self {
        Self {
            call_date,
            call_price,
        }
    }
}

/// Ordered call dates of a callable instrument.
///
/// An empty schedule means the instrument is not callable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CallEntry>", into = "Vec<CallEntry>")]
pub struct CallSchedule {
    entries: Vec<CallEntry>,
}

impl CallSchedule {
    /// Creates a call schedule.
    ///
    /// # Errors
    ///
    /// Returns `BondError::Configuration` if dates are not strictly
    /// increasing or a price is not strictly positive.
    pub fn new(entries: Vec<CallEntry>) -> BondResult<Self> {
        for (i, entry) in entries.iter().enumerate() {
            if entry.call_price <= Decimal::ZERO {
                return Err(BondError::configuration(format!(
                    "call price on {} must be positive, got {}",
                    entry.call_date, entry.call_price
                )));
            }
            if i > 0 && entry.call_date <= entries[i - 1].call_date {
                return Err(BondError::configuration(format!(
                    "call dates must be strictly increasing: {} follows {}",
                    entry.call_date,
                    entries[i - 1].call_date
                )));
            }
        }
        Ok(Self { entries })
    }

    /// A schedule with no calls.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if there are no calls.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of call dates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// All call entries in date order.
    #[must_use]
    pub fn entries(&self) -> &[CallEntry] {
        &self.entries
    }

    /// The first call entry, if any.
    #[must_use]
    pub fn first_call(&self) -> Option<&CallEntry> {
        self.entries.first()
    }

    /// The last call date, if any.
    #[must_use]
    pub fn last_call_date(&self) -> Option<Date> {
        self.entries.last().map(|e| e.call_date)
    }

    /// Call price on an exact call date.
    #[must_use]
    pub fn call_price_on(&self, date: Date) -> Option<Decimal> {
        self.entries
            .iter()
            .find(|e| e.call_date == date)
            .map(|e| e.call_price)
    }

    /// Calls exercisable on or after `date`.
    pub fn calls_after(&self, date: Date) -> impl Iterator<Item = &CallEntry> {
        self.entries.iter().filter(move |e| e.call_date >= date)
    }
}

impl TryFrom<Vec<CallEntry>> for CallSchedule {
    type Error = BondError;

    fn try_from(entries: Vec<CallEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<CallSchedule> for Vec<CallEntry> {
    fn from(schedule: CallSchedule) -> Self {
        schedule.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn schedule() -> CallSchedule {
        CallSchedule::new(vec![
            CallEntry::new(date(2027, 1, 15), dec!(101)),
            CallEntry::new(date(2028, 1, 15), dec!(100.5)),
            CallEntry::new(date(2029, 1, 15), dec!(100)),
        ])
        .unwrap()
    }

    #[test]
    fn test_queries() {
        let calls = schedule();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls.first_call().unwrap().call_date, date(2027, 1, 15));
        assert_eq!(calls.call_price_on(date(2028, 1, 15)), Some(dec!(100.5)));
        assert_eq!(calls.call_price_on(date(2028, 1, 16)), None);
        assert_eq!(calls.calls_after(date(2027, 6, 1)).count(), 2);
        assert_eq!(calls.calls_after(date(2028, 1, 15)).count(), 2);
        assert_eq!(calls.last_call_date(), Some(date(2029, 1, 15)));
    }

    #[test]
    fn test_rejects_unordered_dates() {
        let result = CallSchedule::new(vec![
            CallEntry::new(date(2028, 1, 15), dec!(100)),
            CallEntry::new(date(2028, 1, 15), dec!(100)),
        ]);
        assert!(matches!(result, Err(BondError::Configuration { .. })));
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let result = CallSchedule::new(vec![CallEntry::new(date(2028, 1, 15), dec!(0))]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_is_not_callable() {
        let calls = CallSchedule::empty();
        assert!(calls.is_empty());
        assert!(calls.first_call().is_none());
    }

    #[test]
    fn test_serde_validates() {
        let json = serde_json::to_string(&schedule()).unwrap();
        let parsed: CallSchedule = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, schedule());

        let bad = r#"[{"call_date":"2028-01-15","call_price":100.0},{"call_date":"2027-01-15","call_price":100.0}]"#;
        assert!(serde_json::from_str::<CallSchedule>(bad).is_err());
    }
}

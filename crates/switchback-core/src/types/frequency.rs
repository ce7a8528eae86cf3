//! Payment frequency and compounding conventions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// Coupon payment frequency.
///
/// Only frequencies that split a year into whole months are representable,
/// which is what lets the schedule generator roll dates by month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Frequency {
    /// Annual payments (1 per year)
    Annual,
    /// Semi-annual payments (2 per year)
    #[default]
    SemiAnnual,
    /// Every four months (3 per year)
    EveryFourMonths,
    /// Quarterly payments (4 per year)
    Quarterly,
    /// Bi-monthly payments (6 per year)
    BiMonthly,
    /// Monthly payments (12 per year)
    Monthly,
}

impl Frequency {
    /// Builds a frequency from a number of periods per year.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidFrequency` unless `periods` is a positive divisor of 12.
    pub fn from_periods_per_year(periods: u32) -> CoreResult<Self> {
        match periods {
            1 => Ok(Frequency::Annual),
            2 => Ok(Frequency::SemiAnnual),
            3 => Ok(Frequency::EveryFourMonths),
            4 => Ok(Frequency::Quarterly),
            6 => Ok(Frequency::BiMonthly),
            12 => Ok(Frequency::Monthly),
            _ => Err(CoreError::InvalidFrequency {
                periods_per_year: periods,
            }),
        }
    }

    /// Returns the number of periods per year.
    #[must_use]
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Annual => 1,
            Frequency::SemiAnnual => 2,
            Frequency::EveryFourMonths => 3,
            Frequency::Quarterly => 4,
            Frequency::BiMonthly => 6,
            Frequency::Monthly => 12,
        }
    }

    /// Returns the number of months per period.
    #[must_use]
    pub fn months_per_period(&self) -> u32 {
        12 / self.periods_per_year()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Annual => "Annual",
            Frequency::SemiAnnual => "Semi-Annual",
            Frequency::EveryFourMonths => "Every Four Months",
            Frequency::Quarterly => "Quarterly",
            Frequency::BiMonthly => "Bi-Monthly",
            Frequency::Monthly => "Monthly",
        };
        write!(f, "{name}")
    }
}

/// Interest compounding convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Compounding {
    /// Simple interest (no compounding)
    Simple,
    /// Annual compounding
    Annual,
    /// Semi-annual compounding
    #[default]
    SemiAnnual,
    /// Quarterly compounding
    Quarterly,
    /// Monthly compounding
    Monthly,
    /// Continuous compounding
    Continuous,
}

impl Compounding {
    /// Returns the number of compounding periods per year, or `None` for
    /// simple and continuous compounding.
    #[must_use]
    pub fn periods_per_year(&self) -> Option<u32> {
        match self {
            Compounding::Annual => Some(1),
            Compounding::SemiAnnual => Some(2),
            Compounding::Quarterly => Some(4),
            Compounding::Monthly => Some(12),
            Compounding::Simple | Compounding::Continuous => None,
        }
    }

    /// Discount factor for `rate` over `t` years.
    ///
    /// # Example
    ///
    /// ```rust
    /// use switchback_core::types::Compounding;
    ///
    /// let df = Compounding::SemiAnnual.discount_factor(0.05, 1.0);
    /// assert!((df - 1.025_f64.powi(-2)).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn discount_factor(&self, rate: f64, t: f64) -> f64 {
        match self {
            Compounding::Continuous => (-rate * t).exp(),
            Compounding::Simple => 1.0 / (1.0 + rate * t),
            periodic => {
                let f = f64::from(periodic.periods_per_year().unwrap_or(1));
                (1.0 + rate / f).powf(-f * t)
            }
        }
    }

    /// Zero rate implied by discount factor `df` over `t` years.
    ///
    /// Returns 0 for non-positive `t` or `df`.
    #[must_use]
    pub fn zero_rate(&self, df: f64, t: f64) -> f64 {
        if t <= 0.0 || df <= 0.0 {
            return 0.0;
        }
        match self {
            Compounding::Continuous => -df.ln() / t,
            Compounding::Simple => (1.0 / df - 1.0) / t,
            periodic => {
                let f = f64::from(periodic.periods_per_year().unwrap_or(1));
                f * (df.powf(-1.0 / (f * t)) - 1.0)
            }
        }
    }

    /// Lowest rate for which the discount factor is defined.
    #[must_use]
    pub fn rate_floor(&self) -> f64 {
        match self {
            Compounding::Continuous => f64::NEG_INFINITY,
            Compounding::Simple => -1.0,
            periodic => -f64::from(periodic.periods_per_year().unwrap_or(1)),
        }
    }
}

impl fmt::Display for Compounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compounding::Simple => "Simple",
            Compounding::Annual => "Annual",
            Compounding::SemiAnnual => "Semi-Annual",
            Compounding::Quarterly => "Quarterly",
            Compounding::Monthly => "Monthly",
            Compounding::Continuous => "Continuous",
        };
        write!(f, "{name}")
    }
}

impl From<Frequency> for Compounding {
    fn from(freq: Frequency) -> Self {
        match freq {
            Frequency::Annual => Compounding::Annual,
            Frequency::SemiAnnual => Compounding::SemiAnnual,
            Frequency::Quarterly => Compounding::Quarterly,
            Frequency::Monthly => Compounding::Monthly,
            // No matching periodic convention; bond-equivalent is semi-annual.
            Frequency::EveryFourMonths | Frequency::BiMonthly => Compounding::SemiAnnual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_frequency_periods() {
        assert_eq!(Frequency::SemiAnnual.periods_per_year(), 2);
        assert_eq!(Frequency::Quarterly.months_per_period(), 3);
        assert_eq!(Frequency::EveryFourMonths.months_per_period(), 4);
    }

    #[test]
    fn test_from_periods_per_year() {
        assert_eq!(Frequency::from_periods_per_year(4).unwrap(), Frequency::Quarterly);
        assert!(Frequency::from_periods_per_year(0).is_err());
        assert!(Frequency::from_periods_per_year(5).is_err());
        assert!(Frequency::from_periods_per_year(24).is_err());
    }

    #[test]
    fn test_discount_factor_roundtrip() {
        for compounding in [
            Compounding::Simple,
            Compounding::Annual,
            Compounding::SemiAnnual,
            Compounding::Quarterly,
            Compounding::Monthly,
            Compounding::Continuous,
        ] {
            let df = compounding.discount_factor(0.045, 3.25);
            assert_relative_eq!(compounding.zero_rate(df, 3.25), 0.045, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_continuous_below_periodic() {
        let cont = Compounding::Continuous.discount_factor(0.05, 2.0);
        let annual = Compounding::Annual.discount_factor(0.05, 2.0);
        assert!(cont < annual);
    }

    #[test]
    fn test_rate_floor() {
        assert_eq!(Compounding::SemiAnnual.rate_floor(), -2.0);
        assert!(Compounding::Continuous.rate_floor().is_infinite());
    }
}

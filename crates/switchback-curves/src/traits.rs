//! The curve abstraction consumed by pricing.

use std::sync::Arc;

use switchback_core::types::{Compounding, Date};

use crate::error::CurveResult;

/// Days per year used to turn dates into curve time (ACT/365F).
pub const CURVE_DAYS_PER_YEAR: f64 = 365.0;

/// A discount curve.
///
/// Time is measured in years from [`Curve::reference_date`] on an
/// ACT/365 Fixed basis.
pub trait Curve: Send + Sync {
    /// Discount factor to time `t`.
    fn discount_factor(&self, t: f64) -> CurveResult<f64>;

    /// The curve's valuation date.
    fn reference_date(&self) -> Date;

    /// Zero rate to time `t` under the given compounding.
    fn zero_rate(&self, t: f64, compounding: Compounding) -> CurveResult<f64> {
        let df = self.discount_factor(t)?;
        Ok(compounding.zero_rate(df, t))
    }

    /// Simple forward rate between `t1` and `t2`.
    ///
    /// Returns 0 when `t2 <= t1`.
    fn forward_rate(&self, t1: f64, t2: f64) -> CurveResult<f64> {
        if t2 <= t1 {
            return Ok(0.0);
        }

        let df1 = self.discount_factor(t1)?;
        let df2 = self.discount_factor(t2)?;

        if df2 <= 0.0 {
            return Ok(0.0);
        }

        Ok((df1 / df2 - 1.0) / (t2 - t1))
    }

    /// Instantaneous forward rate at `t` by a one-day log-discount difference.
    fn instantaneous_forward(&self, t: f64) -> CurveResult<f64> {
        let h = 1.0 / CURVE_DAYS_PER_YEAR;
        let df = self.discount_factor(t)?;
        let df_plus = self.discount_factor(t + h)?;

        if df <= 0.0 || df_plus <= 0.0 {
            return Ok(0.0);
        }

        Ok(-(df_plus.ln() - df.ln()) / h)
    }

    /// Curve time of a date.
    fn year_fraction(&self, date: Date) -> f64 {
        self.reference_date().days_between(&date) as f64 / CURVE_DAYS_PER_YEAR
    }

    /// Discount factor to a date.
    fn discount_factor_at(&self, date: Date) -> CurveResult<f64> {
        self.discount_factor(self.year_fraction(date))
    }

    /// Simple forward rate between two dates.
    fn forward_rate_between(&self, start: Date, end: Date) -> CurveResult<f64> {
        self.forward_rate(self.year_fraction(start), self.year_fraction(end))
    }
}

impl<C: Curve + ?Sized> Curve for Arc<C> {
    fn discount_factor(&self, t: f64) -> CurveResult<f64> {
        (**self).discount_factor(t)
    }

    fn reference_date(&self) -> Date {
        (**self).reference_date()
    }
}

impl<C: Curve + ?Sized> Curve for &C {
    fn discount_factor(&self, t: f64) -> CurveResult<f64> {
        (**self).discount_factor(t)
    }

    fn reference_date(&self) -> Date {
        (**self).reference_date()
    }
}

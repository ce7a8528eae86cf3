//! Dated payments produced by the cashflow builder.

use serde::{Deserialize, Serialize};

use switchback_core::types::Date;

use super::schedule::Period;

/// What a cashflow pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CashflowKind {
    /// Coupon of a fixed period.
    FixedCoupon,
    /// Projected coupon of a floating period.
    FloatingCoupon,
    /// Principal repayment at maturity or call.
    Redemption,
}

/// A single payment.
///
/// Amounts are in currency units for the instrument's face value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cashflow {
    /// Payment date.
    pub date: Date,
    /// Payment amount.
    pub amount: f64,
    /// Payment type.
    pub kind: CashflowKind,
    /// Accrual start (coupons only).
    pub accrual_start: Option<Date>,
    /// Accrual end (coupons only).
    pub accrual_end: Option<Date>,
    /// Annualized coupon rate in effect (zero for redemptions).
    pub rate: f64,
}

impl Cashflow {
    /// A coupon for an accrual period.
    #[must_use]
    pub fn coupon(period: &Period, kind: CashflowKind, rate: f64, amount: f64) -> Self {
        Self {
            date: period.payment_date,
            amount,
            kind,
            accrual_start: Some(period.start),
            accrual_end: Some(period.end),
            rate,
        }
    }

    /// A principal repayment.
    #[must_use]
    pub fn redemption(date: Date, amount: f64) -> Self {
        Self {
            date,
            amount,
            kind: CashflowKind::Redemption,
            accrual_start: None,
            accrual_end: None,
            rate: 0.0,
        }
    }

    /// Returns true for fixed and floating coupons.
    #[must_use]
    pub fn is_coupon(&self) -> bool {
        !self.is_redemption()
    }

    /// Returns true for principal repayments.
    #[must_use]
    pub fn is_redemption(&self) -> bool {
        self.kind == CashflowKind::Redemption
    }

    /// Returns true if the coupon accrues over `date` (start inclusive,
    /// end exclusive).
    #[must_use]
    pub fn accrues_on(&self, date: Date) -> bool {
        match (self.accrual_start, self.accrual_end) {
            (Some(start), Some(end)) => date >= start && date < end,
            _ => false,
        }
    }
}

//! Curve discounting of instrument cashflows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use switchback_bonds::cashflows::{self, Cashflow, Schedule};
use switchback_bonds::Instrument;
use switchback_core::types::Date;
use switchback_curves::Curve;

use super::context::ValuationContext;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::to_f64;

/// Clean, dirty and accrued, per 100 of face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceResult {
    /// Dirty price less accrued interest.
    pub clean: f64,
    /// Present value of the remaining cashflows at settlement.
    pub dirty: f64,
    /// Accrued interest at settlement.
    pub accrued: f64,
}

impl PriceResult {
    /// Builds a result from a dirty price and accrued interest.
    #[must_use]
    pub fn from_dirty(dirty: f64, accrued: f64) -> Self {
        Self {
            clean: dirty - accrued,
            dirty,
            accrued,
        }
    }

    /// Builds a result from a clean price and accrued interest.
    #[must_use]
    pub fn from_clean(clean: f64, accrued: f64) -> Self {
        Self {
            clean,
            dirty: clean + accrued,
            accrued,
        }
    }
}

/// Present value at `settlement` of the cashflows paid after it.
///
/// A coupon dated on settlement is paid to the seller and is excluded.
///
/// Each amount is discounted at the curve's discount factor for its
/// payment date, and the sum is forward-valued to settlement by dividing by
/// the settlement discount factor.
///
/// # Errors
///
/// Returns `AnalyticsError::Interpolation` if the curve cannot be evaluated
/// at a payment date.
pub fn present_value(
    cashflows: &[Cashflow],
    curve: &dyn Curve,
    settlement: Date,
) -> AnalyticsResult<f64> {
    let settlement_df = curve.discount_factor_at(settlement)?;
    if settlement_df <= 0.0 {
        return Err(AnalyticsError::configuration(format!(
            "non-positive discount factor at settlement {settlement}"
        )));
    }

    let mut pv = 0.0;
    for cf in cashflows.iter().filter(|cf| cf.date > settlement) {
        pv += cf.amount * curve.discount_factor_at(cf.date)?;
    }
    Ok(pv / settlement_df)
}

/// Rescales cashflow amounts from `face` to 100 of face.
#[must_use]
pub fn per_hundred(cashflows: &[Cashflow], face: f64) -> Vec<Cashflow> {
    let scale = 100.0 / face;
    cashflows
        .iter()
        .map(|cf| Cashflow {
            amount: cf.amount * scale,
            ..*cf
        })
        .collect()
}

/// A redemption right exercisable by the issuer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CallRight {
    /// Exercise date.
    pub date: Date,
    /// Call price per 100.
    pub price: f64,
    /// Accrued interest per 100 paid on exercise.
    pub accrued: f64,
}

impl CallRight {
    /// Amount paid per 100 when the right is exercised.
    #[must_use]
    pub fn exercise_amount(&self) -> f64 {
        self.price + self.accrued
    }
}

/// The cashflows of an instrument as seen from one settlement date, per 100
/// of face, redeemed either at maturity or on a call date.
#[derive(Debug, Clone)]
pub struct BondCashflows {
    schedule: Schedule,
    cashflows: Vec<Cashflow>,
    settlement: Date,
    accrued: f64,
    workout_date: Date,
    redemption_price: f64,
}

impl BondCashflows {
    /// Cashflows to maturity, projecting floating coupons on the context's
    /// projection curve.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` if settlement is not before
    /// maturity or the schedule cannot be generated, and
    /// `AnalyticsError::MissingCurve` if projection fails.
    pub fn to_maturity(instrument: &Instrument, ctx: &ValuationContext) -> AnalyticsResult<Self> {
        let settlement = ctx.settlement_date();
        if settlement >= instrument.maturity_date() {
            return Err(AnalyticsError::configuration(format!(
                "settlement {settlement} is not before maturity {}",
                instrument.maturity_date()
            )));
        }

        let schedule = cashflows::generate(instrument)?;
        let flows = cashflows::build(instrument, &schedule, Some(ctx.projection_curve()))?;
        let flows = per_hundred(&flows, instrument.face_value_f64());
        let accrued =
            cashflows::accrued_interest(&flows, settlement, 100.0, instrument.day_count());
        let workout_date = flows.last().map_or(instrument.maturity_date(), |cf| cf.date);

        Ok(Self {
            schedule,
            cashflows: flows,
            settlement,
            accrued,
            workout_date,
            redemption_price: 100.0,
        })
    }

    /// The same instrument redeemed on `call_date` at `call_price` per 100.
    ///
    /// Accrued interest at settlement is unchanged; the period containing
    /// the call date pays its accrued coupon on the call date.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` if the call date is not after
    /// settlement or falls outside the schedule.
    pub fn to_call(
        &self,
        instrument: &Instrument,
        ctx: &ValuationContext,
        call_date: Date,
        call_price: Decimal,
    ) -> AnalyticsResult<Self> {
        if call_date < self.settlement {
            return Err(AnalyticsError::configuration(format!(
                "call date {call_date} is before settlement {}",
                self.settlement
            )));
        }

        let flows = cashflows::build_to_call(
            instrument,
            &self.schedule,
            Some(ctx.projection_curve()),
            call_date,
            call_price,
        )?;

        Ok(Self {
            schedule: self.schedule.clone(),
            cashflows: per_hundred(&flows, instrument.face_value_f64()),
            settlement: self.settlement,
            accrued: self.accrued,
            workout_date: call_date,
            redemption_price: to_f64(call_price),
        })
    }

    /// Cashflows per 100, including any paid before settlement.
    #[must_use]
    pub fn cashflows(&self) -> &[Cashflow] {
        &self.cashflows
    }

    /// Settlement date.
    #[must_use]
    pub fn settlement(&self) -> Date {
        self.settlement
    }

    /// Accrued interest per 100 at settlement.
    #[must_use]
    pub fn accrued(&self) -> f64 {
        self.accrued
    }

    /// Redemption date: maturity or the call date.
    #[must_use]
    pub fn workout_date(&self) -> Date {
        self.workout_date
    }

    /// Redemption price per 100.
    #[must_use]
    pub fn redemption_price(&self) -> f64 {
        self.redemption_price
    }

    /// The accrual schedule the cashflows were built from.
    #[must_use]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Accrued interest per 100 on `date` under these cashflows.
    #[must_use]
    pub fn accrued_on(&self, date: Date, instrument: &Instrument) -> f64 {
        cashflows::accrued_interest(&self.cashflows, date, 100.0, instrument.day_count())
    }

    /// Issuer call rights exercisable on or after settlement, with the
    /// accrued interest due on each date.
    #[must_use]
    pub fn call_rights(&self, instrument: &Instrument) -> Vec<CallRight> {
        instrument
            .call_schedule()
            .calls_after(self.settlement)
            .map(|entry| CallRight {
                date: entry.call_date,
                price: to_f64(entry.call_price),
                accrued: self.accrued_on(entry.call_date, instrument),
            })
            .collect()
    }

    /// Dirty price from a clean price.
    #[must_use]
    pub fn dirty_from_clean(&self, clean: f64) -> f64 {
        clean + self.accrued
    }

    /// Curve price of these cashflows.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Interpolation` if the curve cannot be
    /// evaluated.
    pub fn price_on_curve(&self, curve: &dyn Curve) -> AnalyticsResult<PriceResult> {
        let dirty = present_value(&self.cashflows, curve, self.settlement)?;
        Ok(PriceResult::from_dirty(dirty, self.accrued))
    }
}

/// Prices an instrument off the context's discount curve.
///
/// # Errors
///
/// Propagates cashflow generation and curve errors.
pub fn price(instrument: &Instrument, ctx: &ValuationContext) -> AnalyticsResult<PriceResult> {
    let flows = BondCashflows::to_maturity(instrument, ctx)?;
    let result = flows.price_on_curve(ctx.discount_curve())?;
    tracing::debug!(
        instrument = instrument.id(),
        dirty = result.dirty,
        accrued = result.accrued,
        "priced on curve"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use switchback_bonds::{CallEntry, CallSchedule, FloatingTerms};
    use switchback_core::calendars::{BusinessDayConvention, CalendarKind};
    use switchback_core::types::Compounding;
    use switchback_curves::ZeroCurve;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn flat(rate: f64) -> Arc<dyn Curve> {
        Arc::new(ZeroCurve::flat(date(2025, 1, 15), rate, Compounding::Continuous).unwrap())
    }

    fn bullet(face: Decimal) -> Instrument {
        Instrument::builder()
            .face_value(face)
            .issue_date(date(2025, 1, 15))
            .maturity_date(date(2030, 1, 15))
            .coupon_rate(dec!(0.05))
            .calendar(CalendarKind::WeekendOnly)
            .business_day_convention(BusinessDayConvention::Unadjusted)
            .build()
            .unwrap()
    }

    #[test]
    fn test_present_value_forward_values_to_settlement() {
        let curve = ZeroCurve::flat(date(2025, 1, 15), 0.05, Compounding::Continuous).unwrap();
        let settle = date(2026, 1, 15);
        let flows = vec![Cashflow::redemption(date(2027, 1, 15), 100.0)];
        let pv = present_value(&flows, &curve, settle).unwrap();
        assert_relative_eq!(pv, 100.0 * (-0.05f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_present_value_skips_past_flows() {
        let curve = ZeroCurve::flat(date(2025, 1, 15), 0.05, Compounding::Continuous).unwrap();
        let flows = vec![
            Cashflow::redemption(date(2025, 6, 1), 50.0),
            Cashflow::redemption(date(2026, 1, 15), 3.0),
            Cashflow::redemption(date(2027, 1, 15), 100.0),
        ];
        // the flow dated on settlement belongs to the seller
        let pv = present_value(&flows, &curve, date(2026, 1, 15)).unwrap();
        assert_relative_eq!(pv, 100.0 * (-0.05f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_clean_price_continuous_across_coupon_date() {
        let curve: Arc<dyn Curve> =
            Arc::new(ZeroCurve::flat(date(2025, 1, 10), 0.04, Compounding::Continuous).unwrap());
        let bond = Instrument::builder()
            .issue_date(date(2024, 1, 15))
            .maturity_date(date(2034, 1, 15))
            .coupon_rate(dec!(0.06))
            .calendar(CalendarKind::WeekendOnly)
            .business_day_convention(BusinessDayConvention::Unadjusted)
            .build()
            .unwrap();
        let at = |d: Date| price(&bond, &ValuationContext::new(d, Arc::clone(&curve))).unwrap();

        let before = at(date(2025, 1, 14));
        let on = at(date(2025, 1, 15));
        let after = at(date(2025, 1, 16));

        assert_relative_eq!(before.accrued, 3.0 * 179.0 / 180.0, epsilon = 1e-9);
        assert_relative_eq!(on.accrued, 0.0);
        assert_relative_eq!(after.accrued, 3.0 / 180.0, epsilon = 1e-9);
        assert!((on.clean - before.clean).abs() < 0.05);
        assert!((after.clean - on.clean).abs() < 0.05);
        assert!(before.dirty - on.dirty > 2.9);
    }

    #[test]
    fn test_price_is_per_hundred() {
        let ctx = ValuationContext::new(date(2025, 4, 15), flat(0.04));
        let small = price(&bullet(dec!(100)), &ctx).unwrap();
        let large = price(&bullet(dec!(1000000)), &ctx).unwrap();
        assert_relative_eq!(small.dirty, large.dirty, epsilon = 1e-9);
        assert_relative_eq!(small.accrued, 1.25, epsilon = 1e-12);
        assert_relative_eq!(small.clean, small.dirty - 1.25, epsilon = 1e-12);
        assert!(small.clean > 100.0);
    }

    #[test]
    fn test_settlement_at_maturity_rejected() {
        let ctx = ValuationContext::new(date(2030, 1, 15), flat(0.04));
        assert!(matches!(
            price(&bullet(dec!(100)), &ctx),
            Err(AnalyticsError::Configuration { .. })
        ));
    }

    #[test]
    fn test_floating_without_projection_reports_missing_curve() {
        let bond = Instrument::builder()
            .issue_date(date(2025, 1, 15))
            .switch_date(date(2027, 1, 15))
            .maturity_date(date(2030, 1, 15))
            .coupon_rate(dec!(0.05))
            .floating(FloatingTerms::new(dec!(0.01)))
            .build()
            .unwrap();
        let schedule = cashflows::generate(&bond).unwrap();
        let err: AnalyticsError = cashflows::build(&bond, &schedule, None).unwrap_err().into();
        assert!(matches!(err, AnalyticsError::MissingCurve { .. }));
    }

    #[test]
    fn test_call_rights_carry_accrued() {
        let calls = CallSchedule::new(vec![
            CallEntry::new(date(2027, 1, 15), dec!(101)),
            CallEntry::new(date(2027, 4, 15), dec!(100.5)),
        ])
        .unwrap();
        let bond = bullet(dec!(100)).with_call_schedule(calls).unwrap();
        let ctx = ValuationContext::new(date(2025, 4, 15), flat(0.04));
        let flows = BondCashflows::to_maturity(&bond, &ctx).unwrap();
        let rights = flows.call_rights(&bond);

        assert_eq!(rights.len(), 2);
        assert_relative_eq!(rights[0].exercise_amount(), 101.0, epsilon = 1e-12);
        assert_relative_eq!(rights[1].accrued, 1.25, epsilon = 1e-12);
        assert_relative_eq!(rights[1].exercise_amount(), 101.75, epsilon = 1e-12);
    }

    #[test]
    fn test_to_call_redeems_on_call_date() {
        let bond = bullet(dec!(100));
        let ctx = ValuationContext::new(date(2025, 4, 15), flat(0.04));
        let maturity = BondCashflows::to_maturity(&bond, &ctx).unwrap();
        let called = maturity
            .to_call(&bond, &ctx, date(2028, 1, 15), dec!(102))
            .unwrap();

        assert_eq!(called.workout_date(), date(2028, 1, 15));
        assert_relative_eq!(called.redemption_price(), 102.0);
        assert_relative_eq!(called.accrued(), maturity.accrued());
        let last = called.cashflows().last().unwrap();
        assert!(last.is_redemption());
        assert_relative_eq!(last.amount, 102.0, epsilon = 1e-12);
    }
}

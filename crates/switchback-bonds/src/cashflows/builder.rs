//! Coupon and redemption cashflows from an accrual schedule.
//!
//! Fixed coupons pay `face × rate × year_fraction`. Floating coupons pay
//! the simple forward rate implied by a projection curve over the period,
//! passed through the instrument's gearing, spread, cap and floor. A period
//! already in progress at the curve date uses the current fixing when one is
//! supplied.

use rust_decimal::Decimal;

use switchback_core::daycounts::DayCountConvention;
use switchback_core::types::Date;
use switchback_curves::Curve;

use super::cashflow::{Cashflow, CashflowKind};
use super::schedule::{Period, Schedule, Segment};
use crate::error::{BondError, BondResult};
use crate::instruments::{to_f64, FloatingTerms, Instrument};

/// Builds the cashflows of an instrument to maturity.
///
/// `projection` is only consulted for floating periods and may be `None`
/// for a fixed bullet.
///
/// # Errors
///
/// Returns `BondError::MissingCurve` if a floating period needs projecting
/// and no curve was supplied.
pub fn build(
    instrument: &Instrument,
    schedule: &Schedule,
    projection: Option<&dyn Curve>,
) -> BondResult<Vec<Cashflow>> {
    let last = schedule
        .periods()
        .last()
        .ok_or_else(|| BondError::configuration("cannot build cashflows from an empty schedule"))?;

    let mut flows = coupons(instrument, schedule.periods(), projection)?;
    flows.push(Cashflow::redemption(
        last.payment_date,
        instrument.face_value_f64(),
    ));
    Ok(flows)
}

/// Builds the cashflows of an instrument redeemed early on `call_date`.
///
/// Periods ending after the call are dropped; the period containing the
/// call date is cut short and its accrued coupon paid on the call date,
/// followed by redemption at `call_price` per 100 of face.
///
/// # Errors
///
/// Returns `BondError::Configuration` if `call_date` is not inside the
/// schedule, and `BondError::MissingCurve` as for [`build`].
pub fn build_to_call(
    instrument: &Instrument,
    schedule: &Schedule,
    projection: Option<&dyn Curve>,
    call_date: Date,
    call_price: Decimal,
) -> BondResult<Vec<Cashflow>> {
    match (schedule.start_date(), schedule.end_date()) {
        (Some(start), Some(end)) if call_date > start && call_date <= end => {}
        _ => {
            return Err(BondError::configuration(format!(
                "call date {call_date} is outside the accrual schedule"
            )))
        }
    }

    let periods: Vec<Period> = schedule
        .periods()
        .iter()
        .filter(|p| p.start < call_date)
        .map(|p| {
            if p.end <= call_date {
                *p
            } else {
                truncate(p, call_date, instrument.day_count())
            }
        })
        .collect();

    let mut flows = coupons(instrument, &periods, projection)?;
    let redemption = instrument.face_value() * call_price / Decimal::ONE_HUNDRED;
    flows.push(Cashflow::redemption(call_date, to_f64(redemption)));
    Ok(flows)
}

fn coupons(
    instrument: &Instrument,
    periods: &[Period],
    projection: Option<&dyn Curve>,
) -> BondResult<Vec<Cashflow>> {
    let face = instrument.face_value();

    periods
        .iter()
        .map(|period| -> BondResult<Cashflow> {
            match (period.segment, instrument.floating()) {
                (Segment::Floating, Some(terms)) => {
                    let curve = projection.ok_or(BondError::MissingCurve {
                        period_start: period.start,
                    })?;
                    let rate = terms.coupon_rate(index_rate(terms, period, curve)?);
                    let amount = to_f64(face) * rate * period.year_fraction_f64();
                    Ok(Cashflow::coupon(
                        period,
                        CashflowKind::FloatingCoupon,
                        rate,
                        amount,
                    ))
                }
                _ => {
                    let rate = instrument.coupon_rate().unwrap_or(Decimal::ZERO);
                    let amount = face * rate * period.year_fraction;
                    Ok(Cashflow::coupon(
                        period,
                        CashflowKind::FixedCoupon,
                        to_f64(rate),
                        to_f64(amount),
                    ))
                }
            }
        })
        .collect()
}

/// Index rate for a floating period.
///
/// A period that has already fixed before the curve date and has no
/// supplied fixing is projected at the curve's spot rate for the period
/// tenor.
fn index_rate(terms: &FloatingTerms, period: &Period, curve: &dyn Curve) -> BondResult<f64> {
    let reference = curve.reference_date();
    if period.start >= reference {
        return Ok(curve.forward_rate_between(period.start, period.end)?);
    }
    if let Some(fixing) = terms.current_fixing {
        return Ok(to_f64(fixing));
    }
    if period.end > reference {
        return Ok(curve.forward_rate_between(reference, period.end)?);
    }
    let tenor = curve.year_fraction(period.end) - curve.year_fraction(period.start);
    Ok(curve.forward_rate(0.0, tenor)?)
}

fn truncate(period: &Period, end: Date, day_count: DayCountConvention) -> Period {
    let year_fraction = if day_count == DayCountConvention::ActActIcma {
        let full = period.start.days_between(&period.end);
        if full == 0 {
            Decimal::ZERO
        } else {
            period.year_fraction * Decimal::from(period.start.days_between(&end))
                / Decimal::from(full)
        }
    } else {
        day_count.year_fraction(period.start, end)
    };

    Period {
        end,
        payment_date: end,
        year_fraction,
        is_stub: true,
        ..*period
    }
}

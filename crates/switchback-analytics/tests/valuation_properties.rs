//! Property checks for the yield solver, workout selection and spreads.

use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;

use switchback_analytics::prelude::*;
use switchback_analytics::yields::{price_from_yield, yield_from_price};
use switchback_bonds::{CallEntry, CallSchedule, Instrument};
use switchback_core::types::{Compounding, Date, Frequency};
use switchback_curves::ZeroCurve;

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

fn settlement() -> Date {
    date(2025, 4, 15)
}

fn context(rate: f64) -> ValuationContext {
    let curve = ZeroCurve::flat(settlement(), rate, Compounding::Continuous).unwrap();
    ValuationContext::new(settlement(), Arc::new(curve))
}

/// Fixed bond with coupon in basis points and a maturity year.
fn fixed_bond(coupon_bp: u32, maturity_year: i32, calls: CallSchedule) -> Instrument {
    Instrument::builder()
        .id("PROP")
        .issue_date(date(2024, 10, 15))
        .maturity_date(date(maturity_year, 10, 15))
        .coupon_rate(Decimal::new(i64::from(coupon_bp), 4))
        .fixed_frequency(Frequency::SemiAnnual)
        .call_schedule(calls)
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn yield_round_trips_through_price(
        coupon_bp in 0u32..1000,
        maturity_year in 2026i32..2055,
        y in -0.005f64..0.15,
    ) {
        let ctx = context(0.04);
        let bond = fixed_bond(coupon_bp, maturity_year, CallSchedule::empty());
        let flows = BondCashflows::to_maturity(&bond, &ctx).unwrap();
        let convention = ctx.yield_convention(&bond);

        let dirty = price_from_yield(flows.cashflows(), flows.settlement(), y, &convention);
        let solved = yield_from_price(
            flows.cashflows(),
            flows.settlement(),
            dirty,
            &convention,
            ctx.config(),
        )
        .unwrap();
        prop_assert!((solved.yield_value - y).abs() < 1e-8);
    }

    #[test]
    fn price_strictly_decreases_in_yield(
        coupon_bp in 0u32..1000,
        maturity_year in 2026i32..2055,
        y in 0.0f64..0.15,
        dy in 1e-4f64..0.05,
    ) {
        let ctx = context(0.04);
        let bond = fixed_bond(coupon_bp, maturity_year, CallSchedule::empty());
        let flows = BondCashflows::to_maturity(&bond, &ctx).unwrap();
        let convention = ctx.yield_convention(&bond);

        let p0 = price_from_yield(flows.cashflows(), flows.settlement(), y, &convention);
        let p1 = price_from_yield(flows.cashflows(), flows.settlement(), y + dy, &convention);
        prop_assert!(p1 < p0);
    }

    #[test]
    fn yield_to_worst_never_exceeds_maturity_yield(
        coupon_bp in 200u32..900,
        clean in 85.0f64..115.0,
        call_price in 100u32..103,
    ) {
        let ctx = context(0.04);
        let calls = CallSchedule::new(vec![
            CallEntry::new(date(2027, 10, 15), Decimal::from(call_price)),
            CallEntry::new(date(2030, 10, 15), Decimal::from(100)),
        ])
        .unwrap();
        let bond = fixed_bond(coupon_bp, 2034, calls);

        let result = worst_yield(&bond, clean, &ctx).unwrap();
        prop_assert!(result.yield_to_worst() <= result.yield_to_maturity() + 1e-12);
        prop_assert!(result.excluded.is_empty());
    }

    #[test]
    fn empty_schedule_works_out_to_maturity(coupon_bp in 0u32..900, clean in 85.0f64..115.0) {
        let ctx = context(0.04);
        let bond = fixed_bond(coupon_bp, 2034, CallSchedule::empty());

        let result = worst_yield(&bond, clean, &ctx).unwrap();
        prop_assert_eq!(result.candidates.len(), 1);
        prop_assert_eq!(result.yield_to_worst(), result.yield_to_maturity());
        let maturity_yield = yield_of(&bond, clean, &ctx).unwrap();
        prop_assert!((result.yield_to_maturity() - maturity_yield).abs() < 1e-12);
    }

    #[test]
    fn z_spread_reprices_target(coupon_bp in 100u32..900, clean in 80.0f64..120.0) {
        let ctx = context(0.035);
        let bond = fixed_bond(coupon_bp, 2035, CallSchedule::empty());
        let flows = BondCashflows::to_maturity(&bond, &ctx).unwrap();
        let dirty = flows.dirty_from_clean(clean);

        let calculator = ZSpreadCalculator::from_config(ctx.discount_curve(), ctx.config());
        let z = calculator.calculate(flows.cashflows(), flows.settlement(), dirty).unwrap();
        let repriced = calculator
            .price_with_spread(flows.cashflows(), flows.settlement(), z)
            .unwrap();
        prop_assert!((repriced - dirty).abs() < 1e-6);
    }
}

//! The valuation API.
//!
//! Each entry point takes an instrument, a clean price per 100 (where one is
//! needed) and an explicit [`ValuationContext`], and returns a structured
//! result or an [`AnalyticsError`](crate::AnalyticsError).

use serde::{Deserialize, Serialize};

use switchback_bonds::Instrument;
use switchback_core::types::Date;
use switchback_curves::BenchmarkCurve;

use crate::error::AnalyticsResult;
use crate::options::HullWhiteParams;
use crate::pricing::{self, BondCashflows, PriceResult, ValuationContext};
use crate::risk::{risk_measures, RiskMeasures};
use crate::spreads::{
    g_spread, original_tenor, select_benchmark, yield_from_g_spread, BenchmarkSelection,
    EffectiveRisk, OasCalculator, SpreadQuote, WorkoutPolicy, ZSpreadCalculator,
};
use crate::workout::{self, workout_cashflows, WorkoutResult};
use crate::yields::{price_from_yield, yield_from_price};

/// Risk input: a yield, or a clean price to solve the yield from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YieldOrPrice {
    /// Yield under the context's convention.
    Yield(f64),
    /// Clean price per 100.
    Price(f64),
}

/// Every spread of one instrument at one price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadResult {
    /// Workout yield over the interpolated benchmark curve.
    pub g_spread: f64,
    /// Workout yield over the stepped-down benchmark.
    pub benchmark_spread: f64,
    /// Parallel discount-curve shift repricing the cashflows to maturity.
    pub z_spread: f64,
    /// Workout date the yield spreads were taken at.
    pub workout_date: Date,
    /// Yield to the workout date.
    pub workout_yield: f64,
    /// Benchmark behind `benchmark_spread`.
    pub benchmark: BenchmarkSelection,
}

/// Headline analytics of one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationReport {
    /// Instrument identifier.
    pub instrument_id: String,
    /// Settlement date of the valuation.
    pub settlement: Date,
    /// Price used: the market price when given, the curve price otherwise.
    pub price: PriceResult,
    /// Yield to maturity at `price`.
    pub yield_to_maturity: f64,
    /// Yield to worst at `price`; equal to yield to maturity when not callable.
    pub yield_to_worst: f64,
    /// Yield risk at the yield to maturity.
    pub risk: RiskMeasures,
    /// Z-spread at `price`.
    pub z_spread: f64,
}

/// Clean and dirty price off the context's discount curve.
///
/// # Errors
///
/// Propagates cashflow generation and curve errors.
pub fn price(instrument: &Instrument, ctx: &ValuationContext) -> AnalyticsResult<PriceResult> {
    pricing::price(instrument, ctx)
}

/// Yield to maturity at `clean_price`.
///
/// # Errors
///
/// Returns `AnalyticsError::Numerical` when the yield cannot be solved.
pub fn yield_of(
    instrument: &Instrument,
    clean_price: f64,
    ctx: &ValuationContext,
) -> AnalyticsResult<f64> {
    let flows = BondCashflows::to_maturity(instrument, ctx)?;
    solve_yield(instrument, &flows, clean_price, ctx)
}

fn solve_yield(
    instrument: &Instrument,
    flows: &BondCashflows,
    clean_price: f64,
    ctx: &ValuationContext,
) -> AnalyticsResult<f64> {
    let result = yield_from_price(
        flows.cashflows(),
        flows.settlement(),
        flows.dirty_from_clean(clean_price),
        &ctx.yield_convention(instrument),
        ctx.config(),
    )?;
    Ok(result.yield_value)
}

/// Duration, convexity and DV01 to maturity.
///
/// Projected floating coupons are held fixed.
///
/// # Errors
///
/// Propagates cashflow and yield errors.
pub fn risk(
    instrument: &Instrument,
    input: YieldOrPrice,
    ctx: &ValuationContext,
) -> AnalyticsResult<RiskMeasures> {
    let flows = BondCashflows::to_maturity(instrument, ctx)?;
    let y = match input {
        YieldOrPrice::Yield(y) => y,
        YieldOrPrice::Price(clean) => solve_yield(instrument, &flows, clean, ctx)?,
    };
    risk_measures(
        flows.cashflows(),
        flows.settlement(),
        y,
        &ctx.yield_convention(instrument),
        ctx.config().risk_bump,
    )
}

/// G, benchmark and Z spreads at `clean_price`.
///
/// # Errors
///
/// Propagates cashflow, yield and solver errors.
pub fn spreads(
    instrument: &Instrument,
    clean_price: f64,
    benchmark: &BenchmarkCurve,
    policy: WorkoutPolicy,
    ctx: &ValuationContext,
) -> AnalyticsResult<SpreadResult> {
    let convention = ctx.yield_convention(instrument);
    let settlement = ctx.settlement_date();

    let workout = workout_cashflows(instrument, policy, Some(clean_price), ctx)?;
    let workout_yield = solve_yield(instrument, &workout, clean_price, ctx)?;
    let years = convention.time(settlement, workout.workout_date());

    let original = original_tenor(benchmark, original_term(instrument));
    let selection = select_benchmark(benchmark, original, years)?;

    let maturity = BondCashflows::to_maturity(instrument, ctx)?;
    let z_spread = ZSpreadCalculator::from_config(ctx.discount_curve(), ctx.config()).calculate(
        maturity.cashflows(),
        settlement,
        maturity.dirty_from_clean(clean_price),
    )?;

    let result = SpreadResult {
        g_spread: g_spread(workout_yield, benchmark, years)?,
        benchmark_spread: workout_yield - selection.benchmark_yield,
        z_spread,
        workout_date: workout.workout_date(),
        workout_yield,
        benchmark: selection,
    };
    tracing::debug!(
        instrument = instrument.id(),
        g_spread = result.g_spread,
        benchmark_spread = result.benchmark_spread,
        z_spread = result.z_spread,
        "spreads computed"
    );
    Ok(result)
}

/// Original term in years under the instrument's day count.
fn original_term(instrument: &Instrument) -> f64 {
    crate::to_f64(
        instrument
            .day_count()
            .year_fraction(instrument.issue_date(), instrument.maturity_date()),
    )
}

/// Price implied by a spread quote.
///
/// Yield spreads are added to the benchmark at the workout and priced by
/// the closed-form yield pricer; under [`WorkoutPolicy::Worst`] the lowest
/// price across workouts is returned. A Z-spread shifts the discount curve
/// and reprices the cashflows to maturity.
///
/// # Errors
///
/// Propagates cashflow and curve errors.
pub fn price_from_spread(
    instrument: &Instrument,
    quote: SpreadQuote,
    benchmark: &BenchmarkCurve,
    policy: WorkoutPolicy,
    ctx: &ValuationContext,
) -> AnalyticsResult<PriceResult> {
    let settlement = ctx.settlement_date();
    let convention = ctx.yield_convention(instrument);

    if let SpreadQuote::Z(z) = quote {
        let maturity = BondCashflows::to_maturity(instrument, ctx)?;
        let dirty = ZSpreadCalculator::from_config(ctx.discount_curve(), ctx.config())
            .price_with_spread(maturity.cashflows(), settlement, z)?;
        return Ok(PriceResult::from_dirty(dirty, maturity.accrued()));
    }

    let original = original_tenor(benchmark, original_term(instrument));
    let price_to = |flows: &BondCashflows| -> AnalyticsResult<f64> {
        let years = convention.time(settlement, flows.workout_date());
        let y = if let SpreadQuote::Benchmark(s) = quote {
            select_benchmark(benchmark, original, years)?.benchmark_yield + s
        } else {
            yield_from_g_spread(quote.value(), benchmark, years)?
        };
        Ok(price_from_yield(flows.cashflows(), settlement, y, &convention))
    };

    let (accrued, dirty) = if policy == WorkoutPolicy::Worst {
        let (maturity, calls) = workout::workout_sets(instrument, ctx)?;
        let mut dirty = price_to(&maturity)?;
        for flows in calls.into_iter().filter_map(|(_, flows)| flows.ok()) {
            dirty = dirty.min(price_to(&flows)?);
        }
        (maturity.accrued(), dirty)
    } else {
        let flows = workout_cashflows(instrument, policy, None, ctx)?;
        (flows.accrued(), price_to(&flows)?)
    };

    Ok(PriceResult::from_dirty(dirty, accrued))
}

/// Option-adjusted spread at `clean_price` under `model`.
///
/// # Errors
///
/// Propagates cashflow, lattice and solver errors.
pub fn oas(
    instrument: &Instrument,
    clean_price: f64,
    model: &HullWhiteParams,
    ctx: &ValuationContext,
) -> AnalyticsResult<f64> {
    let flows = BondCashflows::to_maturity(instrument, ctx)?;
    let calls = flows.call_rights(instrument);
    OasCalculator::from_config(ctx.discount_curve(), *model, ctx.config()).calculate(
        &flows,
        &calls,
        flows.dirty_from_clean(clean_price),
    )
}

/// Effective duration, convexity and option value at the OAS implied by
/// `clean_price`.
///
/// # Errors
///
/// Propagates cashflow, lattice and solver errors.
pub fn effective_risk(
    instrument: &Instrument,
    clean_price: f64,
    model: &HullWhiteParams,
    ctx: &ValuationContext,
) -> AnalyticsResult<EffectiveRisk> {
    let flows = BondCashflows::to_maturity(instrument, ctx)?;
    let calls = flows.call_rights(instrument);
    let calculator = OasCalculator::from_config(ctx.discount_curve(), *model, ctx.config());
    let oas = calculator.calculate(&flows, &calls, flows.dirty_from_clean(clean_price))?;
    calculator.effective_risk(&flows, &calls, oas)
}

/// Yield to every workout at `clean_price`.
///
/// # Errors
///
/// See [`workout::worst_yield`].
pub fn workout(
    instrument: &Instrument,
    clean_price: f64,
    ctx: &ValuationContext,
) -> AnalyticsResult<WorkoutResult> {
    workout::worst_yield(instrument, clean_price, ctx)
}

/// Headline analytics at `clean_price`, or at the curve price when none is
/// given.
///
/// # Errors
///
/// Propagates every underlying error.
pub fn value(
    instrument: &Instrument,
    clean_price: Option<f64>,
    ctx: &ValuationContext,
) -> AnalyticsResult<ValuationReport> {
    let flows = BondCashflows::to_maturity(instrument, ctx)?;
    let price = match clean_price {
        Some(clean) => PriceResult::from_clean(clean, flows.accrued()),
        None => flows.price_on_curve(ctx.discount_curve())?,
    };

    let yield_to_maturity = solve_yield(instrument, &flows, price.clean, ctx)?;
    let yield_to_worst = if instrument.is_callable() {
        workout::worst_yield(instrument, price.clean, ctx)?.yield_to_worst()
    } else {
        yield_to_maturity
    };
    let risk = risk_measures(
        flows.cashflows(),
        flows.settlement(),
        yield_to_maturity,
        &ctx.yield_convention(instrument),
        ctx.config().risk_bump,
    )?;
    let z_spread = ZSpreadCalculator::from_config(ctx.discount_curve(), ctx.config()).calculate(
        flows.cashflows(),
        flows.settlement(),
        price.dirty,
    )?;

    Ok(ValuationReport {
        instrument_id: instrument.id().to_string(),
        settlement: flows.settlement(),
        price,
        yield_to_maturity,
        yield_to_worst,
        risk,
        z_spread,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use switchback_bonds::{CallEntry, CallSchedule};
    use switchback_core::types::{Compounding, Frequency};
    use switchback_curves::ZeroCurve;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn context() -> ValuationContext {
        let curve = ZeroCurve::flat(date(2025, 1, 15), 0.04, Compounding::Continuous).unwrap();
        ValuationContext::new(date(2025, 1, 15), Arc::new(curve))
    }

    fn bullet() -> Instrument {
        Instrument::builder()
            .id("BULLET")
            .issue_date(date(2024, 1, 15))
            .maturity_date(date(2034, 1, 15))
            .coupon_rate(dec!(0.05))
            .fixed_frequency(Frequency::SemiAnnual)
            .build()
            .unwrap()
    }

    fn benchmark() -> BenchmarkCurve {
        BenchmarkCurve::new(
            date(2025, 1, 15),
            vec![(2.0, 0.038), (3.0, 0.039), (5.0, 0.04), (10.0, 0.045)],
        )
        .unwrap()
    }

    #[test]
    fn test_yield_and_risk_agree() {
        let ctx = context();
        let y = yield_of(&bullet(), 100.0, &ctx).unwrap();
        assert!((y - 0.05).abs() < 1e-3);
        let from_price = risk(&bullet(), YieldOrPrice::Price(100.0), &ctx).unwrap();
        let from_yield = risk(&bullet(), YieldOrPrice::Yield(y), &ctx).unwrap();
        assert_relative_eq!(
            from_price.modified_duration,
            from_yield.modified_duration,
            epsilon = 1e-9
        );
        assert_relative_eq!(from_price.dirty_price, from_yield.dirty_price, epsilon = 1e-8);
    }

    #[test]
    fn test_spreads_at_par() {
        let ctx = context();
        let bench = benchmark();
        let result = spreads(&bullet(), 100.0, &bench, WorkoutPolicy::Maturity, &ctx).unwrap();
        assert!(result.workout_date >= date(2034, 1, 15));

        let years = ctx
            .yield_convention(&bullet())
            .time(ctx.settlement_date(), result.workout_date);
        let interpolated = bench.yield_at(years).unwrap();
        assert_relative_eq!(result.g_spread, result.workout_yield - interpolated, epsilon = 1e-12);

        // ten-year original with nine years left stays on the 10Y
        assert_relative_eq!(result.benchmark.original_tenor, 10.0);
        assert_relative_eq!(result.benchmark.tenor, 10.0);
        assert_relative_eq!(result.benchmark_spread, result.workout_yield - 0.045, epsilon = 1e-12);
    }

    #[test]
    fn test_price_from_spread_round_trips() {
        let ctx = context();
        let bench = benchmark();
        let clean = 97.5;
        let s = spreads(&bullet(), clean, &bench, WorkoutPolicy::Maturity, &ctx).unwrap();
        for quote in [
            SpreadQuote::G(s.g_spread),
            SpreadQuote::Benchmark(s.benchmark_spread),
            SpreadQuote::Z(s.z_spread),
        ] {
            let price =
                price_from_spread(&bullet(), quote, &bench, WorkoutPolicy::Maturity, &ctx).unwrap();
            assert_relative_eq!(price.clean, clean, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_callable_value_report() {
        let ctx = context();
        let callable = Instrument::builder()
            .id("CALLABLE")
            .issue_date(date(2024, 1, 15))
            .maturity_date(date(2034, 1, 15))
            .coupon_rate(dec!(0.06))
            .fixed_frequency(Frequency::SemiAnnual)
            .call_schedule(
                CallSchedule::new(vec![CallEntry::new(date(2027, 1, 15), dec!(100))]).unwrap(),
            )
            .build()
            .unwrap();
        let report = value(&callable, Some(106.0), &ctx).unwrap();
        assert_eq!(report.instrument_id, "CALLABLE");
        assert!(report.yield_to_worst < report.yield_to_maturity);

        let model = HullWhiteParams::default();
        let oas_value = oas(&callable, 106.0, &model, &ctx).unwrap();
        assert!(oas_value < report.z_spread);
        let effective = effective_risk(&callable, 106.0, &model, &ctx).unwrap();
        assert_relative_eq!(effective.oas, oas_value, epsilon = 1e-9);
        assert!(effective.option_value > 0.0);
    }

    #[test]
    fn test_value_defaults_to_curve_price() {
        let ctx = context();
        let report = value(&bullet(), None, &ctx).unwrap();
        let curve_price = price(&bullet(), &ctx).unwrap();
        assert_relative_eq!(report.price.dirty, curve_price.dirty, epsilon = 1e-12);
        assert!(report.z_spread.abs() < 1e-8);
    }
}

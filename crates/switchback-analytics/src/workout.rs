//! Callable workout selection.
//!
//! Every remaining call date is a possible redemption. The selector solves
//! the yield to each workout from one clean price and keeps the lowest:
//! the issuer redeems when it is cheapest to do so, which is worst for the
//! holder. A call date whose yield cannot be solved is dropped with a
//! warning and the selection goes on without it.

use serde::{Deserialize, Serialize};

use switchback_bonds::{CallEntry, Instrument};
use switchback_core::types::Date;

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::pricing::{BondCashflows, PriceResult, ValuationContext};
use crate::spreads::WorkoutPolicy;
use crate::yields::{price_from_yield, yield_from_price};

/// Yields closer than this are treated as equal, leaving the earlier date.
const YIELD_TIE_TOLERANCE: f64 = 1e-9;

/// One redemption scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkoutCandidate {
    /// Redemption date.
    pub date: Date,
    /// Redemption price per 100.
    pub price: f64,
    /// Yield to this redemption.
    pub yield_value: f64,
    /// Whether this is the maturity scenario.
    pub is_maturity: bool,
}

/// Outcome of a yield-to-worst selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutResult {
    /// Every candidate that solved, in date order; maturity is last.
    pub candidates: Vec<WorkoutCandidate>,
    /// Call dates dropped because their yield could not be solved.
    pub excluded: Vec<Date>,
    worst: usize,
}

impl WorkoutResult {
    /// The lowest-yield candidate, earliest on ties.
    #[must_use]
    pub fn worst(&self) -> &WorkoutCandidate {
        &self.candidates[self.worst]
    }

    /// Yield to worst.
    #[must_use]
    pub fn yield_to_worst(&self) -> f64 {
        self.worst().yield_value
    }

    /// Workout date of the worst candidate.
    #[must_use]
    pub fn workout_date(&self) -> Date {
        self.worst().date
    }

    /// Yield to maturity.
    #[must_use]
    pub fn yield_to_maturity(&self) -> f64 {
        self.candidates
            .iter()
            .find(|c| c.is_maturity)
            .map_or(self.yield_to_worst(), |c| c.yield_value)
    }
}

/// Price to worst: the lowest price across workouts at one yield.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPrice {
    /// Workout giving the lowest price.
    pub date: Date,
    /// Clean, dirty and accrued at that workout.
    pub price: PriceResult,
}

/// The first call strictly after settlement.
#[must_use]
pub fn earliest_call<'a>(
    instrument: &'a Instrument,
    ctx: &ValuationContext,
) -> Option<&'a CallEntry> {
    let settlement = ctx.settlement_date();
    instrument
        .call_schedule()
        .calls_after(settlement)
        .find(|entry| entry.call_date > settlement)
}

/// Cashflows to maturity plus one to-call set per remaining call date.
///
/// Call dates whose cashflows cannot be built are returned as errors
/// alongside their date.
pub(crate) fn workout_sets(
    instrument: &Instrument,
    ctx: &ValuationContext,
) -> AnalyticsResult<(BondCashflows, Vec<(Date, AnalyticsResult<BondCashflows>)>)> {
    let maturity = BondCashflows::to_maturity(instrument, ctx)?;
    let calls = instrument
        .call_schedule()
        .calls_after(ctx.settlement_date())
        .filter(|entry| entry.call_date < instrument.maturity_date())
        .map(|entry| {
            (
                entry.call_date,
                maturity.to_call(instrument, ctx, entry.call_date, entry.call_price),
            )
        })
        .collect();
    Ok((maturity, calls))
}

/// Yield to every workout at `clean_price`, and the worst of them.
///
/// An empty call schedule gives yield to maturity.
///
/// # Errors
///
/// Fails only when the maturity cashflows cannot be built or their yield
/// cannot be solved; call dates fail softly.
pub fn worst_yield(
    instrument: &Instrument,
    clean_price: f64,
    ctx: &ValuationContext,
) -> AnalyticsResult<WorkoutResult> {
    let convention = ctx.yield_convention(instrument);
    let (maturity, calls) = workout_sets(instrument, ctx)?;
    let dirty = maturity.dirty_from_clean(clean_price);
    let settlement = ctx.settlement_date();

    let ytm = yield_from_price(maturity.cashflows(), settlement, dirty, &convention, ctx.config())?;

    let mut candidates = Vec::with_capacity(calls.len() + 1);
    let mut excluded = Vec::new();
    for (date, flows) in calls {
        let solved = flows.and_then(|flows| {
            let y =
                yield_from_price(flows.cashflows(), settlement, dirty, &convention, ctx.config())?;
            Ok((flows.redemption_price(), y.yield_value))
        });
        match solved {
            Ok((price, yield_value)) => candidates.push(WorkoutCandidate {
                date,
                price,
                yield_value,
                is_maturity: false,
            }),
            Err(e) => {
                tracing::warn!(
                    instrument = instrument.id(),
                    call_date = %date,
                    error = %e,
                    "call date excluded from workout"
                );
                excluded.push(date);
            }
        }
    }
    candidates.push(WorkoutCandidate {
        date: maturity.workout_date(),
        price: maturity.redemption_price(),
        yield_value: ytm.yield_value,
        is_maturity: true,
    });

    let mut worst = 0;
    for (i, candidate) in candidates.iter().enumerate().skip(1) {
        if candidate.yield_value < candidates[worst].yield_value - YIELD_TIE_TOLERANCE {
            worst = i;
        }
    }

    tracing::debug!(
        instrument = instrument.id(),
        candidates = candidates.len(),
        excluded = excluded.len(),
        yield_to_worst = candidates[worst].yield_value,
        "workout selected"
    );

    Ok(WorkoutResult {
        candidates,
        excluded,
        worst,
    })
}

/// Price to worst at yield `y`.
///
/// # Errors
///
/// Fails when the maturity cashflows cannot be built; call dates whose
/// cashflows cannot be built are skipped with a warning.
pub fn worst_price(
    instrument: &Instrument,
    y: f64,
    ctx: &ValuationContext,
) -> AnalyticsResult<WorkoutPrice> {
    let convention = ctx.yield_convention(instrument);
    let settlement = ctx.settlement_date();
    let (maturity, calls) = workout_sets(instrument, ctx)?;

    let price_at =
        |flows: &BondCashflows| price_from_yield(flows.cashflows(), settlement, y, &convention);

    let mut best = (maturity.workout_date(), price_at(&maturity));
    for (date, flows) in calls {
        match flows {
            Ok(flows) => {
                let dirty = price_at(&flows);
                if dirty < best.1 || (dirty == best.1 && date < best.0) {
                    best = (date, dirty);
                }
            }
            Err(e) => tracing::warn!(
                instrument = instrument.id(),
                call_date = %date,
                error = %e,
                "call date excluded from price to worst"
            ),
        }
    }

    Ok(WorkoutPrice {
        date: best.0,
        price: PriceResult::from_dirty(best.1, maturity.accrued()),
    })
}

/// Cashflows to the workout selected by `policy`.
///
/// `Worst` needs the clean price that drives the selection.
///
/// # Errors
///
/// Returns `AnalyticsError::Configuration` for `Worst` without a price, and
/// propagates cashflow and yield errors.
pub fn workout_cashflows(
    instrument: &Instrument,
    policy: WorkoutPolicy,
    clean_price: Option<f64>,
    ctx: &ValuationContext,
) -> AnalyticsResult<BondCashflows> {
    let maturity = BondCashflows::to_maturity(instrument, ctx)?;
    let call = match policy {
        WorkoutPolicy::Maturity => None,
        WorkoutPolicy::EarliestCall => earliest_call(instrument, ctx)
            .filter(|entry| entry.call_date < instrument.maturity_date())
            .map(|entry| (entry.call_date, entry.call_price)),
        WorkoutPolicy::Worst => {
            let clean = clean_price.ok_or_else(|| {
                AnalyticsError::configuration("worst workout needs a price")
            })?;
            let worst = *worst_yield(instrument, clean, ctx)?.worst();
            if worst.is_maturity {
                None
            } else {
                instrument
                    .call_schedule()
                    .entries()
                    .iter()
                    .find(|entry| entry.call_date == worst.date)
                    .map(|entry| (entry.call_date, entry.call_price))
            }
        }
    };

    match call {
        Some((date, price)) => maturity.to_call(instrument, ctx, date, price),
        None => Ok(maturity),
    }
}

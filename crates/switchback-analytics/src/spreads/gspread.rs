//! G-spread: yield over the interpolated benchmark curve.

use switchback_curves::BenchmarkCurve;

use crate::error::{AnalyticsError, AnalyticsResult};

/// Spread of `bond_yield` over the benchmark yield interpolated at
/// `years_to_workout`.
///
/// The benchmark curve is linear between pillars and flat beyond them.
///
/// # Errors
///
/// Returns `AnalyticsError::Configuration` for a negative or non-finite
/// time to workout.
pub fn g_spread(
    bond_yield: f64,
    curve: &BenchmarkCurve,
    years_to_workout: f64,
) -> AnalyticsResult<f64> {
    Ok(bond_yield - interpolated_yield(curve, years_to_workout)?)
}

/// Workout yield implied by a G-spread.
///
/// # Errors
///
/// Returns `AnalyticsError::Configuration` for a negative or non-finite
/// time to workout.
pub fn yield_from_g_spread(
    spread: f64,
    curve: &BenchmarkCurve,
    years_to_workout: f64,
) -> AnalyticsResult<f64> {
    Ok(interpolated_yield(curve, years_to_workout)? + spread)
}

fn interpolated_yield(curve: &BenchmarkCurve, years: f64) -> AnalyticsResult<f64> {
    if !(years >= 0.0 && years.is_finite()) {
        return Err(AnalyticsError::configuration(format!(
            "time to workout must be non-negative, got {years}"
        )));
    }
    Ok(curve.yield_at(years)?)
}

//! Benchmark spread with the tenor step-down rule.
//!
//! An instrument is benchmarked against the on-the-run point matching its
//! original term. As it ages, a ten-year original steps down the curve:
//!
//! | Remaining (years) | Benchmark |
//! |-------------------|-----------|
//! | ≥ 7.0             | 10Y       |
//! | ≥ 3.0             | 5Y        |
//! | ≥ 2.0             | 3Y        |
//! | otherwise         | 2Y        |
//!
//! Any other original tenor uses the pillar nearest the remaining time.

use serde::{Deserialize, Serialize};

use switchback_curves::BenchmarkCurve;

use crate::error::{AnalyticsError, AnalyticsResult};

/// Original tenor governed by the step-down table.
pub const STEP_DOWN_ORIGINAL_TENOR: f64 = 10.0;

/// `(minimum remaining years, benchmark tenor)`, longest first.
const STEP_DOWN: [(f64, f64); 3] = [(7.0, 10.0), (3.0, 5.0), (2.0, 3.0)];

/// Tenor used when the remaining time is below every threshold.
const STEP_DOWN_FLOOR: f64 = 2.0;

/// A chosen benchmark point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSelection {
    /// The instrument's original benchmark tenor.
    pub original_tenor: f64,
    /// Tenor selected for the remaining time.
    pub tenor: f64,
    /// Yield of the selected benchmark.
    pub benchmark_yield: f64,
}

/// Benchmark tenor for an instrument whose original term is `term_years`:
/// the pillar nearest that term.
#[must_use]
pub fn original_tenor(curve: &BenchmarkCurve, term_years: f64) -> f64 {
    curve.nearest_pillar(term_years).0
}

/// Selects the benchmark for `remaining` years to workout.
///
/// # Errors
///
/// Returns `AnalyticsError::Configuration` for a negative or non-finite
/// remaining time.
pub fn select_benchmark(
    curve: &BenchmarkCurve,
    original_tenor: f64,
    remaining: f64,
) -> AnalyticsResult<BenchmarkSelection> {
    if !(remaining >= 0.0 && remaining.is_finite()) {
        return Err(AnalyticsError::configuration(format!(
            "remaining time must be non-negative, got {remaining}"
        )));
    }

    let (tenor, benchmark_yield) =
        if (original_tenor - STEP_DOWN_ORIGINAL_TENOR).abs() < 1e-9 {
            let tenor = STEP_DOWN
                .iter()
                .find(|(threshold, _)| remaining >= *threshold)
                .map_or(STEP_DOWN_FLOOR, |(_, tenor)| *tenor);
            let y = curve
                .pillar_yield(tenor)
                .unwrap_or_else(|| curve.nearest_pillar(tenor).1);
            (tenor, y)
        } else {
            curve.nearest_pillar(remaining)
        };

    Ok(BenchmarkSelection {
        original_tenor,
        tenor,
        benchmark_yield,
    })
}

/// Spread of `bond_yield` over the stepped-down benchmark.
///
/// # Errors
///
/// Returns `AnalyticsError::Configuration` for a negative or non-finite
/// remaining time.
pub fn benchmark_spread(
    bond_yield: f64,
    curve: &BenchmarkCurve,
    original_tenor: f64,
    remaining: f64,
) -> AnalyticsResult<f64> {
    Ok(bond_yield - select_benchmark(curve, original_tenor, remaining)?.benchmark_yield)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use switchback_core::types::Date;

    fn curve() -> BenchmarkCurve {
        BenchmarkCurve::new(
            Date::from_ymd(2025, 1, 15).unwrap(),
            vec![(2.0, 0.038), (3.0, 0.039), (5.0, 0.04), (10.0, 0.045), (30.0, 0.048)],
        )
        .unwrap()
    }

    fn tenor_for(remaining: f64) -> f64 {
        select_benchmark(&curve(), 10.0, remaining).unwrap().tenor
    }

    #[test]
    fn test_ten_year_step_down() {
        assert_relative_eq!(tenor_for(8.0), 10.0);
        assert_relative_eq!(tenor_for(6.5), 5.0);
        assert_relative_eq!(tenor_for(2.5), 3.0);
        assert_relative_eq!(tenor_for(1.5), 2.0);
    }

    #[test]
    fn test_boundaries_stay_on_longer_tenor() {
        assert_relative_eq!(tenor_for(7.0), 10.0);
        assert_relative_eq!(tenor_for(3.0), 5.0);
        assert_relative_eq!(tenor_for(2.0), 3.0);
    }

    #[test]
    fn test_missing_pillar_uses_nearest() {
        let sparse = BenchmarkCurve::new(
            Date::from_ymd(2025, 1, 15).unwrap(),
            vec![(2.0, 0.038), (5.0, 0.04), (10.0, 0.045)],
        )
        .unwrap();
        let selection = select_benchmark(&sparse, 10.0, 2.5).unwrap();
        assert_relative_eq!(selection.tenor, 3.0);
        assert_relative_eq!(selection.benchmark_yield, 0.038);
    }

    #[test]
    fn test_other_original_tenor_uses_nearest_pillar() {
        let curve = curve();
        assert_relative_eq!(original_tenor(&curve, 29.8), 30.0);
        let selection = select_benchmark(&curve, 30.0, 12.0).unwrap();
        assert_relative_eq!(selection.tenor, 10.0);
        let spread = benchmark_spread(0.05, &curve, 30.0, 12.0).unwrap();
        assert_relative_eq!(spread, 0.005, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_remaining_rejected() {
        assert!(select_benchmark(&curve(), 10.0, -0.1).is_err());
    }
}

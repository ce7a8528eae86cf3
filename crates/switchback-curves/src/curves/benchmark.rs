//! Benchmark (government) yield curve.

use serde::{Deserialize, Serialize};
use switchback_core::types::Date;
use switchback_math::interpolation::{Interpolator, LinearInterpolator};

use crate::error::{CurveError, CurveResult};

/// On-the-run benchmark yields by tenor.
///
/// Yields are interpolated linearly in time to maturity and held flat
/// beyond the first and last tenors.
///
/// # Example
///
/// ```rust
/// use switchback_core::types::Date;
/// use switchback_curves::curves::BenchmarkCurve;
///
/// let curve = BenchmarkCurve::new(
///     Date::from_ymd(2025, 1, 15).unwrap(),
///     vec![(5.0, 0.04), (10.0, 0.045)],
/// )
/// .unwrap();
///
/// assert!((curve.yield_at(7.5).unwrap() - 0.0425).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkCurve {
    reference_date: Date,
    points: Vec<(f64, f64)>,
}

impl BenchmarkCurve {
    /// Creates a benchmark curve from `(tenor in years, yield)` points.
    ///
    /// # Errors
    ///
    /// Fails when no points are given, a yield is not finite, or tenors are
    /// not strictly increasing after sorting.
    pub fn new(reference_date: Date, mut points: Vec<(f64, f64)>) -> CurveResult<Self> {
        if points.is_empty() {
            return Err(CurveError::InsufficientPoints {
                required: 1,
                got: 0,
            });
        }
        if points.iter().any(|(t, y)| !t.is_finite() || !y.is_finite() || *t <= 0.0) {
            return Err(CurveError::invalid_value(
                "benchmark tenors must be positive and yields finite",
            ));
        }
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        for i in 1..points.len() {
            if points[i].0 <= points[i - 1].0 {
                return Err(CurveError::NonMonotonicTenors {
                    index: i,
                    prev: points[i - 1].0,
                    current: points[i].0,
                });
            }
        }
        Ok(Self {
            reference_date,
            points,
        })
    }

    /// The curve's quote date.
    pub fn reference_date(&self) -> Date {
        self.reference_date
    }

    /// Benchmark tenors in years.
    pub fn tenors(&self) -> Vec<f64> {
        self.points.iter().map(|(t, _)| *t).collect()
    }

    /// The `(tenor, yield)` points.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Interpolated benchmark yield at `years` to maturity.
    pub fn yield_at(&self, years: f64) -> CurveResult<f64> {
        let (xs, ys): (Vec<f64>, Vec<f64>) = self.points.iter().copied().unzip();
        let interp = LinearInterpolator::new(xs, ys)?.with_flat_extrapolation();
        Ok(interp.interpolate(years)?)
    }

    /// Yield of the benchmark whose tenor matches `tenor` (within a day).
    pub fn pillar_yield(&self, tenor: f64) -> Option<f64> {
        self.points
            .iter()
            .find(|(t, _)| (t - tenor).abs() < 1.0 / 365.0)
            .map(|(_, y)| *y)
    }

    /// The point whose tenor is closest to `years`; ties go to the longer tenor.
    pub fn nearest_pillar(&self, years: f64) -> (f64, f64) {
        let mut best = self.points[0];
        for &point in &self.points[1..] {
            if (point.0 - years).abs() <= (best.0 - years).abs() {
                best = point;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn curve() -> BenchmarkCurve {
        BenchmarkCurve::new(
            Date::from_ymd(2025, 1, 15).unwrap(),
            vec![(10.0, 0.045), (2.0, 0.038), (5.0, 0.04), (3.0, 0.039), (30.0, 0.048)],
        )
        .unwrap()
    }

    #[test]
    fn test_sorted_and_interpolated() {
        let c = curve();
        assert_eq!(c.tenors(), vec![2.0, 3.0, 5.0, 10.0, 30.0]);
        assert_relative_eq!(c.yield_at(7.5).unwrap(), 0.0425, epsilon = 1e-12);
    }

    #[test]
    fn test_flat_beyond_ends() {
        let c = curve();
        assert_relative_eq!(c.yield_at(0.5).unwrap(), 0.038);
        assert_relative_eq!(c.yield_at(40.0).unwrap(), 0.048);
    }

    #[test]
    fn test_pillar_lookup() {
        let c = curve();
        assert_eq!(c.pillar_yield(5.0), Some(0.04));
        assert_eq!(c.pillar_yield(7.0), None);
        assert_eq!(c.nearest_pillar(7.0), (5.0, 0.04));
        assert_eq!(c.nearest_pillar(7.5), (10.0, 0.045));
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = BenchmarkCurve::new(
            Date::from_ymd(2025, 1, 15).unwrap(),
            vec![(5.0, 0.04), (5.0, 0.041)],
        );
        assert!(err.is_err());
    }
}

//! Linear interpolation.

use crate::error::{MathError, MathResult};
use crate::interpolation::Interpolator;

/// Piecewise-linear interpolation between data points.
///
/// Outside the data range the interpolator either fails, extends the end
/// segments linearly, or holds the end values flat, depending on how it was
/// built.
///
/// # Example
///
/// ```rust
/// use switchback_math::interpolation::{Interpolator, LinearInterpolator};
///
/// let tenors = vec![5.0, 10.0];
/// let yields = vec![0.04, 0.045];
///
/// let interp = LinearInterpolator::new(tenors, yields).unwrap();
/// assert!((interp.interpolate(7.5).unwrap() - 0.0425).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    extrapolation: Extrapolation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extrapolation {
    Forbidden,
    Linear,
    Flat,
}

impl LinearInterpolator {
    /// Creates a new linear interpolator.
    ///
    /// A single point is accepted and gives a constant function.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no points, if lengths differ, or if the
    /// x values are not strictly increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        if xs.is_empty() {
            return Err(MathError::insufficient_data(1, 0));
        }
        if xs.len() != ys.len() {
            return Err(MathError::invalid_input(format!(
                "xs and ys must have same length: {} vs {}",
                xs.len(),
                ys.len()
            )));
        }
        if xs.windows(2).any(|w| w[1] <= w[0]) {
            return Err(MathError::invalid_input(
                "x values must be strictly increasing",
            ));
        }

        Ok(Self {
            xs,
            ys,
            extrapolation: Extrapolation::Forbidden,
        })
    }

    /// Extends the end segments linearly beyond the data range.
    #[must_use]
    pub fn with_extrapolation(mut self) -> Self {
        self.extrapolation = Extrapolation::Linear;
        self
    }

    /// Holds the end values constant beyond the data range.
    #[must_use]
    pub fn with_flat_extrapolation(mut self) -> Self {
        self.extrapolation = Extrapolation::Flat;
        self
    }

    /// The x values.
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// The y values.
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    fn check_range(&self, x: f64) -> MathResult<()> {
        if self.extrapolation == Extrapolation::Forbidden && !self.in_range(x) {
            return Err(MathError::ExtrapolationNotAllowed {
                x,
                min: self.min_x(),
                max: self.max_x(),
            });
        }
        Ok(())
    }

    /// Index i such that xs[i] <= x < xs[i+1], clamped to a valid segment.
    fn find_segment(&self, x: f64) -> usize {
        let last = self.xs.len() - 2;
        self.xs.partition_point(|&xi| xi <= x).saturating_sub(1).min(last)
    }
}

impl Interpolator for LinearInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        self.check_range(x)?;

        let n = self.xs.len();
        if n == 1 {
            return Ok(self.ys[0]);
        }
        if self.extrapolation == Extrapolation::Flat {
            if x <= self.xs[0] {
                return Ok(self.ys[0]);
            }
            if x >= self.xs[n - 1] {
                return Ok(self.ys[n - 1]);
            }
        }

        let i = self.find_segment(x);
        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);

        let t = (x - x0) / (x1 - x0);
        Ok(y0 + t * (y1 - y0))
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        self.check_range(x)?;

        let n = self.xs.len();
        if n == 1 || (self.extrapolation == Extrapolation::Flat && !self.in_range(x)) {
            return Ok(0.0);
        }

        let i = self.find_segment(x);
        Ok((self.ys[i + 1] - self.ys[i]) / (self.xs[i + 1] - self.xs[i]))
    }

    fn min_x(&self) -> f64 {
        self.xs[0]
    }

    fn max_x(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }
}

//! Pillar zero-rate curve.

use switchback_core::types::{Compounding, Date};
use switchback_math::interpolation::{Interpolator, LinearInterpolator};

use crate::error::{CurveError, CurveResult};
use crate::traits::Curve;
use crate::{ExtrapolationMethod, InterpolationMethod};

/// A discount curve defined by `(tenor, zero rate)` pillars.
///
/// Rates are quoted under the curve's [`Compounding`] (continuous unless
/// stated). Between pillars the [`InterpolationMethod`] applies; beyond the
/// last pillar the [`ExtrapolationMethod`]; below the first pillar the
/// first zero rate is held.
///
/// # Example
///
/// ```rust
/// use switchback_core::types::Date;
/// use switchback_curves::prelude::*;
///
/// let curve = ZeroCurveBuilder::new(Date::from_ymd(2025, 1, 15).unwrap())
///     .add_pillar(1.0, 0.040)
///     .add_pillar(5.0, 0.042)
///     .add_pillar(10.0, 0.045)
///     .build()
///     .unwrap();
///
/// let df = curve.discount_factor(7.5).unwrap();
/// assert!((df - (-0.0435_f64 * 7.5).exp()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct ZeroCurve {
    reference_date: Date,
    tenors: Vec<f64>,
    rates: Vec<f64>,
    compounding: Compounding,
    interpolation: InterpolationMethod,
    extrapolation: ExtrapolationMethod,
    interpolator: LinearInterpolator,
}

impl ZeroCurve {
    /// Creates a curve from pillar tenors and zero rates.
    ///
    /// # Errors
    ///
    /// Fails on empty or mismatched inputs, non-increasing or negative
    /// tenors, and non-finite rates.
    pub fn new(
        reference_date: Date,
        tenors: Vec<f64>,
        rates: Vec<f64>,
        compounding: Compounding,
        interpolation: InterpolationMethod,
        extrapolation: ExtrapolationMethod,
    ) -> CurveResult<Self> {
        if tenors.is_empty() {
            return Err(CurveError::InsufficientPoints {
                required: 1,
                got: 0,
            });
        }
        if tenors.len() != rates.len() {
            return Err(CurveError::invalid_value(format!(
                "{} tenors but {} rates",
                tenors.len(),
                rates.len()
            )));
        }
        for i in 1..tenors.len() {
            if tenors[i] <= tenors[i - 1] {
                return Err(CurveError::NonMonotonicTenors {
                    index: i,
                    prev: tenors[i - 1],
                    current: tenors[i],
                });
            }
        }
        if tenors[0] < 0.0 {
            return Err(CurveError::invalid_value("negative pillar tenor"));
        }
        if rates.iter().any(|r| !r.is_finite()) {
            return Err(CurveError::invalid_value("non-finite zero rate"));
        }

        let interpolator = build_interpolator(&tenors, &rates, compounding, interpolation)?;
        let interpolator = match extrapolation {
            ExtrapolationMethod::Linear => interpolator.with_extrapolation(),
            ExtrapolationMethod::None | ExtrapolationMethod::Flat => interpolator,
        };

        Ok(Self {
            reference_date,
            tenors,
            rates,
            compounding,
            interpolation,
            extrapolation,
            interpolator,
        })
    }

    /// A flat curve at a single rate.
    pub fn flat(reference_date: Date, rate: f64, compounding: Compounding) -> CurveResult<Self> {
        Self::new(
            reference_date,
            vec![1.0],
            vec![rate],
            compounding,
            InterpolationMethod::Linear,
            ExtrapolationMethod::Flat,
        )
    }

    /// Pillar tenors in years.
    pub fn tenors(&self) -> &[f64] {
        &self.tenors
    }

    /// Pillar zero rates.
    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    /// Compounding of the quoted rates.
    pub fn compounding(&self) -> Compounding {
        self.compounding
    }

    /// Interpolation rule.
    pub fn interpolation(&self) -> InterpolationMethod {
        self.interpolation
    }

    /// Extrapolation rule.
    pub fn extrapolation(&self) -> ExtrapolationMethod {
        self.extrapolation
    }

    /// Last pillar tenor.
    pub fn max_tenor(&self) -> f64 {
        self.tenors[self.tenors.len() - 1]
    }

    /// A copy of the curve with every pillar rate moved by `shift`.
    pub fn bumped(&self, shift: f64) -> CurveResult<Self> {
        Self::new(
            self.reference_date,
            self.tenors.clone(),
            self.rates.iter().map(|r| r + shift).collect(),
            self.compounding,
            self.interpolation,
            self.extrapolation,
        )
    }

    /// Zero rate at `t` in the curve's own compounding.
    fn quoted_rate(&self, t: f64) -> CurveResult<f64> {
        let first = self.tenors[0];
        let last = self.max_tenor();

        if t <= first {
            return Ok(self.rates[0]);
        }
        if t > last {
            match self.extrapolation {
                ExtrapolationMethod::None => {
                    return Err(CurveError::tenor_out_of_range(t, 0.0, last));
                }
                ExtrapolationMethod::Flat => return Ok(self.rates[self.rates.len() - 1]),
                ExtrapolationMethod::Linear => {}
            }
        }

        match self.interpolation {
            InterpolationMethod::Linear => Ok(self.interpolator.interpolate(t)?),
            InterpolationMethod::LogLinear => {
                let ln_df = self.interpolator.interpolate(t)?;
                Ok(self.compounding.zero_rate(ln_df.exp(), t))
            }
        }
    }
}

/// Interpolator over zero rates (linear) or log discount factors (log-linear).
fn build_interpolator(
    tenors: &[f64],
    rates: &[f64],
    compounding: Compounding,
    interpolation: InterpolationMethod,
) -> CurveResult<LinearInterpolator> {
    let interp = match interpolation {
        InterpolationMethod::Linear => LinearInterpolator::new(tenors.to_vec(), rates.to_vec())?,
        InterpolationMethod::LogLinear => {
            let ln_dfs = tenors
                .iter()
                .zip(rates)
                .map(|(&t, &r)| {
                    let df = compounding.discount_factor(r, t);
                    if df > 0.0 && df.is_finite() {
                        Ok(df.ln())
                    } else {
                        Err(CurveError::invalid_value(format!(
                            "rate {r} gives no discount factor at {t}"
                        )))
                    }
                })
                .collect::<CurveResult<Vec<f64>>>()?;
            LinearInterpolator::new(tenors.to_vec(), ln_dfs)?
        }
    };
    Ok(interp)
}

impl Curve for ZeroCurve {
    fn discount_factor(&self, t: f64) -> CurveResult<f64> {
        if t < 0.0 {
            return Err(CurveError::tenor_out_of_range(t, 0.0, self.max_tenor()));
        }
        if t == 0.0 {
            return Ok(1.0);
        }
        let rate = self.quoted_rate(t)?;
        Ok(self.compounding.discount_factor(rate, t))
    }

    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn zero_rate(&self, t: f64, compounding: Compounding) -> CurveResult<f64> {
        if compounding == self.compounding && t > 0.0 {
            return self.quoted_rate(t);
        }
        let df = self.discount_factor(t)?;
        Ok(compounding.zero_rate(df, t))
    }
}

/// Fluent builder for [`ZeroCurve`].
#[derive(Debug, Clone)]
pub struct ZeroCurveBuilder {
    reference_date: Date,
    pillars: Vec<(f64, f64)>,
    compounding: Compounding,
    interpolation: InterpolationMethod,
    extrapolation: ExtrapolationMethod,
}

impl ZeroCurveBuilder {
    /// Starts a builder with continuous compounding, linear interpolation
    /// and flat extrapolation.
    #[must_use]
    pub fn new(reference_date: Date) -> Self {
        Self {
            reference_date,
            pillars: Vec::new(),
            compounding: Compounding::Continuous,
            interpolation: InterpolationMethod::default(),
            extrapolation: ExtrapolationMethod::default(),
        }
    }

    /// Adds a `(tenor, zero rate)` pillar.
    #[must_use]
    pub fn add_pillar(mut self, tenor: f64, rate: f64) -> Self {
        self.pillars.push((tenor, rate));
        self
    }

    /// Adds several pillars.
    #[must_use]
    pub fn add_pillars(mut self, pillars: &[(f64, f64)]) -> Self {
        self.pillars.extend_from_slice(pillars);
        self
    }

    /// Sets the compounding of the quoted rates.
    #[must_use]
    pub fn with_compounding(mut self, compounding: Compounding) -> Self {
        self.compounding = compounding;
        self
    }

    /// Sets the interpolation rule.
    #[must_use]
    pub fn with_interpolation(mut self, method: InterpolationMethod) -> Self {
        self.interpolation = method;
        self
    }

    /// Sets the extrapolation rule.
    #[must_use]
    pub fn with_extrapolation(mut self, method: ExtrapolationMethod) -> Self {
        self.extrapolation = method;
        self
    }

    /// Builds the curve, sorting pillars by tenor first.
    pub fn build(mut self) -> CurveResult<ZeroCurve> {
        self.pillars.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (tenors, rates) = self.pillars.into_iter().unzip();
        ZeroCurve::new(
            self.reference_date,
            tenors,
            rates,
            self.compounding,
            self.interpolation,
            self.extrapolation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ref_date() -> Date {
        Date::from_ymd(2025, 1, 15).unwrap()
    }

    fn sample(interp: InterpolationMethod, extrap: ExtrapolationMethod) -> ZeroCurve {
        ZeroCurveBuilder::new(ref_date())
            .add_pillars(&[(0.5, 0.043), (2.0, 0.040), (5.0, 0.041), (10.0, 0.044)])
            .with_interpolation(interp)
            .with_extrapolation(extrap)
            .build()
            .unwrap()
    }

    #[test]
    fn test_pillars_reproduced() {
        for interp in [InterpolationMethod::Linear, InterpolationMethod::LogLinear] {
            let curve = sample(interp, ExtrapolationMethod::Flat);
            for (t, r) in curve.tenors().iter().zip(curve.rates()) {
                assert_relative_eq!(
                    curve.discount_factor(*t).unwrap(),
                    (-r * t).exp(),
                    epsilon = 1e-14
                );
            }
        }
    }

    #[test]
    fn test_linear_zero_interpolation() {
        let curve = sample(InterpolationMethod::Linear, ExtrapolationMethod::Flat);
        let r = curve.zero_rate(3.5, Compounding::Continuous).unwrap();
        assert_relative_eq!(r, 0.0405, epsilon = 1e-14);
    }

    #[test]
    fn test_log_linear_constant_forward() {
        let curve = sample(InterpolationMethod::LogLinear, ExtrapolationMethod::Flat);
        let f1 = curve.forward_rate(5.5, 6.0).unwrap();
        let f2 = curve.forward_rate(9.0, 9.5).unwrap();
        assert_relative_eq!(f1, f2, epsilon = 1e-12);
    }

    #[test]
    fn test_short_end_holds_first_rate() {
        let curve = sample(InterpolationMethod::Linear, ExtrapolationMethod::None);
        assert_relative_eq!(
            curve.zero_rate(0.1, Compounding::Continuous).unwrap(),
            0.043,
            epsilon = 1e-14
        );
        assert_eq!(curve.discount_factor(0.0).unwrap(), 1.0);
    }

    #[test]
    fn test_extrapolation_rules() {
        let none = sample(InterpolationMethod::Linear, ExtrapolationMethod::None);
        assert!(matches!(
            none.discount_factor(12.0),
            Err(CurveError::TenorOutOfRange { .. })
        ));

        let flat = sample(InterpolationMethod::Linear, ExtrapolationMethod::Flat);
        assert_relative_eq!(
            flat.zero_rate(20.0, Compounding::Continuous).unwrap(),
            0.044,
            epsilon = 1e-14
        );

        let linear = sample(InterpolationMethod::Linear, ExtrapolationMethod::Linear);
        // last segment slope is 0.003 / 5
        assert_relative_eq!(
            linear.zero_rate(15.0, Compounding::Continuous).unwrap(),
            0.047,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_negative_time_fails() {
        let curve = sample(InterpolationMethod::Linear, ExtrapolationMethod::Flat);
        assert!(curve.discount_factor(-0.1).is_err());
    }

    #[test]
    fn test_periodic_compounding() {
        let curve = ZeroCurveBuilder::new(ref_date())
            .add_pillar(1.0, 0.05)
            .add_pillar(2.0, 0.05)
            .with_compounding(Compounding::SemiAnnual)
            .build()
            .unwrap();
        assert_relative_eq!(
            curve.discount_factor(2.0).unwrap(),
            1.025f64.powi(-4),
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_flat_and_bumped() {
        let curve = ZeroCurve::flat(ref_date(), 0.04, Compounding::Continuous).unwrap();
        let bumped = curve.bumped(0.0001).unwrap();
        assert_relative_eq!(
            bumped.discount_factor(3.0).unwrap(),
            (-0.0401f64 * 3.0).exp(),
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(ZeroCurveBuilder::new(ref_date()).build().is_err());
        assert!(ZeroCurve::new(
            ref_date(),
            vec![1.0, 1.0],
            vec![0.04, 0.05],
            Compounding::Continuous,
            InterpolationMethod::Linear,
            ExtrapolationMethod::Flat,
        )
        .is_err());
        assert!(ZeroCurve::new(
            ref_date(),
            vec![1.0],
            vec![f64::NAN],
            Compounding::Continuous,
            InterpolationMethod::Linear,
            ExtrapolationMethod::Flat,
        )
        .is_err());
    }
}

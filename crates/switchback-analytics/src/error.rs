//! Error taxonomy for valuation, spread, workout and model operations.
//!
//! Lower-layer errors from `switchback-core`, `switchback-math`,
//! `switchback-curves` and `switchback-bonds` map into these variants, so a
//! caller only ever matches on [`AnalyticsError`].

use thiserror::Error;

use switchback_bonds::BondError;
use switchback_core::CoreError;
use switchback_curves::CurveError;
use switchback_math::MathError;

/// Error type for all analytics operations.
#[derive(Debug, Clone, Error)]
pub enum AnalyticsError {
    /// Invalid instrument terms, engine settings or inputs.
    #[error("configuration error: {reason}")]
    Configuration {
        /// What is invalid.
        reason: String,
    },

    /// A floating leg needed a projection curve that was not supplied.
    #[error("missing curve: {reason}")]
    MissingCurve {
        /// Which curve was missing and why it was needed.
        reason: String,
    },

    /// A root-finder or bracket search failed.
    #[error("numerical failure: {reason} after {iterations} iterations (residual: {residual:.3e})")]
    Numerical {
        /// Description of the failure.
        reason: String,
        /// Iterations (or bracket expansions) performed.
        iterations: u32,
        /// Last residual seen.
        residual: f64,
        /// Last bracket tried, when the failure came from a bracket search.
        bracket: Option<(f64, f64)>,
    },

    /// Model calibration did not converge or left the admissible region.
    #[error("calibration failed: {reason}")]
    Calibration {
        /// Description of the failure.
        reason: String,
    },

    /// A curve lookup fell outside the curve's domain.
    #[error("interpolation error: {reason}")]
    Interpolation {
        /// Description of the lookup failure.
        reason: String,
    },
}

/// Result type alias for analytics operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

impl AnalyticsError {
    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Creates a missing curve error.
    #[must_use]
    pub fn missing_curve(reason: impl Into<String>) -> Self {
        Self::MissingCurve {
            reason: reason.into(),
        }
    }

    /// Creates a numerical error without bracket information.
    #[must_use]
    pub fn numerical(reason: impl Into<String>, iterations: u32, residual: f64) -> Self {
        Self::Numerical {
            reason: reason.into(),
            iterations,
            residual,
            bracket: None,
        }
    }

    /// Creates a calibration error.
    #[must_use]
    pub fn calibration(reason: impl Into<String>) -> Self {
        Self::Calibration {
            reason: reason.into(),
        }
    }

    /// Creates an interpolation error.
    #[must_use]
    pub fn interpolation(reason: impl Into<String>) -> Self {
        Self::Interpolation {
            reason: reason.into(),
        }
    }

    /// Returns true for root-finding and bracketing failures.
    #[must_use]
    pub fn is_numerical(&self) -> bool {
        matches!(self, Self::Numerical { .. })
    }
}

impl From<CoreError> for AnalyticsError {
    fn from(err: CoreError) -> Self {
        AnalyticsError::configuration(err.to_string())
    }
}

impl From<MathError> for AnalyticsError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::ConvergenceFailed {
                iterations,
                residual,
            } => AnalyticsError::numerical("solver did not converge", iterations, residual),
            MathError::BracketNotFound {
                a,
                b,
                fa,
                fb,
                expansions,
            } => AnalyticsError::Numerical {
                reason: "no sign change in bracket".to_string(),
                iterations: expansions,
                residual: fa.abs().min(fb.abs()),
                bracket: Some((a, b)),
            },
            MathError::InvalidBracket { a, b, fa, fb } => AnalyticsError::Numerical {
                reason: "invalid bracket".to_string(),
                iterations: 0,
                residual: fa.abs().min(fb.abs()),
                bracket: Some((a, b)),
            },
            MathError::ExtrapolationNotAllowed { .. } => {
                AnalyticsError::interpolation(err.to_string())
            }
            MathError::InvalidInput { reason } => AnalyticsError::configuration(reason),
            other => AnalyticsError::numerical(other.to_string(), 0, f64::NAN),
        }
    }
}

impl From<CurveError> for AnalyticsError {
    fn from(err: CurveError) -> Self {
        match err {
            CurveError::TenorOutOfRange { .. } | CurveError::InterpolationError { .. } => {
                AnalyticsError::interpolation(err.to_string())
            }
            other => AnalyticsError::configuration(other.to_string()),
        }
    }
}

impl From<BondError> for AnalyticsError {
    fn from(err: BondError) -> Self {
        match err {
            BondError::MissingCurve { .. } => AnalyticsError::missing_curve(err.to_string()),
            BondError::CoreError(inner) => inner.into(),
            BondError::CurveError(inner) => inner.into(),
            other => AnalyticsError::configuration(other.to_string()),
        }
    }
}

//! Error types for instrument, schedule and cashflow construction.

use thiserror::Error;

use switchback_core::types::Date;

/// A specialized Result type for bond operations.
pub type BondResult<T> = Result<T, BondError>;

/// Errors that can occur while building instruments, schedules and cashflows.
#[derive(Error, Debug, Clone)]
pub enum BondError {
    /// The instrument or schedule terms are inconsistent.
    #[error("Configuration error: {reason}")]
    Configuration {
        /// Description of what's invalid.
        reason: String,
    },

    /// Missing required field.
    #[error("Missing required field: {field}")]
    MissingField {
        /// The missing field name.
        field: String,
    },

    /// A floating period was requested without a projection curve.
    #[error("Missing projection curve for floating period starting {period_start}")]
    MissingCurve {
        /// Start of the first floating period that needed projection.
        period_start: Date,
    },

    /// Core library error.
    #[error("Core error: {0}")]
    CoreError(#[from] switchback_core::CoreError),

    /// Curve error.
    #[error("Curve error: {0}")]
    CurveError(#[from] switchback_curves::CurveError),
}

impl BondError {
    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Creates a missing field error.
    #[must_use]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}

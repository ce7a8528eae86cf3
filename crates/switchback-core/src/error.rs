//! Error types for the core date and convention layer.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by dates, frequencies, day counts and calendars.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Error in date calculations or invalid date.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// A payment frequency that does not divide a year into whole months.
    #[error("Invalid frequency: {periods_per_year} periods per year does not divide 12 months")]
    InvalidFrequency {
        /// The requested number of periods per year.
        periods_per_year: u32,
    },

    /// Unrecognised day count convention name.
    #[error("Unknown day count convention: '{name}'")]
    UnknownDayCount {
        /// The string that failed to parse.
        name: String,
    },

    /// Calendar or business day error.
    #[error("Calendar error: {reason}")]
    CalendarError {
        /// Description of the error.
        reason: String,
    },
}

impl CoreError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates a calendar error.
    #[must_use]
    pub fn calendar_error(reason: impl Into<String>) -> Self {
        Self::CalendarError {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_date("2024-02-30");
        assert!(err.to_string().contains("Invalid date"));

        let err = CoreError::InvalidFrequency {
            periods_per_year: 5,
        };
        assert!(err.to_string().contains("5 periods"));
    }
}

//! Interpolation and extrapolation rules for pillar curves.

use serde::{Deserialize, Serialize};

/// What is interpolated between pillars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InterpolationMethod {
    /// Linear on zero rates.
    #[default]
    Linear,
    /// Linear on the log of discount factors (piecewise-flat forwards).
    LogLinear,
}

/// Behaviour beyond the last pillar.
///
/// Below the first pillar the first zero rate is always held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ExtrapolationMethod {
    /// Queries beyond the last pillar fail.
    None,
    /// Hold the last zero rate.
    #[default]
    Flat,
    /// Extend the last interpolation segment.
    Linear,
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterpolationMethod::Linear => write!(f, "Linear (zero rate)"),
            InterpolationMethod::LogLinear => write!(f, "Log-Linear (discount factor)"),
        }
    }
}

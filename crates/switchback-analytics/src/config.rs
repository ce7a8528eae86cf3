//! Engine configuration.
//!
//! [`EngineConfig`] gathers every numerical knob of the engine: root-finder
//! tolerances and iteration caps, bracket expansion, the risk bump size, the
//! lattice resolution and the default short-rate parameters. Every field has
//! a serde default, so a configuration file only needs the values it
//! overrides.
//!
//! # Example
//!
//! ```rust
//! use switchback_analytics::config::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str(
//!     r#"
//!     lattice_steps = 250
//!     risk_bump = 0.0005
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.lattice_steps, 250);
//! assert_eq!(config.max_iterations, 100);
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use switchback_math::optimization::OptimizationConfig;
use switchback_math::solvers::{SolverConfig, DEFAULT_MAX_EXPANSIONS};

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::options::HullWhiteParams;

/// A single validation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Field that failed validation.
    pub field: String,
    /// Validation error message.
    pub message: String,
    /// Validation rule that was violated.
    pub rule: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Creates a validation error with a rule name.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref rule) = self.rule {
            write!(f, "{}: {} (rule: {})", self.field, self.message, rule)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Trait for validatable configurations.
pub trait Validate {
    /// Returns every validation failure, or an empty vector if valid.
    fn validate(&self) -> Vec<ValidationError>;

    /// Returns true if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Validates and returns an error listing every failure.
    fn validate_or_error(&self) -> AnalyticsResult<()> {
        let errors = self.validate();
        if errors.is_empty() {
            return Ok(());
        }
        let listed: Vec<String> = errors.iter().map(ToString::to_string).collect();
        Err(AnalyticsError::configuration(listed.join("; ")))
    }
}

/// Numerical settings shared by every valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Root-finder convergence tolerance (in price).
    #[serde(default = "default_solver_tolerance")]
    pub solver_tolerance: f64,

    /// Root-finder iteration cap.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Cap on geometric bracket expansions.
    #[serde(default = "default_max_expansions")]
    pub max_bracket_expansions: u32,

    /// Initial yield bracket, annualized.
    #[serde(default = "default_yield_bracket")]
    pub yield_bracket: (f64, f64),

    /// Yield or curve perturbation for risk measures.
    #[serde(default = "default_risk_bump")]
    pub risk_bump: f64,

    /// Initial Z-spread and OAS bracket.
    #[serde(default = "default_spread_bracket")]
    pub spread_bracket: (f64, f64),

    /// Time steps of the short-rate lattice.
    #[serde(default = "default_lattice_steps")]
    pub lattice_steps: usize,

    /// Default Hull-White mean reversion.
    #[serde(default = "default_mean_reversion")]
    pub mean_reversion: f64,

    /// Default Hull-White volatility.
    #[serde(default = "default_volatility")]
    pub volatility: f64,

    /// Calibration convergence tolerance.
    #[serde(default = "default_calibration_tolerance")]
    pub calibration_tolerance: f64,

    /// Calibration iteration cap.
    #[serde(default = "default_calibration_max_iterations")]
    pub calibration_max_iterations: u32,
}

fn default_solver_tolerance() -> f64 {
    1e-10
}

fn default_max_iterations() -> u32 {
    100
}

fn default_max_expansions() -> u32 {
    DEFAULT_MAX_EXPANSIONS
}

fn default_yield_bracket() -> (f64, f64) {
    (-0.99, 1.0)
}

fn default_risk_bump() -> f64 {
    1e-4
}

fn default_spread_bracket() -> (f64, f64) {
    (-0.05, 0.20)
}

fn default_lattice_steps() -> usize {
    100
}

fn default_mean_reversion() -> f64 {
    0.03
}

fn default_volatility() -> f64 {
    0.011
}

fn default_calibration_tolerance() -> f64 {
    1e-8
}

fn default_calibration_max_iterations() -> u32 {
    500
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            solver_tolerance: default_solver_tolerance(),
            max_iterations: default_max_iterations(),
            max_bracket_expansions: default_max_expansions(),
            yield_bracket: default_yield_bracket(),
            risk_bump: default_risk_bump(),
            spread_bracket: default_spread_bracket(),
            lattice_steps: default_lattice_steps(),
            mean_reversion: default_mean_reversion(),
            volatility: default_volatility(),
            calibration_tolerance: default_calibration_tolerance(),
            calibration_max_iterations: default_calibration_max_iterations(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` on malformed input or failed
    /// validation.
    pub fn from_toml_str(input: &str) -> AnalyticsResult<Self> {
        let config: Self = toml::from_str(input)
            .map_err(|e| AnalyticsError::configuration(format!("invalid TOML: {e}")))?;
        config.validate_or_error()?;
        Ok(config)
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` on malformed input or failed
    /// validation.
    pub fn from_json_str(input: &str) -> AnalyticsResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| AnalyticsError::configuration(format!("invalid JSON: {e}")))?;
        config.validate_or_error()?;
        Ok(config)
    }

    /// Loads a configuration file, choosing the format from its extension
    /// (`.json` is JSON, anything else TOML).
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` if the file cannot be read or
    /// parsed, or fails validation.
    pub fn load(path: impl AsRef<Path>) -> AnalyticsResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AnalyticsError::configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_toml_str(&contents),
        }
    }

    /// Sets the solver tolerance.
    #[must_use]
    pub fn with_solver_tolerance(mut self, tolerance: f64) -> Self {
        self.solver_tolerance = tolerance;
        self
    }

    /// Sets the solver iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the bracket expansion cap.
    #[must_use]
    pub fn with_max_bracket_expansions(mut self, expansions: u32) -> Self {
        self.max_bracket_expansions = expansions;
        self
    }

    /// Sets the risk bump size.
    #[must_use]
    pub fn with_risk_bump(mut self, bump: f64) -> Self {
        self.risk_bump = bump;
        self
    }

    /// Sets the lattice resolution.
    #[must_use]
    pub fn with_lattice_steps(mut self, steps: usize) -> Self {
        self.lattice_steps = steps;
        self
    }

    /// Sets the default short-rate parameters.
    #[must_use]
    pub fn with_hull_white(mut self, mean_reversion: f64, volatility: f64) -> Self {
        self.mean_reversion = mean_reversion;
        self.volatility = volatility;
        self
    }

    /// Sets the calibration tolerance.
    #[must_use]
    pub fn with_calibration_tolerance(mut self, tolerance: f64) -> Self {
        self.calibration_tolerance = tolerance;
        self
    }

    /// Root-finder settings.
    #[must_use]
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig::new(self.solver_tolerance, self.max_iterations)
    }

    /// Levenberg-Marquardt settings for calibration.
    #[must_use]
    pub fn calibration_config(&self) -> OptimizationConfig {
        OptimizationConfig::default()
            .with_tolerance(self.calibration_tolerance)
            .with_max_iterations(self.calibration_max_iterations)
    }

    /// Default short-rate parameters.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` if either parameter is not
    /// strictly positive.
    pub fn hull_white(&self) -> AnalyticsResult<HullWhiteParams> {
        HullWhiteParams::new(self.mean_reversion, self.volatility)
    }
}

impl Validate for EngineConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !(self.solver_tolerance > 0.0 && self.solver_tolerance <= 1e-4) {
            errors.push(ValidationError::with_rule(
                "solver_tolerance",
                "Solver tolerance must be in (0, 1e-4]",
                "valid_tolerance",
            ));
        }

        if self.max_iterations == 0 || self.max_iterations > 10_000 {
            errors.push(ValidationError::with_rule(
                "max_iterations",
                "Max iterations must be between 1 and 10000",
                "valid_iterations",
            ));
        }

        if self.max_bracket_expansions > 200 {
            errors.push(ValidationError::new(
                "max_bracket_expansions",
                "Bracket expansions cannot exceed 200",
            ));
        }

        for (field, (lo, hi)) in [
            ("yield_bracket", self.yield_bracket),
            ("spread_bracket", self.spread_bracket),
        ] {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                errors.push(ValidationError::with_rule(
                    field,
                    "Bracket must be finite with lower < upper",
                    "ordered_bracket",
                ));
            }
        }

        if !(self.risk_bump > 0.0 && self.risk_bump <= 0.01) {
            errors.push(ValidationError::with_rule(
                "risk_bump",
                "Risk bump must be in (0, 0.01]",
                "valid_bump",
            ));
        }

        if self.lattice_steps < 2 || self.lattice_steps > 5_000 {
            errors.push(ValidationError::with_rule(
                "lattice_steps",
                "Lattice steps must be between 2 and 5000",
                "valid_steps",
            ));
        }

        if self.mean_reversion <= 0.0 {
            errors.push(ValidationError::new(
                "mean_reversion",
                "Mean reversion must be positive",
            ));
        }

        if self.volatility <= 0.0 {
            errors.push(ValidationError::new("volatility", "Volatility must be positive"));
        }

        if !(self.calibration_tolerance > 0.0 && self.calibration_tolerance <= 1e-4) {
            errors.push(ValidationError::with_rule(
                "calibration_tolerance",
                "Calibration tolerance must be in (0, 1e-4]",
                "valid_tolerance",
            ));
        }

        if self.calibration_max_iterations == 0 {
            errors.push(ValidationError::new(
                "calibration_max_iterations",
                "Calibration needs at least one iteration",
            ));
        }

        errors
    }
}

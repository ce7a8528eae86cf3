//! Valuation context.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use switchback_bonds::Instrument;
use switchback_core::daycounts::DayCountConvention;
use switchback_core::types::{Compounding, Date};
use switchback_curves::Curve;

use crate::config::{EngineConfig, Validate};
use crate::error::AnalyticsResult;

/// Day count and compounding under which yields are quoted.
///
/// Cashflow times for the closed-form pricer are day-count year fractions
/// from settlement under `day_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldConvention {
    /// Day count for cashflow times.
    pub day_count: DayCountConvention,
    /// Compounding of the quoted yield.
    pub compounding: Compounding,
}

impl Default for YieldConvention {
    fn default() -> Self {
        Self {
            day_count: DayCountConvention::Thirty360US,
            compounding: Compounding::SemiAnnual,
        }
    }
}

impl YieldConvention {
    /// Creates a yield convention.
    #[must_use]
    pub fn new(day_count: DayCountConvention, compounding: Compounding) -> Self {
        Self {
            day_count,
            compounding,
        }
    }

    /// The instrument's own convention: its accrual day count, compounded at
    /// its quote frequency.
    #[must_use]
    pub fn for_instrument(instrument: &Instrument) -> Self {
        Self::new(
            instrument.day_count(),
            Compounding::from(instrument.quote_frequency()),
        )
    }

    /// Year fraction from `settlement` to `date`.
    #[must_use]
    pub fn time(&self, settlement: Date, date: Date) -> f64 {
        crate::to_f64(self.day_count.year_fraction(settlement, date))
    }
}

/// Everything a valuation needs besides the instrument.
///
/// Curves are shared behind `Arc` so one context can be read concurrently
/// from batch workers.
#[derive(Clone)]
pub struct ValuationContext {
    evaluation_date: Date,
    settlement_date: Date,
    discount_curve: Arc<dyn Curve>,
    projection_curve: Arc<dyn Curve>,
    yield_convention: Option<YieldConvention>,
    config: EngineConfig,
}

impl fmt::Debug for ValuationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValuationContext")
            .field("evaluation_date", &self.evaluation_date)
            .field("settlement_date", &self.settlement_date)
            .field("discount_reference", &self.discount_curve.reference_date())
            .field("yield_convention", &self.yield_convention)
            .finish_non_exhaustive()
    }
}

impl ValuationContext {
    /// Creates a context settling on `settlement_date`, discounting and
    /// projecting on the same curve.
    #[must_use]
    pub fn new(settlement_date: Date, discount_curve: Arc<dyn Curve>) -> Self {
        Self {
            evaluation_date: settlement_date,
            settlement_date,
            projection_curve: Arc::clone(&discount_curve),
            discount_curve,
            yield_convention: None,
            config: EngineConfig::default(),
        }
    }

    /// Creates a context for a trade on `trade_date`, settling after the
    /// instrument's settlement lag on its calendar.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` if the settlement date cannot
    /// be computed.
    pub fn for_trade(
        instrument: &Instrument,
        trade_date: Date,
        discount_curve: Arc<dyn Curve>,
    ) -> AnalyticsResult<Self> {
        let settlement = instrument.settlement_date(trade_date)?;
        Ok(Self::new(settlement, discount_curve).with_evaluation_date(trade_date))
    }

    /// Sets the evaluation (trade) date.
    #[must_use]
    pub fn with_evaluation_date(mut self, date: Date) -> Self {
        self.evaluation_date = date;
        self
    }

    /// Sets a separate projection curve for floating coupons.
    #[must_use]
    pub fn with_projection_curve(mut self, curve: Arc<dyn Curve>) -> Self {
        self.projection_curve = curve;
        self
    }

    /// Overrides the instrument's own yield convention.
    #[must_use]
    pub fn with_yield_convention(mut self, convention: YieldConvention) -> Self {
        self.yield_convention = Some(convention);
        self
    }

    /// Sets the engine configuration.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Configuration` if the configuration fails
    /// validation.
    pub fn with_config(mut self, config: EngineConfig) -> AnalyticsResult<Self> {
        config.validate_or_error()?;
        self.config = config;
        Ok(self)
    }

    /// Evaluation date.
    #[must_use]
    pub fn evaluation_date(&self) -> Date {
        self.evaluation_date
    }

    /// Settlement date at which prices are quoted.
    #[must_use]
    pub fn settlement_date(&self) -> Date {
        self.settlement_date
    }

    /// Discount curve.
    #[must_use]
    pub fn discount_curve(&self) -> &dyn Curve {
        self.discount_curve.as_ref()
    }

    /// Projection curve for floating coupons.
    #[must_use]
    pub fn projection_curve(&self) -> &dyn Curve {
        self.projection_curve.as_ref()
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Yield convention for `instrument`: the override if one was set,
    /// otherwise the instrument's own.
    #[must_use]
    pub fn yield_convention(&self, instrument: &Instrument) -> YieldConvention {
        self.yield_convention
            .unwrap_or_else(|| YieldConvention::for_instrument(instrument))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use switchback_core::types::Frequency;
    use switchback_curves::ZeroCurve;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn curve() -> Arc<dyn Curve> {
        Arc::new(ZeroCurve::flat(date(2025, 3, 3), 0.04, Compounding::Continuous).unwrap())
    }

    fn bond() -> Instrument {
        Instrument::builder()
            .issue_date(date(2024, 1, 15))
            .maturity_date(date(2034, 1, 15))
            .coupon_rate(dec!(0.05))
            .fixed_frequency(Frequency::Quarterly)
            .build()
            .unwrap()
    }

    #[test]
    fn test_for_trade_applies_settlement_lag() {
        // Monday trade, T+2
        let ctx = ValuationContext::for_trade(&bond(), date(2025, 3, 3), curve()).unwrap();
        assert_eq!(ctx.evaluation_date(), date(2025, 3, 3));
        assert_eq!(ctx.settlement_date(), date(2025, 3, 5));
    }

    #[test]
    fn test_yield_convention_defaults_to_instrument() {
        let ctx = ValuationContext::new(date(2025, 3, 5), curve());
        let convention = ctx.yield_convention(&bond());
        assert_eq!(convention.day_count, DayCountConvention::Thirty360US);
        assert_eq!(convention.compounding, Compounding::Quarterly);

        let act = YieldConvention::new(DayCountConvention::Act365Fixed, Compounding::Annual);
        let ctx = ctx.with_yield_convention(act);
        assert_eq!(ctx.yield_convention(&bond()), act);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let ctx = ValuationContext::new(date(2025, 3, 5), curve());
        let config = EngineConfig::default().with_lattice_steps(0);
        assert!(ctx.with_config(config).is_err());
    }
}

//! The instrument value type and its validating builder.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use switchback_core::calendars::{settlement_date, BusinessDayConvention, Calendar, CalendarKind};
use switchback_core::daycounts::DayCountConvention;
use switchback_core::types::{Date, Frequency};

use crate::error::{BondError, BondResult};
use crate::instruments::CallSchedule;

/// Terms of the floating leg.
///
/// All rates are annualized decimals (0.01 = 100bp).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatingTerms {
    /// Name of the reference index.
    #[serde(default = "default_index")]
    pub index: String,
    /// Quoted margin over the index.
    #[serde(default)]
    pub spread: Decimal,
    /// Reset and payment frequency.
    #[serde(default = "default_floating_frequency")]
    pub frequency: Frequency,
    /// Multiplier applied to the index rate.
    #[serde(default = "default_gearing")]
    pub gearing: Decimal,
    /// Maximum all-in coupon rate.
    #[serde(default)]
    pub cap: Option<Decimal>,
    /// Minimum all-in coupon rate.
    #[serde(default)]
    pub floor: Option<Decimal>,
    /// Index fixing for a period that began before the curve date.
    #[serde(default)]
    pub current_fixing: Option<Decimal>,
}

fn default_index() -> String {
    "SOFR".to_string()
}

fn default_floating_frequency() -> Frequency {
    Frequency::Quarterly
}

fn default_gearing() -> Decimal {
    Decimal::ONE
}

impl FloatingTerms {
    /// SOFR, quarterly, unit gearing, with the given spread.
    #[must_use]
    pub fn new(spread: Decimal) -> Self {
        Self {
            index: default_index(),
            spread,
            frequency: default_floating_frequency(),
            gearing: default_gearing(),
            cap: None,
            floor: None,
            current_fixing: None,
        }
    }

    /// Sets the index name.
    #[must_use]
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    /// Sets the reset frequency.
    #[must_use]
    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Sets the gearing.
    #[must_use]
    pub fn with_gearing(mut self, gearing: Decimal) -> Self {
        self.gearing = gearing;
        self
    }

    /// Sets a cap on the all-in rate.
    #[must_use]
    pub fn with_cap(mut self, cap: Decimal) -> Self {
        self.cap = Some(cap);
        self
    }

    /// Sets a floor on the all-in rate.
    #[must_use]
    pub fn with_floor(mut self, floor: Decimal) -> Self {
        self.floor = Some(floor);
        self
    }

    /// Sets the fixing of the period in progress.
    #[must_use]
    pub fn with_current_fixing(mut self, fixing: Decimal) -> Self {
        self.current_fixing = Some(fixing);
        self
    }

    /// All-in coupon rate for an index rate: `gearing × index + spread`,
    /// then floored and capped.
    #[must_use]
    pub fn coupon_rate(&self, index_rate: f64) -> f64 {
        let mut rate = to_f64(self.gearing) * index_rate + to_f64(self.spread);
        if let Some(floor) = self.floor {
            rate = rate.max(to_f64(floor));
        }
        if let Some(cap) = self.cap {
            rate = rate.min(to_f64(cap));
        }
        rate
    }
}

impl Default for FloatingTerms {
    fn default() -> Self {
        Self::new(Decimal::ZERO)
    }
}

/// Structural shape of an instrument, derived from which terms are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentKind {
    /// Fixed coupon to maturity.
    FixedBullet,
    /// Floating coupon to maturity.
    FloatingRateNote,
    /// Fixed coupon to the switch date, floating thereafter.
    FixToFloat,
}

/// A fixed, floating or fix-to-float bond, optionally callable.
///
/// Construct through [`InstrumentBuilder`], which enforces that the
/// switch date falls strictly inside the life of the bond, that call
/// dates do not pass maturity, and that the coupon terms describe exactly
/// one [`InstrumentKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "InstrumentBuilder")]
pub struct Instrument {
    id: String,
    face_value: Decimal,
    issue_date: Date,
    maturity_date: Date,
    switch_date: Option<Date>,
    coupon_rate: Option<Decimal>,
    fixed_frequency: Frequency,
    floating: Option<FloatingTerms>,
    day_count: DayCountConvention,
    settlement_days: u32,
    call_schedule: CallSchedule,
    calendar: CalendarKind,
    business_day_convention: BusinessDayConvention,
}

impl Instrument {
    /// Returns a new builder.
    #[must_use]
    pub fn builder() -> InstrumentBuilder {
        InstrumentBuilder::new()
    }

    /// Identifier (may be empty).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Face value.
    #[must_use]
    pub fn face_value(&self) -> Decimal {
        self.face_value
    }

    /// Issue date.
    #[must_use]
    pub fn issue_date(&self) -> Date {
        self.issue_date
    }

    /// Maturity date.
    #[must_use]
    pub fn maturity_date(&self) -> Date {
        self.maturity_date
    }

    /// Fixed-to-floating switch date.
    #[must_use]
    pub fn switch_date(&self) -> Option<Date> {
        self.switch_date
    }

    /// Fixed coupon rate.
    #[must_use]
    pub fn coupon_rate(&self) -> Option<Decimal> {
        self.coupon_rate
    }

    /// Fixed coupon frequency.
    #[must_use]
    pub fn fixed_frequency(&self) -> Frequency {
        self.fixed_frequency
    }

    /// Floating leg terms.
    #[must_use]
    pub fn floating(&self) -> Option<&FloatingTerms> {
        self.floating.as_ref()
    }

    /// Accrual day count.
    #[must_use]
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    /// Settlement lag in business days.
    #[must_use]
    pub fn settlement_days(&self) -> u32 {
        self.settlement_days
    }

    /// Call schedule (empty when not callable).
    #[must_use]
    pub fn call_schedule(&self) -> &CallSchedule {
        &self.call_schedule
    }

    /// Calendar selector.
    #[must_use]
    pub fn calendar_kind(&self) -> CalendarKind {
        self.calendar
    }

    /// Business day calendar.
    #[must_use]
    pub fn calendar(&self) -> &'static dyn Calendar {
        self.calendar.calendar()
    }

    /// Business day convention for schedule boundaries.
    #[must_use]
    pub fn business_day_convention(&self) -> BusinessDayConvention {
        self.business_day_convention
    }

    /// Structural shape of the instrument.
    #[must_use]
    pub fn kind(&self) -> InstrumentKind {
        match (self.switch_date, &self.floating) {
            (Some(_), _) => InstrumentKind::FixToFloat,
            (None, Some(_)) => InstrumentKind::FloatingRateNote,
            (None, None) => InstrumentKind::FixedBullet,
        }
    }

    /// Returns true if the instrument has at least one call date.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        !self.call_schedule.is_empty()
    }

    /// Returns true if any coupon is floating.
    #[must_use]
    pub fn has_floating_leg(&self) -> bool {
        self.floating.is_some()
    }

    /// Face value as `f64`.
    #[must_use]
    pub fn face_value_f64(&self) -> f64 {
        to_f64(self.face_value)
    }

    /// Fixed coupon rate as `f64` (zero when there is no fixed leg).
    #[must_use]
    pub fn coupon_rate_f64(&self) -> f64 {
        self.coupon_rate.map_or(0.0, to_f64)
    }

    /// Frequency used to quote yields: the fixed frequency unless the
    /// instrument is a floating-rate note.
    #[must_use]
    pub fn quote_frequency(&self) -> Frequency {
        match (&self.floating, self.kind()) {
            (Some(terms), InstrumentKind::FloatingRateNote) => terms.frequency,
            _ => self.fixed_frequency,
        }
    }

    /// Settlement date for a trade on `trade_date`.
    pub fn settlement_date(&self, trade_date: Date) -> BondResult<Date> {
        Ok(settlement_date(trade_date, self.settlement_days, self.calendar())?)
    }

    /// Copy of this instrument with a different call schedule.
    pub fn with_call_schedule(&self, call_schedule: CallSchedule) -> BondResult<Self> {
        validate_calls(&call_schedule, self.issue_date, self.maturity_date)?;
        Ok(Self {
            call_schedule,
            ..self.clone()
        })
    }
}

/// Builder for [`Instrument`].
///
/// Also the deserialization form of an instrument, so every field is
/// optional and defaults are applied in [`InstrumentBuilder::build`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentBuilder {
    id: Option<String>,
    face_value: Option<Decimal>,
    issue_date: Option<Date>,
    settlement_date: Option<Date>,
    maturity_date: Option<Date>,
    switch_date: Option<Date>,
    coupon_rate: Option<Decimal>,
    fixed_frequency: Option<Frequency>,
    floating: Option<FloatingTerms>,
    day_count: Option<DayCountConvention>,
    settlement_days: Option<u32>,
    call_schedule: Option<CallSchedule>,
    calendar: Option<CalendarKind>,
    business_day_convention: Option<BusinessDayConvention>,
}

impl InstrumentBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the identifier.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the face value (default 100).
    #[must_use]
    pub fn face_value(mut self, face_value: Decimal) -> Self {
        self.face_value = Some(face_value);
        self
    }

    /// Sets the issue date.
    #[must_use]
    pub fn issue_date(mut self, date: Date) -> Self {
        self.issue_date = Some(date);
        self
    }

    /// Sets the settlement date, used as the accrual start when no issue
    /// date is given.
    #[must_use]
    pub fn settlement_date(mut self, date: Date) -> Self {
        self.settlement_date = Some(date);
        self
    }

    /// Sets the maturity date.
    #[must_use]
    pub fn maturity_date(mut self, date: Date) -> Self {
        self.maturity_date = Some(date);
        self
    }

    /// Sets the fixed-to-floating switch date.
    #[must_use]
    pub fn switch_date(mut self, date: Date) -> Self {
        self.switch_date = Some(date);
        self
    }

    /// Sets the fixed coupon rate (0.05 = 5%).
    #[must_use]
    pub fn coupon_rate(mut self, rate: Decimal) -> Self {
        self.coupon_rate = Some(rate);
        self
    }

    /// Sets the fixed coupon frequency (default semi-annual).
    #[must_use]
    pub fn fixed_frequency(mut self, frequency: Frequency) -> Self {
        self.fixed_frequency = Some(frequency);
        self
    }

    /// Sets the floating leg terms.
    #[must_use]
    pub fn floating(mut self, terms: FloatingTerms) -> Self {
        self.floating = Some(terms);
        self
    }

    /// Sets the day count (default 30/360 US).
    #[must_use]
    pub fn day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = Some(day_count);
        self
    }

    /// Sets the settlement lag in business days (default 2).
    #[must_use]
    pub fn settlement_days(mut self, days: u32) -> Self {
        self.settlement_days = Some(days);
        self
    }

    /// Sets the call schedule.
    #[must_use]
    pub fn call_schedule(mut self, schedule: CallSchedule) -> Self {
        self.call_schedule = Some(schedule);
        self
    }

    /// Sets the calendar (default US government bond).
    #[must_use]
    pub fn calendar(mut self, calendar: CalendarKind) -> Self {
        self.calendar = Some(calendar);
        self
    }

    /// Sets the business day convention (default Following).
    #[must_use]
    pub fn business_day_convention(mut self, convention: BusinessDayConvention) -> Self {
        self.business_day_convention = Some(convention);
        self
    }

    /// Validates the terms and builds the instrument.
    pub fn build(self) -> BondResult<Instrument> {
        let maturity_date = self
            .maturity_date
            .ok_or_else(|| BondError::missing_field("maturity_date"))?;
        let issue_date = self
            .issue_date
            .or(self.settlement_date)
            .ok_or_else(|| BondError::missing_field("issue_date"))?;

        if issue_date >= maturity_date {
            return Err(BondError::configuration(format!(
                "issue date {issue_date} must precede maturity {maturity_date}"
            )));
        }

        let face_value = self.face_value.unwrap_or(Decimal::ONE_HUNDRED);
        if face_value <= Decimal::ZERO {
            return Err(BondError::configuration(format!(
                "face value must be positive, got {face_value}"
            )));
        }

        match (self.switch_date, &self.floating, self.coupon_rate) {
            (Some(switch), Some(_), Some(_)) => {
                if switch <= issue_date || switch >= maturity_date {
                    return Err(BondError::configuration(format!(
                        "switch date {switch} must fall strictly between issue {issue_date} and maturity {maturity_date}"
                    )));
                }
            }
            (Some(_), None, _) => return Err(BondError::missing_field("floating")),
            (Some(_), Some(_), None) => return Err(BondError::missing_field("coupon_rate")),
            (None, Some(_), Some(_)) => {
                return Err(BondError::configuration(
                    "fixed and floating terms without a switch date",
                ))
            }
            (None, None, None) => return Err(BondError::missing_field("coupon_rate")),
            (None, Some(_), None) | (None, None, Some(_)) => {}
        }

        if let Some(terms) = &self.floating {
            if let (Some(cap), Some(floor)) = (terms.cap, terms.floor) {
                if cap < floor {
                    return Err(BondError::configuration(format!(
                        "cap {cap} is below floor {floor}"
                    )));
                }
            }
        }

        let settlement_days = self.settlement_days.unwrap_or(2);
        if settlement_days > 30 {
            return Err(BondError::configuration(format!(
                "settlement lag of {settlement_days} days is not supported"
            )));
        }

        let call_schedule = self.call_schedule.unwrap_or_default();
        validate_calls(&call_schedule, issue_date, maturity_date)?;

        Ok(Instrument {
            id: self.id.unwrap_or_default(),
            face_value,
            issue_date,
            maturity_date,
            switch_date: self.switch_date,
            coupon_rate: self.coupon_rate,
            fixed_frequency: self.fixed_frequency.unwrap_or_default(),
            floating: self.floating,
            day_count: self.day_count.unwrap_or_default(),
            settlement_days,
            call_schedule,
            calendar: self.calendar.unwrap_or_default(),
            business_day_convention: self.business_day_convention.unwrap_or_default(),
        })
    }
}

impl TryFrom<InstrumentBuilder> for Instrument {
    type Error = BondError;

    fn try_from(builder: InstrumentBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

fn validate_calls(calls: &CallSchedule, issue_date: Date, maturity_date: Date) -> BondResult<()> {
    for entry in calls.entries() {
        if entry.call_date > maturity_date || entry.call_date <= issue_date {
            return Err(BondError::configuration(format!(
                "call date {} outside ({issue_date}, {maturity_date}]",
                entry.call_date
            )));
        }
    }
    Ok(())
}

pub(crate) fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

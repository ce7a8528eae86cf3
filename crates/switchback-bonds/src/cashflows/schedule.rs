//! Accrual schedule generation.
//!
//! Each segment is rolled forward from its start date: unadjusted anchor
//! dates sit a whole number of coupon periods after the segment start, and
//! period boundaries are the anchors adjusted by the instrument's calendar
//! and business day convention. A fix-to-float instrument produces a fixed
//! segment ending on the switch date followed by a floating segment ending
//! at maturity.
//!
//! # Example
//!
//! ```rust
//! use rust_decimal_macros::dec;
//! use switchback_bonds::cashflows::{generate, Segment};
//! use switchback_bonds::instruments::{FloatingTerms, Instrument};
//! use switchback_core::types::Date;
//!
//! let bond = Instrument::builder()
//!     .issue_date(Date::from_ymd(2024, 1, 15).unwrap())
//!     .switch_date(Date::from_ymd(2027, 1, 15).unwrap())
//!     .maturity_date(Date::from_ymd(2034, 1, 15).unwrap())
//!     .coupon_rate(dec!(0.05))
//!     .floating(FloatingTerms::new(dec!(0.012)))
//!     .build()
//!     .unwrap();
//!
//! let schedule = generate(&bond).unwrap();
//! assert_eq!(schedule.periods_in(Segment::Fixed).count(), 6);
//! assert_eq!(schedule.periods_in(Segment::Floating).count(), 28);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use switchback_core::calendars::{BusinessDayConvention, CalendarKind};
use switchback_core::daycounts::{ActActIcma, DayCount, DayCountConvention};
use switchback_core::types::{Date, Frequency};

use crate::error::{BondError, BondResult};
use crate::instruments::{to_f64, Instrument};

/// Which coupon leg a period belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    /// Fixed coupon period.
    Fixed,
    /// Floating coupon period.
    Floating,
}

/// One accrual period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Adjusted accrual start.
    pub start: Date,
    /// Adjusted accrual end.
    pub end: Date,
    /// Payment date of the period's coupon.
    pub payment_date: Date,
    /// Day count year fraction of the period.
    pub year_fraction: Decimal,
    /// Coupon frequency of the period's segment.
    pub frequency: Frequency,
    /// Leg the period belongs to.
    pub segment: Segment,
    /// True for a period shorter than a regular coupon period.
    pub is_stub: bool,
}

impl Period {
    /// Year fraction scaled by frequency; 1 for a full regular period under 30/360.
    #[must_use]
    pub fn accrual_fraction(&self) -> Decimal {
        self.year_fraction * Decimal::from(self.frequency.periods_per_year())
    }

    /// Year fraction as `f64`.
    #[must_use]
    pub fn year_fraction_f64(&self) -> f64 {
        to_f64(self.year_fraction)
    }

    /// Returns true if `date` falls in `[start, end)`.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        date >= self.start && date < self.end
    }
}

/// Configuration for generating one schedule segment.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Segment start (unadjusted).
    pub start_date: Date,
    /// Segment end (unadjusted).
    pub end_date: Date,
    /// Coupon frequency.
    pub frequency: Frequency,
    /// Leg the generated periods belong to.
    pub segment: Segment,
    /// Calendar for boundary adjustment.
    pub calendar: CalendarKind,
    /// Business day adjustment convention.
    pub business_day_convention: BusinessDayConvention,
    /// Day count for accrual fractions and the roll tolerance.
    pub day_count: DayCountConvention,
}

impl ScheduleConfig {
    /// Creates a fixed segment configuration with market defaults.
    #[must_use]
    pub fn new(start_date: Date, end_date: Date, frequency: Frequency) -> Self {
        Self {
            start_date,
            end_date,
            frequency,
            segment: Segment::Fixed,
            calendar: CalendarKind::default(),
            business_day_convention: BusinessDayConvention::Following,
            day_count: DayCountConvention::default(),
        }
    }

    /// Sets the segment.
    #[must_use]
    pub fn with_segment(mut self, segment: Segment) -> Self {
        self.segment = segment;
        self
    }

    /// Sets the calendar.
    #[must_use]
    pub fn with_calendar(mut self, calendar: CalendarKind) -> Self {
        self.calendar = calendar;
        self
    }

    /// Sets the business day convention.
    #[must_use]
    pub fn with_business_day_convention(mut self, convention: BusinessDayConvention) -> Self {
        self.business_day_convention = convention;
        self
    }

    /// Sets the day count.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountConvention) -> Self {
        self.day_count = day_count;
        self
    }

    /// Calendar days an end date may sit off the roll grid and still be
    /// snapped onto it.
    #[must_use]
    pub fn roll_tolerance_days(&self) -> i64 {
        if self.day_count.is_thirty_360() {
            3
        } else {
            4
        }
    }
}

/// An ordered, contiguous sequence of accrual periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    periods: Vec<Period>,
}

impl Schedule {
    /// Generates a single-segment schedule.
    ///
    /// # Errors
    ///
    /// Returns `BondError::Configuration` if the end date does not follow
    /// the start date, or if the segment spans at least one period and its
    /// end lies off the roll grid by more than the tolerance.
    pub fn from_config(config: &ScheduleConfig) -> BondResult<Self> {
        Ok(Self {
            periods: generate_segment(config)?,
        })
    }

    /// Generates the schedule of an instrument.
    pub fn for_instrument(instrument: &Instrument) -> BondResult<Self> {
        let start = instrument.issue_date();
        let maturity = instrument.maturity_date();

        let base = |start_date: Date, end_date: Date, frequency: Frequency| {
            ScheduleConfig::new(start_date, end_date, frequency)
                .with_calendar(instrument.calendar_kind())
                .with_business_day_convention(instrument.business_day_convention())
                .with_day_count(instrument.day_count())
        };

        let periods = match (instrument.switch_date(), instrument.floating()) {
            (Some(switch), Some(terms)) => {
                if switch <= start || switch >= maturity {
                    return Err(BondError::configuration(format!(
                        "switch date {switch} must fall strictly between {start} and {maturity}"
                    )));
                }
                let mut periods =
                    generate_segment(&base(start, switch, instrument.fixed_frequency()))?;
                periods.extend(generate_segment(
                    &base(switch, maturity, terms.frequency).with_segment(Segment::Floating),
                )?);
                periods
            }
            (None, Some(terms)) => generate_segment(
                &base(start, maturity, terms.frequency).with_segment(Segment::Floating),
            )?,
            (_, None) => generate_segment(&base(start, maturity, instrument.fixed_frequency()))?,
        };

        log::debug!(
            "schedule {} -> {}: {} periods",
            start,
            maturity,
            periods.len()
        );

        Ok(Self { periods })
    }

    /// All periods in order.
    #[must_use]
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Returns true if there are no periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Periods of one leg.
    pub fn periods_in(&self, segment: Segment) -> impl Iterator<Item = &Period> {
        self.periods.iter().filter(move |p| p.segment == segment)
    }

    /// The period whose accrual interval contains `date`.
    #[must_use]
    pub fn period_containing(&self, date: Date) -> Option<&Period> {
        self.periods.iter().find(|p| p.contains(date))
    }

    /// Accrual start of the first period.
    #[must_use]
    pub fn start_date(&self) -> Option<Date> {
        self.periods.first().map(|p| p.start)
    }

    /// Accrual end of the last period.
    #[must_use]
    pub fn end_date(&self) -> Option<Date> {
        self.periods.last().map(|p| p.end)
    }
}

/// Generates the schedule of an instrument.
pub fn generate(instrument: &Instrument) -> BondResult<Schedule> {
    Schedule::for_instrument(instrument)
}

fn generate_segment(config: &ScheduleConfig) -> BondResult<Vec<Period>> {
    let start = config.start_date;
    let end = config.end_date;
    if end <= start {
        return Err(BondError::configuration(format!(
            "segment end {end} must follow start {start}"
        )));
    }

    let months = config.frequency.months_per_period() as i32;
    let tolerance = config.roll_tolerance_days();

    // Unadjusted boundaries, each measured from the segment start so that
    // month-end clamping never drifts.
    let mut anchors = vec![start];
    let mut short_stub = false;
    for k in 1.. {
        let anchor = start.add_months(k * months)?;
        let gap = anchor.days_between(&end);
        if gap > tolerance {
            anchors.push(anchor);
        } else if gap >= -tolerance {
            anchors.push(end);
            break;
        } else if k == 1 {
            anchors.push(end);
            short_stub = true;
            break;
        } else {
            return Err(BondError::configuration(format!(
                "{} does not divide {start} -> {end}: last roll {} is {} days from the end",
                config.frequency,
                anchors[anchors.len() - 1],
                anchors[anchors.len() - 1].days_between(&end)
            )));
        }
    }

    let calendar = config.calendar.calendar();
    let adjusted: Vec<Date> = anchors
        .iter()
        .map(|&d| calendar.adjust(d, config.business_day_convention))
        .collect();

    let periods = adjusted
        .windows(2)
        .map(|w| {
            let (period_start, period_end) = (w[0], w[1]);
            Period {
                start: period_start,
                end: period_end,
                payment_date: period_end,
                year_fraction: year_fraction(config, period_start, period_end),
                frequency: config.frequency,
                segment: config.segment,
                is_stub: short_stub,
            }
        })
        .collect();

    Ok(periods)
}

fn year_fraction(config: &ScheduleConfig, start: Date, end: Date) -> Decimal {
    match config.day_count {
        DayCountConvention::ActActIcma => {
            ActActIcma::new(config.frequency.periods_per_year()).year_fraction(start, end)
        }
        other => other.year_fraction(start, end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn unadjusted(start: Date, end: Date, frequency: Frequency) -> ScheduleConfig {
        ScheduleConfig::new(start, end, frequency)
            .with_business_day_convention(BusinessDayConvention::Unadjusted)
    }

    #[test]
    fn test_regular_semiannual() {
        let config = unadjusted(date(2025, 1, 15), date(2030, 1, 15), Frequency::SemiAnnual);
        let schedule = Schedule::from_config(&config).unwrap();
        assert_eq!(schedule.len(), 10);
        for period in schedule.periods() {
            assert_eq!(period.accrual_fraction(), dec!(1));
            assert!(!period.is_stub);
        }
    }

    #[test]
    fn test_contiguous_periods() {
        let config =
            ScheduleConfig::new(date(2024, 1, 15), date(2034, 1, 15), Frequency::Quarterly);
        let schedule = Schedule::from_config(&config).unwrap();
        for pair in schedule.periods().windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_short_segment_single_stub() {
        let config = unadjusted(date(2025, 1, 15), date(2025, 3, 1), Frequency::SemiAnnual);
        let schedule = Schedule::from_config(&config).unwrap();
        assert_eq!(schedule.len(), 1);
        let period = &schedule.periods()[0];
        assert!(period.is_stub);
        assert_eq!(period.end, date(2025, 3, 1));
        // 30/360: 46 days of accrual
        assert_eq!(period.year_fraction, dec!(46) / dec!(360));
    }

    #[test]
    fn test_end_within_tolerance_is_snapped() {
        // Three days short of the regular roll under 30/360.
        let config = unadjusted(date(2025, 1, 15), date(2027, 1, 12), Frequency::SemiAnnual);
        let schedule = Schedule::from_config(&config).unwrap();
        assert_eq!(schedule.len(), 4);
        assert_eq!(schedule.end_date(), Some(date(2027, 1, 12)));
    }

    #[test]
    fn test_off_grid_rejected() {
        let config = unadjusted(date(2025, 1, 15), date(2027, 3, 1), Frequency::SemiAnnual);
        let result = Schedule::from_config(&config);
        assert!(matches!(result, Err(BondError::Configuration { .. })));
    }

    #[test]
    fn test_act_tolerance_is_wider() {
        let config = unadjusted(date(2025, 1, 15), date(2027, 1, 19), Frequency::SemiAnnual);
        assert!(Schedule::from_config(&config).is_err());
        let act = config.with_day_count(DayCountConvention::Act360);
        assert_eq!(Schedule::from_config(&act).unwrap().len(), 4);
    }

    #[test]
    fn test_month_end_does_not_drift() {
        let config = unadjusted(date(2024, 8, 31), date(2025, 8, 31), Frequency::Quarterly);
        let schedule = Schedule::from_config(&config).unwrap();
        let ends: Vec<Date> = schedule.periods().iter().map(|p| p.end).collect();
        assert_eq!(
            ends,
            vec![date(2024, 11, 30), date(2025, 2, 28), date(2025, 5, 31), date(2025, 8, 31)]
        );
    }

    #[test]
    fn test_boundaries_adjusted() {
        // 2024-09-15 is a Sunday and 2025-03-15 a Saturday.
        let config =
            ScheduleConfig::new(date(2024, 9, 15), date(2025, 9, 15), Frequency::SemiAnnual);
        let schedule = Schedule::from_config(&config).unwrap();
        assert_eq!(schedule.periods()[0].end, date(2025, 3, 17));
        assert_eq!(schedule.periods()[1].start, date(2025, 3, 17));
    }

    #[test]
    fn test_period_containing() {
        let config = unadjusted(date(2025, 1, 15), date(2026, 1, 15), Frequency::SemiAnnual);
        let schedule = Schedule::from_config(&config).unwrap();
        let period = schedule.period_containing(date(2025, 8, 1)).unwrap();
        assert_eq!(period.start, date(2025, 7, 15));
        assert!(schedule.period_containing(date(2026, 1, 15)).is_none());
    }
}

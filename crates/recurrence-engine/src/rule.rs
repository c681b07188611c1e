//! The recurrence rule value and its validation.
//!
//! A [`RecurrenceRule`] can only be obtained through [`RuleBuilder::build`] (or
//! deserialization, which goes through the builder), so every rule the engine
//! sees has passed validation. Rules are immutable once built.

use crate::codec;
use crate::enumerator::{self, Occurrences};
use crate::engine;
use crate::error::{RecurrenceError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Largest ordinal a monthly weekday selector may ask for (the 5th / 5th-to-last).
const MAX_WEEKDAY_OFFSET: u32 = 5;

/// Largest magnitude of a day-of-month selector.
const MAX_MONTH_DAY: u32 = 31;

/// How often a rule repeats. Daily and yearly recurrence are not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
}

impl Frequency {
    /// Nominal length in days of `interval` periods. Months count as 29 days,
    /// which is short for most months but is only used to bound `duration`.
    pub fn period_days(self, interval: u32) -> u64 {
        let days_per_period = match self {
            Frequency::Weekly => 7,
            Frequency::Monthly => 29,
        };
        days_per_period * u64::from(interval)
    }
}

/// One BYDAY entry: the `offset`-th `weekday` (within a month for monthly
/// rules; weekly rules ignore the offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DaySelector {
    pub offset: i32,
    pub weekday: Weekday,
}

impl DaySelector {
    pub fn new(offset: i32, weekday: Weekday) -> Self {
        Self { offset, weekday }
    }

    /// A bare weekday (offset 1), as used by weekly rules.
    pub fn every(weekday: Weekday) -> Self {
        Self::new(1, weekday)
    }

    /// Weekday index, Sunday = 0.
    pub fn weekday_index(&self) -> u32 {
        self.weekday.num_days_from_sunday()
    }
}

/// A validated weekly or monthly recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleRecord", into = "RuleRecord")]
pub struct RecurrenceRule {
    frequency: Frequency,
    interval: u32,
    by_day: Vec<DaySelector>,
    by_month_day: Vec<i32>,
    week_start: Weekday,
    duration: u32,
    event_start: DateTime<FixedOffset>,
}

impl RecurrenceRule {
    pub fn builder() -> RuleBuilder {
        RuleBuilder::default()
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Weekday selectors; empty when the rule selects by day of month.
    pub fn by_day(&self) -> &[DaySelector] {
        &self.by_day
    }

    /// Day-of-month selectors; empty when unset.
    pub fn by_month_day(&self) -> &[i32] {
        &self.by_month_day
    }

    /// Carried for interchange; weeks are always grouped Sunday-first.
    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// Days each occurrence spans after its start date.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn event_start(&self) -> DateTime<FixedOffset> {
        self.event_start
    }

    /// Calendar date on which the rule takes effect.
    pub fn anchor_start(&self) -> NaiveDate {
        self.event_start.date_naive()
    }

    /// The anchor's UTC offset, carried through to occurrence instants.
    pub fn zone(&self) -> FixedOffset {
        *self.event_start.offset()
    }

    /// Nominal length of one repeat period in days.
    pub fn frequency_length(&self) -> u64 {
        self.frequency.period_days(self.interval)
    }

    /// The first occurrence on or after `after_date`, searching from the
    /// rule's anchor.
    ///
    /// # Errors
    /// Propagates date-construction failures from the engine.
    pub fn next_event_after(&self, after_date: NaiveDate) -> Result<NaiveDate> {
        engine::next_event_after(self, after_date, self.anchor_start())
    }

    /// All occurrences whose start date falls in `[date_start, date_end]`.
    pub fn events_between(&self, date_start: NaiveDate, date_end: NaiveDate) -> Occurrences<'_> {
        enumerator::events_between(self, date_start, date_end, self.anchor_start())
    }
}

/// Builder for [`RecurrenceRule`]; [`build`](RuleBuilder::build) validates.
#[derive(Debug, Clone, Default)]
pub struct RuleBuilder {
    frequency: Option<Frequency>,
    interval: Option<u32>,
    by_day: Vec<DaySelector>,
    by_month_day: Vec<i32>,
    week_start: Option<Weekday>,
    duration: u32,
    event_start: Option<DateTime<FixedOffset>>,
}

impl RuleBuilder {
    #[must_use]
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    #[must_use]
    pub fn interval(mut self, interval: u32) -> Self {
        self.interval = Some(interval);
        self
    }

    #[must_use]
    pub fn by_day(mut self, selectors: impl IntoIterator<Item = DaySelector>) -> Self {
        self.by_day = selectors.into_iter().collect();
        self
    }

    /// Shorthand for `by_day` with bare weekdays.
    #[must_use]
    pub fn weekdays(self, weekdays: impl IntoIterator<Item = Weekday>) -> Self {
        self.by_day(weekdays.into_iter().map(DaySelector::every))
    }

    #[must_use]
    pub fn by_month_day(mut self, days: impl IntoIterator<Item = i32>) -> Self {
        self.by_month_day = days.into_iter().collect();
        self
    }

    #[must_use]
    pub fn week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = Some(week_start);
        self
    }

    #[must_use]
    pub fn duration(mut self, days: u32) -> Self {
        self.duration = days;
        self
    }

    #[must_use]
    pub fn event_start(mut self, event_start: DateTime<FixedOffset>) -> Self {
        self.event_start = Some(event_start);
        self
    }

    /// Anchor the rule at midnight UTC on `date`.
    #[must_use]
    pub fn starting_on(self, date: NaiveDate) -> Self {
        let midnight = date.and_time(NaiveTime::MIN).and_utc().fixed_offset();
        self.event_start(midnight)
    }

    /// Validate and build the rule.
    ///
    /// # Errors
    /// Returns `RecurrenceError::InvalidRule` when the frequency or anchor is
    /// missing, the interval is zero, the duration is longer than one period,
    /// the frequency has no usable day selector, or a selector is out of range.
    pub fn build(self) -> Result<RecurrenceRule> {
        let frequency = self
            .frequency
            .ok_or_else(|| invalid_rule("frequency is required"))?;
        let event_start = self
            .event_start
            .ok_or_else(|| invalid_rule("event_start is required"))?;

        let interval = self.interval.unwrap_or(1);
        if interval == 0 {
            return Err(invalid_rule("interval must be at least 1"));
        }

        let period = frequency.period_days(interval);
        if u64::from(self.duration) > period {
            return Err(invalid_rule(&format!(
                "duration of {} days exceeds the {} day period",
                self.duration, period
            )));
        }

        match frequency {
            Frequency::Weekly if self.by_day.is_empty() => {
                return Err(invalid_rule("weekly rules need at least one weekday"));
            }
            Frequency::Monthly if self.by_day.is_empty() && self.by_month_day.is_empty() => {
                return Err(invalid_rule(
                    "monthly rules need weekdays or days of the month",
                ));
            }
            _ => {}
        }

        if frequency == Frequency::Monthly {
            if let Some(bad) = self
                .by_day
                .iter()
                .find(|s| s.offset == 0 || s.offset.unsigned_abs() > MAX_WEEKDAY_OFFSET)
            {
                return Err(invalid_rule(&format!(
                    "weekday offset {} is outside ±1..={}",
                    bad.offset, MAX_WEEKDAY_OFFSET
                )));
            }
            if interval > 1 {
                tracing::warn!(
                    interval,
                    "monthly rules advance one month at a time; interval only bounds duration"
                );
            }
            if !self.by_day.is_empty() && !self.by_month_day.is_empty() {
                tracing::debug!("monthly rule has both selectors; by_day takes precedence");
            }
        }

        if let Some(bad) = self
            .by_month_day
            .iter()
            .find(|&&d| d == 0 || d.unsigned_abs() > MAX_MONTH_DAY)
        {
            return Err(invalid_rule(&format!(
                "day of month {} is outside ±1..={}",
                bad, MAX_MONTH_DAY
            )));
        }

        Ok(RecurrenceRule {
            frequency,
            interval,
            by_day: self.by_day,
            by_month_day: self.by_month_day,
            week_start: self.week_start.unwrap_or(Weekday::Mon),
            duration: self.duration,
            event_start,
        })
    }
}

fn invalid_rule(message: &str) -> RecurrenceError {
    RecurrenceError::InvalidRule(message.to_string())
}

// ---------------------------------------------------------------------------
// Interchange form: day selectors as compact tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RuleRecord {
    freq: Frequency,
    #[serde(default = "default_interval")]
    interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    by_day: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    by_month_day: Option<String>,
    #[serde(default = "default_week_start")]
    wkst: String,
    #[serde(default)]
    duration: u32,
    event_start: DateTime<FixedOffset>,
}

fn default_interval() -> u32 {
    1
}

fn default_week_start() -> String {
    codec::weekday_token(Weekday::Mon).to_string()
}

impl From<RecurrenceRule> for RuleRecord {
    fn from(rule: RecurrenceRule) -> Self {
        let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };
        Self {
            freq: rule.frequency,
            interval: rule.interval,
            by_day: non_empty(codec::encode_selectors(&rule.by_day)),
            by_month_day: non_empty(codec::encode_by_month_day(&rule.by_month_day)),
            wkst: codec::weekday_token(rule.week_start).to_string(),
            duration: rule.duration,
            event_start: rule.event_start,
        }
    }
}

impl TryFrom<RuleRecord> for RecurrenceRule {
    type Error = RecurrenceError;

    fn try_from(record: RuleRecord) -> Result<Self> {
        let by_day = match record.by_day.as_deref() {
            Some(tokens) => codec::decode_by_day(tokens)?,
            None => Vec::new(),
        };
        let by_month_day = match record.by_month_day.as_deref() {
            Some(tokens) => codec::decode_by_month_day(tokens)?,
            None => Vec::new(),
        };
        let week_start = codec::parse_weekday_token(&record.wkst)
            .ok_or_else(|| RecurrenceError::InvalidToken(record.wkst.clone()))?;

        RecurrenceRule::builder()
            .frequency(record.freq)
            .interval(record.interval)
            .by_day(by_day)
            .by_month_day(by_month_day)
            .week_start(week_start)
            .duration(record.duration)
            .event_start(record.event_start)
            .build()
    }
}

impl std::fmt::Display for RecurrenceRule {
    /// Renders the rule in RRULE-like form, e.g. `FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let freq = match self.frequency {
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
        };
        write!(f, "FREQ={};INTERVAL={}", freq, self.interval)?;
        if !self.by_day.is_empty() {
            write!(
                f,
                ";BYDAY={}",
                codec::encode_selectors(&self.by_day).to_ascii_uppercase()
            )?;
        }
        if !self.by_month_day.is_empty() {
            write!(
                f,
                ";BYMONTHDAY={}",
                codec::encode_by_month_day(&self.by_month_day)
            )?;
        }
        write!(
            f,
            ";WKST={};DURATION={}D;DTSTART={}",
            codec::weekday_token(self.week_start).to_ascii_uppercase(),
            self.duration,
            self.event_start.to_rfc3339()
        )
    }
}

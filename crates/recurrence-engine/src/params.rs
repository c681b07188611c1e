//! Build a [`RecurrenceRule`] from loosely typed parameters, such as those
//! submitted by a form or stored in a JSON rule file.
//!
//! Day lists pass through the token codec on the way in, so an unrecognized
//! weekday name or a zero day of the month is dropped here rather than
//! rejected.

use crate::codec;
use crate::error::{RecurrenceError, Result};
use crate::rule::{Frequency, RecurrenceRule};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Raw rule parameters. Every field is optional; [`into_rule`](Self::into_rule)
/// decides what is required.
///
/// ```json
/// {
///   "freq": "weekly",
///   "interval": 2,
///   "days_of_week": ["Mo", "We", "Fr"],
///   "duration": 1,
///   "event_start": "2013-01-07",
///   "timezone": "America/New_York"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleParams {
    /// `"weekly"` or `"monthly"`, case-insensitive.
    pub freq: Option<String>,
    pub interval: Option<u32>,
    /// Two-letter weekday names, e.g. `["Mo", "We"]`.
    pub days_of_week: Option<Vec<String>>,
    /// Offset shared by every weekday, e.g. `2` for "second Monday".
    pub days_of_week_offset: Option<i32>,
    pub days_of_month: Option<Vec<i32>>,
    pub duration: Option<u32>,
    /// RFC 3339 date-time, or a plain `YYYY-MM-DD` date anchored at midnight.
    pub event_start: Option<String>,
    /// IANA zone used to resolve the offset of a plain `event_start` date.
    pub timezone: Option<String>,
}

impl ScheduleParams {
    /// Parse parameters from a JSON document.
    ///
    /// # Errors
    /// Returns `RecurrenceError::JsonParse` for malformed JSON or mistyped fields.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Shape the parameters into a validated rule.
    ///
    /// # Errors
    /// Returns `RecurrenceError::InvalidRule` for a daily frequency, an
    /// unparseable `event_start`, or a rule that fails validation, and
    /// `RecurrenceError::InvalidTimezone` for an unknown zone name.
    pub fn into_rule(self) -> Result<RecurrenceRule> {
        let mut builder = RecurrenceRule::builder();

        if let Some(frequency) = self.freq.as_deref().map(parse_frequency).transpose()?.flatten() {
            builder = builder.frequency(frequency);
        }
        if let Some(interval) = self.interval {
            builder = builder.interval(interval);
        }
        if let Some(names) = &self.days_of_week {
            let tokens = codec::encode_by_day(names, self.days_of_week_offset);
            builder = builder.by_day(codec::decode_by_day(&tokens)?);
        }
        if let Some(days) = &self.days_of_month {
            let tokens = codec::encode_by_month_day(days);
            builder = builder.by_month_day(codec::decode_by_month_day(&tokens)?);
        }
        if let Some(duration) = self.duration {
            builder = builder.duration(duration);
        }
        if let Some(raw) = self.event_start.as_deref() {
            builder = builder.event_start(parse_event_start(raw, self.timezone.as_deref())?);
        }

        builder.build()
    }
}

fn parse_frequency(raw: &str) -> Result<Option<Frequency>> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "weekly" => Ok(Some(Frequency::Weekly)),
        "monthly" => Ok(Some(Frequency::Monthly)),
        "daily" => Err(RecurrenceError::InvalidRule(
            "daily frequency is not supported".to_string(),
        )),
        _ => {
            tracing::warn!(freq = raw, "ignoring unrecognized frequency");
            Ok(None)
        }
    }
}

fn parse_event_start(raw: &str, timezone: Option<&str>) -> Result<DateTime<FixedOffset>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant);
    }

    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
        RecurrenceError::InvalidRule(format!("event_start '{}' is not a date: {}", raw, e))
    })?;
    let midnight = date.and_time(NaiveTime::MIN);

    let offset = match timezone {
        None => Utc.fix(),
        Some(name) => {
            let tz: chrono_tz::Tz = name
                .parse()
                .map_err(|_| RecurrenceError::InvalidTimezone(name.to_string()))?;
            // Local midnight can fall in a DST gap; the offset in effect at
            // UTC midnight stands in for it then.
            tz.from_local_datetime(&midnight)
                .earliest()
                .map(|local| local.offset().fix())
                .unwrap_or_else(|| tz.offset_from_utc_datetime(&midnight).fix())
        }
    };

    midnight
        .and_local_timezone(offset)
        .single()
        .ok_or(RecurrenceError::DateOutOfRange { date, days: 0 })
}

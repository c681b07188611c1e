//! Error types for recurrence-engine operations.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecurrenceError {
    /// The rule failed validation, or an operation does not apply to its frequency.
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    /// A calendar date was requested with an out-of-range month or day.
    #[error("Invalid date: year {year}, month {month}, day {day}")]
    InvalidDate { year: i32, month: u32, day: i32 },

    /// Day arithmetic ran past the representable calendar.
    #[error("Date out of range: {date} shifted by {days} days")]
    DateOutOfRange { date: NaiveDate, days: i64 },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A compact day token could not be decoded.
    #[error("Invalid day token: {0}")]
    InvalidToken(String),

    /// The rule parameters were not valid JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A bounded search stopped without finding a matching date.
    #[error("No occurrence found after scanning {0} periods")]
    SearchExhausted(u32),
}

pub type Result<T> = std::result::Result<T, RecurrenceError>;

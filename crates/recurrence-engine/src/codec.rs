//! Compact day-token codec.
//!
//! Day selectors are stored as comma-joined tokens in the style of the
//! iCalendar BYDAY / BYMONTHDAY parts, lowercased:
//!
//! - `"mo,we,fr"` -- bare weekdays, implicit offset 1
//! - `"2tu"` -- second Tuesday of the month
//! - `"-1fr,10sa"` -- last Friday, and a multi-digit offset
//! - `"1,15,-1"` -- days of the month, negative counting from the end

use crate::error::{RecurrenceError, Result};
use crate::rule::DaySelector;
use chrono::Weekday;

/// Two-letter token for a weekday (`Weekday::Mon` → `"mo"`).
pub fn weekday_token(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "su",
        Weekday::Mon => "mo",
        Weekday::Tue => "tu",
        Weekday::Wed => "we",
        Weekday::Thu => "th",
        Weekday::Fri => "fr",
        Weekday::Sat => "sa",
    }
}

/// Parse a two-letter weekday token, case-insensitively.
pub fn parse_weekday_token(token: &str) -> Option<Weekday> {
    match token.trim().to_ascii_lowercase().as_str() {
        "su" => Some(Weekday::Sun),
        "mo" => Some(Weekday::Mon),
        "tu" => Some(Weekday::Tue),
        "we" => Some(Weekday::Wed),
        "th" => Some(Weekday::Thu),
        "fr" => Some(Weekday::Fri),
        "sa" => Some(Weekday::Sat),
        _ => None,
    }
}

/// Encode weekday names (e.g. `["Mo", "We", "Fr"]`) with an optional shared
/// offset into a token string (e.g. `"2mo,2we,2fr"`).
///
/// Unrecognized names are dropped.
pub fn encode_by_day<S: AsRef<str>>(names: &[S], offset: Option<i32>) -> String {
    let prefix = offset.map(|o| o.to_string()).unwrap_or_default();
    names
        .iter()
        .filter_map(|name| parse_weekday_token(name.as_ref()))
        .map(|weekday| format!("{}{}", prefix, weekday_token(weekday)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Encode days of the month into a token string. Zero is never a valid
/// month-day and is dropped.
pub fn encode_by_month_day(days: &[i32]) -> String {
    days.iter()
        .filter(|&&day| day != 0)
        .map(|day| day.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Encode structured selectors back into tokens. Offset 1 is written as a
/// bare weekday.
pub fn encode_selectors(selectors: &[DaySelector]) -> String {
    selectors
        .iter()
        .map(|s| {
            if s.offset == 1 {
                weekday_token(s.weekday).to_string()
            } else {
                format!("{}{}", s.offset, weekday_token(s.weekday))
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Decode a BYDAY-style token string into selectors.
///
/// Each token is two characters (bare weekday), three characters (one-digit
/// offset + weekday) or longer (multi-digit or signed offset + weekday). The
/// weekday is always the last two characters. Empty tokens are skipped.
///
/// # Errors
/// Returns `RecurrenceError::InvalidToken` for an unknown weekday or an
/// unparseable offset.
pub fn decode_by_day(tokens: &str) -> Result<Vec<DaySelector>> {
    tokens
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(decode_day_token)
        .collect()
}

fn decode_day_token(token: &str) -> Result<DaySelector> {
    let invalid = || RecurrenceError::InvalidToken(token.to_string());

    if !token.is_ascii() || token.len() < 2 {
        return Err(invalid());
    }
    let (head, tail) = token.split_at(token.len() - 2);
    let weekday = parse_weekday_token(tail).ok_or_else(invalid)?;

    let offset = match head.len() {
        0 => 1,
        1 => head
            .chars()
            .next()
            .and_then(|c| c.to_digit(10))
            .and_then(|d| i32::try_from(d).ok())
            .ok_or_else(invalid)?,
        _ => head.parse::<i32>().map_err(|_| invalid())?,
    };

    Ok(DaySelector { offset, weekday })
}

/// Decode a BYMONTHDAY-style token string (`"1,15,-1"`).
///
/// # Errors
/// Returns `RecurrenceError::InvalidToken` for a non-integer entry.
pub fn decode_by_month_day(tokens: &str) -> Result<Vec<i32>> {
    tokens
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<i32>()
                .map_err(|_| RecurrenceError::InvalidToken(token.to_string()))
        })
        .collect()
}

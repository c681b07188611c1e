//! Pure calendar arithmetic used by the occurrence engine.
//!
//! Weekdays are indexed Sunday = 0 through Saturday = 6 throughout the crate,
//! and weeks are Sunday-based. All day arithmetic is checked: stepping past the
//! representable calendar is an error, never a panic.

use crate::error::{RecurrenceError, Result};
use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveTime, Weekday};

/// Weekday index of a date, Sunday = 0 … Saturday = 6.
pub fn weekday_of(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// Number of days in `month` (1-based) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Build a calendar date, normalizing month overflow.
///
/// Months past 12 roll into the following years (month 13 is January of
/// `year + 1`). A negative `day` counts back from the end of the month, so
/// `-1` is the last day.
///
/// # Errors
/// Returns `RecurrenceError::InvalidDate` for month 0, day 0, or a day whose
/// magnitude exceeds the length of the month.
pub fn make_date(year: i32, month: u32, day: i32) -> Result<NaiveDate> {
    let invalid = || RecurrenceError::InvalidDate { year, month, day };

    if month == 0 {
        return Err(invalid());
    }
    let years_over = i32::try_from((month - 1) / 12).map_err(|_| invalid())?;
    let norm_year = year.checked_add(years_over).ok_or_else(invalid)?;
    let norm_month = (month - 1) % 12 + 1;

    let length = days_in_month(norm_year, norm_month);
    let magnitude = day.unsigned_abs();
    if magnitude == 0 || magnitude > length {
        return Err(invalid());
    }
    let day_of_month = if day > 0 {
        magnitude
    } else {
        length - magnitude + 1
    };

    NaiveDate::from_ymd_opt(norm_year, norm_month, day_of_month).ok_or_else(invalid)
}

/// Move `date` by `days` (negative moves backwards).
///
/// # Errors
/// Returns `RecurrenceError::DateOutOfRange` when the result is not representable.
pub fn shift_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    let magnitude = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    };
    shifted.ok_or(RecurrenceError::DateOutOfRange { date, days })
}

/// The first day of the month after `date`'s month.
pub fn first_of_next_month(date: NaiveDate) -> Result<NaiveDate> {
    make_date(date.year(), date.month() + 1, 1)
}

/// The Sunday on or before `date`.
pub fn week_start_of(date: NaiveDate) -> Result<NaiveDate> {
    shift_days(date, -i64::from(weekday_of(date)))
}

/// Attach the opaque zone token to a calendar date at midnight.
pub fn at_midnight(date: NaiveDate, zone: FixedOffset) -> Result<DateTime<FixedOffset>> {
    date.and_time(NaiveTime::MIN)
        .and_local_timezone(zone)
        .single()
        .ok_or(RecurrenceError::DateOutOfRange { date, days: 0 })
}

/// Signed number of days from `weekday_of(from)` to `weekday`, within the
/// same Sunday-based week.
pub(crate) fn weekday_delta(from: NaiveDate, weekday: Weekday) -> i64 {
    i64::from(weekday.num_days_from_sunday()) - i64::from(weekday_of(from))
}

/// The `offset`-th `weekday` of a month.
///
/// A positive `offset` counts from the start of the month (1 = first), a
/// negative one from the end (-1 = last). When the requested ordinal does not
/// exist in the month (a 5th Friday in a month with four), the result is
/// clamped to the last occurrence for positive offsets and to the first
/// occurrence for negative offsets.
///
/// # Errors
/// Returns `RecurrenceError::InvalidRule` for an offset of zero, and
/// `RecurrenceError::InvalidDate` for an invalid month.
pub fn nth_weekday_in_month(
    year: i32,
    month: u32,
    offset: i32,
    weekday: Weekday,
) -> Result<NaiveDate> {
    if offset == 0 {
        return Err(RecurrenceError::InvalidRule(
            "weekday offset must be non-zero".to_string(),
        ));
    }

    let first = make_date(year, month, 1)?;
    let last = make_date(year, month, -1)?;
    let days_forward = weekday_delta(first, weekday).rem_euclid(7);
    let days_back = (-weekday_delta(last, weekday)).rem_euclid(7);
    let first_match = shift_days(first, days_forward)?;
    let last_match = shift_days(last, -days_back)?;

    // Any ordinal past the 5th lands outside the month; capping keeps the
    // arithmetic small.
    let weeks = i64::from(offset.unsigned_abs().min(6)) - 1;
    let candidate = if offset > 0 {
        shift_days(first_match, 7 * weeks)?
    } else {
        shift_days(last_match, -7 * weeks)?
    };

    if (candidate.year(), candidate.month()) == (first.year(), first.month()) {
        Ok(candidate)
    } else if offset > 0 {
        Ok(last_match)
    } else {
        Ok(first_match)
    }
}

//! The occurrence engine -- finds the next date a rule fires on.
//!
//! Three pieces of calendar math interact here: weekday arithmetic within a
//! Sunday-based week, month-relative day arithmetic (including offsets counted
//! from the end of the month), and interval grouping for weekly rules.
//!
//! All functions are pure and read the rule without mutating it. Searches
//! that roll forward (month by month, or group by group) are bounded loops;
//! validated rules always match well inside the bounds.

use crate::calendar::{
    first_of_next_month, make_date, nth_weekday_in_month, shift_days, week_start_of, weekday_delta,
    weekday_of,
};
use crate::error::{RecurrenceError, Result};
use crate::rule::{DaySelector, Frequency, RecurrenceRule};
use chrono::{Datelike, NaiveDate};

/// Months a monthly search may roll forward before giving up.
pub const MAX_MONTHS_SCANNED: u32 = 48;

/// Group jumps a weekly search may take before giving up.
pub const MAX_GROUP_HOPS: u32 = 8;

/// Find the next date at or after `start` that matches the rule's day
/// selection, ignoring the interval.
///
/// Without `continue_search` only the current period (the Sunday-based week,
/// or the calendar month) is searched and `None` means "no match left in this
/// period". With `continue_search` the search rolls into following periods.
///
/// When several selectors match, the chronologically earliest date wins,
/// regardless of the order the selectors are listed in.
///
/// # Errors
/// Returns `RecurrenceError::SearchExhausted` if a monthly search rolls past
/// [`MAX_MONTHS_SCANNED`] months, and propagates date-construction failures.
pub fn next_occurrence(
    rule: &RecurrenceRule,
    start: NaiveDate,
    continue_search: bool,
) -> Result<Option<NaiveDate>> {
    match rule.frequency() {
        Frequency::Weekly => next_weekly(rule, start, continue_search),
        Frequency::Monthly if !rule.by_day().is_empty() => {
            next_monthly_by_day(rule, start, continue_search)
        }
        Frequency::Monthly => next_monthly_by_month_day(rule, start, continue_search),
    }
}

fn next_weekly(
    rule: &RecurrenceRule,
    start: NaiveDate,
    continue_search: bool,
) -> Result<Option<NaiveDate>> {
    let wday = weekday_of(start);

    // Day-of-week ordering: Sunday (0) sorts before Monday (1) even though a
    // Sunday probe comes after Saturday in the previous week.
    let later_this_week = rule
        .by_day()
        .iter()
        .map(DaySelector::weekday_index)
        .filter(|&day| day >= wday)
        .min();

    let (base, target) = match later_this_week {
        Some(day) => (start, day),
        None if continue_search => match first_day(rule) {
            Some(index) => (shift_days(start, 7)?, rule.by_day()[index].weekday_index()),
            None => return Ok(None),
        },
        None => return Ok(None),
    };

    shift_days(base, i64::from(target) - i64::from(wday)).map(Some)
}

fn next_monthly_by_day(
    rule: &RecurrenceRule,
    start: NaiveDate,
    continue_search: bool,
) -> Result<Option<NaiveDate>> {
    let mut probe = start;
    for _ in 0..MAX_MONTHS_SCANNED {
        let mut earliest: Option<NaiveDate> = None;
        for selector in rule.by_day() {
            let date = nth_weekday_in_month(
                probe.year(),
                probe.month(),
                selector.offset,
                selector.weekday,
            )?;
            if date >= probe && earliest.is_none_or(|e| date < e) {
                earliest = Some(date);
            }
        }

        if earliest.is_some() || !continue_search {
            return Ok(earliest);
        }
        probe = first_of_next_month(probe)?;
        tracing::trace!(%probe, "no weekday left in month, rolling forward");
    }
    Err(RecurrenceError::SearchExhausted(MAX_MONTHS_SCANNED))
}

fn next_monthly_by_month_day(
    rule: &RecurrenceRule,
    start: NaiveDate,
    continue_search: bool,
) -> Result<Option<NaiveDate>> {
    let mut probe = start;
    for _ in 0..MAX_MONTHS_SCANNED {
        // Entries that do not exist in this month (31 in April, -30 in
        // February) resolve to nothing and are skipped.
        let earliest = rule
            .by_month_day()
            .iter()
            .filter_map(|&day| make_date(probe.year(), probe.month(), day).ok())
            .filter(|&date| date >= probe)
            .min();

        if earliest.is_some() || !continue_search {
            return Ok(earliest);
        }
        probe = first_of_next_month(probe)?;
        tracing::trace!(%probe, "no month day left in month, rolling forward");
    }
    Err(RecurrenceError::SearchExhausted(MAX_MONTHS_SCANNED))
}

/// Index in `by_day` of the selector with the smallest weekday (Sunday-first).
///
/// Only defined for weekly rules and monthly rules that select by weekday;
/// ties resolve to the first listed entry.
pub fn first_day(rule: &RecurrenceRule) -> Option<usize> {
    let selects_weekdays = rule.frequency() == Frequency::Weekly || !rule.by_day().is_empty();
    if !selects_weekdays {
        return None;
    }
    rule.by_day()
        .iter()
        .enumerate()
        .min_by_key(|(_, selector)| selector.weekday_index())
        .map(|(index, _)| index)
}

/// The date of the rule's earliest listed weekday in the week containing
/// `event_start`.
///
/// This marks the start of a group, not an occurrence: for a Mon/Wed/Fri rule
/// and a Friday `event_start` it returns the Monday of that week.
///
/// # Errors
/// Returns `RecurrenceError::InvalidRule` for monthly rules.
pub fn first_group(rule: &RecurrenceRule, event_start: NaiveDate) -> Result<NaiveDate> {
    require_weekly(rule, "first_group")?;
    let index = first_day(rule)
        .ok_or_else(|| RecurrenceError::InvalidRule("weekly rule has no weekdays".to_string()))?;
    let weekday = rule.by_day()[index].weekday;
    shift_days(event_start, weekday_delta(event_start, weekday))
}

/// Start of the first group at or after `after_date`, stepping from
/// `first_occurrence` in periods of `7 × interval` days.
///
/// The returned date always falls on the same weekday as `first_occurrence`.
///
/// # Errors
/// Returns `RecurrenceError::InvalidRule` for monthly rules, whose interval
/// is not applied at the group level.
pub fn next_group(
    rule: &RecurrenceRule,
    first_occurrence: NaiveDate,
    after_date: NaiveDate,
) -> Result<NaiveDate> {
    require_weekly(rule, "next_group")?;
    let period = 7 * i64::from(rule.interval());
    let diff = after_date.signed_duration_since(first_occurrence).num_days();
    let periods = diff.div_euclid(period) + i64::from(diff.rem_euclid(period) != 0);
    shift_days(first_occurrence, periods * period)
}

/// The next occurrence on or after `after_date` for a rule whose search
/// begins at `start`.
///
/// Dates before the rule's first occurrence resolve to the first occurrence.
/// Monthly rules roll forward one month at a time. Weekly rules only match
/// inside eligible weeks: those a multiple of `interval` weeks after the week
/// of the first group.
///
/// # Errors
/// Returns `RecurrenceError::SearchExhausted` if a bounded search gives up,
/// and propagates date-construction failures.
pub fn next_event_after(
    rule: &RecurrenceRule,
    after_date: NaiveDate,
    start: NaiveDate,
) -> Result<NaiveDate> {
    let first_occurrence = next_occurrence(rule, start, true)?
        .ok_or(RecurrenceError::SearchExhausted(MAX_MONTHS_SCANNED))?;
    if after_date < first_occurrence {
        return Ok(first_occurrence);
    }

    match rule.frequency() {
        // The continuing search finds a later match in the same month first.
        Frequency::Monthly => next_occurrence(rule, after_date, true)?
            .ok_or(RecurrenceError::SearchExhausted(MAX_MONTHS_SCANNED)),
        Frequency::Weekly => {
            let group_anchor = first_group(rule, first_occurrence)?;
            let mut probe = after_date;
            for _ in 0..MAX_GROUP_HOPS {
                if in_eligible_week(rule, group_anchor, probe)? {
                    if let Some(date) = next_occurrence(rule, probe, false)? {
                        return Ok(date);
                    }
                }
                probe = next_group(rule, group_anchor, probe)?;
                tracing::trace!(%probe, "jumped to next group");
            }
            Err(RecurrenceError::SearchExhausted(MAX_GROUP_HOPS))
        }
    }
}

fn in_eligible_week(rule: &RecurrenceRule, group_anchor: NaiveDate, date: NaiveDate) -> Result<bool> {
    if rule.interval() == 1 {
        return Ok(true);
    }
    let weeks = week_start_of(date)?
        .signed_duration_since(week_start_of(group_anchor)?)
        .num_days()
        / 7;
    Ok(weeks.rem_euclid(i64::from(rule.interval())) == 0)
}

fn require_weekly(rule: &RecurrenceRule, operation: &str) -> Result<()> {
    if rule.frequency() == Frequency::Weekly {
        Ok(())
    } else {
        Err(RecurrenceError::InvalidRule(format!(
            "{} is only defined for weekly rules",
            operation
        )))
    }
}

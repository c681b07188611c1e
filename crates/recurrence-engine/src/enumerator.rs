//! Enumerate the occurrences of a rule inside a date window.

use crate::calendar::{at_midnight, shift_days};
use crate::engine;
use crate::error::Result;
use crate::rule::RecurrenceRule;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;

/// A single concrete occurrence. `end_date` is `start_date` plus the rule's
/// duration in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occurrence {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Occurrence {
    /// Midnight of the start date in `zone`.
    pub fn starts_at(&self, zone: FixedOffset) -> Result<DateTime<FixedOffset>> {
        at_midnight(self.start_date, zone)
    }

    /// Midnight of the end date in `zone`.
    pub fn ends_at(&self, zone: FixedOffset) -> Result<DateTime<FixedOffset>> {
        at_midnight(self.end_date, zone)
    }
}

/// Lazy, ordered iterator over the occurrences of a rule in a window.
///
/// Yields `Err` at most once, after which it is exhausted.
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    rule: &'a RecurrenceRule,
    start: NaiveDate,
    date_end: NaiveDate,
    current: Option<NaiveDate>,
    emitted: usize,
}

impl Occurrences<'_> {
    /// Collect every occurrence, stopping at the first error.
    pub fn try_collect_vec(self) -> Result<Vec<Occurrence>> {
        self.collect()
    }

    fn step(&mut self) -> Result<Option<Occurrence>> {
        let Some(current) = self.current.filter(|c| *c <= self.date_end) else {
            return Ok(None);
        };

        let found = engine::next_event_after(self.rule, current, self.start)?;
        if found > self.date_end {
            return Ok(None);
        }

        let end_date = shift_days(found, i64::from(self.rule.duration()))?;
        // Step past the match so the next search does not find it again.
        self.current = found.succ_opt();
        Ok(Some(Occurrence {
            start_date: found,
            end_date,
        }))
    }
}

impl Iterator for Occurrences<'_> {
    type Item = Result<Occurrence>;

    fn next(&mut self) -> Option<Self::Item> {
        self.current?;
        match self.step() {
            Ok(Some(occurrence)) => {
                self.emitted += 1;
                Some(Ok(occurrence))
            }
            Ok(None) => {
                self.current = None;
                tracing::debug!(emitted = self.emitted, "enumeration finished");
                None
            }
            Err(e) => {
                self.current = None;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for Occurrences<'_> {}

/// All occurrences whose start date lies in `[date_start, date_end]`, for a
/// rule whose search begins at `start`.
///
/// The search origin is `date_start`, but nothing before the rule's first
/// occurrence (as found from `start`) is produced.
pub fn events_between<'a>(
    rule: &'a RecurrenceRule,
    date_start: NaiveDate,
    date_end: NaiveDate,
    start: NaiveDate,
) -> Occurrences<'a> {
    tracing::debug!(%rule, %date_start, %date_end, %start, "enumerating occurrences");
    Occurrences {
        rule,
        start,
        date_end,
        current: Some(date_start),
        emitted: 0,
    }
}

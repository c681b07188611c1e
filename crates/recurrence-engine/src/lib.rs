//! # recurrence-engine
//!
//! Expands weekly and monthly recurrence rules into concrete calendar dates.
//!
//! Rules follow the shape of an iCalendar RRULE ("every other week on
//! Mon/Wed/Fri", "monthly on the 2nd-to-last day", "monthly on the first
//! Tuesday") with the event length given as a whole number of days.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::{NaiveDate, Weekday};
//! use recurrence_engine::{Frequency, RecurrenceRule};
//!
//! let rule = RecurrenceRule::builder()
//!     .frequency(Frequency::Weekly)
//!     .weekdays([Weekday::Mon, Weekday::Wed, Weekday::Fri])
//!     .starting_on(NaiveDate::from_ymd_opt(2013, 1, 7).unwrap())
//!     .build()
//!     .unwrap();
//!
//! let starts: Vec<NaiveDate> = rule
//!     .events_between(
//!         NaiveDate::from_ymd_opt(2013, 1, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2013, 1, 15).unwrap(),
//!     )
//!     .map(|o| o.unwrap().start_date)
//!     .collect();
//! assert_eq!(starts.len(), 4); // Jan 7, 9, 11, 14
//! ```
//!
//! ## Modules
//!
//! - [`calendar`]: weekday / month-length arithmetic, Nth weekday of a month
//! - [`codec`]: compact day tokens (`"mo,we"`, `"-1fr"`, `"1,-1"`)
//! - [`rule`]: the validated `RecurrenceRule` and its builder
//! - [`params`]: loosely typed parameters → `RecurrenceRule`
//! - [`engine`]: next occurrence, grouping, interval skipping
//! - [`enumerator`]: all occurrences inside a date window
//! - [`error`]: Error types

pub mod calendar;
pub mod codec;
pub mod engine;
pub mod enumerator;
pub mod error;
pub mod params;
pub mod rule;

pub use engine::{first_day, first_group, next_event_after, next_group, next_occurrence};
pub use enumerator::{events_between, Occurrence, Occurrences};
pub use error::RecurrenceError;
pub use params::ScheduleParams;
pub use rule::{DaySelector, Frequency, RecurrenceRule, RuleBuilder};

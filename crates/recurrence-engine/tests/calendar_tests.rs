//! Tests for calendar arithmetic: weekdays, month lengths, date construction
//! and the Nth-weekday-of-month lookup with its clamping fallback.

use chrono::{FixedOffset, NaiveDate, Weekday};
use recurrence_engine::calendar::{
    at_midnight, days_in_month, first_of_next_month, make_date, nth_weekday_in_month, shift_days,
    week_start_of, weekday_of,
};
use recurrence_engine::RecurrenceError;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ---------------------------------------------------------------------------
// weekday_of / days_in_month
// ---------------------------------------------------------------------------

#[test]
fn weekday_index_is_sunday_based() {
    assert_eq!(weekday_of(date(2013, 1, 6)), 0, "Sunday");
    assert_eq!(weekday_of(date(2013, 1, 7)), 1, "Monday");
    assert_eq!(weekday_of(date(2013, 1, 12)), 6, "Saturday");
}

#[test]
fn month_lengths_follow_gregorian_leap_rules() {
    assert_eq!(days_in_month(2013, 1), 31);
    assert_eq!(days_in_month(2013, 4), 30);
    assert_eq!(days_in_month(2013, 2), 28);
    assert_eq!(days_in_month(2012, 2), 29);
    assert_eq!(days_in_month(1900, 2), 28, "century years are not leap");
    assert_eq!(days_in_month(2000, 2), 29, "every 400th year is leap");
    assert_eq!(days_in_month(2013, 12), 31);
}

// ---------------------------------------------------------------------------
// make_date
// ---------------------------------------------------------------------------

#[test]
fn make_date_builds_plain_dates() {
    assert_eq!(make_date(2013, 1, 7).unwrap(), date(2013, 1, 7));
}

#[test]
fn make_date_rolls_month_overflow_into_next_year() {
    assert_eq!(make_date(2013, 13, 1).unwrap(), date(2014, 1, 1));
    assert_eq!(make_date(2013, 25, 15).unwrap(), date(2015, 1, 15));
}

#[test]
fn make_date_counts_negative_days_from_month_end() {
    assert_eq!(make_date(2013, 2, -1).unwrap(), date(2013, 2, 28));
    assert_eq!(make_date(2012, 2, -1).unwrap(), date(2012, 2, 29));
    assert_eq!(make_date(2013, 1, -31).unwrap(), date(2013, 1, 1));
    assert_eq!(make_date(2013, 13, -2).unwrap(), date(2014, 1, 30));
}

#[test]
fn make_date_rejects_out_of_range_days() {
    for (y, m, d) in [(2013, 2, 29), (2013, 1, 0), (2013, 4, 31), (2013, 4, -31), (2013, 0, 1)] {
        let result = make_date(y, m, d);
        assert!(
            matches!(result, Err(RecurrenceError::InvalidDate { .. })),
            "({}, {}, {}) should be invalid, got {:?}",
            y,
            m,
            d,
            result
        );
    }
}

// ---------------------------------------------------------------------------
// nth_weekday_in_month
// ---------------------------------------------------------------------------

#[test]
fn nth_weekday_from_start_of_month() {
    // January 2013 starts on a Tuesday.
    assert_eq!(
        nth_weekday_in_month(2013, 1, 1, Weekday::Tue).unwrap(),
        date(2013, 1, 1)
    );
    assert_eq!(
        nth_weekday_in_month(2013, 1, 3, Weekday::Tue).unwrap(),
        date(2013, 1, 15)
    );
    assert_eq!(
        nth_weekday_in_month(2013, 1, 1, Weekday::Mon).unwrap(),
        date(2013, 1, 7)
    );
}

#[test]
fn nth_weekday_from_end_of_month() {
    assert_eq!(
        nth_weekday_in_month(2013, 1, -1, Weekday::Thu).unwrap(),
        date(2013, 1, 31),
        "Jan 31 2013 is itself a Thursday"
    );
    assert_eq!(
        nth_weekday_in_month(2013, 1, -2, Weekday::Mon).unwrap(),
        date(2013, 1, 21)
    );
}

#[test]
fn fifth_friday_clamps_to_last_friday() {
    // February 2013 has Fridays on the 1st, 8th, 15th and 22nd only.
    assert_eq!(
        nth_weekday_in_month(2013, 2, 5, Weekday::Fri).unwrap(),
        date(2013, 2, 22)
    );
    // March 2013 does have a 5th Friday.
    assert_eq!(
        nth_weekday_in_month(2013, 3, 5, Weekday::Fri).unwrap(),
        date(2013, 3, 29)
    );
}

#[test]
fn fifth_to_last_friday_clamps_to_first_friday() {
    assert_eq!(
        nth_weekday_in_month(2013, 2, -5, Weekday::Fri).unwrap(),
        date(2013, 2, 1)
    );
}

#[test]
fn huge_ordinal_still_clamps() {
    assert_eq!(
        nth_weekday_in_month(2013, 2, 1000, Weekday::Fri).unwrap(),
        date(2013, 2, 22)
    );
    assert_eq!(
        nth_weekday_in_month(2013, 2, i32::MIN, Weekday::Fri).unwrap(),
        date(2013, 2, 1)
    );
}

#[test]
fn zero_ordinal_is_rejected() {
    assert!(matches!(
        nth_weekday_in_month(2013, 2, 0, Weekday::Fri),
        Err(RecurrenceError::InvalidRule(_))
    ));
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[test]
fn shift_days_moves_both_directions() {
    assert_eq!(shift_days(date(2013, 1, 31), 1).unwrap(), date(2013, 2, 1));
    assert_eq!(shift_days(date(2013, 1, 1), -1).unwrap(), date(2012, 12, 31));
    assert_eq!(shift_days(date(2013, 1, 1), 0).unwrap(), date(2013, 1, 1));
}

#[test]
fn shift_days_past_calendar_end_is_an_error() {
    assert!(matches!(
        shift_days(NaiveDate::MAX, 1),
        Err(RecurrenceError::DateOutOfRange { .. })
    ));
    assert!(matches!(
        shift_days(NaiveDate::MIN, -1),
        Err(RecurrenceError::DateOutOfRange { .. })
    ));
}

#[test]
fn first_of_next_month_rolls_the_year() {
    assert_eq!(first_of_next_month(date(2013, 12, 15)).unwrap(), date(2014, 1, 1));
    assert_eq!(first_of_next_month(date(2013, 1, 31)).unwrap(), date(2013, 2, 1));
}

#[test]
fn week_start_is_the_sunday_on_or_before() {
    assert_eq!(week_start_of(date(2013, 1, 9)).unwrap(), date(2013, 1, 6));
    assert_eq!(week_start_of(date(2013, 1, 6)).unwrap(), date(2013, 1, 6));
    assert_eq!(week_start_of(date(2013, 1, 12)).unwrap(), date(2013, 1, 6));
}

#[test]
fn at_midnight_carries_the_offset() {
    let zone = FixedOffset::west_opt(5 * 3600).unwrap();
    let instant = at_midnight(date(2013, 1, 7), zone).unwrap();
    assert_eq!(instant.to_rfc3339(), "2013-01-07T00:00:00-05:00");
}

//! Property-based tests for the occurrence engine using proptest.
//!
//! These tests verify invariants that should hold for *any* valid rule, not
//! just the hand-picked dates in `engine_tests.rs` and `enumerator_tests.rs`.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use proptest::prelude::*;
use recurrence_engine::calendar::{days_in_month, nth_weekday_in_month, week_start_of};
use recurrence_engine::{first_group, next_group, Frequency, RecurrenceRule};

// ---------------------------------------------------------------------------
// Strategies: generate valid rule components
// ---------------------------------------------------------------------------

const WEEK: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// A non-empty set of weekdays.
fn arb_weekdays() -> impl Strategy<Value = Vec<Weekday>> {
    prop::sample::subsequence(WEEK.to_vec(), 1..=7)
}

fn arb_interval() -> impl Strategy<Value = u32> {
    1u32..=4
}

/// An anchor date in the 2000-2030 range. Day is capped at 28 to avoid
/// invalid month/day combos.
fn arb_anchor() -> impl Strategy<Value = NaiveDate> {
    (2000i32..=2030, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// Days after the anchor at which a probe or window begins.
fn arb_offset_days() -> impl Strategy<Value = u64> {
    0u64..=400
}

fn arb_ordinal() -> impl Strategy<Value = i32> {
    prop_oneof![1i32..=5, -5i32..=-1]
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn weekly_rule(days: &[Weekday], interval: u32, anchor: NaiveDate) -> RecurrenceRule {
    RecurrenceRule::builder()
        .frequency(Frequency::Weekly)
        .interval(interval)
        .weekdays(days.iter().copied())
        .starting_on(anchor)
        .build()
        .expect("generated weekly rule should be valid")
}

fn after(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap()
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Property 1: Enumeration is strictly increasing, inside the window, and
// only lands on selected weekdays
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn weekly_enumeration_is_ordered_and_in_window(
        days in arb_weekdays(),
        interval in arb_interval(),
        anchor in arb_anchor(),
        offset in arb_offset_days(),
        span in 0u64..=60,
    ) {
        let rule = weekly_rule(&days, interval, anchor);
        let from = after(anchor, offset);
        let to = after(from, span);
        let occurrences = rule.events_between(from, to).try_collect_vec().unwrap();

        for window in occurrences.windows(2) {
            prop_assert!(
                window[0].start_date < window[1].start_date,
                "not strictly increasing: {} then {}",
                window[0].start_date,
                window[1].start_date
            );
        }
        for occurrence in &occurrences {
            prop_assert!(occurrence.start_date >= from && occurrence.start_date <= to);
            prop_assert!(occurrence.start_date >= anchor);
            prop_assert!(days.contains(&occurrence.start_date.weekday()));
        }
    }
}

// ---------------------------------------------------------------------------
// Property 2: next_event_after is monotone and a fixed point on its results
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn next_event_after_is_monotone(
        days in arb_weekdays(),
        interval in arb_interval(),
        anchor in arb_anchor(),
        offset in arb_offset_days(),
        gap in 0u64..=30,
    ) {
        let rule = weekly_rule(&days, interval, anchor);
        let early = after(anchor, offset);
        let late = after(early, gap);

        let first = rule.next_event_after(early).unwrap();
        let second = rule.next_event_after(late).unwrap();
        prop_assert!(first >= early);
        prop_assert!(first <= second, "{} -> {} but {} -> {}", early, first, late, second);
    }

    #[test]
    fn next_event_after_is_idempotent(
        days in arb_weekdays(),
        interval in arb_interval(),
        anchor in arb_anchor(),
        offset in arb_offset_days(),
    ) {
        let rule = weekly_rule(&days, interval, anchor);
        let found = rule.next_event_after(after(anchor, offset)).unwrap();
        prop_assert_eq!(rule.next_event_after(found).unwrap(), found);
    }
}

// ---------------------------------------------------------------------------
// Property 3: Grouping keeps the weekday and honors the interval
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn next_group_keeps_the_group_weekday(
        days in arb_weekdays(),
        interval in arb_interval(),
        anchor in arb_anchor(),
        offset in arb_offset_days(),
    ) {
        let rule = weekly_rule(&days, interval, anchor);
        let group = first_group(&rule, anchor).unwrap();
        let next = next_group(&rule, group, after(anchor, offset)).unwrap();

        prop_assert_eq!(next.weekday(), group.weekday());
        prop_assert!(next >= after(anchor, offset));
        let gap = next.signed_duration_since(group).num_days();
        prop_assert_eq!(gap % (7 * i64::from(interval)), 0);
    }

    #[test]
    fn occurrences_fall_in_eligible_weeks(
        days in arb_weekdays(),
        interval in 2u32..=4,
        anchor in arb_anchor(),
        offset in arb_offset_days(),
    ) {
        let rule = weekly_rule(&days, interval, anchor);
        let first = rule.next_event_after(anchor).unwrap();
        let base_week = week_start_of(first).unwrap();

        let from = after(anchor, offset);
        for occurrence in rule.events_between(from, after(from, 35)) {
            let start = occurrence.unwrap().start_date;
            let weeks = week_start_of(start)
                .unwrap()
                .signed_duration_since(base_week)
                .num_days()
                / 7;
            prop_assert_eq!(
                weeks % i64::from(interval),
                0,
                "{} is {} weeks after the first group",
                start,
                weeks
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Property 4: A weekly Mon/Wed/Fri rule has six occurrences in any two weeks
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn mwf_fills_every_fortnight(
        anchor in arb_anchor(),
        offset in arb_offset_days(),
    ) {
        let rule = weekly_rule(&[Weekday::Mon, Weekday::Wed, Weekday::Fri], 1, anchor);
        let from = after(anchor, offset);
        let count = rule.events_between(from, after(from, 13)).count();
        // A window opening before the first occurrence is cut short.
        if from >= rule.next_event_after(anchor).unwrap() {
            prop_assert_eq!(count, 6);
        } else {
            prop_assert!(count <= 6);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 5: Month-relative lookups stay inside the month
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn nth_weekday_is_in_month_and_on_weekday(
        year in 1990i32..=2060,
        month in 1u32..=12,
        ordinal in arb_ordinal(),
        weekday in 0usize..7,
    ) {
        let found = nth_weekday_in_month(year, month, ordinal, WEEK[weekday]).unwrap();
        prop_assert_eq!(found.year(), year);
        prop_assert_eq!(found.month(), month);
        prop_assert_eq!(found.weekday(), WEEK[weekday]);
    }

    #[test]
    fn last_day_rule_lands_on_month_ends(
        anchor_year in 2000i32..=2030,
        anchor_month in 1u32..=12,
    ) {
        let anchor = NaiveDate::from_ymd_opt(anchor_year, anchor_month, 1).unwrap();
        let rule = RecurrenceRule::builder()
            .frequency(Frequency::Monthly)
            .by_month_day([-1])
            .starting_on(anchor)
            .build()
            .unwrap();

        let occurrences = rule
            .events_between(anchor, after(anchor, 365))
            .try_collect_vec()
            .unwrap();
        prop_assert!(occurrences.len() >= 12);
        for occurrence in &occurrences {
            let d = occurrence.start_date;
            prop_assert_eq!(d.day(), days_in_month(d.year(), d.month()));
        }
    }
}

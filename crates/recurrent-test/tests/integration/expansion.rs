//! Occurrence sets: bounds, negative ordinals, EXDATE/RDATE, zones, limits.

use recurrent_rfc::error::RfcError;
use recurrent_rfc::rfc::ical::core::{RRule, Temporal};
use recurrent_rfc::rfc::ical::expand::{
    ExpansionError, ExpansionLimits, RecurrenceSet, TimeZoneResolver, Window, instant_of,
};
use recurrent_rfc::rfc::ical::parse;
use recurrent_service::series::RecurringComponent;
use recurrent_test::{fixtures, floating, local, occurrences, utc};

fn ny(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Temporal {
    Temporal::zoned(local(year, month, day, hour, minute), "America/New_York")
}

#[test_log::test]
fn count_bounds_the_series() {
    let start = floating(2024, 1, 31, 9, 0);
    for (rule, n) in [
        ("FREQ=DAILY;COUNT=1", 1),
        ("FREQ=WEEKLY;COUNT=5;BYDAY=MO,WE,FR", 5),
        ("FREQ=MONTHLY;COUNT=13", 13),
        ("FREQ=MONTHLY;COUNT=7;BYDAY=-1FR", 7),
        ("FREQ=YEARLY;COUNT=4;BYMONTH=1,6;BYMONTHDAY=31,30", 4),
        ("FREQ=HOURLY;COUNT=30;BYHOUR=9,17", 30),
    ] {
        let all = occurrences(&start, rule, 1000);
        assert_eq!(all.len(), n, "{rule}");
        assert!(
            all.windows(2).all(|pair| pair[0] < pair[1]),
            "{rule} is not strictly increasing: {all:?}"
        );
    }
}

#[test_log::test]
fn last_day_of_month_follows_month_length() {
    let start = floating(2024, 1, 31, 9, 0);
    let days: Vec<_> = occurrences(&start, "FREQ=MONTHLY;BYMONTHDAY=-1", 6)
        .iter()
        .map(|o| o.date_part().to_string())
        .collect();
    assert_eq!(
        days,
        vec![
            "2024-01-31",
            "2024-02-29",
            "2024-03-31",
            "2024-04-30",
            "2024-05-31",
            "2024-06-30",
        ]
    );

    let start = floating(2023, 1, 31, 9, 0);
    let february = occurrences(&start, "FREQ=MONTHLY;BYMONTHDAY=-1", 2);
    assert_eq!(february[1], floating(2023, 2, 28, 9, 0));
}

#[test_log::test]
fn exdates_remove_and_rdates_add_once() {
    let start = floating(2024, 1, 1, 9, 0);
    let rule: RRule = "FREQ=DAILY;COUNT=10".parse().unwrap();
    let base: Vec<_> = RecurrenceSet::new(start.clone())
        .with_rule(rule.clone())
        .unwrap()
        .iter()
        .collect();

    let exdates = [floating(2024, 1, 3, 9, 0), floating(2024, 1, 7, 9, 0)];
    let rdates = [
        floating(2024, 2, 1, 9, 0),
        floating(2024, 1, 5, 14, 0),
        floating(2024, 1, 5, 14, 0),
    ];
    let set = RecurrenceSet::new(start)
        .with_rule(rule)
        .unwrap()
        .with_exdates(&exdates)
        .unwrap()
        .with_rdates(&rdates)
        .unwrap();

    let mut expected: Vec<_> = base
        .into_iter()
        .filter(|o| !exdates.contains(o))
        .chain([floating(2024, 1, 5, 14, 0), floating(2024, 2, 1, 9, 0)])
        .collect();
    expected.sort();
    assert_eq!(set.iter().collect::<Vec<_>>(), expected);
    assert_eq!(set.iter().count(), 10);
}

#[test_log::test]
fn rdate_on_an_occurrence_is_not_repeated() {
    let start = floating(2024, 1, 1, 9, 0);
    let set = RecurrenceSet::new(start)
        .with_rule("FREQ=DAILY;COUNT=3".parse().unwrap())
        .unwrap()
        .with_rdates(&[floating(2024, 1, 2, 9, 0)])
        .unwrap();
    assert_eq!(set.iter().count(), 3);
}

#[test_log::test]
fn exdates_in_other_forms_still_match() {
    let start = ny(2024, 3, 5, 9, 0);
    let set = RecurrenceSet::new(start)
        .with_rule("FREQ=WEEKLY;COUNT=3".parse().unwrap())
        .unwrap()
        .with_exdates(&[utc(2024, 3, 12, 13, 0)])
        .unwrap();
    assert_eq!(
        set.iter().collect::<Vec<_>>(),
        vec![ny(2024, 3, 5, 9, 0), ny(2024, 3, 19, 9, 0)]
    );
}

#[test_log::test]
fn zoned_series_keeps_wall_clock_across_daylight_saving() {
    let start = ny(2024, 3, 5, 9, 0);
    let mut resolver = TimeZoneResolver::new();
    let instants: Vec<_> = occurrences(&start, "FREQ=WEEKLY;COUNT=2", 10)
        .iter()
        .map(|o| instant_of(o, &mut resolver).unwrap().naive_utc())
        .collect();
    assert_eq!(
        instants,
        vec![local(2024, 3, 5, 14, 0), local(2024, 3, 12, 13, 0)]
    );
}

#[test_log::test]
fn window_uses_half_open_bounds_in_any_form() {
    let set = RecurrenceSet::new(ny(2024, 3, 5, 9, 0))
        .with_rule("FREQ=DAILY".parse().unwrap())
        .unwrap();
    // 2024-03-07 09:00 New York is 14:00Z; 2024-03-10 09:00 is 13:00Z.
    let window = Window::new(utc(2024, 3, 7, 14, 0), utc(2024, 3, 10, 13, 0)).unwrap();
    assert_eq!(
        set.between(&window).unwrap(),
        vec![ny(2024, 3, 7, 9, 0), ny(2024, 3, 8, 9, 0), ny(2024, 3, 9, 9, 0)]
    );
}

#[test_log::test]
fn window_cap_stops_runaway_expansion() {
    let limits = ExpansionLimits {
        max_instances: 5,
        ..ExpansionLimits::default()
    };
    let set = RecurrenceSet::new(floating(2024, 1, 1, 0, 0))
        .with_rule("FREQ=MINUTELY".parse().unwrap())
        .unwrap()
        .with_limits(limits);
    let window = Window::new(floating(2024, 1, 1, 0, 0), floating(2024, 1, 2, 0, 0)).unwrap();
    assert!(matches!(
        set.between(&window),
        Err(RfcError::ExpansionError(ExpansionError::TooManyOccurrences(5)))
    ));
}

#[test_log::test]
fn impossible_rule_ends_after_empty_periods() {
    let limits = ExpansionLimits {
        max_empty_periods: 50,
        ..ExpansionLimits::default()
    };
    let set = RecurrenceSet::new(floating(2024, 2, 1, 9, 0))
        .with_rule("FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=30".parse().unwrap())
        .unwrap()
        .with_limits(limits);
    assert_eq!(set.iter().next(), None);
}

#[test_log::test]
fn fixture_instances_apply_exdate_and_override() {
    let ical = parse(fixtures::WEEKLY_NEW_YORK).unwrap();
    let series = RecurringComponent::group(&ical).unwrap();
    assert_eq!(series.len(), 1);
    let series = &series[0];
    assert_eq!(series.overrides.len(), 1);

    let window = Window::new(utc(2024, 3, 1, 0, 0), utc(2024, 5, 1, 0, 0)).unwrap();
    let instances = series
        .instances(&window, ExpansionLimits::default())
        .unwrap();

    let starts: Vec<_> = instances.iter().map(|i| i.start.clone()).collect();
    assert_eq!(
        starts,
        vec![
            ny(2024, 3, 5, 9, 0),
            ny(2024, 3, 12, 9, 0),
            ny(2024, 3, 26, 9, 0),
            ny(2024, 4, 2, 13, 0),
            ny(2024, 4, 9, 9, 0),
            ny(2024, 4, 16, 9, 0),
            ny(2024, 4, 23, 9, 0),
        ]
    );
    let moved = &instances[3];
    assert!(moved.overridden);
    assert_eq!(moved.recurrence_id, ny(2024, 4, 2, 9, 0));
    assert_eq!(moved.end, Some(ny(2024, 4, 2, 13, 30)));
    assert_eq!(instances[0].end, Some(ny(2024, 3, 5, 9, 30)));
}

#[test_log::test]
fn utc_recurrence_id_overrides_zoned_occurrence() {
    let ical = parse(fixtures::DAILY_UTC_OVERRIDE).unwrap();
    let series = RecurringComponent::group(&ical).unwrap();
    assert_eq!(series.len(), 1);
    let series = &series[0];
    assert_eq!(
        series.overrides.keys().collect::<Vec<_>>(),
        vec![&ny(2024, 1, 3, 9, 0)]
    );

    let window = Window::new(utc(2024, 1, 1, 0, 0), utc(2024, 1, 10, 0, 0)).unwrap();
    let instances = series
        .instances(&window, ExpansionLimits::default())
        .unwrap();
    let seen: Vec<_> = instances
        .iter()
        .map(|i| (i.start.clone(), i.overridden))
        .collect();
    assert_eq!(
        seen,
        vec![
            (ny(2024, 1, 2, 9, 0), false),
            (ny(2024, 1, 3, 15, 0), true),
            (ny(2024, 1, 4, 9, 0), false),
        ]
    );
    assert_eq!(instances[1].recurrence_id, ny(2024, 1, 3, 9, 0));
}

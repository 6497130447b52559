//! Rule text parses in any key order and prints in canonical order.

use recurrent_rfc::rfc::ical::core::{ByRule, RRule, RRuleBound, Weekday, WeekdayNum};
use recurrent_test::utc;

fn canonical(text: &str) -> String {
    text.parse::<RRule>()
        .unwrap_or_else(|e| panic!("{text}: {e}"))
        .to_string()
}

#[test_log::test]
fn parsed_rule_matches_constructed_rule() {
    let constructed = RRule::monthly()
        .with_interval(2)
        .unwrap()
        .with_count(10)
        .unwrap()
        .with_rule(ByRule::Day(vec![
            WeekdayNum::nth(1, Weekday::Sunday),
            WeekdayNum::nth(-1, Weekday::Sunday),
        ]))
        .unwrap();

    let text = "BYDAY=1SU,-1SU;COUNT=10;INTERVAL=2;FREQ=MONTHLY";
    assert_eq!(canonical(text), constructed.to_string());
    assert_eq!(constructed.to_string(), "FREQ=MONTHLY;INTERVAL=2;COUNT=10;BYDAY=1SU,-1SU");
}

#[test_log::test]
fn every_part_prints_in_canonical_order() {
    let text = "WKST=SU;BYSETPOS=-1;BYSECOND=0;BYMINUTE=30;BYHOUR=9;BYDAY=MO,FR;\
                BYMONTHDAY=1,-1;BYMONTH=1,7;INTERVAL=1;UNTIL=20251231T235959Z;FREQ=YEARLY";
    assert_eq!(
        canonical(text),
        "FREQ=YEARLY;UNTIL=20251231T235959Z;BYMONTH=1,7;BYMONTHDAY=1,-1;BYDAY=MO,FR;\
         BYHOUR=9;BYMINUTE=30;BYSECOND=0;BYSETPOS=-1;WKST=SU"
    );
}

#[test_log::test]
fn printing_is_a_fixed_point() {
    let rules = [
        "FREQ=DAILY;COUNT=3",
        "FREQ=WEEKLY;INTERVAL=2;BYDAY=TU,TH;WKST=SU",
        "FREQ=YEARLY;BYWEEKNO=20;BYDAY=MO",
        "FREQ=YEARLY;INTERVAL=3;BYYEARDAY=1,100,200",
        "FREQ=MINUTELY;INTERVAL=15;BYHOUR=9,10",
    ];
    for rule in rules {
        let once = canonical(rule);
        assert_eq!(canonical(&once), once);
        assert_eq!(once, rule);
    }
}

#[test_log::test]
fn until_keeps_its_form() {
    let rule: RRule = "FREQ=DAILY;UNTIL=20240131T090000Z".parse().unwrap();
    assert_eq!(
        rule.bound(),
        Some(&RRuleBound::Until(utc(2024, 1, 31, 9, 0)))
    );
}

#[test_log::test]
fn invalid_rules_are_rejected_when_parsed() {
    for text in [
        "FREQ=DAILY;COUNT=3;UNTIL=20240101T000000Z",
        "FREQ=MONTHLY;BYWEEKNO=3",
        "FREQ=WEEKLY;BYDAY=2MO",
        "FREQ=DAILY;BYYEARDAY=10",
        "FREQ=DAILY;BYSETPOS=1",
        "FREQ=DAILY;INTERVAL=0",
        "FREQ=DAILY;BYFOO=1",
        "COUNT=3",
    ] {
        assert!(text.parse::<RRule>().is_err(), "{text} should be rejected");
    }
}

//! Expansion checked against the `rrule` crate on the RFC 5545 examples.

use recurrent_rfc::rfc::ical::expand::{TimeZoneResolver, instant_of};
use recurrent_rfc::rfc::ical::parse::values::parse_temporal;
use recurrent_test::occurrences;
use rrule::RRuleSet;

struct OracleCase {
    name: &'static str,
    dtstart: &'static str,
    tzid: Option<&'static str>,
    rrule: &'static str,
    limit: u16,
    expected_len: Option<usize>,
}

const fn case(name: &'static str, dtstart: &'static str, rrule: &'static str, limit: u16) -> OracleCase {
    OracleCase {
        name,
        dtstart,
        tzid: None,
        rrule,
        limit,
        expected_len: None,
    }
}

#[expect(clippy::too_many_lines)]
fn oracle_cases() -> Vec<OracleCase> {
    vec![
        OracleCase {
            expected_len: Some(10),
            ..case("daily_count", "19970902T090000Z", "FREQ=DAILY;COUNT=10", 100)
        },
        case("daily_interval", "19970902T090000Z", "FREQ=DAILY;INTERVAL=2", 20),
        OracleCase {
            expected_len: Some(10),
            ..case(
                "weekly_until_tu_th",
                "19970902T090000Z",
                "FREQ=WEEKLY;UNTIL=19971007T000000Z;WKST=SU;BYDAY=TU,TH",
                100,
            )
        },
        case(
            "monthly_first_friday",
            "19970905T090000Z",
            "FREQ=MONTHLY;COUNT=10;BYDAY=1FR",
            100,
        ),
        case(
            "monthly_second_to_last_monday",
            "19970922T090000Z",
            "FREQ=MONTHLY;COUNT=6;BYDAY=-2MO",
            100,
        ),
        case(
            "monthly_third_to_last_day",
            "19970928T090000Z",
            "FREQ=MONTHLY;BYMONTHDAY=-3",
            12,
        ),
        case(
            "monthly_second_and_fifteenth",
            "19970902T090000Z",
            "FREQ=MONTHLY;COUNT=10;BYMONTHDAY=2,15",
            100,
        ),
        case(
            "monthly_first_and_last_sunday",
            "19970907T090000Z",
            "FREQ=MONTHLY;INTERVAL=2;COUNT=10;BYDAY=1SU,-1SU",
            100,
        ),
        case(
            "monthly_friday_thirteenth",
            "19980213T090000Z",
            "FREQ=MONTHLY;BYDAY=FR;BYMONTHDAY=13",
            5,
        ),
        case(
            "monthly_set_position_third",
            "19970904T090000Z",
            "FREQ=MONTHLY;COUNT=3;BYDAY=TU,WE,TH;BYSETPOS=3",
            100,
        ),
        case(
            "monthly_set_position_second_to_last",
            "19970929T090000Z",
            "FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-2",
            7,
        ),
        case(
            "monthly_skips_short_months",
            "20240131T090000Z",
            "FREQ=MONTHLY;COUNT=6",
            100,
        ),
        case(
            "yearly_june_and_july",
            "19970610T090000Z",
            "FREQ=YEARLY;COUNT=10;BYMONTH=6,7",
            100,
        ),
        case(
            "yearly_every_third_year_by_day_of_year",
            "19970101T090000Z",
            "FREQ=YEARLY;INTERVAL=3;COUNT=10;BYYEARDAY=1,100,200",
            100,
        ),
        case("yearly_twentieth_monday", "19970519T090000Z", "FREQ=YEARLY;BYDAY=20MO", 3),
        case(
            "yearly_monday_of_week_twenty",
            "19970512T090000Z",
            "FREQ=YEARLY;BYWEEKNO=20;BYDAY=MO",
            3,
        ),
        case(
            "yearly_leap_day",
            "20240229T090000Z",
            "FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=29",
            3,
        ),
        OracleCase {
            expected_len: Some(3),
            ..case(
                "hourly_until",
                "19970902T090000Z",
                "FREQ=HOURLY;INTERVAL=3;UNTIL=19970902T170000Z",
                100,
            )
        },
        OracleCase {
            expected_len: Some(5),
            ..case(
                "hourly_off_the_hour",
                "19970902T093000Z",
                "FREQ=HOURLY;COUNT=5",
                100,
            )
        },
        OracleCase {
            expected_len: Some(6),
            ..case(
                "hourly_by_minute",
                "19970902T090000Z",
                "FREQ=HOURLY;INTERVAL=2;BYMINUTE=15,45;COUNT=6",
                100,
            )
        },
        OracleCase {
            tzid: Some("America/New_York"),
            ..case(
                "hourly_off_the_hour_zoned",
                "20240115T224500",
                "FREQ=HOURLY;INTERVAL=4;COUNT=6",
                100,
            )
        },
        case(
            "minutely_quarter_hours",
            "19970902T090000Z",
            "FREQ=MINUTELY;INTERVAL=15;COUNT=6",
            100,
        ),
        case(
            "daily_by_hour_and_minute",
            "19970902T090000Z",
            "FREQ=DAILY;BYHOUR=9,10,11,12,13,14,15,16;BYMINUTE=0,20,40",
            50,
        ),
        OracleCase {
            tzid: Some("America/New_York"),
            expected_len: Some(93),
            ..case(
                "yearly_every_day_in_january",
                "19980101T090000",
                "FREQ=YEARLY;UNTIL=20000131T140000Z;BYMONTH=1;BYDAY=SU,MO,TU,WE,TH,FR,SA",
                200,
            )
        },
        OracleCase {
            tzid: Some("America/New_York"),
            expected_len: Some(8),
            ..case(
                "weekly_across_daylight_saving",
                "20240305T090000",
                "FREQ=WEEKLY;COUNT=8;BYDAY=TU",
                100,
            )
        },
    ]
}

fn oracle_timestamps(case: &OracleCase) -> Vec<i64> {
    let dtstart = match case.tzid {
        Some(tzid) => format!("DTSTART;TZID={tzid}:{}", case.dtstart),
        None => format!("DTSTART:{}", case.dtstart),
    };
    let set: RRuleSet = format!("{dtstart}\nRRULE:{}", case.rrule)
        .parse()
        .unwrap_or_else(|err| panic!("Oracle failed to parse {}: {}", case.name, err));
    set.all(case.limit)
        .dates
        .iter()
        .map(chrono::DateTime::timestamp)
        .collect()
}

fn recurrent_timestamps(case: &OracleCase) -> Vec<i64> {
    let start = parse_temporal(case.dtstart, None, case.tzid, 1, 0)
        .unwrap_or_else(|err| panic!("Failed to parse start of {}: {}", case.name, err));
    let mut resolver = TimeZoneResolver::new();
    occurrences(&start, case.rrule, usize::from(case.limit))
        .iter()
        .map(|o| {
            instant_of(o, &mut resolver)
                .unwrap_or_else(|err| panic!("{}: {}", case.name, err))
                .timestamp()
        })
        .collect()
}

#[test_log::test]
fn expansion_matches_oracle() {
    for case in oracle_cases() {
        let expected = oracle_timestamps(&case);
        let actual = recurrent_timestamps(&case);
        assert_eq!(actual, expected, "Case {} did not match", case.name);

        if let Some(expected_len) = case.expected_len {
            assert_eq!(
                actual.len(),
                expected_len,
                "Case {} expected {} occurrences",
                case.name,
                expected_len
            );
        }
    }
}

//! Recurrent integration test support.
//!
//! Value constructors and calendar fixtures shared by the integration tests.

use chrono::{NaiveDate, NaiveDateTime};
use recurrent_rfc::rfc::ical::core::{RRule, Temporal};
use recurrent_rfc::rfc::ical::expand::RecurrenceSet;

pub mod fixtures;

/// ## Summary
/// Wall-clock reading for the given date and time.
///
/// ## Panics
/// Panics on an impossible date or time; fixtures are expected to be valid.
#[must_use]
pub fn local(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .unwrap_or_else(|| panic!("invalid fixture time {year}-{month}-{day} {hour}:{minute}"))
}

#[must_use]
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Temporal {
    Temporal::utc(local(year, month, day, hour, minute))
}

#[must_use]
pub fn floating(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Temporal {
    Temporal::floating(local(year, month, day, hour, minute))
}

/// ## Summary
/// Parses `rule` and returns at most `limit` occurrences from `start`.
///
/// ## Panics
/// Panics if the rule does not parse or does not fit the start value.
#[must_use]
pub fn occurrences(start: &Temporal, rule: &str, limit: usize) -> Vec<Temporal> {
    let rule: RRule = rule
        .parse()
        .unwrap_or_else(|e| panic!("invalid rule {rule}: {e}"));
    RecurrenceSet::new(start.clone())
        .with_rule(rule)
        .unwrap_or_else(|e| panic!("rule rejected for {start}: {e}"))
        .iter()
        .take(limit)
        .collect()
}

//! Value type parsers for iCalendar (RFC 5545 §3.3).
#![expect(
    clippy::map_err_ignore,
    reason = "Number and chrono parse failures carry no position; the ParseError built in their place does"
)]

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{
    ByRule, ByRuleKind, DateTime, Duration, Frequency, RRule, RRuleBound, Temporal, Weekday,
    WeekdayNum,
};

/// ## Summary
/// Parses a DATE value (RFC 5545 §3.3.4), `YYYYMMDD`.
///
/// ## Errors
/// Returns an error if the string is not an 8-digit calendar date.
pub fn parse_date(s: &str, line: usize, col: usize) -> ParseResult<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::new(ParseErrorKind::InvalidDate, line, col));
    }
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidDate, line, col).with_context(s))
}

/// ## Summary
/// Parses a DATE-TIME value (RFC 5545 §3.3.5), `YYYYMMDDTHHMMSS[Z]`.
///
/// A trailing `Z` makes the value UTC and wins over `tzid`; otherwise a
/// `tzid` makes it zoned and its absence makes it floating.
///
/// ## Errors
/// Returns an error if the string is not a valid date-time.
pub fn parse_datetime(
    s: &str,
    tzid: Option<&str>,
    line: usize,
    col: usize,
) -> ParseResult<DateTime> {
    let (body, utc) = match s.strip_suffix('Z') {
        Some(body) => (body, true),
        None => (s, false),
    };
    if body.len() != 15 || body.as_bytes().get(8) != Some(&b'T') {
        return Err(ParseError::new(ParseErrorKind::InvalidDateTime, line, col).with_context(s));
    }
    let local = NaiveDateTime::parse_from_str(body, "%Y%m%dT%H%M%S")
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidDateTime, line, col).with_context(s))?;

    Ok(match (utc, tzid) {
        (true, _) => DateTime::utc(local),
        (false, Some(tzid)) => DateTime::zoned(local, tzid),
        (false, None) => DateTime::floating(local),
    })
}

/// ## Summary
/// Parses a DATE or DATE-TIME, choosing by the `VALUE` parameter when given
/// and by shape otherwise.
///
/// ## Errors
/// Returns an error if the value does not parse as the chosen type.
pub fn parse_temporal(
    s: &str,
    value_type: Option<&str>,
    tzid: Option<&str>,
    line: usize,
    col: usize,
) -> ParseResult<Temporal> {
    let is_date = match value_type {
        Some(t) => t.eq_ignore_ascii_case("DATE"),
        None => !s.contains('T'),
    };
    if is_date {
        parse_date(s, line, col).map(Temporal::Date)
    } else {
        parse_datetime(s, tzid, line, col).map(Temporal::DateTime)
    }
}

/// ## Summary
/// Parses a comma-separated DATE or DATE-TIME list (EXDATE, RDATE).
///
/// ## Errors
/// Returns an error if any entry fails to parse.
pub fn parse_temporal_list(
    s: &str,
    value_type: Option<&str>,
    tzid: Option<&str>,
    line: usize,
    col: usize,
) -> ParseResult<Vec<Temporal>> {
    s.split(',')
        .filter(|v| !v.is_empty())
        .map(|v| parse_temporal(v, value_type, tzid, line, col))
        .collect()
}

/// ## Summary
/// Parses a DURATION value (RFC 5545 §3.3.6), e.g. `P1W`, `-PT15M`, `P1DT2H`.
///
/// ## Errors
/// Returns an error on a missing `P`, an unknown designator, a number
/// without designator, or a week form mixed with other parts.
pub fn parse_duration(s: &str, line: usize, col: usize) -> ParseResult<Duration> {
    let err = || ParseError::new(ParseErrorKind::InvalidDuration, line, col).with_context(s);

    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let rest = rest.strip_prefix('P').ok_or_else(err)?;
    if rest.is_empty() {
        return Err(err());
    }

    let mut d = Duration {
        negative,
        ..Duration::zero()
    };
    let mut number = String::new();
    let mut in_time = false;
    let mut seen_any = false;
    for c in rest.chars() {
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }
        if c == 'T' {
            if in_time || !number.is_empty() {
                return Err(err());
            }
            in_time = true;
            continue;
        }
        let n: u32 = std::mem::take(&mut number).parse().map_err(|_| err())?;
        match (c, in_time) {
            ('W', false) => d.weeks = n,
            ('D', false) => d.days = n,
            ('H', true) => d.hours = n,
            ('M', true) => d.minutes = n,
            ('S', true) => d.seconds = n,
            _ => return Err(err()),
        }
        seen_any = true;
    }
    if !number.is_empty() || !seen_any {
        return Err(err());
    }
    if d.weeks > 0 && (d.days > 0 || in_time) {
        return Err(err());
    }
    Ok(d)
}

/// ## Summary
/// Parses an RRULE value (RFC 5545 §3.3.10).
///
/// Rule parts may appear in any order. FREQ is required; unknown and
/// repeated parts are rejected; COUNT and UNTIL are mutually exclusive.
/// Every BYxxx part goes through the same validation as the builder API.
///
/// ## Errors
/// Returns an error describing the first problem found.
pub fn parse_rrule(s: &str, line: usize, col: usize) -> ParseResult<RRule> {
    let err = |kind| ParseError::new(kind, line, col);

    let mut seen: HashSet<String> = HashSet::new();
    let mut freq = None;
    let mut interval = None;
    let mut bound = None;
    let mut wkst = None;
    let mut rules: Vec<ByRule> = Vec::new();

    for part in s.split(';').filter(|p| !p.is_empty()) {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| err(ParseErrorKind::InvalidRRule).with_context(part))?;
        let key = key.to_ascii_uppercase();
        if !seen.insert(key.clone()) {
            return Err(err(ParseErrorKind::DuplicateRulePart).with_context(key));
        }

        match key.as_str() {
            "FREQ" => {
                freq = Some(
                    Frequency::parse(value)
                        .ok_or_else(|| err(ParseErrorKind::InvalidFrequency).with_context(value))?,
                );
            }
            "INTERVAL" => {
                interval = Some(
                    value
                        .parse::<u32>()
                        .map_err(|_| err(ParseErrorKind::InvalidRRule).with_context(part))?,
                );
            }
            "COUNT" | "UNTIL" if bound.is_some() => {
                return Err(err(ParseErrorKind::UntilCountConflict));
            }
            "COUNT" => {
                bound = Some(RRuleBound::Count(
                    value
                        .parse::<u32>()
                        .map_err(|_| err(ParseErrorKind::InvalidRRule).with_context(part))?,
                ));
            }
            "UNTIL" => {
                bound = Some(RRuleBound::Until(parse_temporal(
                    value, None, None, line, col,
                )?));
            }
            "WKST" => {
                wkst = Some(
                    Weekday::parse(value)
                        .ok_or_else(|| err(ParseErrorKind::InvalidWeekday).with_context(value))?,
                );
            }
            other => {
                let kind = ByRuleKind::parse(other)
                    .ok_or_else(|| err(ParseErrorKind::UnknownRulePart).with_context(other))?;
                rules.push(parse_by_rule(kind, value, line, col)?);
            }
        }
    }

    let freq = freq.ok_or_else(|| err(ParseErrorKind::MissingFrequency))?;
    let invalid = |e: crate::error::RuleError| err(ParseErrorKind::InvalidRRule).with_context(e.to_string());

    let mut rule = RRule::new(freq);
    if let Some(interval) = interval {
        rule = rule.with_interval(interval).map_err(invalid)?;
    }
    rule.set_bound(bound).map_err(invalid)?;
    if let Some(wkst) = wkst {
        rule = rule.with_wkst(wkst);
    }
    for by in rules {
        rule.set_rule(by).map_err(invalid)?;
    }
    rule.validate().map_err(invalid)?;
    Ok(rule)
}

fn parse_by_rule(kind: ByRuleKind, value: &str, line: usize, col: usize) -> ParseResult<ByRule> {
    Ok(match kind {
        ByRuleKind::Month => ByRule::Month(parse_list(kind, value, line, col)?),
        ByRuleKind::WeekNo => ByRule::WeekNo(parse_list(kind, value, line, col)?),
        ByRuleKind::YearDay => ByRule::YearDay(parse_list(kind, value, line, col)?),
        ByRuleKind::MonthDay => ByRule::MonthDay(parse_list(kind, value, line, col)?),
        ByRuleKind::Day => ByRule::Day(
            value
                .split(',')
                .map(|v| parse_weekday_num(v, line, col))
                .collect::<ParseResult<_>>()?,
        ),
        ByRuleKind::Hour => ByRule::Hour(parse_list(kind, value, line, col)?),
        ByRuleKind::Minute => ByRule::Minute(parse_list(kind, value, line, col)?),
        ByRuleKind::Second => ByRule::Second(parse_list(kind, value, line, col)?),
        ByRuleKind::SetPos => ByRule::SetPos(parse_list(kind, value, line, col)?),
    })
}

fn parse_list<T: std::str::FromStr>(
    kind: ByRuleKind,
    value: &str,
    line: usize,
    col: usize,
) -> ParseResult<Vec<T>> {
    value
        .split(',')
        .map(|v| {
            v.parse::<T>().map_err(|_| {
                ParseError::new(ParseErrorKind::InvalidRRule, line, col)
                    .with_context(format!("{kind}={value}"))
            })
        })
        .collect()
}

/// Parses one BYDAY entry such as `MO`, `+2TU` or `-1SU`.
fn parse_weekday_num(s: &str, line: usize, col: usize) -> ParseResult<WeekdayNum> {
    let err = || ParseError::new(ParseErrorKind::InvalidWeekday, line, col).with_context(s);
    let split = s.len().checked_sub(2).ok_or_else(err)?;
    if !s.is_char_boundary(split) {
        return Err(err());
    }
    let (ordinal, day) = s.split_at(split);
    let weekday = Weekday::parse(day).ok_or_else(err)?;
    if ordinal.is_empty() {
        return Ok(WeekdayNum::every(weekday));
    }
    let n = ordinal.parse::<i8>().map_err(|_| err())?;
    Ok(WeekdayNum::nth(n, weekday))
}

/// Unescapes a TEXT value (RFC 5545 §3.3.11).
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Splits a TEXT list on unescaped commas, then unescapes each entry.
#[must_use]
pub fn split_text_list(s: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for c in s.chars() {
        if escaped {
            current.push('\\');
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == ',' {
            items.push(unescape_text(&std::mem::take(&mut current)));
        } else {
            current.push(c);
        }
    }
    if escaped {
        current.push('\\');
    }
    items.push(unescape_text(&current));
    items
}

/// ## Errors
/// Returns an error if the string is not a 32-bit signed integer.
pub fn parse_integer(s: &str, line: usize, col: usize) -> ParseResult<i32> {
    s.parse::<i32>()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidInteger, line, col).with_context(s))
}

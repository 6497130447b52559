//! iCalendar RRULE (Recurrence Rule) value type (RFC 5545 §3.3.10, §3.8.5.3).

use std::fmt;
use std::str::FromStr;

use crate::error::{RfcError, RuleError, RuleResult};
use crate::rfc::ical::parse::values::parse_rrule;

use super::Temporal;

/// Recurrence frequency (RFC 5545 §3.3.10).
///
/// Ordered from finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Secondly => "SECONDLY",
            Self::Minutely => "MINUTELY",
            Self::Hourly => "HOURLY",
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// Parses a frequency from a string (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "SECONDLY" => Self::Secondly,
            "MINUTELY" => Self::Minutely,
            "HOURLY" => Self::Hourly,
            "DAILY" => Self::Daily,
            "WEEKLY" => Self::Weekly,
            "MONTHLY" => Self::Monthly,
            "YEARLY" => Self::Yearly,
            _ => return None,
        })
    }

    /// True for HOURLY and finer.
    #[must_use]
    pub const fn is_sub_daily(self) -> bool {
        matches!(self, Self::Secondly | Self::Minutely | Self::Hourly)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// Returns the two-letter abbreviation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sunday => "SU",
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
        }
    }

    /// Parses a weekday from a two-letter abbreviation (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "SU" => Self::Sunday,
            "MO" => Self::Monday,
            "TU" => Self::Tuesday,
            "WE" => Self::Wednesday,
            "TH" => Self::Thursday,
            "FR" => Self::Friday,
            "SA" => Self::Saturday,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn to_chrono(self) -> chrono::Weekday {
        match self {
            Self::Sunday => chrono::Weekday::Sun,
            Self::Monday => chrono::Weekday::Mon,
            Self::Tuesday => chrono::Weekday::Tue,
            Self::Wednesday => chrono::Weekday::Wed,
            Self::Thursday => chrono::Weekday::Thu,
            Self::Friday => chrono::Weekday::Fri,
            Self::Saturday => chrono::Weekday::Sat,
        }
    }

    #[must_use]
    pub const fn from_chrono(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Sun => Self::Sunday,
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weekday with optional occurrence number.
///
/// Used in BYDAY rule part. Examples:
/// - `MO` - every Monday
/// - `1MO` - first Monday of the month/year
/// - `-1FR` - last Friday of the month/year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekdayNum {
    /// Optional occurrence number (-53 to 53, excluding 0).
    pub ordinal: Option<i8>,
    pub weekday: Weekday,
}

impl WeekdayNum {
    /// Creates a weekday occurrence without an ordinal.
    #[must_use]
    pub const fn every(weekday: Weekday) -> Self {
        Self {
            ordinal: None,
            weekday,
        }
    }

    /// Creates a weekday occurrence with an ordinal. The range is checked
    /// when the BYDAY part is attached to a rule.
    #[must_use]
    pub const fn nth(ordinal: i8, weekday: Weekday) -> Self {
        Self {
            ordinal: Some(ordinal),
            weekday,
        }
    }
}

impl fmt::Display for WeekdayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.ordinal {
            write!(f, "{n}")?;
        }
        write!(f, "{}", self.weekday)
    }
}

/// Termination of a recurrence; COUNT and UNTIL are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RRuleBound {
    Count(u32),
    /// Inclusive upper bound.
    Until(Temporal),
}

/// BYxxx rule part kinds in canonical serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ByRuleKind {
    Month,
    WeekNo,
    YearDay,
    MonthDay,
    Day,
    Hour,
    Minute,
    Second,
    SetPos,
}

impl ByRuleKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Month => "BYMONTH",
            Self::WeekNo => "BYWEEKNO",
            Self::YearDay => "BYYEARDAY",
            Self::MonthDay => "BYMONTHDAY",
            Self::Day => "BYDAY",
            Self::Hour => "BYHOUR",
            Self::Minute => "BYMINUTE",
            Self::Second => "BYSECOND",
            Self::SetPos => "BYSETPOS",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "BYMONTH" => Self::Month,
            "BYWEEKNO" => Self::WeekNo,
            "BYYEARDAY" => Self::YearDay,
            "BYMONTHDAY" => Self::MonthDay,
            "BYDAY" => Self::Day,
            "BYHOUR" => Self::Hour,
            "BYMINUTE" => Self::Minute,
            "BYSECOND" => Self::Second,
            "BYSETPOS" => Self::SetPos,
            _ => return None,
        })
    }
}

impl fmt::Display for ByRuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One BYxxx rule part and its value set.
///
/// Each variant expands or limits the candidate set produced by the
/// frequency, see RFC 5545 §3.3.10 for the table of behaviors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ByRule {
    Month(Vec<u8>),
    WeekNo(Vec<i8>),
    YearDay(Vec<i16>),
    MonthDay(Vec<i8>),
    Day(Vec<WeekdayNum>),
    Hour(Vec<u8>),
    Minute(Vec<u8>),
    Second(Vec<u8>),
    SetPos(Vec<i16>),
}

fn check_unsigned(kind: ByRuleKind, values: &[u8], min: u8, max: u8) -> RuleResult<()> {
    if values.is_empty() {
        return Err(RuleError::EmptyValues(kind));
    }
    match values.iter().find(|v| !(min..=max).contains(*v)) {
        Some(v) => Err(RuleError::OutOfRange {
            kind,
            value: i32::from(*v),
        }),
        None => Ok(()),
    }
}

fn check_signed<T>(kind: ByRuleKind, values: &[T], max: i32) -> RuleResult<()>
where
    T: Copy + Into<i32>,
{
    if values.is_empty() {
        return Err(RuleError::EmptyValues(kind));
    }
    match values
        .iter()
        .map(|v| (*v).into())
        .find(|v: &i32| *v == 0 || v.abs() > max)
    {
        Some(value) => Err(RuleError::OutOfRange { kind, value }),
        None => Ok(()),
    }
}

impl ByRule {
    #[must_use]
    pub const fn kind(&self) -> ByRuleKind {
        match self {
            Self::Month(_) => ByRuleKind::Month,
            Self::WeekNo(_) => ByRuleKind::WeekNo,
            Self::YearDay(_) => ByRuleKind::YearDay,
            Self::MonthDay(_) => ByRuleKind::MonthDay,
            Self::Day(_) => ByRuleKind::Day,
            Self::Hour(_) => ByRuleKind::Hour,
            Self::Minute(_) => ByRuleKind::Minute,
            Self::Second(_) => ByRuleKind::Second,
            Self::SetPos(_) => ByRuleKind::SetPos,
        }
    }

    /// ## Summary
    /// Checks the value set on its own and against `freq`.
    ///
    /// ## Errors
    /// Returns a [`RuleError`] if the set is empty, a value is out of range,
    /// or the part is not meaningful for `freq`.
    pub fn validate(&self, freq: Frequency) -> RuleResult<()> {
        let kind = self.kind();
        match self {
            Self::Month(v) => check_unsigned(kind, v, 1, 12),
            Self::WeekNo(v) => {
                check_signed(kind, v, 53)?;
                if freq == Frequency::Yearly {
                    Ok(())
                } else {
                    Err(RuleError::Unsupported { kind, freq })
                }
            }
            Self::YearDay(v) => {
                check_signed(kind, v, 366)?;
                if matches!(
                    freq,
                    Frequency::Daily | Frequency::Weekly | Frequency::Monthly
                ) {
                    Err(RuleError::Unsupported { kind, freq })
                } else {
                    Ok(())
                }
            }
            Self::MonthDay(v) => {
                check_signed(kind, v, 31)?;
                if freq == Frequency::Weekly {
                    Err(RuleError::Unsupported { kind, freq })
                } else {
                    Ok(())
                }
            }
            Self::Day(v) => {
                if v.is_empty() {
                    return Err(RuleError::EmptyValues(kind));
                }
                let ordinals: Vec<i8> = v.iter().filter_map(|d| d.ordinal).collect();
                if ordinals.is_empty() {
                    return Ok(());
                }
                check_signed(kind, &ordinals, 53)?;
                if matches!(freq, Frequency::Monthly | Frequency::Yearly) {
                    Ok(())
                } else {
                    Err(RuleError::OrdinalNotAllowed(freq))
                }
            }
            Self::Hour(v) => check_unsigned(kind, v, 0, 23),
            Self::Minute(v) => check_unsigned(kind, v, 0, 59),
            Self::Second(v) => check_unsigned(kind, v, 0, 60),
            Self::SetPos(v) => check_signed(kind, v, 366),
        }
    }

    /// True if this is a BYDAY part carrying at least one ordinal.
    #[must_use]
    pub fn has_ordinal(&self) -> bool {
        matches!(self, Self::Day(days) if days.iter().any(|d| d.ordinal.is_some()))
    }

    /// Drops duplicate values, keeping first-seen order.
    fn deduplicated(self) -> Self {
        fn dedup<T: PartialEq + Copy>(values: Vec<T>) -> Vec<T> {
            let mut out: Vec<T> = Vec::with_capacity(values.len());
            for v in values {
                if !out.contains(&v) {
                    out.push(v);
                }
            }
            out
        }
        match self {
            Self::Month(v) => Self::Month(dedup(v)),
            Self::WeekNo(v) => Self::WeekNo(dedup(v)),
            Self::YearDay(v) => Self::YearDay(dedup(v)),
            Self::MonthDay(v) => Self::MonthDay(dedup(v)),
            Self::Day(v) => Self::Day(dedup(v)),
            Self::Hour(v) => Self::Hour(dedup(v)),
            Self::Minute(v) => Self::Minute(dedup(v)),
            Self::Second(v) => Self::Second(dedup(v)),
            Self::SetPos(v) => Self::SetPos(dedup(v)),
        }
    }
}

fn join<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{v}")?;
    }
    Ok(())
}

impl fmt::Display for ByRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.kind())?;
        match self {
            Self::Month(v) | Self::Hour(v) | Self::Minute(v) | Self::Second(v) => join(f, v),
            Self::WeekNo(v) | Self::MonthDay(v) => join(f, v),
            Self::YearDay(v) | Self::SetPos(v) => join(f, v),
            Self::Day(v) => join(f, v),
        }
    }
}

/// Recurrence rule (RFC 5545 §3.3.10, §3.8.5.3).
///
/// Rule parts are kept in canonical order with at most one part per kind,
/// and every part is validated against the frequency when attached. The
/// builder methods consume and return the rule so they chain with `?`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RRule {
    freq: Frequency,
    interval: u32,
    bound: Option<RRuleBound>,
    wkst: Option<Weekday>,
    rules: Vec<ByRule>,
}

impl RRule {
    /// Creates a rule with the given frequency, interval 1 and no parts.
    #[must_use]
    pub const fn new(freq: Frequency) -> Self {
        Self {
            freq,
            interval: 1,
            bound: None,
            wkst: None,
            rules: Vec::new(),
        }
    }

    #[must_use]
    pub const fn daily() -> Self {
        Self::new(Frequency::Daily)
    }

    #[must_use]
    pub const fn weekly() -> Self {
        Self::new(Frequency::Weekly)
    }

    #[must_use]
    pub const fn monthly() -> Self {
        Self::new(Frequency::Monthly)
    }

    #[must_use]
    pub const fn yearly() -> Self {
        Self::new(Frequency::Yearly)
    }

    #[must_use]
    pub const fn freq(&self) -> Frequency {
        self.freq
    }

    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.interval
    }

    #[must_use]
    pub const fn bound(&self) -> Option<&RRuleBound> {
        self.bound.as_ref()
    }

    #[must_use]
    pub const fn count(&self) -> Option<u32> {
        match self.bound {
            Some(RRuleBound::Count(n)) => Some(n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn until(&self) -> Option<&Temporal> {
        match &self.bound {
            Some(RRuleBound::Until(t)) => Some(t),
            _ => None,
        }
    }

    /// Week start, Monday when not given.
    #[must_use]
    pub fn wkst(&self) -> Weekday {
        self.wkst.unwrap_or(Weekday::Monday)
    }

    /// Week start only if it was set explicitly.
    #[must_use]
    pub const fn explicit_wkst(&self) -> Option<Weekday> {
        self.wkst
    }

    /// Rule parts in canonical order.
    #[must_use]
    pub fn rules(&self) -> &[ByRule] {
        &self.rules
    }

    #[must_use]
    pub fn rule(&self, kind: ByRuleKind) -> Option<&ByRule> {
        self.rules.iter().find(|r| r.kind() == kind)
    }

    #[must_use]
    pub fn has_rule(&self, kind: ByRuleKind) -> bool {
        self.rule(kind).is_some()
    }

    /// ## Errors
    /// Returns [`RuleError::ZeroInterval`] for an interval of 0.
    pub fn with_interval(mut self, interval: u32) -> RuleResult<Self> {
        if interval == 0 {
            return Err(RuleError::ZeroInterval);
        }
        self.interval = interval;
        Ok(self)
    }

    /// ## Errors
    /// Returns [`RuleError::ZeroCount`] for a count of 0.
    pub fn with_count(mut self, count: u32) -> RuleResult<Self> {
        self.set_bound(Some(RRuleBound::Count(count)))?;
        Ok(self)
    }

    /// Replaces any COUNT or UNTIL with an inclusive UNTIL.
    #[must_use]
    pub fn with_until(mut self, until: Temporal) -> Self {
        self.bound = Some(RRuleBound::Until(until));
        self
    }

    #[must_use]
    pub fn with_wkst(mut self, wkst: Weekday) -> Self {
        self.wkst = Some(wkst);
        self
    }

    /// ## Summary
    /// Attaches a rule part, replacing an existing part of the same kind.
    ///
    /// ## Errors
    /// Returns a [`RuleError`] if the part is invalid for this rule's
    /// frequency or conflicts with parts already attached.
    pub fn with_rule(mut self, rule: ByRule) -> RuleResult<Self> {
        self.set_rule(rule)?;
        Ok(self)
    }

    #[must_use]
    pub fn without_rule(mut self, kind: ByRuleKind) -> Self {
        self.remove_rule(kind);
        self
    }

    /// ## Summary
    /// Changes the frequency and re-checks every attached part against it.
    ///
    /// ## Errors
    /// Returns the first [`RuleError`] found; the rule is unchanged then.
    pub fn with_frequency(mut self, freq: Frequency) -> RuleResult<Self> {
        for rule in &self.rules {
            rule.validate(freq)?;
        }
        self.freq = freq;
        self.check_combinations()?;
        Ok(self)
    }

    /// ## Errors
    /// Returns [`RuleError::ZeroCount`] for `Count(0)`.
    pub fn set_bound(&mut self, bound: Option<RRuleBound>) -> RuleResult<()> {
        if matches!(bound, Some(RRuleBound::Count(0))) {
            return Err(RuleError::ZeroCount);
        }
        self.bound = bound;
        Ok(())
    }

    /// ## Summary
    /// In-place form of [`RRule::with_rule`].
    ///
    /// ## Errors
    /// Returns a [`RuleError`] if the part is rejected; the rule is unchanged then.
    pub fn set_rule(&mut self, rule: ByRule) -> RuleResult<()> {
        rule.validate(self.freq)?;
        let rule = rule.deduplicated();
        let kind = rule.kind();

        let mut candidate = self.rules.clone();
        candidate.retain(|r| r.kind() != kind);
        let at = candidate
            .iter()
            .position(|r| r.kind() > kind)
            .unwrap_or(candidate.len());
        candidate.insert(at, rule);

        check_combinations(self.freq, &candidate)?;
        self.rules = candidate;
        Ok(())
    }

    pub fn remove_rule(&mut self, kind: ByRuleKind) -> Option<ByRule> {
        let at = self.rules.iter().position(|r| r.kind() == kind)?;
        Some(self.rules.remove(at))
    }

    /// ## Summary
    /// Checks the whole rule: interval, count, every part against the
    /// frequency, and cross-part constraints including BYSETPOS needing a
    /// companion part.
    ///
    /// ## Errors
    /// Returns the first [`RuleError`] found.
    pub fn validate(&self) -> RuleResult<()> {
        if self.interval == 0 {
            return Err(RuleError::ZeroInterval);
        }
        if matches!(self.bound, Some(RRuleBound::Count(0))) {
            return Err(RuleError::ZeroCount);
        }
        for rule in &self.rules {
            rule.validate(self.freq)?;
        }
        self.check_combinations()?;
        if self.has_rule(ByRuleKind::SetPos) && self.rules.len() == 1 {
            return Err(RuleError::SetPosWithoutRule);
        }
        Ok(())
    }

    fn check_combinations(&self) -> RuleResult<()> {
        check_combinations(self.freq, &self.rules)
    }
}

fn check_combinations(freq: Frequency, rules: &[ByRule]) -> RuleResult<()> {
    let week_no = rules.iter().any(|r| r.kind() == ByRuleKind::WeekNo);
    let ordinal_day = rules.iter().any(ByRule::has_ordinal);
    if freq == Frequency::Yearly && week_no && ordinal_day {
        return Err(RuleError::OrdinalWithWeekNo);
    }
    Ok(())
}

impl fmt::Display for RRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FREQ={}", self.freq)?;
        if self.interval != 1 {
            write!(f, ";INTERVAL={}", self.interval)?;
        }
        match &self.bound {
            Some(RRuleBound::Count(n)) => write!(f, ";COUNT={n}")?,
            Some(RRuleBound::Until(t)) => write!(f, ";UNTIL={t}")?,
            None => {}
        }
        for rule in &self.rules {
            write!(f, ";{rule}")?;
        }
        if let Some(wkst) = self.wkst {
            write!(f, ";WKST={wkst}")?;
        }
        Ok(())
    }
}

impl FromStr for RRule {
    type Err = RfcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_rrule(s, 1, 0)?)
    }
}

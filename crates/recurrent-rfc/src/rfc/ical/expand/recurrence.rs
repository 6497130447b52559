//! Lazy recurrence sets: one rule, its start value, EXDATE and RDATE.

use std::collections::{BTreeSet, VecDeque};
use std::iter::Peekable;

use chrono::{Days, NaiveDateTime, TimeDelta, Timelike};
use recurrent_core::config::ExpansionConfig;
use recurrent_core::constants::{DEFAULT_MAX_EMPTY_PERIODS, DEFAULT_MAX_INSTANCES};

use super::calendar::{fixed_step_seconds, midnight, nth_period, period_start};
use super::combinator::Pipeline;
use super::timezone::{TimeZoneResolver, normalize_to};
use crate::error::{RfcResult, RuleError};
use crate::rfc::ical::core::{Frequency, RRule, Temporal};

/// Error while materializing occurrences.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpansionError {
    /// More occurrences fall in the window than the configured cap allows.
    #[error("Window holds more than {0} occurrences")]
    TooManyOccurrences(usize),

    #[error("Invalid window: {0}")]
    InvalidWindow(String),
}

/// Guards applied while materializing occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionLimits {
    pub max_instances: usize,
    pub max_empty_periods: usize,
}

impl Default for ExpansionLimits {
    fn default() -> Self {
        Self {
            max_instances: DEFAULT_MAX_INSTANCES as usize,
            max_empty_periods: DEFAULT_MAX_EMPTY_PERIODS as usize,
        }
    }
}

impl From<ExpansionConfig> for ExpansionLimits {
    fn from(config: ExpansionConfig) -> Self {
        Self {
            max_instances: config.max_instances,
            max_empty_periods: config.max_empty_periods,
        }
    }
}

/// Half-open time range `[start, end)` to materialize occurrences for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    start: Temporal,
    end: Temporal,
}

impl Window {
    /// ## Errors
    /// Returns `ExpansionError::InvalidWindow` if `end` precedes `start`.
    pub fn new(start: Temporal, end: Temporal) -> Result<Self, ExpansionError> {
        if end < start {
            return Err(ExpansionError::InvalidWindow(format!(
                "end {end} is before start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> &Temporal {
        &self.start
    }

    #[must_use]
    pub const fn end(&self) -> &Temporal {
        &self.end
    }
}

/// A start value, an optional rule, and the explicit EXDATE/RDATE sets.
///
/// All dates are held in the start value's form so that matching is exact.
/// The set is immutable once built; [`RecurrenceSet::iter`] hands out
/// independent cursors.
#[derive(Debug, Clone)]
pub struct RecurrenceSet {
    start: Temporal,
    rule: Option<RRule>,
    until: Option<NaiveDateTime>,
    rdates: Vec<Temporal>,
    exdates: BTreeSet<Temporal>,
    limits: ExpansionLimits,
    resolver: TimeZoneResolver,
}

impl RecurrenceSet {
    #[must_use]
    pub fn new(start: Temporal) -> Self {
        Self {
            start,
            rule: None,
            until: None,
            rdates: Vec::new(),
            exdates: BTreeSet::new(),
            limits: ExpansionLimits::default(),
            resolver: TimeZoneResolver::new(),
        }
    }

    /// ## Summary
    /// Attaches the recurrence rule.
    ///
    /// ## Errors
    /// Returns a `RuleError` if the rule is invalid or uses a sub-daily
    /// frequency on a date-only start, and a conversion error if its UNTIL
    /// needs an unresolvable time zone to be compared with the start.
    pub fn with_rule(mut self, rule: RRule) -> RfcResult<Self> {
        rule.validate()?;
        if self.start.is_date() && rule.freq().is_sub_daily() {
            return Err(RuleError::SubDailyOnDate(rule.freq()).into());
        }

        self.until = match rule.until() {
            None => None,
            Some(until) if until.is_date() && !self.start.is_date() => until
                .date_part()
                .and_hms_opt(23, 59, 59)
                .or_else(|| Some(until.local())),
            Some(until) => Some(normalize_to(until, &self.start, &mut self.resolver)?.local()),
        };
        self.rule = Some(rule);
        Ok(self)
    }

    /// ## Errors
    /// Returns a conversion error if a value needs an unresolvable time zone.
    pub fn with_exdates<'a>(
        mut self,
        exdates: impl IntoIterator<Item = &'a Temporal>,
    ) -> RfcResult<Self> {
        for exdate in exdates {
            let normalized = normalize_to(exdate, &self.start, &mut self.resolver)?;
            self.exdates.insert(normalized);
        }
        Ok(self)
    }

    /// ## Errors
    /// Returns a conversion error if a value needs an unresolvable time zone.
    pub fn with_rdates<'a>(
        mut self,
        rdates: impl IntoIterator<Item = &'a Temporal>,
    ) -> RfcResult<Self> {
        for rdate in rdates {
            let normalized = normalize_to(rdate, &self.start, &mut self.resolver)?;
            self.rdates.push(normalized);
        }
        self.rdates.sort();
        self.rdates.dedup();
        Ok(self)
    }

    #[must_use]
    pub const fn with_limits(mut self, limits: ExpansionLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub const fn start(&self) -> &Temporal {
        &self.start
    }

    #[must_use]
    pub const fn rule(&self) -> Option<&RRule> {
        self.rule.as_ref()
    }

    #[must_use]
    pub const fn limits(&self) -> ExpansionLimits {
        self.limits
    }

    /// Lazy cursor over all occurrences in ascending order. Unbounded unless
    /// the rule carries COUNT or UNTIL.
    #[must_use]
    pub fn iter(&self) -> Occurrences<'_> {
        Occurrences {
            rule: self.rule_stream().peekable(),
            rdates: self.rdates.iter().peekable(),
            exdates: &self.exdates,
            last: None,
        }
    }

    /// ## Summary
    /// Occurrences of the rule alone (or the start value when there is no
    /// rule), before EXDATE and RDATE are applied.
    #[must_use]
    pub fn rule_occurrences(&self) -> RuleOccurrences<'_> {
        self.rule_stream()
    }

    fn rule_stream(&self) -> RuleOccurrences<'_> {
        let inner = self
            .rule
            .as_ref()
            .map(|rule| RuleIter::new(rule, &self.start, self.until, self.limits));
        RuleOccurrences {
            start: &self.start,
            inner,
            single: self.rule.is_none(),
        }
    }

    /// ## Summary
    /// First value the rule produces. When the start value does not match
    /// the rule, this is where the series really begins.
    #[must_use]
    pub fn first_occurrence(&self) -> Option<Temporal> {
        self.rule_stream().next()
    }

    /// ## Summary
    /// Materializes the occurrences inside `window`.
    ///
    /// ## Errors
    /// Returns `ExpansionError::TooManyOccurrences` if the window holds more
    /// than `max_instances` occurrences, or a conversion error if the window
    /// bounds cannot be expressed in the start value's form.
    #[tracing::instrument(skip(self), fields(start = %self.start))]
    pub fn between(&self, window: &Window) -> RfcResult<Vec<Temporal>> {
        let mut resolver = self.resolver.clone();
        let from = normalize_to(window.start(), &self.start, &mut resolver)?;
        let to = normalize_to(window.end(), &self.start, &mut resolver)?;

        let mut out = Vec::new();
        for occurrence in self.iter() {
            if occurrence >= to {
                break;
            }
            if occurrence < from {
                continue;
            }
            if out.len() >= self.limits.max_instances {
                return Err(ExpansionError::TooManyOccurrences(self.limits.max_instances).into());
            }
            out.push(occurrence);
        }
        tracing::debug!(count = out.len(), "Materialized window");
        Ok(out)
    }

    /// True if `value` is one of the occurrences.
    #[must_use]
    pub fn contains(&self, value: &Temporal) -> bool {
        self.iter()
            .take_while(|o| o <= value)
            .any(|o| o == *value)
    }

    /// Number of rule occurrences strictly before `value`, EXDATEs included.
    #[must_use]
    pub fn rule_count_before(&self, value: &Temporal) -> usize {
        self.rule_stream().take_while(|o| o < value).count()
    }

    /// Last rule occurrence strictly before `value`.
    #[must_use]
    pub fn previous_occurrence(&self, value: &Temporal) -> Option<Temporal> {
        self.rule_stream().take_while(|o| o < value).last()
    }
}

/// Rule occurrences as values in the start value's form.
#[derive(Debug, Clone)]
pub struct RuleOccurrences<'a> {
    start: &'a Temporal,
    inner: Option<RuleIter>,
    single: bool,
}

impl Iterator for RuleOccurrences<'_> {
    type Item = Temporal;

    fn next(&mut self) -> Option<Self::Item> {
        if self.single {
            self.single = false;
            return Some(self.start.clone());
        }
        let local = self.inner.as_mut()?.next()?;
        Some(self.start.with_local(local))
    }
}

/// Merged occurrences: rule stream plus RDATE, minus EXDATE, ascending and
/// without duplicates.
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    rule: Peekable<RuleOccurrences<'a>>,
    rdates: Peekable<std::slice::Iter<'a, Temporal>>,
    exdates: &'a BTreeSet<Temporal>,
    last: Option<Temporal>,
}

impl Iterator for Occurrences<'_> {
    type Item = Temporal;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let take_rule = match (self.rule.peek(), self.rdates.peek()) {
                (None, None) => return None,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (Some(r), Some(d)) => r <= *d,
            };
            let candidate = if take_rule {
                self.rule.next()?
            } else {
                self.rdates.next()?.clone()
            };

            if self.last.as_ref() == Some(&candidate) || self.exdates.contains(&candidate) {
                continue;
            }
            self.last = Some(candidate.clone());
            return Some(candidate);
        }
    }
}

/// Steps the rule period by period, running the pipeline on each.
#[derive(Debug, Clone)]
struct RuleIter {
    pipeline: Pipeline,
    freq_step: Option<i64>,
    sub_daily: bool,
    freq: Frequency,
    interval: u32,
    count: Option<u32>,
    until: Option<NaiveDateTime>,
    start: NaiveDateTime,
    base: NaiveDateTime,
    index: u64,
    buffer: VecDeque<NaiveDateTime>,
    emitted: u32,
    empty_run: usize,
    max_empty_periods: usize,
    done: bool,
}

impl RuleIter {
    fn new(
        rule: &RRule,
        start: &Temporal,
        until: Option<NaiveDateTime>,
        limits: ExpansionLimits,
    ) -> Self {
        let at = start.local();
        let freq = rule.freq();
        Self {
            pipeline: Pipeline::new(rule, start),
            freq_step: fixed_step_seconds(freq),
            sub_daily: freq.is_sub_daily(),
            freq,
            interval: rule.interval(),
            count: rule.count(),
            until,
            start: at,
            base: period_start(freq, at, rule.wkst().to_chrono()),
            index: 0,
            buffer: VecDeque::new(),
            emitted: 0,
            empty_run: 0,
            max_empty_periods: limits.max_empty_periods,
            done: false,
        }
    }

    /// Earliest instant worth visiting when the period at `period` is ruled
    /// out wholesale by a day, hour or minute part that limits at this
    /// frequency.
    fn resume_point(&self, period: NaiveDateTime) -> Option<NaiveDateTime> {
        if !self.pipeline.admits_day(period.date()) {
            return period
                .date()
                .checked_add_days(Days::new(1))
                .map(midnight);
        }
        if !self.pipeline.admits_hour(period.hour()) {
            let hour = period.date().and_hms_opt(period.hour(), 0, 0)?;
            return hour.checked_add_signed(TimeDelta::hours(1));
        }
        // Under HOURLY a BYMINUTE part expands the period instead.
        if matches!(self.freq, Frequency::Minutely | Frequency::Secondly)
            && !self.pipeline.admits_minute(period.minute())
        {
            let minute = period.with_second(0)?;
            return minute.checked_add_signed(TimeDelta::minutes(1));
        }
        None
    }

    /// Index of the first period at or after `resume`.
    fn index_at(&self, resume: NaiveDateTime) -> Option<u64> {
        let step = self.freq_step?.checked_mul(i64::from(self.interval))?;
        let offset = (resume - self.base).num_seconds();
        let index = offset.checked_add(step - 1)? / step;
        u64::try_from(index).ok()
    }

    fn finish(&mut self) -> Option<NaiveDateTime> {
        self.done = true;
        self.buffer.clear();
        None
    }
}

impl Iterator for RuleIter {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }

            if let Some(candidate) = self.buffer.pop_front() {
                if self.until.is_some_and(|until| candidate > until)
                    || self.count.is_some_and(|count| self.emitted >= count)
                {
                    return self.finish();
                }
                self.emitted += 1;
                return Some(candidate);
            }

            let Some(period) = nth_period(self.freq, self.base, self.interval, self.index) else {
                return self.finish();
            };
            self.index += 1;
            if self.until.is_some_and(|until| period > until) {
                return self.finish();
            }

            if self.sub_daily
                && let Some(resume) = self.resume_point(period)
            {
                if let Some(index) = self.index_at(resume) {
                    self.index = self.index.max(index);
                }
                if self.note_empty() {
                    return self.finish();
                }
                continue;
            }

            let start = self.start;
            let candidates: Vec<NaiveDateTime> = self
                .pipeline
                .expand(period)
                .into_iter()
                .filter(|c| *c >= start)
                .collect();
            if candidates.is_empty() {
                if self.note_empty() {
                    return self.finish();
                }
                continue;
            }
            self.empty_run = 0;
            self.buffer.extend(candidates);
        }
    }
}

impl RuleIter {
    /// Records an empty period; true once the guard trips.
    fn note_empty(&mut self) -> bool {
        self.empty_run += 1;
        if self.empty_run >= self.max_empty_periods {
            tracing::warn!(
                periods = self.empty_run,
                emitted = self.emitted,
                "Rule produced no occurrence for too many consecutive periods; stopping"
            );
            return true;
        }
        false
    }
}

#[cfg(test)]
#[path = "recurrence_tests.rs"]
mod tests;

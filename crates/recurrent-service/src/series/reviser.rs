//! Series revision: applies an edit of one occurrence to a recurring
//! component under the scope the caller picks.
//!
//! The original component is never touched. Every path returns the new
//! state of the affected components plus the change messages that announce
//! it; CANCEL returns an empty revision.

use chrono::{Datelike, SubsecRound, TimeDelta, Utc};
use recurrent_rfc::error::RfcError;
use recurrent_rfc::rfc::ical::core::{
    ByRule, ByRuleKind, DateTimeForm, RRule, RRuleBound, Temporal, Weekday,
};
use recurrent_rfc::rfc::ical::expand::{RecurrenceSet, TimeZoneResolver, normalize_to, to_utc};
use uuid::Uuid;

use super::component::{ComponentEnd, PropertyKind, RecurringComponent, StartAdjustment};
use super::itip::{ChangeMessage, Method};
use super::scope::{
    EditScope, RRuleStatus, ScopeChoice, ScopeResolver, requires_dialog, scope_choices,
};
use crate::error::{ServiceError, ServiceResult};

/// Outcome of a revision, deletion or creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Revision {
    /// Outbound messages in the order they should be sent.
    pub messages: Vec<ChangeMessage>,
    /// New state of every component the operation touched.
    pub components: Vec<RecurringComponent>,
    /// Start values moved onto the first real occurrence.
    pub start_adjustments: Vec<StartAdjustment>,
}

impl Revision {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Revision that leaves `component` as it was.
    #[must_use]
    pub fn unchanged(component: &RecurringComponent) -> Self {
        Self {
            components: vec![component.clone()],
            ..Self::default()
        }
    }

    fn single(method: Method, component: RecurringComponent) -> Self {
        Self {
            messages: vec![ChangeMessage::new(method, vec![component.clone()])],
            components: vec![component],
            start_adjustments: Vec::new(),
        }
    }
}

/// ## Summary
/// Builder for one revision request.
///
/// `original` is the stored component, `edited` a copy of it carrying the
/// property changes, `occurrence` the original start of the occurrence the
/// user picked, and `start`/`end` where that occurrence now lies.
#[derive(Debug, Clone, Default)]
pub struct Reviser<'a> {
    original: Option<&'a RecurringComponent>,
    edited: Option<RecurringComponent>,
    occurrence: Option<Temporal>,
    start: Option<Temporal>,
    end: Option<Temporal>,
    timestamp: Option<Temporal>,
}

impl<'a> Reviser<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn original(mut self, original: &'a RecurringComponent) -> Self {
        self.original = Some(original);
        self
    }

    #[must_use]
    pub fn edited(mut self, edited: RecurringComponent) -> Self {
        self.edited = Some(edited);
        self
    }

    #[must_use]
    pub fn occurrence(mut self, occurrence: Temporal) -> Self {
        self.occurrence = Some(occurrence);
        self
    }

    #[must_use]
    pub fn start(mut self, start: Temporal) -> Self {
        self.start = Some(start);
        self
    }

    /// New end of the occurrence. Without it the duration is kept.
    #[must_use]
    pub fn end(mut self, end: Temporal) -> Self {
        self.end = Some(end);
        self
    }

    /// DTSTAMP/LAST-MODIFIED to stamp on changed components. Defaults to now.
    #[must_use]
    pub fn timestamp(mut self, timestamp: Temporal) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// ## Summary
    /// Computes the revision.
    ///
    /// When the edit is ambiguous on a series, `resolver` is asked which
    /// scope to apply; declining is the same as CANCEL.
    ///
    /// ## Errors
    /// Returns `ServiceError::MissingField` for an incomplete request,
    /// `ServiceError::InvalidOriginal` if the original fails validation,
    /// `ServiceError::OccurrenceNotInSeries` if `occurrence` is not one of
    /// its occurrences and `ServiceError::InvalidEdited` if the result would
    /// be invalid. No messages are produced on error.
    #[tracing::instrument(skip_all, fields(uid = tracing::field::Empty))]
    pub fn revise<R>(self, resolver: &mut R) -> ServiceResult<Revision>
    where
        R: ScopeResolver + ?Sized,
    {
        let original = self.original.ok_or(ServiceError::MissingField("original"))?;
        tracing::Span::current().record("uid", original.uid.as_str());
        let edited = self.edited.ok_or(ServiceError::MissingField("edited"))?;
        let occurrence = self
            .occurrence
            .ok_or(ServiceError::MissingField("occurrence"))?;
        let start = self.start.ok_or(ServiceError::MissingField("start"))?;

        original.validate().map_err(ServiceError::InvalidOriginal)?;
        let reference = original
            .dtstart
            .clone()
            .ok_or(ServiceError::MissingField("original DTSTART"))?;

        let mut zones = TimeZoneResolver::new();
        let occurrence = normalize_to(&occurrence, &reference, &mut zones).map_err(RfcError::from)?;
        let start = normalize_to(&start, &reference, &mut zones).map_err(RfcError::from)?;
        let end = self
            .end
            .map(|end| normalize_to(&end, &reference, &mut zones))
            .transpose()
            .map_err(RfcError::from)?;

        let edit = Edit {
            original,
            edited,
            delta: start.local() - occurrence.local(),
            occurrence,
            start,
            end,
            now: self.timestamp.unwrap_or_else(now),
            zones,
        };
        edit.apply(resolver)
    }
}

pub(super) fn now() -> Temporal {
    Temporal::utc(Utc::now().naive_utc().trunc_subsecs(0))
}

/// A validated request with every time expressed in the original's form.
struct Edit<'a> {
    original: &'a RecurringComponent,
    edited: RecurringComponent,
    occurrence: Temporal,
    start: Temporal,
    end: Option<Temporal>,
    delta: TimeDelta,
    now: Temporal,
    zones: TimeZoneResolver,
}

impl Edit<'_> {
    fn apply<R>(mut self, resolver: &mut R) -> ServiceResult<Revision>
    where
        R: ScopeResolver + ?Sized,
    {
        let status = RRuleStatus::classify(self.original, &self.edited);
        tracing::debug!(?status, "Classified edit");
        match status {
            RRuleStatus::Individual => {
                let mut result = self.edited.clone();
                result.set_span(self.start.clone(), self.end.clone());
                self.finish_single(result, None)
            }
            RRuleStatus::WithNewRepeat => {
                let mut result = self.edited.clone();
                result.set_span(self.start.clone(), self.end.clone());
                let adjustment = result.align_start().map_err(ServiceError::InvalidEdited)?;
                self.finish_single(result, adjustment)
            }
            RRuleStatus::HadRepeatBecomingIndividual => {
                let mut result = self.edited.clone();
                result.set_span(self.start.clone(), self.end.clone());
                result.exdates.clear();
                result.rdates.clear();
                result.overrides.clear();
                self.finish_single(result, None)
            }
            RRuleStatus::WithExistingRepeat => self.revise_series(resolver),
        }
    }

    fn finish_single(
        &self,
        mut result: RecurringComponent,
        adjustment: Option<StartAdjustment>,
    ) -> ServiceResult<Revision> {
        result.validate().map_err(ServiceError::InvalidEdited)?;
        if self.original.changed_properties(&result).is_empty() {
            tracing::debug!("Edit changes nothing");
            return Ok(Revision::unchanged(self.original));
        }
        self.stamp(&mut result);
        result.sequence = self.original.sequence + 1;
        let mut revision = Revision::single(Method::Request, result);
        revision.start_adjustments.extend(adjustment);
        Ok(revision)
    }

    fn revise_series<R>(&mut self, resolver: &mut R) -> ServiceResult<Revision>
    where
        R: ScopeResolver + ?Sized,
    {
        let set = self
            .original
            .recurrence_set()
            .map_err(ServiceError::InvalidOriginal)?;
        if !set.contains(&self.occurrence) {
            return Err(ServiceError::OccurrenceNotInSeries {
                uid: self.original.uid.clone(),
                occurrence: self.occurrence.to_string(),
            });
        }

        let mut changed = self.original.changed_properties(&self.edited);
        if self.delta != TimeDelta::zero() {
            changed.insert(PropertyKind::Start);
        }
        if let Some(end) = &self.end
            && Some(end.local() - self.start.local()) != self.original.duration()
        {
            changed.insert(match self.original.end {
                Some(ComponentEnd::Duration(_)) => PropertyKind::Duration,
                _ => PropertyKind::End,
            });
        }
        if changed.is_empty() {
            tracing::debug!("Edit changes nothing");
            return Ok(Revision::unchanged(self.original));
        }

        let scope = if requires_dialog(&changed, self.original.kind) {
            let choices = scope_choices(
                self.original,
                &set,
                &self.occurrence,
                changed.contains(&PropertyKind::RRule),
            );
            let picked = resolver.resolve(&choices).unwrap_or(EditScope::Cancel);
            self.offered_scope(picked, &choices, &set)
        } else {
            EditScope::All
        };
        tracing::debug!(%scope, ?changed, occurrence = %self.occurrence, "Resolved edit scope");

        match scope {
            EditScope::One => self.one(),
            EditScope::All | EditScope::AllIgnoreRecurrences => self.all(scope.keeps_overrides()),
            EditScope::ThisAndFuture | EditScope::ThisAndFutureIgnoreRecurrences => {
                self.this_and_future(&set, scope.keeps_overrides())
            }
            EditScope::Cancel => Ok(Revision::default()),
        }
    }

    /// `picked` if it was among `choices`, CANCEL otherwise. A future scope
    /// picked on the first occurrence stands for the whole series.
    fn offered_scope(
        &self,
        picked: EditScope,
        choices: &[ScopeChoice],
        set: &RecurrenceSet,
    ) -> EditScope {
        let is_first = set.iter().next().as_ref() == Some(&self.occurrence);
        let picked = match picked {
            EditScope::ThisAndFuture if is_first => EditScope::All,
            EditScope::ThisAndFutureIgnoreRecurrences if is_first => {
                EditScope::AllIgnoreRecurrences
            }
            other => other,
        };
        if choices.iter().any(|c| c.scope == picked) {
            picked
        } else {
            tracing::warn!(scope = %picked, "Scope was not offered; cancelling edit");
            EditScope::Cancel
        }
    }

    /// Pulls the occurrence out of the series as an override.
    fn one(&self) -> ServiceResult<Revision> {
        let mut child = self.edited.clone();
        child.rrule = None;
        child.exdates.clear();
        child.rdates.clear();
        child.overrides.clear();
        child.recurrence_id = Some(self.occurrence.clone());
        child.set_span(self.start.clone(), self.end.clone());
        self.stamp(&mut child);

        let existing_key = self
            .original
            .overrides
            .keys()
            .find(|rid| self.same_instant(rid, &self.occurrence))
            .cloned();
        let method = match existing_key.as_ref().and_then(|k| self.original.overrides.get(k)) {
            Some(existing) => {
                child.sequence = existing.sequence + 1;
                Method::Request
            }
            None => {
                child.sequence = self.original.sequence;
                Method::Publish
            }
        };
        child.validate().map_err(ServiceError::InvalidEdited)?;

        let mut parent = self.original.clone();
        if let Some(key) = &existing_key {
            parent.overrides.remove(key);
        }
        parent
            .overrides
            .insert(self.occurrence.clone(), child.clone());
        parent.sequence += 1;

        Ok(Revision {
            messages: vec![ChangeMessage::new(method, vec![child])],
            components: vec![parent],
            start_adjustments: Vec::new(),
        })
    }

    /// Moves the whole series by the occurrence's shift.
    fn all(&self, keep_overrides: bool) -> ServiceResult<Revision> {
        let mut result = self.edited.clone();
        self.move_series(&mut result)?;
        result.exdates = shift_all(&result.exdates, self.delta);
        result.rdates = shift_all(&result.rdates, self.delta);

        if keep_overrides {
            result.overrides = std::mem::take(&mut result.overrides)
                .into_values()
                .filter_map(|mut child| {
                    let rid = child.recurrence_id.as_ref()?.shifted(self.delta)?;
                    child.recurrence_id = Some(rid.clone());
                    Some((rid, child))
                })
                .collect();
        } else if !result.overrides.is_empty() {
            tracing::debug!(count = result.overrides.len(), "Orphaning overrides");
            result.overrides.clear();
        } else {
            // nothing to orphan
        }

        result.sequence = self.original.sequence + 1;
        self.stamp(&mut result);
        let adjustment = result.align_start().map_err(ServiceError::InvalidEdited)?;
        result.validate().map_err(ServiceError::InvalidEdited)?;

        let mut revision = Revision::single(Method::Request, result);
        revision.start_adjustments.extend(adjustment);
        Ok(revision)
    }

    /// Ends the original before the occurrence and starts a new series there.
    fn this_and_future(
        &mut self,
        set: &RecurrenceSet,
        keep_overrides: bool,
    ) -> ServiceResult<Revision> {
        let Some(previous) = set.previous_occurrence(&self.occurrence) else {
            return self.all(keep_overrides);
        };
        tracing::debug!(split = %self.occurrence, until = %previous, "Splitting series");

        let split = self.occurrence.clone();
        let tail_exdates = self.at_or_after_split(&self.original.exdates);
        let tail_rdates = self.at_or_after_split(&self.original.rdates);

        let mut head = truncated(self.original, &split, &previous, &mut self.zones)?;
        head.sequence += 1;
        self.stamp(&mut head);
        head.validate().map_err(ServiceError::InvalidEdited)?;

        let mut tail = self.edited.clone();
        tail.uid = Uuid::new_v4().to_string();
        tail.related_to = Some(self.original.uid.clone());
        tail.sequence = 0;
        tail.recurrence_id = None;
        tail.set_span(self.start.clone(), self.end.clone());
        if let Some(rule) = tail.rrule.as_mut() {
            shift_rule(rule, self.delta, &self.occurrence, &self.start)?;
        }
        if let Some(rule) = tail.rrule.as_mut()
            && let Some(original_count) = self.original.rrule.as_ref().and_then(RRule::count)
            && rule.count() == Some(original_count)
        {
            let before = u32::try_from(set.rule_count_before(&split)).unwrap_or(u32::MAX);
            let remaining = original_count.saturating_sub(before).max(1);
            rule.set_bound(Some(RRuleBound::Count(remaining)))
                .map_err(RfcError::from)?;
        }
        tail.exdates = shift_all(&tail_exdates, self.delta);
        tail.rdates = shift_all(&tail_rdates, self.delta);
        tail.overrides.clear();
        if keep_overrides {
            for (rid, child) in &self.original.overrides {
                if self.is_before_split(rid) {
                    continue;
                }
                let Some(shifted) = rid.shifted(self.delta) else {
                    continue;
                };
                let mut moved = child.clone();
                moved.uid.clone_from(&tail.uid);
                moved.recurrence_id = Some(shifted.clone());
                moved.sequence = 0;
                self.stamp(&mut moved);
                tail.overrides.insert(shifted, moved);
            }
        }
        self.stamp(&mut tail);
        let adjustment = tail.align_start().map_err(ServiceError::InvalidEdited)?;
        tail.validate().map_err(ServiceError::InvalidEdited)?;

        Ok(Revision {
            messages: vec![
                ChangeMessage::new(Method::Request, vec![head.clone()]),
                ChangeMessage::new(Method::Publish, vec![tail.clone()]),
            ],
            components: vec![head, tail],
            start_adjustments: adjustment.into_iter().collect(),
        })
    }

    /// Applies the occurrence's new start and end to a series: DTSTART and
    /// the end move by the shift, a date-time UNTIL moves with them and the
    /// BYDAY weekday anchored on the occurrence follows it.
    fn move_series(&self, series: &mut RecurringComponent) -> ServiceResult<()> {
        series.shift(self.delta);
        if let Some(end) = &self.end {
            let duration = end.local() - self.start.local();
            if let Some(start) = series.dtstart.clone() {
                let end = start.shifted(duration);
                series.set_span(start, end);
            }
        }
        if let Some(rule) = series.rrule.as_mut() {
            shift_rule(rule, self.delta, &self.occurrence, &self.start)?;
        }
        Ok(())
    }

    /// `value` in the form of the occurrence, as far as it can be converted.
    fn comparable(&self, value: &Temporal) -> Temporal {
        comparable(value, &self.occurrence, &mut self.zones.clone())
    }

    fn same_instant(&self, a: &Temporal, b: &Temporal) -> bool {
        self.comparable(a) == self.comparable(b)
    }

    fn is_before_split(&self, value: &Temporal) -> bool {
        self.comparable(value) < self.occurrence
    }

    /// Dates at or after the edited occurrence.
    fn at_or_after_split(&self, values: &[Temporal]) -> Vec<Temporal> {
        values
            .iter()
            .filter(|value| !self.is_before_split(value))
            .cloned()
            .collect()
    }

    fn stamp(&self, component: &mut RecurringComponent) {
        component.dtstamp = Some(self.now.clone());
        component.last_modified = Some(self.now.clone());
    }
}

/// ## Summary
/// Moves a rule along with a start shifted by `delta`.
///
/// ## Errors
/// Returns an error if the shifted rule no longer validates.
pub fn shift_rule(
    rule: &mut RRule,
    delta: TimeDelta,
    occurrence: &Temporal,
    moved_to: &Temporal,
) -> ServiceResult<()> {
    if let Some(until) = rule
        .until()
        .filter(|until| !until.is_date())
        .and_then(|until| until.shifted(delta))
    {
        rule.set_bound(Some(RRuleBound::Until(until)))
            .map_err(RfcError::from)?;
    }

    let from = Weekday::from_chrono(occurrence.date_part().weekday());
    let to = Weekday::from_chrono(moved_to.date_part().weekday());
    if from == to {
        return Ok(());
    }
    if let Some(ByRule::Day(days)) = rule.rule(ByRuleKind::Day) {
        let moved: Vec<_> = days
            .iter()
            .map(|d| {
                let mut d = *d;
                if d.weekday == from {
                    d.weekday = to;
                }
                d
            })
            .collect();
        rule.set_rule(ByRule::Day(moved)).map_err(RfcError::from)?;
    }
    Ok(())
}

/// ## Summary
/// Copy of `original` ending with the occurrence `last`, keeping only the
/// dates and overrides before `split`.
///
/// ## Errors
/// Returns an error if UNTIL cannot be expressed in UTC for a zoned start.
pub(super) fn truncated(
    original: &RecurringComponent,
    split: &Temporal,
    last: &Temporal,
    zones: &mut TimeZoneResolver,
) -> ServiceResult<RecurringComponent> {
    let mut head = original.clone();
    let until = match last.form() {
        Some(DateTimeForm::Zoned { tzid }) => {
            let tz = zones.resolve(tzid).map_err(RfcError::from)?;
            Temporal::utc(to_utc(last.local(), tz).naive_utc())
        }
        _ => last.clone(),
    };
    if let Some(rule) = head.rrule.as_mut() {
        rule.set_bound(Some(RRuleBound::Until(until)))
            .map_err(RfcError::from)?;
    }
    head.exdates.retain(|d| comparable(d, split, zones) < *split);
    head.rdates.retain(|d| comparable(d, split, zones) < *split);
    head.overrides
        .retain(|rid, _| comparable(rid, split, zones) < *split);
    Ok(head)
}

/// `value` in the form of `reference`, as far as it can be converted.
pub(super) fn comparable(
    value: &Temporal,
    reference: &Temporal,
    zones: &mut TimeZoneResolver,
) -> Temporal {
    normalize_to(value, reference, zones).unwrap_or_else(|_| value.clone())
}

fn shift_all(values: &[Temporal], delta: TimeDelta) -> Vec<Temporal> {
    values.iter().filter_map(|v| v.shifted(delta)).collect()
}

#[cfg(test)]
#[path = "reviser_tests.rs"]
mod tests;

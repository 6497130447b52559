//! Edit-scope resolution: which occurrences an edit applies to, and whether
//! the caller has to be asked.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use recurrent_rfc::rfc::ical::core::Temporal;
use recurrent_rfc::rfc::ical::expand::RecurrenceSet;
use serde::{Deserialize, Serialize};

use super::component::{PropertyKind, RecurringComponent, RecurringKind};

/// Rule presence before and after an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RRuleStatus {
    /// No rule before or after.
    Individual,
    /// A rule was added.
    WithNewRepeat,
    /// A rule is present before and after.
    WithExistingRepeat,
    /// The rule was removed.
    HadRepeatBecomingIndividual,
}

impl RRuleStatus {
    #[must_use]
    pub const fn classify(original: &RecurringComponent, edited: &RecurringComponent) -> Self {
        match (original.is_recurring(), edited.is_recurring()) {
            (false, false) => Self::Individual,
            (false, true) => Self::WithNewRepeat,
            (true, true) => Self::WithExistingRepeat,
            (true, false) => Self::HadRepeatBecomingIndividual,
        }
    }
}

/// Which occurrences of a series an edit or deletion applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditScope {
    One,
    All,
    AllIgnoreRecurrences,
    ThisAndFuture,
    ThisAndFutureIgnoreRecurrences,
    Cancel,
}

impl EditScope {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::One => "ONE",
            Self::All => "ALL",
            Self::AllIgnoreRecurrences => "ALL_IGNORE_RECURRENCES",
            Self::ThisAndFuture => "THIS_AND_FUTURE",
            Self::ThisAndFutureIgnoreRecurrences => "THIS_AND_FUTURE_IGNORE_RECURRENCES",
            Self::Cancel => "CANCEL",
        }
    }

    /// True for the variants that keep existing overrides.
    #[must_use]
    pub const fn keeps_overrides(self) -> bool {
        matches!(
            self,
            Self::AllIgnoreRecurrences | Self::ThisAndFutureIgnoreRecurrences
        )
    }
}

impl fmt::Display for EditScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        [
            Self::One,
            Self::All,
            Self::AllIgnoreRecurrences,
            Self::ThisAndFuture,
            Self::ThisAndFutureIgnoreRecurrences,
            Self::Cancel,
        ]
        .into_iter()
        .find(|scope| scope.as_str() == normalized)
        .ok_or_else(|| format!("Unknown edit scope: {s}"))
    }
}

/// One option offered to the caller, with the range of occurrences it
/// would touch. `last` is empty for open-ended series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeChoice {
    pub scope: EditScope,
    pub first: Option<Temporal>,
    pub last: Option<Temporal>,
}

/// Asks the caller which scope to apply. `None` means the caller declined.
pub trait ScopeResolver {
    fn resolve(&mut self, choices: &[ScopeChoice]) -> Option<EditScope>;
}

impl<F> ScopeResolver for F
where
    F: FnMut(&[ScopeChoice]) -> Option<EditScope>,
{
    fn resolve(&mut self, choices: &[ScopeChoice]) -> Option<EditScope> {
        self(choices)
    }
}

/// Changes to these properties are ambiguous on a series and need a scope.
pub const DIALOG_PROPERTIES: &[PropertyKind] = &[
    PropertyKind::Description,
    PropertyKind::Attendees,
    PropertyKind::Categories,
    PropertyKind::Comments,
    PropertyKind::Contacts,
    PropertyKind::Start,
    PropertyKind::RRule,
    PropertyKind::Status,
    PropertyKind::Summary,
    PropertyKind::Url,
];

/// Additional dialog properties for events and to-dos.
pub const TIME_SPAN_DIALOG_PROPERTIES: &[PropertyKind] = &[
    PropertyKind::End,
    PropertyKind::Duration,
    PropertyKind::Location,
    PropertyKind::Priority,
    PropertyKind::Resources,
];

#[must_use]
pub fn requires_dialog(changed: &BTreeSet<PropertyKind>, kind: RecurringKind) -> bool {
    changed.iter().any(|p| {
        DIALOG_PROPERTIES.contains(p)
            || (kind.is_time_span() && TIME_SPAN_DIALOG_PROPERTIES.contains(p))
    })
}

/// ## Summary
/// Scopes to offer for an edit of `occurrence` in `original`.
///
/// ONE is withheld when the rule itself changed, the THIS_AND_FUTURE
/// variants when `occurrence` is the first one, and the
/// `*_IGNORE_RECURRENCES` variants when the series has no overrides.
/// CANCEL is always offered last.
#[must_use]
pub fn scope_choices(
    original: &RecurringComponent,
    set: &RecurrenceSet,
    occurrence: &Temporal,
    rule_changed: bool,
) -> Vec<ScopeChoice> {
    let first = set.iter().next();
    let bounded = original.rrule.as_ref().is_none_or(|r| r.bound().is_some());
    let last = if bounded { set.iter().last() } else { None };
    let is_first = first.as_ref() == Some(occurrence);
    let has_overrides = !original.overrides.is_empty();

    let mut choices = Vec::new();
    if !rule_changed {
        choices.push(ScopeChoice {
            scope: EditScope::One,
            first: Some(occurrence.clone()),
            last: Some(occurrence.clone()),
        });
    }
    choices.push(ScopeChoice {
        scope: EditScope::All,
        first: first.clone(),
        last: last.clone(),
    });
    if has_overrides {
        choices.push(ScopeChoice {
            scope: EditScope::AllIgnoreRecurrences,
            first,
            last: last.clone(),
        });
    }
    if !is_first {
        choices.push(ScopeChoice {
            scope: EditScope::ThisAndFuture,
            first: Some(occurrence.clone()),
            last: last.clone(),
        });
        if has_overrides {
            choices.push(ScopeChoice {
                scope: EditScope::ThisAndFutureIgnoreRecurrences,
                first: Some(occurrence.clone()),
                last,
            });
        }
    }
    choices.push(ScopeChoice {
        scope: EditScope::Cancel,
        first: None,
        last: None,
    });
    choices
}

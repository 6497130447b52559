//! Recurring components: the typed view of VEVENT, VTODO and VJOURNAL that
//! revision works on.
//!
//! Every property that takes part in change detection has its own field;
//! anything else rides along in `other` and is written back unchanged.

use std::collections::{BTreeMap, BTreeSet};

use chrono::TimeDelta;
use recurrent_rfc::error::RfcError;
use recurrent_rfc::rfc::ical::core::property::names;
use recurrent_rfc::rfc::ical::core::{
    Component, ComponentKind, Duration, ICalendar, Property, RRule, Temporal, Value,
};
use recurrent_rfc::rfc::ical::expand::{RecurrenceSet, TimeZoneResolver, normalize_to};
use serde::Serialize;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecurringKind {
    Event,
    Todo,
    Journal,
}

impl RecurringKind {
    #[must_use]
    pub const fn component_kind(self) -> ComponentKind {
        match self {
            Self::Event => ComponentKind::Event,
            Self::Todo => ComponentKind::Todo,
            Self::Journal => ComponentKind::Journal,
        }
    }

    #[must_use]
    pub const fn from_component_kind(kind: ComponentKind) -> Option<Self> {
        match kind {
            ComponentKind::Event => Some(Self::Event),
            ComponentKind::Todo => Some(Self::Todo),
            ComponentKind::Journal => Some(Self::Journal),
            _ => None,
        }
    }

    /// Events and to-dos span time; journals sit on a single point.
    #[must_use]
    pub const fn is_time_span(self) -> bool {
        !matches!(self, Self::Journal)
    }

    /// DTEND for events, DUE for to-dos.
    #[must_use]
    pub const fn end_property(self) -> Option<&'static str> {
        match self {
            Self::Event => Some(names::DTEND),
            Self::Todo => Some(names::DUE),
            Self::Journal => None,
        }
    }
}

/// How a component states where it ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentEnd {
    /// DTEND or DUE.
    At(Temporal),
    Duration(Duration),
}

/// Explicit identity of a master (`recurrence_id` empty) or an override.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKey {
    pub uid: String,
    pub recurrence_id: Option<Temporal>,
}

/// Properties tracked by change detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyKind {
    Summary,
    Description,
    Location,
    Status,
    Url,
    Priority,
    Attendees,
    Categories,
    Comments,
    Contacts,
    Resources,
    Start,
    End,
    Duration,
    RRule,
    ExDates,
    RDates,
    RelatedTo,
    Other,
}

/// Reasons a component fails its validity check.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("Component has no UID")]
    MissingUid,

    #[error("Component has no DTSTART")]
    MissingStart,

    #[error("{0} precedes DTSTART")]
    EndBeforeStart(&'static str),

    #[error("{0} and DTSTART differ in value type")]
    MismatchedEnd(&'static str),

    #[error("VJOURNAL cannot carry an end or duration")]
    JournalWithEnd,

    #[error(transparent)]
    InvalidRule(#[from] RfcError),

    #[error("Override keyed {key} carries RECURRENCE-ID {found}")]
    OverrideKeyMismatch { key: String, found: String },

    #[error("Override {0} belongs to another UID")]
    OverrideUidMismatch(String),

    #[error("Override {0} carries its own RRULE")]
    RecurringOverride(String),
}

/// A start value that was moved onto the first real occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartAdjustment {
    pub uid: String,
    pub from: Temporal,
    pub to: Temporal,
}

/// A VEVENT, VTODO or VJOURNAL together with its overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurringComponent {
    pub kind: RecurringKind,
    pub uid: String,
    pub sequence: u32,
    pub dtstamp: Option<Temporal>,
    pub last_modified: Option<Temporal>,
    pub dtstart: Option<Temporal>,
    pub end: Option<ComponentEnd>,
    pub rrule: Option<RRule>,
    pub exdates: Vec<Temporal>,
    pub rdates: Vec<Temporal>,
    pub recurrence_id: Option<Temporal>,
    pub related_to: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub url: Option<String>,
    pub priority: Option<i32>,
    /// ATTENDEE properties, parameters included.
    pub attendees: Vec<Property>,
    pub categories: Vec<String>,
    pub comments: Vec<String>,
    pub contacts: Vec<String>,
    pub resources: Vec<String>,
    /// Properties without a field of their own, in order of appearance.
    pub other: Vec<Property>,
    /// Nested components such as VALARM.
    pub children: Vec<Component>,
    /// Overrides keyed by the recurrence-id of the occurrence they replace.
    pub overrides: BTreeMap<Temporal, RecurringComponent>,
}

impl RecurringComponent {
    #[must_use]
    pub fn new(kind: RecurringKind, uid: impl Into<String>) -> Self {
        Self {
            kind,
            uid: uid.into(),
            sequence: 0,
            dtstamp: None,
            last_modified: None,
            dtstart: None,
            end: None,
            rrule: None,
            exdates: Vec::new(),
            rdates: Vec::new(),
            recurrence_id: None,
            related_to: None,
            summary: None,
            description: None,
            location: None,
            status: None,
            url: None,
            priority: None,
            attendees: Vec::new(),
            categories: Vec::new(),
            comments: Vec::new(),
            contacts: Vec::new(),
            resources: Vec::new(),
            other: Vec::new(),
            children: Vec::new(),
            overrides: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn key(&self) -> ComponentKey {
        ComponentKey {
            uid: self.uid.clone(),
            recurrence_id: self.recurrence_id.clone(),
        }
    }

    #[must_use]
    pub const fn is_recurring(&self) -> bool {
        self.rrule.is_some()
    }

    /// Length of one occurrence, if the component states an end.
    #[must_use]
    pub fn duration(&self) -> Option<TimeDelta> {
        match self.end.as_ref()? {
            ComponentEnd::Duration(d) => Some(d.to_time_delta()),
            ComponentEnd::At(end) => {
                let start = self.dtstart.as_ref()?;
                let mut resolver = TimeZoneResolver::new();
                let end = normalize_to(end, start, &mut resolver).unwrap_or_else(|_| end.clone());
                Some(end.local() - start.local())
            }
        }
    }

    /// End of an occurrence starting at `start`.
    #[must_use]
    pub fn end_for(&self, start: &Temporal) -> Option<Temporal> {
        self.duration().and_then(|d| start.shifted(d))
    }

    /// ## Summary
    /// Moves the component to `start`, ending at `end` when given.
    ///
    /// The end keeps its representation: a DURATION stays a duration, a
    /// DTEND/DUE stays a date-time. Journals ignore `end`.
    pub fn set_span(&mut self, start: Temporal, end: Option<Temporal>) {
        if let (Some(end), true) = (end, self.kind.is_time_span()) {
            self.end = match self.end {
                Some(ComponentEnd::Duration(_)) => Duration::from_time_delta(end.local() - start.local())
                    .map(ComponentEnd::Duration),
                _ => Some(ComponentEnd::At(end)),
            };
        } else if let Some(ComponentEnd::At(_)) = self.end {
            self.end = self.end_for(&start).map(ComponentEnd::At);
        } else {
            // DURATION or no end: nothing depends on the start
        }
        self.dtstart = Some(start);
    }

    /// Shifts DTSTART and a DTEND/DUE by `delta`.
    pub fn shift(&mut self, delta: TimeDelta) {
        if let Some(start) = self.dtstart.as_ref().and_then(|s| s.shifted(delta)) {
            self.dtstart = Some(start);
        }
        if let Some(ComponentEnd::At(end)) = &self.end {
            if let Some(end) = end.shifted(delta) {
                self.end = Some(ComponentEnd::At(end));
            }
        }
    }

    /// ## Summary
    /// Builds the recurrence set of this component: DTSTART, RRULE, EXDATE
    /// and RDATE.
    ///
    /// ## Errors
    /// Returns `ComponentError::MissingStart` without DTSTART and
    /// `ComponentError::InvalidRule` when the rule or a date cannot be used.
    pub fn recurrence_set(&self) -> Result<RecurrenceSet, ComponentError> {
        let start = self.dtstart.clone().ok_or(ComponentError::MissingStart)?;
        let mut set = RecurrenceSet::new(start);
        if let Some(rule) = &self.rrule {
            set = set.with_rule(rule.clone())?;
        }
        Ok(set.with_exdates(&self.exdates)?.with_rdates(&self.rdates)?)
    }

    /// ## Summary
    /// Checks the component for internal consistency.
    ///
    /// ## Errors
    /// Returns the first [`ComponentError`] found.
    pub fn validate(&self) -> Result<(), ComponentError> {
        if self.uid.trim().is_empty() {
            return Err(ComponentError::MissingUid);
        }
        let start = self.dtstart.as_ref().ok_or(ComponentError::MissingStart)?;

        match (&self.end, self.kind.end_property()) {
            (None, _) => {}
            (Some(_), None) => return Err(ComponentError::JournalWithEnd),
            (Some(ComponentEnd::Duration(d)), Some(_)) => {
                if d.as_seconds() < 0 {
                    return Err(ComponentError::EndBeforeStart(names::DURATION));
                }
            }
            (Some(ComponentEnd::At(end)), Some(name)) => {
                if end.is_date() != start.is_date() {
                    return Err(ComponentError::MismatchedEnd(name));
                }
                if self.duration().is_some_and(|d| d < TimeDelta::zero()) {
                    return Err(ComponentError::EndBeforeStart(name));
                }
            }
        }

        self.recurrence_set()?;

        for (key, child) in &self.overrides {
            if child.recurrence_id.as_ref() != Some(key) {
                return Err(ComponentError::OverrideKeyMismatch {
                    key: key.to_string(),
                    found: child
                        .recurrence_id
                        .as_ref()
                        .map_or_else(String::new, ToString::to_string),
                });
            }
            if child.uid != self.uid {
                return Err(ComponentError::OverrideUidMismatch(key.to_string()));
            }
            if child.rrule.is_some() {
                return Err(ComponentError::RecurringOverride(key.to_string()));
            }
        }
        Ok(())
    }

    /// ## Summary
    /// Properties whose value differs between `self` and `other`.
    ///
    /// Overrides, SEQUENCE and the timestamps are not compared.
    #[must_use]
    pub fn changed_properties(&self, other: &Self) -> BTreeSet<PropertyKind> {
        let mut changed = BTreeSet::new();
        let mut mark = |differs: bool, kind: PropertyKind| {
            if differs {
                changed.insert(kind);
            }
        };
        mark(self.summary != other.summary, PropertyKind::Summary);
        mark(self.description != other.description, PropertyKind::Description);
        mark(self.location != other.location, PropertyKind::Location);
        mark(self.status != other.status, PropertyKind::Status);
        mark(self.url != other.url, PropertyKind::Url);
        mark(self.priority != other.priority, PropertyKind::Priority);
        mark(self.attendees != other.attendees, PropertyKind::Attendees);
        mark(self.categories != other.categories, PropertyKind::Categories);
        mark(self.comments != other.comments, PropertyKind::Comments);
        mark(self.contacts != other.contacts, PropertyKind::Contacts);
        mark(self.resources != other.resources, PropertyKind::Resources);
        mark(self.dtstart != other.dtstart, PropertyKind::Start);
        mark(self.rrule != other.rrule, PropertyKind::RRule);
        mark(self.exdates != other.exdates, PropertyKind::ExDates);
        mark(self.rdates != other.rdates, PropertyKind::RDates);
        mark(self.related_to != other.related_to, PropertyKind::RelatedTo);
        mark(
            self.other != other.other || self.children != other.children,
            PropertyKind::Other,
        );
        if self.end != other.end {
            let kind = if matches!(other.end, Some(ComponentEnd::Duration(_)))
                || matches!(self.end, Some(ComponentEnd::Duration(_)))
            {
                PropertyKind::Duration
            } else {
                PropertyKind::End
            };
            mark(true, kind);
        }
        changed
    }

    /// ## Summary
    /// Moves DTSTART (and a DTEND/DUE with it) onto the first occurrence
    /// the rule really produces.
    ///
    /// ## Errors
    /// Returns a [`ComponentError`] if the recurrence set cannot be built.
    pub fn align_start(&mut self) -> Result<Option<StartAdjustment>, ComponentError> {
        if self.rrule.is_none() {
            return Ok(None);
        }
        let Some(from) = self.dtstart.clone() else {
            return Err(ComponentError::MissingStart);
        };
        let set = self.recurrence_set()?;
        let Some(to) = set.first_occurrence() else {
            return Ok(None);
        };
        if to == from {
            return Ok(None);
        }

        tracing::debug!(uid = %self.uid, %from, %to, "Aligning start with first occurrence");
        self.shift(to.local() - from.local());
        Ok(Some(StartAdjustment {
            uid: self.uid.clone(),
            from,
            to,
        }))
    }

    /// ## Summary
    /// Reads a VEVENT, VTODO or VJOURNAL.
    ///
    /// ## Errors
    /// Returns `ServiceError::ParseError` for other component kinds.
    pub fn from_component(component: &Component) -> ServiceResult<Self> {
        let kind = RecurringKind::from_component_kind(component.kind).ok_or_else(|| {
            ServiceError::ParseError(format!("{} is not a recurring component", component.name))
        })?;
        let mut out = Self::new(kind, "");
        for prop in &component.properties {
            out.read_property(prop);
        }
        out.children.clone_from(&component.children);
        Ok(out)
    }

    fn read_property(&mut self, prop: &Property) {
        let end_name = self.kind.end_property();
        match (prop.name.as_str(), &prop.value) {
            (names::UID, value) => self.uid = text_of(value).unwrap_or_default(),
            (names::SEQUENCE, Value::Integer(n)) => self.sequence = u32::try_from(*n).unwrap_or(0),
            (names::DTSTAMP, Value::Temporal(t)) => self.dtstamp = Some(t.clone()),
            (names::LAST_MODIFIED, Value::Temporal(t)) => self.last_modified = Some(t.clone()),
            (names::DTSTART, Value::Temporal(t)) => self.dtstart = Some(t.clone()),
            (names::RECURRENCE_ID, Value::Temporal(t)) => self.recurrence_id = Some(t.clone()),
            (name, Value::Temporal(t)) if Some(name) == end_name => {
                self.end = Some(ComponentEnd::At(t.clone()));
            }
            (names::DURATION, Value::Duration(d)) => self.end = Some(ComponentEnd::Duration(*d)),
            (names::RRULE, Value::Recur(rule)) => self.rrule = Some((**rule).clone()),
            (names::EXDATE, Value::TemporalList(list)) => self.exdates.extend(list.iter().cloned()),
            (names::RDATE, Value::TemporalList(list)) => self.rdates.extend(list.iter().cloned()),
            (names::RELATED_TO, value) => self.related_to = text_of(value),
            (names::SUMMARY, value) => self.summary = text_of(value),
            (names::DESCRIPTION, value) => self.description = text_of(value),
            (names::LOCATION, value) => self.location = text_of(value),
            (names::STATUS, value) => self.status = text_of(value),
            (names::URL, value) => self.url = text_of(value),
            (names::PRIORITY, Value::Integer(n)) => self.priority = Some(*n),
            (names::ATTENDEE, _) => self.attendees.push(prop.clone()),
            (names::CATEGORIES, Value::TextList(list)) => self.categories.extend(list.iter().cloned()),
            (names::RESOURCES, Value::TextList(list)) => self.resources.extend(list.iter().cloned()),
            (names::COMMENT, value) => self.comments.extend(text_of(value)),
            (names::CONTACT, value) => self.contacts.extend(text_of(value)),
            _ => self.other.push(prop.clone()),
        }
    }

    /// Writes the component itself, without its overrides.
    #[must_use]
    pub fn to_component(&self) -> Component {
        let mut c = Component::new(self.kind.component_kind());
        c.add_property(Property::text(names::UID, &self.uid));
        if let Some(stamp) = &self.dtstamp {
            c.add_property(Property::temporal(names::DTSTAMP, stamp.clone()));
        }
        c.add_property(Property::integer(
            names::SEQUENCE,
            i32::try_from(self.sequence).unwrap_or(i32::MAX),
        ));
        if let Some(start) = &self.dtstart {
            c.add_property(Property::temporal(names::DTSTART, start.clone()));
        }
        if let Some(rid) = &self.recurrence_id {
            c.add_property(Property::temporal(names::RECURRENCE_ID, rid.clone()));
        }
        match (&self.end, self.kind.end_property()) {
            (Some(ComponentEnd::At(end)), Some(name)) => {
                c.add_property(Property::temporal(name, end.clone()));
            }
            (Some(ComponentEnd::Duration(d)), _) => {
                c.add_property(Property::duration(names::DURATION, *d));
            }
            _ => {}
        }
        if let Some(rule) = &self.rrule {
            c.add_property(Property::recur(names::RRULE, rule.clone()));
        }
        for group in same_kind_groups(&self.exdates) {
            c.add_property(Property::temporal_list(names::EXDATE, group));
        }
        for group in same_kind_groups(&self.rdates) {
            c.add_property(Property::temporal_list(names::RDATE, group));
        }
        if let Some(related) = &self.related_to {
            c.add_property(Property::text(names::RELATED_TO, related));
        }
        let texts = [
            (names::SUMMARY, &self.summary),
            (names::DESCRIPTION, &self.description),
            (names::LOCATION, &self.location),
            (names::STATUS, &self.status),
        ];
        for (name, value) in texts {
            if let Some(value) = value {
                c.add_property(Property::text(name, value));
            }
        }
        if let Some(url) = &self.url {
            c.add_property(Property::from_raw(names::URL, url));
        }
        if let Some(priority) = self.priority {
            c.add_property(Property::integer(names::PRIORITY, priority));
        }
        c.properties.extend(self.attendees.iter().cloned());
        if !self.categories.is_empty() {
            c.add_property(Property::text_list(names::CATEGORIES, self.categories.clone()));
        }
        if !self.resources.is_empty() {
            c.add_property(Property::text_list(names::RESOURCES, self.resources.clone()));
        }
        for comment in &self.comments {
            c.add_property(Property::text(names::COMMENT, comment));
        }
        for contact in &self.contacts {
            c.add_property(Property::text(names::CONTACT, contact));
        }
        if let Some(modified) = &self.last_modified {
            c.add_property(Property::temporal(names::LAST_MODIFIED, modified.clone()));
        }
        c.properties.extend(self.other.iter().cloned());
        c.children.clone_from(&self.children);
        c
    }

    /// The component followed by its overrides in recurrence-id order.
    #[must_use]
    pub fn to_components(&self) -> Vec<Component> {
        std::iter::once(self.to_component())
            .chain(self.overrides.values().map(Self::to_component))
            .collect()
    }

    /// ## Summary
    /// Groups the schedulable components of a calendar by UID, attaching
    /// each override to its master. Overrides without a master are returned
    /// as standalone entries.
    ///
    /// An override's recurrence-id is re-expressed in the form of the
    /// master's DTSTART, so a UTC RECURRENCE-ID on a zoned series keys the
    /// same occurrence the expansion produces.
    ///
    /// ## Errors
    /// Returns an error if a component cannot be read.
    pub fn group(ical: &ICalendar) -> ServiceResult<Vec<Self>> {
        let mut masters: Vec<Self> = Vec::new();
        let mut detached: Vec<Self> = Vec::new();
        for component in ical.schedulable() {
            let rc = Self::from_component(component)?;
            if rc.recurrence_id.is_some() {
                detached.push(rc);
            } else {
                masters.push(rc);
            }
        }

        let mut zones = TimeZoneResolver::new();
        for mut child in detached {
            let Some(rid) = child.recurrence_id.clone() else {
                continue;
            };
            match masters.iter_mut().find(|m| m.uid == child.uid) {
                Some(master) => {
                    let rid = match &master.dtstart {
                        Some(start) => {
                            normalize_to(&rid, start, &mut zones).unwrap_or_else(|err| {
                                tracing::warn!(
                                    uid = %child.uid,
                                    %rid,
                                    %err,
                                    "Recurrence-id kept as written"
                                );
                                rid
                            })
                        }
                        None => rid,
                    };
                    child.recurrence_id = Some(rid.clone());
                    master.overrides.insert(rid, child);
                }
                None => {
                    tracing::debug!(uid = %child.uid, %rid, "Override without master");
                    masters.push(child);
                }
            }
        }
        Ok(masters)
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Text(s) | Value::Unknown(s) => Some(s.clone()),
        _ => None,
    }
}

/// Splits a date list into runs sharing kind and zone, so each run fits one
/// property with one set of parameters.
fn same_kind_groups(values: &[Temporal]) -> Vec<Vec<Temporal>> {
    let mut groups: Vec<Vec<Temporal>> = Vec::new();
    for value in values {
        match groups.last_mut() {
            Some(group) if group.first().is_some_and(|f| f.same_kind(value)) => {
                group.push(value.clone());
            }
            _ => groups.push(vec![value.clone()]),
        }
    }
    groups
}

#[cfg(test)]
#[path = "component_tests.rs"]
mod tests;

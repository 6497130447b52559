//! Generic component tree (RFC 5545 §3.4-3.6).
//!
//! Components the engine does not interpret (VTIMEZONE, VALARM, X-names)
//! stay in this form and are written back as they were read.

use std::fmt;

use super::property::names;
use super::{Property, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Calendar,
    Event,
    Todo,
    Journal,
    Timezone,
    Alarm,
    /// Anything else; [`Component::name`] holds what was written.
    Other,
}

const KIND_NAMES: &[(ComponentKind, &str)] = &[
    (ComponentKind::Calendar, "VCALENDAR"),
    (ComponentKind::Event, "VEVENT"),
    (ComponentKind::Todo, "VTODO"),
    (ComponentKind::Journal, "VJOURNAL"),
    (ComponentKind::Timezone, "VTIMEZONE"),
    (ComponentKind::Alarm, "VALARM"),
];

impl ComponentKind {
    /// Kind for a BEGIN/END name, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        KIND_NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map_or(Self::Other, |(kind, _)| *kind)
    }

    /// Canonical name, `None` for [`ComponentKind::Other`].
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        KIND_NAMES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, n)| *n)
    }

    /// VEVENT, VTODO and VJOURNAL: the kinds that can carry a recurrence.
    #[must_use]
    pub const fn is_schedulable(self) -> bool {
        matches!(self, Self::Event | Self::Todo | Self::Journal)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("X-COMPONENT"))
    }
}

/// One BEGIN/END block: its properties in order, then nested blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub kind: ComponentKind,
    /// Upper-cased name as written, kept for X-components.
    pub name: String,
    pub properties: Vec<Property>,
    pub children: Vec<Component>,
}

impl Component {
    #[must_use]
    pub fn new(kind: ComponentKind) -> Self {
        Self::named(kind.to_string())
    }

    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into().to_ascii_uppercase();
        Self {
            kind: ComponentKind::from_name(&name),
            name,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn add_property(&mut self, prop: Property) {
        self.properties.push(prop);
    }

    pub fn add_child(&mut self, child: Self) {
        self.children.push(child);
    }

    #[must_use]
    pub fn get_property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.get_property(names::UID)?.value.as_text()
    }
}

/// A VCALENDAR document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ICalendar {
    pub root: Component,
}

impl ICalendar {
    /// Empty VCALENDAR carrying VERSION 2.0 and `prodid`.
    #[must_use]
    pub fn new(prodid: impl Into<String>) -> Self {
        let mut root = Component::new(ComponentKind::Calendar);
        root.add_property(Property::text(names::VERSION, "2.0"));
        root.add_property(Property::text(names::PRODID, prodid));
        Self { root }
    }

    #[must_use]
    pub fn prodid(&self) -> Option<&str> {
        self.root.get_property(names::PRODID)?.value.as_text()
    }

    /// iTIP method of the document, if any.
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        match &self.root.get_property(names::METHOD)?.value {
            Value::Text(s) | Value::Unknown(s) => Some(s),
            _ => None,
        }
    }

    /// Sets the iTIP method, replacing any previous one.
    pub fn set_method(&mut self, method: impl Into<String>) {
        self.root
            .properties
            .retain(|p| !p.name.eq_ignore_ascii_case(names::METHOD));
        self.root.add_property(Property::text(names::METHOD, method));
    }

    pub fn add_component(&mut self, component: Component) {
        self.root.add_child(component);
    }

    /// VEVENT, VTODO and VJOURNAL children in document order.
    pub fn schedulable(&self) -> impl Iterator<Item = &Component> {
        self.root
            .children
            .iter()
            .filter(|c| c.kind.is_schedulable())
    }
}

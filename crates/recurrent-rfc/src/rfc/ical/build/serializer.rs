//! iCalendar serializer (RFC 5545).
//!
//! Writes components with a fixed property and child order so equal
//! models always produce byte-identical text.

use std::cmp::Ordering;

use super::escape::{escape_param_value, escape_text};
use super::fold::fold_line;
use crate::rfc::ical::core::property::names;
use crate::rfc::ical::core::{Component, ComponentKind, ICalendar, Parameter, Property, Value};

/// Serializes an iCalendar document to a string.
#[must_use]
pub fn serialize(ical: &ICalendar) -> String {
    serialize_component(&ical.root)
}

/// Serializes a component and its children.
#[must_use]
pub fn serialize_component(component: &Component) -> String {
    let mut out = fold_line(&format!("BEGIN:{}", component.name));
    for prop in canonical_property_order(&component.properties, component.kind) {
        out.push_str(&serialize_property(prop));
    }
    for child in canonical_component_order(&component.children) {
        out.push_str(&serialize_component(child));
    }
    out.push_str(&fold_line(&format!("END:{}", component.name)));
    out
}

/// Serializes a property to a folded content line.
#[must_use]
pub fn serialize_property(prop: &Property) -> String {
    let mut line = prop.name.clone();
    for param in canonical_param_order(&prop.params) {
        line.push(';');
        line.push_str(&serialize_parameter(param));
    }
    line.push(':');
    match &prop.value {
        Value::Text(s) => line.push_str(&escape_text(s)),
        Value::TextList(list) => line.push_str(
            &list
                .iter()
                .map(|s| escape_text(s))
                .collect::<Vec<_>>()
                .join(","),
        ),
        _ => line.push_str(&prop.raw_value),
    }
    fold_line(&line)
}

#[must_use]
pub fn serialize_parameter(param: &Parameter) -> String {
    let values: Vec<String> = param.values.iter().map(|v| escape_param_value(v)).collect();
    format!("{}={}", param.name, values.join(","))
}

const CALENDAR_ORDER: &[&str] = &[
    names::VERSION,
    names::PRODID,
    names::CALSCALE,
    names::METHOD,
];

const SCHEDULABLE_ORDER: &[&str] = &[
    names::UID,
    names::DTSTAMP,
    names::DTSTART,
    names::DTEND,
    names::DUE,
    names::DURATION,
    names::RRULE,
    names::RDATE,
    names::EXDATE,
    names::RECURRENCE_ID,
    names::SUMMARY,
    names::DESCRIPTION,
    names::LOCATION,
    names::STATUS,
    names::PRIORITY,
    names::ORGANIZER,
    names::ATTENDEE,
    names::CATEGORIES,
    names::COMMENT,
    names::CONTACT,
    names::RESOURCES,
    names::RELATED_TO,
    names::URL,
    names::LAST_MODIFIED,
    names::SEQUENCE,
];

/// Known properties first in the kind's order, then the rest as they came.
fn canonical_property_order(props: &[Property], kind: ComponentKind) -> Vec<&Property> {
    let order: &[&str] = match kind {
        ComponentKind::Calendar => CALENDAR_ORDER,
        ComponentKind::Event | ComponentKind::Todo | ComponentKind::Journal => SCHEDULABLE_ORDER,
        _ => &[],
    };

    let mut ordered: Vec<&Property> = Vec::with_capacity(props.len());
    for &name in order {
        ordered.extend(props.iter().filter(|p| p.name.eq_ignore_ascii_case(name)));
    }
    ordered.extend(
        props
            .iter()
            .filter(|p| !order.iter().any(|n| p.name.eq_ignore_ascii_case(n))),
    );
    ordered
}

fn canonical_param_order(params: &[Parameter]) -> Vec<&Parameter> {
    let mut ordered: Vec<&Parameter> = params.iter().collect();
    ordered.sort_by_key(|p| match p.name.as_str() {
        "VALUE" => 0,
        "TZID" => 1,
        _ => 2,
    });
    ordered
}

/// Timezones first, then schedulable components by UID with the master
/// ahead of its overrides, then anything else as it came.
fn canonical_component_order(children: &[Component]) -> Vec<&Component> {
    let mut ordered: Vec<&Component> = children.iter().collect();
    ordered.sort_by(|a, b| {
        rank(a.kind)
            .cmp(&rank(b.kind))
            .then_with(|| match (a.kind.is_schedulable(), b.kind.is_schedulable()) {
                (true, true) => cmp_by_uid_recurrence(a, b),
                _ => Ordering::Equal,
            })
    });
    ordered
}

const fn rank(kind: ComponentKind) -> u8 {
    match kind {
        ComponentKind::Timezone => 0,
        ComponentKind::Event => 1,
        ComponentKind::Todo => 2,
        ComponentKind::Journal => 3,
        _ => 4,
    }
}

fn cmp_by_uid_recurrence(a: &Component, b: &Component) -> Ordering {
    let recurrence_id = |c: &Component| {
        c.get_property(names::RECURRENCE_ID)
            .and_then(|p| p.value.as_temporal().cloned())
    };
    a.uid()
        .unwrap_or("")
        .cmp(b.uid().unwrap_or(""))
        .then_with(|| recurrence_id(a).cmp(&recurrence_id(b)))
}

//! iCalendar property and content line types (RFC 5545 §3.1, §3.8).

use super::{Duration, Parameter, RRule, Temporal, Value};

/// A raw content line as parsed from iCalendar text, before value typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property name (normalized to uppercase).
    pub name: String,
    pub params: Vec<Parameter>,
    /// Raw value string (after unfolding, before unescaping).
    pub raw_value: String,
}

impl ContentLine {
    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .and_then(Parameter::value)
    }
}

/// A fully parsed iCalendar property.
///
/// `raw_value` holds the wire form for every value type except TEXT, which
/// the serializer escapes from the typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property name (normalized to uppercase).
    pub name: String,
    pub params: Vec<Parameter>,
    pub value: Value,
    pub raw_value: String,
}

impl Property {
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            raw_value: value.clone(),
            value: Value::Text(value),
        }
    }

    #[must_use]
    pub fn text_list(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            raw_value: values.join(","),
            value: Value::TextList(values),
        }
    }

    #[must_use]
    pub fn integer(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: Value::Integer(value),
            raw_value: value.to_string(),
        }
    }

    /// DATE or DATE-TIME property; adds `VALUE=DATE` or `TZID` as needed.
    #[must_use]
    pub fn temporal(name: impl Into<String>, value: Temporal) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: temporal_params(&value),
            raw_value: value.to_string(),
            value: Value::Temporal(value),
        }
    }

    /// ## Summary
    /// DATE or DATE-TIME list property. Parameters come from the first entry,
    /// so callers keep every entry in one kind and zone.
    #[must_use]
    pub fn temporal_list(name: impl Into<String>, values: Vec<Temporal>) -> Self {
        let params = values.first().map(temporal_params).unwrap_or_default();
        let raw_value = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        Self {
            name: name.into().to_ascii_uppercase(),
            params,
            raw_value,
            value: Value::TemporalList(values),
        }
    }

    #[must_use]
    pub fn duration(name: impl Into<String>, value: Duration) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            raw_value: value.to_string(),
            value: Value::Duration(value),
        }
    }

    #[must_use]
    pub fn recur(name: impl Into<String>, rule: RRule) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            raw_value: rule.to_string(),
            value: Value::Recur(Box::new(rule)),
        }
    }

    /// Property whose value is kept as written (URL, ATTENDEE, X-props).
    #[must_use]
    pub fn from_raw(name: impl Into<String>, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: Value::Unknown(raw.clone()),
            raw_value: raw,
        }
    }

    /// Creates a property from a content line with an uninterpreted value.
    #[must_use]
    pub fn from_content_line(line: ContentLine) -> Self {
        Self {
            name: line.name,
            params: line.params,
            value: Value::Unknown(line.raw_value.clone()),
            raw_value: line.raw_value,
        }
    }

    #[must_use]
    pub fn with_param(mut self, param: Parameter) -> Self {
        self.set_param(param);
        self
    }

    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        self.get_param(name).and_then(Parameter::value)
    }

    /// Sets a parameter, replacing any existing parameter with the same name.
    pub fn set_param(&mut self, param: Parameter) {
        self.params.retain(|p| p.name != param.name);
        self.params.push(param);
    }
}

fn temporal_params(value: &Temporal) -> Vec<Parameter> {
    match value {
        Temporal::Date(_) => vec![Parameter::value_type("DATE")],
        Temporal::DateTime(dt) => dt.tzid().map(Parameter::tzid).into_iter().collect(),
    }
}

/// Property names the engine reads or writes.
pub mod names {
    // Calendar properties
    pub const CALSCALE: &str = "CALSCALE";
    pub const METHOD: &str = "METHOD";
    pub const PRODID: &str = "PRODID";
    pub const VERSION: &str = "VERSION";

    // Descriptive
    pub const CATEGORIES: &str = "CATEGORIES";
    pub const COMMENT: &str = "COMMENT";
    pub const DESCRIPTION: &str = "DESCRIPTION";
    pub const LOCATION: &str = "LOCATION";
    pub const PRIORITY: &str = "PRIORITY";
    pub const RESOURCES: &str = "RESOURCES";
    pub const STATUS: &str = "STATUS";
    pub const SUMMARY: &str = "SUMMARY";

    // Date and time
    pub const DTEND: &str = "DTEND";
    pub const DUE: &str = "DUE";
    pub const DTSTART: &str = "DTSTART";
    pub const DURATION: &str = "DURATION";

    // Relationship
    pub const ATTENDEE: &str = "ATTENDEE";
    pub const CONTACT: &str = "CONTACT";
    pub const ORGANIZER: &str = "ORGANIZER";
    pub const RECURRENCE_ID: &str = "RECURRENCE-ID";
    pub const RELATED_TO: &str = "RELATED-TO";
    pub const UID: &str = "UID";
    pub const URL: &str = "URL";

    // Recurrence
    pub const EXDATE: &str = "EXDATE";
    pub const RDATE: &str = "RDATE";
    pub const RRULE: &str = "RRULE";

    // Change management
    pub const DTSTAMP: &str = "DTSTAMP";
    pub const LAST_MODIFIED: &str = "LAST-MODIFIED";
    pub const SEQUENCE: &str = "SEQUENCE";
}

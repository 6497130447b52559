//! iTIP-style change messages (RFC 5546 methods) carrying revised components.

use std::fmt;

use recurrent_core::constants::DEFAULT_PRODID;
use recurrent_rfc::rfc::ical::build::serialize;
use recurrent_rfc::rfc::ical::core::ICalendar;
use serde::Serialize;

use super::component::RecurringComponent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// A new or standalone component.
    Publish,
    /// A change to a component the receiver already has.
    Request,
    Cancel,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Publish => "PUBLISH",
            Self::Request => "REQUEST",
            Self::Cancel => "CANCEL",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outbound message: a method and the components it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeMessage {
    pub method: Method,
    pub components: Vec<RecurringComponent>,
}

impl ChangeMessage {
    #[must_use]
    pub const fn new(method: Method, components: Vec<RecurringComponent>) -> Self {
        Self { method, components }
    }

    /// ## Summary
    /// Builds the VCALENDAR for this message: METHOD, then every component
    /// followed by its overrides.
    #[must_use]
    pub fn to_ical(&self, prodid: &str) -> ICalendar {
        let mut ical = ICalendar::new(prodid);
        ical.set_method(self.method.as_str());
        for component in &self.components {
            for part in component.to_components() {
                ical.add_component(part);
            }
        }
        ical
    }
}

impl fmt::Display for ChangeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize(&self.to_ical(DEFAULT_PRODID)))
    }
}

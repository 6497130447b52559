//! iCalendar RFC 5545 implementation, limited to what recurring components
//! need.
//!
//! - `core`: value model (temporal values, durations, rules, components)
//! - `parse`: parsers for content lines, values and whole documents
//! - `build`: serializers
//! - `expand`: recurrence expansion
//!
//! ## Example
//!
//! ```rust
//! use recurrent_rfc::rfc::ical::core::{RRule, Temporal};
//! use recurrent_rfc::rfc::ical::expand::RecurrenceSet;
//!
//! let rule: RRule = "FREQ=WEEKLY;BYDAY=MO,WE;COUNT=4".parse().unwrap();
//! let start = Temporal::floating(
//!     chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
//!         .unwrap()
//!         .and_hms_opt(9, 0, 0)
//!         .unwrap(),
//! );
//! let set = RecurrenceSet::new(start).with_rule(rule).unwrap();
//! assert_eq!(set.iter().count(), 4);
//! ```

pub mod build;
pub mod core;
pub mod expand;
pub mod parse;

#[cfg(test)]
mod tests;

pub use build::serialize;
pub use core::{Component, ComponentKind, ICalendar, Parameter, Property, RRule, Temporal};
pub use parse::{ParseError, ParseResult, parse};

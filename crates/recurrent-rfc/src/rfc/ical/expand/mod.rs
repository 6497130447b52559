//! Recurrence expansion (RFC 5545 §3.3.10, §3.8.5).
//!
//! - `combinator`: the BYxxx pipeline run once per frequency period
//! - `recurrence`: lazy occurrence sets with EXDATE/RDATE and windowing
//! - `timezone`: TZID resolution and form conversion

mod calendar;
mod combinator;
mod recurrence;
mod timezone;

pub use combinator::{Granularity, Pipeline};
pub use recurrence::{
    ExpansionError, ExpansionLimits, Occurrences, RecurrenceSet, RuleOccurrences, Window,
};
pub use timezone::{
    ConversionError, TimeZoneResolver, from_utc, instant_of, normalize_to, to_utc, to_utc_strict,
};

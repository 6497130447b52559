//! iCalendar value model (RFC 5545 §3).

mod component;
mod datetime;
mod duration;
mod parameter;
pub mod property;
mod rrule;
mod value;

pub use component::{Component, ComponentKind, ICalendar};
pub use datetime::{DateTime, DateTimeForm, Temporal};
pub use duration::Duration;
pub use parameter::Parameter;
pub use property::{ContentLine, Property};
pub use rrule::{ByRule, ByRuleKind, Frequency, RRule, RRuleBound, Weekday, WeekdayNum};
pub use value::Value;

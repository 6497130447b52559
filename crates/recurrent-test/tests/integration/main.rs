//! Cross-crate integration tests.

mod expansion;
mod revision;
mod rrule_oracle;
mod rule_text;

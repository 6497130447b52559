//! Command-line value parsers.

use recurrent_rfc::rfc::ical::core::{RRule, Temporal};
use recurrent_rfc::rfc::ical::parse::values::parse_temporal;
use recurrent_service::series::EditScope;

/// ## Summary
/// Parses a DATE or DATE-TIME as written in iCalendar text, optionally
/// prefixed with a zone: `20240108`, `20240108T093000`, `20240108T093000Z`
/// or `TZID=Europe/Berlin:20240108T093000`.
///
/// ## Errors
/// Returns a message suitable for clap when the value does not parse.
pub fn temporal(s: &str) -> Result<Temporal, String> {
    let (tzid, value) = match s.strip_prefix("TZID=") {
        Some(rest) => {
            let (tzid, value) = rest
                .split_once(':')
                .ok_or_else(|| format!("Missing ':' after TZID in {s:?}"))?;
            (Some(tzid), value)
        }
        None => (None, s),
    };
    parse_temporal(value, None, tzid, 1, 1).map_err(|e| e.to_string())
}

/// ## Errors
/// Returns a message suitable for clap when the rule is invalid.
pub fn rule(s: &str) -> Result<RRule, String> {
    s.trim_start_matches("RRULE:")
        .parse::<RRule>()
        .map_err(|e| e.to_string())
}

/// ## Errors
/// Returns a message suitable for clap for an unknown scope name.
pub fn scope(s: &str) -> Result<EditScope, String> {
    s.parse()
}

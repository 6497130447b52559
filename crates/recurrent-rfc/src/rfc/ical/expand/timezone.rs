//! Time-zone resolution and conversion between the three date-time forms.
//!
//! Zoned values are resolved against the IANA database shipped with
//! `chrono-tz`. Non-IANA identifiers common in calendar clients (vendor path
//! prefixes, Windows zone names, retired aliases) are normalized first with
//! the ICU4X zone parsers.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;

use crate::rfc::ical::core::{DateTimeForm, Temporal};

/// Error during time-zone conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Unknown or invalid time-zone identifier.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Local time skipped by a DST transition.
    #[error("Non-existent time (DST gap): {0}")]
    NonExistentTime(String),
}

/// Resolver for time-zone identifiers, caching every successful lookup.
#[derive(Debug, Default, Clone)]
pub struct TimeZoneResolver {
    cache: HashMap<String, Tz>,
}

impl TimeZoneResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Resolves a TZID to a `chrono_tz::Tz`.
    ///
    /// ## Errors
    /// Returns `ConversionError::UnknownTimezone` if the identifier names no
    /// known zone, even after normalization.
    ///
    /// ## Side Effects
    /// Caches successful resolutions.
    pub fn resolve(&mut self, tzid: &str) -> Result<Tz, ConversionError> {
        if let Some(tz) = self.cache.get(tzid) {
            return Ok(*tz);
        }

        let Some(tz) = normalize_tzid(tzid) else {
            tracing::warn!(tzid, "Unknown timezone identifier");
            return Err(ConversionError::UnknownTimezone(tzid.to_string()));
        };

        self.cache.insert(tzid.to_string(), tz);
        Ok(tz)
    }
}

/// Maps a TZID to a zone, trying the IANA name, the Windows name, and the
/// tail of `/vendor/...`-style paths in that order.
fn normalize_tzid(tzid: &str) -> Option<Tz> {
    let trimmed = tzid.trim();
    if let Some(tz) = iana_zone(trimmed).or_else(|| windows_zone(trimmed)) {
        return Some(tz);
    }
    if trimmed.starts_with('/') {
        // "/mozilla.org/20050126_1/America/New_York" and friends: the zone
        // name is some suffix of the path.
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        return (1..segments.len()).find_map(|skip| iana_zone(&segments[skip..].join("/")));
    }
    None
}

/// IANA name or alias, canonicalized ("Europe/Kiev" and "Europe/Kyiv" agree).
fn iana_zone(name: &str) -> Option<Tz> {
    if let Ok(tz) = Tz::from_str(name) {
        return Some(tz);
    }
    let parsed = IanaParserExtended::new().parse(name);
    if parsed.time_zone == icu::time::TimeZone::UNKNOWN {
        return None;
    }
    Tz::from_str(parsed.canonical).ok()
}

/// Windows zone name ("India Standard Time") via the CLDR mapping.
fn windows_zone(name: &str) -> Option<Tz> {
    let zone = WindowsParser::new().parse(name, None)?;
    IanaParserExtended::new()
        .iter()
        .find(|entry| entry.time_zone == zone)
        .and_then(|entry| Tz::from_str(entry.canonical).ok())
}

/// ## Summary
/// Converts a wall-clock time in `tz` to an instant.
///
/// Ambiguous times (DST fold) take the earlier instant. Times skipped by a
/// DST gap are moved forward by one hour.
#[must_use]
pub fn to_utc(local: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            let shifted = local
                .checked_add_signed(TimeDelta::hours(1))
                .unwrap_or(local);
            tz.from_local_datetime(&shifted)
                .earliest()
                .map_or_else(|| local.and_utc(), |dt| dt.with_timezone(&Utc))
        }
    }
}

/// ## Summary
/// Strict variant of [`to_utc`].
///
/// ## Errors
/// Returns `ConversionError::NonExistentTime` for a time inside a DST gap.
pub fn to_utc_strict(local: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>, ConversionError> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ConversionError::NonExistentTime(format!("{local} in timezone {tz}")))
}

/// Wall-clock time of `utc` in `tz`.
#[must_use]
pub fn from_utc(utc: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    utc.with_timezone(&tz).naive_local()
}

/// ## Summary
/// Instant of a date-time value. Floating and date values are read as UTC.
///
/// ## Errors
/// Returns `ConversionError::UnknownTimezone` for an unresolvable TZID.
pub fn instant_of(
    value: &Temporal,
    resolver: &mut TimeZoneResolver,
) -> Result<DateTime<Utc>, ConversionError> {
    match value.form() {
        Some(DateTimeForm::Zoned { tzid }) => Ok(to_utc(value.local(), resolver.resolve(tzid)?)),
        _ => Ok(value.local().and_utc()),
    }
}

/// ## Summary
/// Re-expresses `value` in the form of `reference`, so that the two can be
/// compared and used side by side.
///
/// Date references keep only the date part. A date value against a
/// date-time reference becomes midnight in the reference's form. Floating
/// values on either side are relabelled without shifting the wall clock;
/// UTC and zoned values are converted through the instant they denote.
///
/// ## Errors
/// Returns `ConversionError::UnknownTimezone` if a conversion needs a TZID
/// that cannot be resolved.
pub fn normalize_to(
    value: &Temporal,
    reference: &Temporal,
    resolver: &mut TimeZoneResolver,
) -> Result<Temporal, ConversionError> {
    let Some(target) = reference.form() else {
        return Ok(Temporal::date(value.date_part()));
    };
    let Some(source) = value.form() else {
        return Ok(reference.with_local(value.local()));
    };
    if source == target
        || matches!(source, DateTimeForm::Floating)
        || matches!(target, DateTimeForm::Floating)
    {
        return Ok(reference.with_local(value.local()));
    }

    let instant = instant_of(value, resolver)?;
    let local = match target {
        DateTimeForm::Zoned { tzid } => from_utc(instant, resolver.resolve(tzid)?),
        _ => instant.naive_utc(),
    };
    Ok(reference.with_local(local))
}

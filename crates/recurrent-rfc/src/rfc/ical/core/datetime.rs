//! iCalendar DATE and DATE-TIME value types (RFC 5545 §3.3.4, §3.3.5).

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

/// Form of DATE-TIME value (RFC 5545 §3.3.5).
///
/// iCalendar DATE-TIME values come in three mutually exclusive forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DateTimeForm {
    /// Floating time - same wall-clock time in any timezone.
    ///
    /// Example: `19980118T230000`
    Floating,

    /// UTC time - absolute instant, indicated by 'Z' suffix.
    ///
    /// Example: `19980119T070000Z`
    Utc,

    /// Zoned time - local time with TZID reference.
    ///
    /// Example: `TZID=America/New_York:19980119T020000`
    Zoned {
        /// The IANA timezone identifier.
        tzid: String,
    },
}

impl DateTimeForm {
    const fn rank(&self) -> u8 {
        match self {
            Self::Floating => 1,
            Self::Utc => 2,
            Self::Zoned { .. } => 3,
        }
    }
}

/// DATE-TIME value (RFC 5545 §3.3.5).
///
/// A wall-clock reading plus the form that says how to interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateTime {
    /// Wall-clock reading. For UTC values this is the UTC reading.
    pub local: NaiveDateTime,
    /// The form of this DATE-TIME (floating, UTC, or zoned).
    pub form: DateTimeForm,
}

impl DateTime {
    /// Creates a floating DATE-TIME.
    #[must_use]
    pub const fn floating(local: NaiveDateTime) -> Self {
        Self {
            local,
            form: DateTimeForm::Floating,
        }
    }

    /// Creates a UTC DATE-TIME.
    #[must_use]
    pub const fn utc(local: NaiveDateTime) -> Self {
        Self {
            local,
            form: DateTimeForm::Utc,
        }
    }

    /// Creates a zoned DATE-TIME.
    #[must_use]
    pub fn zoned(local: NaiveDateTime, tzid: impl Into<String>) -> Self {
        Self {
            local,
            form: DateTimeForm::Zoned { tzid: tzid.into() },
        }
    }

    /// Returns true if this is a UTC time.
    #[must_use]
    pub const fn is_utc(&self) -> bool {
        matches!(self.form, DateTimeForm::Utc)
    }

    /// Returns true if this is a floating time.
    #[must_use]
    pub const fn is_floating(&self) -> bool {
        matches!(self.form, DateTimeForm::Floating)
    }

    /// Returns the TZID if this is a zoned time.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match &self.form {
            DateTimeForm::Zoned { tzid } => Some(tzid),
            _ => None,
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.local.format("%Y%m%dT%H%M%S"))?;
        if self.is_utc() {
            write!(f, "Z")?;
        }
        Ok(())
    }
}

/// A DATE or DATE-TIME value as used by DTSTART, RECURRENCE-ID, EXDATE,
/// RDATE and UNTIL.
///
/// Ordering compares the wall-clock reading first (a DATE sorts as its
/// midnight), then the value kind, then the TZID, so values of one series
/// (which share a kind) order chronologically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Temporal {
    /// All-day DATE value.
    Date(NaiveDate),
    /// DATE-TIME value in any of its three forms.
    DateTime(DateTime),
}

impl Temporal {
    /// Creates a DATE value.
    #[must_use]
    pub const fn date(date: NaiveDate) -> Self {
        Self::Date(date)
    }

    /// Creates a floating DATE-TIME value.
    #[must_use]
    pub const fn floating(local: NaiveDateTime) -> Self {
        Self::DateTime(DateTime::floating(local))
    }

    /// Creates a UTC DATE-TIME value.
    #[must_use]
    pub const fn utc(local: NaiveDateTime) -> Self {
        Self::DateTime(DateTime::utc(local))
    }

    /// Creates a zoned DATE-TIME value.
    #[must_use]
    pub fn zoned(local: NaiveDateTime, tzid: impl Into<String>) -> Self {
        Self::DateTime(DateTime::zoned(local, tzid))
    }

    /// Wall-clock reading; a DATE reads as its midnight.
    #[must_use]
    pub fn local(&self) -> NaiveDateTime {
        match self {
            Self::Date(date) => date.and_time(NaiveTime::MIN),
            Self::DateTime(dt) => dt.local,
        }
    }

    /// Calendar date of the wall-clock reading.
    #[must_use]
    pub fn date_part(&self) -> NaiveDate {
        match self {
            Self::Date(date) => *date,
            Self::DateTime(dt) => dt.local.date(),
        }
    }

    #[must_use]
    pub const fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// DATE-TIME form, `None` for DATE values.
    #[must_use]
    pub const fn form(&self) -> Option<&DateTimeForm> {
        match self {
            Self::Date(_) => None,
            Self::DateTime(dt) => Some(&dt.form),
        }
    }

    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match self {
            Self::Date(_) => None,
            Self::DateTime(dt) => dt.tzid(),
        }
    }

    #[must_use]
    pub const fn is_utc(&self) -> bool {
        matches!(self, Self::DateTime(dt) if dt.is_utc())
    }

    /// Returns a value of the same kind and form with a new wall-clock reading.
    /// DATE values keep only the date of `local`.
    #[must_use]
    pub fn with_local(&self, local: NaiveDateTime) -> Self {
        match self {
            Self::Date(_) => Self::Date(local.date()),
            Self::DateTime(dt) => Self::DateTime(DateTime {
                local,
                form: dt.form.clone(),
            }),
        }
    }

    /// Shifts the wall-clock reading, keeping kind and form. Returns `None`
    /// on calendar overflow.
    #[must_use]
    pub fn shifted(&self, delta: TimeDelta) -> Option<Self> {
        self.local()
            .checked_add_signed(delta)
            .map(|local| self.with_local(local))
    }

    /// True when both values are DATEs, or both are DATE-TIMEs of the same form.
    #[must_use]
    pub fn same_kind(&self, other: &Self) -> bool {
        self.is_date() == other.is_date() && self.form() == other.form()
    }

    /// The `VALUE` parameter type name for this value.
    #[must_use]
    pub const fn value_type(&self) -> &'static str {
        match self {
            Self::Date(_) => "DATE",
            Self::DateTime(_) => "DATE-TIME",
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Date(_) => 0,
            Self::DateTime(dt) => dt.form.rank(),
        }
    }
}

impl Ord for Temporal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.local()
            .cmp(&other.local())
            .then_with(|| self.rank().cmp(&other.rank()))
            .then_with(|| self.tzid().cmp(&other.tzid()))
    }
}

impl PartialOrd for Temporal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Temporal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format("%Y%m%d")),
            Self::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

impl From<DateTime> for Temporal {
    fn from(value: DateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<NaiveDate> for Temporal {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

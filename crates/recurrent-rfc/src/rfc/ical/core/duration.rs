//! iCalendar DURATION value type (RFC 5545 §3.3.6).

use std::fmt;

use chrono::TimeDelta;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

/// Duration value (RFC 5545 §3.3.6).
///
/// Either week-based (`P2W`) or day/time-based (`P1DT2H30M`). iCalendar has
/// no month or year designators, so every duration is an exact span and maps
/// one-to-one onto a [`TimeDelta`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Duration {
    pub negative: bool,
    /// Mutually exclusive with the day/time parts.
    pub weeks: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Duration {
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            negative: false,
            weeks: 0,
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    #[must_use]
    pub const fn weeks(weeks: u32) -> Self {
        let mut d = Self::zero();
        d.weeks = weeks;
        d
    }

    #[must_use]
    pub const fn days(days: u32) -> Self {
        let mut d = Self::zero();
        d.days = days;
        d
    }

    #[must_use]
    pub const fn hours(hours: u32) -> Self {
        let mut d = Self::zero();
        d.hours = hours;
        d
    }

    #[must_use]
    pub const fn minutes(minutes: u32) -> Self {
        let mut d = Self::zero();
        d.minutes = minutes;
        d
    }

    /// Negates this duration.
    #[must_use]
    pub const fn negate(mut self) -> Self {
        self.negative = !self.negative;
        self
    }

    /// Total length in seconds, signed.
    #[must_use]
    pub const fn as_seconds(&self) -> i64 {
        let total = self.weeks as i64 * WEEK
            + self.days as i64 * DAY
            + self.hours as i64 * HOUR
            + self.minutes as i64 * MINUTE
            + self.seconds as i64;

        if self.negative { -total } else { total }
    }

    #[must_use]
    pub const fn to_time_delta(&self) -> TimeDelta {
        TimeDelta::seconds(self.as_seconds())
    }

    /// ## Summary
    /// Converts a span into its canonical DURATION spelling: whole weeks use
    /// the week form, anything else is split into days, hours, minutes and
    /// seconds. Sub-second precision is dropped.
    ///
    /// Returns `None` if the span does not fit the value type.
    #[must_use]
    pub fn from_time_delta(delta: TimeDelta) -> Option<Self> {
        let total = delta.num_seconds();
        let negative = total < 0;
        let abs = total.checked_abs()?;

        let mut d = Self::zero();
        d.negative = negative;
        if abs != 0 && abs % WEEK == 0 {
            d.weeks = u32::try_from(abs / WEEK).ok()?;
            return Some(d);
        }
        d.days = u32::try_from(abs / DAY).ok()?;
        d.hours = u32::try_from(abs % DAY / HOUR).ok()?;
        d.minutes = u32::try_from(abs % HOUR / MINUTE).ok()?;
        d.seconds = u32::try_from(abs % MINUTE).ok()?;
        Some(d)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "P")?;

        if self.weeks > 0 {
            return write!(f, "{}W", self.weeks);
        }
        if self.days > 0 {
            write!(f, "{}D", self.days)?;
        }
        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            write!(f, "T")?;
            if self.hours > 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes > 0 {
                write!(f, "{}M", self.minutes)?;
            }
            if self.seconds > 0 {
                write!(f, "{}S", self.seconds)?;
            }
        } else if self.days == 0 {
            write!(f, "0D")?;
        } else {
            // days only, already written
        }
        Ok(())
    }
}

//! Calendar arithmetic shared by the combinators and the period stepper.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use crate::rfc::ical::core::Frequency;

#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map_or(28, |d| d.day())
}

#[must_use]
pub fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

#[must_use]
pub fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// First day of the week containing `date`, weeks starting on `wkst`.
#[must_use]
pub fn week_start(date: NaiveDate, wkst: chrono::Weekday) -> NaiveDate {
    let back = (7 + date.weekday().num_days_from_monday() - wkst.num_days_from_monday()) % 7;
    date.checked_sub_days(Days::new(u64::from(back)))
        .unwrap_or(date)
}

/// ## Summary
/// RFC 5545 week number of `date` for weeks starting on `wkst`: week 1 is the
/// first week holding at least four days of its year.
///
/// Returns the week-numbering year and the week number; the year differs from
/// the calendar year for days at either end of it.
#[must_use]
pub fn week_number(date: NaiveDate, wkst: chrono::Weekday) -> (i32, u32) {
    let start = week_start(date, wkst);
    let week_year = start
        .checked_add_days(Days::new(3))
        .map_or(date.year(), |d| d.year());
    let first = first_week_start(week_year, wkst).unwrap_or(start);
    let weeks = (start - first).num_days() / 7 + 1;
    (week_year, u32::try_from(weeks).unwrap_or(1))
}

/// Number of weeks (52 or 53) in the week-numbering `year`.
#[must_use]
pub fn weeks_in_year(year: i32, wkst: chrono::Weekday) -> u32 {
    match (first_week_start(year, wkst), first_week_start(year + 1, wkst)) {
        (Some(a), Some(b)) => u32::try_from((b - a).num_days() / 7).unwrap_or(52),
        _ => 52,
    }
}

fn first_week_start(year: i32, wkst: chrono::Weekday) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 4).map(|jan4| week_start(jan4, wkst))
}

/// All days of `month` in `year`.
pub fn month_days(year: i32, month: u32) -> impl Iterator<Item = NaiveDate> {
    (1..=days_in_month(year, month)).filter_map(move |d| NaiveDate::from_ymd_opt(year, month, d))
}

/// All days of `year`.
pub fn year_days(year: i32) -> impl Iterator<Item = NaiveDate> {
    (1..=days_in_year(year)).filter_map(move |d| NaiveDate::from_yo_opt(year, d))
}

/// Resolves a signed position (1-based, negative from the end) within `len`.
#[must_use]
pub fn resolve_position(position: i32, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let index = if position > 0 {
        i64::from(position) - 1
    } else {
        len + i64::from(position)
    };
    if (0..len).contains(&index) {
        usize::try_from(index).ok()
    } else {
        None
    }
}

/// Start of the frequency period holding `at`.
#[must_use]
pub fn period_start(freq: Frequency, at: NaiveDateTime, wkst: chrono::Weekday) -> NaiveDateTime {
    let date = at.date();
    let time = |h, m, s| date.and_hms_opt(h, m, s).unwrap_or(at);
    match freq {
        Frequency::Yearly => NaiveDate::from_ymd_opt(date.year(), 1, 1).map_or(at, midnight),
        Frequency::Monthly => {
            NaiveDate::from_ymd_opt(date.year(), date.month(), 1).map_or(at, midnight)
        }
        Frequency::Weekly => midnight(week_start(date, wkst)),
        Frequency::Daily => midnight(date),
        Frequency::Hourly => time(at.hour(), 0, 0),
        Frequency::Minutely => time(at.hour(), at.minute(), 0),
        Frequency::Secondly => time(at.hour(), at.minute(), at.second()),
    }
}

/// Length of one step in seconds for the fixed-length frequencies.
#[must_use]
pub const fn fixed_step_seconds(freq: Frequency) -> Option<i64> {
    match freq {
        Frequency::Weekly => Some(7 * 86_400),
        Frequency::Daily => Some(86_400),
        Frequency::Hourly => Some(3_600),
        Frequency::Minutely => Some(60),
        Frequency::Secondly => Some(1),
        Frequency::Monthly | Frequency::Yearly => None,
    }
}

/// ## Summary
/// Start of the `index`-th period after `base`, stepping `interval` units of
/// `freq`. Returns `None` once the calendar range is exceeded.
#[must_use]
pub fn nth_period(
    freq: Frequency,
    base: NaiveDateTime,
    interval: u32,
    index: u64,
) -> Option<NaiveDateTime> {
    let steps = i64::try_from(index)
        .ok()?
        .checked_mul(i64::from(interval))?;
    match freq {
        Frequency::Yearly => {
            let year = i64::from(base.year()).checked_add(steps)?;
            NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, 1, 1).map(midnight)
        }
        Frequency::Monthly => {
            let months = i64::from(base.year()) * 12 + i64::from(base.month0());
            let total = months.checked_add(steps)?;
            let year = i32::try_from(total.div_euclid(12)).ok()?;
            let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
            NaiveDate::from_ymd_opt(year, month, 1).map(midnight)
        }
        _ => {
            let seconds = fixed_step_seconds(freq)?.checked_mul(steps)?;
            base.checked_add_signed(TimeDelta::try_seconds(seconds)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_and_year_lengths() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2023, 12), 31);
        assert_eq!(days_in_year(2000), 366);
        assert_eq!(days_in_year(1900), 365);
    }

    #[test]
    fn iso_week_numbers_with_monday_start() {
        assert_eq!(week_number(date(1997, 5, 12), Weekday::Mon), (1997, 20));
        assert_eq!(week_number(date(2021, 1, 1), Weekday::Mon), (2020, 53));
        assert_eq!(week_number(date(2024, 12, 30), Weekday::Mon), (2025, 1));
        assert_eq!(weeks_in_year(2020, Weekday::Mon), 53);
        assert_eq!(weeks_in_year(2021, Weekday::Mon), 52);
    }

    #[test]
    fn week_start_honours_wkst() {
        assert_eq!(week_start(date(1997, 8, 7), Weekday::Mon), date(1997, 8, 4));
        assert_eq!(week_start(date(1997, 8, 7), Weekday::Sun), date(1997, 8, 3));
        assert_eq!(week_start(date(1997, 8, 3), Weekday::Sun), date(1997, 8, 3));
    }

    #[test]
    fn signed_positions() {
        assert_eq!(resolve_position(1, 3), Some(0));
        assert_eq!(resolve_position(-1, 3), Some(2));
        assert_eq!(resolve_position(4, 3), None);
        assert_eq!(resolve_position(-4, 3), None);
    }

    #[test]
    fn monthly_periods_roll_over_years() {
        let base = midnight(date(1997, 11, 1));
        assert_eq!(
            nth_period(Frequency::Monthly, base, 2, 1),
            Some(midnight(date(1998, 1, 1)))
        );
        assert_eq!(
            nth_period(Frequency::Weekly, midnight(date(1997, 9, 1)), 2, 1),
            Some(midnight(date(1997, 9, 15)))
        );
    }
}

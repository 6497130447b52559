//! Rule-combinator pipeline (RFC 5545 §3.3.10, BYxxx expand/limit table).
//!
//! Each [`ByRule`] either expands the candidates of one period into finer
//! units or limits them, depending on how fine the candidates already are.
//! Parts run in canonical order so later parts see the expansion of earlier
//! ones and BYSETPOS picks from the fully expanded period.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use super::calendar::{
    days_in_month, days_in_year, midnight, month_days, resolve_position, week_number, weeks_in_year, year_days,
};
use crate::rfc::ical::core::{ByRule, ByRuleKind, Frequency, RRule, Temporal, Weekday, WeekdayNum};

/// How fine the candidates of a period are after the parts applied so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Granularity {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl From<Frequency> for Granularity {
    fn from(freq: Frequency) -> Self {
        match freq {
            Frequency::Yearly => Self::Year,
            Frequency::Monthly => Self::Month,
            Frequency::Weekly => Self::Week,
            Frequency::Daily => Self::Day,
            Frequency::Hourly => Self::Hour,
            Frequency::Minutely => Self::Minute,
            Frequency::Secondly => Self::Second,
        }
    }
}

/// Period within which a BYDAY ordinal counts when BYDAY limits days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrdinalScope {
    Month,
    Year,
}

#[derive(Debug, Clone, Copy)]
struct Context {
    wkst: chrono::Weekday,
    ordinal_scope: OrdinalScope,
}

/// The effective, ordered combinators of one rule against one start value.
#[derive(Debug, Clone)]
pub struct Pipeline {
    freq: Frequency,
    rules: Vec<ByRule>,
    ctx: Context,
}

impl Pipeline {
    /// ## Summary
    /// Builds the pipeline for `rule` anchored at `start`.
    ///
    /// Parts the rule leaves out are filled in from the start value: a YEARLY
    /// rule without day-level parts gets BYMONTH/BYMONTHDAY, MONTHLY gets
    /// BYMONTHDAY, WEEKLY gets BYDAY, and date-time starts get BYHOUR,
    /// BYMINUTE and BYSECOND for every frequency coarser than the part.
    /// Date-only starts drop all time-of-day parts.
    #[must_use]
    pub fn new(rule: &RRule, start: &Temporal) -> Self {
        let freq = rule.freq();
        let at = start.local();
        let mut rules = rule.rules().to_vec();

        let day_level = [
            ByRuleKind::WeekNo,
            ByRuleKind::YearDay,
            ByRuleKind::MonthDay,
            ByRuleKind::Day,
        ]
        .iter()
        .any(|k| rule.has_rule(*k));
        let day = i8::try_from(at.day()).unwrap_or(1);

        if !day_level {
            match freq {
                Frequency::Yearly => {
                    if !rule.has_rule(ByRuleKind::Month) {
                        rules.push(ByRule::Month(vec![u8::try_from(at.month()).unwrap_or(1)]));
                    }
                    rules.push(ByRule::MonthDay(vec![day]));
                }
                Frequency::Monthly => rules.push(ByRule::MonthDay(vec![day])),
                Frequency::Weekly => rules.push(ByRule::Day(vec![WeekdayNum::every(
                    Weekday::from_chrono(at.weekday()),
                )])),
                _ => {}
            }
        }

        if start.is_date() {
            rules.retain(|r| {
                !matches!(
                    r.kind(),
                    ByRuleKind::Hour | ByRuleKind::Minute | ByRuleKind::Second
                )
            });
        } else {
            let time_part = |value: u32| u8::try_from(value).unwrap_or(0);
            if freq > Frequency::Hourly && !rule.has_rule(ByRuleKind::Hour) {
                rules.push(ByRule::Hour(vec![time_part(at.hour())]));
            }
            if freq > Frequency::Minutely && !rule.has_rule(ByRuleKind::Minute) {
                rules.push(ByRule::Minute(vec![time_part(at.minute())]));
            }
            if freq > Frequency::Secondly && !rule.has_rule(ByRuleKind::Second) {
                rules.push(ByRule::Second(vec![time_part(at.second())]));
            }
        }
        rules.sort_by_key(ByRule::kind);

        let ordinal_scope = if freq == Frequency::Monthly
            || (freq == Frequency::Yearly && rule.has_rule(ByRuleKind::Month))
        {
            OrdinalScope::Month
        } else {
            OrdinalScope::Year
        };

        Self {
            freq,
            rules,
            ctx: Context {
                wkst: rule.wkst().to_chrono(),
                ordinal_scope,
            },
        }
    }

    /// Effective parts, implicit ones included, in canonical order.
    #[must_use]
    pub fn rules(&self) -> &[ByRule] {
        &self.rules
    }

    /// ## Summary
    /// Candidates of the period starting at `period_start`, sorted and
    /// without duplicates.
    #[must_use]
    pub fn expand(&self, period_start: NaiveDateTime) -> Vec<NaiveDateTime> {
        let mut candidates = vec![period_start];
        let mut granularity = Granularity::from(self.freq);
        for rule in &self.rules {
            let (next, finer) = rule.apply(candidates, granularity, &self.ctx);
            candidates = next;
            granularity = finer;
            if candidates.is_empty() {
                break;
            }
        }
        candidates.sort_unstable();
        candidates.dedup();
        tracing::trace!(
            period = %period_start,
            count = candidates.len(),
            "Expanded period"
        );
        candidates
    }

    /// True unless a part rules out every instant on `date`. Only meaningful
    /// for sub-daily frequencies, where day-level parts can only limit.
    #[must_use]
    pub fn admits_day(&self, date: NaiveDate) -> bool {
        self.rules.iter().all(|rule| match rule {
            ByRule::Month(months) => contains_u32(months, date.month()),
            ByRule::YearDay(days) => matches_year_day(date, days),
            ByRule::MonthDay(days) => matches_month_day(date, days),
            ByRule::Day(days) => days
                .iter()
                .any(|d| d.ordinal.is_none() && d.weekday.to_chrono() == date.weekday()),
            _ => true,
        })
    }

    #[must_use]
    pub fn admits_hour(&self, hour: u32) -> bool {
        self.rules.iter().all(|rule| match rule {
            ByRule::Hour(hours) => contains_u32(hours, hour),
            _ => true,
        })
    }

    #[must_use]
    pub fn admits_minute(&self, minute: u32) -> bool {
        self.rules.iter().all(|rule| match rule {
            ByRule::Minute(minutes) => contains_u32(minutes, minute),
            _ => true,
        })
    }
}

impl ByRule {
    /// ## Summary
    /// Applies this part to the candidates of one period.
    ///
    /// Expands when `granularity` is coarser than the part's natural unit and
    /// limits otherwise; returns the new candidates and their granularity.
    #[expect(
        clippy::too_many_lines,
        reason = "One arm per BYxxx part keeps the expand/limit table in one place"
    )]
    fn apply(
        &self,
        candidates: Vec<NaiveDateTime>,
        granularity: Granularity,
        ctx: &Context,
    ) -> (Vec<NaiveDateTime>, Granularity) {
        match self {
            Self::Month(months) => match granularity {
                Granularity::Year => {
                    let mut sorted = months.clone();
                    sorted.sort_unstable();
                    let out = candidates
                        .iter()
                        .flat_map(|c| {
                            sorted.iter().filter_map(move |m| {
                                NaiveDate::from_ymd_opt(c.year(), u32::from(*m), 1).map(midnight)
                            })
                        })
                        .collect();
                    (out, Granularity::Month)
                }
                Granularity::Week => expand_days(&candidates, granularity, |d| {
                    contains_u32(months, d.month())
                }),
                _ => filter(candidates, granularity, |c| contains_u32(months, c.month())),
            },
            Self::WeekNo(weeks) => {
                let matches = |d: NaiveDate| matches_week_no(d, weeks, ctx.wkst);
                if granularity < Granularity::Day {
                    expand_days(&candidates, granularity, matches)
                } else {
                    filter(candidates, granularity, |c| matches(c.date()))
                }
            }
            Self::YearDay(days) => {
                if granularity < Granularity::Day {
                    expand_days(&candidates, granularity, |d| matches_year_day(d, days))
                } else {
                    filter(candidates, granularity, |c| matches_year_day(c.date(), days))
                }
            }
            Self::MonthDay(days) => {
                if granularity < Granularity::Day {
                    expand_days(&candidates, granularity, |d| matches_month_day(d, days))
                } else {
                    filter(candidates, granularity, |c| matches_month_day(c.date(), days))
                }
            }
            Self::Day(days) => match granularity {
                Granularity::Year | Granularity::Month => {
                    let out = candidates
                        .iter()
                        .flat_map(|c| {
                            let period: Vec<NaiveDate> = if granularity == Granularity::Year {
                                year_days(c.year()).collect()
                            } else {
                                month_days(c.year(), c.month()).collect()
                            };
                            select_weekdays(&period, days)
                        })
                        .map(midnight)
                        .collect();
                    (out, Granularity::Day)
                }
                Granularity::Week => expand_days(&candidates, granularity, |d| {
                    days.iter().any(|w| w.weekday.to_chrono() == d.weekday())
                }),
                _ => filter(candidates, granularity, |c| {
                    matches_weekday(c.date(), days, ctx.ordinal_scope)
                }),
            },
            Self::Hour(hours) => {
                let candidates = if granularity < Granularity::Day {
                    to_days(&candidates, granularity)
                } else {
                    candidates
                };
                if granularity < Granularity::Hour {
                    let out = candidates
                        .iter()
                        .flat_map(|c| {
                            hours
                                .iter()
                                .filter_map(move |h| c.date().and_hms_opt(u32::from(*h), 0, 0))
                        })
                        .collect();
                    (out, Granularity::Hour)
                } else {
                    filter(candidates, granularity, |c| contains_u32(hours, c.hour()))
                }
            }
            Self::Minute(minutes) => {
                if granularity < Granularity::Minute {
                    let out = candidates
                        .iter()
                        .flat_map(|c| {
                            minutes.iter().filter_map(move |m| {
                                c.with_minute(u32::from(*m)).and_then(|t| t.with_second(0))
                            })
                        })
                        .collect();
                    (out, Granularity::Minute)
                } else {
                    filter(candidates, granularity, |c| contains_u32(minutes, c.minute()))
                }
            }
            Self::Second(seconds) => {
                if granularity < Granularity::Second {
                    let out = candidates
                        .iter()
                        .flat_map(|c| {
                            seconds
                                .iter()
                                .filter_map(move |s| c.with_second(u32::from(*s)))
                        })
                        .collect();
                    (out, Granularity::Second)
                } else {
                    filter(candidates, granularity, |c| contains_u32(seconds, c.second()))
                }
            }
            Self::SetPos(positions) => {
                let mut sorted = candidates;
                sorted.sort_unstable();
                sorted.dedup();
                let mut picked: Vec<NaiveDateTime> = positions
                    .iter()
                    .filter_map(|p| resolve_position(i32::from(*p), sorted.len()))
                    .filter_map(|i| sorted.get(i).copied())
                    .collect();
                picked.sort_unstable();
                picked.dedup();
                (picked, granularity)
            }
        }
    }
}

fn filter(
    mut candidates: Vec<NaiveDateTime>,
    granularity: Granularity,
    keep: impl Fn(&NaiveDateTime) -> bool,
) -> (Vec<NaiveDateTime>, Granularity) {
    candidates.retain(|c| keep(c));
    (candidates, granularity)
}

/// Every day covered by the coarse candidates, at midnight.
fn to_days(candidates: &[NaiveDateTime], granularity: Granularity) -> Vec<NaiveDateTime> {
    expand_days(candidates, granularity, |_| true).0
}

fn expand_days(
    candidates: &[NaiveDateTime],
    granularity: Granularity,
    keep: impl Fn(NaiveDate) -> bool,
) -> (Vec<NaiveDateTime>, Granularity) {
    let out = candidates
        .iter()
        .flat_map(|c| -> Vec<NaiveDate> {
            match granularity {
                Granularity::Year => year_days(c.year()).collect(),
                Granularity::Month => month_days(c.year(), c.month()).collect(),
                Granularity::Week => c.date().iter_days().take(7).collect(),
                _ => vec![c.date()],
            }
        })
        .filter(|d| keep(*d))
        .map(midnight)
        .collect();
    (out, Granularity::Day)
}

fn contains_u32(values: &[u8], value: u32) -> bool {
    values.iter().any(|v| u32::from(*v) == value)
}

fn matches_signed(position: u32, len: u32, values: impl IntoIterator<Item = i32>) -> bool {
    let (position, len) = (i64::from(position), i64::from(len));
    values.into_iter().any(|v| {
        let v = i64::from(v);
        if v > 0 {
            v == position
        } else {
            len + v + 1 == position
        }
    })
}

fn matches_year_day(date: NaiveDate, days: &[i16]) -> bool {
    matches_signed(
        date.ordinal(),
        days_in_year(date.year()),
        days.iter().map(|d| i32::from(*d)),
    )
}

fn matches_month_day(date: NaiveDate, days: &[i8]) -> bool {
    matches_signed(
        date.day(),
        days_in_month(date.year(), date.month()),
        days.iter().map(|d| i32::from(*d)),
    )
}

fn matches_week_no(date: NaiveDate, weeks: &[i8], wkst: chrono::Weekday) -> bool {
    let (week_year, week) = week_number(date, wkst);
    matches_signed(
        week,
        weeks_in_year(week_year, wkst),
        weeks.iter().map(|w| i32::from(*w)),
    )
}

/// Days of `period` (sorted) picked by the BYDAY entries, ordinals counted
/// within the period.
fn select_weekdays(period: &[NaiveDate], days: &[WeekdayNum]) -> Vec<NaiveDate> {
    let mut out: Vec<NaiveDate> = Vec::new();
    for entry in days {
        let matching: Vec<NaiveDate> = period
            .iter()
            .copied()
            .filter(|d| d.weekday() == entry.weekday.to_chrono())
            .collect();
        match entry.ordinal {
            None => out.extend(matching),
            Some(n) => {
                if let Some(day) = resolve_position(i32::from(n), matching.len())
                    .and_then(|i| matching.get(i))
                {
                    out.push(*day);
                }
            }
        }
    }
    out.sort_unstable();
    out.dedup();
    out
}

fn matches_weekday(date: NaiveDate, days: &[WeekdayNum], scope: OrdinalScope) -> bool {
    days.iter().any(|entry| {
        if entry.weekday.to_chrono() != date.weekday() {
            return false;
        }
        if entry.ordinal.is_none() {
            return true;
        }
        let period: Vec<NaiveDate> = match scope {
            OrdinalScope::Month => month_days(date.year(), date.month()).collect(),
            OrdinalScope::Year => year_days(date.year()).collect(),
        };
        select_weekdays(&period, &[*entry]).contains(&date)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, mi, 0))
            .unwrap()
    }

    fn pipeline(text: &str, start: NaiveDateTime) -> Pipeline {
        let rule: RRule = text.parse().unwrap();
        Pipeline::new(&rule, &Temporal::floating(start))
    }

    #[test]
    fn implicit_parts_come_from_start() {
        let p = pipeline("FREQ=YEARLY", at(1997, 9, 2, 9, 0));
        assert_eq!(
            p.rules(),
            &[
                ByRule::Month(vec![9]),
                ByRule::MonthDay(vec![2]),
                ByRule::Hour(vec![9]),
                ByRule::Minute(vec![0]),
                ByRule::Second(vec![0]),
            ]
        );
    }

    #[test]
    fn date_start_drops_time_parts() {
        let rule: RRule = "FREQ=DAILY;BYHOUR=9".parse().unwrap();
        let start = Temporal::date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(Pipeline::new(&rule, &start).rules().is_empty());
    }

    #[test]
    fn monthly_last_weekday_via_setpos() {
        let p = pipeline(
            "FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1",
            at(1997, 9, 29, 9, 0),
        );
        assert_eq!(p.expand(at(1997, 9, 1, 0, 0)), vec![at(1997, 9, 30, 9, 0)]);
        assert_eq!(p.expand(at(1997, 10, 1, 0, 0)), vec![at(1997, 10, 31, 9, 0)]);
    }

    #[test]
    fn negative_month_day_drops_nothing_valid() {
        let p = pipeline("FREQ=MONTHLY;BYMONTHDAY=-1", at(2024, 1, 31, 9, 0));
        assert_eq!(p.expand(at(2024, 2, 1, 0, 0)), vec![at(2024, 2, 29, 9, 0)]);
    }

    #[test]
    fn day_31_skipped_in_short_months() {
        let p = pipeline("FREQ=MONTHLY", at(2024, 1, 31, 9, 0));
        assert!(p.expand(at(2024, 2, 1, 0, 0)).is_empty());
    }

    #[test]
    fn yearly_ordinal_weekday_counts_in_year() {
        let p = pipeline("FREQ=YEARLY;BYDAY=20MO", at(1997, 5, 19, 9, 0));
        assert_eq!(p.expand(at(1997, 1, 1, 0, 0)), vec![at(1997, 5, 19, 9, 0)]);
    }

    #[test]
    fn yearly_ordinal_weekday_counts_in_month_with_bymonth() {
        let p = pipeline("FREQ=YEARLY;BYMONTH=3;BYDAY=TH", at(1997, 3, 13, 9, 0));
        let out = p.expand(at(1997, 1, 1, 0, 0));
        assert_eq!(
            out,
            vec![
                at(1997, 3, 6, 9, 0),
                at(1997, 3, 13, 9, 0),
                at(1997, 3, 20, 9, 0),
                at(1997, 3, 27, 9, 0)
            ]
        );
    }

    #[test]
    fn week_number_expands_year() {
        let p = pipeline("FREQ=YEARLY;BYWEEKNO=20;BYDAY=MO", at(1997, 5, 12, 9, 0));
        assert_eq!(p.expand(at(1998, 1, 1, 0, 0)), vec![at(1998, 5, 11, 9, 0)]);
    }

    #[test]
    fn daily_hours_expand() {
        let p = pipeline("FREQ=DAILY;BYHOUR=9,17", at(2024, 1, 1, 9, 30));
        assert_eq!(
            p.expand(at(2024, 1, 2, 0, 0)),
            vec![at(2024, 1, 2, 9, 30), at(2024, 1, 2, 17, 30)]
        );
    }

    #[test]
    fn sub_daily_admission_checks() {
        let p = pipeline("FREQ=MINUTELY;BYHOUR=9;BYDAY=MO", at(2024, 1, 1, 9, 0));
        assert!(p.admits_day(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()));
        assert!(!p.admits_day(NaiveDate::from_ymd_opt(2024, 1, 9).unwrap()));
        assert!(p.admits_hour(9));
        assert!(!p.admits_hour(10));
    }
}

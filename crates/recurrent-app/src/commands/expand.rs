//! `recurrent expand`: list the occurrences of a rule.

use anyhow::Result;
use recurrent_rfc::rfc::ical::core::{RRule, Temporal};
use recurrent_rfc::rfc::ical::expand::{ExpansionLimits, RecurrenceSet, Window};

#[derive(Debug, Clone)]
pub struct ExpandArgs {
    pub start: Temporal,
    pub rule: Option<RRule>,
    pub from: Option<Temporal>,
    pub to: Option<Temporal>,
    pub limit: usize,
    pub exdates: Vec<Temporal>,
    pub rdates: Vec<Temporal>,
}

/// ## Summary
/// Expands the recurrence described by `args`.
///
/// With both `from` and `to` the occurrences inside that window are
/// returned, capped by `limits`. Otherwise the first `limit` occurrences
/// from `from` (or the start) are returned.
///
/// ## Errors
/// Returns an error if the rule cannot be used with the start value or the
/// window is invalid or too large.
#[tracing::instrument(skip(limits))]
pub fn run(args: &ExpandArgs, limits: ExpansionLimits) -> Result<Vec<Temporal>> {
    let mut set = RecurrenceSet::new(args.start.clone()).with_limits(limits);
    if let Some(rule) = &args.rule {
        set = set.with_rule(rule.clone())?;
    }
    let set = set.with_exdates(&args.exdates)?.with_rdates(&args.rdates)?;

    if let (Some(from), Some(to)) = (&args.from, &args.to) {
        let window = Window::new(from.clone(), to.clone())?;
        let mut occurrences = set.between(&window)?;
        occurrences.truncate(args.limit);
        return Ok(occurrences);
    }

    let from = args.from.as_ref();
    Ok(set
        .iter()
        .filter(|o| from.is_none_or(|from| o >= from))
        .take(args.limit)
        .collect())
}

/// ## Errors
/// Returns an error if JSON serialization fails.
pub fn render(occurrences: &[Temporal], json: bool) -> Result<String> {
    let values: Vec<String> = occurrences.iter().map(ToString::to_string).collect();
    if json {
        Ok(serde_json::to_string_pretty(&values)?)
    } else {
        Ok(values.iter().map(|v| format!("{v}\n")).collect())
    }
}

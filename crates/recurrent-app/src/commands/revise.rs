//! `recurrent revise`: move or change one occurrence of a stored component.

use anyhow::Result;
use recurrent_rfc::rfc::ical::core::Temporal;
use recurrent_service::series::{EditScope, RecurringComponent, Reviser, Revision, ScopeChoice};

#[derive(Debug, Clone)]
pub struct ReviseArgs {
    pub occurrence: Temporal,
    pub start: Temporal,
    pub end: Option<Temporal>,
    pub summary: Option<String>,
    pub scope: EditScope,
}

/// ## Summary
/// Revises `original` as requested. The reviser cancels the edit when the
/// requested scope is not among the choices it offers.
///
/// ## Errors
/// Returns an error if the revision request is invalid.
#[tracing::instrument(skip(original), fields(uid = %original.uid))]
pub fn run(original: &RecurringComponent, args: &ReviseArgs) -> Result<Revision> {
    let mut edited = original.clone();
    if let Some(summary) = &args.summary {
        edited.summary = Some(summary.clone());
    }

    let mut reviser = Reviser::new()
        .original(original)
        .edited(edited)
        .occurrence(args.occurrence.clone())
        .start(args.start.clone());
    if let Some(end) = &args.end {
        reviser = reviser.end(end.clone());
    }

    let mut resolver = |choices: &[ScopeChoice]| {
        tracing::debug!(offered = choices.len(), scope = %args.scope, "Answering scope dialog");
        Some(args.scope)
    };
    Ok(reviser.revise(&mut resolver)?)
}

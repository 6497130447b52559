//! `recurrent delete`: remove occurrences of a stored component.

use anyhow::Result;
use recurrent_rfc::rfc::ical::core::Temporal;
use recurrent_service::series::{Deleter, EditScope, RecurringComponent, Revision};

/// ## Errors
/// Returns an error if the deletion request is invalid.
#[tracing::instrument(skip(original), fields(uid = %original.uid))]
pub fn run(
    original: &RecurringComponent,
    occurrence: Option<Temporal>,
    scope: EditScope,
) -> Result<Revision> {
    let mut deleter = Deleter::new().original(original);
    if let Some(occurrence) = occurrence {
        deleter = deleter.occurrence(occurrence);
    }
    Ok(deleter.delete(scope)?)
}

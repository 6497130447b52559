//! Deleting occurrences of a series.

use recurrent_rfc::error::RfcError;
use recurrent_rfc::rfc::ical::core::Temporal;
use recurrent_rfc::rfc::ical::expand::{TimeZoneResolver, normalize_to};

use super::component::RecurringComponent;
use super::itip::{ChangeMessage, Method};
use super::reviser::{Revision, comparable, now, truncated};
use super::scope::EditScope;
use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Builder for one deletion request.
///
/// ONE excludes the occurrence, THIS_AND_FUTURE ends the series before it
/// and ALL cancels the component. The `*_IGNORE_RECURRENCES` variants
/// behave like their base scope since deleted overrides go with the
/// occurrences they replace.
#[derive(Debug, Clone, Default)]
pub struct Deleter<'a> {
    original: Option<&'a RecurringComponent>,
    occurrence: Option<Temporal>,
    timestamp: Option<Temporal>,
}

impl<'a> Deleter<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn original(mut self, original: &'a RecurringComponent) -> Self {
        self.original = Some(original);
        self
    }

    /// Original start of the occurrence to delete. Only ONE and
    /// THIS_AND_FUTURE need it.
    #[must_use]
    pub fn occurrence(mut self, occurrence: Temporal) -> Self {
        self.occurrence = Some(occurrence);
        self
    }

    #[must_use]
    pub fn timestamp(mut self, timestamp: Temporal) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// ## Summary
    /// Computes the deletion under `scope`.
    ///
    /// ## Errors
    /// Returns `ServiceError::MissingField` for an incomplete request,
    /// `ServiceError::InvalidOriginal` if the original fails validation and
    /// `ServiceError::OccurrenceNotInSeries` if the occurrence is unknown.
    #[tracing::instrument(skip(self), fields(uid = tracing::field::Empty))]
    pub fn delete(self, scope: EditScope) -> ServiceResult<Revision> {
        let original = self.original.ok_or(ServiceError::MissingField("original"))?;
        tracing::Span::current().record("uid", original.uid.as_str());
        original.validate().map_err(ServiceError::InvalidOriginal)?;
        let now = self.timestamp.unwrap_or_else(now);

        if scope == EditScope::Cancel {
            return Ok(Revision::default());
        }
        let scope = match scope {
            EditScope::AllIgnoreRecurrences => EditScope::All,
            EditScope::ThisAndFutureIgnoreRecurrences => EditScope::ThisAndFuture,
            other => other,
        };
        if scope == EditScope::All || !original.is_recurring() {
            return Ok(cancel_all(original));
        }

        let reference = original
            .dtstart
            .clone()
            .ok_or(ServiceError::MissingField("original DTSTART"))?;
        let occurrence = self
            .occurrence
            .ok_or(ServiceError::MissingField("occurrence"))?;
        let mut zones = TimeZoneResolver::new();
        let occurrence =
            normalize_to(&occurrence, &reference, &mut zones).map_err(RfcError::from)?;

        let set = original
            .recurrence_set()
            .map_err(ServiceError::InvalidOriginal)?;
        if !set.contains(&occurrence) {
            return Err(ServiceError::OccurrenceNotInSeries {
                uid: original.uid.clone(),
                occurrence: occurrence.to_string(),
            });
        }

        let mut result = if scope == EditScope::One {
            tracing::debug!(%occurrence, "Excluding occurrence");
            let mut result = original.clone();
            result
                .overrides
                .retain(|rid, _| comparable(rid, &occurrence, &mut zones) != occurrence);
            result.exdates.push(occurrence);
            result
        } else {
            match set.previous_occurrence(&occurrence) {
                Some(previous) => {
                    tracing::debug!(%occurrence, until = %previous, "Ending series");
                    truncated(original, &occurrence, &previous, &mut zones)?
                }
                None => return Ok(cancel_all(original)),
            }
        };
        result.sequence += 1;
        result.dtstamp = Some(now.clone());
        result.last_modified = Some(now);

        Ok(Revision {
            messages: vec![ChangeMessage::new(Method::Request, vec![result.clone()])],
            components: vec![result],
            start_adjustments: Vec::new(),
        })
    }
}

fn cancel_all(original: &RecurringComponent) -> Revision {
    tracing::debug!(uid = %original.uid, "Cancelling component");
    Revision {
        messages: vec![ChangeMessage::new(Method::Cancel, vec![original.clone()])],
        components: Vec::new(),
        start_adjustments: Vec::new(),
    }
}

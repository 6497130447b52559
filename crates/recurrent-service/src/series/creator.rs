//! Creating new components from a selected time span.

use recurrent_rfc::rfc::ical::core::Temporal;
use uuid::Uuid;

use super::component::RecurringComponent;
use super::itip::{ChangeMessage, Method};
use super::reviser::{Revision, now};
use crate::error::{ServiceError, ServiceResult};

/// The span a user picked for a new component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSpan {
    pub start: Temporal,
    pub end: Option<Temporal>,
}

/// Supplies the component to create for a span. `None` abandons creation.
pub trait ComponentFactory {
    fn create(&mut self, span: &TimeSpan) -> Option<RecurringComponent>;
}

impl<F> ComponentFactory for F
where
    F: FnMut(&TimeSpan) -> Option<RecurringComponent>,
{
    fn create(&mut self, span: &TimeSpan) -> Option<RecurringComponent> {
        self(span)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Creator {
    timestamp: Option<Temporal>,
}

impl Creator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn timestamp(mut self, timestamp: Temporal) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// ## Summary
    /// Asks `factory` for a component covering `span` and publishes it.
    ///
    /// A blank UID is replaced with a fresh one; SEQUENCE starts at 0.
    /// A recurring component whose start the rule does not produce is
    /// moved onto its first occurrence.
    ///
    /// ## Errors
    /// Returns `ServiceError::InvalidEdited` if the component fails
    /// validation.
    #[tracing::instrument(skip(self, factory))]
    pub fn create<F>(self, span: &TimeSpan, factory: &mut F) -> ServiceResult<Revision>
    where
        F: ComponentFactory + ?Sized,
    {
        let Some(mut component) = factory.create(span) else {
            tracing::debug!("Creation abandoned");
            return Ok(Revision::default());
        };
        if component.uid.trim().is_empty() {
            component.uid = Uuid::new_v4().to_string();
        }
        if component.dtstart.is_none() {
            component.set_span(span.start.clone(), span.end.clone());
        }
        component.sequence = 0;
        let now = self.timestamp.unwrap_or_else(now);
        component.dtstamp = Some(now.clone());
        component.last_modified = Some(now);

        let adjustment = component
            .align_start()
            .map_err(ServiceError::InvalidEdited)?;
        component.validate().map_err(ServiceError::InvalidEdited)?;
        tracing::debug!(uid = %component.uid, "Created component");

        Ok(Revision {
            messages: vec![ChangeMessage::new(
                Method::Publish,
                vec![component.clone()],
            )],
            components: vec![component],
            start_adjustments: adjustment.into_iter().collect(),
        })
    }
}

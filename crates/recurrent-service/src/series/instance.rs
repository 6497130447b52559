//! Materialized occurrences for display.

use recurrent_rfc::rfc::ical::core::Temporal;
use recurrent_rfc::rfc::ical::expand::{ExpansionLimits, TimeZoneResolver, Window, normalize_to};

use super::component::RecurringComponent;
use crate::error::{ServiceError, ServiceResult};

/// One occurrence as it should be shown: overrides applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    /// Original start of the occurrence; identifies it within the series.
    pub recurrence_id: Temporal,
    pub start: Temporal,
    pub end: Option<Temporal>,
    /// True when an override replaced the generated occurrence.
    pub overridden: bool,
}

impl RecurringComponent {
    /// ## Summary
    /// Occurrences whose start falls inside `window`, with overrides applied.
    ///
    /// An override moved into the window from outside is included; one moved
    /// out of it is not.
    ///
    /// ## Errors
    /// Returns `ServiceError::InvalidOriginal` if the component cannot be
    /// expanded, or the expansion error when the window holds too many
    /// occurrences.
    #[tracing::instrument(skip(self, limits), fields(uid = %self.uid))]
    pub fn instances(
        &self,
        window: &Window,
        limits: ExpansionLimits,
    ) -> ServiceResult<Vec<Instance>> {
        let set = self
            .recurrence_set()
            .map_err(ServiceError::InvalidOriginal)?
            .with_limits(limits);

        let mut resolver = TimeZoneResolver::new();
        let mut in_window = |value: &Temporal| -> ServiceResult<bool> {
            let from = normalize_to(window.start(), value, &mut resolver)
                .map_err(recurrent_rfc::error::RfcError::from)?;
            let to = normalize_to(window.end(), value, &mut resolver)
                .map_err(recurrent_rfc::error::RfcError::from)?;
            Ok(*value >= from && *value < to)
        };

        let mut out = Vec::new();
        for rid in set.between(window)? {
            match self.overrides.get(&rid) {
                Some(child) => {
                    let start = child.dtstart.clone().unwrap_or_else(|| rid.clone());
                    if in_window(&start)? {
                        out.push(Instance {
                            end: child.end_for(&start),
                            start,
                            recurrence_id: rid,
                            overridden: true,
                        });
                    }
                }
                None => out.push(Instance {
                    end: self.end_for(&rid),
                    start: rid.clone(),
                    recurrence_id: rid,
                    overridden: false,
                }),
            }
        }

        for (rid, child) in &self.overrides {
            if out.iter().any(|i| &i.recurrence_id == rid) {
                continue;
            }
            let Some(start) = child.dtstart.clone() else {
                continue;
            };
            if in_window(&start)? && set.contains(rid) {
                out.push(Instance {
                    end: child.end_for(&start),
                    start,
                    recurrence_id: rid.clone(),
                    overridden: true,
                });
            }
        }

        out.sort_by(|a, b| a.start.cmp(&b.start));
        tracing::debug!(count = out.len(), "Materialized instances");
        Ok(out)
    }
}

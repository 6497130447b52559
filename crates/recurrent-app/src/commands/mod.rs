pub mod delete;
pub mod expand;
pub mod revise;

use anyhow::{Context, Result};
use recurrent_rfc::rfc::ical::build::serialize;
use recurrent_rfc::rfc::ical::parse;
use recurrent_service::series::{Method, RecurringComponent, Revision};
use serde::Serialize;

/// ## Summary
/// Reads a calendar file and picks the component to work on: the one with
/// `uid` when given, otherwise the first recurring master.
///
/// ## Errors
/// Returns an error if the file cannot be read or parsed, or holds no
/// matching component.
pub fn load_component(path: &str, uid: Option<&str>) -> Result<RecurringComponent> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let ical = parse(&text).with_context(|| format!("Failed to parse {path}"))?;
    let mut components = RecurringComponent::group(&ical)?;
    tracing::debug!(count = components.len(), path, "Loaded components");

    let index = match uid {
        Some(uid) => components.iter().position(|c| c.uid == uid),
        None => components
            .iter()
            .position(RecurringComponent::is_recurring)
            .or_else(|| (!components.is_empty()).then_some(0)),
    };
    index
        .map(|i| components.swap_remove(i))
        .with_context(|| match uid {
            Some(uid) => format!("No component with UID {uid} in {path}"),
            None => format!("No VEVENT, VTODO or VJOURNAL in {path}"),
        })
}

#[derive(Debug, Serialize)]
struct MessageOutput {
    method: Method,
    uids: Vec<String>,
    ical: String,
}

#[derive(Debug, Serialize)]
struct StartAdjustmentOutput {
    uid: String,
    from: String,
    to: String,
}

#[derive(Debug, Serialize)]
struct RevisionOutput {
    messages: Vec<MessageOutput>,
    start_adjustments: Vec<StartAdjustmentOutput>,
}

/// ## Summary
/// Renders a revision as calendar text, one VCALENDAR per message, or as
/// JSON.
///
/// ## Errors
/// Returns an error if JSON serialization fails.
pub fn render_revision(revision: &Revision, prodid: &str, json: bool) -> Result<String> {
    for adjustment in &revision.start_adjustments {
        tracing::info!(
            uid = %adjustment.uid,
            from = %adjustment.from,
            to = %adjustment.to,
            "Start moved to first occurrence"
        );
    }
    if revision.is_empty() {
        tracing::info!("Nothing to send");
    }

    let render = |m: &recurrent_service::series::ChangeMessage| serialize(&m.to_ical(prodid));
    if !json {
        return Ok(revision.messages.iter().map(render).collect::<String>());
    }

    let output = RevisionOutput {
        messages: revision
            .messages
            .iter()
            .map(|m| MessageOutput {
                method: m.method,
                uids: m.components.iter().map(|c| c.uid.clone()).collect(),
                ical: render(m),
            })
            .collect(),
        start_adjustments: revision
            .start_adjustments
            .iter()
            .map(|a| StartAdjustmentOutput {
                uid: a.uid.clone(),
                from: a.from.to_string(),
                to: a.to.to_string(),
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

//! iCalendar document parser (RFC 5545).
//!
//! Parses complete iCalendar documents into typed structures.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{parse_content_line, split_lines};
use super::values::{
    parse_duration, parse_integer, parse_rrule, parse_temporal, parse_temporal_list,
    split_text_list, unescape_text,
};
use crate::rfc::ical::core::property::names;
use crate::rfc::ical::core::{Component, ContentLine, ICalendar, Property, Value};

/// ## Summary
/// Parses an iCalendar document from a string.
///
/// The input must hold exactly one VCALENDAR object. Properties the engine
/// interprets are typed; everything else is kept as [`Value::Unknown`].
///
/// ## Errors
/// Returns an error if the input is not valid iCalendar or a typed value
/// does not parse.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> ParseResult<ICalendar> {
    tracing::debug!("Parsing iCalendar document");

    let lines = split_lines(input);
    tracing::trace!(count = lines.len(), "Split lines");

    let mut stack: Vec<Component> = Vec::new();
    let mut root: Option<Component> = None;

    for (line_num, line) in lines {
        if root.is_some() {
            return Err(ParseError::new(ParseErrorKind::TrailingContent, line_num, 1));
        }
        let cl = parse_content_line(&line, line_num)?;

        match cl.name.as_str() {
            "BEGIN" => stack.push(Component::named(cl.raw_value.trim())),
            "END" => {
                let end_name = cl.raw_value.trim().to_ascii_uppercase();
                let component = stack
                    .pop()
                    .ok_or_else(|| ParseError::new(ParseErrorKind::MissingBegin, line_num, 1))?;
                if component.name != end_name {
                    return Err(
                        ParseError::new(ParseErrorKind::MismatchedComponent, line_num, 1)
                            .with_context(format!(
                                "expected END:{}, got END:{end_name}",
                                component.name
                            )),
                    );
                }
                match stack.last_mut() {
                    Some(parent) => parent.add_child(component),
                    None => root = Some(component),
                }
            }
            _ => {
                let parent = stack
                    .last_mut()
                    .ok_or_else(|| ParseError::new(ParseErrorKind::MissingBegin, line_num, 1))?;
                parent.add_property(parse_property(cl, line_num)?);
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::new(ParseErrorKind::MissingEnd, 1, 1)
            .with_context(format!("missing END:{}", open.name)));
    }
    let root = root.ok_or_else(|| {
        tracing::warn!("Empty iCalendar input");
        ParseError::new(ParseErrorKind::MissingBegin, 1, 1)
    })?;
    if root.name != "VCALENDAR" {
        return Err(
            ParseError::new(ParseErrorKind::MissingBegin, 1, 1).with_context("expected VCALENDAR")
        );
    }

    tracing::debug!(components = root.children.len(), "iCalendar document parsed");
    Ok(ICalendar { root })
}

/// Parses a property from a content line, resolving the value type by name.
fn parse_property(cl: ContentLine, line_num: usize) -> ParseResult<Property> {
    let value_type = cl.get_param_value("VALUE");
    let tzid = cl.get_param_value("TZID");
    let raw = cl.raw_value.as_str();
    let col = cl.name.len() + 2;

    let value = match cl.name.as_str() {
        names::DTSTART
        | names::DTEND
        | names::DUE
        | names::RECURRENCE_ID
        | names::DTSTAMP
        | names::LAST_MODIFIED
        | "CREATED" => Value::Temporal(parse_temporal(raw, value_type, tzid, line_num, col)?),
        names::EXDATE => Value::TemporalList(parse_temporal_list(
            raw, value_type, tzid, line_num, col,
        )?),
        names::RDATE if !value_type.is_some_and(|t| t.eq_ignore_ascii_case("PERIOD")) => {
            Value::TemporalList(parse_temporal_list(raw, value_type, tzid, line_num, col)?)
        }
        names::DURATION => Value::Duration(parse_duration(raw, line_num, col)?),
        names::RRULE => Value::Recur(Box::new(parse_rrule(raw, line_num, col)?)),
        names::SEQUENCE | names::PRIORITY => Value::Integer(parse_integer(raw, line_num, col)?),
        names::CATEGORIES | names::RESOURCES => Value::TextList(split_text_list(raw)),
        names::SUMMARY
        | names::DESCRIPTION
        | names::LOCATION
        | names::STATUS
        | names::COMMENT
        | names::CONTACT
        | names::UID
        | names::RELATED_TO
        | names::PRODID
        | names::VERSION
        | names::METHOD
        | names::CALSCALE => Value::Text(unescape_text(raw)),
        _ => Value::Unknown(cl.raw_value.clone()),
    };

    Ok(Property {
        name: cl.name,
        params: cl.params,
        value,
        raw_value: cl.raw_value,
    })
}

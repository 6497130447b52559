//! Content line lexer for iCalendar (RFC 5545 §3.1).
//!
//! Handles line unfolding and tokenization of content lines.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{ContentLine, Parameter};

/// ## Summary
/// Splits input into logical content lines, merging folded continuations.
///
/// Accepts CRLF and bare LF. A line starting with SPACE or HTAB continues the
/// previous line with its first whitespace character removed. Blank lines are
/// skipped. Each entry carries the 1-based physical line it started on.
#[must_use]
pub fn split_lines(input: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();

    for (i, raw_line) in input.split('\n').enumerate() {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        if line.is_empty() {
            continue;
        }

        match line.strip_prefix([' ', '\t']) {
            Some(continuation) => match lines.last_mut() {
                Some((_, prev)) => prev.push_str(continuation),
                None => lines.push((i + 1, continuation.to_string())),
            },
            None => lines.push((i + 1, line.to_string())),
        }
    }

    lines
}

/// ## Summary
/// Parses a single unfolded content line.
///
/// Format: `name *(";" param) ":" value`. Colons and semicolons inside
/// double-quoted parameter values do not split the line.
///
/// ## Errors
/// Returns an error if the line has no name, no colon, a malformed parameter,
/// or an unterminated quoted string.
pub fn parse_content_line(line: &str, line_num: usize) -> ParseResult<ContentLine> {
    let mut in_quote = false;
    let mut segments: Vec<(usize, usize)> = Vec::new();
    let mut seg_start = 0;
    let mut colon = None;

    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quote = !in_quote,
            ';' if !in_quote => {
                segments.push((seg_start, i));
                seg_start = i + 1;
            }
            ':' if !in_quote => {
                segments.push((seg_start, i));
                colon = Some(i);
                break;
            }
            _ => {}
        }
    }

    if in_quote {
        return Err(ParseError::new(
            ParseErrorKind::UnclosedQuote,
            line_num,
            line.len(),
        ));
    }
    let colon =
        colon.ok_or_else(|| ParseError::new(ParseErrorKind::MissingColon, line_num, line.len()))?;

    let mut segments = segments.into_iter();
    let (name_start, name_end) = segments
        .next()
        .ok_or_else(|| ParseError::new(ParseErrorKind::MissingPropertyName, line_num, 1))?;
    let name = &line[name_start..name_end];
    if name.is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::MissingPropertyName,
            line_num,
            1,
        ));
    }
    if let Some(pos) = name.find(|c: char| !c.is_ascii_alphanumeric() && c != '-') {
        return Err(ParseError::new(
            ParseErrorKind::InvalidPropertyName,
            line_num,
            pos + 1,
        ));
    }

    let params = segments
        .map(|(start, end)| parse_parameter(&line[start..end], line_num, start + 1))
        .collect::<ParseResult<Vec<_>>>()?;

    Ok(ContentLine {
        name: name.to_ascii_uppercase(),
        params,
        raw_value: line[colon + 1..].to_string(),
    })
}

/// Parses `NAME=value[,value...]`, unquoting and caret-decoding values (RFC 6868).
fn parse_parameter(text: &str, line_num: usize, column: usize) -> ParseResult<Parameter> {
    let (name, raw_values) = text.split_once('=').ok_or_else(|| {
        ParseError::new(ParseErrorKind::InvalidParameter, line_num, column)
            .with_context("NAME=VALUE expected")
    })?;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ParseError::new(
            ParseErrorKind::InvalidParameter,
            line_num,
            column,
        ));
    }

    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    for c in raw_values.chars() {
        match c {
            '"' => in_quote = !in_quote,
            ',' if !in_quote => values.push(decode_caret(&std::mem::take(&mut current))),
            _ => current.push(c),
        }
    }
    values.push(decode_caret(&current));

    Ok(Parameter::with_values(name, values))
}

fn decode_caret(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '^' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\'') => out.push('"'),
            Some('^') => out.push('^'),
            Some(other) => {
                out.push('^');
                out.push(other);
            }
            None => out.push('^'),
        }
    }
    out
}

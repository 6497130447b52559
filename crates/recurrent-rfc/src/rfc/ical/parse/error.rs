//! Errors raised while reading iCalendar text, located by line and column.

use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "{kind} at line {line}, column {column}{}",
    .context.as_deref().map(|c| format!(": {c}")).unwrap_or_default()
)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// 1-based.
    pub line: usize,
    /// 1-based; 0 when only the line is known.
    pub column: usize,
    /// Offending text, when it helps.
    pub context: Option<String>,
}

impl ParseError {
    #[must_use]
    pub const fn new(kind: ParseErrorKind, line: usize, column: usize) -> Self {
        Self {
            kind,
            line,
            column,
            context: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    // Content lines
    #[error("invalid content line format")]
    InvalidContentLine,
    #[error("missing property name")]
    MissingPropertyName,
    #[error("invalid property name")]
    InvalidPropertyName,
    #[error("missing colon separator")]
    MissingColon,
    #[error("invalid parameter format")]
    InvalidParameter,
    #[error("unclosed quoted string")]
    UnclosedQuote,

    // Values
    #[error("invalid date format")]
    InvalidDate,
    #[error("invalid date-time format")]
    InvalidDateTime,
    #[error("invalid duration format")]
    InvalidDuration,
    #[error("invalid integer value")]
    InvalidInteger,

    // Recurrence rules
    /// Malformed RRULE text or a rule part rejected by validation.
    #[error("invalid recurrence rule")]
    InvalidRRule,
    #[error("recurrence rule without FREQ")]
    MissingFrequency,
    #[error("invalid frequency")]
    InvalidFrequency,
    #[error("invalid weekday")]
    InvalidWeekday,
    #[error("unknown recurrence rule part")]
    UnknownRulePart,
    #[error("duplicate recurrence rule part")]
    DuplicateRulePart,
    #[error("UNTIL and COUNT are mutually exclusive")]
    UntilCountConflict,

    // Document structure
    #[error("missing BEGIN line")]
    MissingBegin,
    #[error("missing END line")]
    MissingEnd,
    #[error("mismatched BEGIN/END")]
    MismatchedComponent,
    #[error("content after the calendar object")]
    TrailingContent,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

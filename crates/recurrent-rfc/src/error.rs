use thiserror::Error;

use crate::rfc::ical::core::{ByRuleKind, Frequency};
use crate::rfc::ical::expand::{ConversionError, ExpansionError};
use crate::rfc::ical::parse::ParseError;

/// RFC parsing, validation and expansion errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error(transparent)]
    ParseError(#[from] ParseError),

    #[error("RRule validation error: {0}")]
    RuleError(#[from] RuleError),

    #[error(transparent)]
    ExpansionError(#[from] ExpansionError),

    #[error(transparent)]
    ConversionError(#[from] ConversionError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;

/// Structural problems with a recurrence rule, raised when a rule part is
/// attached or a whole rule is checked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("{0} requires at least one value")]
    EmptyValues(ByRuleKind),

    #[error("{kind} value {value} is out of range")]
    OutOfRange { kind: ByRuleKind, value: i32 },

    #[error("{kind} is not supported with FREQ={freq}")]
    Unsupported { kind: ByRuleKind, freq: Frequency },

    #[error("BYDAY ordinals are not allowed with FREQ={0}")]
    OrdinalNotAllowed(Frequency),

    #[error("BYDAY ordinals are not allowed together with BYWEEKNO under FREQ=YEARLY")]
    OrdinalWithWeekNo,

    #[error("BYSETPOS requires another BYxxx rule part")]
    SetPosWithoutRule,

    #[error("INTERVAL must be a positive integer")]
    ZeroInterval,

    #[error("COUNT must be a positive integer")]
    ZeroCount,

    #[error("FREQ={0} cannot repeat a date-only start")]
    SubDailyOnDate(Frequency),
}

pub type RuleResult<T> = std::result::Result<T, RuleError>;

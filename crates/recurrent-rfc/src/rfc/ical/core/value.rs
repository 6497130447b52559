//! Typed property values.

use super::{Duration, RRule, Temporal};

/// A parsed property value.
///
/// Properties the engine does not interpret keep their raw text in
/// [`Value::Unknown`] and are written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Unescaped TEXT.
    Text(String),
    /// Comma-separated TEXT list (CATEGORIES, RESOURCES).
    TextList(Vec<String>),
    Integer(i32),
    Temporal(Temporal),
    /// Comma-separated DATE or DATE-TIME list (EXDATE, RDATE).
    TemporalList(Vec<Temporal>),
    Duration(Duration),
    Recur(Box<RRule>),
    Unknown(String),
}

impl Value {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text_list(&self) -> Option<&[String]> {
        match self {
            Self::TextList(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_temporal(&self) -> Option<&Temporal> {
        match self {
            Self::Temporal(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_temporal_list(&self) -> Option<&[Temporal]> {
        match self {
            Self::TemporalList(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_duration(&self) -> Option<&Duration> {
        match self {
            Self::Duration(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_recur(&self) -> Option<&RRule> {
        match self {
            Self::Recur(r) => Some(r),
            _ => None,
        }
    }
}

use thiserror::Error;

use crate::series::ComponentError;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    RfcError(#[from] recurrent_rfc::error::RfcError),

    #[error("Missing revision field: {0}")]
    MissingField(&'static str),

    #[error("Invalid original component: {0}")]
    InvalidOriginal(#[source] ComponentError),

    #[error("Invalid edited component: {0}")]
    InvalidEdited(#[source] ComponentError),

    #[error("{occurrence} is not an occurrence of {uid}")]
    OccurrenceNotInSeries { uid: String, occurrence: String },

    #[error("Parse error: {0}")]
    ParseError(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

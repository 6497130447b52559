use thiserror::Error;

/// Problems found in loaded settings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

//! Error types for monitor construction.

use thiserror::Error;

/// Errors raised while configuring or building a monitor. The streaming path
/// itself is total and never returns an error.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: &'static str },

    #[error("Core error: {message}")]
    Core { message: String },
}

pub type MonitorResult<T> = Result<T, MonitorError>;

impl From<sk_core::CoreError> for MonitorError {
    fn from(e: sk_core::CoreError) -> Self {
        MonitorError::Core {
            message: e.to_string(),
        }
    }
}

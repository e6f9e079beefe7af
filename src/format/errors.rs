//! Format function errors

use thiserror::Error;

use crate::schema::BaseType;

/// Result type for format checks and converters
pub type FormatResult<T> = Result<T, FormatError>;

/// Errors raised by format checks and converters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Value violates the format
    #[error("{reason}")]
    Invalid { reason: String },

    /// Format name has neither a check nor a converter for this base kind
    #[error("format '{name}' is not defined for {base}")]
    Undefined { name: String, base: BaseType },

    /// Value kind the format cannot inspect
    #[error("format cannot be applied to a {actual} value")]
    Unsupported { actual: &'static str },

    /// Converter needed but not registered
    #[error("no converter registered for format '{name}'")]
    MissingConverter { name: String },
}

impl FormatError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        FormatError::Invalid {
            reason: reason.into(),
        }
    }

    /// True when the registry, not the value, is at fault
    pub fn is_registry_gap(&self) -> bool {
        matches!(self, FormatError::Undefined { .. })
    }
}

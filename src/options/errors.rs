//! Option codec errors

use thiserror::Error;

/// Result type for option decoding
pub type OptionResult<T> = Result<T, OptionError>;

/// Errors raised while decoding packed option strings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    /// First character is not in the key table
    #[error("unknown {family} option code '{code}' in {option:?}")]
    UnknownKey {
        family: &'static str,
        code: char,
        option: String,
    },

    /// Option string has no key character
    #[error("empty {family} option string")]
    Empty { family: &'static str },
}

impl OptionError {
    /// Returns the offending key character, if any
    pub fn code(&self) -> Option<char> {
        match self {
            OptionError::UnknownKey { code, .. } => Some(*code),
            OptionError::Empty { .. } => None,
        }
    }
}

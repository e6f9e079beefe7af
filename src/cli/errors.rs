//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit status.

use std::fmt;
use std::io;

use crate::codec::{CodecError, CompileError};
use crate::schema::SchemaError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout, instance files)
    IoError,
    /// Schema document could not be loaded
    SchemaError,
    /// Schema rejected by the compiler
    CompileError,
    /// Encode or decode failed
    CodecError,
    /// At least one instance matched no type
    InvalidInstance,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "JADN_CLI_CONFIG_ERROR",
            Self::IoError => "JADN_CLI_IO_ERROR",
            Self::SchemaError => "JADN_CLI_SCHEMA_ERROR",
            Self::CompileError => "JADN_CLI_COMPILE_ERROR",
            Self::CodecError => "JADN_CLI_CODEC_ERROR",
            Self::InvalidInstance => "JADN_CLI_INVALID_INSTANCE",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Instances that no exported type accepts
    pub fn invalid_instances(count: usize) -> Self {
        Self::new(
            CliErrorCode::InvalidInstance,
            format!("{} instance(s) matched no type", count),
        )
    }

    /// Get the error code
    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::new(CliErrorCode::SchemaError, e.to_string())
    }
}

impl From<CompileError> for CliError {
    fn from(e: CompileError) -> Self {
        Self::new(CliErrorCode::CompileError, e.to_string())
    }
}

impl From<CodecError> for CliError {
    fn from(e: CodecError) -> Self {
        Self::new(CliErrorCode::CodecError, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BaseType;

    #[test]
    fn test_codec_error_keeps_its_text() {
        let err: CliError = CodecError::type_mismatch("Port", BaseType::Integer, "an integer", "\"80\"").into();
        assert_eq!(err.code(), CliErrorCode::CodecError);
        assert!(err.message().starts_with("JADN_TYPE_MISMATCH: Port(Integer)"));
        assert!(err.to_string().starts_with("JADN_CLI_CODEC_ERROR: "));
    }
}

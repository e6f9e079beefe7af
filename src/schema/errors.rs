//! Schema document error types
//!
//! Error codes:
//! - JADN_SCHEMA_IO
//! - JADN_SCHEMA_MALFORMED
//! - JADN_UNKNOWN_BASE_TYPE

use std::fmt;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Schema file could not be read
    JadnSchemaIo,
    /// Document does not have the JADN tuple structure
    JadnSchemaMalformed,
    /// Base type is not a built-in JADN kind
    JadnUnknownBaseType,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::JadnSchemaIo => "JADN_SCHEMA_IO",
            SchemaErrorCode::JadnSchemaMalformed => "JADN_SCHEMA_MALFORMED",
            SchemaErrorCode::JadnUnknownBaseType => "JADN_UNKNOWN_BASE_TYPE",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    /// Type definition being parsed, if known
    type_name: Option<String>,
    /// Source file, if loaded from disk
    path: Option<String>,
}

impl SchemaError {
    /// Create an I/O error for a schema file
    pub fn io(path: impl Into<String>, reason: impl fmt::Display) -> Self {
        let path = path.into();
        Self {
            code: SchemaErrorCode::JadnSchemaIo,
            message: format!("Failed to read schema '{}': {}", path, reason),
            type_name: None,
            path: Some(path),
        }
    }

    /// Create an error for a document that is not valid JADN
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::JadnSchemaMalformed,
            message: reason.into(),
            type_name: None,
            path: None,
        }
    }

    /// Create an error for a malformed type definition
    pub fn malformed_type(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        let name = type_name.into();
        Self {
            code: SchemaErrorCode::JadnSchemaMalformed,
            message: format!("Type '{}': {}", name, reason.into()),
            type_name: Some(name),
            path: None,
        }
    }

    /// Create an unknown base type error
    pub fn unknown_base_type(type_name: impl Into<String>, base_type: &str) -> Self {
        let name = type_name.into();
        Self {
            code: SchemaErrorCode::JadnUnknownBaseType,
            message: format!("Type '{}': unknown base type '{}'", name, base_type),
            type_name: Some(name),
            path: None,
        }
    }

    /// Attaches the source file path
    pub fn at_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the type name if applicable
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Returns the file path if applicable
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)?;
        if let Some(path) = &self.path {
            write!(f, " [{}]", path)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaErrorCode::JadnSchemaIo.code(), "JADN_SCHEMA_IO");
        assert_eq!(SchemaErrorCode::JadnSchemaMalformed.code(), "JADN_SCHEMA_MALFORMED");
        assert_eq!(SchemaErrorCode::JadnUnknownBaseType.code(), "JADN_UNKNOWN_BASE_TYPE");
    }

    #[test]
    fn test_unknown_base_type_names_type() {
        let err = SchemaError::unknown_base_type("Thing", "Object");
        assert_eq!(err.type_name(), Some("Thing"));
        assert!(err.message().contains("Object"));
    }

    #[test]
    fn test_display_includes_path() {
        let err = SchemaError::malformed("types must be an array").at_path("x.jadn");
        let display = format!("{}", err);
        assert!(display.contains("JADN_SCHEMA_MALFORMED"));
        assert!(display.contains("x.jadn"));
    }
}

//! Codec error types
//!
//! Error codes:
//! - JADN_TYPE_MISMATCH
//! - JADN_FORMAT_VIOLATION
//! - JADN_STRUCTURAL_VIOLATION
//! - JADN_REGISTRY_GAP
//!
//! Compile-time problems are reported as [`Diagnostic`]s; a schema with at least
//! one error-level diagnostic is rejected with a [`CompileError`].

use std::fmt;

use thiserror::Error;

use crate::schema::BaseType;

/// Codec error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecErrorCode {
    /// Value kind does not match the declared base kind
    TypeMismatch,
    /// Size, range, pattern or format check failed
    FormatViolation,
    /// Missing or unexpected field, bad choice, unknown key, undefined type
    StructuralViolation,
    /// Format or option the codec cannot resolve
    RegistryGap,
}

impl CodecErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            CodecErrorCode::TypeMismatch => "JADN_TYPE_MISMATCH",
            CodecErrorCode::FormatViolation => "JADN_FORMAT_VIOLATION",
            CodecErrorCode::StructuralViolation => "JADN_STRUCTURAL_VIOLATION",
            CodecErrorCode::RegistryGap => "JADN_REGISTRY_GAP",
        }
    }
}

impl fmt::Display for CodecErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Encode/decode error with the type it was raised for
#[derive(Debug, Clone, PartialEq)]
pub struct CodecError {
    code: CodecErrorCode,
    message: String,
    /// Type being processed; synthesized types carry their `$N` name
    type_name: Option<String>,
    base_type: Option<BaseType>,
    /// Offending value or field
    details: Option<String>,
}

impl CodecError {
    fn new(code: CodecErrorCode, type_name: &str, base_type: BaseType, message: String) -> Self {
        Self {
            code,
            message,
            type_name: Some(type_name.to_string()),
            base_type: Some(base_type),
            details: None,
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(type_name: &str, base_type: BaseType, expected: &str, actual: impl fmt::Display) -> Self {
        Self::new(
            CodecErrorCode::TypeMismatch,
            type_name,
            base_type,
            format!("{} is not {}", actual, expected),
        )
    }

    /// Create a format violation error
    pub fn format_violation(type_name: &str, base_type: BaseType, message: impl Into<String>) -> Self {
        Self::new(CodecErrorCode::FormatViolation, type_name, base_type, message.into())
    }

    /// Create a structural violation error
    pub fn structural(type_name: &str, base_type: BaseType, message: impl Into<String>) -> Self {
        Self::new(CodecErrorCode::StructuralViolation, type_name, base_type, message.into())
    }

    /// Create a registry gap error
    pub fn registry_gap(type_name: &str, base_type: BaseType, message: impl Into<String>) -> Self {
        Self::new(CodecErrorCode::RegistryGap, type_name, base_type, message.into())
    }

    /// Create an error for a type name with no symbol table entry
    pub fn undefined_type(name: &str) -> Self {
        Self {
            code: CodecErrorCode::StructuralViolation,
            message: format!("type \"{}\" is not defined", name),
            type_name: Some(name.to_string()),
            base_type: None,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Returns the error code
    pub fn code(&self) -> CodecErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn base_type(&self) -> Option<BaseType> {
        self.base_type
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.code.code())?;
        match (&self.type_name, self.base_type) {
            (Some(name), Some(base)) => write!(f, "{}({}): ", name, base)?,
            (Some(name), None) => write!(f, "{}: ", name)?,
            _ => {}
        }
        write!(f, "{}", self.message)?;
        if let Some(details) = &self.details {
            write!(f, " [{}]", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for CodecError {}

/// Result type for encode/decode
pub type CodecResult<T> = Result<T, CodecError>;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    Warning,
    Error,
}

impl DiagnosticLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Error => "error",
        }
    }
}

/// Compile-time finding codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    DuplicateType,
    DuplicateId,
    DuplicateName,
    NonOrdinalId,
    ReservedName,
    UnknownOption,
    UnknownFormat,
    InvalidPattern,
    MissingVtype,
    InvalidFallthrough,
    UndefinedType,
}

impl DiagnosticCode {
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticCode::DuplicateType => "JADN_DUPLICATE_TYPE",
            DiagnosticCode::DuplicateId => "JADN_DUPLICATE_ID",
            DiagnosticCode::DuplicateName => "JADN_DUPLICATE_NAME",
            DiagnosticCode::NonOrdinalId => "JADN_NON_ORDINAL_ID",
            DiagnosticCode::ReservedName => "JADN_RESERVED_NAME",
            DiagnosticCode::UnknownOption => "JADN_UNKNOWN_OPTION",
            DiagnosticCode::UnknownFormat => "JADN_UNKNOWN_FORMAT",
            DiagnosticCode::InvalidPattern => "JADN_INVALID_PATTERN",
            DiagnosticCode::MissingVtype => "JADN_MISSING_VTYPE",
            DiagnosticCode::InvalidFallthrough => "JADN_INVALID_FALLTHROUGH",
            DiagnosticCode::UndefinedType => "JADN_UNDEFINED_TYPE",
        }
    }
}

/// A compile-time finding about one type definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub code: DiagnosticCode,
    pub type_name: String,
    pub message: String,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            code,
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    pub fn warning(code: DiagnosticCode, type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            code,
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == DiagnosticLevel::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] {}: {}",
            self.level.as_str(),
            self.code.code(),
            self.type_name,
            self.message
        )
    }
}

/// Schema rejected by the compiler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema rejected with {} error(s): {}", errors(.diagnostics).len(), summary(.diagnostics))]
pub struct CompileError {
    /// Every diagnostic, warnings included
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileError {
    /// Error-level diagnostics only
    pub fn errors(&self) -> Vec<&Diagnostic> {
        errors(&self.diagnostics)
    }
}

fn errors(diagnostics: &[Diagnostic]) -> Vec<&Diagnostic> {
    diagnostics.iter().filter(|d| d.is_error()).collect()
}

fn summary(diagnostics: &[Diagnostic]) -> String {
    errors(diagnostics)
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CodecErrorCode::TypeMismatch.code(), "JADN_TYPE_MISMATCH");
        assert_eq!(CodecErrorCode::FormatViolation.code(), "JADN_FORMAT_VIOLATION");
        assert_eq!(CodecErrorCode::StructuralViolation.code(), "JADN_STRUCTURAL_VIOLATION");
        assert_eq!(CodecErrorCode::RegistryGap.code(), "JADN_REGISTRY_GAP");
    }

    #[test]
    fn test_display_names_type_and_base() {
        let err = CodecError::type_mismatch("Port", BaseType::Integer, "an integer", "1.5");
        assert_eq!(err.to_string(), "JADN_TYPE_MISMATCH: Port(Integer): 1.5 is not an integer");

        let err = CodecError::undefined_type("Missing").with_details("field 'x'");
        assert_eq!(
            err.to_string(),
            "JADN_STRUCTURAL_VIOLATION: Missing: type \"Missing\" is not defined [field 'x']"
        );
        assert_eq!(err.base_type(), None);
    }

    #[test]
    fn test_compile_error_lists_errors_only() {
        let err = CompileError {
            diagnostics: vec![
                Diagnostic::warning(DiagnosticCode::UnknownFormat, "A", "format 'zz' is not defined"),
                Diagnostic::error(DiagnosticCode::DuplicateId, "B", "duplicate field id 1"),
            ],
        };
        assert_eq!(err.errors().len(), 1);
        let text = err.to_string();
        assert!(text.starts_with("schema rejected with 1 error(s)"));
        assert!(text.contains("error[JADN_DUPLICATE_ID] B: duplicate field id 1"));
        assert!(!text.contains("zz"));
    }
}

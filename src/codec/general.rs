//! Checks and error builders shared by the decoders and encoders

use std::fmt;

use super::errors::CodecError;
use super::symtab::{FieldEntry, SymbolEntry};
use crate::format::{FormatError, DEFAULT_BINARY_FORMAT};
use crate::schema::BaseType;
use crate::value::Value;

pub(crate) fn mismatch(entry: &SymbolEntry, expected: &str, actual: impl fmt::Display) -> CodecError {
    CodecError::type_mismatch(entry.name(), entry.base_type(), expected, actual)
}

pub(crate) fn structural(entry: &SymbolEntry, message: impl Into<String>) -> CodecError {
    CodecError::structural(entry.name(), entry.base_type(), message)
}

pub(crate) fn violation(entry: &SymbolEntry, message: impl Into<String>) -> CodecError {
    CodecError::format_violation(entry.name(), entry.base_type(), message)
}

/// Label for a field in messages; positional fields may be unnamed
pub(crate) fn field_label(field: &FieldEntry) -> String {
    if field.name().is_empty() {
        format!("#{}", field.def.id)
    } else {
        field.name().to_string()
    }
}

pub(crate) fn missing_field(entry: &SymbolEntry, field: &FieldEntry) -> CodecError {
    structural(entry, format!("missing required field \"{}\"", field_label(field)))
}

pub(crate) fn unexpected_fields(entry: &SymbolEntry, mut keys: Vec<String>) -> CodecError {
    keys.sort();
    structural(entry, format!("unexpected field: {}", keys.join(", ")))
}

pub(crate) fn too_many_values(entry: &SymbolEntry, count: usize) -> CodecError {
    structural(
        entry,
        format!("{} values given for {} fields", count, entry.fields.len()),
    )
}

pub(crate) fn bad_choice(entry: &SymbolEntry, count: usize) -> CodecError {
    structural(entry, format!("choice must have exactly one value, got {}", count))
}

pub(crate) fn bad_key(entry: &SymbolEntry, key: impl fmt::Display) -> CodecError {
    structural(entry, format!("{} is not a valid field ID", key))
}

pub(crate) fn duplicate_key(entry: &SymbolEntry, key: impl fmt::Display) -> CodecError {
    structural(entry, format!("duplicate field key {}", key))
}

pub(crate) fn not_declared(entry: &SymbolEntry, value: impl fmt::Display) -> CodecError {
    structural(entry, format!("{} is not a valid {}", value, entry.name()))
}

/// Field a `tfield` option points at, with its position
pub(crate) fn discriminator<'e>(
    entry: &'e SymbolEntry,
    field: &FieldEntry,
    tfield: u64,
) -> Result<(usize, &'e FieldEntry), CodecError> {
    entry
        .fields
        .iter()
        .enumerate()
        .find(|(_, f)| f.def.id == tfield)
        .ok_or_else(|| {
            structural(
                entry,
                format!("field \"{}\" selects its type from unknown field {}", field_label(field), tfield),
            )
        })
}

/// Element or byte count against the entry's bounds
pub(crate) fn check_size(entry: &SymbolEntry, len: usize) -> Result<(), CodecError> {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    if let Some(min) = entry.bounds.min {
        if len < min {
            return Err(violation(entry, format!("{} < minimum {}", len, min)));
        }
    }
    if let Some(max) = entry.bounds.max {
        if len > max {
            return Err(violation(entry, format!("{} > maximum {}", len, max)));
        }
    }
    Ok(())
}

pub(crate) fn check_int_range(entry: &SymbolEntry, value: i64) -> Result<(), CodecError> {
    if let Some(min) = entry.bounds.min {
        if value < min {
            return Err(violation(entry, format!("{} < minimum {}", value, min)));
        }
    }
    if let Some(max) = entry.bounds.max {
        if value > max {
            return Err(violation(entry, format!("{} > maximum {}", value, max)));
        }
    }
    Ok(())
}

pub(crate) fn check_number_range(entry: &SymbolEntry, value: f64) -> Result<(), CodecError> {
    if let Some(min) = entry.bounds.min {
        if value < min as f64 {
            return Err(violation(entry, format!("{} < minimum {}", value, min)));
        }
    }
    if let Some(max) = entry.bounds.max {
        if value > max as f64 {
            return Err(violation(entry, format!("{} > maximum {}", value, max)));
        }
    }
    Ok(())
}

pub(crate) fn check_pattern(entry: &SymbolEntry, text: &str) -> Result<(), CodecError> {
    match &entry.pattern {
        Some(regex) if !regex.is_match(text) => Err(violation(
            entry,
            format!("{:?} does not match pattern {}", text, regex.as_str()),
        )),
        _ => Ok(()),
    }
}

/// Fails every value of a type whose format name the registry cannot resolve
pub(crate) fn require_format(entry: &SymbolEntry) -> Result<(), CodecError> {
    if entry.format.is_defined() {
        return Ok(());
    }
    Err(CodecError::registry_gap(
        entry.name(),
        entry.base_type(),
        format!("format '{}' is not defined", entry.format.name()),
    ))
}

/// Runs the entry's format check on a native value
pub(crate) fn check_format(entry: &SymbolEntry, value: &Value) -> Result<(), CodecError> {
    entry.format.check(value).map_err(|e| format_error(entry, value, e))
}

/// Converts a format function failure, naming the value and the format
pub(crate) fn format_error(entry: &SymbolEntry, shown: impl fmt::Display, err: FormatError) -> CodecError {
    let name = match entry.format.name() {
        "" if entry.base_type() == BaseType::Binary => DEFAULT_BINARY_FORMAT,
        name => name,
    };
    match err {
        FormatError::Undefined { .. } => CodecError::registry_gap(
            entry.name(),
            entry.base_type(),
            format!("format '{}' is not defined", name),
        ),
        FormatError::Invalid { reason } => {
            violation(entry, format!("{} is not a valid {}", shown, name)).with_details(reason)
        }
        FormatError::Unsupported { actual } => violation(
            entry,
            format!("{} value is not supported by format {}", actual, name),
        ),
        FormatError::MissingConverter { name } => {
            violation(entry, format!("{} cannot be converted: no converter for format {}", shown, name))
        }
    }
}

//! Schema Loading and Compilation Tests
//!
//! Documents load from disk, option strings round-trip, and the compiler
//! reports problems as diagnostics instead of failing on first use.

use jadn_codec::codec::{
    Codec, CodecConfig, CodecErrorCode, DiagnosticCode, DiagnosticLevel, UndefinedTypePolicy, WireMode,
};
use jadn_codec::format::FormatRegistry;
use jadn_codec::options::{self, map_to_options, OptionValue, TypeOptionKey};
use jadn_codec::schema::{BaseType, SchemaErrorCode, SchemaLoader};
use jadn_codec::Value;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn write_schema(dir: &TempDir, doc: &serde_json::Value) -> std::path::PathBuf {
    let path = dir.path().join("schema.jadn");
    fs::write(&path, serde_json::to_string_pretty(doc).unwrap()).unwrap();
    path
}

fn diagnostic_codes(types: serde_json::Value) -> Vec<DiagnosticCode> {
    let schema = SchemaLoader::from_value(&json!({ "types": types })).unwrap();
    match Codec::new(schema, WireMode::VERBOSE) {
        Ok(codec) => codec.diagnostics().iter().map(|d| d.code).collect(),
        Err(e) => e.diagnostics.iter().map(|d| d.code).collect(),
    }
}

// =============================================================================
// Loader Tests
// =============================================================================

#[test]
fn test_load_file_and_encode() {
    let tmp = TempDir::new().unwrap();
    let path = write_schema(
        &tmp,
        &json!({
            "meta": {"module": "http://example.com/net", "title": "Net", "exports": ["Endpoint"]},
            "types": [
                ["Endpoint", "Record", [], "A host and port", [
                    [1, "host", "String", ["/hostname"], ""],
                    [2, "port", "Integer", ["[0"], ""]
                ]]
            ]
        }),
    );

    let schema = SchemaLoader::load_file(&path).unwrap();
    assert_eq!(schema.meta.exports, vec!["Endpoint"]);
    assert_eq!(schema.types[0].description, "A host and port");

    let codec = Codec::new(schema, WireMode::CONCISE).unwrap();
    let native = Value::map([("host", Value::from("example.com")), ("port", Value::Integer(443))]);
    assert_eq!(codec.encode("Endpoint", &native).unwrap(), json!(["example.com", 443]));
}

#[test]
fn test_save_then_load_is_identical() {
    let tmp = TempDir::new().unwrap();
    let original = SchemaLoader::from_value(&json!({
        "meta": {"module": "http://example.com/m", "exports": ["Color"]},
        "types": [
            ["Color", "Enumerated", [], "", [[1, "Red", "warm"], [2, "Blue", "cool"]]],
            ["List", "ArrayOf", ["*Color", "}4"], ""]
        ]
    }))
    .unwrap();

    let path = tmp.path().join("saved.jadn");
    SchemaLoader::save(&original, &path).unwrap();
    assert_eq!(SchemaLoader::load_file(&path).unwrap(), original);
}

#[test]
fn test_shape_errors_name_the_type() {
    let err = SchemaLoader::from_value(&json!({"types": [["Thing", "Widget", [], ""]]})).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::JadnUnknownBaseType);
    assert_eq!(err.type_name(), Some("Thing"));

    let err = SchemaLoader::from_value(&json!({"types": [["Flag", "Boolean", [], "", []]]})).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::JadnSchemaMalformed);
    assert_eq!(err.type_name(), Some("Flag"));

    let tmp = TempDir::new().unwrap();
    let err = SchemaLoader::load_file(&tmp.path().join("missing.jadn")).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::JadnSchemaIo);
}

// =============================================================================
// Option Tests
// =============================================================================

#[test]
fn test_options_roundtrip_in_table_order() {
    let packed = ["}10", "/hostname", "{1"];
    let map = options::type_options(&packed).unwrap();
    assert_eq!(map.get(TypeOptionKey::Min), Some(&OptionValue::Integer(1)));
    assert_eq!(map.text(TypeOptionKey::Format), Some("hostname"));
    assert_eq!(map_to_options(&map), vec!["/hostname", "{1", "}10"]);
}

#[test]
fn test_unknown_option_code_named() {
    let err = options::type_options(&["?x"]).unwrap_err();
    assert!(err.to_string().contains('?'));
    assert!(options::field_options(&["[0", "&2"]).is_ok());
}

// =============================================================================
// Diagnostic Tests
// =============================================================================

#[test]
fn test_duplicate_and_ordinal_diagnostics() {
    let codes = diagnostic_codes(json!([
        ["Pair", "Record", [], "", [[1, "a", "String", [], ""], [1, "a", "String", [], ""]]]
    ]));
    assert!(codes.contains(&DiagnosticCode::DuplicateId));
    assert!(codes.contains(&DiagnosticCode::DuplicateName));
    assert!(codes.contains(&DiagnosticCode::NonOrdinalId));
}

#[test]
fn test_every_error_reported_together() {
    let schema = SchemaLoader::from_value(&json!({"types": [
        ["Integer", "String", [], ""],
        ["List", "ArrayOf", [], ""],
        ["Word", "String", ["%["], ""],
        ["Zip", "String", ["/zip-code"], ""]
    ]}))
    .unwrap();
    let err = Codec::new(schema, WireMode::VERBOSE).unwrap_err();

    let errors: Vec<DiagnosticCode> = err.errors().iter().map(|d| d.code).collect();
    assert_eq!(
        errors,
        vec![DiagnosticCode::ReservedName, DiagnosticCode::MissingVtype, DiagnosticCode::InvalidPattern]
    );
    let warning = err.diagnostics.iter().find(|d| d.level == DiagnosticLevel::Warning).unwrap();
    assert_eq!(warning.code, DiagnosticCode::UnknownFormat);
}

#[test]
fn test_fallthrough_must_reference_choice() {
    let codes = diagnostic_codes(json!([
        ["Inner", "Record", [], "", [[1, "a", "String", [], ""]]],
        ["Outer", "Record", [], "", [[1, "<", "Inner", [], ""]]]
    ]));
    assert_eq!(codes, vec![DiagnosticCode::InvalidFallthrough]);
}

// =============================================================================
// Undefined Reference Policy Tests
// =============================================================================

#[test]
fn test_undefined_reference_deferred_by_default() {
    let schema = SchemaLoader::from_value(&json!({"types": [
        ["Wrapper", "Record", [], "", [
            [1, "known", "String", [], ""],
            [2, "later", "Missing", ["[0"], ""]
        ]]
    ]}))
    .unwrap();
    let codec = Codec::new(schema, WireMode::VERBOSE).unwrap();
    assert_eq!(codec.diagnostics()[0].code, DiagnosticCode::UndefinedType);

    // Unused references do not get in the way
    assert!(codec.decode("Wrapper", &json!({"known": "x"})).is_ok());

    let err = codec.decode("Wrapper", &json!({"known": "x", "later": 1})).unwrap_err();
    assert_eq!(err.code(), CodecErrorCode::StructuralViolation);
    assert_eq!(err.message(), "type \"Missing\" is not defined");
}

#[test]
fn test_undefined_reference_rejected_by_policy() {
    let schema = SchemaLoader::from_value(&json!({"types": [
        ["Wrapper", "ArrayOf", ["*Missing"], ""]
    ]}))
    .unwrap();
    let config = CodecConfig::default().with_undefined_types(UndefinedTypePolicy::Reject);
    let err = Codec::with_config(schema, WireMode::VERBOSE, config, FormatRegistry::standard()).unwrap_err();
    assert_eq!(err.errors()[0].code, DiagnosticCode::UndefinedType);
    assert!(err.to_string().contains("Missing"));
}

// =============================================================================
// Registry Tests
// =============================================================================

#[test]
fn test_caller_defined_format() {
    fn even(value: &Value) -> jadn_codec::format::FormatResult<()> {
        match value {
            Value::Integer(i) if i % 2 == 0 => Ok(()),
            _ => Err(jadn_codec::format::FormatError::invalid("odd")),
        }
    }

    let schema = SchemaLoader::from_value(&json!({"types": [["Even", "Integer", ["/even"], ""]]})).unwrap();
    let registry = FormatRegistry::standard().with_check("even", BaseType::Integer, even);
    let codec = Codec::with_config(schema, WireMode::VERBOSE, CodecConfig::default(), registry).unwrap();

    assert!(codec.diagnostics().is_empty());
    assert!(codec.decode("Even", &json!(4)).is_ok());
    let err = codec.decode("Even", &json!(3)).unwrap_err();
    assert_eq!(err.code(), CodecErrorCode::FormatViolation);
    assert_eq!(err.details(), Some("odd"));
}

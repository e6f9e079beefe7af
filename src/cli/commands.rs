//! CLI command implementations
//!
//! Each command loads the schema, compiles it for the configured wire mode and
//! then converts values. Responses go to stdout; logs go to stderr.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::{Codec, CodecConfig, CodecResult, WireMode};
use crate::format::FormatRegistry;
use crate::observability::{log_event_with_fields, Event, Severity};
use crate::schema::SchemaLoader;
use crate::value::Value as Native;

use super::args::{Cli, Command, ValueArgs};
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Wire mode name (optional, default "verbose")
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Minimum log severity (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Codec limits and policies
    #[serde(default)]
    pub codec: CodecConfig,
}

fn default_mode() -> String {
    WireMode::VERBOSE.name().to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            log_level: default_log_level(),
            codec: CodecConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        config.log(Event::ConfigLoaded, &[("path", &path.display().to_string())]);
        Ok(config)
    }

    pub fn validate(&self) -> CliResult<()> {
        self.wire_mode()?;
        self.severity()?;
        self.codec
            .validate()
            .map_err(|e| CliError::config_error(format!("Invalid codec config: {}", e)))
    }

    pub fn wire_mode(&self) -> CliResult<WireMode> {
        WireMode::from_name(&self.mode).ok_or_else(|| {
            CliError::config_error(format!(
                "Invalid mode: '{}'. Expected verbose, concise, m2m or map-tag.",
                self.mode
            ))
        })
    }

    pub fn severity(&self) -> CliResult<Severity> {
        Severity::from_name(&self.log_level)
            .ok_or_else(|| CliError::config_error(format!("Invalid log_level: '{}'", self.log_level)))
    }

    /// Whether events of `severity` pass the configured `log_level`
    pub fn logs(&self, severity: Severity) -> bool {
        self.severity().map_or(true, |min| severity >= min)
    }

    /// Logs an event unless it is below the configured `log_level`
    pub fn log(&self, event: Event, fields: &[(&str, &str)]) {
        if self.logs(event.severity()) {
            log_event_with_fields(event, fields);
        }
    }
}

/// Outcome of checking one instance file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceReport {
    pub instance: String,
    /// Types that decode the instance
    pub accepted_as: Vec<String>,
    /// First error per rejecting type, when no type accepts it
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
}

impl InstanceReport {
    pub fn is_valid(&self) -> bool {
        !self.accepted_as.is_empty()
    }
}

/// Main entry point for CLI
pub fn run() -> CliResult<()> {
    run_command(Cli::parse_args())
}

/// Dispatch a parsed command line
pub fn run_command(cli: Cli) -> CliResult<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(mode) = cli.mode {
        config.mode = mode;
        config.validate()?;
    }

    match cli.command {
        Command::Validate { schema, instances } => {
            let codec = build_codec(&schema, &config)?;
            let reports = validate_instances(&codec, &instances, &config)?;
            let invalid = reports.iter().filter(|r| !r.is_valid()).count();
            write_response(serde_json::to_value(&reports)?)?;
            if invalid > 0 {
                return Err(CliError::invalid_instances(invalid));
            }
            Ok(())
        }
        Command::Decode(ValueArgs { schema, type_name }) => {
            let codec = build_codec(&schema, &config)?;
            let wire = read_request()?;
            respond(&config, Event::DecodeComplete, &type_name, decode_value(&codec, &type_name, &wire))
        }
        Command::Encode(ValueArgs { schema, type_name }) => {
            let codec = build_codec(&schema, &config)?;
            let native = read_request()?;
            respond(&config, Event::EncodeComplete, &type_name, encode_value(&codec, &type_name, &native))
        }
    }
}

fn respond(config: &Config, done: Event, type_name: &str, result: CodecResult<Value>) -> CliResult<()> {
    match result {
        Ok(data) => {
            config.log(done, &[("type", type_name)]);
            write_response(data)
        }
        Err(e) => {
            config.log(
                Event::CodecFailed,
                &[("type", type_name), ("code", e.code().code()), ("message", e.message())],
            );
            write_error(e.code().code(), &e.to_string())?;
            Err(e.into())
        }
    }
}

/// Loads and compiles a schema with the configured mode and limits
pub fn build_codec(schema_path: &Path, config: &Config) -> CliResult<Codec> {
    let path = schema_path.display().to_string();
    let schema = SchemaLoader::load_file(schema_path)?;
    config.log(
        Event::SchemaLoaded,
        &[("path", &path), ("types", &schema.types.len().to_string())],
    );

    let mode = config.wire_mode()?;
    let codec = Codec::with_config(schema, mode, config.codec.clone(), FormatRegistry::standard()).map_err(|e| {
        config.log(
            Event::SchemaRejected,
            &[("path", &path), ("errors", &e.errors().len().to_string())],
        );
        CliError::from(e)
    })?;

    for diagnostic in codec.diagnostics() {
        config.log(
            Event::CompileWarning,
            &[
                ("code", diagnostic.code.code()),
                ("type", &diagnostic.type_name),
                ("message", &diagnostic.message),
            ],
        );
    }
    config.log(Event::SchemaCompiled, &[("path", &path), ("mode", mode.name())]);
    Ok(codec)
}

/// Decodes every instance file against each exported type (all types when the
/// schema exports none)
pub fn validate_instances(codec: &Codec, instances: &[PathBuf], config: &Config) -> CliResult<Vec<InstanceReport>> {
    let schema = codec.schema();
    let targets: Vec<&str> = if schema.meta.exports.is_empty() {
        schema.types.iter().map(|t| t.name.as_str()).collect()
    } else {
        schema.meta.exports.iter().map(String::as_str).collect()
    };

    let mut reports = Vec::with_capacity(instances.len());
    for path in instances {
        let instance = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::io_error(format!("Failed to read instance '{}': {}", instance, e)))?;
        let wire: Value = serde_json::from_str(&content)?;

        let mut accepted_as = Vec::new();
        let mut errors = BTreeMap::new();
        for target in &targets {
            match codec.decode(target, &wire) {
                Ok(_) => accepted_as.push(target.to_string()),
                Err(e) => {
                    errors.insert(target.to_string(), e.to_string());
                }
            }
        }

        if accepted_as.is_empty() {
            config.log(Event::InstanceInvalid, &[("instance", &instance)]);
        } else {
            errors.clear();
            config.log(
                Event::InstanceValid,
                &[("instance", &instance), ("types", &accepted_as.join(","))],
            );
        }
        reports.push(InstanceReport {
            instance,
            accepted_as,
            errors,
        });
    }
    Ok(reports)
}

/// Wire value to the JSON rendering of its native form
pub fn decode_value(codec: &Codec, type_name: &str, wire: &Value) -> CodecResult<Value> {
    codec.decode(type_name, wire).map(|native| native.to_json())
}

/// JSON rendering of a native value to its wire form.
///
/// JSON carries no binary values, so types that need native bytes cannot be
/// encoded from this form.
pub fn encode_value(codec: &Codec, type_name: &str, native: &Value) -> CodecResult<Value> {
    codec.encode(type_name, &Native::from_json(native))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliErrorCode;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &Value) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    fn point_schema(dir: &TempDir) -> PathBuf {
        write_file(
            dir,
            "point.jadn",
            &json!({
                "meta": {"module": "http://example.com/point", "exports": ["Point"]},
                "types": [
                    ["Point", "Record", [], "", [[1, "x", "Integer", [], ""], [2, "y", "Integer", [], ""]]],
                    ["Color", "Enumerated", [], "", [[1, "Red", ""], [2, "Green", ""]]]
                ]
            }),
        )
    }

    #[test]
    fn test_config_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(&temp_dir, "config.json", &json!({}));
        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.wire_mode().unwrap(), WireMode::VERBOSE);
        assert_eq!(config.codec.max_string, 255);
    }

    #[test]
    fn test_config_validates_mode() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(&temp_dir, "config.json", &json!({"mode": "compact"}));
        let err = Config::load(&path).unwrap_err();
        assert!(err.message().contains("Invalid mode"));

        let path = write_file(&temp_dir, "levels.json", &json!({"log_level": "loud"}));
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_config_codec_section() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(
            &temp_dir,
            "config.json",
            &json!({"mode": "m2m", "codec": {"max_elements": 5, "undefined_types": "reject"}}),
        );
        let config = Config::load(&path).unwrap();
        assert_eq!(config.wire_mode().unwrap(), WireMode::M2M);
        assert_eq!(config.codec.max_elements, 5);

        let path = write_file(&temp_dir, "zero.json", &json!({"codec": {"max_binary": 0}}));
        assert!(Config::load(&path).unwrap_err().message().contains("max_binary"));
    }

    #[test]
    fn test_validate_reports_accepting_types() {
        let temp_dir = TempDir::new().unwrap();
        let schema = point_schema(&temp_dir);
        let good = write_file(&temp_dir, "good.json", &json!({"x": 1, "y": 2}));
        let bad = write_file(&temp_dir, "bad.json", &json!({"x": 1, "z": 2}));

        let codec = build_codec(&schema, &Config::default()).unwrap();
        let reports = validate_instances(&codec, &[good, bad], &Config::default()).unwrap();

        assert_eq!(reports[0].accepted_as, vec!["Point"]);
        assert!(reports[0].errors.is_empty());
        assert!(!reports[1].is_valid());
        assert!(reports[1].errors["Point"].contains("JADN_STRUCTURAL_VIOLATION"));
    }

    #[test]
    fn test_decode_and_encode_values() {
        let temp_dir = TempDir::new().unwrap();
        let schema = point_schema(&temp_dir);
        let config = Config {
            mode: "m2m".into(),
            ..Config::default()
        };
        let codec = build_codec(&schema, &config).unwrap();

        assert_eq!(decode_value(&codec, "Point", &json!([3, 4])).unwrap(), json!({"x": 3, "y": 4}));
        assert_eq!(encode_value(&codec, "Color", &json!("Green")).unwrap(), json!(2));
    }

    #[test]
    fn test_log_level_filters_events() {
        let quiet = Config {
            log_level: "warn".into(),
            ..Config::default()
        };
        assert!(!quiet.logs(Event::SchemaCompiled.severity()));
        assert!(quiet.logs(Event::CompileWarning.severity()));
        assert!(quiet.logs(Event::CodecFailed.severity()));
        assert!(Config::default().logs(Event::SchemaLoaded.severity()));
        assert!(!Config::default().logs(Severity::Trace));
    }

    #[test]
    fn test_missing_schema_is_schema_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = build_codec(&temp_dir.path().join("none.jadn"), &Config::default()).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::SchemaError);
    }
}

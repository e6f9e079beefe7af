//! Codec configuration and wire modes

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire encoding mode
///
/// Two independent axes: structured types as objects or positional arrays, and
/// identifiers as names or integer tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WireMode {
    /// Records encode as objects keyed by field identifier
    pub record_as_map: bool,
    /// Identifiers are names rather than tags
    pub identifiers_as_names: bool,
}

impl WireMode {
    /// Objects keyed by name
    pub const VERBOSE: WireMode = WireMode::new(true, true);
    /// Arrays, tags for enumerations and choices
    pub const M2M: WireMode = WireMode::new(false, false);
    /// Arrays, names for enumerations and choices
    pub const CONCISE: WireMode = WireMode::new(false, true);
    /// Objects keyed by tag
    pub const MAP_TAG: WireMode = WireMode::new(true, false);

    pub const fn new(record_as_map: bool, identifiers_as_names: bool) -> Self {
        Self {
            record_as_map,
            identifiers_as_names,
        }
    }

    pub fn name(&self) -> &'static str {
        match (self.record_as_map, self.identifiers_as_names) {
            (true, true) => "verbose",
            (false, false) => "m2m",
            (false, true) => "concise",
            (true, false) => "map-tag",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "verbose" => Some(Self::VERBOSE),
            "m2m" => Some(Self::M2M),
            "concise" => Some(Self::CONCISE),
            "map-tag" => Some(Self::MAP_TAG),
            _ => None,
        }
    }
}

impl fmt::Display for WireMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handling of field and option references to types the schema does not define
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedTypePolicy {
    /// Warn at compile time, fail when the reference is used
    #[default]
    Deferred,
    /// Reject the schema
    Reject,
}

/// Codec limits and policies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Element ceiling for ArrayOf/MapOf without an explicit max
    #[serde(default = "default_max_elements")]
    pub max_elements: u64,

    /// Character ceiling for String without an explicit max
    #[serde(default = "default_max_string")]
    pub max_string: u64,

    /// Byte ceiling for Binary without an explicit max
    #[serde(default = "default_max_binary")]
    pub max_binary: u64,

    #[serde(default)]
    pub undefined_types: UndefinedTypePolicy,
}

fn default_max_elements() -> u64 {
    100
}
fn default_max_string() -> u64 {
    255
}
fn default_max_binary() -> u64 {
    1000
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_elements: default_max_elements(),
            max_string: default_max_string(),
            max_binary: default_max_binary(),
            undefined_types: UndefinedTypePolicy::default(),
        }
    }
}

impl CodecConfig {
    pub fn with_undefined_types(mut self, policy: UndefinedTypePolicy) -> Self {
        self.undefined_types = policy;
        self
    }

    /// Checks that every ceiling is usable
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("max_elements", self.max_elements),
            ("max_string", self.max_string),
            ("max_binary", self.max_binary),
        ] {
            if value == 0 {
                return Err(format!("{} must be > 0", name));
            }
            if value > i64::MAX as u64 {
                return Err(format!("{} is too large", name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names_roundtrip() {
        for mode in [WireMode::VERBOSE, WireMode::M2M, WireMode::CONCISE, WireMode::MAP_TAG] {
            assert_eq!(WireMode::from_name(mode.name()), Some(mode));
        }
        assert_eq!(WireMode::from_name("minified"), None);
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: CodecConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CodecConfig::default());
        assert_eq!(config.max_elements, 100);
        assert_eq!(config.max_string, 255);
        assert_eq!(config.max_binary, 1000);
        assert_eq!(config.undefined_types, UndefinedTypePolicy::Deferred);
    }

    #[test]
    fn test_policy_serialized_snake_case() {
        let config: CodecConfig = serde_json::from_str(r#"{"undefined_types": "reject"}"#).unwrap();
        assert_eq!(config.undefined_types, UndefinedTypePolicy::Reject);
    }

    #[test]
    fn test_zero_ceiling_invalid() {
        let config = CodecConfig {
            max_string: 0,
            ..CodecConfig::default()
        };
        assert_eq!(config.validate().unwrap_err(), "max_string must be > 0");
        assert!(CodecConfig::default().validate().is_ok());
    }
}

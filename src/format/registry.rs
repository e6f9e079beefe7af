//! Format function registry
//!
//! Maps `(format name, base kind)` to a semantic check and, for Binary and Array
//! types, a converter between the wire form and the native form. The registry is
//! an immutable value handed to the schema compiler.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value as Json;

use super::convert::{b2s_base64url, b2s_hex, s2b_base64url, s2b_hex};
use super::errors::{FormatError, FormatResult};
use super::network;
use super::validate;
use crate::schema::BaseType;
use crate::value::Value;

/// Semantic check on a native value
pub type CheckFn = fn(&Value) -> FormatResult<()>;
/// Native bytes to wire text
pub type BinToStr = fn(&[u8]) -> FormatResult<String>;
/// Wire text to native bytes
pub type StrToBin = fn(&str) -> FormatResult<Vec<u8>>;
/// Wire parts to native text
pub type PartsToStr = fn(&[Json]) -> FormatResult<String>;
/// Native text to wire parts
pub type StrToParts = fn(&str) -> FormatResult<Vec<Json>>;

/// Default Binary converter
pub const DEFAULT_BINARY_FORMAT: &str = "b";

/// Outcome of a check lookup
#[derive(Clone, Copy)]
pub enum Check {
    /// No format, or a converter-only format
    Pass,
    Apply(CheckFn),
    /// Unknown format name; every value fails
    Undefined,
}

/// Wire/native converter attached to a format
#[derive(Clone, Copy)]
pub enum Converter {
    None,
    Binary { to_text: BinToStr, from_text: StrToBin },
    Multipart { to_text: PartsToStr, from_text: StrToParts },
}

/// Functions resolved for one type
#[derive(Clone)]
pub struct FormatFns {
    name: String,
    base: BaseType,
    check: Check,
    converter: Converter,
}

impl FormatFns {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_defined(&self) -> bool {
        !matches!(self.check, Check::Undefined)
    }

    pub fn has_multipart(&self) -> bool {
        matches!(self.converter, Converter::Multipart { .. })
    }

    /// Runs the semantic check
    pub fn check(&self, value: &Value) -> FormatResult<()> {
        match self.check {
            Check::Pass => Ok(()),
            Check::Apply(f) => f(value),
            Check::Undefined => Err(FormatError::Undefined {
                name: self.name.clone(),
                base: self.base,
            }),
        }
    }

    /// Native bytes to wire text
    pub fn bin_to_str(&self, bytes: &[u8]) -> FormatResult<String> {
        match self.converter {
            Converter::Binary { to_text, .. } => to_text(bytes),
            _ => Err(self.missing_converter()),
        }
    }

    /// Wire text to native bytes
    pub fn str_to_bin(&self, text: &str) -> FormatResult<Vec<u8>> {
        match self.converter {
            Converter::Binary { from_text, .. } => from_text(text),
            _ => Err(self.missing_converter()),
        }
    }

    /// Wire parts to native text
    pub fn parts_to_str(&self, parts: &[Json]) -> FormatResult<String> {
        match self.converter {
            Converter::Multipart { to_text, .. } => to_text(parts),
            _ => Err(self.missing_converter()),
        }
    }

    /// Native text to wire parts
    pub fn str_to_parts(&self, text: &str) -> FormatResult<Vec<Json>> {
        match self.converter {
            Converter::Multipart { from_text, .. } => from_text(text),
            _ => Err(self.missing_converter()),
        }
    }

    fn missing_converter(&self) -> FormatError {
        let name = if self.name.is_empty() && self.base == BaseType::Binary {
            DEFAULT_BINARY_FORMAT
        } else {
            &self.name
        };
        FormatError::MissingConverter { name: name.to_string() }
    }
}

impl fmt::Debug for FormatFns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatFns")
            .field("name", &self.name)
            .field("base", &self.base)
            .field("defined", &self.is_defined())
            .finish()
    }
}

/// Registry of named formats
#[derive(Clone, Default)]
pub struct FormatRegistry {
    checks: HashMap<(String, BaseType), CheckFn>,
    binary: HashMap<String, (BinToStr, StrToBin)>,
    multipart: HashMap<String, (PartsToStr, StrToParts)>,
}

impl FormatRegistry {
    /// Registry with no formats at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the built-in checks and converters
    pub fn standard() -> Self {
        Self::empty()
            .with_check("hostname", BaseType::String, validate::check_hostname)
            .with_check("email", BaseType::String, validate::check_email)
            .with_check("uri", BaseType::String, validate::check_uri)
            .with_check("ip-addr", BaseType::Binary, network::check_ip_addr)
            .with_check("ipv4-addr", BaseType::Binary, network::check_ipv4_addr)
            .with_check("ipv6-addr", BaseType::Binary, network::check_ipv6_addr)
            .with_check("mac-addr", BaseType::Binary, network::check_mac_addr)
            .with_check("eui", BaseType::Binary, network::check_mac_addr)
            .with_check("i8", BaseType::Integer, validate::check_i8)
            .with_check("i16", BaseType::Integer, validate::check_i16)
            .with_check("i32", BaseType::Integer, validate::check_i32)
            .with_check("u8", BaseType::Integer, validate::check_u8)
            .with_check("u16", BaseType::Integer, validate::check_u16)
            .with_check("u32", BaseType::Integer, validate::check_u32)
            .with_binary_converter(DEFAULT_BINARY_FORMAT, b2s_base64url, s2b_base64url)
            .with_binary_converter("x", b2s_hex, s2b_hex)
            .with_binary_converter("ip-addr", network::b2s_ip_addr, network::s2b_ip_addr)
            .with_binary_converter("ipv4-addr", network::b2s_ipv4_addr, network::s2b_ipv4_addr)
            .with_binary_converter("ipv6-addr", network::b2s_ipv6_addr, network::s2b_ipv6_addr)
            .with_multipart_converter("ip-net", network::a2s_ip_net, network::s2a_ip_net)
            .with_multipart_converter("ipv4-net", network::a2s_ipv4_net, network::s2a_ipv4_net)
            .with_multipart_converter("ipv6-net", network::a2s_ipv6_net, network::s2a_ipv6_net)
    }

    /// Adds or replaces a semantic check
    pub fn with_check(mut self, name: impl Into<String>, base: BaseType, check: CheckFn) -> Self {
        self.checks.insert((name.into(), base), check);
        self
    }

    /// Adds or replaces a Binary converter
    pub fn with_binary_converter(mut self, name: impl Into<String>, to_text: BinToStr, from_text: StrToBin) -> Self {
        self.binary.insert(name.into(), (to_text, from_text));
        self
    }

    /// Adds or replaces an Array multipart converter
    pub fn with_multipart_converter(
        mut self,
        name: impl Into<String>,
        to_text: PartsToStr,
        from_text: StrToParts,
    ) -> Self {
        self.multipart.insert(name.into(), (to_text, from_text));
        self
    }

    /// True when `name` resolves to something for `base`
    pub fn is_defined(&self, name: &str, base: BaseType) -> bool {
        self.lookup(name, base).is_defined()
    }

    /// Resolves the functions for a type's `format` option
    pub fn lookup(&self, name: &str, base: BaseType) -> FormatFns {
        let converter = match base {
            BaseType::Binary => self
                .binary
                .get(name)
                .or_else(|| self.binary.get(DEFAULT_BINARY_FORMAT))
                .map_or(Converter::None, |(to_text, from_text)| Converter::Binary {
                    to_text: *to_text,
                    from_text: *from_text,
                }),
            BaseType::Array => self
                .multipart
                .get(name)
                .map_or(Converter::None, |(to_text, from_text)| Converter::Multipart {
                    to_text: *to_text,
                    from_text: *from_text,
                }),
            _ => Converter::None,
        };

        let named_converter = match base {
            BaseType::Binary => self.binary.contains_key(name),
            BaseType::Array => self.multipart.contains_key(name),
            _ => false,
        };

        let check = match self.checks.get(&(name.to_string(), base)) {
            Some(f) => Check::Apply(*f),
            None if name.is_empty() || named_converter => Check::Pass,
            None => Check::Undefined,
        };

        FormatFns {
            name: name.to_string(),
            base,
            check,
            converter,
        }
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut checks: Vec<String> = self.checks.keys().map(|(n, b)| format!("{}:{}", n, b)).collect();
        checks.sort();
        let mut converters: Vec<&str> = self.binary.keys().chain(self.multipart.keys()).map(String::as_str).collect();
        converters.sort_unstable();
        f.debug_struct("FormatRegistry")
            .field("checks", &checks)
            .field("converters", &converters)
            .finish()
    }
}

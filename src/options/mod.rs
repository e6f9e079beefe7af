//! Option mini-language
//!
//! Type and field options travel as short strings: a single key character followed
//! by the value text (`"{1"`, `"/hostname"`, `"="`). This module converts between
//! that packed form and a structured map keyed by [`TypeOptionKey`] or
//! [`FieldOptionKey`].

mod errors;
mod table;

pub use errors::{OptionError, OptionResult};
pub use table::{FieldOptionKey, OptionKey, TypeOptionKey, ValueKind};

use std::collections::BTreeMap;

/// Value of a decoded option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Flag,
    Integer(i64),
    Text(String),
}

/// Decoded options, ordered canonically by key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionMap<K: OptionKey> {
    entries: BTreeMap<K, OptionValue>,
}

/// Decoded type options
pub type TypeOptions = OptionMap<TypeOptionKey>;

/// Decoded field options
pub type FieldOptions = OptionMap<FieldOptionKey>;

impl<K: OptionKey> Default for OptionMap<K> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: OptionKey> OptionMap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: K, value: OptionValue) {
        self.entries.insert(key, value);
    }

    pub fn with(mut self, key: K, value: OptionValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: K) -> Option<&OptionValue> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: K) -> bool {
        self.entries.contains_key(&key)
    }

    /// Integer value of `key`, if present and integer-valued
    pub fn int(&self, key: K) -> Option<i64> {
        match self.entries.get(&key) {
            Some(OptionValue::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    /// Text value of `key`, if present and text-valued
    pub fn text(&self, key: K) -> Option<&str> {
        match self.entries.get(&key) {
            Some(OptionValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decodes packed option strings into an option map.
///
/// Integer values that do not parse fall back to 1.
pub fn options_to_map<K, S>(entries: &[S]) -> OptionResult<OptionMap<K>>
where
    K: OptionKey,
    S: AsRef<str>,
{
    let mut map = OptionMap::new();
    for entry in entries {
        let entry = entry.as_ref();
        let mut chars = entry.chars();
        let code = chars.next().ok_or(OptionError::Empty { family: K::FAMILY })?;
        let key = K::from_code(code).ok_or_else(|| OptionError::UnknownKey {
            family: K::FAMILY,
            code,
            option: entry.to_string(),
        })?;
        let rest = chars.as_str();
        let value = match key.kind() {
            ValueKind::Flag => OptionValue::Flag,
            ValueKind::Integer => OptionValue::Integer(rest.parse().unwrap_or(1)),
            ValueKind::Text => OptionValue::Text(rest.to_string()),
        };
        map.insert(key, value);
    }
    Ok(map)
}

/// Encodes an option map back into packed strings, in canonical key order.
pub fn map_to_options<K: OptionKey>(map: &OptionMap<K>) -> Vec<String> {
    map.iter()
        .map(|(key, value)| match value {
            OptionValue::Flag => key.code().to_string(),
            OptionValue::Integer(i) => format!("{}{}", key.code(), i),
            OptionValue::Text(s) => format!("{}{}", key.code(), s),
        })
        .collect()
}

/// Decodes type option strings
pub fn type_options<S: AsRef<str>>(entries: &[S]) -> OptionResult<TypeOptions> {
    options_to_map(entries)
}

/// Decodes field option strings
pub fn field_options<S: AsRef<str>>(entries: &[S]) -> OptionResult<FieldOptions> {
    options_to_map(entries)
}

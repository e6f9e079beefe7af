//! Option key tables
//!
//! An option string's first character is the key code; the rest is the value.
//! Both tables are closed: a code outside them is rejected.
//!
//! | family | code | name    | value   |
//! |--------|------|---------|---------|
//! | type   | `=`  | id      | flag    |
//! | type   | `*`  | vtype   | text    |
//! | type   | `+`  | ktype   | text    |
//! | type   | `#`  | enum    | text    |
//! | type   | `/`  | format  | text    |
//! | type   | `%`  | pattern | text    |
//! | type   | `{`  | min     | integer |
//! | type   | `}`  | max     | integer |
//! | type   | `!`  | default | text    |
//! | field  | `[`  | min     | integer |
//! | field  | `]`  | max     | integer |
//! | field  | `&`  | tfield  | integer |
//! | field  | `*`  | vtype   | text    |
//! | field  | `!`  | default | text    |

use std::fmt;

/// How the value part of an option string is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Presence only, no value characters
    Flag,
    Integer,
    Text,
}

/// A closed option key table
pub trait OptionKey: Copy + Ord + fmt::Debug + 'static {
    /// Family name used in error messages
    const FAMILY: &'static str;

    /// All keys, in canonical order
    fn all() -> &'static [Self];

    fn code(self) -> char;

    fn name(self) -> &'static str;

    fn kind(self) -> ValueKind;

    fn from_code(code: char) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.code() == code)
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name)
    }
}

/// Type-level option keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeOptionKey {
    /// Identifiers are tags, not names
    Id,
    /// Element type of ArrayOf / MapOf
    Vtype,
    /// Key type of MapOf
    Ktype,
    /// Enumerated derived from the fields of another type
    Enum,
    Format,
    Pattern,
    Min,
    Max,
    Default,
}

impl OptionKey for TypeOptionKey {
    const FAMILY: &'static str = "type";

    fn all() -> &'static [Self] {
        &[
            TypeOptionKey::Id,
            TypeOptionKey::Vtype,
            TypeOptionKey::Ktype,
            TypeOptionKey::Enum,
            TypeOptionKey::Format,
            TypeOptionKey::Pattern,
            TypeOptionKey::Min,
            TypeOptionKey::Max,
            TypeOptionKey::Default,
        ]
    }

    fn code(self) -> char {
        match self {
            TypeOptionKey::Id => '=',
            TypeOptionKey::Vtype => '*',
            TypeOptionKey::Ktype => '+',
            TypeOptionKey::Enum => '#',
            TypeOptionKey::Format => '/',
            TypeOptionKey::Pattern => '%',
            TypeOptionKey::Min => '{',
            TypeOptionKey::Max => '}',
            TypeOptionKey::Default => '!',
        }
    }

    fn name(self) -> &'static str {
        match self {
            TypeOptionKey::Id => "id",
            TypeOptionKey::Vtype => "vtype",
            TypeOptionKey::Ktype => "ktype",
            TypeOptionKey::Enum => "enum",
            TypeOptionKey::Format => "format",
            TypeOptionKey::Pattern => "pattern",
            TypeOptionKey::Min => "min",
            TypeOptionKey::Max => "max",
            TypeOptionKey::Default => "default",
        }
    }

    fn kind(self) -> ValueKind {
        match self {
            TypeOptionKey::Id => ValueKind::Flag,
            TypeOptionKey::Min | TypeOptionKey::Max => ValueKind::Integer,
            _ => ValueKind::Text,
        }
    }
}

/// Field-level option keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldOptionKey {
    /// Minimum cardinality; 0 makes the field optional
    Min,
    /// Maximum cardinality; anything but 1 makes the field an array
    Max,
    /// Id of the field whose value selects this field's type
    Tfield,
    /// Referenced type for a derived Enumerated field
    Vtype,
    Default,
}

impl OptionKey for FieldOptionKey {
    const FAMILY: &'static str = "field";

    fn all() -> &'static [Self] {
        &[
            FieldOptionKey::Min,
            FieldOptionKey::Max,
            FieldOptionKey::Tfield,
            FieldOptionKey::Vtype,
            FieldOptionKey::Default,
        ]
    }

    fn code(self) -> char {
        match self {
            FieldOptionKey::Min => '[',
            FieldOptionKey::Max => ']',
            FieldOptionKey::Tfield => '&',
            FieldOptionKey::Vtype => '*',
            FieldOptionKey::Default => '!',
        }
    }

    fn name(self) -> &'static str {
        match self {
            FieldOptionKey::Min => "min",
            FieldOptionKey::Max => "max",
            FieldOptionKey::Tfield => "tfield",
            FieldOptionKey::Vtype => "vtype",
            FieldOptionKey::Default => "default",
        }
    }

    fn kind(self) -> ValueKind {
        match self {
            FieldOptionKey::Min | FieldOptionKey::Max | FieldOptionKey::Tfield => ValueKind::Integer,
            _ => ValueKind::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_unique<K: OptionKey>() {
        let codes: HashSet<char> = K::all().iter().map(|k| k.code()).collect();
        let names: HashSet<&str> = K::all().iter().map(|k| k.name()).collect();
        assert_eq!(codes.len(), K::all().len());
        assert_eq!(names.len(), K::all().len());
    }

    #[test]
    fn test_codes_and_names_unique() {
        assert_unique::<TypeOptionKey>();
        assert_unique::<FieldOptionKey>();
    }

    #[test]
    fn test_lookup_by_code() {
        assert_eq!(TypeOptionKey::from_code('='), Some(TypeOptionKey::Id));
        assert_eq!(FieldOptionKey::from_code('['), Some(FieldOptionKey::Min));
        assert_eq!(TypeOptionKey::from_code('['), None);
        assert_eq!(FieldOptionKey::from_code('{'), None);
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(TypeOptionKey::from_name("pattern"), Some(TypeOptionKey::Pattern));
        assert_eq!(FieldOptionKey::from_name("tfield"), Some(FieldOptionKey::Tfield));
        assert_eq!(FieldOptionKey::from_name("format"), None);
    }
}

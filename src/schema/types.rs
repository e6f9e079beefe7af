//! JADN type definitions
//!
//! A schema is an ordered list of type definitions. Each definition is the tuple
//! `[name, base_type, type_options, description, fields?]`. Enumerated items are
//! `[id, value, description]`; fields of every other structure are
//! `[id, name, type, field_options, description]`.

use std::fmt;

use serde_json::{json, Value as Json};

/// Built-in base kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BaseType {
    Binary,
    Boolean,
    Integer,
    Number,
    Null,
    String,
    Array,
    ArrayOf,
    Choice,
    Enumerated,
    Map,
    MapOf,
    Record,
}

impl BaseType {
    /// Primitive kinds, in the order their symbol table entries are added
    pub const PRIMITIVES: [BaseType; 6] = [
        BaseType::Binary,
        BaseType::Boolean,
        BaseType::Integer,
        BaseType::Number,
        BaseType::Null,
        BaseType::String,
    ];

    pub const STRUCTURES: [BaseType; 7] = [
        BaseType::Array,
        BaseType::ArrayOf,
        BaseType::Choice,
        BaseType::Enumerated,
        BaseType::Map,
        BaseType::MapOf,
        BaseType::Record,
    ];

    /// Returns the JADN name of this kind
    pub fn name(&self) -> &'static str {
        match self {
            BaseType::Binary => "Binary",
            BaseType::Boolean => "Boolean",
            BaseType::Integer => "Integer",
            BaseType::Number => "Number",
            BaseType::Null => "Null",
            BaseType::String => "String",
            BaseType::Array => "Array",
            BaseType::ArrayOf => "ArrayOf",
            BaseType::Choice => "Choice",
            BaseType::Enumerated => "Enumerated",
            BaseType::Map => "Map",
            BaseType::MapOf => "MapOf",
            BaseType::Record => "Record",
        }
    }

    /// Parses a JADN base type name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::PRIMITIVES
            .iter()
            .chain(Self::STRUCTURES.iter())
            .copied()
            .find(|b| b.name() == name)
    }

    pub fn is_primitive(&self) -> bool {
        Self::PRIMITIVES.contains(self)
    }

    pub fn is_structure(&self) -> bool {
        !self.is_primitive()
    }

    /// Kinds whose definitions carry a field or item list
    pub fn has_fields(&self) -> bool {
        matches!(
            self,
            BaseType::Array | BaseType::Choice | BaseType::Enumerated | BaseType::Map | BaseType::Record
        )
    }

    /// Kinds whose field ids must equal their 1-based position
    pub fn is_ordinal(&self) -> bool {
        matches!(self, BaseType::Array | BaseType::Record)
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field definition of an Array, Choice, Map or Record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub id: u64,
    /// Empty for positional Array fields
    pub name: String,
    /// Name of a defined type or primitive
    pub type_name: String,
    /// Packed option strings
    pub options: Vec<String>,
    pub description: String,
}

impl FieldDef {
    pub fn new(id: u64, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            type_name: type_name.into(),
            options: Vec::new(),
            description: String::new(),
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Serializes to the 5-element JADN field tuple
    pub fn to_json(&self) -> Json {
        json!([self.id, self.name, self.type_name, self.options, self.description])
    }
}

/// Member of an Enumerated type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumItem {
    pub id: u64,
    pub value: String,
    pub description: String,
}

impl EnumItem {
    pub fn new(id: u64, value: impl Into<String>) -> Self {
        Self {
            id,
            value: value.into(),
            description: String::new(),
        }
    }

    pub fn to_json(&self) -> Json {
        json!([self.id, self.value, self.description])
    }
}

/// Field list of a type definition
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Fields {
    /// Primitives, ArrayOf and MapOf
    #[default]
    Empty,
    /// Enumerated items
    Items(Vec<EnumItem>),
    /// Array, Choice, Map and Record fields
    Fields(Vec<FieldDef>),
}

impl Fields {
    pub fn len(&self) -> usize {
        match self {
            Fields::Empty => 0,
            Fields::Items(items) => items.len(),
            Fields::Fields(fields) => fields.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns (id, name) pairs regardless of list kind
    pub fn identifiers(&self) -> Vec<(u64, &str)> {
        match self {
            Fields::Empty => Vec::new(),
            Fields::Items(items) => items.iter().map(|i| (i.id, i.value.as_str())).collect(),
            Fields::Fields(fields) => fields.iter().map(|f| (f.id, f.name.as_str())).collect(),
        }
    }

    pub fn as_fields(&self) -> &[FieldDef] {
        match self {
            Fields::Fields(fields) => fields,
            _ => &[],
        }
    }
}

/// A single JADN type definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub name: String,
    pub base_type: BaseType,
    /// Packed option strings
    pub options: Vec<String>,
    pub description: String,
    pub fields: Fields,
}

impl TypeDef {
    /// Create a type definition with no options and no fields
    pub fn new(name: impl Into<String>, base_type: BaseType) -> Self {
        Self {
            name: name.into(),
            base_type,
            options: Vec::new(),
            description: String::new(),
            fields: Fields::Empty,
        }
    }

    /// Create a Record type
    pub fn record(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self::new(name, BaseType::Record).with_fields(fields)
    }

    /// Create an Enumerated type from (id, value) pairs
    pub fn enumerated(name: impl Into<String>, items: &[(u64, &str)]) -> Self {
        let items = items.iter().map(|(id, v)| EnumItem::new(*id, *v)).collect();
        Self {
            fields: Fields::Items(items),
            ..Self::new(name, BaseType::Enumerated)
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldDef>) -> Self {
        self.fields = Fields::Fields(fields);
        self
    }

    pub fn with_items(mut self, items: Vec<EnumItem>) -> Self {
        self.fields = Fields::Items(items);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Serializes to the 4- or 5-element JADN tuple
    pub fn to_json(&self) -> Json {
        let mut tuple = vec![
            json!(self.name),
            json!(self.base_type.name()),
            json!(self.options),
            json!(self.description),
        ];
        match &self.fields {
            Fields::Empty if !self.base_type.has_fields() => {}
            Fields::Empty => tuple.push(json!([])),
            Fields::Items(items) => tuple.push(Json::Array(items.iter().map(EnumItem::to_json).collect())),
            Fields::Fields(fields) => tuple.push(Json::Array(fields.iter().map(FieldDef::to_json).collect())),
        }
        Json::Array(tuple)
    }
}

/// Schema metadata block
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Meta {
    pub module: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub patch: Option<String>,
    /// (namespace id, module) pairs
    pub imports: Vec<(String, String)>,
    /// Types intended as top-level messages
    pub exports: Vec<String>,
}

impl Meta {
    pub fn to_json(&self) -> Json {
        let mut meta = serde_json::Map::new();
        meta.insert("module".into(), json!(self.module));
        if let Some(patch) = &self.patch {
            meta.insert("patch".into(), json!(patch));
        }
        if let Some(title) = &self.title {
            meta.insert("title".into(), json!(title));
        }
        if let Some(description) = &self.description {
            meta.insert("description".into(), json!(description));
        }
        if !self.imports.is_empty() {
            let imports: Vec<Json> = self.imports.iter().map(|(ns, m)| json!([ns, m])).collect();
            meta.insert("imports".into(), Json::Array(imports));
        }
        if !self.exports.is_empty() {
            meta.insert("exports".into(), json!(self.exports));
        }
        Json::Object(meta)
    }
}

/// A complete JADN schema document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    pub meta: Meta,
    pub types: Vec<TypeDef>,
}

impl Schema {
    /// Create a schema with default metadata
    pub fn new(types: Vec<TypeDef>) -> Self {
        Self {
            meta: Meta::default(),
            types,
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.meta.module = module.into();
        self
    }

    pub fn with_exports<I, S>(mut self, exports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.exports = exports.into_iter().map(Into::into).collect();
        self
    }

    /// Looks up a type definition by name
    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Serializes the whole document
    pub fn to_json(&self) -> Json {
        json!({
            "meta": self.meta.to_json(),
            "types": self.types.iter().map(TypeDef::to_json).collect::<Vec<_>>(),
        })
    }
}

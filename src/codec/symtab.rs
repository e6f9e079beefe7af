//! Schema compiler and symbol table
//!
//! Compiles a schema for one wire mode into an arena of [`SymbolEntry`] values
//! indexed by [`TypeId`]. Layout:
//!
//! ```text
//! [ schema types (in document order) | 6 primitives | synthesized $0, $1, ... ]
//! ```
//!
//! Synthesized entries are the ArrayOf wrappers created for fields whose max
//! cardinality is not 1 and the Enumerated types derived from another type's
//! fields. Fields point at them by id; their `$N` names are never registered for
//! lookup, so callers cannot collide with them.
//!
//! Problems found while compiling are collected as diagnostics. Any error-level
//! diagnostic rejects the schema.

use std::collections::{HashMap, HashSet};
use std::fmt;

use regex::Regex;
use serde_json::Value as Json;

use super::config::{CodecConfig, UndefinedTypePolicy, WireMode};
use super::errors::{CompileError, Diagnostic, DiagnosticCode};
use crate::format::{FormatFns, FormatRegistry};
use crate::options::{self, map_to_options, FieldOptionKey, FieldOptions, OptionValue, TypeOptionKey, TypeOptions};
use crate::schema::{BaseType, EnumItem, FieldDef, Schema, TypeDef};

/// Field name whose Choice members are promoted into the enclosing structure
pub const FALLTHROUGH_FIELD: &str = "<";

/// Index of an entry in the symbol table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

impl TypeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A type reference after compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Resolved(TypeId),
    /// Name the schema does not define; fails when used
    Undefined(String),
}

/// How identifiers appear on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentStyle {
    Name,
    Tag,
}

/// Wire identifier of an enumerated item or field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WireKey {
    Name(String),
    Tag(u64),
}

impl WireKey {
    fn new(style: IdentStyle, id: u64, name: &str) -> Self {
        match style {
            IdentStyle::Name => WireKey::Name(name.to_string()),
            IdentStyle::Tag => WireKey::Tag(id),
        }
    }

    /// Wire value form: a string or an integer
    pub fn to_json(&self) -> Json {
        match self {
            WireKey::Name(name) => Json::String(name.clone()),
            WireKey::Tag(tag) => Json::from(*tag),
        }
    }

    /// Object key form; tags become their decimal text
    pub fn object_key(&self) -> String {
        match self {
            WireKey::Name(name) => name.clone(),
            WireKey::Tag(tag) => tag.to_string(),
        }
    }

    /// Parses an object key; tag-style keys must be canonical decimal integers
    pub fn from_object_key(key: &str, style: IdentStyle) -> Option<Self> {
        match style {
            IdentStyle::Name => Some(WireKey::Name(key.to_string())),
            IdentStyle::Tag => key
                .parse::<u64>()
                .ok()
                .filter(|tag| tag.to_string() == key)
                .map(WireKey::Tag),
        }
    }

    /// Reads a wire value used as an identifier
    pub fn from_json(value: &Json, style: IdentStyle) -> Option<Self> {
        match (style, value) {
            (IdentStyle::Name, Json::String(name)) => Some(WireKey::Name(name.clone())),
            (IdentStyle::Tag, Json::Number(n)) => n.as_u64().map(WireKey::Tag),
            _ => None,
        }
    }
}

impl fmt::Display for WireKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireKey::Name(name) => write!(f, "{:?}", name),
            WireKey::Tag(tag) => write!(f, "{}", tag),
        }
    }
}

/// Minimum JSON kind a type's wire value must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl WireType {
    /// Description for mismatch messages
    pub fn describe(&self) -> &'static str {
        match self {
            WireType::Boolean => "a boolean",
            WireType::Integer => "an integer",
            WireType::Number => "a number",
            WireType::String => "a string",
            WireType::Array => "an array",
            WireType::Object => "an object",
        }
    }
}

/// Size or range limits; `None` is unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounds {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

/// Where an entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Schema,
    Primitive,
    Synthesized,
}

/// Compiled Enumerated item
#[derive(Debug, Clone)]
pub struct ItemEntry {
    pub item: EnumItem,
    /// Native form: the item value, or the id text under the `id` option
    pub native: String,
    pub wire: WireKey,
}

/// Compiled field of an Array, Choice, Map or Record
#[derive(Debug, Clone)]
pub struct FieldEntry {
    pub def: FieldDef,
    pub options: FieldOptions,
    /// Minimum cardinality; 0 means optional
    pub min: u64,
    /// Type after rewriting (a synthesized ArrayOf for multi-valued fields)
    pub type_ref: TypeRef,
    /// Type as declared (a synthesized Enumerated for derived enumerations)
    pub declared: TypeRef,
    /// Key in native maps
    pub native: String,
    pub wire: WireKey,
    /// (native, wire) keys of the promoted Choice, for the fall-through field
    pub fallthrough: Vec<(String, WireKey)>,
}

impl FieldEntry {
    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn is_optional(&self) -> bool {
        self.min == 0
    }

    pub fn is_fallthrough(&self) -> bool {
        self.def.name == FALLTHROUGH_FIELD
    }

    /// True when the field was rewritten to an ArrayOf wrapper
    pub fn is_multi(&self) -> bool {
        self.type_ref != self.declared
    }

    /// Id of the field whose value selects this field's type
    pub fn tfield(&self) -> Option<u64> {
        self.options
            .int(FieldOptionKey::Tfield)
            .and_then(|id| u64::try_from(id).ok())
    }
}

/// One compiled type
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub def: TypeDef,
    pub origin: Origin,
    pub options: TypeOptions,
    pub wire_type: WireType,
    pub ident: IdentStyle,
    /// Enumerated/Choice use ids as native keys
    pub native_ids: bool,
    pub format: FormatFns,
    pub pattern: Option<Regex>,
    pub bounds: Bounds,
    pub items: Vec<ItemEntry>,
    pub fields: Vec<FieldEntry>,
    /// Element type of ArrayOf/MapOf
    pub vtype: Option<TypeRef>,
    /// Key type of MapOf
    pub ktype: Option<TypeRef>,
    decode_map: HashMap<WireKey, usize>,
    encode_map: HashMap<String, usize>,
}

impl SymbolEntry {
    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn base_type(&self) -> BaseType {
        self.def.base_type
    }

    /// Index of the item or field with this wire key
    pub fn by_wire(&self, key: &WireKey) -> Option<usize> {
        self.decode_map.get(key).copied()
    }

    /// Index of the item or field with this native key
    pub fn by_native(&self, key: &str) -> Option<usize> {
        self.encode_map.get(key).copied()
    }

    /// Field with the given id
    pub fn field(&self, id: u64) -> Option<&FieldEntry> {
        self.fields.iter().find(|f| f.def.id == id)
    }
}

/// Compiled schema for one wire mode
#[derive(Debug, Clone)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
    names: HashMap<String, TypeId>,
}

impl SymbolTable {
    pub fn get(&self, id: TypeId) -> &SymbolEntry {
        &self.entries[id.0]
    }

    /// Looks up a schema type or primitive by name
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    pub fn entry(&self, name: &str) -> Option<&SymbolEntry> {
        self.lookup(name).map(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &SymbolEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| (TypeId(i), e))
    }

    /// Display name of a reference
    pub fn ref_name<'a>(&'a self, type_ref: &'a TypeRef) -> &'a str {
        match type_ref {
            TypeRef::Resolved(id) => self.get(*id).name(),
            TypeRef::Undefined(name) => name,
        }
    }
}

/// Compiles `schema` into a symbol table.
///
/// Returns the table and every warning; fails when any diagnostic is an error.
pub fn compile(
    schema: &Schema,
    mode: WireMode,
    config: &CodecConfig,
    registry: &FormatRegistry,
) -> Result<(SymbolTable, Vec<Diagnostic>), CompileError> {
    let mut compiler = Compiler::new(schema, mode, config, registry);
    compiler.index();

    let mut entries: Vec<SymbolEntry> = schema.types.iter().map(|t| compiler.compile_type(t, Origin::Schema)).collect();
    for base in BaseType::PRIMITIVES {
        let def = TypeDef::new(base.name(), base);
        entries.push(compiler.skeleton(def, TypeOptions::new(), Origin::Primitive));
    }
    entries.append(&mut compiler.synthesized);

    let diagnostics = compiler.diagnostics;
    if diagnostics.iter().any(Diagnostic::is_error) {
        return Err(CompileError { diagnostics });
    }

    Ok((
        SymbolTable {
            entries,
            names: compiler.names,
        },
        diagnostics,
    ))
}

struct Compiler<'a> {
    schema: &'a Schema,
    mode: WireMode,
    config: &'a CodecConfig,
    registry: &'a FormatRegistry,
    defs: HashMap<&'a str, &'a TypeDef>,
    names: HashMap<String, TypeId>,
    synthesized: Vec<SymbolEntry>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Compiler<'a> {
    fn new(schema: &'a Schema, mode: WireMode, config: &'a CodecConfig, registry: &'a FormatRegistry) -> Self {
        Self {
            schema,
            mode,
            config,
            registry,
            defs: HashMap::new(),
            names: HashMap::new(),
            synthesized: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn synthesized_base(&self) -> usize {
        self.schema.types.len() + BaseType::PRIMITIVES.len()
    }

    /// Registers every name before compiling so references may point forward
    fn index(&mut self) {
        let schema = self.schema;
        for (i, def) in schema.types.iter().enumerate() {
            if BaseType::from_name(&def.name).is_some() || def.name.starts_with('$') {
                self.diagnostics.push(Diagnostic::error(
                    DiagnosticCode::ReservedName,
                    &def.name,
                    "type name collides with a built-in name",
                ));
                continue;
            }
            if self.defs.contains_key(def.name.as_str()) {
                self.diagnostics.push(Diagnostic::error(
                    DiagnosticCode::DuplicateType,
                    &def.name,
                    "type defined more than once",
                ));
                continue;
            }
            self.defs.insert(&def.name, def);
            self.names.insert(def.name.clone(), TypeId(i));
        }
        let base = schema.types.len();
        for (k, primitive) in BaseType::PRIMITIVES.iter().enumerate() {
            self.names.insert(primitive.name().to_string(), TypeId(base + k));
        }
    }

    fn undefined(&mut self, owner: &str, name: &str) -> TypeRef {
        let message = format!("reference to undefined type \"{}\"", name);
        self.diagnostics.push(match self.config.undefined_types {
            UndefinedTypePolicy::Deferred => Diagnostic::warning(DiagnosticCode::UndefinedType, owner, message),
            UndefinedTypePolicy::Reject => Diagnostic::error(DiagnosticCode::UndefinedType, owner, message),
        });
        TypeRef::Undefined(name.to_string())
    }

    fn resolve(&mut self, owner: &str, name: &str) -> TypeRef {
        match self.names.get(name) {
            Some(id) => TypeRef::Resolved(*id),
            None => self.undefined(owner, name),
        }
    }

    fn ident_style(&self, options: &TypeOptions) -> IdentStyle {
        if options.contains(TypeOptionKey::Id) || !self.mode.identifiers_as_names {
            IdentStyle::Tag
        } else {
            IdentStyle::Name
        }
    }

    fn type_options(&mut self, def: &TypeDef) -> TypeOptions {
        options::type_options(def.options.as_slice()).unwrap_or_else(|e| {
            self.diagnostics
                .push(Diagnostic::error(DiagnosticCode::UnknownOption, &def.name, e.to_string()));
            TypeOptions::new()
        })
    }

    fn field_options(&mut self, owner: &str, field: &FieldDef) -> FieldOptions {
        options::field_options(field.options.as_slice()).unwrap_or_else(|e| {
            self.diagnostics.push(Diagnostic::error(
                DiagnosticCode::UnknownOption,
                owner,
                format!("field '{}': {}", field.name, e),
            ));
            FieldOptions::new()
        })
    }

    /// Entry with everything but the structure-specific parts
    fn skeleton(&mut self, def: TypeDef, options: TypeOptions, origin: Origin) -> SymbolEntry {
        let base = def.base_type;
        let ident = self.ident_style(&options);

        let format_name = options.text(TypeOptionKey::Format).unwrap_or("");
        let format = self.registry.lookup(format_name, base);
        if !format.is_defined() {
            self.diagnostics.push(Diagnostic::warning(
                DiagnosticCode::UnknownFormat,
                &def.name,
                format!("format '{}' is not defined for {}", format_name, base),
            ));
        }

        let pattern = match options.text(TypeOptionKey::Pattern) {
            Some(p) => match Regex::new(p) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    self.diagnostics.push(Diagnostic::error(
                        DiagnosticCode::InvalidPattern,
                        &def.name,
                        format!("invalid pattern {:?}: {}", p, e),
                    ));
                    None
                }
            },
            None => None,
        };

        let wire_type = match base {
            BaseType::Binary | BaseType::String | BaseType::Null => WireType::String,
            BaseType::Boolean => WireType::Boolean,
            BaseType::Integer => WireType::Integer,
            BaseType::Number => WireType::Number,
            BaseType::Enumerated if ident == IdentStyle::Tag => WireType::Integer,
            BaseType::Enumerated => WireType::String,
            BaseType::Array if format.has_multipart() => WireType::String,
            BaseType::Array | BaseType::ArrayOf => WireType::Array,
            BaseType::Record if !self.mode.record_as_map => WireType::Array,
            BaseType::Choice | BaseType::Map | BaseType::MapOf | BaseType::Record => WireType::Object,
        };

        let min = options.int(TypeOptionKey::Min);
        let max = options.int(TypeOptionKey::Max).filter(|m| *m > 0);
        let ceiling = |limit: u64| Some(i64::try_from(limit).unwrap_or(i64::MAX));
        let bounds = match base {
            BaseType::Binary => Bounds {
                min,
                max: max.or(ceiling(self.config.max_binary)),
            },
            BaseType::String => Bounds {
                min,
                max: max.or(ceiling(self.config.max_string)),
            },
            BaseType::Integer | BaseType::Number => Bounds {
                min,
                max: options.int(TypeOptionKey::Max),
            },
            BaseType::ArrayOf | BaseType::MapOf => Bounds {
                min: Some(min.unwrap_or(1)),
                max: max.or(ceiling(self.config.max_elements)),
            },
            _ => Bounds::default(),
        };

        let native_ids = options.contains(TypeOptionKey::Id) && matches!(base, BaseType::Enumerated | BaseType::Choice);

        SymbolEntry {
            def,
            origin,
            options,
            wire_type,
            ident,
            native_ids,
            format,
            pattern,
            bounds,
            items: Vec::new(),
            fields: Vec::new(),
            vtype: None,
            ktype: None,
            decode_map: HashMap::new(),
            encode_map: HashMap::new(),
        }
    }

    fn compile_type(&mut self, def: &TypeDef, origin: Origin) -> SymbolEntry {
        let options = self.type_options(def);
        self.check_identifiers(def);
        let mut entry = self.skeleton(def.clone(), options, origin);

        match def.base_type {
            BaseType::Enumerated => {
                let items = match entry.options.text(TypeOptionKey::Enum).map(str::to_string) {
                    Some(source) => self.derived_items(&def.name, &source).map_or_else(Vec::new, |(items, _)| items),
                    None => def
                        .fields
                        .identifiers()
                        .into_iter()
                        .map(|(id, value)| EnumItem::new(id, value))
                        .collect(),
                };
                entry.items = items
                    .into_iter()
                    .map(|item| ItemEntry {
                        native: if entry.native_ids { item.id.to_string() } else { item.value.clone() },
                        wire: WireKey::new(entry.ident, item.id, &item.value),
                        item,
                    })
                    .collect();
            }
            BaseType::Array | BaseType::Choice | BaseType::Map | BaseType::Record => {
                let native_ids = entry.native_ids;
                let ident = entry.ident;
                entry.fields = def
                    .fields
                    .as_fields()
                    .iter()
                    .map(|field| self.compile_field(&def.name, ident, native_ids, field))
                    .collect();
            }
            BaseType::ArrayOf | BaseType::MapOf => {
                match entry.options.text(TypeOptionKey::Vtype).map(str::to_string) {
                    Some(vtype) => entry.vtype = Some(self.resolve(&def.name, &vtype)),
                    None => self.diagnostics.push(Diagnostic::error(
                        DiagnosticCode::MissingVtype,
                        &def.name,
                        format!("{} requires a value type", def.base_type),
                    )),
                }
                if def.base_type == BaseType::MapOf {
                    if let Some(ktype) = entry.options.text(TypeOptionKey::Ktype).map(str::to_string) {
                        entry.ktype = Some(self.resolve(&def.name, &ktype));
                    }
                }
            }
            _ => {}
        }

        if matches!(
            def.base_type,
            BaseType::Enumerated | BaseType::Choice | BaseType::Map | BaseType::Record
        ) {
            for (i, item) in entry.items.iter().enumerate() {
                entry.decode_map.insert(item.wire.clone(), i);
                entry.encode_map.insert(item.native.clone(), i);
            }
            for (i, field) in entry.fields.iter().enumerate() {
                entry.decode_map.insert(field.wire.clone(), i);
                entry.encode_map.insert(field.native.clone(), i);
            }
        }

        entry
    }

    fn check_identifiers(&mut self, def: &TypeDef) {
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        let positional = matches!(def.base_type, BaseType::Array | BaseType::ArrayOf);
        for (pos, (id, name)) in def.fields.identifiers().into_iter().enumerate() {
            if !ids.insert(id) {
                self.diagnostics.push(Diagnostic::error(
                    DiagnosticCode::DuplicateId,
                    &def.name,
                    format!("duplicate field id {}", id),
                ));
            }
            if !positional && !names.insert(name) {
                self.diagnostics.push(Diagnostic::error(
                    DiagnosticCode::DuplicateName,
                    &def.name,
                    format!("duplicate field name '{}'", name),
                ));
            }
            if def.base_type.is_ordinal() && id != pos as u64 + 1 {
                self.diagnostics.push(Diagnostic::error(
                    DiagnosticCode::NonOrdinalId,
                    &def.name,
                    format!("field '{}' has id {}, expected {}", name, id, pos + 1),
                ));
            }
        }
    }

    fn compile_field(&mut self, owner: &str, ident: IdentStyle, native_ids: bool, field: &FieldDef) -> FieldEntry {
        let options = self.field_options(owner, field);
        let min = options
            .int(FieldOptionKey::Min)
            .map_or(1, |m| u64::try_from(m).unwrap_or(0));
        let max = options
            .int(FieldOptionKey::Max)
            .unwrap_or_else(|| i64::try_from(min.max(1)).unwrap_or(i64::MAX));

        let declared = match (field.type_name.as_str(), options.text(FieldOptionKey::Vtype)) {
            ("Enumerated", Some(source)) => {
                let source = source.to_string();
                self.derived_enumeration(owner, &source)
            }
            (type_name, _) => self.resolve(owner, type_name),
        };

        let type_ref = if max != 1 {
            self.synthesize_array_of(declared.clone(), min, max)
        } else {
            declared.clone()
        };

        let fallthrough = if field.name == FALLTHROUGH_FIELD {
            self.fallthrough_keys(owner, field)
        } else {
            Vec::new()
        };

        FieldEntry {
            native: if native_ids { field.id.to_string() } else { field.name.clone() },
            wire: WireKey::new(ident, field.id, &field.name),
            def: field.clone(),
            options,
            min,
            type_ref,
            declared,
            fallthrough,
        }
    }

    /// Items built from another type's field ids and names, plus whether that
    /// type uses ids as identifiers
    fn derived_items(&mut self, owner: &str, source: &str) -> Option<(Vec<EnumItem>, bool)> {
        let derived = self.defs.get(source).map(|def| {
            let items: Vec<EnumItem> = def
                .fields
                .identifiers()
                .into_iter()
                .map(|(id, name)| EnumItem::new(id, name))
                .collect();
            (items, def.options.iter().any(|o| o == "="))
        });
        if derived.is_none() {
            self.undefined(owner, source);
        }
        derived
    }

    fn derived_enumeration(&mut self, owner: &str, source: &str) -> TypeRef {
        let Some((items, uses_ids)) = self.derived_items(owner, source) else {
            return TypeRef::Undefined(source.to_string());
        };
        let mut def = TypeDef::new(self.next_name(), BaseType::Enumerated).with_items(items);
        if uses_ids {
            def = def.with_options(["="]);
        }
        let entry = self.compile_type(&def, Origin::Synthesized);
        self.push_synthesized(entry)
    }

    fn synthesize_array_of(&mut self, vtype: TypeRef, field_min: u64, field_max: i64) -> TypeRef {
        let min = if field_min > 1 { i64::try_from(field_min).unwrap_or(i64::MAX) } else { 1 };
        let max = if field_max > 0 {
            field_max
        } else {
            i64::try_from(self.config.max_elements).unwrap_or(i64::MAX)
        };

        let options = TypeOptions::new()
            .with(TypeOptionKey::Vtype, OptionValue::Text(self.ref_name(&vtype)))
            .with(TypeOptionKey::Min, OptionValue::Integer(min))
            .with(TypeOptionKey::Max, OptionValue::Integer(max));
        let def = TypeDef::new(self.next_name(), BaseType::ArrayOf).with_options(map_to_options(&options));

        let mut entry = self.skeleton(def, options, Origin::Synthesized);
        entry.vtype = Some(vtype);
        self.push_synthesized(entry)
    }

    /// (native, wire) keys of the Choice a fall-through field references
    fn fallthrough_keys(&mut self, owner: &str, field: &FieldDef) -> Vec<(String, WireKey)> {
        let Some(choice) = self.defs.get(field.type_name.as_str()).copied() else {
            return Vec::new();
        };
        if choice.base_type != BaseType::Choice {
            self.diagnostics.push(Diagnostic::error(
                DiagnosticCode::InvalidFallthrough,
                owner,
                format!("fall-through field must reference a Choice, not {}", choice.base_type),
            ));
            return Vec::new();
        }
        let options = options::type_options(choice.options.as_slice()).unwrap_or_default();
        let ident = self.ident_style(&options);
        let native_ids = options.contains(TypeOptionKey::Id);
        choice
            .fields
            .as_fields()
            .iter()
            .map(|f| {
                let native = if native_ids { f.id.to_string() } else { f.name.clone() };
                (native, WireKey::new(ident, f.id, &f.name))
            })
            .collect()
    }

    fn next_name(&self) -> String {
        format!("${}", self.synthesized.len())
    }

    fn push_synthesized(&mut self, mut entry: SymbolEntry) -> TypeRef {
        let k = self.synthesized.len();
        entry.def.name = format!("${}", k);
        self.synthesized.push(entry);
        TypeRef::Resolved(TypeId(self.synthesized_base() + k))
    }

    fn ref_name(&self, type_ref: &TypeRef) -> String {
        match type_ref {
            TypeRef::Undefined(name) => name.clone(),
            TypeRef::Resolved(TypeId(i)) => {
                let users = self.schema.types.len();
                let base = self.synthesized_base();
                if *i < users {
                    self.schema.types[*i].name.clone()
                } else if *i < base {
                    BaseType::PRIMITIVES[*i - users].name().to_string()
                } else {
                    format!("${}", *i - base)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDef;

    fn build(schema: &Schema, mode: WireMode) -> (SymbolTable, Vec<Diagnostic>) {
        compile(schema, mode, &CodecConfig::default(), &FormatRegistry::standard()).unwrap()
    }

    fn reject(schema: &Schema) -> CompileError {
        compile(schema, WireMode::VERBOSE, &CodecConfig::default(), &FormatRegistry::standard()).unwrap_err()
    }

    #[test]
    fn test_layout_schema_then_primitives() {
        let schema = Schema::new(vec![
            TypeDef::new("Name", BaseType::String),
            TypeDef::new("Flag", BaseType::Boolean),
        ]);
        let (table, diagnostics) = build(&schema, WireMode::VERBOSE);
        assert!(diagnostics.is_empty());
        assert_eq!(table.len(), 2 + 6);
        assert_eq!(table.lookup("Name").map(TypeId::index), Some(0));
        assert_eq!(table.lookup("Binary").map(TypeId::index), Some(2));
        assert_eq!(table.lookup("String").map(TypeId::index), Some(7));
        assert_eq!(table.entry("Integer").unwrap().origin, Origin::Primitive);
    }

    #[test]
    fn test_string_ceiling_from_config() {
        let schema = Schema::new(vec![
            TypeDef::new("Short", BaseType::String).with_options(["}8"]),
            TypeDef::new("Long", BaseType::String),
        ]);
        let (table, _) = build(&schema, WireMode::VERBOSE);
        assert_eq!(table.entry("Short").unwrap().bounds.max, Some(8));
        assert_eq!(table.entry("Long").unwrap().bounds.max, Some(255));
        assert_eq!(table.entry("Binary").unwrap().bounds.max, Some(1000));
    }

    #[test]
    fn test_multi_valued_field_synthesizes_array_of() {
        let schema = Schema::new(vec![TypeDef::record(
            "Hosts",
            vec![
                FieldDef::new(1, "names", "String").with_options(["[2", "]3"]),
                FieldDef::new(2, "tags", "String").with_options(["[0", "]0"]),
            ],
        )]);
        let (table, _) = build(&schema, WireMode::VERBOSE);
        assert_eq!(table.len(), 1 + 6 + 2);

        let hosts = table.entry("Hosts").unwrap();
        let names = &hosts.fields[0];
        assert!(names.is_multi());
        assert_eq!(table.ref_name(&names.declared), "String");

        let TypeRef::Resolved(id) = names.type_ref else {
            panic!("wrapper not resolved")
        };
        let wrapper = table.get(id);
        assert_eq!(wrapper.name(), "$0");
        assert_eq!(wrapper.origin, Origin::Synthesized);
        assert_eq!(wrapper.bounds, Bounds { min: Some(2), max: Some(3) });
        assert_eq!(wrapper.def.options, vec!["*String", "{2", "}3"]);

        let TypeRef::Resolved(id) = hosts.fields[1].type_ref else {
            panic!("wrapper not resolved")
        };
        assert_eq!(table.get(id).bounds, Bounds { min: Some(1), max: Some(100) });

        // Synthesized names are private
        assert!(table.lookup("$0").is_none());
    }

    #[test]
    fn test_min_above_one_implies_array() {
        let schema = Schema::new(vec![TypeDef::record(
            "Pair",
            vec![FieldDef::new(1, "values", "Integer").with_options(["[2"])],
        )]);
        let (table, _) = build(&schema, WireMode::VERBOSE);
        assert!(table.entry("Pair").unwrap().fields[0].is_multi());
    }

    #[test]
    fn test_key_maps_follow_mode() {
        let schema = Schema::new(vec![TypeDef::enumerated("Color", &[(1, "Red"), (2, "Green")])]);

        let (table, _) = build(&schema, WireMode::VERBOSE);
        let color = table.entry("Color").unwrap();
        assert_eq!(color.wire_type, WireType::String);
        assert_eq!(color.by_wire(&WireKey::Name("Green".into())), Some(1));
        assert_eq!(color.by_native("Red"), Some(0));

        let (table, _) = build(&schema, WireMode::M2M);
        let color = table.entry("Color").unwrap();
        assert_eq!(color.wire_type, WireType::Integer);
        assert_eq!(color.by_wire(&WireKey::Tag(2)), Some(1));
        assert_eq!(color.by_wire(&WireKey::Name("Green".into())), None);
        assert_eq!(color.by_native("Green"), Some(1));
    }

    #[test]
    fn test_id_option_uses_ids_both_sides() {
        let schema = Schema::new(vec![
            TypeDef::enumerated("Code", &[(10, "ok"), (20, "fail")]).with_options(["="])
        ]);
        let (table, _) = build(&schema, WireMode::VERBOSE);
        let code = table.entry("Code").unwrap();
        assert!(code.native_ids);
        assert_eq!(code.by_wire(&WireKey::Tag(20)), Some(1));
        assert_eq!(code.by_native("20"), Some(1));
        assert_eq!(code.by_native("fail"), None);
    }

    #[test]
    fn test_enumerated_field_with_vtype_derives_items() {
        let schema = Schema::new(vec![
            TypeDef::new("Action", BaseType::Choice).with_fields(vec![
                FieldDef::new(1, "scan", "String"),
                FieldDef::new(2, "stop", "Null"),
            ]),
            TypeDef::record(
                "Command",
                vec![FieldDef::new(1, "kind", "Enumerated").with_options(["*Action"])],
            ),
        ]);
        let (table, _) = build(&schema, WireMode::VERBOSE);
        let field = &table.entry("Command").unwrap().fields[0];
        let TypeRef::Resolved(id) = field.declared else {
            panic!("enumeration not synthesized")
        };
        let derived = table.get(id);
        assert_eq!(derived.base_type(), BaseType::Enumerated);
        let values: Vec<&str> = derived.items.iter().map(|i| i.item.value.as_str()).collect();
        assert_eq!(values, vec!["scan", "stop"]);
    }

    #[test]
    fn test_enum_type_option_derives_items() {
        let schema = Schema::new(vec![
            TypeDef::record(
                "Point",
                vec![FieldDef::new(1, "x", "Integer"), FieldDef::new(2, "y", "Integer")],
            ),
            TypeDef::new("Axis", BaseType::Enumerated).with_options(["#Point"]),
        ]);
        let (table, _) = build(&schema, WireMode::VERBOSE);
        let axis = table.entry("Axis").unwrap();
        assert_eq!(axis.items.len(), 2);
        assert_eq!(axis.by_wire(&WireKey::Name("y".into())), Some(1));
    }

    #[test]
    fn test_fallthrough_records_choice_keys() {
        let schema = Schema::new(vec![
            TypeDef::new("Target", BaseType::Choice).with_fields(vec![
                FieldDef::new(1, "file", "String"),
                FieldDef::new(2, "host", "String"),
            ]),
            TypeDef::record(
                "Command",
                vec![FieldDef::new(1, "action", "String"), FieldDef::new(2, "<", "Target")],
            ),
        ]);
        let (table, _) = build(&schema, WireMode::MAP_TAG);
        let field = &table.entry("Command").unwrap().fields[1];
        assert!(field.is_fallthrough());
        assert_eq!(
            field.fallthrough,
            vec![("file".to_string(), WireKey::Tag(1)), ("host".to_string(), WireKey::Tag(2))]
        );
    }

    #[test]
    fn test_duplicates_rejected() {
        let schema = Schema::new(vec![TypeDef::new("C", BaseType::Choice).with_fields(vec![
            FieldDef::new(1, "a", "String"),
            FieldDef::new(1, "a", "String"),
        ])]);
        let err = reject(&schema);
        let codes: Vec<DiagnosticCode> = err.errors().iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![DiagnosticCode::DuplicateId, DiagnosticCode::DuplicateName]);
    }

    #[test]
    fn test_array_names_need_not_be_unique() {
        let schema = Schema::new(vec![TypeDef::new("Pair", BaseType::Array).with_fields(vec![
            FieldDef::new(1, "", "String"),
            FieldDef::new(2, "", "Integer"),
        ])]);
        let (_, diagnostics) = build(&schema, WireMode::VERBOSE);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_record_ids_must_be_ordinal() {
        let schema = Schema::new(vec![TypeDef::record(
            "R",
            vec![FieldDef::new(1, "a", "String"), FieldDef::new(3, "b", "String")],
        )]);
        let err = reject(&schema);
        assert_eq!(err.errors()[0].code, DiagnosticCode::NonOrdinalId);
    }

    #[test]
    fn test_builtin_and_duplicate_type_names_rejected() {
        let err = reject(&Schema::new(vec![TypeDef::new("String", BaseType::String)]));
        assert_eq!(err.errors()[0].code, DiagnosticCode::ReservedName);

        let err = reject(&Schema::new(vec![
            TypeDef::new("A", BaseType::String),
            TypeDef::new("A", BaseType::Integer),
        ]));
        assert_eq!(err.errors()[0].code, DiagnosticCode::DuplicateType);
    }

    #[test]
    fn test_unknown_option_rejected() {
        let err = reject(&Schema::new(vec![TypeDef::new("A", BaseType::String).with_options(["?x"])]));
        assert_eq!(err.errors()[0].code, DiagnosticCode::UnknownOption);
        assert!(err.errors()[0].message.contains("'?'"));
    }

    #[test]
    fn test_bad_pattern_rejected_unknown_format_warned() {
        let err = reject(&Schema::new(vec![TypeDef::new("A", BaseType::String).with_options(["%("])]));
        assert_eq!(err.errors()[0].code, DiagnosticCode::InvalidPattern);

        let schema = Schema::new(vec![TypeDef::new("A", BaseType::String).with_options(["/zip-code"])]);
        let (_, diagnostics) = build(&schema, WireMode::VERBOSE);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::UnknownFormat);
        assert!(!diagnostics[0].is_error());
    }

    #[test]
    fn test_array_of_requires_vtype() {
        let err = reject(&Schema::new(vec![TypeDef::new("List", BaseType::ArrayOf)]));
        assert_eq!(err.errors()[0].code, DiagnosticCode::MissingVtype);
    }

    #[test]
    fn test_undefined_reference_policy() {
        let schema = Schema::new(vec![TypeDef::record("R", vec![FieldDef::new(1, "a", "Nowhere")])]);

        let (table, diagnostics) = build(&schema, WireMode::VERBOSE);
        assert_eq!(diagnostics[0].code, DiagnosticCode::UndefinedType);
        assert!(!diagnostics[0].is_error());
        assert_eq!(table.entry("R").unwrap().fields[0].type_ref, TypeRef::Undefined("Nowhere".into()));

        let config = CodecConfig::default().with_undefined_types(UndefinedTypePolicy::Reject);
        let err = compile(&schema, WireMode::VERBOSE, &config, &FormatRegistry::standard()).unwrap_err();
        assert_eq!(err.errors()[0].code, DiagnosticCode::UndefinedType);
    }

    #[test]
    fn test_record_wire_type_follows_mode() {
        let schema = Schema::new(vec![TypeDef::record("R", vec![FieldDef::new(1, "a", "String")])]);
        let (table, _) = build(&schema, WireMode::VERBOSE);
        assert_eq!(table.entry("R").unwrap().wire_type, WireType::Object);
        let (table, _) = build(&schema, WireMode::CONCISE);
        assert_eq!(table.entry("R").unwrap().wire_type, WireType::Array);
    }

    #[test]
    fn test_object_key_parsing() {
        assert_eq!(WireKey::from_object_key("12", IdentStyle::Tag), Some(WireKey::Tag(12)));
        assert_eq!(WireKey::from_object_key("x", IdentStyle::Tag), None);
        assert_eq!(WireKey::from_object_key("01", IdentStyle::Tag), None);
        assert_eq!(WireKey::from_object_key("+1", IdentStyle::Tag), None);
        assert_eq!(WireKey::from_object_key("x", IdentStyle::Name), Some(WireKey::Name("x".into())));
        assert_eq!(WireKey::Tag(3).object_key(), "3");
    }
}

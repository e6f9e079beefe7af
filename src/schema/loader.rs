//! Schema loader for JADN documents
//!
//! Reads `{"meta": {...}, "types": [...]}` documents and checks the tuple shape of
//! every definition. Semantic checks (duplicate tags, undefined references, option
//! validity) belong to the compiler, which reports them as diagnostics.

use std::fs;
use std::path::Path;

use serde_json::Value as Json;

use super::errors::{SchemaError, SchemaResult};
use super::types::{BaseType, EnumItem, FieldDef, Fields, Meta, Schema, TypeDef};

/// Loads JADN schemas from files, strings or parsed JSON.
pub struct SchemaLoader;

impl SchemaLoader {
    /// Loads a schema file.
    pub fn load_file(path: &Path) -> SchemaResult<Schema> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| SchemaError::io(&display, e))?;
        Self::parse_str(&content).map_err(|e| e.at_path(display))
    }

    /// Parses a schema from JSON text.
    pub fn parse_str(content: &str) -> SchemaResult<Schema> {
        let value: Json = serde_json::from_str(content)
            .map_err(|e| SchemaError::malformed(format!("Invalid JSON: {}", e)))?;
        Self::from_value(&value)
    }

    /// Parses a schema from a JSON value.
    pub fn from_value(value: &Json) -> SchemaResult<Schema> {
        let doc = value
            .as_object()
            .ok_or_else(|| SchemaError::malformed("schema must be a JSON object"))?;

        let meta = match doc.get("meta") {
            Some(meta) => parse_meta(meta)?,
            None => Meta::default(),
        };

        let types = doc
            .get("types")
            .and_then(Json::as_array)
            .ok_or_else(|| SchemaError::malformed("schema 'types' must be an array"))?
            .iter()
            .map(parse_type)
            .collect::<SchemaResult<Vec<_>>>()?;

        Ok(Schema { meta, types })
    }

    /// Saves a schema to disk in tuple form.
    pub fn save(schema: &Schema, path: &Path) -> SchemaResult<()> {
        let display = path.display().to_string();
        let content = serde_json::to_string_pretty(&schema.to_json())
            .map_err(|e| SchemaError::io(&display, e))?;
        fs::write(path, content).map_err(|e| SchemaError::io(&display, e))
    }
}

fn parse_meta(value: &Json) -> SchemaResult<Meta> {
    let obj = value
        .as_object()
        .ok_or_else(|| SchemaError::malformed("'meta' must be an object"))?;

    let text = |key: &str| -> SchemaResult<Option<String>> {
        match obj.get(key) {
            None => Ok(None),
            Some(Json::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(SchemaError::malformed(format!("meta '{}' must be a string", key))),
        }
    };

    let mut imports = Vec::new();
    if let Some(list) = obj.get("imports") {
        let list = list
            .as_array()
            .ok_or_else(|| SchemaError::malformed("meta 'imports' must be an array"))?;
        for pair in list {
            match pair.as_array().map(Vec::as_slice) {
                Some([Json::String(ns), Json::String(module)]) => imports.push((ns.clone(), module.clone())),
                _ => return Err(SchemaError::malformed("meta 'imports' entries must be [nsid, module]")),
            }
        }
    }

    let exports = match obj.get("exports") {
        None => Vec::new(),
        Some(list) => string_list(list).ok_or_else(|| SchemaError::malformed("meta 'exports' must be a list of strings"))?,
    };

    Ok(Meta {
        module: text("module")?.unwrap_or_default(),
        title: text("title")?,
        description: text("description")?,
        patch: text("patch")?,
        imports,
        exports,
    })
}

fn parse_type(value: &Json) -> SchemaResult<TypeDef> {
    let tuple = value
        .as_array()
        .ok_or_else(|| SchemaError::malformed("type definition must be an array"))?;

    let name = match tuple.first() {
        Some(Json::String(name)) => name.clone(),
        _ => return Err(SchemaError::malformed("type definition must start with a type name")),
    };

    if !(4..=5).contains(&tuple.len()) {
        return Err(SchemaError::malformed_type(
            &name,
            format!("expected 4 or 5 columns, got {}", tuple.len()),
        ));
    }

    let base_name = tuple[1]
        .as_str()
        .ok_or_else(|| SchemaError::malformed_type(&name, "base type must be a string"))?;
    let base_type =
        BaseType::from_name(base_name).ok_or_else(|| SchemaError::unknown_base_type(&name, base_name))?;

    let options = string_list(&tuple[2])
        .ok_or_else(|| SchemaError::malformed_type(&name, "type options must be a list of strings"))?;
    let description = tuple[3]
        .as_str()
        .ok_or_else(|| SchemaError::malformed_type(&name, "description must be a string"))?
        .to_string();

    let fields = match tuple.get(4) {
        None => Fields::Empty,
        Some(_) if !base_type.has_fields() => {
            return Err(SchemaError::malformed_type(
                &name,
                format!("type {} cannot have fields", base_type),
            ))
        }
        Some(list) => {
            let list = list
                .as_array()
                .ok_or_else(|| SchemaError::malformed_type(&name, "fields must be an array"))?;
            if base_type == BaseType::Enumerated {
                Fields::Items(
                    list.iter()
                        .map(|item| parse_item(&name, item))
                        .collect::<SchemaResult<_>>()?,
                )
            } else {
                Fields::Fields(
                    list.iter()
                        .map(|field| parse_field(&name, field))
                        .collect::<SchemaResult<_>>()?,
                )
            }
        }
    };

    Ok(TypeDef {
        name,
        base_type,
        options,
        description,
        fields,
    })
}

fn parse_item(type_name: &str, value: &Json) -> SchemaResult<EnumItem> {
    match value.as_array().map(Vec::as_slice) {
        Some([id, Json::String(item), Json::String(desc)]) => Ok(EnumItem {
            id: parse_id(type_name, id)?,
            value: item.clone(),
            description: desc.clone(),
        }),
        _ => Err(SchemaError::malformed_type(
            type_name,
            format!("enumerated item must be [id, value, description]: {}", value),
        )),
    }
}

fn parse_field(type_name: &str, value: &Json) -> SchemaResult<FieldDef> {
    match value.as_array().map(Vec::as_slice) {
        Some([id, Json::String(name), Json::String(ftype), opts, Json::String(desc)]) => Ok(FieldDef {
            id: parse_id(type_name, id)?,
            name: name.clone(),
            type_name: ftype.clone(),
            options: string_list(opts).ok_or_else(|| {
                SchemaError::malformed_type(type_name, format!("field '{}' options must be a list of strings", name))
            })?,
            description: desc.clone(),
        }),
        _ => Err(SchemaError::malformed_type(
            type_name,
            format!("field must be [id, name, type, options, description]: {}", value),
        )),
    }
}

fn parse_id(type_name: &str, value: &Json) -> SchemaResult<u64> {
    value
        .as_u64()
        .ok_or_else(|| SchemaError::malformed_type(type_name, format!("field id must be a non-negative integer: {}", value)))
}

fn string_list(value: &Json) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

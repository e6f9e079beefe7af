//! Native to wire encoders, one per base kind

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map as JsonMap, Number, Value as Json};

use super::errors::CodecResult;
use super::general::{
    bad_choice, bad_key, check_format, check_int_range, check_number_range, check_pattern, check_size,
    discriminator, field_label, format_error, mismatch, missing_field, not_declared, require_format, structural,
    too_many_values, unexpected_fields, violation,
};
use super::symtab::{FieldEntry, SymbolEntry, TypeRef, WireType};
use super::Codec;
use crate::schema::BaseType;
use crate::value::Value;

/// Encodes `value` against `entry`
pub(crate) fn encode(codec: &Codec, entry: &SymbolEntry, value: &Value) -> CodecResult<Json> {
    require_format(entry)?;
    match entry.base_type() {
        BaseType::Binary => binary(entry, value),
        BaseType::Boolean => boolean(entry, value),
        BaseType::Integer => integer(entry, value),
        BaseType::Number => number(entry, value),
        BaseType::Null => null(entry, value),
        BaseType::String => string(entry, value),
        BaseType::Enumerated => enumerated(entry, value),
        BaseType::Choice => choice(codec, entry, value),
        BaseType::Map | BaseType::Record => map_record(codec, entry, value),
        BaseType::Array => array(codec, entry, value),
        BaseType::ArrayOf => array_of(codec, entry, value, None),
        BaseType::MapOf => map_of(codec, entry, value),
    }
}

fn binary(entry: &SymbolEntry, value: &Value) -> CodecResult<Json> {
    let Value::Binary(bytes) = value else {
        return Err(mismatch(entry, "binary", value));
    };
    check_size(entry, bytes.len())?;
    check_format(entry, value)?;
    entry
        .format
        .bin_to_str(bytes)
        .map(Json::String)
        .map_err(|e| format_error(entry, value, e))
}

fn boolean(entry: &SymbolEntry, value: &Value) -> CodecResult<Json> {
    match value {
        Value::Boolean(b) => {
            check_format(entry, value)?;
            Ok(Json::Bool(*b))
        }
        _ => Err(mismatch(entry, "a boolean", value)),
    }
}

fn integer(entry: &SymbolEntry, value: &Value) -> CodecResult<Json> {
    let Value::Integer(i) = value else {
        return Err(mismatch(entry, "an integer", value));
    };
    check_int_range(entry, *i)?;
    check_format(entry, value)?;
    Ok(Json::from(*i))
}

fn number(entry: &SymbolEntry, value: &Value) -> CodecResult<Json> {
    let n = match value {
        Value::Number(n) => *n,
        Value::Integer(i) => *i as f64,
        _ => return Err(mismatch(entry, "a number", value)),
    };
    let json = Number::from_f64(n).ok_or_else(|| violation(entry, format!("{} is not a finite number", n)))?;
    check_number_range(entry, n)?;
    check_format(entry, &Value::Number(n))?;
    Ok(Json::Number(json))
}

fn null(entry: &SymbolEntry, value: &Value) -> CodecResult<Json> {
    match value {
        Value::Null => Ok(Json::String(String::new())),
        _ => Err(mismatch(entry, "null", value)),
    }
}

fn string(entry: &SymbolEntry, value: &Value) -> CodecResult<Json> {
    let Value::String(text) = value else {
        return Err(mismatch(entry, "a string", value));
    };
    check_size(entry, text.chars().count())?;
    check_pattern(entry, text)?;
    check_format(entry, value)?;
    Ok(Json::String(text.clone()))
}

fn enumerated(entry: &SymbolEntry, value: &Value) -> CodecResult<Json> {
    let key = match (value, entry.native_ids) {
        (Value::Integer(id), true) => id.to_string(),
        (Value::String(name), false) => name.clone(),
        (_, true) => return Err(mismatch(entry, "an integer", value)),
        (_, false) => return Err(mismatch(entry, "a string", value)),
    };
    entry
        .by_native(&key)
        .map(|i| entry.items[i].wire.to_json())
        .ok_or_else(|| not_declared(entry, value))
}

/// Field selected by a native map key
fn keyed_field<'e>(entry: &'e SymbolEntry, key: &str) -> CodecResult<&'e FieldEntry> {
    entry
        .by_native(key)
        .map(|i| &entry.fields[i])
        .ok_or_else(|| not_declared(entry, format!("{:?}", key)))
}

fn choice(codec: &Codec, entry: &SymbolEntry, value: &Value) -> CodecResult<Json> {
    let members = value.as_map().ok_or_else(|| mismatch(entry, "a map", value))?;
    let mut iter = members.iter();
    let (key, member) = match (iter.next(), iter.next()) {
        (Some(member), None) => member,
        _ => return Err(bad_choice(entry, members.len())),
    };
    let field = keyed_field(entry, key)?;
    let mut obj = JsonMap::new();
    obj.insert(field.wire.object_key(), codec.encode_ref(&field.type_ref, member)?);
    Ok(Json::Object(obj))
}

/// A native slot counts as empty when missing, or null for a non-Null field
fn present<'v>(codec: &Codec, field: &FieldEntry, value: Option<&'v Value>) -> Option<&'v Value> {
    value.filter(|v| {
        !v.is_null()
            || codec
                .resolve(&field.declared)
                .is_ok_and(|declared| declared.base_type() == BaseType::Null)
    })
}

fn map_record(codec: &Codec, entry: &SymbolEntry, value: &Value) -> CodecResult<Json> {
    let members = value.as_map().ok_or_else(|| mismatch(entry, "a map", value))?;
    let mut consumed: HashSet<&str> = HashSet::new();
    let mut encoded: Vec<(&FieldEntry, Option<Json>)> = Vec::with_capacity(entry.fields.len());

    for field in &entry.fields {
        let slot = if field.is_fallthrough() {
            let promoted = field
                .fallthrough
                .iter()
                .find_map(|(native, _)| members.get_key_value(native.as_str()).filter(|(_, v)| !v.is_null()));
            match promoted {
                Some((native, member)) => {
                    consumed.insert(native.as_str());
                    let choice = Value::map([(native.clone(), member.clone())]);
                    Some(codec.encode_ref(&field.type_ref, &choice)?)
                }
                None => None,
            }
        } else {
            consumed.insert(field.native.as_str());
            match present(codec, field, members.get(&field.native)) {
                Some(member) => Some(match field.tfield() {
                    Some(tfield) => {
                        let (_, selector) = discriminator(entry, field, tfield)?;
                        encode_selected(codec, entry, field, members.get(&selector.native), member)?
                    }
                    None => codec.encode_ref(&field.type_ref, member)?,
                }),
                None => None,
            }
        };
        if slot.is_none() && !field.is_optional() {
            return Err(missing_field(entry, field));
        }
        encoded.push((field, slot));
    }

    let unexpected: Vec<String> = members
        .keys()
        .filter(|key| !consumed.contains(key.as_str()))
        .cloned()
        .collect();
    if !unexpected.is_empty() {
        return Err(unexpected_fields(entry, unexpected));
    }

    if entry.wire_type == WireType::Array {
        let mut slots: Vec<Json> = encoded.into_iter().map(|(_, slot)| slot.unwrap_or(Json::Null)).collect();
        strip_trailing_nulls(&mut slots);
        return Ok(Json::Array(slots));
    }

    let mut obj = JsonMap::new();
    for (field, slot) in encoded {
        match (slot, field.is_fallthrough()) {
            (Some(Json::Object(promoted)), true) => obj.extend(promoted),
            (Some(json), _) => {
                obj.insert(field.wire.object_key(), json);
            }
            (None, _) => {}
        }
    }
    Ok(Json::Object(obj))
}

/// Encodes a field whose type is chosen by another field's native value
fn encode_selected(
    codec: &Codec,
    entry: &SymbolEntry,
    field: &FieldEntry,
    selector: Option<&Value>,
    value: &Value,
) -> CodecResult<Json> {
    let key = match selector {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Integer(i)) => i.to_string(),
        Some(other) => return Err(mismatch(entry, "a type selector", other)),
        None => {
            return Err(structural(
                entry,
                format!("field \"{}\" has no type selector value", field_label(field)),
            ))
        }
    };

    if field.is_multi() {
        let choice = codec.resolve(&field.declared)?;
        let element = keyed_field(choice, &key)?;
        let wrapper = codec.resolve(&field.type_ref)?;
        return array_of(codec, wrapper, value, Some(&element.type_ref));
    }

    match codec.encode_ref(&field.type_ref, &Value::map([(key, value.clone())]))? {
        Json::Object(obj) => obj
            .into_iter()
            .next()
            .map(|(_, v)| v)
            .ok_or_else(|| structural(entry, format!("field \"{}\" selected no value", field_label(field)))),
        other => Ok(other),
    }
}

fn strip_trailing_nulls(slots: &mut Vec<Json>) {
    while matches!(slots.last(), Some(Json::Null)) {
        slots.pop();
    }
}

fn array(codec: &Codec, entry: &SymbolEntry, value: &Value) -> CodecResult<Json> {
    let Value::Array(items) = value else {
        return Err(mismatch(entry, "an array", value));
    };
    if items.len() > entry.fields.len() {
        return Err(too_many_values(entry, items.len()));
    }

    let mut slots: Vec<Json> = Vec::with_capacity(entry.fields.len());
    for (pos, field) in entry.fields.iter().enumerate() {
        let Some(item) = present(codec, field, items.get(pos)) else {
            if !field.is_optional() {
                return Err(missing_field(entry, field));
            }
            slots.push(Json::Null);
            continue;
        };
        let encoded = match field.tfield() {
            Some(tfield) => {
                let (selector_pos, selector) = discriminator(entry, field, tfield)?;
                encode_selected(codec, entry, field, present(codec, selector, items.get(selector_pos)), item)?
            }
            None => codec.encode_ref(&field.type_ref, item)?,
        };
        slots.push(encoded);
    }
    strip_trailing_nulls(&mut slots);

    if entry.format.has_multipart() {
        return entry
            .format
            .parts_to_str(&slots)
            .map(Json::String)
            .map_err(|e| format_error(entry, value, e));
    }
    Ok(Json::Array(slots))
}

fn array_of(codec: &Codec, entry: &SymbolEntry, value: &Value, element: Option<&TypeRef>) -> CodecResult<Json> {
    let Value::Array(items) = value else {
        return Err(mismatch(entry, "an array", value));
    };
    check_size(entry, items.len())?;
    let vtype = element
        .or(entry.vtype.as_ref())
        .ok_or_else(|| structural(entry, "no value type"))?;
    items
        .iter()
        .map(|item| codec.encode_ref(vtype, item))
        .collect::<CodecResult<Vec<_>>>()
        .map(Json::Array)
}

fn map_of(codec: &Codec, entry: &SymbolEntry, value: &Value) -> CodecResult<Json> {
    let members: &BTreeMap<String, Value> = value.as_map().ok_or_else(|| mismatch(entry, "a map", value))?;
    check_size(entry, members.len())?;
    let vtype = entry.vtype.as_ref().ok_or_else(|| structural(entry, "no value type"))?;
    let ktype = entry.ktype.as_ref().map(|k| codec.resolve(k)).transpose()?;

    let mut obj = JsonMap::new();
    for (key, member) in members {
        let wire_key = match ktype {
            Some(key_entry) => {
                let integer_key = key_entry.base_type() == BaseType::Integer
                    || (key_entry.base_type() == BaseType::Enumerated && key_entry.native_ids);
                let native_key = if integer_key {
                    Value::Integer(key.parse().map_err(|_| bad_key(entry, key))?)
                } else {
                    Value::String(key.clone())
                };
                match encode(codec, key_entry, &native_key)? {
                    Json::String(s) => s,
                    Json::Number(n) => n.to_string(),
                    other => return Err(mismatch(entry, "a string or integer key", other)),
                }
            }
            None => key.clone(),
        };
        obj.insert(wire_key, codec.encode_ref(vtype, member)?);
    }
    Ok(Json::Object(obj))
}

//! Wire to native decoders, one per base kind

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::{Map as JsonMap, Value as Json};

use super::errors::CodecResult;
use super::general::{
    bad_choice, bad_key, check_format, check_int_range, check_number_range, check_pattern, check_size,
    discriminator, duplicate_key, field_label, format_error, mismatch, missing_field, not_declared, require_format, structural,
    too_many_values, unexpected_fields, violation,
};
use super::symtab::{FieldEntry, SymbolEntry, TypeRef, WireKey, WireType};
use super::Codec;
use crate::schema::BaseType;
use crate::value::Value;

/// Decodes `wire` against `entry`
pub(crate) fn decode(codec: &Codec, entry: &SymbolEntry, wire: &Json) -> CodecResult<Value> {
    require_format(entry)?;
    match entry.base_type() {
        BaseType::Binary => binary(entry, wire),
        BaseType::Boolean => boolean(entry, wire),
        BaseType::Integer => integer(entry, wire),
        BaseType::Number => number(entry, wire),
        BaseType::Null => null(entry, wire),
        BaseType::String => string(entry, wire),
        BaseType::Enumerated => enumerated(entry, wire),
        BaseType::Choice => choice(codec, entry, wire),
        BaseType::Map | BaseType::Record => map_record(codec, entry, wire),
        BaseType::Array => array(codec, entry, wire),
        BaseType::ArrayOf => array_of(codec, entry, wire, None),
        BaseType::MapOf => map_of(codec, entry, wire),
    }
}

fn binary(entry: &SymbolEntry, wire: &Json) -> CodecResult<Value> {
    let text = wire.as_str().ok_or_else(|| mismatch(entry, "a string", wire))?;
    let bytes = entry.format.str_to_bin(text).map_err(|e| format_error(entry, wire, e))?;
    check_size(entry, bytes.len())?;
    let value = Value::Binary(bytes);
    check_format(entry, &value)?;
    Ok(value)
}

fn boolean(entry: &SymbolEntry, wire: &Json) -> CodecResult<Value> {
    let value = wire
        .as_bool()
        .map(Value::Boolean)
        .ok_or_else(|| mismatch(entry, "a boolean", wire))?;
    check_format(entry, &value)?;
    Ok(value)
}

fn integer(entry: &SymbolEntry, wire: &Json) -> CodecResult<Value> {
    // as_i64 is None for floats, so 3.0 is rejected as well as 3.5
    let i = match wire {
        Json::Number(n) => n.as_i64(),
        _ => None,
    }
    .ok_or_else(|| mismatch(entry, "an integer", wire))?;
    check_int_range(entry, i)?;
    let value = Value::Integer(i);
    check_format(entry, &value)?;
    Ok(value)
}

fn number(entry: &SymbolEntry, wire: &Json) -> CodecResult<Value> {
    let n = match wire {
        Json::Number(n) => n.as_f64(),
        _ => None,
    }
    .ok_or_else(|| mismatch(entry, "a number", wire))?;
    check_number_range(entry, n)?;
    let value = Value::Number(n);
    check_format(entry, &value)?;
    Ok(value)
}

fn null(entry: &SymbolEntry, wire: &Json) -> CodecResult<Value> {
    match wire {
        Json::String(s) if s.is_empty() => Ok(Value::Null),
        Json::String(_) => Err(violation(entry, format!("bad value: {}", wire))),
        _ => Err(mismatch(entry, "an empty string", wire)),
    }
}

fn string(entry: &SymbolEntry, wire: &Json) -> CodecResult<Value> {
    let text = wire.as_str().ok_or_else(|| mismatch(entry, "a string", wire))?;
    check_size(entry, text.chars().count())?;
    check_pattern(entry, text)?;
    let value = Value::String(text.to_string());
    check_format(entry, &value)?;
    Ok(value)
}

fn enumerated(entry: &SymbolEntry, wire: &Json) -> CodecResult<Value> {
    let key = WireKey::from_json(wire, entry.ident).ok_or_else(|| mismatch(entry, entry.wire_type.describe(), wire))?;
    let item = entry
        .by_wire(&key)
        .map(|i| &entry.items[i])
        .ok_or_else(|| not_declared(entry, wire))?;
    if entry.native_ids {
        Ok(Value::Integer(i64::try_from(item.item.id).map_err(|_| not_declared(entry, wire))?))
    } else {
        Ok(Value::String(item.item.value.clone()))
    }
}

/// Field selected by an object key
fn keyed_field<'e>(entry: &'e SymbolEntry, key: &str) -> CodecResult<&'e FieldEntry> {
    let wire_key = WireKey::from_object_key(key, entry.ident).ok_or_else(|| bad_key(entry, key))?;
    entry
        .by_wire(&wire_key)
        .map(|i| &entry.fields[i])
        .ok_or_else(|| not_declared(entry, format!("{:?}", key)))
}

fn choice(codec: &Codec, entry: &SymbolEntry, wire: &Json) -> CodecResult<Value> {
    let obj = wire.as_object().ok_or_else(|| mismatch(entry, "an object", wire))?;
    let mut members = obj.iter();
    let (key, value) = match (members.next(), members.next()) {
        (Some(member), None) => member,
        _ => return Err(bad_choice(entry, obj.len())),
    };
    let field = keyed_field(entry, key)?;
    let decoded = codec.decode_ref(&field.type_ref, value)?;
    Ok(Value::map([(field.native.clone(), decoded)]))
}

fn map_record(codec: &Codec, entry: &SymbolEntry, wire: &Json) -> CodecResult<Value> {
    match (wire, entry.wire_type) {
        (Json::Object(obj), WireType::Object) => decode_object(codec, entry, obj),
        (Json::Array(items), WireType::Array) => decode_positional(codec, entry, items),
        _ => Err(mismatch(entry, entry.wire_type.describe(), wire)),
    }
}

fn merge(out: &mut BTreeMap<String, Value>, promoted: Value) {
    if let Value::Map(members) = promoted {
        out.extend(members);
    }
}

fn single(key: String, value: &Json) -> Json {
    let mut obj = JsonMap::new();
    obj.insert(key, value.clone());
    Json::Object(obj)
}

fn decode_object(codec: &Codec, entry: &SymbolEntry, obj: &JsonMap<String, Json>) -> CodecResult<Value> {
    let mut keyed: HashMap<WireKey, (&str, &Json)> = HashMap::new();
    for (raw, value) in obj {
        let key = WireKey::from_object_key(raw, entry.ident).ok_or_else(|| bad_key(entry, raw))?;
        if let Some((first, _)) = keyed.insert(key, (raw.as_str(), value)) {
            return Err(duplicate_key(entry, format!("{:?} and {:?}", first, raw)));
        }
    }
    let present = |key: &WireKey| keyed.get(key).filter(|(_, v)| !v.is_null()).copied();

    let mut out = BTreeMap::new();
    let mut consumed: HashSet<&WireKey> = HashSet::new();
    for field in &entry.fields {
        if field.is_fallthrough() {
            let promoted = field
                .fallthrough
                .iter()
                .find_map(|(_, wire_key)| present(wire_key).map(|found| (wire_key, found)));
            match promoted {
                Some((wire_key, (raw, value))) => {
                    consumed.insert(wire_key);
                    let choice = single(raw.to_string(), value);
                    merge(&mut out, codec.decode_ref(&field.type_ref, &choice)?);
                }
                None if !field.is_optional() => return Err(missing_field(entry, field)),
                None => {}
            }
            continue;
        }

        consumed.insert(&field.wire);
        match present(&field.wire) {
            Some((_, value)) => {
                let decoded = match field.tfield() {
                    Some(tfield) => {
                        let (_, selector) = discriminator(entry, field, tfield)?;
                        decode_selected(codec, entry, field, present(&selector.wire).map(|(_, v)| v), value)?
                    }
                    None => codec.decode_ref(&field.type_ref, value)?,
                };
                out.insert(field.native.clone(), decoded);
            }
            None if !field.is_optional() => return Err(missing_field(entry, field)),
            None => {}
        }
    }

    let unexpected: Vec<String> = keyed
        .iter()
        .filter(|(key, _)| !consumed.contains(key))
        .map(|(_, (raw, _))| raw.to_string())
        .collect();
    if !unexpected.is_empty() {
        return Err(unexpected_fields(entry, unexpected));
    }
    Ok(Value::Map(out))
}

fn decode_positional(codec: &Codec, entry: &SymbolEntry, items: &[Json]) -> CodecResult<Value> {
    if items.len() > entry.fields.len() {
        return Err(too_many_values(entry, items.len()));
    }
    let slot = |pos: usize| items.get(pos).filter(|v| !v.is_null());

    let mut out = BTreeMap::new();
    for (pos, field) in entry.fields.iter().enumerate() {
        let Some(value) = slot(pos) else {
            if field.is_optional() {
                continue;
            }
            return Err(missing_field(entry, field));
        };
        if field.is_fallthrough() {
            merge(&mut out, codec.decode_ref(&field.type_ref, value)?);
            continue;
        }
        let decoded = match field.tfield() {
            Some(tfield) => {
                let (selector_pos, _) = discriminator(entry, field, tfield)?;
                decode_selected(codec, entry, field, slot(selector_pos), value)?
            }
            None => codec.decode_ref(&field.type_ref, value)?,
        };
        out.insert(field.native.clone(), decoded);
    }
    Ok(Value::Map(out))
}

/// Decodes a field whose type is chosen by another field's wire value
fn decode_selected(
    codec: &Codec,
    entry: &SymbolEntry,
    field: &FieldEntry,
    selector: Option<&Json>,
    value: &Json,
) -> CodecResult<Value> {
    let selector = selector.ok_or_else(|| {
        structural(entry, format!("field \"{}\" has no type selector value", field_label(field)))
    })?;
    let key = match selector {
        Json::String(s) => s.clone(),
        Json::Number(n) => n.to_string(),
        other => return Err(mismatch(entry, "a type selector", other)),
    };

    if field.is_multi() {
        let choice = codec.resolve(&field.declared)?;
        let element = keyed_field(choice, &key)?;
        let wrapper = codec.resolve(&field.type_ref)?;
        return array_of(codec, wrapper, value, Some(&element.type_ref));
    }

    match codec.decode_ref(&field.type_ref, &single(key, value))? {
        Value::Map(members) => members
            .into_values()
            .next()
            .ok_or_else(|| structural(entry, format!("field \"{}\" selected no value", field_label(field)))),
        other => Ok(other),
    }
}

fn array(codec: &Codec, entry: &SymbolEntry, wire: &Json) -> CodecResult<Value> {
    let parts: Vec<Json>;
    let items: &[Json] = if entry.format.has_multipart() {
        let text = wire.as_str().ok_or_else(|| mismatch(entry, "a string", wire))?;
        parts = entry.format.str_to_parts(text).map_err(|e| format_error(entry, wire, e))?;
        &parts
    } else {
        wire.as_array().ok_or_else(|| mismatch(entry, "an array", wire))?
    };
    if items.len() > entry.fields.len() {
        return Err(too_many_values(entry, items.len()));
    }
    let slot = |pos: usize| items.get(pos).filter(|v| !v.is_null());

    let mut values: Vec<Option<Value>> = Vec::with_capacity(entry.fields.len());
    for (pos, field) in entry.fields.iter().enumerate() {
        let Some(value) = slot(pos) else {
            if !field.is_optional() {
                return Err(missing_field(entry, field));
            }
            values.push(None);
            continue;
        };
        let decoded = match field.tfield() {
            Some(tfield) => {
                let (selector_pos, _) = discriminator(entry, field, tfield)?;
                decode_selected(codec, entry, field, slot(selector_pos), value)?
            }
            None => codec.decode_ref(&field.type_ref, value)?,
        };
        values.push(Some(decoded));
    }

    while matches!(values.last(), Some(None)) {
        values.pop();
    }
    Ok(Value::Array(values.into_iter().map(|v| v.unwrap_or(Value::Null)).collect()))
}

fn array_of(codec: &Codec, entry: &SymbolEntry, wire: &Json, element: Option<&TypeRef>) -> CodecResult<Value> {
    let items = wire.as_array().ok_or_else(|| mismatch(entry, "an array", wire))?;
    check_size(entry, items.len())?;
    let vtype = element
        .or(entry.vtype.as_ref())
        .ok_or_else(|| structural(entry, "no value type"))?;
    items
        .iter()
        .map(|item| codec.decode_ref(vtype, item))
        .collect::<CodecResult<Vec<_>>>()
        .map(Value::Array)
}

fn map_of(codec: &Codec, entry: &SymbolEntry, wire: &Json) -> CodecResult<Value> {
    let obj = wire.as_object().ok_or_else(|| mismatch(entry, "an object", wire))?;
    check_size(entry, obj.len())?;
    let vtype = entry.vtype.as_ref().ok_or_else(|| structural(entry, "no value type"))?;
    let ktype = entry.ktype.as_ref().map(|k| codec.resolve(k)).transpose()?;

    let mut out = BTreeMap::new();
    for (raw, value) in obj {
        let key = match ktype {
            Some(key_entry) => {
                let wire_key = if key_entry.wire_type == WireType::Integer {
                    let i = raw.parse::<i64>().map_err(|_| bad_key(entry, raw))?;
                    if i.to_string() != *raw {
                        return Err(bad_key(entry, raw));
                    }
                    Json::from(i)
                } else {
                    Json::String(raw.clone())
                };
                match decode(codec, key_entry, &wire_key)? {
                    Value::String(s) => s,
                    Value::Integer(i) => i.to_string(),
                    other => return Err(mismatch(entry, "a string key", other)),
                }
            }
            None => raw.clone(),
        };
        let decoded = codec.decode_ref(vtype, value)?;
        if out.insert(key, decoded).is_some() {
            return Err(duplicate_key(entry, format!("{:?}", raw)));
        }
    }
    Ok(Value::Map(out))
}

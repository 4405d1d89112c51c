//! Decoder: host value -> reflected record.

use super::error::MarshalError;
use crate::reflect::{Map, Record, Reflect, ReflectMut, Sequence};
use crate::value::{Object, Value, ValueType};

/// Fills `target` from a host object, field by field.
///
/// Only tagged fields are read. A missing or `undefined` key leaves the field
/// untouched. The first failing field aborts the decode; whatever was written
/// before that point must be treated as garbage by the caller.
pub fn decode(input: &Value, target: &mut dyn Reflect) -> Result<(), MarshalError> {
    let type_name = target.type_name();
    match target.reflect_mut() {
        ReflectMut::Record(record) => decode_record(input, record),
        _ => Err(MarshalError::Shape(format!(
            "target must be a record, got {type_name}"
        ))),
    }
}

/// Decodes into a fresh zero-valued `T`.
pub fn decode_into<T: Reflect + Default>(input: &Value) -> Result<T, MarshalError> {
    let mut target = T::default();
    decode(input, &mut target)?;
    Ok(target)
}

fn decode_record(input: &Value, record: &mut dyn Record) -> Result<(), MarshalError> {
    let Value::Object(object) = input else {
        return Err(MarshalError::Shape(format!(
            "expected object, got {}",
            input.type_label()
        )));
    };

    for (index, field) in record.fields().iter().enumerate() {
        let Some(tag) = field.tag else {
            continue;
        };
        let value = match object.get(tag) {
            None | Some(Value::Undefined) => {
                tracing::trace!(field = field.name, tag, "absent key, field left at zero value");
                continue;
            }
            Some(value) => value,
        };
        let Some(slot) = record.field_mut(index) else {
            continue;
        };
        decode_value(value, slot).map_err(|e| MarshalError::DecodeField {
            name: field.name,
            index,
            source: Box::new(e),
        })?;
    }

    Ok(())
}

fn decode_value(value: &Value, target: &mut dyn Reflect) -> Result<(), MarshalError> {
    let kind = target.kind();
    let type_name = target.type_name();

    match target.reflect_mut() {
        // host strings coerce losslessly, no type check
        ReflectMut::String(s) => *s = value.to_string(),
        ReflectMut::Int(slot) | ReflectMut::Uint(slot) | ReflectMut::Float(slot) => {
            let Value::Number(n) = value else {
                return Err(MarshalError::mismatch(kind, ValueType::Number, value));
            };
            slot.set_f64(*n);
        }
        ReflectMut::Bool(b) => {
            let Value::Bool(v) = value else {
                return Err(MarshalError::mismatch(kind, ValueType::Boolean, value));
            };
            *b = *v;
        }
        ReflectMut::Sequence(seq) => {
            let Value::Array(items) = value else {
                return Err(MarshalError::mismatch(kind, ValueType::Array, value));
            };
            decode_sequence(items, seq)?;
        }
        ReflectMut::Map(map) => {
            let Value::Object(object) = value else {
                return Err(MarshalError::mismatch(kind, ValueType::Object, value));
            };
            decode_map(object, map)?;
        }
        // the enclosing field adds the context
        ReflectMut::Record(record) => {
            if !matches!(value, Value::Object(_)) {
                return Err(MarshalError::mismatch(kind, ValueType::Object, value));
            }
            decode_record(value, record)?;
        }
        ReflectMut::Opaque => return Err(MarshalError::UnsupportedType(type_name)),
    }

    Ok(())
}

fn decode_sequence(items: &[Value], seq: &mut dyn Sequence) -> Result<(), MarshalError> {
    seq.reset(items.len());
    for (index, item) in items.iter().enumerate() {
        let Some(slot) = seq.get_mut(index) else {
            break;
        };
        decode_value(item, slot).map_err(|e| MarshalError::Element {
            index,
            source: Box::new(e),
        })?;
    }
    Ok(())
}

fn decode_map(object: &Object, map: &mut dyn Map) -> Result<(), MarshalError> {
    let key_type = map.key_type_name();

    map.clear();
    for key in object.keys() {
        let Some(item) = object.get(&key) else {
            continue;
        };
        let Some(slot) = map.entry_mut(&key) else {
            return Err(MarshalError::UnsupportedKey(key_type));
        };
        decode_value(item, slot).map_err(|e| MarshalError::Entry {
            key: key.clone(),
            source: Box::new(e),
        })?;
    }
    Ok(())
}

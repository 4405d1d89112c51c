//! Encoder: reflected record -> host object.

use super::error::MarshalError;
use crate::reflect::{Map, Record, Reflect, ReflectRef, Sequence};
use crate::value::{Object, Value};

/// Builds a fresh host object from the tagged fields of `source`.
///
/// Untagged fields never show up in the output. The first field that cannot
/// be expressed aborts the whole encode.
pub fn encode(source: &dyn Reflect) -> Result<Value, MarshalError> {
    match source.reflect_ref() {
        ReflectRef::Record(record) => encode_record(record).map(Value::Object),
        _ => Err(MarshalError::Shape(format!(
            "input must be a record, got {}",
            source.type_name()
        ))),
    }
}

fn encode_record(record: &dyn Record) -> Result<Object, MarshalError> {
    let mut output = Object::new();
    for (index, field) in record.fields().iter().enumerate() {
        let Some(tag) = field.tag else {
            continue;
        };
        let Some(value) = record.field(index) else {
            continue;
        };
        let value = encode_value(value).map_err(|e| MarshalError::EncodeField {
            name: field.name,
            index,
            source: Box::new(e),
        })?;
        output.set(tag, value);
    }
    Ok(output)
}

fn encode_value(source: &dyn Reflect) -> Result<Value, MarshalError> {
    let value = match source.reflect_ref() {
        ReflectRef::String(s) => Value::String(s.to_string()),
        ReflectRef::Int(n) => Value::Number(n as f64),
        ReflectRef::Uint(n) => Value::Number(n as f64),
        ReflectRef::Bool(b) => Value::Bool(b),
        ReflectRef::Float(n) => Value::Number(n),
        ReflectRef::Sequence(seq) => encode_sequence(seq)?,
        ReflectRef::Map(map) => encode_map(map)?,
        ReflectRef::Record(record) => encode_record(record)
            .map(Value::Object)
            .map_err(|e| MarshalError::NestedRecord {
                source: Box::new(e),
            })?,
        ReflectRef::Opaque => return Err(MarshalError::UnsupportedType(source.type_name())),
    };
    Ok(value)
}

fn encode_sequence(seq: &dyn Sequence) -> Result<Value, MarshalError> {
    let mut items = Vec::with_capacity(seq.len());
    for index in 0..seq.len() {
        let Some(item) = seq.get(index) else {
            break;
        };
        let value = encode_value(item).map_err(|e| MarshalError::EncodeElement {
            index,
            source: Box::new(e),
        })?;
        items.push(value);
    }
    Ok(Value::Array(items))
}

// keys go through Display, so non-string keys are stringified rather than
// rejected (the decoder refuses them)
fn encode_map(map: &dyn Map) -> Result<Value, MarshalError> {
    let mut output = Object::new();
    for (key, item) in map.entries() {
        let value = encode_value(item).map_err(|e| MarshalError::EncodeEntry {
            key: key.clone(),
            source: Box::new(e),
        })?;
        output.set(key, value);
    }
    Ok(Value::Object(output))
}

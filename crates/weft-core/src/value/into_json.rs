use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number as JsonNumber, Value as JsonValue};

use super::{Object, Value};

// largest integer an f64 holds exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl Value {
    /// Converts the value into JSON the way `JSON.stringify` would see it.
    ///
    /// Undefined, function and promise properties are dropped from objects
    /// and become `null` inside arrays. Non-finite numbers become `null`.
    pub fn into_json(self) -> JsonValue {
        match self {
            Value::Undefined | Value::Null | Value::Function(_) | Value::Promise(_) => {
                JsonValue::Null
            }
            Value::Bool(b) => JsonValue::Bool(b),
            Value::Number(n) => number_to_json(n),
            Value::String(s) => JsonValue::String(s),
            Value::Array(items) => {
                JsonValue::Array(items.into_iter().map(Value::into_json).collect())
            }
            Value::Object(object) => {
                let mut map = Map::with_capacity(object.len());
                for (k, v) in object {
                    if is_json_visible(&v) {
                        map.insert(k, v.into_json());
                    }
                }
                JsonValue::Object(map)
            }
        }
    }
}

fn is_json_visible(value: &Value) -> bool {
    !matches!(
        value,
        Value::Undefined | Value::Function(_) | Value::Promise(_)
    )
}

fn number_to_json(n: f64) -> JsonValue {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return JsonValue::Number(JsonNumber::from(n as i64));
    }
    JsonNumber::from_f64(n).map_or(JsonValue::Null, JsonValue::Number)
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            // every JSON number is a double on the host side
            JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect::<Object>(),
            ),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.clone().into_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        JsonValue::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Function;
    use serde_json::json;

    #[test]
    fn from_json_builds_host_values() {
        let value = Value::from(json!({ "name": "Ann", "tags": ["a", 1], "meta": null }));

        assert_eq!(value.get("name"), &Value::from("Ann"));
        assert_eq!(value.get("tags").index(1), &Value::Number(1.0));
        assert!(value.get("meta").is_null());
    }

    #[test]
    fn into_json_drops_invisible_properties() {
        let mut object = Object::new();
        object.set("keep", 1);
        object.set("gone", Value::Undefined);
        object.set("call", Function::new("call", |_, _| Value::Undefined));
        let array = Value::Array(vec![Value::Undefined, 2.5.into()]);
        object.set("list", array);

        let json = Value::Object(object).into_json();
        assert_eq!(json, json!({ "keep": 1, "list": [null, 2.5] }));
    }

    #[test]
    fn serde_roundtrip_through_json_text() {
        let value = Value::from(json!({ "n": 3, "ok": true }));
        let text = serde_json::to_string(&value).unwrap();
        assert_eq!(text, r#"{"n":3,"ok":true}"#);

        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, value);
    }
}

//! serde_json::Value <-> clove-path Value conversion

use crate::value::{Map, Value};

/// Convert serde_json::Value to Value
pub fn from_json(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::array(arr.into_iter().map(from_json)),
        serde_json::Value::Object(obj) => Value::map(
            obj.into_iter()
                .map(|(k, v)| (Value::String(k), from_json(v)))
                .collect::<Map>(),
        ),
    }
}

/// Convert Value to serde_json::Value
///
/// Pointers are transparent and records contribute their exported fields.
/// Returns `None` for values with no JSON form: objects, and maps with
/// non-scalar keys.
pub fn to_json(v: &Value) -> Option<serde_json::Value> {
    Some(match v {
        Value::Null | Value::Pointer(None) => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(to_json).collect::<Option<_>>()?)
        }
        Value::Map(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| Some((k.key_string()?.into_owned(), to_json(v)?)))
                .collect::<Option<_>>()?,
        ),
        Value::Record(record) => serde_json::Value::Object(
            record
                .fields()
                .iter()
                .filter(|field| field.is_exported())
                .map(|field| Some((field.name().to_string(), to_json(field.value())?)))
                .collect::<Option<_>>()?,
        ),
        Value::Pointer(Some(inner)) => to_json(inner)?,
        Value::Object(_) => return None,
    })
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        from_json(v)
    }
}

//! Conversion between JSON nodes and plain values.

use serde_json::Value as Json;

use super::Value;

/// Scalars become plain values; arrays and objects stay JSON nodes.
pub fn unwrap_json(node: &Json) -> Value {
    match node {
        Json::Null => Value::Nil,
        Json::Bool(b) => Value::Boolean(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::string(s),
        Json::Array(_) | Json::Object(_) => Value::json(node.clone()),
    }
}

/// Convert a script value into JSON. `None` for kinds JSON cannot hold.
pub fn to_json(value: &Value) -> Option<Json> {
    Some(match value {
        Value::Integer(n) => Json::from(*n),
        Value::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
        Value::String(s) => Json::String(s.to_string()),
        Value::Boolean(b) => Json::Bool(*b),
        Value::Nil => Json::Null,
        Value::Json(node) => (**node).clone(),
        Value::Variant(_) => return to_json(&value.clone().unwrap_variant()),
        Value::Array(a) => Json::Array(
            a.elements()
                .iter()
                .map(to_json)
                .collect::<Option<Vec<_>>>()?,
        ),
        Value::Record(r) => Json::Object(
            r.fields()
                .iter()
                .map(|(name, v)| to_json(v).map(|j| (name.to_string(), j)))
                .collect::<Option<serde_json::Map<_, _>>>()?,
        ),
        Value::Enum(e) => Json::from(e.ordinal),
        Value::Object(_)
        | Value::Interface(_)
        | Value::Class(_)
        | Value::Function(_) => return None,
    })
}

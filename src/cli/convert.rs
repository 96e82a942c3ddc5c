//! JSON <-> Value conversion utilities

use std::collections::HashMap;

use crate::Value;

/// Convert a JSON document into a value graph.
///
/// Objects become maps and arrays become lists. Integers become `Int` when
/// they fit in 32 bits and `Long` otherwise; other numbers become `Double`.
pub fn json_to_value(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => i32::try_from(i).map_or(Value::Long(i), Value::Int),
            None => n.as_f64().map_or(Value::Null, Value::Double),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::list(arr.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(obj) => Value::map(
            obj.into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect::<HashMap<_, _>>(),
        ),
    }
}

fn json_array(items: &[Value]) -> serde_json::Value {
    serde_json::Value::Array(items.iter().map(value_to_json).collect())
}

/// Convert a value back to JSON for output.
///
/// Big numbers that do not fit a JSON number exactly are written as strings;
/// host objects as their display form.
pub fn value_to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Byte(n) => serde_json::Value::Number((*n).into()),
        Value::Short(n) => serde_json::Value::Number((*n).into()),
        Value::Int(n) => serde_json::Value::Number((*n).into()),
        Value::Long(n) => serde_json::Value::Number((*n).into()),
        Value::Float(f) => serde_json::Number::from_f64(f64::from(*f))
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Double(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::BigInteger(n) => match i64::try_from(*n) {
            Ok(n) => serde_json::Value::Number(n.into()),
            Err(_) => serde_json::Value::String(n.to_string()),
        },
        Value::BigDecimal(n) => serde_json::Value::String(n.to_string()),
        Value::Char(c) => serde_json::Value::String(c.to_string()),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::List(items) | Value::Set(items) => json_array(&items.borrow()),
        Value::Array(array) => json_array(&array.borrow().items),
        Value::Iterator(state) => {
            let state = state.borrow();
            json_array(&state.items[state.position.min(state.items.len())..])
        }
        Value::Map(map) => serde_json::Value::Object(
            map.borrow()
                .iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect(),
        ),
        Value::Object(_) | Value::Subscript(_) => serde_json::Value::String(v.to_string()),
    }
}

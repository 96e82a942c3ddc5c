use super::{ObjectAccessor, PropertyAccessor, PropertyKey};
use crate::{context::Context, evaluator::EvalError, value::Value};

/// Entries of a map by key, for both `map.key` and `map["key"]`.
///
/// A missing key reads as null. In dot form, `size`, `isEmpty`, `keys` and
/// `values` answer for the map itself unless an entry of that name exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct MapAccessor;

impl PropertyAccessor for MapAccessor {
    fn get_property(&self, ctx: &Context, target: &Value, key: PropertyKey<'_>) -> Result<Value, EvalError> {
        let Value::Map(map) = target else {
            return ObjectAccessor.get_property(ctx, target, key);
        };
        let map = map.borrow();
        match key {
            PropertyKey::Index(index) => Ok(map.get(&index.map_key()).cloned().unwrap_or(Value::Null)),
            PropertyKey::Name(name) => {
                if let Some(entry) = map.get(name) {
                    return Ok(entry.clone());
                }
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                Ok(match name {
                    "size" => Value::Int(map.len() as i32),
                    "isEmpty" => Value::Boolean(map.is_empty()),
                    "keys" => Value::set(keys.into_iter().map(|k| Value::String(k.clone())).collect()),
                    "values" => Value::list(keys.into_iter().map(|k| map[k].clone()).collect()),
                    _ => Value::Null,
                })
            }
        }
    }

    fn set_property(
        &self,
        ctx: &Context,
        target: &Value,
        key: PropertyKey<'_>,
        value: Value,
    ) -> Result<(), EvalError> {
        let Value::Map(map) = target else {
            return ObjectAccessor.set_property(ctx, target, key, value);
        };
        let key = match key {
            PropertyKey::Name(name) => name.to_string(),
            PropertyKey::Index(index) => index.map_key(),
        };
        map.borrow_mut().insert(key, value);
        Ok(())
    }
}

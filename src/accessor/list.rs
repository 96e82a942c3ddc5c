use super::{ObjectAccessor, PropertyAccessor, PropertyKey, Slot, no_such_property, slot};
use crate::{context::Context, evaluator::EvalError, value::Value};

/// Positional access on lists, plus `size`, `isEmpty` and `iterator`.
///
/// `list[#ALL]` reads a copy of the whole list; assigning a collection to it
/// replaces the contents in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListAccessor;

impl PropertyAccessor for ListAccessor {
    fn get_property(&self, ctx: &Context, target: &Value, key: PropertyKey<'_>) -> Result<Value, EvalError> {
        let Value::List(items) = target else {
            return ObjectAccessor.get_property(ctx, target, key);
        };
        if let PropertyKey::Index(index) = key {
            let items = items.borrow();
            match slot(index, items.len())? {
                Some(Slot::At(i)) => return Ok(items[i].clone()),
                Some(Slot::Empty) => return Ok(Value::Null),
                Some(Slot::All) => return Ok(Value::list(items.clone())),
                None => {}
            }
        }
        match key.as_name() {
            Some("size") => Ok(Value::Int(items.borrow().len() as i32)),
            Some("isEmpty") => Ok(Value::Boolean(items.borrow().is_empty())),
            Some("iterator") => Ok(Value::iterator(items.borrow().clone())),
            Some(_) => ObjectAccessor.get_property(ctx, target, key),
            None => Err(no_such_property(target, key)),
        }
    }

    fn set_property(
        &self,
        ctx: &Context,
        target: &Value,
        key: PropertyKey<'_>,
        value: Value,
    ) -> Result<(), EvalError> {
        let Value::List(items) = target else {
            return ObjectAccessor.set_property(ctx, target, key, value);
        };
        if let PropertyKey::Index(index) = key {
            let len = items.borrow().len();
            match slot(index, len)? {
                Some(Slot::At(i)) => {
                    items.borrow_mut()[i] = value;
                    return Ok(());
                }
                Some(Slot::Empty) => return Ok(()),
                Some(Slot::All) => {
                    let replacement = value.elements().ok_or_else(|| EvalError::TypeConversionFailed {
                        value: value.to_string(),
                        target: "Collection".to_string(),
                    })?;
                    let mut items = items.borrow_mut();
                    items.clear();
                    items.extend(replacement);
                    return Ok(());
                }
                None => {}
            }
        }
        match key.as_name() {
            Some(_) => ObjectAccessor.set_property(ctx, target, key, value),
            None => Err(no_such_property(target, key)),
        }
    }
}

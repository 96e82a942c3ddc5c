use super::{ObjectAccessor, PropertyAccessor, PropertyKey};
use crate::{context::Context, evaluator::EvalError, value::Value};

/// `size`, `isEmpty` and `iterator` on sets; sets have no positions.
#[derive(Debug, Default, Clone, Copy)]
pub struct SetAccessor;

impl PropertyAccessor for SetAccessor {
    fn get_property(&self, ctx: &Context, target: &Value, key: PropertyKey<'_>) -> Result<Value, EvalError> {
        let Value::Set(items) = target else {
            return ObjectAccessor.get_property(ctx, target, key);
        };
        match key.as_name() {
            Some("size") => Ok(Value::Int(items.borrow().len() as i32)),
            Some("isEmpty") => Ok(Value::Boolean(items.borrow().is_empty())),
            Some("iterator") => Ok(Value::iterator(items.borrow().clone())),
            _ => ObjectAccessor.get_property(ctx, target, key),
        }
    }

    fn set_property(
        &self,
        ctx: &Context,
        target: &Value,
        key: PropertyKey<'_>,
        value: Value,
    ) -> Result<(), EvalError> {
        ObjectAccessor.set_property(ctx, target, key, value)
    }
}

/// `next` and `hasNext` on iterators.
#[derive(Debug, Default, Clone, Copy)]
pub struct IteratorAccessor;

impl PropertyAccessor for IteratorAccessor {
    fn get_property(&self, ctx: &Context, target: &Value, key: PropertyKey<'_>) -> Result<Value, EvalError> {
        let Value::Iterator(state) = target else {
            return ObjectAccessor.get_property(ctx, target, key);
        };
        match key.as_name() {
            Some("next") => Ok(state.borrow_mut().next_item().unwrap_or(Value::Null)),
            Some("hasNext") => Ok(Value::Boolean(state.borrow().has_next())),
            _ => ObjectAccessor.get_property(ctx, target, key),
        }
    }

    fn set_property(
        &self,
        ctx: &Context,
        target: &Value,
        key: PropertyKey<'_>,
        value: Value,
    ) -> Result<(), EvalError> {
        ObjectAccessor.set_property(ctx, target, key, value)
    }
}

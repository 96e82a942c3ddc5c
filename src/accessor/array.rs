use super::{ObjectAccessor, PropertyAccessor, PropertyKey, Slot, no_such_property, slot};
use crate::{
    context::Context,
    evaluator::EvalError,
    types::TypeRef,
    value::Value,
};

/// Positional access on arrays plus `length`. Stored values are converted to
/// the component type.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArrayAccessor;

pub(crate) fn to_component(ctx: &Context, value: Value, component: &TypeRef) -> Result<Value, EvalError> {
    if value.is_null() && !component.is_primitive() {
        return Ok(value);
    }
    if value.type_ref() == *component || component.is_object() {
        return Ok(value);
    }
    ctx.converter()
        .convert(ctx, &value, component)
        .map_err(|e| EvalError::TypeConversionFailed {
            value: e.value,
            target: e.target.to_string(),
        })
}

impl PropertyAccessor for ArrayAccessor {
    fn get_property(&self, ctx: &Context, target: &Value, key: PropertyKey<'_>) -> Result<Value, EvalError> {
        let Value::Array(array) = target else {
            return ObjectAccessor.get_property(ctx, target, key);
        };
        if let PropertyKey::Index(index) = key {
            let array = array.borrow();
            match slot(index, array.items.len())? {
                Some(Slot::At(i)) => return Ok(array.items[i].clone()),
                Some(Slot::Empty) => return Ok(Value::Null),
                Some(Slot::All) => {
                    return Ok(Value::array(array.component.clone(), array.items.clone()));
                }
                None => {}
            }
        }
        match key.as_name() {
            Some("length") => Ok(Value::Int(array.borrow().items.len() as i32)),
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
        let Value::Array(array) = target else {
            return ObjectAccessor.set_property(ctx, target, key, value);
        };
        let PropertyKey::Index(index) = key else {
            return ObjectAccessor.set_property(ctx, target, key, value);
        };
        let (len, component) = {
            let array = array.borrow();
            (array.items.len(), array.component.clone())
        };
        match slot(index, len)? {
            Some(Slot::At(i)) => {
                let value = to_component(ctx, value, &component)?;
                array.borrow_mut().items[i] = value;
                Ok(())
            }
            Some(Slot::Empty) => Ok(()),
            Some(Slot::All) => {
                let elements = value.elements().ok_or_else(|| EvalError::TypeConversionFailed {
                    value: value.to_string(),
                    target: TypeRef::array_of(component.clone()).to_string(),
                })?;
                let converted = elements
                    .into_iter()
                    .map(|item| to_component(ctx, item, &component))
                    .collect::<Result<Vec<_>, _>>()?;
                array.borrow_mut().items = converted;
                Ok(())
            }
            None => match key.as_name() {
                Some(_) => ObjectAccessor.set_property(ctx, target, key, value),
                None => Err(no_such_property(target, key)),
            },
        }
    }
}

use std::sync::Arc;

use super::{PropertyAccessor, PropertyKey, no_such_property};
use crate::{
    context::Context,
    convert::coerce_to_param,
    evaluator::EvalError,
    types::ClassName,
    value::Value,
};

/// Getter/setter conventions over registered class members.
///
/// Reads try `getX`, `isX`, `hasX` and then a field named `x`. Writes pick the
/// `setX` overload whose parameter accepts the value most cheaply, converting
/// the value if none accepts it as-is, and then a writable field.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectAccessor;

impl ObjectAccessor {
    pub fn read(&self, ctx: &Context, target: &Value, name: &str) -> Result<Value, EvalError> {
        let runtime = ctx.runtime();
        let class: ClassName = Arc::from(target.class_name());
        let Some(getter) = runtime.introspector().getter(&class, name) else {
            return Err(no_such_property(target, PropertyKey::Name(name)));
        };
        runtime.check_access(&class, getter.member_name())?;
        getter
            .read(target)
            .map_err(|source| EvalError::MethodInvocationFailed {
                method: format!("{}.{}", class, getter.member_name()),
                source,
            })
    }

    pub fn write(&self, ctx: &Context, target: &Value, name: &str, value: Value) -> Result<(), EvalError> {
        let runtime = ctx.runtime();
        let introspector = runtime.introspector();
        let class: ClassName = Arc::from(target.class_name());
        let setters = introspector.setters(&class, name);
        if setters.is_empty() {
            return Err(no_such_property(target, PropertyKey::Name(name)));
        }

        let (setter, value) = match introspector.choose_setter(&setters, &value) {
            Some(setter) => {
                let value = coerce_to_param(ctx, value, setter.param_type());
                (setter, value)
            }
            None => setters
                .iter()
                .find_map(|setter| {
                    ctx.converter()
                        .convert(ctx, &value, setter.param_type())
                        .ok()
                        .map(|converted| (setter, converted))
                })
                .ok_or_else(|| EvalError::TypeConversionFailed {
                    value: value.to_string(),
                    target: setters[0].param_type().to_string(),
                })?,
        };

        runtime.check_access(&class, setter.member_name())?;
        setter
            .write(target, value)
            .map_err(|source| EvalError::MethodInvocationFailed {
                method: format!("{}.{}", class, setter.member_name()),
                source,
            })
    }
}

impl PropertyAccessor for ObjectAccessor {
    fn get_property(&self, ctx: &Context, target: &Value, key: PropertyKey<'_>) -> Result<Value, EvalError> {
        match key.as_name() {
            Some(name) => self.read(ctx, target, name),
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
        match key.as_name() {
            Some(name) => self.write(ctx, target, name, value),
            None => Err(no_such_property(target, key)),
        }
    }
}

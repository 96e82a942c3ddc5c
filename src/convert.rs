//! Value conversion to a target type.

use crate::{
    context::Context,
    numeric,
    types::{Primitive, TypeRef},
    value::Value,
};

/// No conversion from a value to a target type exists.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot convert {value} to {target}")]
pub struct NoConversion {
    pub value: String,
    pub target: TypeRef,
}

impl NoConversion {
    pub fn new(value: &Value, target: &TypeRef) -> Self {
        NoConversion {
            value: format!("{} ({})", value, value.class_name()),
            target: target.clone(),
        }
    }
}

/// Converts values when an argument, setter parameter or array component
/// does not already accept them.
pub trait TypeConverter: Send + Sync {
    fn convert(&self, ctx: &Context, value: &Value, target: &TypeRef) -> Result<Value, NoConversion>;
}

/// Brings an accepted argument to the exact primitive its parameter declares,
/// so `setRatio(double)` receives a `Double` when called with `3`.
pub(crate) fn coerce_to_param(ctx: &Context, value: Value, param: &TypeRef) -> Value {
    let Some(primitive) = param.as_primitive() else {
        return value;
    };
    if value.is_null() || value.type_ref() == TypeRef::Primitive(primitive) {
        return value;
    }
    match ctx.converter().convert(ctx, &value, param) {
        Ok(converted) => converted,
        Err(_) => value,
    }
}

/// Numeric casts, string parsing and formatting, and reshaping between arrays
/// and collections.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTypeConverter;

impl DefaultTypeConverter {
    fn convert_primitive(&self, value: &Value, target: Primitive, boxed: bool) -> Option<Value> {
        if value.is_null() {
            // null unboxes to nothing but stays null for a boxed target
            return boxed.then_some(Value::Null);
        }
        numeric::cast(value, target)
    }

    fn convert_class(&self, ctx: &Context, value: &Value, class: &str) -> Option<Value> {
        if value.is_null() {
            return Some(Value::Null);
        }
        match class {
            "String" | "CharSequence" => Some(Value::String(value.to_string())),
            "BigInteger" => numeric::numeric(value)
                .and_then(|n| numeric::to_i128(&n))
                .map(Value::BigInteger),
            "BigDecimal" => numeric::numeric(value)
                .and_then(|n| numeric::to_decimal(&n))
                .map(Value::BigDecimal),
            "Number" => numeric::numeric(value),
            "List" | "ArrayList" | "Collection" | "Iterable" => match value {
                Value::List(_) => Some(value.clone()),
                other => other.elements().map(Value::list),
            },
            "Set" | "HashSet" => match value {
                Value::Set(_) => Some(value.clone()),
                other => other.elements().map(Value::set),
            },
            _ => {
                let introspector = ctx.runtime().introspector();
                introspector
                    .is_assignable(value.class_name(), class)
                    .then(|| value.clone())
            }
        }
    }

    fn convert_array(&self, ctx: &Context, value: &Value, component: &TypeRef) -> Option<Value> {
        let items = match value {
            Value::Null => return Some(Value::Null),
            Value::String(s) if *component == TypeRef::Primitive(Primitive::Char) => {
                s.chars().map(Value::Char).collect()
            }
            other => other.elements().unwrap_or_else(|| vec![other.clone()]),
        };
        let converted = items
            .iter()
            .map(|item| self.convert(ctx, item, component).ok())
            .collect::<Option<Vec<Value>>>()?;
        Some(Value::array(component.clone(), converted))
    }
}

impl TypeConverter for DefaultTypeConverter {
    fn convert(&self, ctx: &Context, value: &Value, target: &TypeRef) -> Result<Value, NoConversion> {
        if target.is_object() {
            return Ok(value.clone());
        }
        let converted = match target {
            TypeRef::Primitive(p) => self.convert_primitive(value, *p, false),
            TypeRef::Class(name) => match Primitive::from_boxed_class(name) {
                Some(p) => self.convert_primitive(value, p, true),
                None => self.convert_class(ctx, value, name),
            },
            TypeRef::Array(component) => {
                if matches!(value, Value::Array(array) if array.borrow().component == **component) {
                    Some(value.clone())
                } else {
                    self.convert_array(ctx, value, component)
                }
            }
        };
        converted.ok_or_else(|| NoConversion::new(value, target))
    }
}

//! Property steps and navigation chains.

use std::sync::Arc;

use super::{EvalError, type_of};
use crate::{
    accessor::PropertyKey,
    ast::{Node, NodeKind},
    context::Context,
    convert::coerce_to_param,
    resolver::IndexedKind,
    types::ClassName,
    value::Value,
};

/// `.name` or `[key]` read from `source`. The key is evaluated against the root.
pub(super) fn get_property(
    ctx: &mut Context,
    node: &Node,
    source: &Value,
    key: &Node,
    indexed: bool,
) -> Result<Value, EvalError> {
    if source.is_null() {
        return Err(EvalError::NullSource(node.to_string()));
    }
    let key = eval_key(ctx, key)?;
    read(ctx, source, &key, indexed)
}

pub(super) fn set_property(
    ctx: &mut Context,
    node: &Node,
    target: &Value,
    key: &Node,
    indexed: bool,
    value: Value,
) -> Result<(), EvalError> {
    if target.is_null() {
        return Err(EvalError::NullSource(node.to_string()));
    }
    let key = eval_key(ctx, key)?;
    write(ctx, target, &key, indexed, value)
}

fn eval_key(ctx: &mut Context, key: &Node) -> Result<Value, EvalError> {
    if let NodeKind::Constant(literal) = key.kind() {
        return Ok(literal.to_value());
    }
    let root = ctx.root().clone();
    key.get_value(ctx, &root)
}

fn property_key(key: &Value, indexed: bool) -> PropertyKey<'_> {
    match (indexed, key) {
        (false, Value::String(name)) => PropertyKey::Name(name),
        _ => PropertyKey::Index(key),
    }
}

/// Reads through the accessor registered for the target's class, consulting
/// the null handler for a null named property.
fn read(ctx: &mut Context, target: &Value, key: &Value, indexed: bool) -> Result<Value, EvalError> {
    let runtime = ctx.runtime().clone();
    let accessor = runtime.accessor(target.class_name());
    let key = property_key(key, indexed);
    let mut value = accessor.get_property(ctx, target, key)?;
    if value.is_null()
        && let PropertyKey::Name(name) = key
        && let Some(handler) = runtime.null_handler(target.class_name())
        && let Some(replacement) = handler.null_property_value(ctx, target, name)
    {
        value = replacement;
    }
    ctx.set_current_type(type_of(&value));
    Ok(value)
}

fn write(ctx: &mut Context, target: &Value, key: &Value, indexed: bool, value: Value) -> Result<(), EvalError> {
    let accessor = ctx.runtime().accessor(target.class_name());
    accessor.set_property(ctx, target, property_key(key, indexed), value)
}

/// `name` followed by `[index]`: a candidate for an indexed property.
fn pair_shape<'a>(first: &'a Node, second: &'a Node) -> Option<(&'a str, &'a Node)> {
    let name = first.property_name()?;
    match second.kind() {
        NodeKind::Property { key, indexed: true } => Some((name, key)),
        _ => None,
    }
}

fn accepts_index(kind: IndexedKind, index: &Value) -> bool {
    match kind {
        IndexedKind::None => false,
        _ if matches!(index, Value::Subscript(_)) => false,
        IndexedKind::Int => index.as_index().is_some(),
        IndexedKind::Object => true,
    }
}

/// Threads `source` through `steps`, each step reading from the previous result.
pub(super) fn get_chain(ctx: &mut Context, steps: &[Node], source: &Value) -> Result<Value, EvalError> {
    let mut current = source.clone();
    let mut i = 0;
    while i < steps.len() {
        if let Some(next) = steps.get(i + 1)
            && let Some((name, index)) = pair_shape(&steps[i], next)
            && let Some(value) = read_indexed(ctx, &current, &steps[i], name, index)?
        {
            current = value;
            i += 2;
            continue;
        }
        current = steps[i].get_value(ctx, &current)?;
        i += 1;
    }
    Ok(current)
}

/// Reads `target.name[index]` through an indexed getter when the class has
/// one. `None` when `name` is not an indexed property of the target's class.
fn read_indexed(
    ctx: &mut Context,
    target: &Value,
    first: &Node,
    name: &str,
    index: &Node,
) -> Result<Option<Value>, EvalError> {
    if target.is_null() {
        return Ok(None);
    }
    let class: ClassName = Arc::from(target.class_name());
    let property = ctx.introspector().indexed(&class, name);
    let Some(getter) = property.getter.as_ref() else {
        return Ok(None);
    };
    let key = eval_key(ctx, index)?;
    if !accepts_index(property.kind, &key) {
        let collection = first.get_value(ctx, target)?;
        return read(ctx, &collection, &key, true).map(Some);
    }

    ctx.runtime().check_access(&class, &getter.name)?;
    let key = match getter.params.first() {
        Some(param) => coerce_to_param(ctx, key, param),
        None => key,
    };
    let value = getter
        .invoke(target, &[key])
        .map_err(|source| EvalError::MethodInvocationFailed {
            method: format!("{}.{}", class, getter.name),
            source,
        })?;
    ctx.set_current_type(type_of(&value));
    Ok(Some(value))
}

/// Writes through the last step of a chain after reading the steps before it.
pub(super) fn set_chain(
    ctx: &mut Context,
    node: &Node,
    steps: &[Node],
    target: &Value,
    value: Value,
) -> Result<(), EvalError> {
    if let [walk @ .., first, second] = steps
        && let Some((name, index)) = pair_shape(first, second)
    {
        let owner = get_chain(ctx, walk, target)?;
        return write_indexed(ctx, &owner, first, second, name, index, value);
    }
    match steps.split_last() {
        Some((last, walk)) => {
            let owner = get_chain(ctx, walk, target)?;
            last.set_value(ctx, &owner, value)
        }
        None => Err(EvalError::InvalidAssignmentTarget(node.to_string())),
    }
}

fn write_indexed(
    ctx: &mut Context,
    owner: &Value,
    first: &Node,
    second: &Node,
    name: &str,
    index: &Node,
    value: Value,
) -> Result<(), EvalError> {
    if !owner.is_null() {
        let class: ClassName = Arc::from(owner.class_name());
        let property = ctx.introspector().indexed(&class, name);
        if property.kind != IndexedKind::None {
            let key = eval_key(ctx, index)?;
            if accepts_index(property.kind, &key)
                && let Some(setter) = property.setter.as_ref()
            {
                ctx.runtime().check_access(&class, &setter.name)?;
                let (key, value) = match setter.params.as_slice() {
                    [key_param, value_param] => (
                        coerce_to_param(ctx, key, key_param),
                        coerce_to_param(ctx, value, value_param),
                    ),
                    _ => (key, value),
                };
                return setter
                    .invoke(owner, &[key, value])
                    .map(|_| ())
                    .map_err(|source| EvalError::MethodInvocationFailed {
                        method: format!("{}.{}", class, setter.name),
                        source,
                    });
            }
            let collection = first.get_value(ctx, owner)?;
            if collection.is_null() {
                return Err(EvalError::NullSource(second.to_string()));
            }
            return write(ctx, &collection, &key, true, value);
        }
    }
    let collection = first.get_value(ctx, owner)?;
    second.set_value(ctx, &collection, value)
}

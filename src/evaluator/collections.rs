//! Collection literals, projection and selection.

use std::collections::HashMap;

use super::EvalError;
use crate::{
    ast::{Node, SelectKind},
    context::Context,
    value::Value,
};

pub(super) fn list(ctx: &mut Context, items: &[Node], source: &Value) -> Result<Value, EvalError> {
    let values = items
        .iter()
        .map(|item| item.get_value(ctx, source))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::list(values))
}

pub(super) fn map(ctx: &mut Context, entries: &[(Node, Node)], source: &Value) -> Result<Value, EvalError> {
    let mut map = HashMap::with_capacity(entries.len());
    for (key, value) in entries {
        let key = key.get_value(ctx, source)?.map_key();
        let value = value.get_value(ctx, source)?;
        map.insert(key, value);
    }
    Ok(Value::map(map))
}

/// The elements projection and selection iterate over.
///
/// Maps yield one `{key, value}` entry per pair in key order, iterators their
/// remaining items, null nothing and any other value itself.
pub(crate) fn elements_of(value: &Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Map(map) => {
            let map = map.borrow();
            let mut pairs: Vec<(&String, &Value)> = map.iter().collect();
            pairs.sort_by(|a, b| a.0.cmp(b.0));
            pairs
                .into_iter()
                .map(|(key, value)| {
                    let mut entry = HashMap::with_capacity(2);
                    entry.insert("key".to_string(), Value::String(key.clone()));
                    entry.insert("value".to_string(), value.clone());
                    Value::map(entry)
                })
                .collect()
        }
        Value::Iterator(state) => {
            let state = state.borrow();
            state.items[state.position.min(state.items.len())..].to_vec()
        }
        other => other.elements().unwrap_or_else(|| vec![other.clone()]),
    }
}

/// `.{ expr }`: `expr` evaluated with each element as its source.
pub(super) fn project(ctx: &mut Context, expr: &Node, source: &Value) -> Result<Value, EvalError> {
    let projected = elements_of(source)
        .iter()
        .map(|element| expr.get_value(ctx, element))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::list(projected))
}

/// `.{? cond }` keeps every element the condition holds for; `^` and `$` keep
/// only the first or last such element, still as a list.
pub(super) fn select(
    ctx: &mut Context,
    kind: SelectKind,
    condition: &Node,
    source: &Value,
) -> Result<Value, EvalError> {
    let elements = elements_of(source);
    let mut selected = Vec::new();
    match kind {
        SelectKind::All => {
            for element in elements {
                if condition.get_value(ctx, &element)?.as_bool() {
                    selected.push(element);
                }
            }
        }
        SelectKind::First => {
            for element in elements {
                if condition.get_value(ctx, &element)?.as_bool() {
                    selected.push(element);
                    break;
                }
            }
        }
        SelectKind::Last => {
            let mut last = None;
            for element in elements {
                if condition.get_value(ctx, &element)?.as_bool() {
                    last = Some(element);
                }
            }
            selected.extend(last);
        }
    }
    Ok(Value::list(selected))
}

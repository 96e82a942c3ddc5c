//! Method, static member and constructor calls.

use std::sync::Arc;

use super::{EvalError, type_of};
use crate::{
    accessor::to_component,
    ast::{Node, NodeKind},
    context::Context,
    convert::coerce_to_param,
    resolver::{MethodDescriptor, overload},
    types::{ClassName, TypeRef},
    value::{self, Value},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Member {
    Instance,
    Static,
    Constructor,
}

/// Canonical name of a class as the resolver knows it; the text as written
/// when the resolver does not know it.
pub(super) fn class_named(ctx: &Context, name: &str) -> ClassName {
    ctx.introspector()
        .class(name)
        .map(|class| class.name.clone())
        .unwrap_or_else(|| Arc::from(name))
}

pub(super) fn type_named(ctx: &Context, name: &str) -> TypeRef {
    match TypeRef::parse(name) {
        TypeRef::Class(class) => TypeRef::Class(class_named(ctx, &class)),
        TypeRef::Array(component) => match *component {
            TypeRef::Class(class) => TypeRef::array_of(TypeRef::Class(class_named(ctx, &class))),
            other => TypeRef::array_of(other),
        },
        primitive => primitive,
    }
}

/// Evaluates call arguments against the root into a pooled buffer. Every
/// argument starts from the cursors the call saw, and they are left that way.
fn eval_args(ctx: &mut Context, nodes: &[Node]) -> Result<Vec<Value>, EvalError> {
    let saved = ctx.cursors();
    let root = ctx.root().clone();
    let mut args = ctx.pool().acquire(nodes.len());
    for node in nodes {
        ctx.restore(saved.clone());
        match node.get_value(ctx, &root) {
            Ok(value) => args.push(value),
            Err(e) => {
                ctx.pool().release(args);
                ctx.restore(saved);
                return Err(e);
            }
        }
    }
    ctx.restore(saved);
    Ok(args)
}

/// Brings an argument to the shape its parameter declares: numeric casts for
/// primitives, reshaping between collections and arrays.
fn coerce_arg(ctx: &Context, value: Value, param: &TypeRef) -> Value {
    let reshape = match (&value, param) {
        (Value::Null | Value::Array(_), TypeRef::Array(_)) => false,
        (_, TypeRef::Array(_)) => true,
        (Value::Array(_), TypeRef::Class(_)) => !param.is_object(),
        _ => false,
    };
    if !reshape {
        return coerce_to_param(ctx, value, param);
    }
    match ctx.converter().convert(ctx, &value, param) {
        Ok(converted) => converted,
        Err(_) => value,
    }
}

/// Rewrites `args` in place into what `method` receives; trailing variadic
/// arguments are packed into one array.
fn prepare_args(ctx: &Context, method: &MethodDescriptor, args: &mut Vec<Value>) {
    let fixed = if method.variadic {
        method.params.len().saturating_sub(1)
    } else {
        method.params.len()
    };
    for (arg, param) in args.iter_mut().zip(&method.params[..fixed]) {
        let value = std::mem::replace(arg, Value::Null);
        *arg = coerce_arg(ctx, value, param);
    }
    if !method.variadic {
        return;
    }
    let Some(tail) = method.params.last() else {
        return;
    };
    if args.len() == method.params.len()
        && let Some(last) = args.last()
    {
        let distance = |a: &str, b: &str| ctx.introspector().distance(a, b);
        if overload::score(&type_of(last), tail, &distance).is_some() {
            return;
        }
    }
    let component = match tail {
        TypeRef::Array(component) => (**component).clone(),
        other => other.clone(),
    };
    let packed: Vec<Value> = args
        .drain(fixed.min(args.len())..)
        .map(|arg| coerce_arg(ctx, arg, &component))
        .collect();
    args.push(Value::array(component, packed));
}

/// Last resort when no overload accepts the arguments as they are: the first
/// candidate of matching arity whose parameters every argument converts to.
fn convert_call(
    ctx: &Context,
    candidates: &[Arc<MethodDescriptor>],
    args: &[Value],
) -> Option<(Arc<MethodDescriptor>, Vec<Value>)> {
    candidates
        .iter()
        .filter(|method| !method.variadic && method.arity() == args.len())
        .find_map(|method| {
            let converted = args
                .iter()
                .zip(&method.params)
                .map(|(arg, param)| ctx.converter().convert(ctx, arg, param).ok())
                .collect::<Option<Vec<Value>>>()?;
            Some((method.clone(), converted))
        })
}

fn call(
    ctx: &Context,
    member: Member,
    class: &ClassName,
    name: &str,
    receiver: &Value,
    args: &mut Vec<Value>,
) -> Result<Value, EvalError> {
    let introspector = ctx.introspector();
    let selected = match member {
        Member::Instance => introspector.select_method(class, name, args)?,
        Member::Static => introspector.select_static(class, name, args)?,
        Member::Constructor => introspector.select_constructor(class, args)?,
    };
    let method = match selected {
        Some(method) => {
            prepare_args(ctx, &method, args);
            method
        }
        None => {
            let candidates = match member {
                Member::Instance => introspector.methods(class, name),
                Member::Static => introspector.static_methods(class, name),
                Member::Constructor => introspector.constructors(class),
            };
            let Some((method, converted)) = convert_call(ctx, &candidates, args) else {
                return Err(EvalError::NoSuchMethod {
                    class: class.to_string(),
                    method: name.to_string(),
                    args: overload::arg_signature(&overload::arg_types(args)),
                });
            };
            args.clear();
            args.extend(converted);
            method
        }
    };

    ctx.runtime().check_access(class, &method.name)?;
    let value = method
        .invoke(receiver, args)
        .map_err(|source| EvalError::MethodInvocationFailed {
            method: format!("{}.{}", class, method.name),
            source,
        })?;
    if value.is_null()
        && member == Member::Instance
        && let Some(handler) = ctx.runtime().null_handler(class)
        && let Some(replacement) = handler.null_method_result(ctx, receiver, name, args)
    {
        return Ok(replacement);
    }
    Ok(value)
}

fn dispatch(
    ctx: &mut Context,
    member: Member,
    class: &ClassName,
    name: &str,
    receiver: &Value,
    mut args: Vec<Value>,
) -> Result<Value, EvalError> {
    let result = call(ctx, member, class, name, receiver, &mut args);
    ctx.pool().release(args);
    let value = result?;
    ctx.set_current_type(type_of(&value));
    Ok(value)
}

/// `name(args)` on `source`.
pub(super) fn call_method(
    ctx: &mut Context,
    source: &Value,
    name: &str,
    arg_nodes: &[Node],
) -> Result<Value, EvalError> {
    if source.is_null() {
        return Err(EvalError::NullSource(format!("{}()", name)));
    }
    let args = eval_args(ctx, arg_nodes)?;
    let class: ClassName = Arc::from(source.class_name());
    dispatch(ctx, Member::Instance, &class, name, source, args)
}

/// `@Class@name(args)`
pub(super) fn call_static(
    ctx: &mut Context,
    class: &str,
    name: &str,
    arg_nodes: &[Node],
) -> Result<Value, EvalError> {
    let class = class_named(ctx, class);
    let args = eval_args(ctx, arg_nodes)?;
    dispatch(ctx, Member::Static, &class, name, &Value::Null, args)
}

/// `@Class@name`
pub(super) fn static_field(ctx: &mut Context, class: &str, name: &str) -> Result<Value, EvalError> {
    let class = class_named(ctx, class);
    let Some(field) = ctx.introspector().static_field(&class, name) else {
        return Err(EvalError::NoSuchProperty {
            class: class.to_string(),
            property: name.to_string(),
        });
    };
    ctx.runtime().check_access(&class, name)?;
    let value = field
        .get(&Value::Null)
        .map_err(|source| EvalError::MethodInvocationFailed {
            method: format!("{}.{}", class, name),
            source,
        })?;
    ctx.set_current_type(type_of(&value));
    Ok(value)
}

/// `new Class(args)`
pub(super) fn construct(ctx: &mut Context, class: &str, arg_nodes: &[Node]) -> Result<Value, EvalError> {
    let class = class_named(ctx, class);
    let args = eval_args(ctx, arg_nodes)?;
    dispatch(ctx, Member::Constructor, &class, "<init>", &Value::Null, args)
}

/// `new T[size]` or `new T[] {items}`; initializer items are converted to `T`.
pub(super) fn construct_array(
    ctx: &mut Context,
    class: &str,
    arg_nodes: &[Node],
) -> Result<Value, EvalError> {
    let component = type_named(ctx, class);
    let Some(init) = arg_nodes.first() else {
        return Err(EvalError::InvalidOperand {
            operator: "new".to_string(),
            operand: format!("{}[] without size or initializer", class),
        });
    };
    let saved = ctx.cursors();
    let root = ctx.root().clone();
    let shape = init.get_value(ctx, &root);
    ctx.restore(saved);
    let shape = shape?;

    let items = if matches!(init.kind(), NodeKind::List(_)) || shape.is_collection() {
        shape
            .elements()
            .unwrap_or_default()
            .into_iter()
            .map(|item| to_component(ctx, item, &component))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        let Some(size) = shape.as_index() else {
            return Err(EvalError::TypeConversionFailed {
                value: shape.to_string(),
                target: "int".to_string(),
            });
        };
        value::filled(size, Value::default_for(&component))
            .map_err(|e| EvalError::Arithmetic(format!("array size: {}", e)))?
    };

    ctx.set_current_type(Some(TypeRef::array_of(component.clone())));
    Ok(Value::array(component, items))
}

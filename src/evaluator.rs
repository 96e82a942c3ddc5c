//! Tree-walking evaluation.
//!
//! Every [`Node`] can be read with [`Node::get_value`]; assignable nodes can be
//! written with [`Node::set_value`]. Both take the value the node navigates
//! from (its *source*) explicitly, so a chain simply threads each step's
//! result into the next step.
//!
//! ## Cursors
//!
//! Each node sets the context's current object to its source for the duration
//! of its own evaluation and restores the previous one before returning.
//! Navigation steps leave the current type set to the type of what they
//! produced. Calls save both cursors before evaluating their arguments and
//! restore them afterwards, so sibling arguments observe the same state.

mod calls;
mod chain;
mod collections;
mod ops;

pub use ops::apply_binary;

use tracing::trace;

use crate::{
    ast::{Node, NodeKind},
    context::Context,
    resolver::HostError,
    types::TypeRef,
    value::Value,
};

/// Errors that can occur while evaluating or assigning.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("No such property: {class}.{property}")]
    NoSuchProperty { class: String, property: String },

    #[error("No such method: {class}.{method}({args})")]
    NoSuchMethod {
        class: String,
        method: String,
        /// Argument types of the failed call, e.g. `int,String`.
        args: String,
    },

    #[error("Ambiguous call to {method}: {candidates}")]
    AmbiguousMethod { method: String, candidates: String },

    /// The expression cannot be written to
    #[error("Invalid assignment target: {0}")]
    InvalidAssignmentTarget(String),

    /// Integer division by zero, big-number overflow
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    /// A host member returned an error
    #[error("{method} failed: {source}")]
    MethodInvocationFailed {
        method: String,
        #[source]
        source: HostError,
    },

    #[error("Cannot convert {value} to {target}")]
    TypeConversionFailed { value: String, target: String },

    #[error("Access denied: {class}.{member}")]
    AccessDenied { class: String, member: String },

    /// Navigation from a null value
    #[error("Source is null for {0}")]
    NullSource(String),

    /// A plain integer index outside a collection
    #[error("Index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    /// Operand types the operator does not accept
    #[error("Invalid operand for '{operator}': {operand}")]
    InvalidOperand { operator: String, operand: String },
}

/// Reads `node` with `root` as the expression root.
///
/// A compiled accessor registered for the node is used in place of the walk.
///
/// ```
/// use graphnav_lang::{Context, Value, evaluate, parse};
///
/// let node = parse("1 + 2 * 3").unwrap();
/// let mut ctx = Context::new(Value::Null);
/// assert_eq!(evaluate(&node, &mut ctx, &Value::Null).unwrap(), Value::Int(7));
/// ```
pub fn evaluate(node: &Node, ctx: &mut Context, root: &Value) -> Result<Value, EvalError> {
    ctx.set_root(root.clone());
    if let Some(compiled) = ctx.runtime().compiled(node.id()) {
        return compiled.get(ctx, node, root);
    }
    node.get_value(ctx, root)
}

/// Writes `value` through `node` with `root` as the expression root.
pub fn assign(node: &Node, ctx: &mut Context, root: &Value, value: Value) -> Result<(), EvalError> {
    ctx.set_root(root.clone());
    if let Some(compiled) = ctx.runtime().compiled(node.id()) {
        return compiled.set(ctx, node, root, value);
    }
    node.set_value(ctx, root, value)
}

/// Static type recorded for a produced value; `None` for null.
pub(crate) fn type_of(value: &Value) -> Option<TypeRef> {
    (!value.is_null()).then(|| value.type_ref())
}

impl Node {
    /// Evaluates the node against `source`.
    pub fn get_value(&self, ctx: &mut Context, source: &Value) -> Result<Value, EvalError> {
        let saved = ctx.current_object().cloned();
        ctx.set_current_object(Some(source.clone()));
        let tracing = ctx.is_tracing();
        if tracing && let Some(recorder) = ctx.trace_mut() {
            recorder.begin(self.to_string(), source, false);
        }
        trace!(node = %self, "get");

        let result = self.evaluate_get(ctx, source);

        if tracing && let Some(recorder) = ctx.trace_mut() {
            match &result {
                Ok(value) => recorder.finish(Some(value), None),
                Err(e) => recorder.finish(None, Some(e.to_string())),
            }
        }
        if let Ok(value) = &result
            && let Some(ty) = type_of(value)
        {
            self.record_getter_type(&ty);
        }
        ctx.set_current_object(saved);
        result
    }

    /// Assigns `value` through the node, navigating from `target`.
    pub fn set_value(&self, ctx: &mut Context, target: &Value, value: Value) -> Result<(), EvalError> {
        let saved = ctx.current_object().cloned();
        ctx.set_current_object(Some(target.clone()));
        let tracing = ctx.is_tracing();
        if tracing && let Some(recorder) = ctx.trace_mut() {
            recorder.begin(self.to_string(), target, true);
        }
        trace!(node = %self, "set");

        if let Some(ty) = type_of(&value) {
            self.record_setter_type(&ty);
        }
        let written = tracing.then(|| value.clone());
        let result = self.evaluate_set(ctx, target, value);

        if tracing && let Some(recorder) = ctx.trace_mut() {
            match &result {
                Ok(()) => recorder.finish(written.as_ref(), None),
                Err(e) => recorder.finish(None, Some(e.to_string())),
            }
        }
        ctx.set_current_object(saved);
        result
    }

    fn evaluate_get(&self, ctx: &mut Context, source: &Value) -> Result<Value, EvalError> {
        match self.kind() {
            NodeKind::Constant(literal) => Ok(literal.to_value()),
            NodeKind::Variable(name) => Ok(ctx.get(name).cloned().unwrap_or(Value::Null)),
            NodeKind::This => Ok(source.clone()),
            NodeKind::Root => Ok(ctx.root().clone()),
            NodeKind::Property { key, indexed } => chain::get_property(ctx, self, source, key, *indexed),
            NodeKind::Chain(steps) => chain::get_chain(ctx, steps, source),
            NodeKind::Method { name, args } => calls::call_method(ctx, source, name, args),
            NodeKind::StaticMethod { class, name, args } => calls::call_static(ctx, class, name, args),
            NodeKind::StaticField { class, name } => calls::static_field(ctx, class, name),
            NodeKind::Constructor { class, args, array } => {
                if *array {
                    calls::construct_array(ctx, class, args)
                } else {
                    calls::construct(ctx, class, args)
                }
            }
            NodeKind::List(items) => collections::list(ctx, items, source),
            NodeKind::Map(entries) => collections::map(ctx, entries, source),
            NodeKind::Binary { op, left, right } => ops::binary(ctx, *op, left, right, source),
            NodeKind::Unary { op, operand } => {
                let value = operand.get_value(ctx, source)?;
                ops::unary(*op, &value)
            }
            NodeKind::Ternary {
                condition,
                then,
                otherwise,
            } => {
                if condition.get_value(ctx, source)?.as_bool() {
                    then.get_value(ctx, source)
                } else {
                    otherwise.get_value(ctx, source)
                }
            }
            NodeKind::Assign { target, value } => {
                let value = value.get_value(ctx, source)?;
                target.set_value(ctx, source, value.clone())?;
                Ok(value)
            }
            NodeKind::Sequence(items) => {
                let mut last = Value::Null;
                for item in items {
                    last = item.get_value(ctx, source)?;
                }
                Ok(last)
            }
            NodeKind::Projection(expr) => collections::project(ctx, expr, source),
            NodeKind::Selection { kind, condition } => collections::select(ctx, *kind, condition, source),
            NodeKind::InstanceOf { operand, class } => {
                let value = operand.get_value(ctx, source)?;
                let ty = calls::type_named(ctx, class);
                Ok(Value::Boolean(ctx.introspector().is_instance(&value, &ty)))
            }
        }
    }

    fn evaluate_set(&self, ctx: &mut Context, target: &Value, value: Value) -> Result<(), EvalError> {
        match self.kind() {
            NodeKind::Variable(name) => {
                ctx.put(name.clone(), value);
                Ok(())
            }
            NodeKind::Root => {
                ctx.set_root(value);
                Ok(())
            }
            NodeKind::Property { key, indexed } => chain::set_property(ctx, self, target, key, *indexed, value),
            NodeKind::Chain(steps) => chain::set_chain(ctx, self, steps, target, value),
            NodeKind::Sequence(items) => match items.split_last() {
                Some((last, rest)) => {
                    for item in rest {
                        item.get_value(ctx, target)?;
                    }
                    last.set_value(ctx, target, value)
                }
                None => Err(EvalError::InvalidAssignmentTarget(self.to_string())),
            },
            _ => Err(EvalError::InvalidAssignmentTarget(self.to_string())),
        }
    }
}

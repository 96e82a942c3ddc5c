//! Extension points the evaluator calls out through.

use crate::{ast::Node, context::Context, evaluator::EvalError, value::Value};

/// Substitutes a value when a method or property yields null.
///
/// Handlers are registered per class on the [`Runtime`](crate::Runtime) and
/// found through the class lineage like accessors.
pub trait NullHandler: Send + Sync {
    /// Replacement for a null result of `target.method(args)`.
    fn null_method_result(
        &self,
        _ctx: &Context,
        _target: &Value,
        _method: &str,
        _args: &[Value],
    ) -> Option<Value> {
        None
    }

    /// Replacement for a null read of `target.property`.
    fn null_property_value(&self, _ctx: &Context, _target: &Value, _property: &str) -> Option<Value> {
        None
    }
}

/// Access policy consulted before any member is read, written or invoked.
pub trait MemberAccess: Send + Sync {
    fn is_accessible(&self, class: &str, member: &str) -> bool;
}

/// Denies every member in a fixed list of `Class.member` names.
#[derive(Debug, Default, Clone)]
pub struct DenyList {
    denied: Vec<(String, String)>,
}

impl DenyList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deny(mut self, class: &str, member: &str) -> Self {
        self.denied.push((class.to_string(), member.to_string()));
        self
    }
}

impl MemberAccess for DenyList {
    fn is_accessible(&self, class: &str, member: &str) -> bool {
        !self
            .denied
            .iter()
            .any(|(c, m)| (c == class || c == "*") && (m == member || m == "*"))
    }
}

/// A pre-resolved accessor standing in for the tree walk of one AST node.
///
/// Registered against a node's [`NodeId`](crate::ast::NodeId); consulted first
/// by [`evaluate`](crate::evaluate) and [`assign`](crate::assign). It must
/// produce the same observable results as walking `node`.
pub trait CompiledAccessor: Send + Sync {
    fn get(&self, ctx: &mut Context, node: &Node, root: &Value) -> Result<Value, EvalError>;

    fn set(&self, ctx: &mut Context, node: &Node, root: &Value, value: Value) -> Result<(), EvalError>;
}

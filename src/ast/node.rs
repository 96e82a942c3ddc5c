use std::{
    fmt,
    sync::{
        OnceLock,
        atomic::{AtomicU64, Ordering},
    },
};

use rust_decimal::Decimal;

use super::operators::{BinaryOp, SelectKind, UnaryOp};
use crate::{
    types::TypeRef,
    value::{DynamicSubscript, Value},
};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a node, stable for the node's lifetime. Compiled accessors are
/// registered against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A constant embedded in the tree.
///
/// Kept separate from [`Value`] so parsed trees are `Send + Sync` and can be
/// shared between threads.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    BigInteger(i128),
    BigDecimal(Decimal),
    String(String),
    Subscript(DynamicSubscript),
}

impl Literal {
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Char(c) => Value::Char(*c),
            Literal::Int(n) => Value::Int(*n),
            Literal::Long(n) => Value::Long(*n),
            Literal::Float(n) => Value::Float(*n),
            Literal::Double(n) => Value::Double(*n),
            Literal::BigInteger(n) => Value::BigInteger(*n),
            Literal::BigDecimal(n) => Value::BigDecimal(*n),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Subscript(s) => Value::Subscript(*s),
        }
    }
}

/// Node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A literal
    Constant(Literal),
    /// `#name`
    Variable(String),
    /// `#this`: the source the node is evaluated against
    This,
    /// `#root`
    Root,
    /// `.name` (key is a string constant) or `[key]` (`indexed`)
    Property { key: Box<Node>, indexed: bool },
    /// Navigation steps applied left to right; never contains a `Chain`
    Chain(Vec<Node>),
    /// `name(args)` on the current source
    Method { name: String, args: Vec<Node> },
    /// `@Class@name(args)`
    StaticMethod {
        class: String,
        name: String,
        args: Vec<Node>,
    },
    /// `@Class@name`
    StaticField { class: String, name: String },
    /// `new Class(args)`, or with `array` set, `new T[size]` / `new T[] {..}`
    /// where `args` holds the single size or initializer node
    Constructor {
        class: String,
        args: Vec<Node>,
        array: bool,
    },
    /// `{a, b, c}`
    List(Vec<Node>),
    /// `#{k: v, ...}`
    Map(Vec<(Node, Node)>),
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Unary { op: UnaryOp, operand: Box<Node> },
    /// `c ? a : b`
    Ternary {
        condition: Box<Node>,
        then: Box<Node>,
        otherwise: Box<Node>,
    },
    /// `target = value`
    Assign { target: Box<Node>, value: Box<Node> },
    /// `a, b, c`; never contains a `Sequence`
    Sequence(Vec<Node>),
    /// `.{ expr }`
    Projection(Box<Node>),
    /// `.{? cond }`, `.{^ cond }`, `.{$ cond }`
    Selection { kind: SelectKind, condition: Box<Node> },
    /// `x instanceof Class`
    InstanceOf { operand: Box<Node>, class: String },
}

/// A node of the expression tree.
///
/// Equality compares structure only; identity and recorded types are ignored.
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    getter_type: OnceLock<TypeRef>,
    setter_type: OnceLock<TypeRef>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Node {
            id: NodeId::next(),
            kind,
            getter_type: OnceLock::new(),
            setter_type: OnceLock::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Type of the first value this node produced when read.
    pub fn getter_type(&self) -> Option<&TypeRef> {
        self.getter_type.get()
    }

    /// Type of the first value written through this node.
    pub fn setter_type(&self) -> Option<&TypeRef> {
        self.setter_type.get()
    }

    pub(crate) fn record_getter_type(&self, ty: &TypeRef) {
        if self.getter_type.get().is_none() {
            let _ = self.getter_type.set(ty.clone());
        }
    }

    pub(crate) fn record_setter_type(&self, ty: &TypeRef) {
        if self.setter_type.get().is_none() {
            let _ = self.setter_type.set(ty.clone());
        }
    }

    pub fn constant(literal: Literal) -> Self {
        Node::new(NodeKind::Constant(literal))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Node::constant(Literal::String(s.into()))
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Node::new(NodeKind::Variable(name.into()))
    }

    /// `.name`
    pub fn property(name: impl Into<String>) -> Self {
        Node::new(NodeKind::Property {
            key: Box::new(Node::string(name)),
            indexed: false,
        })
    }

    /// `[key]`
    pub fn index(key: Node) -> Self {
        Node::new(NodeKind::Property {
            key: Box::new(key),
            indexed: true,
        })
    }

    pub fn method(name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::new(NodeKind::Method {
            name: name.into(),
            args,
        })
    }

    pub fn binary(op: BinaryOp, left: Node, right: Node) -> Self {
        Node::new(NodeKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn unary(op: UnaryOp, operand: Node) -> Self {
        Node::new(NodeKind::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn assign(target: Node, value: Node) -> Self {
        Node::new(NodeKind::Assign {
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    /// Builds a chain, splicing in the children of any chain among `children`.
    /// A single resulting step is returned as-is.
    ///
    /// ```
    /// use graphnav_lang::ast::Node;
    ///
    /// let nested = Node::chain(vec![
    ///     Node::chain(vec![Node::property("a"), Node::property("b")]),
    ///     Node::property("c"),
    /// ]);
    /// let flat = Node::chain(vec![Node::property("a"), Node::property("b"), Node::property("c")]);
    /// assert_eq!(nested, flat);
    /// ```
    pub fn chain(children: Vec<Node>) -> Self {
        let mut steps = Vec::with_capacity(children.len());
        for child in children {
            match child.kind {
                NodeKind::Chain(inner) => steps.extend(inner),
                kind => steps.push(Node { kind, ..child }),
            }
        }
        if steps.len() == 1
            && let Some(only) = steps.pop()
        {
            return only;
        }
        Node::new(NodeKind::Chain(steps))
    }

    /// Builds a sequence, splicing in nested sequences.
    pub fn sequence(children: Vec<Node>) -> Self {
        let mut items = Vec::with_capacity(children.len());
        for child in children {
            match child.kind {
                NodeKind::Sequence(inner) => items.extend(inner),
                kind => items.push(Node { kind, ..child }),
            }
        }
        if items.len() == 1
            && let Some(only) = items.pop()
        {
            return only;
        }
        Node::new(NodeKind::Sequence(items))
    }

    /// Child nodes in evaluation order.
    pub fn children(&self) -> Vec<&Node> {
        match &self.kind {
            NodeKind::Constant(_) | NodeKind::Variable(_) | NodeKind::This | NodeKind::Root => {
                Vec::new()
            }
            NodeKind::StaticField { .. } => Vec::new(),
            NodeKind::Property { key, .. } => vec![key],
            NodeKind::Chain(items) | NodeKind::List(items) | NodeKind::Sequence(items) => {
                items.iter().collect()
            }
            NodeKind::Method { args, .. }
            | NodeKind::StaticMethod { args, .. }
            | NodeKind::Constructor { args, .. } => args.iter().collect(),
            NodeKind::Map(entries) => entries.iter().flat_map(|(k, v)| [k, v]).collect(),
            NodeKind::Binary { left, right, .. } => vec![left, right],
            NodeKind::Unary { operand, .. } => vec![operand],
            NodeKind::Ternary {
                condition,
                then,
                otherwise,
            } => vec![condition, then, otherwise],
            NodeKind::Assign { target, value } => vec![target, value],
            NodeKind::Projection(expr) => vec![expr],
            NodeKind::Selection { condition, .. } => vec![condition],
            NodeKind::InstanceOf { operand, .. } => vec![operand],
        }
    }

    /// The property name of a non-indexed `.name` step.
    pub fn property_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Property {
                key, indexed: false, ..
            } => match &key.kind {
                NodeKind::Constant(Literal::String(name)) => Some(name),
                _ => None,
            },
            _ => None,
        }
    }
}

impl Clone for Node {
    /// The clone is a distinct node with its own identity.
    fn clone(&self) -> Self {
        Node::new(self.kind.clone())
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

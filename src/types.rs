//! Static type references used by member signatures and overload scoring.
//!
//! Runtime values carry a *class name* (see [`Value::class_name`](crate::Value::class_name))
//! for member lookup, and a [`TypeRef`] for argument scoring. The two differ for
//! numbers: an `int` value has the primitive type `int` but is looked up through
//! the boxed class `Integer`.

use std::{fmt, sync::Arc};

/// Interned class name shared between descriptors, caches and AST nodes.
pub type ClassName = Arc<str>;

/// Primitive types of the numeric tower plus `boolean` and `char`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    /// Parses a primitive keyword (`int`, `double`, ...).
    pub fn from_keyword(name: &str) -> Option<Self> {
        Some(match name {
            "boolean" => Primitive::Boolean,
            "char" => Primitive::Char,
            "byte" => Primitive::Byte,
            "short" => Primitive::Short,
            "int" => Primitive::Int,
            "long" => Primitive::Long,
            "float" => Primitive::Float,
            "double" => Primitive::Double,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Char => "char",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    /// Name of the boxed class this primitive converts to.
    pub fn boxed_class(self) -> &'static str {
        match self {
            Primitive::Boolean => "Boolean",
            Primitive::Char => "Character",
            Primitive::Byte => "Byte",
            Primitive::Short => "Short",
            Primitive::Int => "Integer",
            Primitive::Long => "Long",
            Primitive::Float => "Float",
            Primitive::Double => "Double",
        }
    }

    /// Inverse of [`Primitive::boxed_class`].
    pub fn from_boxed_class(name: &str) -> Option<Self> {
        Some(match name {
            "Boolean" => Primitive::Boolean,
            "Character" => Primitive::Char,
            "Byte" => Primitive::Byte,
            "Short" => Primitive::Short,
            "Integer" => Primitive::Int,
            "Long" => Primitive::Long,
            "Float" => Primitive::Float,
            "Double" => Primitive::Double,
            _ => return None,
        })
    }

    /// Position in the widening order; `None` for `boolean`, which never widens.
    pub fn widening_rank(self) -> Option<u32> {
        match self {
            Primitive::Boolean => None,
            Primitive::Byte => Some(1),
            Primitive::Short | Primitive::Char => Some(2),
            Primitive::Int => Some(3),
            Primitive::Long => Some(4),
            Primitive::Float => Some(5),
            Primitive::Double => Some(6),
        }
    }

    /// Whether a value of `self` widens to `target` without loss of magnitude.
    pub fn widens_to(self, target: Primitive) -> bool {
        if self == target {
            return true;
        }
        match (self, target) {
            // char and short have the same rank but neither widens to the other
            (Primitive::Char, Primitive::Short) | (Primitive::Short, Primitive::Char) => false,
            (Primitive::Byte, Primitive::Char) => false,
            _ => match (self.widening_rank(), target.widening_rank()) {
                (Some(from), Some(to)) => from < to,
                _ => false,
            },
        }
    }
}

/// A parameter, field, return or array component type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Primitive(Primitive),
    Class(ClassName),
    Array(Box<TypeRef>),
}

impl TypeRef {
    pub fn class(name: &str) -> Self {
        TypeRef::Class(Arc::from(name))
    }

    pub fn object() -> Self {
        TypeRef::class("Object")
    }

    pub fn string() -> Self {
        TypeRef::class("String")
    }

    pub fn int() -> Self {
        TypeRef::Primitive(Primitive::Int)
    }

    pub fn long() -> Self {
        TypeRef::Primitive(Primitive::Long)
    }

    pub fn double() -> Self {
        TypeRef::Primitive(Primitive::Double)
    }

    pub fn boolean() -> Self {
        TypeRef::Primitive(Primitive::Boolean)
    }

    pub fn array_of(component: TypeRef) -> Self {
        TypeRef::Array(Box::new(component))
    }

    /// Parses a type name as written in `new` expressions and signatures:
    /// a primitive keyword, a class name, or either followed by `[]`.
    pub fn parse(name: &str) -> Self {
        if let Some(component) = name.strip_suffix("[]") {
            return TypeRef::array_of(TypeRef::parse(component));
        }
        match Primitive::from_keyword(name) {
            Some(p) => TypeRef::Primitive(p),
            None => TypeRef::class(name),
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRef::Primitive(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, TypeRef::Class(name) if &**name == "Object")
    }

    /// The primitive a type denotes directly or through its boxed class.
    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            TypeRef::Primitive(p) => Some(*p),
            TypeRef::Class(name) => Primitive::from_boxed_class(name),
            TypeRef::Array(_) => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => write!(f, "{}", p.keyword()),
            TypeRef::Class(name) => write!(f, "{}", name),
            TypeRef::Array(component) => write!(f, "{}[]", component),
        }
    }
}

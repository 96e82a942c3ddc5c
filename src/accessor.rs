//! # Property accessors
//!
//! Reading `x.name` or `x[key]` is delegated to a [`PropertyAccessor`] chosen
//! by the runtime class of `x`. Defaults are registered for `Object` (getter
//! and setter conventions), `List`, `Array`, `Map`, `Set` and `Iterator`;
//! embedders can register their own for any class.
//!
//! The accessor for a class is found by walking its lineage (exact class,
//! superclasses, interfaces, `Object`) and is memoized per class.

mod array;
mod list;
mod map;
mod object;
mod set;

pub use array::ArrayAccessor;
pub(crate) use array::to_component;
pub use list::ListAccessor;
pub use map::MapAccessor;
pub use object::ObjectAccessor;
pub use set::{IteratorAccessor, SetAccessor};

use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{
    cache::{Cached, ClassCache},
    context::Context,
    evaluator::EvalError,
    resolver::Introspector,
    types::ClassName,
    value::{DynamicSubscript, Value},
};

/// What is being accessed on a target.
#[derive(Debug, Clone, Copy)]
pub enum PropertyKey<'a> {
    /// `target.name`
    Name(&'a str),
    /// `target[index]`
    Index(&'a Value),
}

impl PropertyKey<'_> {
    /// The key as a property name, when it is one.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            PropertyKey::Name(name) => Some(name),
            PropertyKey::Index(Value::String(name)) => Some(name),
            PropertyKey::Index(_) => None,
        }
    }
}

impl fmt::Display for PropertyKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Name(name) => write!(f, "{}", name),
            PropertyKey::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Per-type read and write strategy.
pub trait PropertyAccessor: Send + Sync {
    fn get_property(&self, ctx: &Context, target: &Value, key: PropertyKey<'_>) -> Result<Value, EvalError>;

    fn set_property(
        &self,
        ctx: &Context,
        target: &Value,
        key: PropertyKey<'_>,
        value: Value,
    ) -> Result<(), EvalError>;
}

/// Position a positional index denotes in a collection of a given length.
pub(crate) enum Slot {
    At(usize),
    /// A dynamic subscript against an empty collection.
    Empty,
    All,
}

/// Resolves an integer or dynamic-subscript index. `Ok(None)` when `index`
/// is not positional at all.
pub(crate) fn slot(index: &Value, len: usize) -> Result<Option<Slot>, EvalError> {
    if let Value::Subscript(subscript) = index {
        return Ok(Some(match subscript {
            DynamicSubscript::All => Slot::All,
            other => other.resolve(len).map_or(Slot::Empty, Slot::At),
        }));
    }
    let Some(i) = index.as_index() else {
        return Ok(None);
    };
    match usize::try_from(i) {
        Ok(at) if at < len => Ok(Some(Slot::At(at))),
        _ => Err(EvalError::IndexOutOfBounds { index: i, len }),
    }
}

pub(crate) fn no_such_property(target: &Value, key: PropertyKey<'_>) -> EvalError {
    EvalError::NoSuchProperty {
        class: target.class_name().to_string(),
        property: key.to_string(),
    }
}

/// Accessors by class, resolved through the class lineage.
pub struct AccessorRegistry {
    registered: RwLock<FxHashMap<ClassName, Arc<dyn PropertyAccessor>>>,
    resolved: ClassCache<Arc<dyn PropertyAccessor>>,
}

impl AccessorRegistry {
    /// A registry with no accessors; lookups fall back to [`ObjectAccessor`].
    pub fn empty() -> Self {
        AccessorRegistry {
            registered: RwLock::new(FxHashMap::default()),
            resolved: ClassCache::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let registry = Self::empty();
        registry.register("Object", Arc::new(ObjectAccessor));
        registry.register("List", Arc::new(ListAccessor));
        registry.register("Array", Arc::new(ArrayAccessor));
        registry.register("Map", Arc::new(MapAccessor));
        registry.register("Set", Arc::new(SetAccessor));
        registry.register("Iterator", Arc::new(IteratorAccessor));
        registry
    }

    /// Registers `accessor` for `class` and its subtypes. Memoized lookups are
    /// dropped so the new accessor is seen immediately.
    pub fn register(&self, class: &str, accessor: Arc<dyn PropertyAccessor>) {
        debug!(class, "registering property accessor");
        self.registered
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(Arc::from(class), accessor);
        self.resolved.clear();
    }

    /// The accessor for values of `class`: the first registered entry along the
    /// lineage, else [`ObjectAccessor`].
    pub fn lookup(&self, introspector: &Introspector, class: &str) -> Arc<dyn PropertyAccessor> {
        let class: ClassName = Arc::from(class);
        let found = self.resolved.get_or_resolve(&class, "", || {
            let registered = self.registered.read().unwrap_or_else(PoisonError::into_inner);
            introspector
                .lineage(&class)
                .iter()
                .find_map(|name| registered.get(name).cloned())
                .into()
        });
        match found {
            Cached::Found(accessor) => accessor,
            Cached::NotFound => Arc::new(ObjectAccessor),
        }
    }

    pub fn clear_cache(&self) {
        self.resolved.clear();
    }
}

impl Default for AccessorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for AccessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered = self.registered.read().unwrap_or_else(PoisonError::into_inner);
        let mut classes: Vec<&str> = registered.keys().map(|k| &**k).collect();
        classes.sort_unstable();
        f.debug_struct("AccessorRegistry")
            .field("classes", &classes)
            .finish()
    }
}

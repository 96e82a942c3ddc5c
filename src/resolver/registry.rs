use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use super::{ClassDescriptor, MemberResolver, builtins};
use crate::types::ClassName;

/// Registration-table resolver.
///
/// Classes are registered before the registry is shared; afterwards it is
/// read-only, so lookups need no locking.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: FxHashMap<ClassName, Arc<ClassDescriptor>>,
}

impl ClassRegistry {
    /// An empty registry. Most callers want [`ClassRegistry::with_builtins`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with `Object`, the numeric classes, `String`, the
    /// collection interfaces and their implementations, and `Math`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register_all(&mut registry);
        registry
    }

    /// Adds or replaces a class.
    pub fn register(&mut self, class: ClassDescriptor) -> &mut Self {
        debug!(class = %class.name, methods = class.methods.len(), "registering class");
        self.classes.insert(class.name.clone(), Arc::new(class));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl MemberResolver for ClassRegistry {
    /// Exact name first; a dotted name (`java.util.ArrayList`) falls back to its
    /// last segment.
    fn class(&self, name: &str) -> Option<Arc<ClassDescriptor>> {
        if let Some(class) = self.classes.get(name) {
            return Some(class.clone());
        }
        let (_, simple) = name.rsplit_once('.')?;
        self.classes.get(simple).cloned()
    }
}

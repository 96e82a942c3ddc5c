//! # Member resolution
//!
//! Hosts describe their types to the evaluator through a [`MemberResolver`].
//! There is no runtime reflection: the default resolver, [`ClassRegistry`], is a
//! registration table filled at startup through [`ClassBuilder`]. Anything that
//! can answer "what does class `C` declare" can stand in for it.
//!
//! Resolution results are memoized by the [`Introspector`], which layers
//! overload scoring and the getter/setter naming conventions on top of the raw
//! resolver.
//!
//! ## Lookup order
//!
//! Inherited members and per-type accessors are found by walking the exact class,
//! then its superclass chain, then interfaces breadth-first, and finally
//! `Object`. Methods with the same signature reached through several paths are
//! merged, keeping the most-derived declaration.

mod builtins;
pub mod descriptor;
pub mod introspector;
pub mod overload;
pub mod registry;

pub use descriptor::{
    ClassBuilder, ClassDescriptor, FieldDescriptor, HostError, MethodDescriptor, receiver,
    receiver_mut,
};
pub use introspector::{Getter, IndexedKind, IndexedProperty, Introspector, Setter};
pub use registry::ClassRegistry;

use std::{collections::VecDeque, sync::Arc};

use crate::types::ClassName;

/// Capability interface the evaluator uses to discover host members.
///
/// Only [`MemberResolver::class`] is required; the provided methods derive
/// inherited members from it.
///
/// The runtime's member caches call into the resolver while holding their
/// write lock. An implementation must not evaluate expressions or look up
/// members through the same [`Runtime`](crate::Runtime), and a slow lookup
/// stalls every other lookup on that runtime until it returns.
pub trait MemberResolver: Send + Sync {
    /// Descriptor of a class or interface by name.
    fn class(&self, name: &str) -> Option<Arc<ClassDescriptor>>;

    /// `class` itself, its superclasses, its interfaces breadth-first, then `Object`.
    fn lineage(&self, class: &str) -> Vec<ClassName> {
        let mut order: Vec<ClassName> = vec![Arc::from(class)];
        let mut chain = Vec::new();
        let mut current = self.class(class);
        while let Some(desc) = current {
            current = None;
            if let Some(parent) = &desc.superclass
                && !order.contains(parent)
            {
                order.push(parent.clone());
                current = self.class(parent);
            }
            chain.push(desc);
        }

        let mut queue: VecDeque<ClassName> = chain
            .iter()
            .flat_map(|desc| desc.interfaces.iter().cloned())
            .collect();
        while let Some(name) = queue.pop_front() {
            if order.contains(&name) {
                continue;
            }
            if let Some(desc) = self.class(&name) {
                queue.extend(desc.interfaces.iter().cloned());
            }
            order.push(name);
        }

        if !order.iter().any(|name| &**name == "Object") {
            order.push(Arc::from("Object"));
        }
        order
    }

    /// Methods callable on `class`, most-derived declaration first.
    fn methods(&self, class: &str) -> Vec<Arc<MethodDescriptor>> {
        let mut found: Vec<Arc<MethodDescriptor>> = Vec::new();
        for name in self.lineage(class) {
            let Some(desc) = self.class(&name) else {
                continue;
            };
            for method in &desc.methods {
                if !found.iter().any(|known| known.same_signature(method)) {
                    found.push(method.clone());
                }
            }
        }
        found
    }

    /// Fields visible on `class`; a subclass field hides an inherited one.
    fn fields(&self, class: &str) -> Vec<Arc<FieldDescriptor>> {
        let mut found: Vec<Arc<FieldDescriptor>> = Vec::new();
        for name in self.lineage(class) {
            let Some(desc) = self.class(&name) else {
                continue;
            };
            for field in &desc.fields {
                if !found.iter().any(|known| known.name == field.name) {
                    found.push(field.clone());
                }
            }
        }
        found
    }

    /// Constructors declared by `class` itself.
    fn constructors(&self, class: &str) -> Vec<Arc<MethodDescriptor>> {
        self.class(class)
            .map(|desc| desc.constructors.clone())
            .unwrap_or_default()
    }
}

//! Per-class memo tables shared by every evaluation on a [`Runtime`](crate::Runtime).

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rustc_hash::FxHashMap;

use crate::types::ClassName;

/// A memoized lookup result. Negative results are cached too, so a missing
/// member is looked up once.
#[derive(Debug, Clone, PartialEq)]
pub enum Cached<V> {
    Found(V),
    NotFound,
}

impl<V> Cached<V> {
    pub fn into_option(self) -> Option<V> {
        match self {
            Cached::Found(value) => Some(value),
            Cached::NotFound => None,
        }
    }
}

impl<V> From<Option<V>> for Cached<V> {
    fn from(value: Option<V>) -> Self {
        match value {
            Some(value) => Cached::Found(value),
            None => Cached::NotFound,
        }
    }
}

/// Two-level map: class name, then member key (a name or a `name(args)` shape).
///
/// Readers never block each other. A miss takes the write lock, checks again
/// and resolves while still holding it, so each (class, key) pair is resolved
/// at most once. Every other lookup on the cache waits for that resolution,
/// and a `resolve` closure that touches the same cache deadlocks.
#[derive(Debug)]
pub struct ClassCache<V> {
    entries: RwLock<FxHashMap<ClassName, FxHashMap<String, Cached<V>>>>,
}

impl<V> Default for ClassCache<V> {
    fn default() -> Self {
        ClassCache {
            entries: RwLock::new(FxHashMap::default()),
        }
    }
}

impl<V: Clone> ClassCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock only means another thread panicked mid-insert of a
    // complete entry; the map itself is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, FxHashMap<ClassName, FxHashMap<String, Cached<V>>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, FxHashMap<ClassName, FxHashMap<String, Cached<V>>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, class: &str, key: &str) -> Option<Cached<V>> {
        self.read().get(class)?.get(key).cloned()
    }

    pub fn insert(&self, class: &ClassName, key: &str, value: Cached<V>) {
        self.write()
            .entry(class.clone())
            .or_default()
            .insert(key.to_string(), value);
    }

    /// Returns the cached entry, resolving and storing it on a miss.
    pub fn get_or_resolve<F>(&self, class: &ClassName, key: &str, resolve: F) -> Cached<V>
    where
        F: FnOnce() -> Cached<V>,
    {
        if let Some(hit) = self.get(class, key) {
            return hit;
        }
        let mut entries = self.write();
        let members = entries.entry(class.clone()).or_default();
        if let Some(hit) = members.get(key) {
            return hit.clone();
        }
        let resolved = resolve();
        members.insert(key.to_string(), resolved.clone());
        resolved
    }

    /// Number of cached entries across all classes.
    pub fn len(&self) -> usize {
        self.read().values().map(FxHashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.write().clear();
    }
}

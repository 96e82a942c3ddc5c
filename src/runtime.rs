//! The shared evaluation service.
//!
//! A [`Runtime`] owns everything that outlives a single evaluation: the member
//! resolver and its caches, the accessor and null-handler registries, the
//! default type converter, the access policy and compiled accessors. It is
//! `Send + Sync`; contexts on different threads share one through an `Arc`.
//!
//! [`Runtime::global`] is the process-wide instance used when a context is
//! created without an explicit runtime. Tests build their own with
//! [`Runtime::builder`] so cache state never leaks between cases.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{
    accessor::{AccessorRegistry, PropertyAccessor},
    ast::NodeId,
    cache::{Cached, ClassCache},
    config::RuntimeConfig,
    convert::{DefaultTypeConverter, TypeConverter},
    evaluator::EvalError,
    handlers::{CompiledAccessor, MemberAccess, NullHandler},
    resolver::{ClassRegistry, Introspector, MemberResolver},
    types::ClassName,
};

static GLOBAL: OnceLock<Arc<Runtime>> = OnceLock::new();

pub struct Runtime {
    introspector: Introspector,
    accessors: AccessorRegistry,
    null_handlers: RwLock<FxHashMap<ClassName, Arc<dyn NullHandler>>>,
    resolved_null_handlers: ClassCache<Arc<dyn NullHandler>>,
    converter: Arc<dyn TypeConverter>,
    member_access: Option<Arc<dyn MemberAccess>>,
    compiled: RwLock<FxHashMap<NodeId, Arc<dyn CompiledAccessor>>>,
    config: RuntimeConfig,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::default()
    }

    /// The process-wide runtime, created on first use from the built-in
    /// classes and [`RuntimeConfig::from_env`].
    pub fn global() -> Arc<Runtime> {
        GLOBAL
            .get_or_init(|| Arc::new(Runtime::builder().config(RuntimeConfig::from_env()).build()))
            .clone()
    }

    /// Installs `runtime` as the process-wide instance. Fails, returning it,
    /// if the global runtime was already initialized.
    pub fn init(runtime: Runtime) -> Result<Arc<Runtime>, Arc<Runtime>> {
        let runtime = Arc::new(runtime);
        GLOBAL.set(runtime.clone())?;
        Ok(runtime)
    }

    pub fn introspector(&self) -> &Introspector {
        &self.introspector
    }

    pub fn resolver(&self) -> &Arc<dyn MemberResolver> {
        self.introspector.resolver()
    }

    pub fn accessors(&self) -> &AccessorRegistry {
        &self.accessors
    }

    /// The accessor for values of `class`.
    pub fn accessor(&self, class: &str) -> Arc<dyn PropertyAccessor> {
        self.accessors.lookup(&self.introspector, class)
    }

    pub fn converter(&self) -> &Arc<dyn TypeConverter> {
        &self.converter
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn register_accessor(&self, class: &str, accessor: Arc<dyn PropertyAccessor>) {
        self.accessors.register(class, accessor);
    }

    pub fn register_null_handler(&self, class: &str, handler: Arc<dyn NullHandler>) {
        debug!(class, "registering null handler");
        self.null_handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(Arc::from(class), handler);
        self.resolved_null_handlers.clear();
    }

    /// The null handler registered for `class` or the nearest type in its lineage.
    pub fn null_handler(&self, class: &str) -> Option<Arc<dyn NullHandler>> {
        let class: ClassName = Arc::from(class);
        self.resolved_null_handlers
            .get_or_resolve(&class, "", || {
                let handlers = self.null_handlers.read().unwrap_or_else(PoisonError::into_inner);
                if handlers.is_empty() {
                    return Cached::NotFound;
                }
                self.introspector
                    .lineage(&class)
                    .iter()
                    .find_map(|name| handlers.get(name).cloned())
                    .into()
            })
            .into_option()
    }

    /// Fails with [`EvalError::AccessDenied`] when the access policy refuses
    /// `class.member`.
    pub fn check_access(&self, class: &str, member: &str) -> Result<(), EvalError> {
        match &self.member_access {
            Some(policy) if !policy.is_accessible(class, member) => Err(EvalError::AccessDenied {
                class: class.to_string(),
                member: member.to_string(),
            }),
            _ => Ok(()),
        }
    }

    pub fn register_compiled(&self, node: NodeId, accessor: Arc<dyn CompiledAccessor>) {
        self.compiled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(node, accessor);
    }

    pub fn compiled(&self, node: NodeId) -> Option<Arc<dyn CompiledAccessor>> {
        self.compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&node)
            .cloned()
    }

    /// Drops every memoized lookup: members, overload decisions, accessor and
    /// null-handler resolutions. Registrations are kept.
    pub fn clear_caches(&self) {
        debug!("clearing runtime caches");
        self.introspector.clear_caches();
        self.accessors.clear_cache();
        self.resolved_null_handlers.clear();
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("introspector", &self.introspector)
            .field("accessors", &self.accessors)
            .field("config", &self.config)
            .finish()
    }
}

/// Assembles a [`Runtime`]; every part has a default.
#[derive(Default)]
pub struct RuntimeBuilder {
    resolver: Option<Arc<dyn MemberResolver>>,
    converter: Option<Arc<dyn TypeConverter>>,
    member_access: Option<Arc<dyn MemberAccess>>,
    accessors: Vec<(String, Arc<dyn PropertyAccessor>)>,
    null_handlers: Vec<(String, Arc<dyn NullHandler>)>,
    config: RuntimeConfig,
}

impl RuntimeBuilder {
    /// Member resolver; defaults to [`ClassRegistry::with_builtins`].
    pub fn resolver(mut self, resolver: Arc<dyn MemberResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn registry(self, registry: ClassRegistry) -> Self {
        self.resolver(Arc::new(registry))
    }

    pub fn converter(mut self, converter: Arc<dyn TypeConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn member_access(mut self, policy: Arc<dyn MemberAccess>) -> Self {
        self.member_access = Some(policy);
        self
    }

    pub fn accessor(mut self, class: &str, accessor: Arc<dyn PropertyAccessor>) -> Self {
        self.accessors.push((class.to_string(), accessor));
        self
    }

    pub fn null_handler(mut self, class: &str, handler: Arc<dyn NullHandler>) -> Self {
        self.null_handlers.push((class.to_string(), handler));
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Runtime {
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(ClassRegistry::with_builtins()));
        let accessors = AccessorRegistry::with_defaults();
        for (class, accessor) in self.accessors {
            accessors.register(&class, accessor);
        }
        let null_handlers = self
            .null_handlers
            .into_iter()
            .map(|(class, handler)| (ClassName::from(class), handler))
            .collect();
        Runtime {
            introspector: Introspector::new(resolver, self.config.ambiguity),
            accessors,
            null_handlers: RwLock::new(null_handlers),
            resolved_null_handlers: ClassCache::new(),
            converter: self
                .converter
                .unwrap_or_else(|| Arc::new(DefaultTypeConverter)),
            member_access: self.member_access,
            compiled: RwLock::new(FxHashMap::default()),
            config: self.config,
        }
    }
}

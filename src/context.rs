use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    convert::TypeConverter,
    pool::ArgPool,
    resolver::{Introspector, MemberResolver},
    runtime::Runtime,
    trace::{Evaluation, TraceRecorder},
    types::TypeRef,
    value::Value,
};

/// Saved transient cursors, restored with [`Context::restore`].
#[derive(Debug, Clone, PartialEq)]
pub struct Cursors {
    pub object: Option<Value>,
    pub ty: Option<TypeRef>,
}

/// Per-evaluation state: the root, variables, the runtime whose caches and
/// registries are consulted, and the transient cursors nodes update while the
/// tree is walked.
///
/// A context belongs to one thread. Reusing it across calls is fine; call
/// [`Context::reset_cursors`] between unrelated evaluations if the cursors
/// are inspected.
pub struct Context {
    root: Value,
    vars: HashMap<String, Value>,
    runtime: Arc<Runtime>,
    converter: Option<Arc<dyn TypeConverter>>,
    current_object: Option<Value>,
    current_type: Option<TypeRef>,
    trace: Option<TraceRecorder>,
    pool: ArgPool,
}

impl Context {
    /// A context on the process-wide [`Runtime::global`].
    pub fn new(root: Value) -> Self {
        Self::with_runtime(root, Runtime::global())
    }

    pub fn with_runtime(root: Value, runtime: Arc<Runtime>) -> Self {
        let trace = runtime.config().trace_evaluations.then(TraceRecorder::new);
        Context {
            root,
            vars: HashMap::new(),
            runtime,
            converter: None,
            current_object: None,
            current_type: None,
            trace,
            pool: ArgPool::new(),
        }
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    pub fn introspector(&self) -> &Introspector {
        self.runtime.introspector()
    }

    pub fn member_resolver(&self) -> &Arc<dyn MemberResolver> {
        self.runtime.resolver()
    }

    /// The context's converter, else the runtime default.
    pub fn converter(&self) -> &dyn TypeConverter {
        match &self.converter {
            Some(converter) => &**converter,
            None => &**self.runtime.converter(),
        }
    }

    pub fn set_converter(&mut self, converter: Arc<dyn TypeConverter>) {
        self.converter = Some(converter);
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn set_root(&mut self, root: Value) {
        self.root = root;
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Binds a variable, returning the previous value.
    pub fn put(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.vars.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.vars.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn vars(&self) -> &HashMap<String, Value> {
        &self.vars
    }

    pub fn current_object(&self) -> Option<&Value> {
        self.current_object.as_ref()
    }

    pub fn set_current_object(&mut self, object: Option<Value>) {
        self.current_object = object;
    }

    pub fn current_type(&self) -> Option<&TypeRef> {
        self.current_type.as_ref()
    }

    pub fn set_current_type(&mut self, ty: Option<TypeRef>) {
        self.current_type = ty;
    }

    pub fn cursors(&self) -> Cursors {
        Cursors {
            object: self.current_object.clone(),
            ty: self.current_type.clone(),
        }
    }

    pub fn restore(&mut self, cursors: Cursors) {
        self.current_object = cursors.object;
        self.current_type = cursors.ty;
    }

    pub fn reset_cursors(&mut self) {
        self.current_object = None;
        self.current_type = None;
    }

    pub fn enable_trace(&mut self) {
        if self.trace.is_none() {
            self.trace = Some(TraceRecorder::new());
        }
    }

    pub fn is_tracing(&self) -> bool {
        self.trace.is_some()
    }

    pub(crate) fn trace_mut(&mut self) -> Option<&mut TraceRecorder> {
        self.trace.as_mut()
    }

    /// The evaluation tree of the last top-level call, if tracing is enabled.
    pub fn last_evaluation(&self) -> Option<&Evaluation> {
        self.trace.as_ref().and_then(TraceRecorder::last)
    }

    pub fn take_evaluation(&mut self) -> Option<Evaluation> {
        self.trace.as_mut().and_then(TraceRecorder::take)
    }

    pub fn pool(&mut self) -> &mut ArgPool {
        &mut self.pool
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("root", &self.root)
            .field("vars", &self.vars)
            .field("current_object", &self.current_object)
            .field("current_type", &self.current_type)
            .field("custom_converter", &self.converter.is_some())
            .field("tracing", &self.trace.is_some())
            .finish()
    }
}

/// Builds a context for `root`.
///
/// With a `resolver`, the context gets a private runtime over that resolver
/// (and fresh caches); without one it shares [`Runtime::global`]. A
/// `converter` replaces the runtime's default for this context only.
pub fn create_context(
    root: Value,
    resolver: Option<Arc<dyn MemberResolver>>,
    converter: Option<Arc<dyn TypeConverter>>,
) -> Context {
    let mut ctx = match resolver {
        Some(resolver) => Context::with_runtime(
            root,
            Arc::new(
                Runtime::builder()
                    .resolver(resolver)
                    .config(Runtime::global().config().clone())
                    .build(),
            ),
        ),
        None => Context::new(root),
    };
    if let Some(converter) = converter {
        ctx.set_converter(converter);
    }
    ctx
}

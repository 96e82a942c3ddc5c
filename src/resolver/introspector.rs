//! Cached member lookup layered over a [`MemberResolver`].

use std::sync::Arc;

use tracing::{debug, warn};

use super::{
    ClassDescriptor, FieldDescriptor, HostError, MemberResolver, MethodDescriptor,
    overload::{self, ArgType, Ranking},
};
use crate::{
    cache::{Cached, ClassCache},
    config::AmbiguityPolicy,
    evaluator::EvalError,
    types::{ClassName, Primitive, TypeRef},
    value::Value,
};

const GETTER_PREFIXES: &[&str] = &["get", "is", "has"];
const SETTER_PREFIXES: &[&str] = &["set"];

/// How a property is read.
#[derive(Debug, Clone)]
pub enum Getter {
    Method(Arc<MethodDescriptor>),
    Field(Arc<FieldDescriptor>),
}

impl Getter {
    pub fn read(&self, target: &Value) -> Result<Value, HostError> {
        match self {
            Getter::Method(method) => method.invoke(target, &[]),
            Getter::Field(field) => field.get(target),
        }
    }

    pub fn value_type(&self) -> &TypeRef {
        match self {
            Getter::Method(method) => &method.returns,
            Getter::Field(field) => &field.ty,
        }
    }

    pub fn member_name(&self) -> &str {
        match self {
            Getter::Method(method) => &method.name,
            Getter::Field(field) => &field.name,
        }
    }
}

/// How a property is written.
#[derive(Debug, Clone)]
pub enum Setter {
    Method(Arc<MethodDescriptor>),
    Field(Arc<FieldDescriptor>),
}

impl Setter {
    pub fn write(&self, target: &Value, value: Value) -> Result<(), HostError> {
        match self {
            Setter::Method(method) => method.invoke(target, &[value]).map(|_| ()),
            Setter::Field(field) => field.set(target, value),
        }
    }

    pub fn param_type(&self) -> &TypeRef {
        match self {
            Setter::Method(method) => &method.params[0],
            Setter::Field(field) => &field.ty,
        }
    }

    pub fn member_name(&self) -> &str {
        match self {
            Setter::Method(method) => &method.name,
            Setter::Field(field) => &field.name,
        }
    }
}

/// Whether `x[i]` is served by a `getX(i)`/`setX(i, v)` method pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexedKind {
    None,
    /// The pair takes an `int` index.
    Int,
    /// The pair takes an arbitrary key.
    Object,
}

#[derive(Debug, Clone)]
pub struct IndexedProperty {
    pub kind: IndexedKind,
    pub getter: Option<Arc<MethodDescriptor>>,
    pub setter: Option<Arc<MethodDescriptor>>,
}

impl IndexedProperty {
    fn none() -> Self {
        IndexedProperty {
            kind: IndexedKind::None,
            getter: None,
            setter: None,
        }
    }
}

/// An overload decision for one call shape.
#[derive(Debug, Clone)]
struct Decision {
    method: Arc<MethodDescriptor>,
    rivals: Vec<String>,
}

#[derive(Debug, Default)]
struct Caches {
    getters: ClassCache<Getter>,
    setters: ClassCache<Vec<Setter>>,
    methods: ClassCache<Vec<Arc<MethodDescriptor>>>,
    static_methods: ClassCache<Vec<Arc<MethodDescriptor>>>,
    constructors: ClassCache<Vec<Arc<MethodDescriptor>>>,
    decisions: ClassCache<Decision>,
    indexed: ClassCache<IndexedProperty>,
    static_fields: ClassCache<Arc<FieldDescriptor>>,
    distances: ClassCache<u32>,
    lineages: ClassCache<Vec<ClassName>>,
}

/// Memoizing front end to a [`MemberResolver`].
///
/// Every lookup is keyed by (class name, member key) and cached, negative
/// results included, until [`Introspector::clear_caches`].
pub struct Introspector {
    resolver: Arc<dyn MemberResolver>,
    ambiguity: AmbiguityPolicy,
    caches: Caches,
}

impl Introspector {
    pub fn new(resolver: Arc<dyn MemberResolver>, ambiguity: AmbiguityPolicy) -> Self {
        Introspector {
            resolver,
            ambiguity,
            caches: Caches::default(),
        }
    }

    pub fn resolver(&self) -> &Arc<dyn MemberResolver> {
        &self.resolver
    }

    pub fn ambiguity(&self) -> AmbiguityPolicy {
        self.ambiguity
    }

    pub fn class(&self, name: &str) -> Option<Arc<ClassDescriptor>> {
        self.resolver.class(name)
    }

    /// Cached [`MemberResolver::lineage`].
    pub fn lineage(&self, class: &ClassName) -> Vec<ClassName> {
        self.caches
            .lineages
            .get_or_resolve(class, "", || Cached::Found(self.resolver.lineage(class)))
            .into_option()
            .unwrap_or_default()
    }

    /// Number of steps from `from` up to `to` in `from`'s lineage.
    pub fn distance(&self, from: &str, to: &str) -> Option<u32> {
        if from == to {
            return Some(0);
        }
        let from: ClassName = Arc::from(from);
        self.caches
            .distances
            .get_or_resolve(&from, to, || {
                self.lineage(&from)
                    .iter()
                    .position(|name| &**name == to)
                    .map(|i| i as u32)
                    .into()
            })
            .into_option()
    }

    pub fn is_assignable(&self, from: &str, to: &str) -> bool {
        self.distance(from, to).is_some()
    }

    /// Whether `value` is an instance of `ty`.
    pub fn is_instance(&self, value: &Value, ty: &TypeRef) -> bool {
        if value.is_null() {
            return false;
        }
        match ty {
            TypeRef::Primitive(p) => value.type_ref() == TypeRef::Primitive(*p),
            TypeRef::Class(name) => self.is_assignable(value.class_name(), name),
            TypeRef::Array(_) => {
                matches!(value, Value::Array(_))
                    && overload::score(&Some(value.type_ref()), ty, &|a, b| self.distance(a, b))
                        .is_some()
            }
        }
    }

    /// The best getter for `property`: `getX`, `isX`, `hasX` (case-exact before
    /// case-folded), else a field of that name.
    pub fn getter(&self, class: &ClassName, property: &str) -> Option<Getter> {
        self.caches
            .getters
            .get_or_resolve(class, property, || {
                debug!(%class, property, "resolving getter");
                let method = self
                    .resolver
                    .methods(class)
                    .into_iter()
                    .filter(|m| !m.is_static && m.params.is_empty())
                    .filter_map(|m| {
                        overload::accessor_penalty(&m.name, property, GETTER_PREFIXES)
                            .map(|penalty| (penalty, m))
                    })
                    .min_by_key(|(penalty, _)| *penalty);
                if let Some((_, method)) = method {
                    return Cached::Found(Getter::Method(method));
                }
                self.resolver
                    .fields(class)
                    .into_iter()
                    .find(|f| !f.is_static && &*f.name == property)
                    .map(Getter::Field)
                    .into()
            })
            .into_option()
    }

    /// Setter candidates for `property`, best name match first, then a
    /// writable field of that name.
    pub fn setters(&self, class: &ClassName, property: &str) -> Vec<Setter> {
        self.caches
            .setters
            .get_or_resolve(class, property, || {
                debug!(%class, property, "resolving setters");
                let mut methods: Vec<(u32, Arc<MethodDescriptor>)> = self
                    .resolver
                    .methods(class)
                    .into_iter()
                    .filter(|m| !m.is_static && m.params.len() == 1)
                    .filter_map(|m| {
                        overload::accessor_penalty(&m.name, property, SETTER_PREFIXES)
                            .map(|penalty| (penalty, m))
                    })
                    .collect();
                methods.sort_by_key(|(penalty, _)| *penalty);
                let mut setters: Vec<Setter> =
                    methods.into_iter().map(|(_, m)| Setter::Method(m)).collect();
                if let Some(field) = self
                    .resolver
                    .fields(class)
                    .into_iter()
                    .find(|f| !f.is_static && f.is_writable() && &*f.name == property)
                {
                    setters.push(Setter::Field(field));
                }
                if setters.is_empty() {
                    Cached::NotFound
                } else {
                    Cached::Found(setters)
                }
            })
            .into_option()
            .unwrap_or_default()
    }

    /// The setter whose parameter accepts `value` most cheaply.
    pub fn choose_setter<'a>(&self, setters: &'a [Setter], value: &Value) -> Option<&'a Setter> {
        let arg: ArgType = (!value.is_null()).then(|| value.type_ref());
        setters
            .iter()
            .filter_map(|s| {
                overload::score(&arg, s.param_type(), &|a, b| self.distance(a, b)).map(|cost| (cost, s))
            })
            .min_by_key(|(cost, _)| *cost)
            .map(|(_, s)| s)
    }

    /// Methods named `name` callable on an instance of `class`.
    pub fn methods(&self, class: &ClassName, name: &str) -> Vec<Arc<MethodDescriptor>> {
        self.caches
            .methods
            .get_or_resolve(class, name, || {
                debug!(%class, name, "resolving methods");
                let found: Vec<_> = self
                    .resolver
                    .methods(class)
                    .into_iter()
                    .filter(|m| &*m.name == name)
                    .collect();
                if found.is_empty() { Cached::NotFound } else { Cached::Found(found) }
            })
            .into_option()
            .unwrap_or_default()
    }

    /// Static methods named `name` declared by `class` or inherited.
    pub fn static_methods(&self, class: &ClassName, name: &str) -> Vec<Arc<MethodDescriptor>> {
        self.caches
            .static_methods
            .get_or_resolve(class, name, || {
                let found: Vec<_> = self
                    .methods(class, name)
                    .into_iter()
                    .filter(|m| m.is_static)
                    .collect();
                if found.is_empty() { Cached::NotFound } else { Cached::Found(found) }
            })
            .into_option()
            .unwrap_or_default()
    }

    pub fn constructors(&self, class: &ClassName) -> Vec<Arc<MethodDescriptor>> {
        self.caches
            .constructors
            .get_or_resolve(class, "<init>", || {
                let found = self.resolver.constructors(class);
                if found.is_empty() { Cached::NotFound } else { Cached::Found(found) }
            })
            .into_option()
            .unwrap_or_default()
    }

    pub fn static_field(&self, class: &ClassName, name: &str) -> Option<Arc<FieldDescriptor>> {
        self.caches
            .static_fields
            .get_or_resolve(class, name, || {
                self.resolver
                    .fields(class)
                    .into_iter()
                    .find(|f| f.is_static && &*f.name == name)
                    .into()
            })
            .into_option()
    }

    /// Indexed-property classification of `property` on `class`.
    pub fn indexed(&self, class: &ClassName, property: &str) -> IndexedProperty {
        self.caches
            .indexed
            .get_or_resolve(class, property, || {
                let methods = self.resolver.methods(class);
                let capitalized = overload::capitalize(property);
                let getter = methods.iter().find(|m| {
                    !m.is_static && m.params.len() == 1 && *m.name == *format!("get{}", capitalized)
                });
                let setter = methods.iter().find(|m| {
                    !m.is_static && m.params.len() == 2 && *m.name == *format!("set{}", capitalized)
                });
                let Some(getter) = getter else {
                    return Cached::Found(IndexedProperty::none());
                };
                let kind = match getter.params[0].as_primitive() {
                    Some(Primitive::Int) => IndexedKind::Int,
                    _ => IndexedKind::Object,
                };
                debug!(%class, property, ?kind, "indexed property");
                Cached::Found(IndexedProperty {
                    kind,
                    getter: Some(getter.clone()),
                    setter: setter.cloned(),
                })
            })
            .into_option()
            .unwrap_or_else(IndexedProperty::none)
    }

    /// Picks the instance method `name` on `class` for `args`.
    pub fn select_method(
        &self,
        class: &ClassName,
        name: &str,
        args: &[Value],
    ) -> Result<Option<Arc<MethodDescriptor>>, EvalError> {
        let candidates = self.methods(class, name);
        self.decide(class, name, "", candidates, args)
    }

    pub fn select_static(
        &self,
        class: &ClassName,
        name: &str,
        args: &[Value],
    ) -> Result<Option<Arc<MethodDescriptor>>, EvalError> {
        let candidates = self.static_methods(class, name);
        self.decide(class, name, "static ", candidates, args)
    }

    pub fn select_constructor(
        &self,
        class: &ClassName,
        args: &[Value],
    ) -> Result<Option<Arc<MethodDescriptor>>, EvalError> {
        let candidates = self.constructors(class);
        self.decide(class, "<init>", "new ", candidates, args)
    }

    fn decide(
        &self,
        class: &ClassName,
        name: &str,
        kind: &str,
        candidates: Vec<Arc<MethodDescriptor>>,
        args: &[Value],
    ) -> Result<Option<Arc<MethodDescriptor>>, EvalError> {
        if candidates.is_empty() {
            return Ok(None);
        }
        let types = overload::arg_types(args);
        let key = format!("{}{}({})", kind, name, overload::arg_signature(&types));
        let decision = self.caches.decisions.get_or_resolve(class, &key, || {
            let distance = |a: &str, b: &str| self.distance(a, b);
            match overload::rank(&candidates, &types, &distance) {
                Ranking::NoMatch => Cached::NotFound,
                Ranking::Unique(best) => Cached::Found(Decision {
                    method: best.method,
                    rivals: Vec::new(),
                }),
                Ranking::Ambiguous { chosen, rivals } => {
                    let rivals: Vec<String> = rivals.iter().map(|m| m.signature()).collect();
                    if self.ambiguity == AmbiguityPolicy::PreferDeterministic {
                        warn!(
                            call = %key,
                            chosen = %chosen.method.signature(),
                            rivals = ?rivals,
                            "ambiguous overload"
                        );
                    }
                    Cached::Found(Decision {
                        method: chosen.method,
                        rivals,
                    })
                }
            }
        });
        match decision {
            Cached::NotFound => Ok(None),
            Cached::Found(decision) => {
                if !decision.rivals.is_empty() && self.ambiguity == AmbiguityPolicy::Reject {
                    let mut candidates = vec![decision.method.signature()];
                    candidates.extend(decision.rivals);
                    return Err(EvalError::AmbiguousMethod {
                        method: format!("{}.{}", class, name),
                        candidates: candidates.join(", "),
                    });
                }
                Ok(Some(decision.method))
            }
        }
    }

    /// Number of memoized entries across every cache.
    pub fn cached_entries(&self) -> usize {
        let c = &self.caches;
        c.getters.len()
            + c.setters.len()
            + c.methods.len()
            + c.static_methods.len()
            + c.constructors.len()
            + c.decisions.len()
            + c.indexed.len()
            + c.static_fields.len()
            + c.distances.len()
            + c.lineages.len()
    }

    pub fn clear_caches(&self) {
        let c = &self.caches;
        c.getters.clear();
        c.setters.clear();
        c.methods.clear();
        c.static_methods.clear();
        c.constructors.clear();
        c.decisions.clear();
        c.indexed.clear();
        c.static_fields.clear();
        c.distances.clear();
        c.lineages.clear();
    }
}

impl std::fmt::Debug for Introspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Introspector")
            .field("ambiguity", &self.ambiguity)
            .field("cached_entries", &self.cached_entries())
            .finish()
    }
}

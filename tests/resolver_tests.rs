// tests/resolver_tests.rs
//
// Host classes registered through ClassBuilder, and the runtime extension
// points layered over them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use graphnav_lang::accessor::{PropertyAccessor, PropertyKey};
use graphnav_lang::resolver::{ClassDescriptor, receiver, receiver_mut};
use graphnav_lang::{
    AmbiguityPolicy, ClassBuilder, ClassRegistry, CompiledAccessor, Context, DenyList, EvalError,
    HostError, MemberResolver, Node, NullHandler, Runtime, RuntimeConfig, TypeRef, Value, assign,
    create_context, evaluate, parse,
};
use pretty_assertions::assert_eq;

#[derive(Debug)]
struct Person {
    name: String,
    age: i32,
    active: bool,
    tags: Vec<String>,
}

fn person(name: &str, age: i32) -> Value {
    Value::object(
        "Person",
        Person {
            name: name.to_string(),
            age,
            active: true,
            tags: vec!["a".to_string(), "b".to_string()],
        },
    )
}

fn text(value: &Value) -> Result<String, HostError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| HostError::new(format!("expected a string, got {}", value.class_name())))
}

fn person_class() -> ClassDescriptor {
    ClassBuilder::new("Person")
        .method("getName", vec![], TypeRef::string(), |this, _| {
            Ok(Value::string(receiver::<Person>(this)?.name.clone()))
        })
        .method("setName", vec![TypeRef::string()], TypeRef::class("void"), |this, args| {
            receiver_mut::<Person>(this)?.name = text(&args[0])?;
            Ok(Value::Null)
        })
        .method("getAge", vec![], TypeRef::int(), |this, _| {
            Ok(Value::Int(receiver::<Person>(this)?.age))
        })
        .method("setAge", vec![TypeRef::int()], TypeRef::class("void"), |this, args| {
            let Value::Int(age) = args[0] else {
                return Err(HostError::new("setAge expects an int"));
            };
            receiver_mut::<Person>(this)?.age = age;
            Ok(Value::Null)
        })
        .method("isActive", vec![], TypeRef::boolean(), |this, _| {
            Ok(Value::Boolean(receiver::<Person>(this)?.active))
        })
        .method("getNickname", vec![], TypeRef::string(), |_, _| Ok(Value::Null))
        .method("getTag", vec![TypeRef::int()], TypeRef::string(), |this, args| {
            let i = args[0].as_index().unwrap_or(-1);
            let person = receiver::<Person>(this)?;
            usize::try_from(i)
                .ok()
                .and_then(|i| person.tags.get(i))
                .map(|tag| Value::string(tag.clone()))
                .ok_or_else(|| HostError::new(format!("no tag {}", i)))
        })
        .method(
            "setTag",
            vec![TypeRef::int(), TypeRef::string()],
            TypeRef::class("void"),
            |this, args| {
                let i = args[0].as_index().unwrap_or(-1);
                let tag = text(&args[1])?;
                let mut person = receiver_mut::<Person>(this)?;
                let slot = usize::try_from(i)
                    .ok()
                    .and_then(|i| person.tags.get_mut(i))
                    .ok_or_else(|| HostError::new(format!("no tag {}", i)))?;
                *slot = tag;
                Ok(Value::Null)
            },
        )
        .method("pick", vec![TypeRef::int()], TypeRef::string(), |_, _| {
            Ok(Value::string("int"))
        })
        .method("pick", vec![TypeRef::class("Integer")], TypeRef::string(), |_, _| {
            Ok(Value::string("Integer"))
        })
        .variadic_method(
            "join",
            vec![TypeRef::string(), TypeRef::array_of(TypeRef::string())],
            TypeRef::string(),
            |_, args| {
                let separator = text(&args[0])?;
                let parts = args[1]
                    .elements()
                    .ok_or_else(|| HostError::new("expected packed arguments"))?
                    .iter()
                    .map(text)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::string(parts.join(&separator)))
            },
        )
        .method(
            "print",
            vec![TypeRef::object(), TypeRef::string()],
            TypeRef::string(),
            |_, _| Ok(Value::string("object first")),
        )
        .method(
            "print",
            vec![TypeRef::string(), TypeRef::object()],
            TypeRef::string(),
            |_, _| Ok(Value::string("string first")),
        )
        .build()
}

fn registry() -> ClassRegistry {
    let mut registry = ClassRegistry::with_builtins();
    registry.register(person_class());
    registry
}

fn runtime() -> Arc<Runtime> {
    Arc::new(Runtime::builder().registry(registry()).build())
}

fn eval_with(runtime: &Arc<Runtime>, expr: &str, root: &Value) -> Result<Value, EvalError> {
    let node = parse(expr).unwrap();
    let mut ctx = Context::with_runtime(root.clone(), runtime.clone());
    evaluate(&node, &mut ctx, root)
}

fn eval(expr: &str, root: &Value) -> Result<Value, EvalError> {
    eval_with(&runtime(), expr, root)
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_getter_conventions() {
    let ann = person("Ann", 41);
    assert_eq!(eval("name", &ann), Ok(Value::string("Ann")));
    assert_eq!(eval("age", &ann), Ok(Value::Int(41)));
    assert_eq!(eval("active", &ann), Ok(Value::Boolean(true)));
    assert_eq!(eval("name.length()", &ann), Ok(Value::Int(3)));
}

#[test]
fn test_unknown_property() {
    assert_eq!(
        eval("height", &person("Ann", 41)),
        Err(EvalError::NoSuchProperty {
            class: "Person".to_string(),
            property: "height".to_string(),
        })
    );
}

#[test]
fn test_setter_writes_through() {
    let rt = runtime();
    let ann = person("Ann", 41);
    let node = parse("name").unwrap();
    let mut ctx = Context::with_runtime(ann.clone(), rt.clone());
    assign(&node, &mut ctx, &ann, Value::string("Bea")).unwrap();
    assert_eq!(eval_with(&rt, "name", &ann), Ok(Value::string("Bea")));
}

#[test]
fn test_setter_converts_long_to_int() {
    let rt = runtime();
    let ann = person("Ann", 41);
    let node = parse("age").unwrap();
    let mut ctx = Context::with_runtime(ann.clone(), rt.clone());
    assign(&node, &mut ctx, &ann, Value::Long(30)).unwrap();
    assert_eq!(eval_with(&rt, "age", &ann), Ok(Value::Int(30)));
}

#[test]
fn test_assignment_expression_on_host_object() {
    let rt = runtime();
    let ann = person("Ann", 41);
    assert_eq!(eval_with(&rt, "age = age + 1", &ann), Ok(Value::Int(42)));
    assert_eq!(eval_with(&rt, "age", &ann), Ok(Value::Int(42)));
}

#[test]
fn test_indexed_property() {
    let rt = runtime();
    let ann = person("Ann", 41);
    assert_eq!(eval_with(&rt, "tag[1]", &ann), Ok(Value::string("b")));

    let node = parse("tag[0]").unwrap();
    let mut ctx = Context::with_runtime(ann.clone(), rt.clone());
    assign(&node, &mut ctx, &ann, Value::string("z")).unwrap();
    assert_eq!(eval_with(&rt, "tag[0]", &ann), Ok(Value::string("z")));
}

#[test]
fn test_host_error_is_wrapped() {
    assert!(matches!(
        eval("tag[7]", &person("Ann", 41)),
        Err(EvalError::MethodInvocationFailed { method, source })
            if method == "Person.getTag" && source.message() == "no tag 7"
    ));
}

#[test]
fn test_getter_type_is_recorded() {
    let ann = person("Ann", 41);
    let node = parse("age").unwrap();
    let mut ctx = Context::with_runtime(ann.clone(), runtime());
    evaluate(&node, &mut ctx, &ann).unwrap();
    assert_eq!(node.getter_type(), Some(&TypeRef::int()));
}

// ============================================================================
// Overloads
// ============================================================================

#[test]
fn test_exact_primitive_beats_boxing() {
    let rt = runtime();
    let ann = person("Ann", 41);
    assert_eq!(eval_with(&rt, "pick(1)", &ann), Ok(Value::string("int")));
    // served from the decision cache the second time
    assert_eq!(eval_with(&rt, "pick(2)", &ann), Ok(Value::string("int")));
}

#[test]
fn test_variadic_call_packs_trailing_arguments() {
    let ann = person("Ann", 41);
    assert_eq!(
        eval(r#"join("-", "x", "y", "z")"#, &ann),
        Ok(Value::string("x-y-z"))
    );
    assert_eq!(eval(r#"join("-")"#, &ann), Ok(Value::string("")));
}

#[test]
fn test_ambiguous_overload_prefers_first_by_default() {
    assert_eq!(
        eval(r#"print("a", "b")"#, &person("Ann", 41)),
        Ok(Value::string("object first"))
    );
}

#[test]
fn test_ambiguous_overload_rejected_when_configured() {
    let rt = Arc::new(
        Runtime::builder()
            .registry(registry())
            .config(RuntimeConfig::new().with_ambiguity(AmbiguityPolicy::Reject))
            .build(),
    );
    let result = eval_with(&rt, r#"print("a", "b")"#, &person("Ann", 41));
    assert!(matches!(
        result,
        Err(EvalError::AmbiguousMethod { ref method, ref candidates })
            if method == "Person.print" && candidates.contains("print(String, Object)")
    ));
}

#[test]
fn test_no_matching_overload() {
    assert_eq!(
        eval("pick({1})", &person("Ann", 41)),
        Err(EvalError::NoSuchMethod {
            class: "Person".to_string(),
            method: "pick".to_string(),
            args: "ArrayList".to_string(),
        })
    );
}

// ============================================================================
// Caching
// ============================================================================

struct CountingResolver {
    inner: ClassRegistry,
    lookups: AtomicUsize,
}

impl MemberResolver for CountingResolver {
    fn class(&self, name: &str) -> Option<Arc<ClassDescriptor>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.class(name)
    }
}

#[test]
fn test_failed_lookup_is_cached_until_cleared() {
    let resolver = Arc::new(CountingResolver {
        inner: registry(),
        lookups: AtomicUsize::new(0),
    });
    let rt = Arc::new(Runtime::builder().resolver(resolver.clone()).build());
    let ann = person("Ann", 41);

    assert!(matches!(
        eval_with(&rt, "frobnicate()", &ann),
        Err(EvalError::NoSuchMethod { .. })
    ));
    let after_first = resolver.lookups.load(Ordering::SeqCst);
    assert!(after_first > 0);

    assert!(eval_with(&rt, "frobnicate()", &ann).is_err());
    assert_eq!(resolver.lookups.load(Ordering::SeqCst), after_first);

    rt.clear_caches();
    assert!(eval_with(&rt, "frobnicate()", &ann).is_err());
    assert!(resolver.lookups.load(Ordering::SeqCst) > after_first);
}

// ============================================================================
// Extension points
// ============================================================================

struct Placeholder;

impl NullHandler for Placeholder {
    fn null_method_result(&self, _ctx: &Context, _target: &Value, method: &str, _args: &[Value]) -> Option<Value> {
        Some(Value::string(format!("no result from {}", method)))
    }

    fn null_property_value(&self, _ctx: &Context, _target: &Value, property: &str) -> Option<Value> {
        Some(Value::string(format!("no {}", property)))
    }
}

#[test]
fn test_null_handler_replaces_null_results() {
    let rt = Arc::new(
        Runtime::builder()
            .registry(registry())
            .null_handler("Person", Arc::new(Placeholder))
            .build(),
    );
    let ann = person("Ann", 41);
    assert_eq!(eval_with(&rt, "nickname", &ann), Ok(Value::string("no nickname")));
    assert_eq!(
        eval_with(&rt, "getNickname()", &ann),
        Ok(Value::string("no result from getNickname"))
    );
    // non-null results pass through untouched
    assert_eq!(eval_with(&rt, "name", &ann), Ok(Value::string("Ann")));
}

#[test]
fn test_deny_list_blocks_member() {
    let rt = Arc::new(
        Runtime::builder()
            .registry(registry())
            .member_access(Arc::new(DenyList::new().deny("Person", "getAge")))
            .build(),
    );
    let ann = person("Ann", 41);
    assert_eq!(
        eval_with(&rt, "age", &ann),
        Err(EvalError::AccessDenied {
            class: "Person".to_string(),
            member: "getAge".to_string(),
        })
    );
    assert_eq!(
        eval_with(&rt, "getAge()", &ann),
        Err(EvalError::AccessDenied {
            class: "Person".to_string(),
            member: "getAge".to_string(),
        })
    );
    assert_eq!(eval_with(&rt, "name", &ann), Ok(Value::string("Ann")));
}

struct Constant(i32);

impl CompiledAccessor for Constant {
    fn get(&self, _ctx: &mut Context, _node: &Node, _root: &Value) -> Result<Value, EvalError> {
        Ok(Value::Int(self.0))
    }

    fn set(&self, ctx: &mut Context, _node: &Node, _root: &Value, value: Value) -> Result<(), EvalError> {
        ctx.put("compiled", value);
        Ok(())
    }
}

#[test]
fn test_compiled_accessor_replaces_walk() {
    let rt = runtime();
    let ann = person("Ann", 41);
    let node = parse("age").unwrap();
    rt.register_compiled(node.id(), Arc::new(Constant(7)));

    let mut ctx = Context::with_runtime(ann.clone(), rt.clone());
    assert_eq!(evaluate(&node, &mut ctx, &ann), Ok(Value::Int(7)));
    assign(&node, &mut ctx, &ann, Value::Int(1)).unwrap();
    assert_eq!(ctx.get("compiled"), Some(&Value::Int(1)));

    // a separately parsed node has its own id
    assert_eq!(eval_with(&rt, "age", &ann), Ok(Value::Int(41)));
}

#[derive(Default)]
struct Recording {
    seen: Mutex<Vec<String>>,
}

impl PropertyAccessor for Recording {
    fn get_property(&self, ctx: &Context, _target: &Value, key: PropertyKey<'_>) -> Result<Value, EvalError> {
        let current = ctx.current_object().map(|v| v.class_name().to_string());
        self.seen
            .lock()
            .unwrap()
            .push(format!("{}:{}", current.unwrap_or_default(), key));
        Ok(Value::string("custom"))
    }

    fn set_property(
        &self,
        _ctx: &Context,
        _target: &Value,
        _key: PropertyKey<'_>,
        _value: Value,
    ) -> Result<(), EvalError> {
        Ok(())
    }
}

#[test]
fn test_custom_accessor_sees_current_object() {
    let recording = Arc::new(Recording::default());
    let rt = Arc::new(
        Runtime::builder()
            .registry(registry())
            .accessor("Person", recording.clone())
            .build(),
    );
    let ann = person("Ann", 41);
    assert_eq!(eval_with(&rt, "anything", &ann), Ok(Value::string("custom")));
    assert_eq!(*recording.seen.lock().unwrap(), vec!["Person:anything".to_string()]);
}

#[derive(Default)]
struct TypeRecording {
    seen: Mutex<Vec<(String, Option<TypeRef>)>>,
}

impl PropertyAccessor for TypeRecording {
    fn get_property(&self, ctx: &Context, _target: &Value, key: PropertyKey<'_>) -> Result<Value, EvalError> {
        self.seen
            .lock()
            .unwrap()
            .push((key.to_string(), ctx.current_type().cloned()));
        Ok(Value::Int(1))
    }

    fn set_property(
        &self,
        _ctx: &Context,
        _target: &Value,
        _key: PropertyKey<'_>,
        _value: Value,
    ) -> Result<(), EvalError> {
        Ok(())
    }
}

#[test]
fn test_sibling_arguments_start_from_the_same_cursors() {
    let recording = Arc::new(TypeRecording::default());
    let rt = Arc::new(
        Runtime::builder()
            .registry(registry())
            .accessor("Person", recording.clone())
            .build(),
    );
    let ann = person("Ann", 41);
    assert_eq!(eval_with(&rt, "@Math@max(left, right)", &ann), Ok(Value::Int(1)));
    assert_eq!(
        *recording.seen.lock().unwrap(),
        vec![("left".to_string(), None), ("right".to_string(), None)]
    );
}

// ============================================================================
// Context
// ============================================================================

#[test]
fn test_cursors_after_evaluation() {
    let ann = person("Ann", 41);
    let node = parse("name").unwrap();
    let mut ctx = Context::with_runtime(ann.clone(), runtime());
    evaluate(&node, &mut ctx, &ann).unwrap();
    assert_eq!(ctx.current_object(), None);
    assert_eq!(ctx.current_type(), Some(&TypeRef::string()));

    ctx.reset_cursors();
    assert_eq!(ctx.current_type(), None);
}

#[test]
fn test_trace_records_tree() {
    let node = parse("1 + 2").unwrap();
    let mut ctx = Context::with_runtime(Value::Null, runtime());
    ctx.enable_trace();
    evaluate(&node, &mut ctx, &Value::Null).unwrap();

    let tree = ctx.take_evaluation().unwrap();
    assert_eq!(tree.node, "1 + 2");
    assert_eq!(tree.result, Some(Value::Int(3)));
    assert!(!tree.set_operation);
    assert_eq!(tree.count(), 3);
}

#[test]
fn test_trace_enabled_by_config() {
    let rt = Arc::new(
        Runtime::builder()
            .registry(registry())
            .config(RuntimeConfig::new().with_trace(true))
            .build(),
    );
    let ann = person("Ann", 41);
    let node = parse("name").unwrap();
    let mut ctx = Context::with_runtime(ann.clone(), rt);
    assert!(ctx.is_tracing());
    evaluate(&node, &mut ctx, &ann).unwrap();
    assert_eq!(ctx.last_evaluation().map(|e| e.node.as_str()), Some("name"));
}

#[test]
fn test_argument_buffers_are_reused() {
    let ann = person("Ann", 41);
    let node = parse("name.length()").unwrap();
    let mut ctx = Context::with_runtime(ann.clone(), runtime());
    evaluate(&node, &mut ctx, &ann).unwrap();
    evaluate(&node, &mut ctx, &ann).unwrap();
    assert!(ctx.pool().reused() >= 1);
    assert!(ctx.pool().available() >= 1);
}

#[test]
fn test_create_context_with_resolver() {
    let ann = person("Ann", 41);
    let node = parse("name").unwrap();
    let mut ctx = create_context(ann.clone(), Some(Arc::new(registry())), None);
    assert_eq!(evaluate(&node, &mut ctx, &ann), Ok(Value::string("Ann")));
}

// ============================================================================
// Fields, statics and constructors
// ============================================================================

struct Counter {
    count: i64,
}

fn counter_class() -> ClassDescriptor {
    ClassBuilder::new("Counter")
        .constructor(vec![], |_| Ok(Value::object("Counter", Counter { count: 0 })))
        .constructor(vec![TypeRef::long()], |args| {
            let Value::Long(start) = args[0] else {
                return Err(HostError::new("expected a long"));
            };
            Ok(Value::object("Counter", Counter { count: start }))
        })
        .mutable_field(
            "count",
            TypeRef::long(),
            |this| Ok(Value::Long(receiver::<Counter>(this)?.count)),
            |this, value| {
                let Value::Long(count) = value else {
                    return Err(HostError::new("expected a long"));
                };
                receiver_mut::<Counter>(this)?.count = count;
                Ok(())
            },
        )
        .static_field("LIMIT", TypeRef::long(), || Value::Long(10))
        .static_method("twice", vec![TypeRef::long()], TypeRef::long(), |args| match args[0] {
            Value::Long(n) => Ok(Value::Long(n * 2)),
            _ => Err(HostError::new("expected a long")),
        })
        .build()
}

fn counter_runtime() -> Arc<Runtime> {
    let mut registry = registry();
    registry.register(counter_class());
    Arc::new(Runtime::builder().registry(registry).build())
}

#[test]
fn test_constructor_widens_argument() {
    let rt = counter_runtime();
    assert_eq!(eval_with(&rt, "new Counter().count", &Value::Null), Ok(Value::Long(0)));
    assert_eq!(eval_with(&rt, "new Counter(5).count", &Value::Null), Ok(Value::Long(5)));
}

#[test]
fn test_mutable_field_is_written() {
    let rt = counter_runtime();
    assert_eq!(
        eval_with(&rt, "#c = new Counter(), #c.count = 3, #c.count", &Value::Null),
        Ok(Value::Long(3))
    );
}

#[test]
fn test_static_members() {
    let rt = counter_runtime();
    assert_eq!(eval_with(&rt, "@Counter@LIMIT", &Value::Null), Ok(Value::Long(10)));
    assert_eq!(eval_with(&rt, "@Counter@twice(4)", &Value::Null), Ok(Value::Long(8)));
    assert!(matches!(
        eval_with(&rt, "@Counter@LIMIT2", &Value::Null),
        Err(EvalError::NoSuchProperty { .. })
    ));
}

#[test]
fn test_null_handler_registered_after_startup() {
    let rt = runtime();
    let ann = person("Ann", 41);
    assert_eq!(eval_with(&rt, "nickname", &ann), Ok(Value::Null));
    rt.register_null_handler("Person", Arc::new(Placeholder));
    assert_eq!(eval_with(&rt, "nickname", &ann), Ok(Value::string("no nickname")));
}

#[test]
fn test_context_exposes_runtime_resolver() {
    let ctx = Context::with_runtime(Value::Null, counter_runtime());
    assert!(ctx.member_resolver().class("Counter").is_some());
    assert!(ctx.member_resolver().class("java.util.ArrayList").is_some());
    assert!(ctx.member_resolver().class("Nope").is_none());
}

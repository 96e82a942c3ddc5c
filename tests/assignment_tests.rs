// tests/assignment_tests.rs

use std::collections::HashMap;
use std::sync::Arc;

use graphnav_lang::{
    Context, EvalError, Runtime, TypeRef, Value, assign, evaluate, parse,
};
use pretty_assertions::assert_eq;

fn context(root: &Value) -> Context {
    Context::with_runtime(root.clone(), Arc::new(Runtime::builder().build()))
}

fn set(expr: &str, root: &Value, value: Value) -> Result<(), EvalError> {
    let node = parse(expr).unwrap();
    let mut ctx = context(root);
    assign(&node, &mut ctx, root, value)
}

fn get(expr: &str, root: &Value) -> Value {
    let node = parse(expr).unwrap();
    let mut ctx = context(root);
    evaluate(&node, &mut ctx, root).unwrap()
}

fn object(pairs: Vec<(&str, Value)>) -> Value {
    let mut map = HashMap::new();
    for (k, v) in pairs {
        map.insert(k.to_string(), v);
    }
    Value::map(map)
}

fn ints(values: &[i32]) -> Value {
    Value::list(values.iter().map(|n| Value::Int(*n)).collect())
}

// ============================================================================
// Maps and lists
// ============================================================================

#[test]
fn test_set_map_entry() {
    let root = object(vec![]);
    set("name", &root, Value::string("ann")).unwrap();
    assert_eq!(get("name", &root), Value::string("ann"));
}

#[test]
fn test_set_nested_entry_mutates_shared_graph() {
    let item = object(vec![("name", Value::string("old"))]);
    let root = object(vec![("bean", object(vec![("items", Value::list(vec![item.clone()]))]))]);

    set("bean.items[0].name", &root, Value::string("new")).unwrap();

    assert_eq!(get("name", &item), Value::string("new"));
}

#[test]
fn test_set_list_element() {
    let root = object(vec![("items", ints(&[1, 2, 3]))]);
    set("items[1]", &root, Value::Int(20)).unwrap();
    set("items[#LAST]", &root, Value::Int(30)).unwrap();
    assert_eq!(get("items", &root), ints(&[1, 20, 30]));
}

#[test]
fn test_dynamic_subscript_on_empty_list_is_a_no_op() {
    let root = object(vec![("bean", object(vec![("items", ints(&[]))]))]);
    set("bean.items[#LAST]", &root, Value::Int(1)).unwrap();
    set("bean.items[#FIRST]", &root, Value::Int(1)).unwrap();
    assert_eq!(get("bean.items", &root), ints(&[]));
}

#[test]
fn test_set_out_of_range_index_fails() {
    let root = object(vec![("items", ints(&[1]))]);
    assert_eq!(
        set("items[3]", &root, Value::Int(0)),
        Err(EvalError::IndexOutOfBounds { index: 3, len: 1 })
    );
}

#[test]
fn test_set_all_replaces_contents() {
    let list = ints(&[1, 2, 3]);
    let root = object(vec![("items", list.clone())]);
    set("items[#ALL]", &root, ints(&[9, 8])).unwrap();
    assert_eq!(list, ints(&[9, 8]));
}

#[test]
fn test_set_all_requires_a_collection() {
    let root = object(vec![("items", ints(&[1]))]);
    assert!(matches!(
        set("items[#ALL]", &root, Value::Int(5)),
        Err(EvalError::TypeConversionFailed { .. })
    ));
}

#[test]
fn test_set_array_element_converts_to_component() {
    let array = Value::array(TypeRef::long(), vec![Value::Long(0), Value::Long(0)]);
    let root = object(vec![("slots", array.clone())]);
    set("slots[1]", &root, Value::Int(7)).unwrap();
    assert_eq!(
        array,
        Value::array(TypeRef::long(), vec![Value::Long(0), Value::Long(7)])
    );
}

#[test]
fn test_set_with_computed_key() {
    let root = object(vec![("key", Value::string("k")), ("table", object(vec![]))]);
    set("table[key]", &root, Value::Int(1)).unwrap();
    assert_eq!(get("table.k", &root), Value::Int(1));
}

// ============================================================================
// Variables and root
// ============================================================================

#[test]
fn test_set_variable() {
    let node = parse("#total").unwrap();
    let mut ctx = context(&Value::Null);
    assign(&node, &mut ctx, &Value::Null, Value::Int(3)).unwrap();
    assert_eq!(ctx.get("total"), Some(&Value::Int(3)));
    assert_eq!(evaluate(&node, &mut ctx, &Value::Null), Ok(Value::Int(3)));
}

#[test]
fn test_set_root_replaces_context_root() {
    let node = parse("#root").unwrap();
    let mut ctx = context(&Value::Null);
    assign(&node, &mut ctx, &Value::Null, Value::Int(1)).unwrap();
    assert_eq!(ctx.root(), &Value::Int(1));
}

#[test]
fn test_assignment_expression_evaluates_to_value() {
    let root = object(vec![]);
    assert_eq!(get("count = 2 + 3", &root), Value::Int(5));
    assert_eq!(get("count", &root), Value::Int(5));
}

#[test]
fn test_set_through_sequence_writes_last_item() {
    let root = object(vec![]);
    let node = parse("#seen = 1, name").unwrap();
    let mut ctx = context(&root);
    assign(&node, &mut ctx, &root, Value::string("x")).unwrap();
    assert_eq!(ctx.get("seen"), Some(&Value::Int(1)));
    assert_eq!(get("name", &root), Value::string("x"));
}

// ============================================================================
// Invalid targets
// ============================================================================

#[test]
fn test_invalid_assignment_targets() {
    let root = object(vec![("a", object(vec![]))]);
    assert_eq!(
        set("1 + 2", &root, Value::Int(0)),
        Err(EvalError::InvalidAssignmentTarget("1 + 2".to_string()))
    );
    assert_eq!(
        set("a.size()", &root, Value::Int(0)),
        Err(EvalError::InvalidAssignmentTarget("size()".to_string()))
    );
    assert!(matches!(
        set("{1, 2}", &root, Value::Int(0)),
        Err(EvalError::InvalidAssignmentTarget(_))
    ));
}

#[test]
fn test_set_through_null_fails() {
    let root = object(vec![]);
    assert_eq!(
        set("missing.name", &root, Value::Int(0)),
        Err(EvalError::NullSource("name".to_string()))
    );
}

#[test]
fn test_assignment_records_setter_type() {
    let root = object(vec![]);
    let node = parse("value").unwrap();
    let mut ctx = context(&root);
    assert_eq!(node.setter_type(), None);
    assign(&node, &mut ctx, &root, Value::Double(1.5)).unwrap();
    assert_eq!(node.setter_type(), Some(&TypeRef::double()));
    evaluate(&node, &mut ctx, &root).unwrap();
    assert_eq!(node.getter_type(), Some(&TypeRef::double()));
}

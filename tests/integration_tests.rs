// tests/integration_tests.rs

use std::collections::HashMap;
use std::sync::Arc;

use graphnav_lang::{
    Context, EvalError, Runtime, TypeRef, Value, evaluate, get_value, parse, set_value,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

fn runtime() -> Arc<Runtime> {
    Arc::new(Runtime::builder().build())
}

fn eval(expr: &str, root: &Value) -> Result<Value, EvalError> {
    let node = parse(expr).unwrap();
    let mut ctx = Context::with_runtime(root.clone(), runtime());
    evaluate(&node, &mut ctx, root)
}

fn eval_ok(expr: &str, root: &Value) -> Value {
    eval(expr, root).unwrap_or_else(|e| panic!("{} failed: {}", expr, e))
}

fn calc(expr: &str) -> Value {
    eval_ok(expr, &Value::Null)
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

fn strings(values: &[&str]) -> Value {
    Value::list(values.iter().map(|s| Value::string(*s)).collect())
}

fn bean_with(items: Vec<Value>) -> Value {
    object(vec![("bean", object(vec![("items", Value::list(items))]))])
}

fn named(name: &str) -> Value {
    object(vec![("name", Value::string(name))])
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_mixed_int_and_double() {
    assert_eq!(calc("1 + 2.0"), Value::Double(3.0));
    assert_eq!(calc("7 / 2.0"), Value::Double(3.5));
}

#[test]
fn test_integer_division_truncates() {
    assert_eq!(calc("5 / 2"), Value::Int(2));
    assert_eq!(calc("-7 / 2"), Value::Int(-3));
    assert_eq!(calc("-7 % 3"), Value::Int(-1));
}

#[test]
fn test_integer_division_by_zero_fails() {
    assert!(matches!(eval("5 % 0", &Value::Null), Err(EvalError::Arithmetic(_))));
    assert!(matches!(eval("5 / 0", &Value::Null), Err(EvalError::Arithmetic(_))));
    assert!(matches!(eval("5L / 0L", &Value::Null), Err(EvalError::Arithmetic(_))));
}

#[test]
fn test_float_division_by_zero_is_infinite() {
    assert_eq!(calc("5.0 / 0.0"), Value::Double(f64::INFINITY));
    assert_eq!(calc("-5.0 / 0.0"), Value::Double(f64::NEG_INFINITY));
}

#[test]
fn test_promotion_to_widest_operand() {
    assert_eq!(calc("1 + 1L"), Value::Long(2));
    assert_eq!(calc("2B * 3"), Value::BigInteger(6));
    assert_eq!(calc("10.25H * 2"), Value::BigDecimal(Decimal::new(2050, 2)));
    assert_eq!(calc("1.5F + 1"), Value::Float(2.5));
}

#[test]
fn test_int_overflow_wraps() {
    assert_eq!(calc("2147483647 + 1"), Value::Int(i32::MIN));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(calc("'ab' + 1"), Value::string("ab1"));
    assert_eq!(calc("1 + 2 + 'x'"), Value::string("3x"));
    assert_eq!(calc("\"x\" + 1 + 2"), Value::string("x12"));
    assert_eq!(calc("'x' + 1"), Value::Int(121));
    assert_eq!(calc("'v=' + null"), Value::string("v=null"));
}

#[test]
fn test_null_operand_in_arithmetic_fails() {
    assert!(matches!(
        eval("1 + null", &Value::Null),
        Err(EvalError::TypeConversionFailed { .. })
    ));
}

#[test]
fn test_unary_operators() {
    assert_eq!(calc("-(2 + 3)"), Value::Int(-5));
    assert_eq!(calc("!0"), Value::Boolean(true));
    assert_eq!(calc("~0"), Value::Int(-1));
    assert_eq!(calc("!''"), Value::Boolean(false));
}

#[test]
fn test_bitwise_and_shifts() {
    assert_eq!(calc("6 & 3"), Value::Int(2));
    assert_eq!(calc("6 | 3"), Value::Int(7));
    assert_eq!(calc("6 ^ 3"), Value::Int(5));
    assert_eq!(calc("6 band 3"), Value::Int(2));
    assert_eq!(calc("1 << 4"), Value::Int(16));
    assert_eq!(calc("-16 >> 2"), Value::Int(-4));
    assert_eq!(calc("-1 >>> 28"), Value::Int(15));
    assert_eq!(calc("true ^ true"), Value::Boolean(false));
}

// ============================================================================
// Comparison and logic
// ============================================================================

#[test]
fn test_numeric_equality_across_types() {
    assert_eq!(calc("1 == 1.0"), Value::Boolean(true));
    assert_eq!(calc("1 == 1L"), Value::Boolean(true));
    assert_eq!(calc("1 eq 2"), Value::Boolean(false));
    assert_eq!(calc("null == null"), Value::Boolean(true));
    assert_eq!(calc("'a' == \"a\""), Value::Boolean(true));
}

#[test]
fn test_ordering() {
    assert_eq!(calc("3 > 2.5"), Value::Boolean(true));
    assert_eq!(calc("2 <= 2"), Value::Boolean(true));
    assert_eq!(calc("'abc' < 'abd'"), Value::Boolean(true));
    assert_eq!(calc("3 gte 4"), Value::Boolean(false));
}

#[test]
fn test_logical_operators_yield_deciding_operand() {
    assert_eq!(calc("0 || 'fallback'"), Value::string("fallback"));
    assert_eq!(calc("'' && 5"), Value::Int(5));
    assert_eq!(calc("null && 5"), Value::Null);
    assert_eq!(calc("1 or 2"), Value::Int(1));
}

#[test]
fn test_short_circuit_skips_right_operand() {
    assert_eq!(calc("false && 1 / 0"), Value::Boolean(false));
    assert_eq!(calc("true || 1 / 0"), Value::Boolean(true));
}

#[test]
fn test_membership() {
    assert_eq!(calc("2 in {1, 2, 3}"), Value::Boolean(true));
    assert_eq!(calc("4 not in {1, 2, 3}"), Value::Boolean(true));
    assert_eq!(calc("'ell' in 'hello'"), Value::Boolean(true));
    assert_eq!(calc("1 in null"), Value::Boolean(false));
    assert_eq!(calc("'a' in #{'a': 1}"), Value::Boolean(true));
}

#[test]
fn test_ternary_evaluates_one_branch() {
    assert_eq!(calc("true ? 1 : 1 / 0"), Value::Int(1));
    assert_eq!(calc("false ? 1 / 0 : 2"), Value::Int(2));
    assert_eq!(calc("0 ? 'yes' : 'no'"), Value::string("no"));
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_last_item_name() {
    let root = bean_with(vec![named("first"), named("second"), named("third")]);
    assert_eq!(eval_ok("bean.items[#LAST].name", &root), Value::string("third"));
    assert_eq!(eval_ok("bean.items[#FIRST].name", &root), Value::string("first"));
    assert_eq!(eval_ok("bean.items[$].name", &root), Value::string("third"));
    assert_eq!(eval_ok("bean.items[^].name", &root), Value::string("first"));
    assert_eq!(eval_ok("bean.items[1].name", &root), Value::string("second"));
}

#[test]
fn test_mid_subscript() {
    let root = object(vec![("items", ints(&[1, 2, 3, 4, 5]))]);
    assert_eq!(eval_ok("items[#MID]", &root), Value::Int(3));
    assert_eq!(eval_ok("items[|]", &root), Value::Int(3));
}

#[test]
fn test_all_subscript_reads_a_copy() {
    let root = object(vec![("items", ints(&[1, 2]))]);
    assert_eq!(eval_ok("items[#ALL]", &root), ints(&[1, 2]));
    assert_eq!(eval_ok("#copy = items[#ALL], #copy.add(3), items", &root), ints(&[1, 2]));
}

#[test]
fn test_all_subscript_on_array_reads_a_copy() {
    assert_eq!(calc("#a = new int[] {1, 2}, #b = #a[#ALL], #b[0] = 9, #a[0]"), Value::Int(1));
    assert_eq!(calc("#a = new int[] {1, 2}, #b = #a[#ALL], #b[0] = 9, #b[0]"), Value::Int(9));
}

#[test]
fn test_dynamic_subscript_on_empty_list_reads_null() {
    let root = bean_with(vec![]);
    assert_eq!(eval_ok("bean.items[#LAST]", &root), Value::Null);
    assert_eq!(eval_ok("bean.items[#FIRST]", &root), Value::Null);
}

#[test]
fn test_index_out_of_bounds() {
    let root = bean_with(vec![named("only")]);
    assert_eq!(
        eval("bean.items[5]", &root),
        Err(EvalError::IndexOutOfBounds { index: 5, len: 1 })
    );
    assert!(matches!(
        eval("bean.items[-1]", &root),
        Err(EvalError::IndexOutOfBounds { index: -1, .. })
    ));
}

#[test]
fn test_map_navigation() {
    let root = object(vec![("user", object(vec![("age", Value::Int(30))]))]);
    assert_eq!(eval_ok("user.age", &root), Value::Int(30));
    assert_eq!(eval_ok("user['age']", &root), Value::Int(30));
    assert_eq!(eval_ok("user.missing", &root), Value::Null);
    assert_eq!(eval_ok("user.size", &root), Value::Int(1));
}

#[test]
fn test_map_entry_shadows_special_name() {
    let root = object(vec![("size", Value::string("XL"))]);
    assert_eq!(eval_ok("size", &root), Value::string("XL"));
}

#[test]
fn test_navigation_from_null_fails() {
    let root = object(vec![]);
    assert_eq!(eval("nothing.name", &root), Err(EvalError::NullSource("name".to_string())));
    assert!(matches!(eval("nothing.size()", &root), Err(EvalError::NullSource(_))));
}

#[test]
fn test_index_key_is_read_from_root() {
    let root = object(vec![
        ("key", Value::string("b")),
        ("table", object(vec![("a", Value::Int(1)), ("b", Value::Int(2))])),
    ]);
    assert_eq!(eval_ok("table[key]", &root), Value::Int(2));
}

#[test]
fn test_this_and_root() {
    let root = object(vec![("n", Value::Int(4))]);
    assert_eq!(eval_ok("#this.n", &root), Value::Int(4));
    assert_eq!(eval_ok("n.{ #root.n + #this }", &root), Value::list(vec![Value::Int(8)]));
}

#[test]
fn test_collection_properties() {
    let root = object(vec![("items", ints(&[3, 1, 2]))]);
    assert_eq!(eval_ok("items.size", &root), Value::Int(3));
    assert_eq!(eval_ok("items.isEmpty", &root), Value::Boolean(false));
    assert_eq!(eval_ok("items.size()", &root), Value::Int(3));
    assert_eq!(eval_ok("items.get(1)", &root), Value::Int(1));
    assert_eq!(eval_ok("items.contains(2)", &root), Value::Boolean(true));
    assert_eq!(eval_ok("items.iterator.next", &root), Value::Int(3));
}

// ============================================================================
// Variables and sequences
// ============================================================================

#[test]
fn test_variables() {
    let node = parse("#limit * 2").unwrap();
    let mut ctx = Context::with_runtime(Value::Null, runtime());
    ctx.put("limit", Value::Int(21));
    assert_eq!(evaluate(&node, &mut ctx, &Value::Null), Ok(Value::Int(42)));
}

#[test]
fn test_unbound_variable_reads_null() {
    assert_eq!(calc("#nothing"), Value::Null);
}

#[test]
fn test_variable_assignment_round_trip() {
    let mut ctx = Context::with_runtime(Value::Null, runtime());
    let set = parse("#x = 5").unwrap();
    assert_eq!(evaluate(&set, &mut ctx, &Value::Null), Ok(Value::Int(5)));
    assert_eq!(ctx.get("x"), Some(&Value::Int(5)));

    let clear = parse("#x = null").unwrap();
    evaluate(&clear, &mut ctx, &Value::Null).unwrap();
    assert_eq!(ctx.get("x"), Some(&Value::Null));
    assert!(ctx.contains("x"));
}

#[test]
fn test_sequence_yields_last_value() {
    assert_eq!(calc("#a = 2, #b = 3, #a * #b"), Value::Int(6));
}

// ============================================================================
// Collections
// ============================================================================

#[test]
fn test_list_and_map_literals() {
    assert_eq!(calc("{1, 'two', 3.0}"), Value::list(vec![
        Value::Int(1),
        Value::string("two"),
        Value::Double(3.0),
    ]));
    assert_eq!(
        calc("#{'a': 1, 'bb': 1 + 1}"),
        object(vec![("a", Value::Int(1)), ("bb", Value::Int(2))])
    );
}

#[test]
fn test_projection() {
    assert_eq!(calc("{1, 2, 3}.{ #this * 2 }"), ints(&[2, 4, 6]));

    let root = object(vec![("people", Value::list(vec![named("ann"), named("bob")]))]);
    assert_eq!(eval_ok("people.{ name }", &root), strings(&["ann", "bob"]));
}

#[test]
fn test_projection_over_map_entries() {
    assert_eq!(calc("#{'b': 2, 'a': 1}.{ key }"), strings(&["a", "b"]));
    assert_eq!(calc("#{'b': 2, 'a': 1}.{ value }"), ints(&[1, 2]));
}

#[test]
fn test_selection() {
    assert_eq!(calc("{1, 2, 3, 4}.{? #this % 2 == 0}"), ints(&[2, 4]));
    assert_eq!(calc("{1, 2, 3, 4}.{^ #this % 2 == 0}"), ints(&[2]));
    assert_eq!(calc("{1, 2, 3, 4}.{$ #this % 2 == 0}"), ints(&[4]));
    assert_eq!(calc("{1, 3}.{? #this % 2 == 0}"), ints(&[]));
}

#[test]
fn test_selection_then_projection() {
    let root = object(vec![(
        "orders",
        Value::list(vec![
            object(vec![("paid", Value::Boolean(true)), ("amount", Value::Int(10))]),
            object(vec![("paid", Value::Boolean(false)), ("amount", Value::Int(20))]),
            object(vec![("paid", Value::Boolean(true)), ("amount", Value::Int(30))]),
        ]),
    )]);
    assert_eq!(eval_ok("orders.{? paid }.{ amount }", &root), ints(&[10, 30]));
}

#[test]
fn test_projection_of_null_is_empty() {
    assert_eq!(eval_ok("missing.{ #this }", &object(vec![])), ints(&[]));
}

// ============================================================================
// Methods, statics and constructors
// ============================================================================

#[test]
fn test_string_methods() {
    assert_eq!(calc("'hello'.length()"), Value::Int(5));
    assert_eq!(calc("'Hello'.toUpperCase()"), Value::string("HELLO"));
    assert_eq!(calc("'hello'.substring(1, 3)"), Value::string("el"));
    assert_eq!(calc("'hello'.startsWith('he')"), Value::Boolean(true));
}

#[test]
fn test_method_arguments_are_read_from_root() {
    let root = object(vec![
        ("word", Value::string("graph")),
        ("n", Value::Int(2)),
    ]);
    assert_eq!(eval_ok("word.substring(n)", &root), Value::string("aph"));
}

#[test]
fn test_unknown_method() {
    let err = calc_err("'abc'.frobnicate(1)");
    assert_eq!(
        err,
        EvalError::NoSuchMethod {
            class: "String".to_string(),
            method: "frobnicate".to_string(),
            args: "int".to_string(),
        }
    );
}

fn calc_err(expr: &str) -> EvalError {
    eval(expr, &Value::Null).unwrap_err()
}

#[test]
fn test_static_math() {
    assert_eq!(calc("@Math@max(3, 7)"), Value::Int(7));
    assert_eq!(calc("@Math@max(3, 7.5)"), Value::Double(7.5));
    assert_eq!(calc("@Math@max(3L, 7)"), Value::Long(7));
    assert_eq!(calc("@Math@abs(-5)"), Value::Int(5));
    assert_eq!(calc("@Math@PI"), Value::Double(std::f64::consts::PI));
    assert_eq!(calc("@java.lang.Math@min(2, 1)"), Value::Int(1));
}

#[test]
fn test_static_parse() {
    assert_eq!(calc("@Integer@parseInt(\"42\") + 1"), Value::Int(43));
}

#[test]
fn test_unknown_static_member() {
    assert!(matches!(calc_err("@Math@nope()"), EvalError::NoSuchMethod { .. }));
    assert!(matches!(calc_err("@Math@TAU"), EvalError::NoSuchProperty { .. }));
}

#[test]
fn test_constructors() {
    assert_eq!(calc("new ArrayList()"), Value::list(vec![]));
    assert_eq!(calc("new java.util.ArrayList({1, 2})"), ints(&[1, 2]));
}

#[test]
fn test_array_construction() {
    assert_eq!(
        calc("new int[3]"),
        Value::array(TypeRef::int(), vec![Value::Int(0); 3])
    );
    assert_eq!(
        calc("new int[] {1, 2}"),
        Value::array(TypeRef::int(), vec![Value::Int(1), Value::Int(2)])
    );
    assert_eq!(
        calc("new long[] {1, 2}"),
        Value::array(TypeRef::long(), vec![Value::Long(1), Value::Long(2)])
    );
    assert_eq!(calc("new String[] {'ab', 'cd'}.length"), Value::Int(2));
}

#[test]
fn test_negative_array_size() {
    assert!(matches!(calc_err("new int[-1]"), EvalError::Arithmetic(_)));
}

#[test]
fn test_oversized_array_fails_without_allocating() {
    assert!(matches!(calc_err("new int[9223372036854775807L]"), EvalError::Arithmetic(_)));
    assert!(matches!(calc_err("new int[2147483648L]"), EvalError::Arithmetic(_)));
    assert!(matches!(calc_err("new String[-9223372036854775807L]"), EvalError::Arithmetic(_)));
}

#[test]
fn test_oversized_list_capacity_fails() {
    assert!(matches!(
        calc_err("new ArrayList(-1)"),
        EvalError::MethodInvocationFailed { .. }
    ));
    assert_eq!(calc("new ArrayList(4).size()"), Value::Int(0));
}

#[test]
fn test_set_holding_itself() {
    assert_eq!(calc("#s = new HashSet(), #s.add(#s)"), Value::Boolean(true));
    assert_eq!(calc("#s = new HashSet(), #s.add(#s), #s.add(#s)"), Value::Boolean(false));
    assert_eq!(calc("#s = new HashSet(), #s.add(#s), #s.add(#s), #s.size()"), Value::Int(1));
    assert_eq!(calc("#s = new HashSet(), #s.add(#s), #s.contains(#s)"), Value::Boolean(true));
    assert_eq!(
        calc("#s = new HashSet(), #s.add(1), #s.add(#s), #s.remove(#s), #s.size()"),
        Value::Int(1)
    );
    assert_eq!(calc("#s = new HashSet(), #s.remove(#s)"), Value::Boolean(false));
}

#[test]
fn test_set_add_and_remove() {
    assert_eq!(calc("#s = new HashSet(), #s.add(1), #s.add(1), #s.size()"), Value::Int(1));
    assert_eq!(calc("#s = new HashSet(), #s.add(1), #s.add(2), #s.remove(1)"), Value::Boolean(true));
    assert_eq!(calc("#s = new HashSet(), #s.add(2), #s.remove(1)"), Value::Boolean(false));
}

#[test]
fn test_instanceof() {
    assert_eq!(calc("\"s\" instanceof String"), Value::Boolean(true));
    assert_eq!(calc("{1} instanceof java.util.List"), Value::Boolean(true));
    assert_eq!(calc("5 instanceof Number"), Value::Boolean(true));
    assert_eq!(calc("5 instanceof String"), Value::Boolean(false));
    assert_eq!(calc("null instanceof Object"), Value::Boolean(false));
}

// ============================================================================
// One-shot helpers
// ============================================================================

#[test]
fn test_get_value_helper() {
    let root = object(vec![("a", ints(&[1, 2, 3]))]);
    assert_eq!(get_value("a.size() * 2", &root), Ok(Value::Int(6)));
    assert!(matches!(get_value("a +", &root), Err(graphnav_lang::Error::Parse(_))));
    assert!(matches!(get_value("1 / 0", &root), Err(graphnav_lang::Error::Eval(_))));
}

#[test]
fn test_set_value_helper() {
    let root = object(vec![("a", ints(&[1, 2, 3]))]);
    set_value("a[0]", &root, Value::Int(9)).unwrap();
    assert_eq!(get_value("a", &root), Ok(ints(&[9, 2, 3])));
}

//! Classes every registry starts with: the value types the evaluator produces
//! and a few utility classes.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use regex::Regex;
use rust_decimal::{Decimal, prelude::ToPrimitive};

use super::{ClassBuilder, ClassRegistry, HostError};
use crate::{
    types::{Primitive, TypeRef},
    value::{self, MapRef, Value},
};

fn arg(args: &[Value], i: usize) -> Result<&Value, HostError> {
    args.get(i)
        .ok_or_else(|| HostError::new(format!("missing argument {}", i)))
}

fn int_arg(args: &[Value], i: usize) -> Result<i64, HostError> {
    let value = arg(args, i)?;
    value
        .as_index()
        .ok_or_else(|| HostError::new(format!("expected an integer, got {}", value.class_name())))
}

fn float_arg(args: &[Value], i: usize) -> Result<f64, HostError> {
    let value = arg(args, i)?;
    to_f64(value)
        .ok_or_else(|| HostError::new(format!("expected a number, got {}", value.class_name())))
}

fn str_arg(args: &[Value], i: usize) -> Result<&str, HostError> {
    let value = arg(args, i)?;
    value
        .as_str()
        .ok_or_else(|| HostError::new(format!("expected a String, got {}", value.class_name())))
}

fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float(n) => Some(f64::from(*n)),
        Value::Double(n) => Some(*n),
        Value::BigDecimal(n) => n.to_f64(),
        Value::BigInteger(n) => Some(*n as f64),
        other => other.as_index().map(|n| n as f64),
    }
}

fn this_str(this: &Value) -> Result<&str, HostError> {
    this.as_str().ok_or_else(|| HostError::new("receiver is not a String"))
}

fn this_items(this: &Value) -> Result<&Rc<RefCell<Vec<Value>>>, HostError> {
    match this {
        Value::List(items) | Value::Set(items) => Ok(items),
        other => Err(HostError::new(format!(
            "receiver is not a collection: {}",
            other.class_name()
        ))),
    }
}

fn this_map(this: &Value) -> Result<&MapRef, HostError> {
    match this {
        Value::Map(map) => Ok(map),
        other => Err(HostError::new(format!("receiver is not a Map: {}", other.class_name()))),
    }
}

fn position(index: i64, len: usize) -> Result<usize, HostError> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i < len)
        .ok_or_else(|| HostError::new(format!("index {} out of bounds for length {}", index, len)))
}

fn char_slice(s: &str, start: i64, end: i64) -> Result<String, HostError> {
    let len = s.chars().count();
    let (Ok(start), Ok(end)) = (usize::try_from(start), usize::try_from(end)) else {
        return Err(HostError::new("negative substring bounds"));
    };
    if start > end || end > len {
        return Err(HostError::new(format!(
            "substring({}, {}) out of range for length {}",
            start, end, len
        )));
    }
    Ok(s.chars().skip(start).take(end - start).collect())
}

fn compile(pattern: &str) -> Result<Regex, HostError> {
    Regex::new(pattern).map_err(|e| HostError::new(format!("invalid pattern: {}", e)))
}

fn object() -> TypeRef {
    TypeRef::object()
}

fn void() -> TypeRef {
    TypeRef::class("void")
}

fn prim(p: Primitive) -> TypeRef {
    TypeRef::Primitive(p)
}

pub(crate) fn register_all(registry: &mut ClassRegistry) {
    register_object(registry);
    register_numbers(registry);
    register_text(registry);
    register_collections(registry);
    register_maps(registry);
    register_math(registry);
}

fn register_object(registry: &mut ClassRegistry) {
    registry.register(
        ClassBuilder::new("Object")
            .method("toString", vec![], TypeRef::string(), |this, _| {
                Ok(Value::String(this.to_string()))
            })
            .method("equals", vec![object()], TypeRef::boolean(), |this, args| {
                Ok(Value::Boolean(this == arg(args, 0)?))
            })
            .build(),
    );
    registry.register(
        ClassBuilder::new("Boolean")
            .method("booleanValue", vec![], TypeRef::boolean(), |this, _| {
                Ok(Value::Boolean(this.as_bool()))
            })
            .static_method("parseBoolean", vec![TypeRef::string()], TypeRef::boolean(), |args| {
                Ok(Value::Boolean(str_arg(args, 0)?.eq_ignore_ascii_case("true")))
            })
            .static_field("TRUE", TypeRef::class("Boolean"), || Value::Boolean(true))
            .static_field("FALSE", TypeRef::class("Boolean"), || Value::Boolean(false))
            .build(),
    );
    registry.register(
        ClassBuilder::new("Character")
            .static_method("isDigit", vec![prim(Primitive::Char)], TypeRef::boolean(), |args| match arg(args, 0)? {
                Value::Char(c) => Ok(Value::Boolean(c.is_ascii_digit())),
                other => Err(HostError::new(format!("expected a char, got {}", other.class_name()))),
            })
            .static_method("isLetter", vec![prim(Primitive::Char)], TypeRef::boolean(), |args| match arg(args, 0)? {
                Value::Char(c) => Ok(Value::Boolean(c.is_alphabetic())),
                other => Err(HostError::new(format!("expected a char, got {}", other.class_name()))),
            })
            .build(),
    );
    registry.register(ClassBuilder::new("Array").build());
}

fn register_numbers(registry: &mut ClassRegistry) {
    registry.register(
        ClassBuilder::new("Number")
            .method("intValue", vec![], TypeRef::int(), |this, _| {
                to_f64(this)
                    .map(|n| Value::Int(n as i32))
                    .ok_or_else(|| HostError::new("not a number"))
            })
            .method("longValue", vec![], TypeRef::long(), |this, _| {
                match this.as_index() {
                    Some(n) => Ok(Value::Long(n)),
                    None => to_f64(this)
                        .map(|n| Value::Long(n as i64))
                        .ok_or_else(|| HostError::new("not a number")),
                }
            })
            .method("doubleValue", vec![], TypeRef::double(), |this, _| {
                to_f64(this)
                    .map(Value::Double)
                    .ok_or_else(|| HostError::new("not a number"))
            })
            .build(),
    );

    registry.register(
        ClassBuilder::new("Integer")
            .extends("Number")
            .static_field("MAX_VALUE", TypeRef::int(), || Value::Int(i32::MAX))
            .static_field("MIN_VALUE", TypeRef::int(), || Value::Int(i32::MIN))
            .static_method("parseInt", vec![TypeRef::string()], TypeRef::int(), |args| {
                let text = str_arg(args, 0)?;
                text.trim()
                    .parse::<i32>()
                    .map(Value::Int)
                    .map_err(|_| HostError::new(format!("For input string: \"{}\"", text)))
            })
            .static_method("valueOf", vec![TypeRef::int()], TypeRef::class("Integer"), |args| {
                Ok(Value::Int(int_arg(args, 0)? as i32))
            })
            .static_method("valueOf", vec![TypeRef::string()], TypeRef::class("Integer"), |args| {
                let text = str_arg(args, 0)?;
                text.trim()
                    .parse::<i32>()
                    .map(Value::Int)
                    .map_err(|_| HostError::new(format!("For input string: \"{}\"", text)))
            })
            .build(),
    );
    registry.register(
        ClassBuilder::new("Long")
            .extends("Number")
            .static_field("MAX_VALUE", TypeRef::long(), || Value::Long(i64::MAX))
            .static_field("MIN_VALUE", TypeRef::long(), || Value::Long(i64::MIN))
            .static_method("parseLong", vec![TypeRef::string()], TypeRef::long(), |args| {
                let text = str_arg(args, 0)?;
                text.trim()
                    .parse::<i64>()
                    .map(Value::Long)
                    .map_err(|_| HostError::new(format!("For input string: \"{}\"", text)))
            })
            .build(),
    );
    registry.register(
        ClassBuilder::new("Double")
            .extends("Number")
            .static_field("NaN", TypeRef::double(), || Value::Double(f64::NAN))
            .static_field("POSITIVE_INFINITY", TypeRef::double(), || Value::Double(f64::INFINITY))
            .static_field("NEGATIVE_INFINITY", TypeRef::double(), || {
                Value::Double(f64::NEG_INFINITY)
            })
            .static_method("parseDouble", vec![TypeRef::string()], TypeRef::double(), |args| {
                let text = str_arg(args, 0)?;
                text.trim()
                    .parse::<f64>()
                    .map(Value::Double)
                    .map_err(|_| HostError::new(format!("For input string: \"{}\"", text)))
            })
            .method("isNaN", vec![], TypeRef::boolean(), |this, _| {
                Ok(Value::Boolean(to_f64(this).is_some_and(f64::is_nan)))
            })
            .build(),
    );
    for name in ["Byte", "Short", "Float", "BigInteger"] {
        registry.register(ClassBuilder::new(name).extends("Number").build());
    }
    registry.register(
        ClassBuilder::new("BigDecimal")
            .extends("Number")
            .constructor(vec![TypeRef::string()], |args| {
                let text = str_arg(args, 0)?;
                text.trim()
                    .parse::<Decimal>()
                    .map(Value::BigDecimal)
                    .map_err(|e| HostError::new(format!("invalid decimal \"{}\": {}", text, e)))
            })
            .method("scale", vec![], TypeRef::int(), |this, _| match this {
                Value::BigDecimal(d) => Ok(Value::Int(d.scale() as i32)),
                _ => Err(HostError::new("receiver is not a BigDecimal")),
            })
            .build(),
    );
}

fn register_text(registry: &mut ClassRegistry) {
    registry.register(
        ClassBuilder::interface("CharSequence")
            .method("length", vec![], TypeRef::int(), |this, _| {
                Ok(Value::Int(this_str(this)?.chars().count() as i32))
            })
            .method("charAt", vec![TypeRef::int()], prim(Primitive::Char), |this, args| {
                let s = this_str(this)?;
                let index = position(int_arg(args, 0)?, s.chars().count())?;
                s.chars()
                    .nth(index)
                    .map(Value::Char)
                    .ok_or_else(|| HostError::new("index out of range"))
            })
            .build(),
    );

    let cs = || TypeRef::class("CharSequence");
    registry.register(
        ClassBuilder::new("String")
            .implements("CharSequence")
            .constructor(vec![], |_| Ok(Value::String(String::new())))
            .constructor(vec![TypeRef::string()], |args| Ok(Value::String(str_arg(args, 0)?.to_string())))
            .method("isEmpty", vec![], TypeRef::boolean(), |this, _| {
                Ok(Value::Boolean(this_str(this)?.is_empty()))
            })
            .method("toUpperCase", vec![], TypeRef::string(), |this, _| {
                Ok(Value::String(this_str(this)?.to_uppercase()))
            })
            .method("toLowerCase", vec![], TypeRef::string(), |this, _| {
                Ok(Value::String(this_str(this)?.to_lowercase()))
            })
            .method("trim", vec![], TypeRef::string(), |this, _| {
                Ok(Value::String(this_str(this)?.trim().to_string()))
            })
            .method("substring", vec![TypeRef::int()], TypeRef::string(), |this, args| {
                let s = this_str(this)?;
                char_slice(s, int_arg(args, 0)?, s.chars().count() as i64).map(Value::String)
            })
            .method("substring", vec![TypeRef::int(), TypeRef::int()], TypeRef::string(), |this, args| {
                char_slice(this_str(this)?, int_arg(args, 0)?, int_arg(args, 1)?).map(Value::String)
            })
            .method("indexOf", vec![TypeRef::string()], TypeRef::int(), |this, args| {
                let s = this_str(this)?;
                let needle = str_arg(args, 0)?;
                Ok(Value::Int(match s.find(needle) {
                    Some(byte) => s[..byte].chars().count() as i32,
                    None => -1,
                }))
            })
            .method("indexOf", vec![prim(Primitive::Char)], TypeRef::int(), |this, args| {
                let s = this_str(this)?;
                let Value::Char(needle) = arg(args, 0)? else {
                    return Err(HostError::new("expected a char"));
                };
                Ok(Value::Int(
                    s.chars().position(|c| c == *needle).map_or(-1, |i| i as i32),
                ))
            })
            .method("startsWith", vec![TypeRef::string()], TypeRef::boolean(), |this, args| {
                Ok(Value::Boolean(this_str(this)?.starts_with(str_arg(args, 0)?)))
            })
            .method("endsWith", vec![TypeRef::string()], TypeRef::boolean(), |this, args| {
                Ok(Value::Boolean(this_str(this)?.ends_with(str_arg(args, 0)?)))
            })
            .method("contains", vec![cs()], TypeRef::boolean(), |this, args| {
                Ok(Value::Boolean(this_str(this)?.contains(str_arg(args, 0)?)))
            })
            .method("concat", vec![TypeRef::string()], TypeRef::string(), |this, args| {
                Ok(Value::String(format!("{}{}", this_str(this)?, str_arg(args, 0)?)))
            })
            .method("replace", vec![cs(), cs()], TypeRef::string(), |this, args| {
                Ok(Value::String(
                    this_str(this)?.replace(str_arg(args, 0)?, str_arg(args, 1)?),
                ))
            })
            .method("equalsIgnoreCase", vec![TypeRef::string()], TypeRef::boolean(), |this, args| {
                Ok(Value::Boolean(
                    this_str(this)?.to_lowercase() == str_arg(args, 0)?.to_lowercase(),
                ))
            })
            .method("compareTo", vec![TypeRef::string()], TypeRef::int(), |this, args| {
                Ok(Value::Int(this_str(this)?.cmp(str_arg(args, 0)?) as i32))
            })
            .method("matches", vec![TypeRef::string()], TypeRef::boolean(), |this, args| {
                let pattern = compile(&format!("^(?:{})$", str_arg(args, 0)?))?;
                Ok(Value::Boolean(pattern.is_match(this_str(this)?)))
            })
            .method("split", vec![TypeRef::string()], TypeRef::array_of(TypeRef::string()), |this, args| {
                let pattern = compile(str_arg(args, 0)?)?;
                let mut parts: Vec<Value> = pattern
                    .split(this_str(this)?)
                    .map(|part| Value::String(part.to_string()))
                    .collect();
                // trailing empty strings are dropped
                while parts.last().is_some_and(|p| p.as_str() == Some("")) {
                    parts.pop();
                }
                Ok(Value::array(TypeRef::string(), parts))
            })
            .static_method("valueOf", vec![object()], TypeRef::string(), |args| {
                Ok(Value::String(arg(args, 0)?.to_string()))
            })
            .build(),
    );
}

fn register_collections(registry: &mut ClassRegistry) {
    registry.register(
        ClassBuilder::interface("Collection")
            .method("size", vec![], TypeRef::int(), |this, _| {
                Ok(Value::Int(this_items(this)?.borrow().len() as i32))
            })
            .method("isEmpty", vec![], TypeRef::boolean(), |this, _| {
                Ok(Value::Boolean(this_items(this)?.borrow().is_empty()))
            })
            .method("contains", vec![object()], TypeRef::boolean(), |this, args| {
                let needle = arg(args, 0)?;
                Ok(Value::Boolean(
                    this_items(this)?.borrow().iter().any(|v| v.same(needle)),
                ))
            })
            .method("iterator", vec![], TypeRef::class("Iterator"), |this, _| {
                Ok(Value::iterator(this_items(this)?.borrow().clone()))
            })
            .method("clear", vec![], void(), |this, _| {
                this_items(this)?.borrow_mut().clear();
                Ok(Value::Null)
            })
            .build(),
    );

    registry.register(
        ClassBuilder::interface("List")
            .implements("Collection")
            .method("get", vec![TypeRef::int()], object(), |this, args| {
                let items = this_items(this)?.borrow();
                let index = position(int_arg(args, 0)?, items.len())?;
                Ok(items[index].clone())
            })
            .method("set", vec![TypeRef::int(), object()], object(), |this, args| {
                let value = arg(args, 1)?.clone();
                let mut items = this_items(this)?.borrow_mut();
                let index = position(int_arg(args, 0)?, items.len())?;
                Ok(std::mem::replace(&mut items[index], value))
            })
            .method("add", vec![object()], TypeRef::boolean(), |this, args| {
                let value = arg(args, 0)?.clone();
                this_items(this)?.borrow_mut().push(value);
                Ok(Value::Boolean(true))
            })
            .method("add", vec![TypeRef::int(), object()], void(), |this, args| {
                let value = arg(args, 1)?.clone();
                let mut items = this_items(this)?.borrow_mut();
                let index = position(int_arg(args, 0)?, items.len() + 1)?;
                items.insert(index, value);
                Ok(Value::Null)
            })
            .method("addAll", vec![TypeRef::class("Collection")], TypeRef::boolean(), |this, args| {
                let extra = arg(args, 0)?
                    .elements()
                    .ok_or_else(|| HostError::new("addAll expects a collection"))?;
                let changed = !extra.is_empty();
                this_items(this)?.borrow_mut().extend(extra);
                Ok(Value::Boolean(changed))
            })
            .method("remove", vec![TypeRef::int()], object(), |this, args| {
                let mut items = this_items(this)?.borrow_mut();
                let index = position(int_arg(args, 0)?, items.len())?;
                Ok(items.remove(index))
            })
            .method("indexOf", vec![object()], TypeRef::int(), |this, args| {
                let needle = arg(args, 0)?;
                let items = this_items(this)?.borrow();
                Ok(Value::Int(
                    items.iter().position(|v| v.same(needle)).map_or(-1, |i| i as i32),
                ))
            })
            .build(),
    );
    registry.register(
        ClassBuilder::new("ArrayList")
            .implements("List")
            .constructor(vec![], |_| Ok(Value::list(Vec::new())))
            .constructor(vec![TypeRef::int()], |args| {
                let items = value::reserve(int_arg(args, 0)?)
                    .map_err(|e| HostError::new(format!("capacity: {}", e)))?;
                Ok(Value::list(items))
            })
            .constructor(vec![TypeRef::class("Collection")], |args| {
                arg(args, 0)?
                    .elements()
                    .map(Value::list)
                    .ok_or_else(|| HostError::new("expected a collection"))
            })
            .build(),
    );

    registry.register(
        ClassBuilder::interface("Set")
            .implements("Collection")
            .method("add", vec![object()], TypeRef::boolean(), |this, args| {
                let value = arg(args, 0)?;
                let items = this_items(this)?;
                let present = items.borrow().iter().any(|v| v.same(value));
                if present {
                    return Ok(Value::Boolean(false));
                }
                items.borrow_mut().push(value.clone());
                Ok(Value::Boolean(true))
            })
            .method("remove", vec![object()], TypeRef::boolean(), |this, args| {
                let needle = arg(args, 0)?;
                let items = this_items(this)?;
                let keep: Vec<bool> = items.borrow().iter().map(|v| !v.same(needle)).collect();
                if keep.iter().all(|k| *k) {
                    return Ok(Value::Boolean(false));
                }
                let mut keep = keep.into_iter();
                items.borrow_mut().retain(|_| keep.next().unwrap_or(true));
                Ok(Value::Boolean(true))
            })
            .build(),
    );
    registry.register(
        ClassBuilder::new("HashSet")
            .implements("Set")
            .constructor(vec![], |_| Ok(Value::set(Vec::new())))
            .constructor(vec![TypeRef::class("Collection")], |args| {
                arg(args, 0)?
                    .elements()
                    .map(Value::set)
                    .ok_or_else(|| HostError::new("expected a collection"))
            })
            .build(),
    );

    registry.register(
        ClassBuilder::interface("Iterator")
            .method("hasNext", vec![], TypeRef::boolean(), |this, _| match this {
                Value::Iterator(state) => Ok(Value::Boolean(state.borrow().has_next())),
                _ => Err(HostError::new("receiver is not an Iterator")),
            })
            .method("next", vec![], object(), |this, _| match this {
                Value::Iterator(state) => state
                    .borrow_mut()
                    .next_item()
                    .ok_or_else(|| HostError::new("no more elements")),
                _ => Err(HostError::new("receiver is not an Iterator")),
            })
            .build(),
    );
}

fn register_maps(registry: &mut ClassRegistry) {
    registry.register(
        ClassBuilder::interface("Map")
            .method("get", vec![object()], object(), |this, args| {
                let key = arg(args, 0)?.map_key();
                Ok(this_map(this)?.borrow().get(&key).cloned().unwrap_or(Value::Null))
            })
            .method("put", vec![object(), object()], object(), |this, args| {
                let key = arg(args, 0)?.map_key();
                let value = arg(args, 1)?.clone();
                Ok(this_map(this)?.borrow_mut().insert(key, value).unwrap_or(Value::Null))
            })
            .method("containsKey", vec![object()], TypeRef::boolean(), |this, args| {
                let key = arg(args, 0)?.map_key();
                Ok(Value::Boolean(this_map(this)?.borrow().contains_key(&key)))
            })
            .method("containsValue", vec![object()], TypeRef::boolean(), |this, args| {
                let needle = arg(args, 0)?;
                Ok(Value::Boolean(this_map(this)?.borrow().values().any(|v| v.same(needle))))
            })
            .method("remove", vec![object()], object(), |this, args| {
                let key = arg(args, 0)?.map_key();
                Ok(this_map(this)?.borrow_mut().remove(&key).unwrap_or(Value::Null))
            })
            .method("keySet", vec![], TypeRef::class("Set"), |this, _| {
                let mut keys: Vec<String> = this_map(this)?.borrow().keys().cloned().collect();
                keys.sort();
                Ok(Value::set(keys.into_iter().map(Value::String).collect()))
            })
            .method("values", vec![], TypeRef::class("Collection"), |this, _| {
                let map = this_map(this)?.borrow();
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                Ok(Value::list(keys.into_iter().map(|k| map[k].clone()).collect()))
            })
            .method("size", vec![], TypeRef::int(), |this, _| {
                Ok(Value::Int(this_map(this)?.borrow().len() as i32))
            })
            .method("isEmpty", vec![], TypeRef::boolean(), |this, _| {
                Ok(Value::Boolean(this_map(this)?.borrow().is_empty()))
            })
            .method("clear", vec![], void(), |this, _| {
                this_map(this)?.borrow_mut().clear();
                Ok(Value::Null)
            })
            .build(),
    );
    registry.register(
        ClassBuilder::new("HashMap")
            .implements("Map")
            .constructor(vec![], |_| Ok(Value::map(HashMap::new())))
            .build(),
    );
}

fn register_math(registry: &mut ClassRegistry) {
    let int = TypeRef::int;
    let long = TypeRef::long;
    let double = TypeRef::double;
    registry.register(
        ClassBuilder::new("Math")
            .static_field("PI", double(), || Value::Double(std::f64::consts::PI))
            .static_field("E", double(), || Value::Double(std::f64::consts::E))
            .static_method("max", vec![int(), int()], int(), |args| {
                Ok(Value::Int(int_arg(args, 0)?.max(int_arg(args, 1)?) as i32))
            })
            .static_method("max", vec![long(), long()], long(), |args| {
                Ok(Value::Long(int_arg(args, 0)?.max(int_arg(args, 1)?)))
            })
            .static_method("max", vec![double(), double()], double(), |args| {
                Ok(Value::Double(float_arg(args, 0)?.max(float_arg(args, 1)?)))
            })
            .static_method("min", vec![int(), int()], int(), |args| {
                Ok(Value::Int(int_arg(args, 0)?.min(int_arg(args, 1)?) as i32))
            })
            .static_method("min", vec![long(), long()], long(), |args| {
                Ok(Value::Long(int_arg(args, 0)?.min(int_arg(args, 1)?)))
            })
            .static_method("min", vec![double(), double()], double(), |args| {
                Ok(Value::Double(float_arg(args, 0)?.min(float_arg(args, 1)?)))
            })
            .static_method("abs", vec![int()], int(), |args| {
                Ok(Value::Int((int_arg(args, 0)? as i32).wrapping_abs()))
            })
            .static_method("abs", vec![long()], long(), |args| {
                Ok(Value::Long(int_arg(args, 0)?.wrapping_abs()))
            })
            .static_method("abs", vec![double()], double(), |args| {
                Ok(Value::Double(float_arg(args, 0)?.abs()))
            })
            .static_method("sqrt", vec![double()], double(), |args| {
                Ok(Value::Double(float_arg(args, 0)?.sqrt()))
            })
            .static_method("pow", vec![double(), double()], double(), |args| {
                Ok(Value::Double(float_arg(args, 0)?.powf(float_arg(args, 1)?)))
            })
            .static_method("floor", vec![double()], double(), |args| {
                Ok(Value::Double(float_arg(args, 0)?.floor()))
            })
            .static_method("ceil", vec![double()], double(), |args| {
                Ok(Value::Double(float_arg(args, 0)?.ceil()))
            })
            .static_method("round", vec![double()], long(), |args| {
                Ok(Value::Long((float_arg(args, 0)? + 0.5).floor() as i64))
            })
            .build(),
    );
}

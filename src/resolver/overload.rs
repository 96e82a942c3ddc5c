//! Overload resolution for method and constructor calls.
//!
//! ## Algorithm
//!
//! 1. Drop candidates whose arity cannot accept the argument count
//! 2. Score every argument against its parameter; one incompatible argument
//!    disqualifies the candidate
//! 3. Rank the viable candidates by total cost
//! 4. Break ties: non-variadic first, then the most-derived declaration
//!    (candidates arrive most-derived first, so a stable sort keeps it)
//!
//! Distinct signatures left tied after step 3 are reported as rivals; the
//! caller decides whether that is an error.

use std::sync::Arc;

use super::MethodDescriptor;
use crate::{
    types::{Primitive, TypeRef},
    value::Value,
};

pub const EXACT: u32 = 0;
pub const BOXING: u32 = 1;
pub const WIDENING: u32 = 2;
pub const NULL_REFERENCE: u32 = 1;
pub const SUBTYPE: u32 = 10;
pub const RESHAPE: u32 = 30;
pub const OBJECT_PARAM: u32 = 50;
pub const VARIADIC: u32 = 20;
pub const CASE_MISMATCH: u32 = 10;

/// Hierarchy distance between two class names: 0 for the same class, `None`
/// when `from` is not assignable to `to`.
pub type Distance<'a> = dyn Fn(&str, &str) -> Option<u32> + 'a;

/// Static shape of a call argument; `None` is a null argument.
pub type ArgType = Option<TypeRef>;

pub fn arg_types(args: &[Value]) -> Vec<ArgType> {
    args.iter()
        .map(|arg| if arg.is_null() { None } else { Some(arg.type_ref()) })
        .collect()
}

/// Cache key fragment for an argument list, e.g. `int,String,null`.
pub fn arg_signature(args: &[ArgType]) -> String {
    let parts: Vec<String> = args
        .iter()
        .map(|arg| match arg {
            Some(ty) => ty.to_string(),
            None => "null".to_string(),
        })
        .collect();
    parts.join(",")
}

fn is_collection_class(name: &str, distance: &Distance<'_>) -> bool {
    distance(name, "Collection").is_some()
}

fn is_collection_param(name: &str) -> bool {
    matches!(name, "Collection" | "List" | "Iterable" | "Object")
}

/// Cost of passing an argument of type `arg` to a parameter of type `param`.
pub fn score(arg: &ArgType, param: &TypeRef, distance: &Distance<'_>) -> Option<u32> {
    let Some(arg) = arg else {
        return (!param.is_primitive()).then_some(NULL_REFERENCE);
    };
    if arg == param {
        return Some(EXACT);
    }
    match (arg, param) {
        (TypeRef::Primitive(from), TypeRef::Primitive(to)) => widening(*from, *to),
        (TypeRef::Primitive(from), TypeRef::Class(to)) => {
            if from.boxed_class() == &**to {
                Some(BOXING)
            } else if param.is_object() {
                Some(OBJECT_PARAM)
            } else {
                distance(from.boxed_class(), &**to).map(|d| BOXING + SUBTYPE + d)
            }
        }
        (TypeRef::Class(from), TypeRef::Primitive(to)) => {
            let unboxed = Primitive::from_boxed_class(from)?;
            if unboxed == *to {
                Some(BOXING)
            } else {
                widening(unboxed, *to).map(|cost| BOXING + cost)
            }
        }
        (TypeRef::Class(from), TypeRef::Class(to)) => {
            if param.is_object() {
                return Some(OBJECT_PARAM);
            }
            distance(&**from, &**to).map(|d| SUBTYPE + d)
        }
        (TypeRef::Array(_), TypeRef::Class(to)) => {
            if param.is_object() {
                Some(OBJECT_PARAM)
            } else if is_collection_param(to) {
                Some(RESHAPE)
            } else {
                None
            }
        }
        (TypeRef::Class(from), TypeRef::Array(_)) => {
            is_collection_class(from, distance).then_some(RESHAPE)
        }
        (TypeRef::Array(from), TypeRef::Array(to)) => match (&**from, &**to) {
            (TypeRef::Class(a), TypeRef::Class(b)) => distance(&**a, &**b).map(|d| SUBTYPE + d),
            _ => None,
        },
        (TypeRef::Primitive(_), TypeRef::Array(_)) | (TypeRef::Array(_), TypeRef::Primitive(_)) => {
            None
        }
    }
}

fn widening(from: Primitive, to: Primitive) -> Option<u32> {
    if from == to {
        return Some(EXACT);
    }
    if !from.widens_to(to) {
        return None;
    }
    let (a, b) = (from.widening_rank()?, to.widening_rank()?);
    Some(WIDENING + b.saturating_sub(a))
}

/// Total cost of calling `method` with `args`, or `None` if it cannot accept them.
pub fn score_call(method: &MethodDescriptor, args: &[ArgType], distance: &Distance<'_>) -> Option<u32> {
    if !method.accepts_arity(args.len()) {
        return None;
    }
    if !method.variadic {
        return method
            .params
            .iter()
            .zip(args)
            .try_fold(0, |total, (param, arg)| Some(total + score(arg, param, distance)?));
    }

    let fixed = method.params.len().saturating_sub(1);
    let mut total = 0;
    for (param, arg) in method.params[..fixed].iter().zip(args) {
        total += score(arg, param, distance)?;
    }
    let tail = &method.params[fixed];
    // a single argument already shaped like the variadic array is passed as-is
    if args.len() == method.params.len()
        && let Some(cost) = score(&args[fixed], tail, distance)
    {
        return Some(total + cost);
    }
    let component = match tail {
        TypeRef::Array(component) => &**component,
        other => other,
    };
    for arg in &args[fixed..] {
        total += score(arg, component, distance)?;
    }
    Some(total + VARIADIC)
}

/// A viable candidate and its total cost.
#[derive(Debug, Clone)]
pub struct OverloadMatch {
    pub method: Arc<MethodDescriptor>,
    pub cost: u32,
}

/// Outcome of ranking the candidates of one call shape.
#[derive(Debug, Clone)]
pub enum Ranking {
    NoMatch,
    Unique(OverloadMatch),
    /// Several distinct signatures share the lowest cost; `chosen` is the
    /// deterministic pick and `rivals` the signatures it tied with.
    Ambiguous {
        chosen: OverloadMatch,
        rivals: Vec<Arc<MethodDescriptor>>,
    },
}

/// Ranks `candidates` for a call with `args`.
pub fn rank(candidates: &[Arc<MethodDescriptor>], args: &[ArgType], distance: &Distance<'_>) -> Ranking {
    let mut viable: Vec<OverloadMatch> = candidates
        .iter()
        .filter_map(|method| {
            score_call(method, args, distance).map(|cost| OverloadMatch {
                method: method.clone(),
                cost,
            })
        })
        .collect();
    if viable.is_empty() {
        return Ranking::NoMatch;
    }
    viable.sort_by_key(|m| (m.cost, m.method.variadic));

    let best = viable.remove(0);
    let mut rivals: Vec<Arc<MethodDescriptor>> = Vec::new();
    for other in viable.iter().take_while(|m| m.cost == best.cost) {
        if !other.method.same_signature(&best.method)
            && !rivals.iter().any(|r| r.same_signature(&other.method))
        {
            rivals.push(other.method.clone());
        }
    }
    if rivals.is_empty() {
        Ranking::Unique(best)
    } else {
        Ranking::Ambiguous {
            chosen: best,
            rivals,
        }
    }
}

/// Penalty for a method name standing in for a property accessor:
/// the position of the matching prefix, plus [`CASE_MISMATCH`] when the
/// match needed case folding.
///
/// ```
/// use graphnav_lang::resolver::overload::accessor_penalty;
///
/// assert_eq!(accessor_penalty("getName", "name", &["get", "is"]), Some(0));
/// assert_eq!(accessor_penalty("isName", "name", &["get", "is"]), Some(1));
/// assert_eq!(accessor_penalty("getname", "name", &["get", "is"]), Some(10));
/// assert_eq!(accessor_penalty("name", "name", &["get", "is"]), None);
/// ```
pub fn accessor_penalty(method: &str, property: &str, prefixes: &[&str]) -> Option<u32> {
    let capitalized = capitalize(property);
    let mut best: Option<u32> = None;
    for (i, prefix) in prefixes.iter().enumerate() {
        let i = i as u32;
        let Some(rest) = method.strip_prefix(prefix) else {
            continue;
        };
        let penalty = if rest == capitalized {
            i
        } else if rest.eq_ignore_ascii_case(property) {
            i + CASE_MISMATCH
        } else {
            continue;
        };
        best = Some(best.map_or(penalty, |b: u32| b.min(penalty)));
    }
    best
}

/// `name` with its first character upper-cased.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

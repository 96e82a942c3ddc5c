//! Operator semantics over [`Value`]s.

use std::cmp::Ordering;

use super::{EvalError, collections::elements_of};
use crate::{
    ast::{BinaryOp, Node, UnaryOp},
    context::Context,
    numeric::{self, Tier},
    value::Value,
};

/// Evaluates both operands against `source`; `&&` and `||` stop early and
/// yield the operand that decided the result.
pub(super) fn binary(
    ctx: &mut Context,
    op: BinaryOp,
    left: &Node,
    right: &Node,
    source: &Value,
) -> Result<Value, EvalError> {
    let left = left.get_value(ctx, source)?;
    match op {
        BinaryOp::And if !left.as_bool() => Ok(left),
        BinaryOp::Or if left.as_bool() => Ok(left),
        BinaryOp::And | BinaryOp::Or => right.get_value(ctx, source),
        _ => {
            let right = right.get_value(ctx, source)?;
            apply_binary(op, &left, &right)
        }
    }
}

/// Applies a binary operator to two evaluated operands.
///
/// `&&` and `||` are applied without short-circuiting.
///
/// ```
/// use graphnav_lang::{Value, ast::BinaryOp, evaluator::apply_binary};
///
/// let sum = apply_binary(BinaryOp::Add, &Value::Int(2), &Value::Double(0.5)).unwrap();
/// assert_eq!(sum, Value::Double(2.5));
/// ```
pub fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::And => Ok(if left.as_bool() { right.clone() } else { left.clone() }),
        BinaryOp::Or => Ok(if left.as_bool() { left.clone() } else { right.clone() }),
        BinaryOp::Equal => Ok(Value::Boolean(equals(left, right))),
        BinaryOp::NotEqual => Ok(Value::Boolean(!equals(left, right))),
        BinaryOp::Less | BinaryOp::Greater | BinaryOp::LessEqual | BinaryOp::GreaterEqual => {
            let holds = compare(op, left, right)?.is_some_and(|ordering| match op {
                BinaryOp::Less => ordering == Ordering::Less,
                BinaryOp::Greater => ordering == Ordering::Greater,
                BinaryOp::LessEqual => ordering != Ordering::Greater,
                _ => ordering != Ordering::Less,
            });
            Ok(Value::Boolean(holds))
        }
        BinaryOp::In => contains(op, right, left).map(Value::Boolean),
        BinaryOp::NotIn => contains(op, right, left).map(|found| Value::Boolean(!found)),
        BinaryOp::Add if is_text(left) || is_text(right) => {
            Ok(Value::String(format!("{}{}", left, right)))
        }
        BinaryOp::Add
        | BinaryOp::Subtract
        | BinaryOp::Multiply
        | BinaryOp::Divide
        | BinaryOp::Remainder => arithmetic(op, left, right),
        BinaryOp::BitOr | BinaryOp::Xor | BinaryOp::BitAnd => bitwise(op, left, right),
        BinaryOp::ShiftLeft | BinaryOp::ShiftRight | BinaryOp::UnsignedShiftRight => {
            shift(op, left, right)
        }
    }
}

fn is_text(value: &Value) -> bool {
    matches!(value, Value::String(_))
}

fn invalid(op: &str, left: &Value, right: &Value) -> EvalError {
    EvalError::InvalidOperand {
        operator: op.to_string(),
        operand: format!("{} and {}", left.class_name(), right.class_name()),
    }
}

/// Numeric reading of an arithmetic operand.
fn operand(value: &Value) -> Result<Value, EvalError> {
    numeric::numeric(value).ok_or_else(|| EvalError::TypeConversionFailed {
        value: value.to_string(),
        target: "Number".to_string(),
    })
}

/// Both operands widened to their common tier.
fn promoted(left: &Value, right: &Value) -> Result<(Value, Value), EvalError> {
    let (a, b) = (operand(left)?, operand(right)?);
    let (Some(ta), Some(tb)) = (numeric::tier(&a), numeric::tier(&b)) else {
        return Err(invalid("arithmetic", left, right));
    };
    let tier = numeric::promote(ta, tb);
    match (numeric::to_tier(&a, tier), numeric::to_tier(&b, tier)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(EvalError::TypeConversionFailed {
            value: format!("{} and {}", left, right),
            target: format!("{:?}", tier),
        }),
    }
}

fn divide_by_zero() -> EvalError {
    EvalError::Arithmetic("/ by zero".to_string())
}

fn overflow(kind: &str) -> EvalError {
    EvalError::Arithmetic(format!("{} overflow", kind))
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    Ok(match promoted(left, right)? {
        (Value::Int(a), Value::Int(b)) => Value::Int(match op {
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Subtract => a.wrapping_sub(b),
            BinaryOp::Multiply => a.wrapping_mul(b),
            _ if b == 0 => return Err(divide_by_zero()),
            BinaryOp::Divide => a.wrapping_div(b),
            _ => a.wrapping_rem(b),
        }),
        (Value::Long(a), Value::Long(b)) => Value::Long(match op {
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Subtract => a.wrapping_sub(b),
            BinaryOp::Multiply => a.wrapping_mul(b),
            _ if b == 0 => return Err(divide_by_zero()),
            BinaryOp::Divide => a.wrapping_div(b),
            _ => a.wrapping_rem(b),
        }),
        (Value::BigInteger(a), Value::BigInteger(b)) => {
            let result = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Subtract => a.checked_sub(b),
                BinaryOp::Multiply => a.checked_mul(b),
                _ if b == 0 => return Err(divide_by_zero()),
                BinaryOp::Divide => a.checked_div(b),
                _ => a.checked_rem(b),
            };
            Value::BigInteger(result.ok_or_else(|| overflow("BigInteger"))?)
        }
        (Value::Float(a), Value::Float(b)) => Value::Float(match op {
            BinaryOp::Add => a + b,
            BinaryOp::Subtract => a - b,
            BinaryOp::Multiply => a * b,
            BinaryOp::Divide => a / b,
            _ => a % b,
        }),
        (Value::Double(a), Value::Double(b)) => Value::Double(match op {
            BinaryOp::Add => a + b,
            BinaryOp::Subtract => a - b,
            BinaryOp::Multiply => a * b,
            BinaryOp::Divide => a / b,
            _ => a % b,
        }),
        (Value::BigDecimal(a), Value::BigDecimal(b)) => {
            let result = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Subtract => a.checked_sub(b),
                BinaryOp::Multiply => a.checked_mul(b),
                _ if b.is_zero() => return Err(EvalError::Arithmetic("Division by zero".to_string())),
                BinaryOp::Divide => a.checked_div(b),
                _ => a.checked_rem(b),
            };
            Value::BigDecimal(result.ok_or_else(|| overflow("BigDecimal"))?)
        }
        _ => return Err(invalid(op.symbol(), left, right)),
    })
}

/// `|`, `^` and `&`: logical on two booleans, bitwise on integral operands.
fn bitwise(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    if let (Value::Boolean(a), Value::Boolean(b)) = (left, right) {
        return Ok(Value::Boolean(match op {
            BinaryOp::BitOr => a | b,
            BinaryOp::Xor => a ^ b,
            _ => a & b,
        }));
    }
    let (a, b) = promoted(left, right)?;
    macro_rules! apply {
        ($variant:ident, $a:expr, $b:expr) => {
            Value::$variant(match op {
                BinaryOp::BitOr => $a | $b,
                BinaryOp::Xor => $a ^ $b,
                _ => $a & $b,
            })
        };
    }
    Ok(match (a, b) {
        (Value::Int(a), Value::Int(b)) => apply!(Int, a, b),
        (Value::Long(a), Value::Long(b)) => apply!(Long, a, b),
        (Value::BigInteger(a), Value::BigInteger(b)) => apply!(BigInteger, a, b),
        _ => return Err(invalid(op.symbol(), left, right)),
    })
}

fn shift(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let value = operand(left)?;
    let distance = operand(right)
        .ok()
        .filter(|d| numeric::tier(d).is_some_and(Tier::is_integral))
        .and_then(|d| numeric::to_i64(&d))
        .ok_or_else(|| invalid(op.symbol(), left, right))?;
    match numeric::tier(&value) {
        Some(Tier::Int) => {
            let a = numeric::to_i64(&value).unwrap_or_default() as i32;
            let n = (distance & 31) as u32;
            Ok(Value::Int(match op {
                BinaryOp::ShiftLeft => a.wrapping_shl(n),
                BinaryOp::ShiftRight => a >> n,
                _ => ((a as u32) >> n) as i32,
            }))
        }
        Some(Tier::Long) => {
            let a = numeric::to_i64(&value).unwrap_or_default();
            let n = (distance & 63) as u32;
            Ok(Value::Long(match op {
                BinaryOp::ShiftLeft => a.wrapping_shl(n),
                BinaryOp::ShiftRight => a >> n,
                _ => ((a as u64) >> n) as i64,
            }))
        }
        Some(Tier::BigInteger) => {
            let a = numeric::to_i128(&value).unwrap_or_default();
            let n = u32::try_from(distance)
                .ok()
                .filter(|n| *n < 128)
                .ok_or_else(|| overflow("BigInteger shift"))?;
            Ok(Value::BigInteger(match op {
                BinaryOp::ShiftLeft => a.checked_shl(n).ok_or_else(|| overflow("BigInteger"))?,
                _ => a >> n,
            }))
        }
        _ => Err(invalid(op.symbol(), left, right)),
    }
}

/// Numeric-aware equality: `1 == 1L == 1.0`, a single-char string equals the
/// char, everything else compares structurally.
pub(crate) fn equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Char(c), Value::String(s)) | (Value::String(s), Value::Char(c)) => {
            let mut chars = s.chars();
            chars.next() == Some(*c) && chars.next().is_none()
        }
        (a, b) if numeric::is_number(a) && numeric::is_number(b) => {
            compare_numbers(a, b) == Some(Ordering::Equal)
        }
        (Value::Char(_), b) if numeric::is_number(b) => compare_numbers(left, right) == Some(Ordering::Equal),
        (a, Value::Char(_)) if numeric::is_number(a) => compare_numbers(left, right) == Some(Ordering::Equal),
        _ => left == right,
    }
}

/// Orders two values in their promoted tier. `None` when either is NaN.
fn compare_numbers(left: &Value, right: &Value) -> Option<Ordering> {
    let (a, b) = promoted(left, right).ok()?;
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(&b)),
        (Value::Long(a), Value::Long(b)) => Some(a.cmp(&b)),
        (Value::BigInteger(a), Value::BigInteger(b)) => Some(a.cmp(&b)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(&b),
        (Value::Double(a), Value::Double(b)) => a.partial_cmp(&b),
        (Value::BigDecimal(a), Value::BigDecimal(b)) => Some(a.cmp(&b)),
        _ => None,
    }
}

/// Strings compare lexicographically, anything with a numeric reading
/// numerically. `Ok(None)` for an unordered pair such as a NaN operand.
fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<Option<Ordering>, EvalError> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
        _ if numeric::numeric(left).is_some() && numeric::numeric(right).is_some() => {
            Ok(compare_numbers(left, right))
        }
        _ => Err(invalid(op.symbol(), left, right)),
    }
}

/// Membership of `item` in `container`: elements of a collection, keys of a
/// map, substrings of a string.
fn contains(op: BinaryOp, container: &Value, item: &Value) -> Result<bool, EvalError> {
    match container {
        Value::Null => Ok(false),
        Value::Map(map) => Ok(map.borrow().contains_key(&item.map_key())),
        Value::String(text) => Ok(!item.is_null() && text.contains(&item.to_string())),
        Value::List(_) | Value::Set(_) | Value::Array(_) | Value::Iterator(_) => {
            Ok(elements_of(container).iter().any(|element| equals(element, item)))
        }
        other => Err(invalid(op.symbol(), item, other)),
    }
}

pub(super) fn unary(op: UnaryOp, value: &Value) -> Result<Value, EvalError> {
    match op {
        UnaryOp::Not => Ok(Value::Boolean(!value.as_bool())),
        UnaryOp::Plus => {
            let number = operand(value)?;
            let tier = numeric::tier(&number).unwrap_or(Tier::Int);
            numeric::to_tier(&number, tier).ok_or_else(|| invalid("+", value, value))
        }
        UnaryOp::Negate => {
            let number = operand(value)?;
            let tier = numeric::tier(&number).unwrap_or(Tier::Int);
            Ok(match numeric::to_tier(&number, tier) {
                Some(Value::Int(n)) => Value::Int(n.wrapping_neg()),
                Some(Value::Long(n)) => Value::Long(n.wrapping_neg()),
                Some(Value::BigInteger(n)) => {
                    Value::BigInteger(n.checked_neg().ok_or_else(|| overflow("BigInteger"))?)
                }
                Some(Value::Float(n)) => Value::Float(-n),
                Some(Value::Double(n)) => Value::Double(-n),
                Some(Value::BigDecimal(n)) => Value::BigDecimal(-n),
                _ => return Err(invalid("-", value, value)),
            })
        }
        UnaryOp::BitNot => {
            let number = operand(value)?;
            Ok(match numeric::tier(&number) {
                Some(Tier::Int) => Value::Int(!(numeric::to_i64(&number).unwrap_or_default() as i32)),
                Some(Tier::Long) => Value::Long(!numeric::to_i64(&number).unwrap_or_default()),
                Some(Tier::BigInteger) => Value::BigInteger(!numeric::to_i128(&number).unwrap_or_default()),
                _ => return Err(invalid("~", value, value)),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_promotion_of_mixed_operands() {
        assert_eq!(
            apply_binary(BinaryOp::Add, &Value::Int(1), &Value::Long(2)).unwrap(),
            Value::Long(3)
        );
        assert_eq!(
            apply_binary(BinaryOp::Multiply, &Value::BigInteger(3), &Value::Double(0.5)).unwrap(),
            Value::BigDecimal(Decimal::new(15, 1))
        );
        assert_eq!(
            apply_binary(BinaryOp::Add, &Value::Byte(1), &Value::Short(2)).unwrap(),
            Value::Int(3)
        );
    }

    #[test]
    fn test_int_arithmetic_wraps() {
        assert_eq!(
            apply_binary(BinaryOp::Add, &Value::Int(i32::MAX), &Value::Int(1)).unwrap(),
            Value::Int(i32::MIN)
        );
    }

    #[test]
    fn test_big_integer_overflow_is_an_error() {
        let result = apply_binary(BinaryOp::Multiply, &Value::BigInteger(i128::MAX), &Value::BigInteger(2));
        assert!(matches!(result, Err(EvalError::Arithmetic(_))));
    }

    #[test]
    fn test_numeric_equality_across_tiers() {
        assert!(equals(&Value::Int(1), &Value::Double(1.0)));
        assert!(equals(&Value::Char('a'), &Value::string("a")));
        assert!(!equals(&Value::Null, &Value::Int(0)));
    }

    #[test]
    fn test_nan_never_compares() {
        let nan = Value::Double(f64::NAN);
        for op in [BinaryOp::Less, BinaryOp::Greater, BinaryOp::LessEqual, BinaryOp::GreaterEqual] {
            assert_eq!(apply_binary(op, &nan, &Value::Int(1)).unwrap(), Value::Boolean(false));
        }
    }

    #[test]
    fn test_unsigned_shift() {
        assert_eq!(
            apply_binary(BinaryOp::UnsignedShiftRight, &Value::Int(-1), &Value::Int(28)).unwrap(),
            Value::Int(15)
        );
        assert_eq!(
            apply_binary(BinaryOp::ShiftRight, &Value::Int(-16), &Value::Int(2)).unwrap(),
            Value::Int(-4)
        );
    }

    #[test]
    fn test_boolean_bitwise_is_logical() {
        assert_eq!(
            apply_binary(BinaryOp::Xor, &Value::Boolean(true), &Value::Boolean(true)).unwrap(),
            Value::Boolean(false)
        );
    }
}

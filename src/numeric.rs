//! The numeric tower: operand classification, promotion and casts.
//!
//! Operands are widened to a common [`Tier`] before they are combined:
//!
//! | either operand         | other operand         | result        |
//! |------------------------|-----------------------|---------------|
//! | `BigDecimal`           | anything              | `BigDecimal`  |
//! | `BigInteger`           | `float`/`double`      | `BigDecimal`  |
//! | `BigInteger`           | integral              | `BigInteger`  |
//! | `double`               | non-big               | `double`      |
//! | `float`                | integral              | `float`       |
//! | `long`                 | integral              | `long`        |
//! | otherwise              |                       | `int`         |

use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};

use crate::{types::Primitive, value::Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Int,
    Long,
    BigInteger,
    Float,
    Double,
    BigDecimal,
}

impl Tier {
    pub fn is_integral(self) -> bool {
        matches!(self, Tier::Int | Tier::Long | Tier::BigInteger)
    }

    pub fn is_floating(self) -> bool {
        matches!(self, Tier::Float | Tier::Double)
    }
}

/// Common tier for a binary operation.
pub fn promote(a: Tier, b: Tier) -> Tier {
    use Tier::*;
    match (a, b) {
        (BigDecimal, _) | (_, BigDecimal) => BigDecimal,
        (BigInteger, other) | (other, BigInteger) => {
            if other.is_floating() {
                BigDecimal
            } else {
                BigInteger
            }
        }
        _ => a.max(b),
    }
}

/// Numeric view of a value: numbers as-is, booleans as `0`/`1`, chars as
/// their code point and numeric strings parsed. `None` for anything else.
pub fn numeric(value: &Value) -> Option<Value> {
    match value {
        Value::Byte(_)
        | Value::Short(_)
        | Value::Int(_)
        | Value::Long(_)
        | Value::Float(_)
        | Value::Double(_)
        | Value::BigInteger(_)
        | Value::BigDecimal(_) => Some(value.clone()),
        Value::Boolean(b) => Some(Value::Int(i32::from(*b))),
        Value::Char(c) => Some(Value::Int(u32::from(*c) as i32)),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Tier of a value that is already numeric.
pub fn tier(value: &Value) -> Option<Tier> {
    Some(match value {
        Value::Byte(_) | Value::Short(_) | Value::Int(_) | Value::Char(_) | Value::Boolean(_) => {
            Tier::Int
        }
        Value::Long(_) => Tier::Long,
        Value::BigInteger(_) => Tier::BigInteger,
        Value::Float(_) => Tier::Float,
        Value::Double(_) => Tier::Double,
        Value::BigDecimal(_) => Tier::BigDecimal,
        _ => return None,
    })
}

pub fn is_number(value: &Value) -> bool {
    matches!(
        value,
        Value::Byte(_)
            | Value::Short(_)
            | Value::Int(_)
            | Value::Long(_)
            | Value::Float(_)
            | Value::Double(_)
            | Value::BigInteger(_)
            | Value::BigDecimal(_)
    )
}

/// Parses decimal text as the narrowest fitting number: `int`, `long`,
/// big integer, else `double`.
pub fn parse_number(text: &str) -> Option<Value> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(n) = text.parse::<i32>() {
        return Some(Value::Int(n));
    }
    if let Ok(n) = text.parse::<i64>() {
        return Some(Value::Long(n));
    }
    if let Ok(n) = text.parse::<i128>() {
        return Some(Value::BigInteger(n));
    }
    text.parse::<f64>().ok().map(Value::Double)
}

pub fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Float(n) => Some(*n as i64),
        Value::Double(n) => Some(*n as i64),
        Value::BigDecimal(n) => n.trunc().to_i64(),
        Value::Boolean(b) => Some(i64::from(*b)),
        other => other.as_index(),
    }
}

pub fn to_i128(value: &Value) -> Option<i128> {
    match value {
        Value::BigInteger(n) => Some(*n),
        Value::BigDecimal(n) => n.trunc().to_i128(),
        other => to_i64(other).map(i128::from),
    }
}

pub fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float(n) => Some(f64::from(*n)),
        Value::Double(n) => Some(*n),
        Value::BigInteger(n) => Some(*n as f64),
        Value::BigDecimal(n) => n.to_f64(),
        other => to_i64(other).map(|n| n as f64),
    }
}

pub fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::BigDecimal(n) => Some(*n),
        Value::BigInteger(n) => Decimal::from_i128(*n),
        Value::Float(n) => Decimal::from_f32(*n),
        Value::Double(n) => Decimal::from_f64(*n),
        other => to_i64(other).map(Decimal::from),
    }
}

/// `value` expressed in `tier`. Narrowing casts truncate like a host cast.
pub fn to_tier(value: &Value, tier: Tier) -> Option<Value> {
    Some(match tier {
        Tier::Int => Value::Int(to_i64(value)? as i32),
        Tier::Long => Value::Long(to_i64(value)?),
        Tier::BigInteger => Value::BigInteger(to_i128(value)?),
        Tier::Float => Value::Float(to_f64(value)? as f32),
        Tier::Double => Value::Double(to_f64(value)?),
        Tier::BigDecimal => Value::BigDecimal(to_decimal(value)?),
    })
}

/// Casts a value to a primitive, as `(int) x` would. `None` when the value
/// has no numeric or boolean reading.
pub fn cast(value: &Value, target: Primitive) -> Option<Value> {
    if target == Primitive::Boolean {
        return match value {
            Value::Boolean(_) => Some(value.clone()),
            Value::String(s) => Some(Value::Boolean(s.trim().eq_ignore_ascii_case("true"))),
            other => numeric(other).map(|n| Value::Boolean(n.as_bool())),
        };
    }
    if target == Primitive::Char {
        return match value {
            Value::Char(_) => Some(value.clone()),
            Value::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Value::Char(c)),
                    _ => None,
                }
            }
            other => to_i64(other)
                .and_then(|n| u32::try_from(n).ok())
                .and_then(char::from_u32)
                .map(Value::Char),
        };
    }
    let number = numeric(value)?;
    Some(match target {
        Primitive::Byte => Value::Byte(to_i64(&number)? as i8),
        Primitive::Short => Value::Short(to_i64(&number)? as i16),
        Primitive::Int => Value::Int(to_i64(&number)? as i32),
        Primitive::Long => Value::Long(to_i64(&number)?),
        Primitive::Float => Value::Float(to_f64(&number)? as f32),
        Primitive::Double => Value::Double(to_f64(&number)?),
        Primitive::Boolean | Primitive::Char => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotion_table() {
        assert_eq!(promote(Tier::Int, Tier::Long), Tier::Long);
        assert_eq!(promote(Tier::Long, Tier::Float), Tier::Float);
        assert_eq!(promote(Tier::Float, Tier::Double), Tier::Double);
        assert_eq!(promote(Tier::BigInteger, Tier::Long), Tier::BigInteger);
        assert_eq!(promote(Tier::BigInteger, Tier::Double), Tier::BigDecimal);
        assert_eq!(promote(Tier::Int, Tier::BigDecimal), Tier::BigDecimal);
    }

    #[test]
    fn test_parse_number_picks_narrowest() {
        assert_eq!(parse_number("42"), Some(Value::Int(42)));
        assert_eq!(parse_number("5000000000"), Some(Value::Long(5_000_000_000)));
        assert_eq!(parse_number("2.5"), Some(Value::Double(2.5)));
        assert_eq!(parse_number("abc"), None);
    }

    #[test]
    fn test_cast_truncates() {
        assert_eq!(cast(&Value::Double(3.9), Primitive::Int), Some(Value::Int(3)));
        assert_eq!(cast(&Value::string("7"), Primitive::Long), Some(Value::Long(7)));
        assert_eq!(cast(&Value::string("x"), Primitive::Char), Some(Value::Char('x')));
        assert_eq!(cast(&Value::Null, Primitive::Int), None);
    }
}

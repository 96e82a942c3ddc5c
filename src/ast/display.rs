//! Normalized source form of a tree.
//!
//! Printing then re-parsing yields a structurally equal tree. Operands are
//! parenthesized only where precedence requires it.

use std::fmt;

use super::node::{Literal, Node, NodeKind};

fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str, quote: char) -> fmt::Result {
    write!(f, "{}", quote)?;
    for ch in text.chars() {
        match ch {
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            '\0' => write!(f, "\\0")?,
            '\\' => write!(f, "\\\\")?,
            c if c == quote => write!(f, "\\{}", c)?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "{}", quote)
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Char(c) => write_escaped(f, &c.to_string(), '\''),
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Long(n) => write!(f, "{}L", n),
            Literal::Float(n) => write!(f, "{:?}F", n),
            Literal::Double(n) => write!(f, "{:?}", n),
            Literal::BigInteger(n) => write!(f, "{}B", n),
            Literal::BigDecimal(n) => write!(f, "{}H", n),
            Literal::String(s) => write_escaped(f, s, '"'),
            Literal::Subscript(s) => write!(f, "#{}", s.keyword()),
        }
    }
}

fn is_negative(literal: &Literal) -> bool {
    match literal {
        Literal::Int(n) => *n < 0,
        Literal::Long(n) => *n < 0,
        Literal::Float(n) => n.is_sign_negative(),
        Literal::Double(n) => n.is_sign_negative(),
        Literal::BigInteger(n) => *n < 0,
        Literal::BigDecimal(n) => n.is_sign_negative(),
        _ => false,
    }
}

/// Binding strength of a node when it appears as an operand.
fn strength(node: &Node) -> u8 {
    match node.kind() {
        // `-1.abs()` would re-read as `-(1.abs())`
        NodeKind::Constant(literal) if is_negative(literal) => 14,
        NodeKind::Sequence(_) => 0,
        NodeKind::Assign { .. } => 1,
        NodeKind::Ternary { .. } => 2,
        NodeKind::Binary { op, .. } => 2 + op.precedence(),
        NodeKind::Unary { .. } => 14,
        NodeKind::InstanceOf { .. } => 15,
        _ => 16,
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, node: &Node, min: u8) -> fmt::Result {
    if strength(node) < min {
        write!(f, "({})", node)
    } else {
        write!(f, "{}", node)
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Node]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        // a bare sequence would read as several arguments
        write_operand(f, arg, 1)?;
    }
    Ok(())
}

fn write_step(f: &mut fmt::Formatter<'_>, step: &Node, first: bool) -> fmt::Result {
    match step.kind() {
        NodeKind::Property { indexed: true, .. } => write!(f, "{}", step),
        NodeKind::Projection(_) | NodeKind::Selection { .. } => write!(f, "{}", step),
        _ if first => write_operand(f, step, 16),
        _ => {
            write!(f, ".")?;
            write_operand(f, step, 16)
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            NodeKind::Constant(literal) => write!(f, "{}", literal),
            NodeKind::Variable(name) => write!(f, "#{}", name),
            NodeKind::This => write!(f, "#this"),
            NodeKind::Root => write!(f, "#root"),
            NodeKind::Property { key, indexed } => match (indexed, self.property_name()) {
                (false, Some(name)) => write!(f, "{}", name),
                _ => write!(f, "[{}]", key),
            },
            NodeKind::Chain(steps) => {
                for (i, step) in steps.iter().enumerate() {
                    write_step(f, step, i == 0)?;
                }
                Ok(())
            }
            NodeKind::Method { name, args } => {
                write!(f, "{}(", name)?;
                write_args(f, args)?;
                write!(f, ")")
            }
            NodeKind::StaticMethod { class, name, args } => {
                write!(f, "@{}@{}(", class, name)?;
                write_args(f, args)?;
                write!(f, ")")
            }
            NodeKind::StaticField { class, name } => write!(f, "@{}@{}", class, name),
            NodeKind::Constructor { class, args, array } => match (array, args.first()) {
                (true, Some(init)) if matches!(init.kind(), NodeKind::List(_)) => {
                    write!(f, "new {}[] {}", class, init)
                }
                (true, Some(size)) => write!(f, "new {}[{}]", class, size),
                _ => {
                    write!(f, "new {}(", class)?;
                    write_args(f, args)?;
                    write!(f, ")")
                }
            },
            NodeKind::List(items) => {
                write!(f, "{{")?;
                write_args(f, items)?;
                write!(f, "}}")
            }
            NodeKind::Map(entries) => {
                write!(f, "#{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_operand(f, key, 3)?;
                    write!(f, " : ")?;
                    write_operand(f, value, 1)?;
                }
                write!(f, "}}")
            }
            NodeKind::Binary { op, left, right } => {
                let own = 2 + op.precedence();
                write_operand(f, left, own)?;
                write!(f, " {} ", op.symbol())?;
                // left associative: an equal-strength right operand keeps its parens
                write_operand(f, right, own + 1)
            }
            NodeKind::Unary { op, operand } => {
                write!(f, "{}", op.symbol())?;
                write_operand(f, operand, 14)
            }
            NodeKind::Ternary {
                condition,
                then,
                otherwise,
            } => {
                write_operand(f, condition, 3)?;
                write!(f, " ? ")?;
                write_operand(f, then, 1)?;
                write!(f, " : ")?;
                write_operand(f, otherwise, 2)
            }
            NodeKind::Assign { target, value } => {
                write_operand(f, target, 2)?;
                write!(f, " = ")?;
                write_operand(f, value, 1)
            }
            NodeKind::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_operand(f, item, 1)?;
                }
                Ok(())
            }
            NodeKind::Projection(expr) => write!(f, ".{{{}}}", expr),
            NodeKind::Selection { kind, condition } => {
                write!(f, ".{{{} {}}}", kind.marker(), condition)
            }
            NodeKind::InstanceOf { operand, class } => {
                write_operand(f, operand, 16)?;
                write!(f, " instanceof {}", class)
            }
        }
    }
}

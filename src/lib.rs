pub mod accessor;
pub mod ast;
pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod context;
pub mod convert;
pub mod evaluator;
pub mod handlers;
pub mod lexer;
pub mod numeric;
pub mod parser;
pub mod pool;
pub mod resolver;
pub mod runtime;
pub mod trace;
pub mod types;
pub mod value;

pub use ast::{Node, NodeId, NodeKind, Token};
pub use config::{AmbiguityPolicy, RuntimeConfig};
pub use context::{Context, Cursors, create_context};
pub use convert::{DefaultTypeConverter, NoConversion, TypeConverter};
pub use evaluator::{EvalError, assign, evaluate};
pub use handlers::{CompiledAccessor, DenyList, MemberAccess, NullHandler};
pub use lexer::{LexError, Lexer};
pub use parser::{ParseError, Parser, parse};
pub use resolver::{ClassBuilder, ClassRegistry, HostError, MemberResolver};
pub use runtime::Runtime;
pub use types::{Primitive, TypeRef};
pub use value::{DynamicSubscript, Value};

/// Failure of a one-shot [`get_value`] or [`set_value`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),
}

/// Parses `expression` and reads it against `root` on a fresh context.
///
/// ```
/// use graphnav_lang::{Value, get_value};
///
/// assert_eq!(get_value("5 / 2", &Value::Null).unwrap(), Value::Int(2));
/// ```
pub fn get_value(expression: &str, root: &Value) -> Result<Value, Error> {
    let node = parse(expression)?;
    let mut ctx = Context::new(root.clone());
    Ok(evaluate(&node, &mut ctx, root)?)
}

/// Parses `expression` and assigns `value` through it against `root`.
pub fn set_value(expression: &str, root: &Value, value: Value) -> Result<(), Error> {
    let node = parse(expression)?;
    let mut ctx = Context::new(root.clone());
    Ok(assign(&node, &mut ctx, root, value)?)
}

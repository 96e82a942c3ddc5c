//! Evaluate expressions against JSON input

use std::sync::Arc;

use super::{CliError, json_to_value, value_to_json};
use crate::{AmbiguityPolicy, Context, Runtime, RuntimeConfig, Value, evaluate, parse};

/// Options for the eval command
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// The expression to evaluate
    pub expression: String,
    /// JSON document used as the root; the root is null without one
    pub input: Option<String>,
    /// `name=json` variable bindings
    pub vars: Vec<String>,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
    /// Record the evaluation tree
    pub trace: bool,
    /// Fail on ambiguous overloads instead of picking one
    pub strict_overloads: bool,
}

/// Result of an eval operation
#[derive(Debug)]
pub enum EvalOutcome {
    /// Syntax validation passed
    SyntaxValid,
    /// Expression evaluated successfully
    Success {
        output: serde_json::Value,
        /// Rendered evaluation tree when tracing was requested
        trace: Option<String>,
    },
}

fn parse_binding(binding: &str) -> Result<(String, Value), CliError> {
    let (name, json) = binding
        .split_once('=')
        .filter(|(name, _)| !name.trim().is_empty())
        .ok_or_else(|| CliError::InvalidVariable(binding.to_string()))?;
    let value: serde_json::Value = serde_json::from_str(json)?;
    Ok((name.trim().trim_start_matches('#').to_string(), json_to_value(value)))
}

fn context_for(options: &EvalOptions, root: Value) -> Context {
    if !options.trace && !options.strict_overloads {
        return Context::new(root);
    }
    let mut config = RuntimeConfig::from_env().with_trace(options.trace);
    if options.strict_overloads {
        config = config.with_ambiguity(AmbiguityPolicy::Reject);
    }
    Context::with_runtime(root, Arc::new(Runtime::builder().config(config).build()))
}

/// Execute an eval operation
pub fn execute_eval(options: &EvalOptions) -> Result<EvalOutcome, CliError> {
    let node = parse(&options.expression)?;
    if options.syntax_only {
        return Ok(EvalOutcome::SyntaxValid);
    }

    let root = match &options.input {
        Some(json) => json_to_value(serde_json::from_str(json)?),
        None => Value::Null,
    };
    let mut ctx = context_for(options, root.clone());
    for binding in &options.vars {
        let (name, value) = parse_binding(binding)?;
        ctx.put(name, value);
    }

    let result = evaluate(&node, &mut ctx, &root);
    let trace = ctx.take_evaluation().map(|evaluation| evaluation.to_string());
    let value = result?;
    Ok(EvalOutcome::Success {
        output: value_to_json(&value),
        trace,
    })
}

/// Normalized form of an expression followed by its tree.
pub fn execute_parse(expression: &str) -> Result<String, CliError> {
    let node = parse(expression)?;
    Ok(format!("{}\n\n{:#?}\n", node, node))
}

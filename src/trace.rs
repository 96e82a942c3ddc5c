//! Optional record of how an expression was evaluated.
//!
//! When tracing is enabled on a [`Context`](crate::Context), every node pushes
//! an [`Evaluation`] on entry and fills in its outcome on exit, producing a
//! tree that mirrors the walk.

use std::fmt;

use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Source text of the node.
    pub node: String,
    pub source: Value,
    /// `true` for an assignment walk.
    pub set_operation: bool,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub children: Vec<Evaluation>,
}

impl Evaluation {
    /// Number of records in this subtree.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Evaluation::count).sum::<usize>()
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let op = if self.set_operation { "set" } else { "get" };
        write!(f, "{:indent$}{} {} on {}", "", op, self.node, self.source, indent = depth * 2)?;
        match (&self.result, &self.error) {
            (_, Some(error)) => writeln!(f, " !! {}", error)?,
            (Some(result), None) => writeln!(f, " => {}", result)?,
            (None, None) => writeln!(f)?,
        }
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

/// Builds the evaluation tree while nodes are walked.
#[derive(Debug, Default)]
pub struct TraceRecorder {
    open: Vec<Evaluation>,
    finished: Option<Evaluation>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, node: String, source: &Value, set_operation: bool) {
        self.open.push(Evaluation {
            node,
            source: source.clone(),
            set_operation,
            result: None,
            error: None,
            children: Vec::new(),
        });
    }

    pub fn finish(&mut self, result: Option<&Value>, error: Option<String>) {
        let Some(mut evaluation) = self.open.pop() else {
            return;
        };
        evaluation.result = result.cloned();
        evaluation.error = error;
        match self.open.last_mut() {
            Some(parent) => parent.children.push(evaluation),
            None => self.finished = Some(evaluation),
        }
    }

    /// The most recently completed top-level evaluation.
    pub fn last(&self) -> Option<&Evaluation> {
        self.finished.as_ref()
    }

    pub fn take(&mut self) -> Option<Evaluation> {
        self.finished.take()
    }
}

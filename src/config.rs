//! Runtime configuration.

use std::env;

/// What to do when several distinct overloads tie for the lowest cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmbiguityPolicy {
    /// Log a warning and prefer the non-variadic, most-derived candidate.
    #[default]
    PreferDeterministic,
    /// Fail the call with [`EvalError::AmbiguousMethod`](crate::EvalError::AmbiguousMethod).
    Reject,
}

impl AmbiguityPolicy {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "warn" | "prefer" | "deterministic" => Some(AmbiguityPolicy::PreferDeterministic),
            "reject" | "error" | "strict" => Some(AmbiguityPolicy::Reject),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Record an evaluation tree on every context created by this runtime.
    pub trace_evaluations: bool,
    pub ambiguity: AmbiguityPolicy,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `GRAPHNAV_TRACE` (`1`/`true`) and
    /// `GRAPHNAV_AMBIGUITY` (`warn`/`reject`).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(trace) = env::var("GRAPHNAV_TRACE") {
            config.trace_evaluations = matches!(trace.trim(), "1" | "true" | "yes");
        }
        if let Ok(policy) = env::var("GRAPHNAV_AMBIGUITY")
            && let Some(policy) = AmbiguityPolicy::parse(&policy)
        {
            config.ambiguity = policy;
        }
        config
    }

    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace_evaluations = enabled;
        self
    }

    pub fn with_ambiguity(mut self, policy: AmbiguityPolicy) -> Self {
        self.ambiguity = policy;
        self
    }
}

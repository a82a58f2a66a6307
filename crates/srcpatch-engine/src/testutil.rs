//! Scripted sandbox used by the engine's own tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::SandboxError;
use crate::sandbox::SnippetSandbox;

/// Sandbox with scripted verdicts and expression values.
#[derive(Debug, Default)]
pub(crate) struct MockSandbox {
    /// Probe statements containing any of these substrings fail.
    failing: Vec<String>,
    /// Expression text -> scripted value. Unknown expressions fail.
    values: HashMap<String, String>,
    /// Number of probe invocations, for memoization assertions.
    pub(crate) probe_calls: AtomicUsize,
    /// Number of evaluate invocations.
    pub(crate) evaluate_calls: AtomicUsize,
}

impl MockSandbox {
    pub(crate) fn failing_on(mut self, needle: &str) -> Self {
        self.failing.push(needle.to_string());
        self
    }

    pub(crate) fn with_value(mut self, expression: &str, value: &str) -> Self {
        self.values.insert(expression.to_string(), value.to_string());
        self
    }

    fn context_fails(&self, statements: &[String]) -> bool {
        statements
            .iter()
            .any(|stmt| self.failing.iter().any(|needle| stmt.contains(needle)))
    }
}

impl SnippetSandbox for MockSandbox {
    fn probe(&self, statements: &[String]) -> Result<(), SandboxError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        if self.context_fails(statements) {
            return Err(SandboxError::Probe("scripted failure".to_string()));
        }
        Ok(())
    }

    fn evaluate(&self, statements: &[String], expression: &str) -> Result<String, SandboxError> {
        self.evaluate_calls.fetch_add(1, Ordering::SeqCst);
        if self.context_fails(statements) {
            return Err(SandboxError::Probe("scripted failure".to_string()));
        }
        self.values
            .get(expression)
            .cloned()
            .ok_or_else(|| SandboxError::Probe(format!("no scripted value for '{expression}'")))
    }
}

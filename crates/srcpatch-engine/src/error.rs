//! Error types for the patch engine.
//!
//! Library crates use `thiserror` for explicit error enums.

use thiserror::Error;

/// Error types for guard-probe and expression evaluation.
///
/// A sandbox failure is an expected outcome, not a compiler error: the
/// engine reacts by leaving the module's source unmodified.
#[derive(Error, Debug)]
pub enum SandboxError {
    /// No usable probe interpreter on the compile host.
    #[error("no probe interpreter found: {0}")]
    InterpreterNotFound(String),

    /// Interpreter process could not be spawned or managed.
    #[error("probe interpreter error: {0}")]
    Process(#[from] std::io::Error),

    /// Probe ran but failed (e.g. the optional library is absent).
    #[error("probe failed: {0}")]
    Probe(String),

    /// Probe did not complete within the deadline and was killed.
    #[error("probe did not complete within {0} seconds")]
    Timeout(u64),

    /// Probe produced output that was not valid UTF-8.
    #[error("probe output was not valid UTF-8")]
    Output,
}

/// Error types for patch application.
///
/// Scoped to one module; never aborts unrelated modules' processing.
#[derive(Error, Debug)]
pub enum PatchError {
    /// The rewritten text does not parse and the policy demands a
    /// guaranteed patch, so falling back to the original is not allowed.
    #[error("patched source for '{module}' does not parse: {detail}")]
    UnparsablePatch {
        /// Module whose patch was abandoned.
        module: String,
        /// Location/description of the first syntax problem.
        detail: String,
    },
}

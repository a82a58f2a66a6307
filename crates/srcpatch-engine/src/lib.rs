//! srcpatch-engine - Guarded source patching for ahead-of-time compilation
//!
//! Third-party libraries carry optional testing sub-frameworks, dynamic
//! import shims, and build-tool fallbacks that are dead weight in a
//! compiled artifact. This engine applies maintainer-declared rewrite
//! rules to a module's source before the compiler's front end parses it:
//! literal substitutions, whole-function replacement, and whole-module
//! stubbing, each gated on guard probes evaluated in a throwaway
//! interpreter scope.
//!
//! # Architecture
//!
//! ```text
//! srcpatch-engine/src/
//! ├── lib.rs       # Re-exports (this file)
//! ├── error.rs     # SandboxError, PatchError (thiserror)
//! ├── types.rs     # Splice, Diagnostic, PatchPolicy, PatchOutcome
//! ├── sandbox.rs   # SnippetSandbox trait + PythonSandbox
//! ├── guard.rs     # Memoized guard evaluation (dashmap)
//! ├── matcher.rs   # Needle and function-definition matching
//! ├── rewriter.rs  # Highest-offset-first splice application
//! ├── validate.rs  # Overlap detection + tree-sitter parse check
//! ├── diff.rs      # Unified diff rendering (similar)
//! ├── report.rs    # Run-wide diagnostic accumulation
//! └── engine.rs    # PatchEngine orchestration
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use srcpatch_engine::{PatchEngine, PythonSandbox};
//! use srcpatch_rules::RuleSet;
//!
//! let rules = RuleSet::from_path("patch-rules.yaml")?;
//! let sandbox = Arc::new(PythonSandbox::discover()?);
//! let engine = PatchEngine::new(rules, sandbox);
//!
//! let outcome = engine.patch_module("setuptools_scm.integration", &source)?;
//! if outcome.applied {
//!     compile(&outcome.text);
//! }
//! ```

mod diff;
mod engine;
mod error;
mod guard;
mod matcher;
mod report;
mod rewriter;
mod sandbox;
mod types;
mod validate;

#[cfg(test)]
mod testutil;

pub use engine::PatchEngine;
pub use error::{PatchError, SandboxError};
pub use report::RunReport;
pub use sandbox::{PythonSandbox, SnippetSandbox};
pub use types::{Diagnostic, PatchOutcome, PatchPolicy, Severity, Splice};

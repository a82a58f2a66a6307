//! srcpatch-rules - Rule table model and ingestion for srcpatch
//!
//! The rule table maps fully-qualified module names to the rewrite rules
//! the compiler applies to that module's source before compiling it.
//! Loading is pure data ingestion: no probing, no evaluation, and any
//! structural problem is fatal for the compile run.
//!
//! # Architecture
//!
//! ```text
//! srcpatch-rules/src/
//! ├── lib.rs     # Re-exports (this file)
//! ├── error.rs   # SchemaError enum (thiserror)
//! ├── model.rs   # RuleSet, ModuleRuleGroup, ReplacementValue
//! └── loader.rs  # YAML ingestion (RuleSet::from_path / from_yaml)
//! ```

mod error;
mod loader;
mod model;

pub use error::SchemaError;
pub use model::{ModuleRuleGroup, ReplacementValue, RuleSet};

//! Error types for rule table loading.
//!
//! Library crates use `thiserror` for explicit error enums.

use thiserror::Error;

/// Error types for rule table ingestion.
///
/// Every variant is fatal: a compile run must not proceed with a rule
/// table it could not load in full.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Rule table file could not be read.
    #[error("failed to read rule table '{path}': {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Rule table document is structurally invalid.
    ///
    /// Covers malformed YAML, unknown fields on a rule group, duplicate
    /// module keys, and duplicate needles within one group.
    #[error("malformed rule table: {0}")]
    Malformed(#[from] serde_yaml::Error),
}

//! Rule table loading.
//!
//! Pure data ingestion: loading never probes, never evaluates, and either
//! yields a complete table or fails the run.

use std::path::Path;

use crate::error::SchemaError;
use crate::model::RuleSet;

impl RuleSet {
    /// Load a rule table from a YAML document on disk.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the file cannot be read or the document
    /// is structurally invalid (wrong shape, unknown fields, duplicate
    /// module keys). All loading errors are fatal for the compile run.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    /// Parse a rule table from an in-memory YAML document.
    ///
    /// An empty document yields an empty table.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Malformed`] on any structural problem.
    pub fn from_yaml(raw: &str) -> Result<Self, SchemaError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }
}

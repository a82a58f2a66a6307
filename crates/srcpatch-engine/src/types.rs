//! Core types for the patch engine.

use serde::Serialize;

/// A resolved text splice: replace `source[start..end]` with `text`.
///
/// Offsets are byte offsets into the original source and stay valid for
/// the whole application pass because splices are applied highest offset
/// first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    /// Byte offset of the first replaced byte.
    pub start: usize,
    /// Byte offset one past the last replaced byte.
    pub end: usize,
    /// Replacement text.
    pub text: String,
}

/// Severity class of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Recoverable, reported in the run summary.
    Warning,
    /// The module's patch was abandoned.
    Error,
}

/// Per-module condition recorded while applying rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A declared needle was not found in the module's current source.
    /// The library version likely no longer contains that code shape.
    SoftMissNeedle {
        /// Module the rule group targets.
        module: String,
        /// The needle that did not occur.
        needle: String,
    },

    /// A declared function name has no top-level definition in the source.
    SoftMissFunction {
        /// Module the rule group targets.
        module: String,
        /// The function that was not found.
        function: String,
    },

    /// Two replacement spans collide; the patch was abandoned and the
    /// original source used instead.
    OverlapConflict {
        /// Module the rule group targets.
        module: String,
        /// The earlier span (start, end).
        first: (usize, usize),
        /// The colliding span (start, end).
        second: (usize, usize),
    },

    /// The rewritten text failed to parse; the patch is unsafe and was
    /// not applied.
    PostPatchParseFailure {
        /// Module the rule group targets.
        module: String,
        /// Location/description of the first syntax problem.
        detail: String,
    },
}

impl Diagnostic {
    /// Severity class of this diagnostic.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::SoftMissNeedle { .. } | Self::SoftMissFunction { .. } => Severity::Warning,
            Self::OverlapConflict { .. } | Self::PostPatchParseFailure { .. } => Severity::Error,
        }
    }

    /// Module this diagnostic belongs to.
    #[must_use]
    pub fn module(&self) -> &str {
        match self {
            Self::SoftMissNeedle { module, .. }
            | Self::SoftMissFunction { module, .. }
            | Self::OverlapConflict { module, .. }
            | Self::PostPatchParseFailure { module, .. } => module,
        }
    }
}

/// What to do when the rewritten text fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatchPolicy {
    /// Abandon the patch and hand the compiler the unmodified source.
    #[default]
    FallbackToOriginal,
    /// The module cannot compile unpatched; escalate to a hard error.
    RequirePatch,
}

/// Result of asking the engine for a module's patched source.
#[derive(Debug, Clone, Serialize)]
pub struct PatchOutcome {
    /// Source text to hand to the compiler's parser. The original input
    /// whenever `applied` is false.
    pub text: String,
    /// Whether any rewrite actually changed the text.
    pub applied: bool,
    /// Conditions recorded while applying this module's rules.
    pub diagnostics: Vec<Diagnostic>,
    /// Unified diff of original vs patched text; empty when unchanged.
    pub diff: String,
}

impl PatchOutcome {
    /// Outcome for a module whose source is returned unmodified.
    pub(crate) fn unchanged(source: &str, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            text: source.to_string(),
            applied: false,
            diagnostics,
            diff: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_classes() {
        let miss = Diagnostic::SoftMissNeedle {
            module: "m".to_string(),
            needle: "import x".to_string(),
        };
        assert_eq!(miss.severity(), Severity::Warning);

        let overlap = Diagnostic::OverlapConflict {
            module: "m".to_string(),
            first: (0, 4),
            second: (2, 6),
        };
        assert_eq!(overlap.severity(), Severity::Error);
    }

    #[test]
    fn test_diagnostic_serializes_with_kind_tag() {
        let miss = Diagnostic::SoftMissFunction {
            module: "pkg.mod".to_string(),
            function: "_test".to_string(),
        };
        let json = serde_json::to_string(&miss).expect("serialize diagnostic");
        assert!(json.contains("\"kind\":\"soft_miss_function\""));
        assert!(json.contains("\"pkg.mod\""));
    }
}

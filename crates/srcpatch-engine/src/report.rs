//! Per-run accumulation of patch outcomes.
//!
//! The compiler processes modules on parallel workers; every worker
//! records its outcome here and the compiler renders one summary at the
//! end of the run.

use dashmap::DashMap;

use crate::types::{Diagnostic, PatchOutcome, Severity};

/// Run-wide record of applied patches and accumulated diagnostics.
///
/// Safe for concurrent use from module-processing workers.
#[derive(Debug, Default)]
pub struct RunReport {
    applied: DashMap<String, ()>,
    diagnostics: DashMap<String, Vec<Diagnostic>>,
}

impl RunReport {
    /// Record one module's outcome.
    pub fn record(&self, module_key: &str, outcome: &PatchOutcome) {
        if outcome.applied {
            self.applied.insert(module_key.to_string(), ());
        }
        if !outcome.diagnostics.is_empty() {
            self.diagnostics
                .entry(module_key.to_string())
                .or_default()
                .extend(outcome.diagnostics.iter().cloned());
        }
    }

    /// Modules whose source was actually rewritten, sorted.
    #[must_use]
    pub fn applied_modules(&self) -> Vec<String> {
        let mut modules: Vec<String> = self.applied.iter().map(|e| e.key().clone()).collect();
        modules.sort();
        modules
    }

    /// All warning-class diagnostics (soft-misses) across the run.
    #[must_use]
    pub fn soft_misses(&self) -> Vec<Diagnostic> {
        self.collect_by_severity(Severity::Warning)
    }

    /// Modules whose intended patch could not be safely applied.
    #[must_use]
    pub fn failed_patches(&self) -> Vec<Diagnostic> {
        self.collect_by_severity(Severity::Error)
    }

    /// One-line summary for the end-of-run log.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} module(s) patched, {} soft-miss(es), {} failed patch(es)",
            self.applied.len(),
            self.soft_misses().len(),
            self.failed_patches().len()
        )
    }

    fn collect_by_severity(&self, severity: Severity) -> Vec<Diagnostic> {
        let mut found: Vec<Diagnostic> = self
            .diagnostics
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|d| d.severity() == severity)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();
        found.sort_by(|a, b| a.module().cmp(b.module()));
        found
    }
}

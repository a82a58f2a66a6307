//! Guard evaluation with per-module memoization.
//!
//! A rule group's `context` statements are probed at most once per compile
//! run. The verdict cache is shared by all module-processing workers;
//! first computation wins and a racing recomputation is tolerated because
//! context evaluation is idempotent and side-effect-light.

use dashmap::DashMap;
use srcpatch_rules::ModuleRuleGroup;

use crate::sandbox::SnippetSandbox;

/// Memoized guard verdicts, keyed by module.
#[derive(Debug, Default)]
pub(crate) struct GuardCache {
    verdicts: DashMap<String, bool>,
}

impl GuardCache {
    /// Whether the group's rules apply to this module.
    ///
    /// Groups without context are always applicable and never touch the
    /// sandbox or the cache.
    pub(crate) fn is_applicable(
        &self,
        module_key: &str,
        group: &ModuleRuleGroup,
        sandbox: &dyn SnippetSandbox,
    ) -> bool {
        if group.context.is_empty() {
            return true;
        }

        if let Some(verdict) = self.verdicts.get(module_key) {
            return *verdict;
        }

        let verdict = match sandbox.probe(&group.context) {
            Ok(()) => true,
            Err(error) => {
                // Expected outcome when an optional library is absent.
                tracing::debug!(
                    module = module_key,
                    error = %error,
                    "guard context failed; rule group inapplicable"
                );
                false
            }
        };

        self.verdicts.insert(module_key.to_string(), verdict);
        verdict
    }
}

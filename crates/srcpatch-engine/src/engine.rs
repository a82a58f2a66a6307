//! Patch engine orchestration.
//!
//! Data flow for one module: rule table lookup, guard evaluation, pattern
//! matching, splice application, module-code override, post-patch parse
//! check. Every per-module condition is scoped to that module; only a
//! malformed rule table (caught at load time) aborts a run.

use std::sync::Arc;

use srcpatch_rules::{ReplacementValue, RuleSet};

use crate::diff::unified_diff;
use crate::error::{PatchError, SandboxError};
use crate::guard::GuardCache;
use crate::matcher::find_matches;
use crate::rewriter::apply_splices;
use crate::sandbox::SnippetSandbox;
use crate::types::{Diagnostic, PatchOutcome, PatchPolicy};
use crate::validate::{find_overlap, parses_as_python};

/// Rule-driven source patcher.
///
/// Holds the immutable rule table, the probe sandbox, and the memoized
/// guard verdicts. One engine serves the whole compile run; the `&self`
/// API is safe to call from parallel module-processing workers.
pub struct PatchEngine {
    rules: RuleSet,
    sandbox: Arc<dyn SnippetSandbox>,
    policy: PatchPolicy,
    guards: GuardCache,
}

impl PatchEngine {
    /// Engine with the default fallback-to-original policy.
    #[must_use]
    pub fn new(rules: RuleSet, sandbox: Arc<dyn SnippetSandbox>) -> Self {
        Self {
            rules,
            sandbox,
            policy: PatchPolicy::default(),
            guards: GuardCache::default(),
        }
    }

    /// Override the post-patch parse-failure policy.
    #[must_use]
    pub fn with_policy(mut self, policy: PatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The rule table this engine applies.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Produce the patched source for one module.
    ///
    /// Returns the input unmodified (with `applied = false`) when no rule
    /// group matches, the guard context fails, every rule soft-misses, or
    /// the patch had to be abandoned under the fallback policy.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::UnparsablePatch`] only under
    /// [`PatchPolicy::RequirePatch`] when the rewritten text does not parse.
    pub fn patch_module(&self, module_key: &str, source: &str) -> Result<PatchOutcome, PatchError> {
        let Some(group) = self.rules.lookup(module_key) else {
            return Ok(PatchOutcome::unchanged(source, Vec::new()));
        };

        // Nothing to rewrite; do not even bother probing the guard.
        if group.is_empty() {
            return Ok(PatchOutcome::unchanged(source, Vec::new()));
        }

        if !self
            .guards
            .is_applicable(module_key, group, self.sandbox.as_ref())
        {
            return Ok(PatchOutcome::unchanged(source, Vec::new()));
        }

        let resolve = |value: &ReplacementValue| -> Result<String, SandboxError> {
            match value {
                ReplacementValue::Literal(text) => Ok(text.clone()),
                ReplacementValue::Expression(expr) => self.sandbox.evaluate(&group.context, expr),
            }
        };

        let matches = match find_matches(module_key, source, group, resolve) {
            Ok(matches) => matches,
            Err(error) => {
                // Same class as a failed guard: the value this rule needs
                // is not available on this host.
                tracing::debug!(
                    module = module_key,
                    error = %error,
                    "replacement resolution failed; leaving module unmodified"
                );
                return Ok(PatchOutcome::unchanged(source, Vec::new()));
            }
        };

        let mut diagnostics = matches.diagnostics;

        if let Some((first, second)) = find_overlap(&matches.splices) {
            tracing::warn!(
                module = module_key,
                ?first,
                ?second,
                "replacement spans collide; abandoning patch"
            );
            diagnostics.push(Diagnostic::OverlapConflict {
                module: module_key.to_string(),
                first,
                second,
            });
            return Ok(PatchOutcome::unchanged(source, diagnostics));
        }

        let mut text = apply_splices(source, &matches.splices);

        // module_code always wins over whatever the rules produced.
        if let Some(module_code) = &group.module_code {
            text.clear();
            text.push_str(module_code);
        }

        if text == source {
            return Ok(PatchOutcome::unchanged(source, diagnostics));
        }

        if let Err(detail) = parses_as_python(&text) {
            diagnostics.push(Diagnostic::PostPatchParseFailure {
                module: module_key.to_string(),
                detail: detail.clone(),
            });
            return match self.policy {
                PatchPolicy::FallbackToOriginal => {
                    tracing::warn!(
                        module = module_key,
                        detail,
                        "patched source does not parse; falling back to original"
                    );
                    Ok(PatchOutcome::unchanged(source, diagnostics))
                }
                PatchPolicy::RequirePatch => Err(PatchError::UnparsablePatch {
                    module: module_key.to_string(),
                    detail,
                }),
            };
        }

        let diff = unified_diff(module_key, source, &text);
        tracing::info!(
            module = module_key,
            replacements = matches.splices.len(),
            "applied source patch"
        );

        Ok(PatchOutcome {
            text,
            applied: true,
            diagnostics,
            diff,
        })
    }
}

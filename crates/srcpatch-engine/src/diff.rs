//! Unified diff rendering for patch outcomes.
//!
//! The compiler surfaces these diffs in its applied-patches report, so
//! each one is prefixed with the module it belongs to.

use similar::{ChangeTag, TextDiff};

/// Render a unified diff of a module's original vs patched source.
pub(crate) fn unified_diff(module_key: &str, original: &str, patched: &str) -> String {
    let diff = TextDiff::from_lines(original, patched);
    let mut output = format!("--- {module_key} (original)\n+++ {module_key} (patched)\n");

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            output.push_str("@@\n");
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => "-",
                    ChangeTag::Insert => "+",
                    ChangeTag::Equal => " ",
                };
                output.push_str(sign);
                output.push_str(change.value());
                if change.missing_newline() {
                    output.push('\n');
                }
            }
        }
    }

    output
}

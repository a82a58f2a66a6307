//! Pattern matching over a module's raw source text.
//!
//! Needles are literal substrings, never a pattern language: third-party
//! source changes shape across versions, so a missing needle is a
//! recoverable soft-miss rather than a failure. Function rules match the
//! definition header at top level and span the whole body.

use srcpatch_rules::{ModuleRuleGroup, ReplacementValue};

use crate::error::SandboxError;
use crate::types::{Diagnostic, Splice};

/// Matched splices plus the soft-miss diagnostics recorded on the way.
#[derive(Debug, Default)]
pub(crate) struct MatchSet {
    pub(crate) splices: Vec<Splice>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

/// Locate every declared needle and function in `source`.
///
/// `resolve` turns a [`ReplacementValue`] into the actual substitution
/// text; it is invoked once per matched rule, never for soft-misses. A
/// resolution failure aborts matching for the whole group (the caller
/// treats it like a failed guard).
pub(crate) fn find_matches<F>(
    module_key: &str,
    source: &str,
    group: &ModuleRuleGroup,
    mut resolve: F,
) -> Result<MatchSet, SandboxError>
where
    F: FnMut(&ReplacementValue) -> Result<String, SandboxError>,
{
    let mut matches = MatchSet::default();

    for (needle, value) in &group.replacements {
        let occurrences: Vec<usize> = source.match_indices(needle.as_str()).map(|(i, _)| i).collect();

        if occurrences.is_empty() {
            matches.diagnostics.push(Diagnostic::SoftMissNeedle {
                module: module_key.to_string(),
                needle: needle.clone(),
            });
            continue;
        }

        // Every occurrence receives the same resolved text.
        let text = resolve(value)?;
        for start in occurrences {
            matches.splices.push(Splice {
                start,
                end: start + needle.len(),
                text: text.clone(),
            });
        }
    }

    for (function, value) in &group.change_function {
        let Some((start, end)) = top_level_function_span(source, function) else {
            matches.diagnostics.push(Diagnostic::SoftMissFunction {
                module: module_key.to_string(),
                function: function.clone(),
            });
            continue;
        };

        let text = resolve(value)?;
        matches.splices.push(Splice {
            start,
            end,
            text: format!("{function} = {text}"),
        });
    }

    Ok(matches)
}

fn strip_eol(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

/// Byte span of the first top-level `def name(...)` (or `async def`),
/// from the header line to the end of the last non-blank body line.
///
/// Later same-named definitions are ignored: the rule table gives no
/// disambiguation for duplicates, so the first occurrence wins.
fn top_level_function_span(source: &str, name: &str) -> Option<(usize, usize)> {
    let plain = format!("def {name}(");
    let asynchronous = format!("async def {name}(");

    let mut lines: Vec<(usize, &str)> = Vec::new();
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        lines.push((offset, line));
        offset += line.len();
    }

    let header = lines.iter().position(|(_, line)| {
        line.starts_with(&plain) || line.starts_with(&asynchronous)
    })?;

    // The body extends until the next non-blank line at column zero.
    let mut terminator = lines.len();
    for (idx, (_, line)) in lines.iter().enumerate().skip(header + 1) {
        let content = strip_eol(line);
        if !content.is_empty() && !content.starts_with(' ') && !content.starts_with('\t') {
            terminator = idx;
            break;
        }
    }

    // Trailing blank lines separate the function from its sibling; they
    // stay in place rather than being swallowed by the splice.
    let mut last = header;
    for idx in (header..terminator).rev() {
        if !lines[idx].1.trim().is_empty() {
            last = idx;
            break;
        }
    }

    let start = lines[header].0;
    let (last_offset, last_line) = lines[last];
    Some((start, last_offset + strip_eol(last_line).len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(text: &str) -> ReplacementValue {
        ReplacementValue::Literal(text.to_string())
    }

    fn resolve_literal(value: &ReplacementValue) -> Result<String, SandboxError> {
        match value {
            ReplacementValue::Literal(text) => Ok(text.clone()),
            ReplacementValue::Expression(expr) => {
                Err(SandboxError::Probe(format!("unexpected expression '{expr}'")))
            }
        }
    }

    fn group_with_replacement(needle: &str, value: ReplacementValue) -> ModuleRuleGroup {
        ModuleRuleGroup {
            replacements: vec![(needle.to_string(), value)],
            ..ModuleRuleGroup::default()
        }
    }

    #[test]
    fn test_every_occurrence_is_matched() {
        let group = group_with_replacement("import setuptools", literal("pass"));
        let source = "import setuptools\nrun()\nimport setuptools\n";

        let matches =
            find_matches("m", source, &group, resolve_literal).expect("matching should succeed");

        assert_eq!(matches.splices.len(), 2);
        assert!(matches.diagnostics.is_empty());
        assert_eq!(matches.splices[0].start, 0);
        assert_eq!(matches.splices[1].start, source.rfind("import").expect("present"));
    }

    #[test]
    fn test_absent_needle_is_a_soft_miss() {
        let group = group_with_replacement("import setuptools", literal("pass"));

        let matches =
            find_matches("m", "run()\n", &group, resolve_literal).expect("matching should succeed");

        assert!(matches.splices.is_empty());
        assert_eq!(
            matches.diagnostics,
            vec![Diagnostic::SoftMissNeedle {
                module: "m".to_string(),
                needle: "import setuptools".to_string(),
            }]
        );
    }

    #[test]
    fn test_resolution_is_skipped_for_soft_misses() {
        let group = group_with_replacement("gone", ReplacementValue::Expression("boom".to_string()));

        // The resolver would fail; it must not be consulted at all.
        let matches =
            find_matches("m", "still here\n", &group, resolve_literal).expect("no resolution");
        assert_eq!(matches.diagnostics.len(), 1);
    }

    #[test]
    fn test_function_span_covers_whole_body() {
        let source = "import os\n\ndef _test():\n    a = 1\n    return a\n\nrun()\n";
        let group = ModuleRuleGroup {
            change_function: vec![("_test".to_string(), literal("(lambda: None)"))],
            ..ModuleRuleGroup::default()
        };

        let matches =
            find_matches("m", source, &group, resolve_literal).expect("matching should succeed");

        assert_eq!(matches.splices.len(), 1);
        let splice = &matches.splices[0];
        assert_eq!(&source[splice.start..splice.end], "def _test():\n    a = 1\n    return a");
        assert_eq!(splice.text, "_test = (lambda: None)");
    }

    #[test]
    fn test_function_at_end_of_file() {
        let source = "x = 1\ndef trailing():\n    return x";
        let group = ModuleRuleGroup {
            change_function: vec![("trailing".to_string(), literal("None"))],
            ..ModuleRuleGroup::default()
        };

        let matches =
            find_matches("m", source, &group, resolve_literal).expect("matching should succeed");
        let splice = &matches.splices[0];
        assert_eq!(&source[splice.start..splice.end], "def trailing():\n    return x");
    }

    #[test]
    fn test_indented_definition_is_not_top_level() {
        let source = "class C:\n    def method(self):\n        pass\n";
        let group = ModuleRuleGroup {
            change_function: vec![("method".to_string(), literal("None"))],
            ..ModuleRuleGroup::default()
        };

        let matches =
            find_matches("m", source, &group, resolve_literal).expect("matching should succeed");
        assert!(matches.splices.is_empty());
        assert_eq!(matches.diagnostics.len(), 1);
    }

    #[test]
    fn test_first_definition_wins_for_duplicates() {
        let source = "def f():\n    return 1\n\ndef f():\n    return 2\n";
        let group = ModuleRuleGroup {
            change_function: vec![("f".to_string(), literal("None"))],
            ..ModuleRuleGroup::default()
        };

        let matches =
            find_matches("m", source, &group, resolve_literal).expect("matching should succeed");
        assert_eq!(matches.splices.len(), 1);
        assert_eq!(matches.splices[0].start, 0);
        assert_eq!(&source[matches.splices[0].start..matches.splices[0].end], "def f():\n    return 1");
    }

    #[test]
    fn test_async_definition_header() {
        let source = "async def fetch():\n    await x()\n";
        let group = ModuleRuleGroup {
            change_function: vec![("fetch".to_string(), literal("None"))],
            ..ModuleRuleGroup::default()
        };

        let matches =
            find_matches("m", source, &group, resolve_literal).expect("matching should succeed");
        assert_eq!(matches.splices.len(), 1);
        assert_eq!(matches.splices[0].text, "fetch = None");
    }

    #[test]
    fn test_name_prefix_does_not_match() {
        let source = "def frobnicate():\n    pass\n";
        let group = ModuleRuleGroup {
            change_function: vec![("frob".to_string(), literal("None"))],
            ..ModuleRuleGroup::default()
        };

        let matches =
            find_matches("m", source, &group, resolve_literal).expect("matching should succeed");
        assert!(matches.splices.is_empty());
    }
}

//! Rule table data model.
//!
//! A `RuleSet` is an ordered, immutable mapping from fully-qualified module
//! name to the rewrite rules the compiler applies to that module's source
//! before compiling it. Order matters for deterministic reporting, lookup
//! is exact-key only.

use std::collections::HashMap;
use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

/// How a replacement value produces the text that gets substituted.
///
/// Rule authors distinguish the two modes by quoting: a value wrapped in
/// single quotes is literal text (`'pass'` substitutes the word `pass`),
/// anything else is an expression evaluated against the bindings the
/// group's guard context established (e.g. `repr(lib.PLATFORM)` to inject
/// a constant only knowable on the compile host).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplacementValue {
    /// Verbatim substitution text, outer quoting already stripped.
    Literal(String),
    /// Expression to evaluate in the guard context; its string value
    /// becomes the substitution text.
    Expression(String),
}

impl ReplacementValue {
    /// Classify a raw rule-table value into literal or expression mode.
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
            Self::Literal(trimmed[1..trimmed.len() - 1].to_string())
        } else {
            Self::Expression(trimmed.to_string())
        }
    }
}

/// Rewrite rules for one target module.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleRuleGroup {
    /// Human-readable summary, no semantic effect.
    #[serde(default)]
    pub description: String,

    /// Probe statements executed once, lazily, to decide applicability.
    ///
    /// Failure to execute any of them (e.g. the probed optional library is
    /// not installed) makes the whole group inapplicable, silently.
    #[serde(default)]
    pub context: Vec<String>,

    /// Literal needle -> replacement value, in declaration order.
    #[serde(default, deserialize_with = "ordered_values")]
    pub replacements: Vec<(String, ReplacementValue)>,

    /// Top-level function name -> replacement value bound to that name.
    #[serde(default, deserialize_with = "ordered_values")]
    pub change_function: Vec<(String, ReplacementValue)>,

    /// Full module body override. Applied last and supersedes everything
    /// the other rules produced.
    #[serde(default)]
    pub module_code: Option<String>,
}

impl ModuleRuleGroup {
    /// Whether the group declares no rewrites at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty() && self.change_function.is_empty() && self.module_code.is_none()
    }
}

/// Ordered rule table keyed by fully-qualified module name.
///
/// Constructed once at process start and immutable thereafter; shared by
/// reference with every module-processing worker.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    entries: Vec<(String, ModuleRuleGroup)>,
    index: HashMap<String, usize>,
}

impl RuleSet {
    /// Look up the rule group for a module. Exact-key match only, no
    /// wildcard or prefix matching.
    #[must_use]
    pub fn lookup(&self, module_key: &str) -> Option<&ModuleRuleGroup> {
        self.index.get(module_key).map(|&i| &self.entries[i].1)
    }

    /// Number of modules with declared rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table declares no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate rule groups in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModuleRuleGroup)> {
        self.entries.iter().map(|(key, group)| (key.as_str(), group))
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RuleSetVisitor;

        impl<'de> Visitor<'de> for RuleSetVisitor {
            type Value = RuleSet;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a mapping of module names to rule groups")
            }

            fn visit_map<A>(self, mut access: A) -> Result<RuleSet, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries: Vec<(String, ModuleRuleGroup)> = Vec::new();
                let mut index = HashMap::new();

                while let Some((key, group)) =
                    access.next_entry::<String, ModuleRuleGroup>()?
                {
                    if index.insert(key.clone(), entries.len()).is_some() {
                        // Last-write-wins is not allowed for module keys.
                        return Err(de::Error::custom(format!(
                            "duplicate module key '{key}'"
                        )));
                    }
                    entries.push((key, group));
                }

                Ok(RuleSet { entries, index })
            }
        }

        deserializer.deserialize_map(RuleSetVisitor)
    }
}

/// Deserialize a YAML mapping into declaration-ordered pairs with the
/// values classified into literal/expression mode.
fn ordered_values<'de, D>(deserializer: D) -> Result<Vec<(String, ReplacementValue)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedVisitor;

    impl<'de> Visitor<'de> for OrderedVisitor {
        type Value = Vec<(String, ReplacementValue)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a mapping of source text to replacement values")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut pairs: Vec<(String, ReplacementValue)> = Vec::new();

            while let Some((needle, raw)) = access.next_entry::<String, String>()? {
                if needle.is_empty() {
                    return Err(de::Error::custom("empty needle in rule group"));
                }
                if pairs.iter().any(|(existing, _)| existing == &needle) {
                    return Err(de::Error::custom(format!(
                        "duplicate needle '{needle}' within one rule group"
                    )));
                }
                pairs.push((needle, ReplacementValue::classify(&raw)));
            }

            Ok(pairs)
        }
    }

    deserializer.deserialize_map(OrderedVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_quoted_literal() {
        assert_eq!(
            ReplacementValue::classify("'pass'"),
            ReplacementValue::Literal("pass".to_string())
        );
    }

    #[test]
    fn test_classify_expression() {
        assert_eq!(
            ReplacementValue::classify("repr(lib.PLATFORM)"),
            ReplacementValue::Expression("repr(lib.PLATFORM)".to_string())
        );
    }

    #[test]
    fn test_classify_trims_padding() {
        assert_eq!(
            ReplacementValue::classify("  '(lambda: None)'  "),
            ReplacementValue::Literal("(lambda: None)".to_string())
        );
    }

    #[test]
    fn test_empty_group_detection() {
        let group = ModuleRuleGroup::default();
        assert!(group.is_empty());
    }
}

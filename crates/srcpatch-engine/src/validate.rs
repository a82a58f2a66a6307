//! Conflict detection and post-patch syntactic validation.
//!
//! Overlap checking is interval scheduling: sort spans by start offset and
//! compare neighbours. Parse validation uses tree-sitter's Python grammar;
//! a rewrite that yields error nodes is unsafe and must not be handed to
//! the compiler.

use tree_sitter::{Language, Node, Parser};

use crate::types::Splice;

/// First pair of colliding spans, if any.
pub(crate) fn find_overlap(splices: &[Splice]) -> Option<((usize, usize), (usize, usize))> {
    let mut spans: Vec<(usize, usize)> = splices.iter().map(|s| (s.start, s.end)).collect();
    spans.sort_unstable();

    for pair in spans.windows(2) {
        if pair[1].0 < pair[0].1 || pair[0] == pair[1] {
            return Some((pair[0], pair[1]));
        }
    }
    None
}

/// Check that `text` parses as Python.
///
/// Returns a description of the first syntax problem on failure.
pub(crate) fn parses_as_python(text: &str) -> Result<(), String> {
    let language: Language = tree_sitter_python::LANGUAGE.into();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| format!("failed to initialise Python grammar: {e}"))?;

    let Some(tree) = parser.parse(text, None) else {
        return Err("parser produced no tree".to_string());
    };

    match first_defect(tree.root_node()) {
        None => Ok(()),
        Some(node) => {
            let start = node.start_position();
            Err(format!(
                "syntax error at line {}, column {}",
                start.row + 1,
                start.column + 1
            ))
        }
    }
}

fn first_defect(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    // The grammar parses a block opener with no indented body as an empty
    // (block) without error nodes, but CPython rejects it with an
    // IndentationError. Reject it here so such a splice never reaches the
    // compiler.
    if node.kind() == "block" && node.named_child_count() == 0 {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_defect(child) {
            return Some(found);
        }
    }
    None
}

//! Splice application.
//!
//! Replacements are applied from the highest source offset to the lowest
//! so that earlier splices' offsets remain valid throughout the pass. The
//! caller guarantees the spans are non-overlapping (see `validate`).

use crate::types::Splice;

/// Apply non-overlapping splices to `source`.
pub(crate) fn apply_splices(source: &str, splices: &[Splice]) -> String {
    let mut ordered: Vec<&Splice> = splices.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start));

    let mut text = source.to_string();
    for splice in ordered {
        text.replace_range(splice.start..splice.end, &splice.text);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splice(start: usize, end: usize, text: &str) -> Splice {
        Splice {
            start,
            end,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_single_splice() {
        let source = "import setuptools\nrun()\n";
        let out = apply_splices(source, &[splice(0, 17, "pass")]);
        assert_eq!(out, "pass\nrun()\n");
    }

    #[test]
    fn test_order_of_declaration_does_not_matter() {
        // Two splices given lowest-offset first; offsets must stay valid.
        let source = "aaa bbb ccc";
        let splices = vec![splice(0, 3, "xxxxxx"), splice(8, 11, "y")];
        assert_eq!(apply_splices(source, &splices), "xxxxxx bbb y");
    }

    #[test]
    fn test_replacement_longer_and_shorter() {
        let source = "one two three";
        let splices = vec![splice(4, 7, "2"), splice(8, 13, "33333333")];
        assert_eq!(apply_splices(source, &splices), "one 2 33333333");
    }

    #[test]
    fn test_no_splices_is_identity() {
        assert_eq!(apply_splices("unchanged", &[]), "unchanged");
    }
}

//! Entry point detection.
//!
//! A declaration is an analysis root when it carries an attribute whose
//! simple name equals the configured marker. The match is textual and
//! unresolved: an unrelated attribute sharing the simple name anywhere in
//! the program also satisfies the detector. That imprecision is part of the
//! contract, not something to quietly tighten.

use crate::syntax::Declaration;

/// Default marker attribute simple name.
pub const DEFAULT_MARKER: &str = "Deterministic";

/// Whether a declaration is an analysis root.
pub fn is_entry_point(decl: &Declaration, marker: &str) -> bool {
    decl.attributes
        .iter()
        .any(|attr| simple_name(attr) == marker)
}

/// Final identifier segment of a possibly-qualified attribute name.
fn simple_name(attribute: &str) -> &str {
    attribute.rsplit('.').next().unwrap_or(attribute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Span;

    fn decl_with_attrs(attrs: &[&str]) -> Declaration {
        Declaration {
            unit: 0,
            node_id: 1,
            name: "Run".to_string(),
            container: Some("C".to_string()),
            attributes: attrs.iter().map(|s| s.to_string()).collect(),
            span: Span {
                start_byte: 0,
                end_byte: 10,
                start_line: 1,
                start_col: 1,
                end_line: 1,
                end_col: 11,
            },
            body_range: Some((5, 10)),
        }
    }

    #[test]
    fn test_simple_marker_matches() {
        let decl = decl_with_attrs(&["Deterministic"]);
        assert!(is_entry_point(&decl, DEFAULT_MARKER));
    }

    #[test]
    fn test_qualified_marker_matches_on_simple_name() {
        let decl = decl_with_attrs(&["Acme.Workflows.Deterministic"]);
        assert!(is_entry_point(&decl, DEFAULT_MARKER));
    }

    #[test]
    fn test_unrelated_attribute_does_not_match() {
        let decl = decl_with_attrs(&["Obsolete", "TestMethod"]);
        assert!(!is_entry_point(&decl, DEFAULT_MARKER));
    }

    #[test]
    fn test_no_attributes() {
        let decl = decl_with_attrs(&[]);
        assert!(!is_entry_point(&decl, DEFAULT_MARKER));
    }

    #[test]
    fn test_custom_marker() {
        let decl = decl_with_attrs(&["Replayable"]);
        assert!(!is_entry_point(&decl, DEFAULT_MARKER));
        assert!(is_entry_point(&decl, "Replayable"));
    }

    #[test]
    fn test_same_simple_name_different_namespace_still_matches() {
        // Documented limitation: the detector matches by simple name only.
        let decl = decl_with_attrs(&["ThirdParty.Unrelated.Deterministic"]);
        assert!(is_entry_point(&decl, DEFAULT_MARKER));
    }
}

//! C# parsing and fact extraction using tree-sitter.
//!
//! Extracts:
//! - Method declarations and local functions (the units the engine walks)
//! - Attribute names on those declarations
//! - Type declarations (for qualified call resolution)
//! - `using` directives (plain, static, alias) for name resolution

use std::path::Path;

use once_cell::sync::Lazy;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use super::program::{Declaration, SourceUnit};
use super::{Span, SyntaxError};

static LANGUAGE: Lazy<Language> = Lazy::new(|| tree_sitter_c_sharp::LANGUAGE.into());

/// Tree-sitter query for method-like declarations and type declarations.
const DECLARATION_QUERY: &str = r#"
(method_declaration
  name: (identifier) @method_name
) @method

(local_function_statement
  name: (identifier) @local_name
) @local

(class_declaration
  name: (identifier) @type_name
) @type_decl

(struct_declaration
  name: (identifier) @type_name
) @type_decl

(interface_declaration
  name: (identifier) @type_name
) @type_decl

(record_declaration
  name: (identifier) @type_name
) @type_decl
"#;

/// A `using` directive extracted from a source unit.
#[derive(Debug, Clone)]
pub struct UsingDirective {
    /// The imported namespace or type path (e.g., "System.Threading").
    pub path: String,
    /// Alias name for `using Alias = Target;` directives.
    pub alias: Option<String>,
    /// Whether this is a `using static` directive.
    pub is_static: bool,
    /// Source span of the directive.
    pub span: Span,
}

/// Parse C# source into a tree-sitter tree.
pub fn parse(path: &Path, source: &[u8]) -> Result<tree_sitter::Tree, SyntaxError> {
    let mut parser = Parser::new();
    parser
        .set_language(&LANGUAGE)
        .map_err(|_| SyntaxError::Parse(path.to_path_buf()))?;
    parser
        .parse(source, None)
        .ok_or_else(|| SyntaxError::Parse(path.to_path_buf()))
}

/// Extract method declarations, local functions, and declared type names.
///
/// Declarations are returned sorted by position; their `unit` field is
/// filled in by the caller once the unit's index is known.
pub fn extract_declarations(
    unit: &SourceUnit,
) -> anyhow::Result<(Vec<Declaration>, Vec<String>)> {
    let query = Query::new(&LANGUAGE, DECLARATION_QUERY)?;
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, unit.tree.root_node(), unit.source.as_slice());

    let mut declarations = Vec::new();
    let mut types = Vec::new();
    let mut seen = std::collections::HashSet::new();

    while let Some(m) = matches.next() {
        let mut name = String::new();
        let mut decl_node = None;
        let mut is_type = false;

        for capture in m.captures {
            let capture_name = query.capture_names()[capture.index as usize];
            match capture_name {
                "method_name" | "local_name" => {
                    name = unit.node_text(capture.node).to_string();
                }
                "type_name" => {
                    name = unit.node_text(capture.node).to_string();
                    is_type = true;
                }
                "method" | "local" | "type_decl" => {
                    decl_node = Some(capture.node);
                }
                _ => {}
            }
        }

        let node = match decl_node {
            Some(n) => n,
            None => continue,
        };
        if name.is_empty() || !seen.insert(node.id()) {
            continue;
        }

        if is_type {
            types.push(name);
            continue;
        }

        declarations.push(Declaration {
            unit: 0,
            node_id: node.id(),
            name,
            container: containing_type(unit, node),
            attributes: attribute_names(unit, node),
            span: Span::from_node(node),
            body_range: body_range(node),
        });
    }

    declarations.sort_by_key(|d| (d.span.start_byte, d.name.clone()));
    types.sort();
    types.dedup();

    Ok((declarations, types))
}

/// Extract all `using` directives from a source unit.
///
/// Directives inside namespace blocks are included; C# scoping subtleties
/// beyond that are ignored (one resolution scope per unit).
pub fn extract_usings(unit: &SourceUnit) -> Vec<UsingDirective> {
    let mut usings = Vec::new();
    each_descendant(unit.tree.root_node(), &mut |node| {
        if node.kind() != "using_directive" {
            return true;
        }

        let mut alias = None;
        let mut path = String::new();
        let mut is_static = false;

        let mut walker = node.walk();
        for child in node.children(&mut walker) {
            match child.kind() {
                "static" => is_static = true,
                "name_equals" => {
                    // `using Alias = Target;` - the alias is the identifier
                    // inside the name_equals node.
                    if let Some(id) = child.named_child(0) {
                        alias = Some(unit.node_text(id).to_string());
                    }
                }
                "identifier" | "qualified_name" => {
                    path = unit.node_text(child).to_string();
                }
                _ => {}
            }
        }

        if !path.is_empty() {
            usings.push(UsingDirective {
                path,
                alias,
                is_static,
                span: Span::from_node(node),
            });
        }
        // Using directives do not nest.
        false
    });

    usings.sort_by(|a, b| a.span.start_byte.cmp(&b.span.start_byte));
    usings
}

/// Find the enclosing namespace of a unit, if any.
///
/// The first namespace declaration found wins; multi-namespace files keep
/// only that one as resolution context.
pub fn enclosing_namespace(unit: &SourceUnit) -> Option<String> {
    let mut found = None;
    each_descendant(unit.tree.root_node(), &mut |node| {
        if found.is_some() {
            return false;
        }
        match node.kind() {
            "namespace_declaration" | "file_scoped_namespace_declaration" => {
                if let Some(name) = node.child_by_field_name("name") {
                    found = Some(unit.node_text(name).to_string());
                }
                false
            }
            _ => true,
        }
    });
    found
}

/// The containing type name for a declaration (enclosing class/struct/
/// record/interface), if any.
fn containing_type(unit: &SourceUnit, node: Node) -> Option<String> {
    let mut current = node.parent();
    while let Some(parent) = current {
        match parent.kind() {
            "class_declaration"
            | "struct_declaration"
            | "record_declaration"
            | "interface_declaration" => {
                return parent
                    .child_by_field_name("name")
                    .map(|n| unit.node_text(n).to_string());
            }
            _ => {}
        }
        current = parent.parent();
    }
    None
}

/// Attribute names attached to a declaration, as written (possibly
/// qualified). Simple-name comparison happens at the entry point detector.
fn attribute_names(unit: &SourceUnit, node: Node) -> Vec<String> {
    let mut names = Vec::new();
    let mut walker = node.walk();
    for child in node.children(&mut walker) {
        if child.kind() != "attribute_list" {
            continue;
        }
        let mut inner = child.walk();
        for attr in child.named_children(&mut inner) {
            if attr.kind() != "attribute" {
                continue;
            }
            if let Some(name) = attr.child_by_field_name("name") {
                names.push(unit.node_text(name).to_string());
            }
        }
    }
    names
}

/// Byte range of a declaration's body (block or expression body), if any.
fn body_range(node: Node) -> Option<(usize, usize)> {
    if let Some(body) = node.child_by_field_name("body") {
        return Some((body.start_byte(), body.end_byte()));
    }
    // Expression-bodied members: `int F() => ...;`
    let mut walker = node.walk();
    let result = node
        .children(&mut walker)
        .find(|n| n.kind() == "arrow_expression_clause")
        .map(|n| (n.start_byte(), n.end_byte()));
    result
}

/// Depth-first walk over named descendants. The callback returns whether
/// to descend into the node's children.
pub fn each_descendant(root: Node, f: &mut impl FnMut(Node) -> bool) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if !f(node) {
            continue;
        }
        let mut walker = node.walk();
        for child in node.named_children(&mut walker) {
            stack.push(child);
        }
    }
}

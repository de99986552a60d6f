//! Whole-program view over parsed source units.
//!
//! The [`Program`] is the compilation context the engine resolves against:
//! it owns every parsed [`SourceUnit`] and indexes their declarations so the
//! call-graph walker can locate a callee's declaration across units.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tree_sitter::Node;

use super::csharp;
use super::{Span, SyntaxError, UsingDirective};

/// One parsed compilation file. Owns its source and AST.
pub struct SourceUnit {
    /// Index of this unit within its program.
    pub id: usize,
    /// Path relative to the scan base directory.
    pub path: PathBuf,
    /// Raw source bytes (kept for node text extraction).
    pub source: Vec<u8>,
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
}

impl SourceUnit {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// Display path for findings.
    pub fn display_path(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

/// A method or local function declaration.
///
/// Identity is (unit, node_id) - two declarations sharing a name are
/// distinct entities.
#[derive(Debug, Clone)]
pub struct Declaration {
    /// Index of the owning source unit.
    pub unit: usize,
    /// AST node identity within the unit's tree.
    pub node_id: usize,
    /// Declared name.
    pub name: String,
    /// Enclosing type name, if any.
    pub container: Option<String>,
    /// Attribute names as written (possibly qualified).
    pub attributes: Vec<String>,
    /// Span of the whole declaration.
    pub span: Span,
    /// Byte range of the body, if the declaration has one.
    pub body_range: Option<(usize, usize)>,
}

/// The whole-program compilation context.
pub struct Program {
    units: Vec<SourceUnit>,
    usings: Vec<Vec<UsingDirective>>,
    namespaces: Vec<Option<String>>,
    decls: Vec<Declaration>,
    /// Method simple name -> declaration indices.
    by_name: HashMap<String, Vec<usize>>,
    /// (containing type, method name) -> declaration indices.
    by_qualified: HashMap<(String, String), Vec<usize>>,
    /// Type names declared anywhere in the program.
    types: HashSet<String>,
}

impl Program {
    /// Parse the given files and build the program index.
    ///
    /// Files are parsed in parallel; unparseable files are reported to
    /// stderr and skipped rather than failing the scan. Units are ordered
    /// by path so ids are deterministic.
    pub fn load<P: AsRef<Path>>(base_dir: P, files: &[PathBuf]) -> anyhow::Result<Self> {
        let base_dir = base_dir.as_ref();

        let parsed: Vec<Result<(PathBuf, Vec<u8>, tree_sitter::Tree), SyntaxError>> = files
            .par_iter()
            .map(|path| {
                let source = fs::read(path).map_err(|e| SyntaxError::Io {
                    path: path.clone(),
                    source: e,
                })?;
                let tree = csharp::parse(path, &source)?;
                let rel = path
                    .strip_prefix(base_dir)
                    .unwrap_or(path)
                    .to_path_buf();
                Ok((rel, source, tree))
            })
            .collect();

        let mut loaded = Vec::new();
        for result in parsed {
            match result {
                Ok(unit) => loaded.push(unit),
                Err(e) => eprintln!("Warning: failed to parse file: {}", e),
            }
        }

        // Sort by path for deterministic unit ids.
        loaded.sort_by(|a, b| a.0.cmp(&b.0));

        let units: Vec<SourceUnit> = loaded
            .into_iter()
            .enumerate()
            .map(|(id, (path, source, tree))| SourceUnit {
                id,
                path,
                source,
                tree,
            })
            .collect();

        Self::from_units(units)
    }

    /// Build the index over already-parsed units.
    pub fn from_units(units: Vec<SourceUnit>) -> anyhow::Result<Self> {
        let mut decls = Vec::new();
        let mut usings = Vec::new();
        let mut namespaces = Vec::new();
        let mut types = HashSet::new();

        for unit in &units {
            let (mut unit_decls, unit_types) = csharp::extract_declarations(unit)?;
            for decl in &mut unit_decls {
                decl.unit = unit.id;
            }
            decls.extend(unit_decls);
            types.extend(unit_types);
            usings.push(csharp::extract_usings(unit));
            namespaces.push(csharp::enclosing_namespace(unit));
        }

        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_qualified: HashMap<(String, String), Vec<usize>> = HashMap::new();
        for (idx, decl) in decls.iter().enumerate() {
            by_name.entry(decl.name.clone()).or_default().push(idx);
            if let Some(container) = &decl.container {
                by_qualified
                    .entry((container.clone(), decl.name.clone()))
                    .or_default()
                    .push(idx);
            }
        }

        Ok(Self {
            units,
            usings,
            namespaces,
            decls,
            by_name,
            by_qualified,
            types,
        })
    }

    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    pub fn unit(&self, id: usize) -> &SourceUnit {
        &self.units[id]
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.decls
    }

    pub fn declaration(&self, idx: usize) -> &Declaration {
        &self.decls[idx]
    }

    /// Using directives of a unit.
    pub fn usings(&self, unit: usize) -> &[UsingDirective] {
        &self.usings[unit]
    }

    /// Enclosing namespace of a unit, if any.
    pub fn namespace(&self, unit: usize) -> Option<&str> {
        self.namespaces[unit].as_deref()
    }

    /// Whether a type with this simple name is declared in the program.
    pub fn declares_type(&self, name: &str) -> bool {
        self.types.contains(name)
    }

    /// Locate a callee declaration by simple name.
    ///
    /// Narrowest scope that has any match wins: the caller's containing
    /// type, then the caller's unit, then the whole program. All same-name
    /// declarations within that scope are returned (overloads are not
    /// distinguished).
    pub fn resolve_callee(
        &self,
        name: &str,
        caller_unit: usize,
        caller_container: Option<&str>,
    ) -> Vec<usize> {
        if let Some(container) = caller_container {
            let in_container =
                self.lookup_qualified(container, name);
            if !in_container.is_empty() {
                return in_container;
            }
        }

        let all = match self.by_name.get(name) {
            Some(indices) => indices,
            None => return Vec::new(),
        };

        let in_unit: Vec<usize> = all
            .iter()
            .copied()
            .filter(|&i| self.decls[i].unit == caller_unit)
            .collect();
        if !in_unit.is_empty() {
            return in_unit;
        }

        all.clone()
    }

    /// Locate declarations of `Type.Method` form.
    pub fn lookup_qualified(&self, type_name: &str, method: &str) -> Vec<usize> {
        self.by_qualified
            .get(&(type_name.to_string(), method.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Re-locate the body node of a declaration within its unit's tree.
    pub fn body_node(&self, idx: usize) -> Option<Node<'_>> {
        let decl = &self.decls[idx];
        let (start, end) = decl.body_range?;
        let unit = &self.units[decl.unit];
        unit.tree
            .root_node()
            .descendant_for_byte_range(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program_from(sources: &[(&str, &str)]) -> Program {
        let units: Vec<SourceUnit> = sources
            .iter()
            .enumerate()
            .map(|(id, (name, source))| {
                let path = PathBuf::from(name);
                let tree = csharp::parse(&path, source.as_bytes()).unwrap();
                SourceUnit {
                    id,
                    path,
                    source: source.as_bytes().to_vec(),
                    tree,
                }
            })
            .collect();
        Program::from_units(units).unwrap()
    }

    #[test]
    fn test_index_across_units() {
        let program = program_from(&[
            (
                "A.cs",
                "class A { void Entry() { Helper(); } }",
            ),
            (
                "B.cs",
                "class B { public static void Helper() { } }",
            ),
        ]);

        assert_eq!(program.unit_count(), 2);
        assert!(program.declares_type("A"));
        assert!(program.declares_type("B"));

        let helpers = program.lookup_qualified("B", "Helper");
        assert_eq!(helpers.len(), 1);
        assert_eq!(program.declaration(helpers[0]).unit, 1);
    }

    #[test]
    fn test_same_name_distinct_identity() {
        let program = program_from(&[
            ("A.cs", "class A { void Run() { } }"),
            ("B.cs", "class B { void Run() { } }"),
        ]);

        let runs: Vec<_> = program
            .declarations()
            .iter()
            .filter(|d| d.name == "Run")
            .collect();
        assert_eq!(runs.len(), 2);
        assert_ne!(
            (runs[0].unit, runs[0].node_id),
            (runs[1].unit, runs[1].node_id)
        );
    }

    #[test]
    fn test_resolve_callee_prefers_container() {
        let program = program_from(&[
            (
                "A.cs",
                "class A { void Entry() { Helper(); } void Helper() { } }",
            ),
            ("B.cs", "class B { void Helper() { } }"),
        ]);

        let resolved = program.resolve_callee("Helper", 0, Some("A"));
        assert_eq!(resolved.len(), 1);
        assert_eq!(program.declaration(resolved[0]).container.as_deref(), Some("A"));
    }

    #[test]
    fn test_resolve_callee_falls_back_to_program() {
        let program = program_from(&[
            ("A.cs", "class A { void Entry() { Helper(); } }"),
            ("B.cs", "class B { void Helper() { } }"),
        ]);

        let resolved = program.resolve_callee("Helper", 0, Some("A"));
        assert_eq!(resolved.len(), 1);
        assert_eq!(program.declaration(resolved[0]).unit, 1);
    }

    #[test]
    fn test_resolve_unknown_callee_is_empty() {
        let program = program_from(&[("A.cs", "class A { void Entry() { } }")]);
        assert!(program.resolve_callee("Missing", 0, Some("A")).is_empty());
    }

    #[test]
    fn test_body_node_roundtrip() {
        let program = program_from(&[(
            "A.cs",
            "class A { void Entry() { int x = 1; } }",
        )]);

        let idx = program
            .declarations()
            .iter()
            .position(|d| d.name == "Entry")
            .unwrap();
        let body = program.body_node(idx).unwrap();
        assert_eq!(body.kind(), "block");
    }
}

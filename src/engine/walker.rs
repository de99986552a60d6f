//! Call-graph walking from entry points.
//!
//! Per root: classify the body, then follow every call that is not itself a
//! direct catalog match into its declaration, wherever that declaration
//! lives. A shared visited set makes each declaration's classification
//! happen at most once per session, which both bounds the work and
//! terminates cycles; a construct k calls deep is reported exactly once, at
//! its true location, the first time any path reaches its declaration.
//!
//! The walk uses an explicit worklist rather than native recursion, so
//! stack depth stays bounded on deep call chains.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use tree_sitter::Node;

use crate::syntax::{each_descendant, Declaration, Program, SourceUnit, Span};

use super::catalog::{Catalog, ShapeKind};
use super::classifier::Classifier;
use super::findings::{Finding, FindingRule};
use super::resolver::Resolver;

/// Declarations already classified this session.
///
/// Shared across concurrently-walked roots. Marking is one atomic
/// insert-returns-newly-added under a single write-lock acquisition, never
/// a separate contains/insert pair; membership is add-only.
#[derive(Default)]
pub struct VisitedSet {
    inner: RwLock<HashSet<usize>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a declaration visited. Returns true iff it was newly added.
    pub fn mark(&self, decl: usize) -> bool {
        self.inner.write().unwrap().insert(decl)
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One analysis session: shared state for all roots walked against a
/// program. Dropped when the session ends; nothing persists.
pub struct Session<'a> {
    program: &'a Program,
    catalog: &'a Catalog,
    resolver: Resolver,
    visited: VisitedSet,
    classified: AtomicUsize,
}

/// The target of an invocation, as written at the call site.
struct CallTarget {
    /// Qualifier text, if the call is of `Qualifier.Name(...)` form.
    /// `this.Name(...)` counts as unqualified.
    qualifier: Option<String>,
    /// The invoked member's simple name (generic arguments stripped).
    name: String,
    /// Node identity of the function expression, for resolution caching.
    function_id: usize,
}

impl<'a> Session<'a> {
    pub fn new(program: &'a Program, catalog: &'a Catalog) -> Self {
        Self {
            program,
            catalog,
            resolver: Resolver::new(),
            visited: VisitedSet::new(),
            classified: AtomicUsize::new(0),
        }
    }

    /// Number of declaration bodies classified so far in this session.
    pub fn classified_count(&self) -> usize {
        self.classified.load(Ordering::Relaxed)
    }

    /// Walk one root and return the findings it contributed.
    ///
    /// Declarations already visited by another root are skipped; their
    /// findings were reported by whichever root got there first.
    pub fn analyze_root(&self, root: usize) -> Vec<Finding> {
        let classifier = Classifier::new(self.program, self.catalog, &self.resolver);
        let mut findings = Vec::new();
        let mut work = vec![root];

        while let Some(decl_idx) = work.pop() {
            if !self.visited.mark(decl_idx) {
                continue;
            }

            let body = match self.program.body_node(decl_idx) {
                Some(body) => body,
                None => continue,
            };

            self.classified.fetch_add(1, Ordering::Relaxed);

            let decl = self.program.declaration(decl_idx);
            classifier.classify_body(decl.unit, body, &mut findings);
            self.walk_calls(decl, body, &mut findings, &mut work);
        }

        findings
    }

    /// Inspect every invocation in a body: catalog match or descent.
    fn walk_calls(
        &self,
        decl: &Declaration,
        body: Node,
        findings: &mut Vec<Finding>,
        work: &mut Vec<usize>,
    ) {
        let unit = self.program.unit(decl.unit);
        each_descendant(body, &mut |node| {
            if node.kind() == "local_function_statement" {
                return false;
            }
            if node.kind() != "invocation_expression" {
                return true;
            }

            let target = match call_target(unit, node) {
                Some(target) => target,
                // No resolvable call target (delegate expression, dynamic
                // dispatch); skip this call silently.
                None => return true,
            };

            if let Some(matched) = self.match_call(decl.unit, &target) {
                // Known dangerous leaf: report at the call site, do not
                // descend into the callee.
                findings.push(Finding::new(
                    FindingRule::NondeterministicCall,
                    matched,
                    &unit.display_path(),
                    &Span::from_node(node),
                ));
                return true;
            }

            for callee in self.resolve_callee_decls(decl, &target) {
                work.push(callee);
            }
            true
        });
    }

    /// Test a call target against the call table, via resolved candidates.
    fn match_call(&self, unit: usize, target: &CallTarget) -> Option<String> {
        let text = match &target.qualifier {
            Some(qualifier) => format!("{}.{}", qualifier, target.name),
            None => target.name.clone(),
        };
        let candidates =
            self.resolver
                .resolve(self.program, unit, target.function_id, &text);
        self.catalog.match_candidates(ShapeKind::Call, &candidates)
    }

    /// Locate the program declarations a call may refer to.
    ///
    /// External callees (no source in the program) resolve to nothing and
    /// are skipped - an intentional under-approximation, not an error.
    fn resolve_callee_decls(&self, caller: &Declaration, target: &CallTarget) -> Vec<usize> {
        match &target.qualifier {
            None => self.program.resolve_callee(
                &target.name,
                caller.unit,
                caller.container.as_deref(),
            ),
            Some(qualifier) => {
                let type_name = qualifier.rsplit('.').next().unwrap_or(qualifier);
                if self.program.declares_type(type_name) {
                    self.program.lookup_qualified(type_name, &target.name)
                } else {
                    Vec::new()
                }
            }
        }
    }
}

/// Extract the target of an invocation expression.
fn call_target(unit: &SourceUnit, call: Node) -> Option<CallTarget> {
    let function = call.child_by_field_name("function")?;
    match function.kind() {
        "identifier" => Some(CallTarget {
            qualifier: None,
            name: unit.node_text(function).to_string(),
            function_id: function.id(),
        }),
        "generic_name" => Some(CallTarget {
            qualifier: None,
            name: generic_base_name(unit, function)?,
            function_id: function.id(),
        }),
        "member_access_expression" => {
            let name_node = function.child_by_field_name("name")?;
            let name = match name_node.kind() {
                "generic_name" => generic_base_name(unit, name_node)?,
                _ => unit.node_text(name_node).to_string(),
            };
            let qualifier_node = function.child_by_field_name("expression")?;
            let qualifier = match qualifier_node.kind() {
                "this_expression" => None,
                _ => Some(unit.node_text(qualifier_node).to_string()),
            };
            Some(CallTarget {
                qualifier,
                name,
                function_id: function.id(),
            })
        }
        _ => None,
    }
}

/// The identifier under a generic name (`Foo<T>` -> `Foo`).
fn generic_base_name(unit: &SourceUnit, node: Node) -> Option<String> {
    let mut walker = node.walk();
    let result = node
        .named_children(&mut walker)
        .find(|n| n.kind() == "identifier")
        .map(|n| unit.node_text(n).to_string());
    result
}

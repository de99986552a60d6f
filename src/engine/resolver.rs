//! Symbol resolution through `using` directives, with per-session caching.
//!
//! Resolution is heuristic: without assembly metadata, an expression's
//! qualified identity is approximated by the set of fully qualified names
//! its source unit's `using` directives could make it mean. The catalog is
//! then consulted per candidate. An empty candidate set is a normal
//! outcome, handled by callers as "skip".

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::syntax::Program;

/// The resolution context of one source unit.
#[derive(Debug, Clone, Default)]
pub struct UsingScope {
    /// Plain `using Ns;` namespaces, in directive order.
    namespaces: Vec<String>,
    /// `using static Type;` targets, in directive order.
    statics: Vec<String>,
    /// `using Alias = Target;` mappings.
    aliases: HashMap<String, String>,
    /// Enclosing namespace of the unit, if any.
    namespace: Option<String>,
}

impl UsingScope {
    /// Build the scope for a unit from its extracted directives.
    pub fn from_unit(program: &Program, unit: usize) -> Self {
        let mut scope = Self {
            namespace: program.namespace(unit).map(str::to_string),
            ..Self::default()
        };

        for directive in program.usings(unit) {
            if let Some(alias) = &directive.alias {
                scope
                    .aliases
                    .insert(alias.clone(), directive.path.clone());
            } else if directive.is_static {
                scope.statics.push(directive.path.clone());
            } else {
                scope.namespaces.push(directive.path.clone());
            }
        }

        scope
    }

    /// Fully qualified candidate names for an expression text.
    ///
    /// Most specific first: alias expansion, then `using static` targets
    /// (bare names only), the text as written, plain `using` namespaces,
    /// and the enclosing namespace. Text that is not a plain dotted
    /// identifier chain yields no candidates.
    pub fn candidates(&self, text: &str) -> Vec<String> {
        if !is_dotted_identifier(text) {
            return Vec::new();
        }

        let mut out = Vec::new();

        let (head, rest) = match text.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (text, None),
        };
        if let Some(target) = self.aliases.get(head) {
            match rest {
                Some(rest) => out.push(format!("{}.{}", target, rest)),
                None => out.push(target.clone()),
            }
        }

        if rest.is_none() {
            for static_target in &self.statics {
                out.push(format!("{}.{}", static_target, text));
            }
        }

        out.push(text.to_string());

        for ns in &self.namespaces {
            out.push(format!("{}.{}", ns, text));
        }
        if let Some(ns) = &self.namespace {
            out.push(format!("{}.{}", ns, text));
        }

        out.dedup();
        out
    }
}

/// Session-scoped resolver with concurrency-safe caches.
///
/// Scopes are cached per unit; candidate sets per AST node identity, so a
/// cross-unit declaration visited from many call sites resolves its nodes
/// once. Both caches use get-or-compute under a single write-lock
/// acquisition.
#[derive(Default)]
pub struct Resolver {
    scopes: RwLock<HashMap<usize, Arc<UsingScope>>>,
    candidates: RwLock<HashMap<(usize, usize), Arc<Vec<String>>>>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The resolution scope of a unit (cached).
    pub fn scope(&self, program: &Program, unit: usize) -> Arc<UsingScope> {
        if let Some(scope) = self.scopes.read().unwrap().get(&unit) {
            return scope.clone();
        }
        let mut scopes = self.scopes.write().unwrap();
        scopes
            .entry(unit)
            .or_insert_with(|| Arc::new(UsingScope::from_unit(program, unit)))
            .clone()
    }

    /// Candidate qualified names for a node's text (cached by node identity).
    pub fn resolve(
        &self,
        program: &Program,
        unit: usize,
        node_id: usize,
        text: &str,
    ) -> Arc<Vec<String>> {
        let key = (unit, node_id);
        if let Some(cached) = self.candidates.read().unwrap().get(&key) {
            return cached.clone();
        }
        let scope = self.scope(program, unit);
        let mut cache = self.candidates.write().unwrap();
        cache
            .entry(key)
            .or_insert_with(|| Arc::new(scope.candidates(text)))
            .clone()
    }
}

fn is_dotted_identifier(text: &str) -> bool {
    !text.is_empty()
        && text.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Program, SourceUnit};
    use std::path::PathBuf;

    fn scope_of(source: &str) -> (Program, Arc<UsingScope>) {
        let path = PathBuf::from("Test.cs");
        let tree = crate::syntax::parse_source(&path, source.as_bytes()).unwrap();
        let unit = SourceUnit {
            id: 0,
            path,
            source: source.as_bytes().to_vec(),
            tree,
        };
        let program = Program::from_units(vec![unit]).unwrap();
        let resolver = Resolver::new();
        let scope = resolver.scope(&program, 0);
        (program, scope)
    }

    #[test]
    fn test_plain_using_prefixes_path() {
        let (_, scope) = scope_of("using System;\nclass C { }");
        let candidates = scope.candidates("DateTime.Now");
        assert!(candidates.contains(&"System.DateTime.Now".to_string()));
        assert!(candidates.contains(&"DateTime.Now".to_string()));
    }

    #[test]
    fn test_static_using_qualifies_bare_name() {
        let (_, scope) = scope_of("using static System.DateTime;\nclass C { }");
        let candidates = scope.candidates("Now");
        assert!(candidates.contains(&"System.DateTime.Now".to_string()));
    }

    #[test]
    fn test_static_using_does_not_apply_to_dotted_paths() {
        let (_, scope) = scope_of("using static System.DateTime;\nclass C { }");
        let candidates = scope.candidates("Other.Now");
        assert!(!candidates.contains(&"System.DateTime.Other.Now".to_string()));
    }

    #[test]
    fn test_alias_expansion() {
        let (_, scope) = scope_of("using Sys = System;\nclass C { }");
        let candidates = scope.candidates("Sys.DateTime.Now");
        assert_eq!(candidates[0], "System.DateTime.Now");
    }

    #[test]
    fn test_alias_of_type_for_construction() {
        let (_, scope) = scope_of("using Rng = System.Random;\nclass C { }");
        let candidates = scope.candidates("Rng");
        assert_eq!(candidates[0], "System.Random");
    }

    #[test]
    fn test_non_identifier_text_has_no_candidates() {
        let (_, scope) = scope_of("using System;\nclass C { }");
        assert!(scope.candidates("foo().Bar").is_empty());
        assert!(scope.candidates("List<int>").is_empty());
        assert!(scope.candidates("").is_empty());
    }

    #[test]
    fn test_enclosing_namespace_candidate() {
        let (_, scope) = scope_of("namespace Acme { class C { } }");
        let candidates = scope.candidates("Clock.Now");
        assert!(candidates.contains(&"Acme.Clock.Now".to_string()));
    }

    #[test]
    fn test_resolver_caches_by_node() {
        let (program, _) = scope_of("using System;\nclass C { }");
        let resolver = Resolver::new();
        let first = resolver.resolve(&program, 0, 42, "DateTime.Now");
        let second = resolver.resolve(&program, 0, 42, "DateTime.Now");
        assert!(Arc::ptr_eq(&first, &second));
    }
}

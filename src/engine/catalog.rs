//! Catalog of known nondeterministic operations.
//!
//! Four independent tables, one per syntactic shape. The static defaults
//! are closed; a config file may append entries per table, merged once
//! before a session starts. Tables never change during a session.

use phf::{phf_set, Set};

/// The four syntactic shapes the engine recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// An invocation expression.
    Call,
    /// A member access not serving as a call target.
    MemberAccess,
    /// A bare name reached through a `using static` import.
    BareName,
    /// An object creation expression.
    Construction,
}

/// How a qualified name is tested against a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Exact equality of the resolved qualified name.
    Exact,
    /// The resolved name must start with the cataloged entry. Required for
    /// calls, whose resolved symbol text can carry suffixes beyond the
    /// documented member name.
    Prefix,
}

impl ShapeKind {
    pub fn match_mode(self) -> MatchMode {
        match self {
            ShapeKind::Call => MatchMode::Prefix,
            ShapeKind::MemberAccess | ShapeKind::BareName | ShapeKind::Construction => {
                MatchMode::Exact
            }
        }
    }
}

/// Call-shape entries: qualified static method names, prefix-matched.
static CALL_RULES: &[&str] = &[
    "System.Console.Read",
    "System.Console.ReadKey",
    "System.Console.ReadLine",
    "System.Diagnostics.Stopwatch.GetTimestamp",
    "System.Diagnostics.Stopwatch.StartNew",
    "System.Environment.ExpandEnvironmentVariables",
    "System.Environment.GetCommandLineArgs",
    "System.Environment.GetEnvironmentVariable",
    "System.Environment.GetEnvironmentVariables",
    "System.Guid.NewGuid",
    "System.IO.Directory.GetFiles",
    "System.IO.File.Exists",
    "System.IO.File.ReadAllBytes",
    "System.IO.File.ReadAllLines",
    "System.IO.File.ReadAllText",
    "System.IO.Path.GetRandomFileName",
    "System.IO.Path.GetTempFileName",
    "System.Net.Dns.GetHostName",
    "System.OperatingSystem.IsWindows",
    "System.Security.Cryptography.RandomNumberGenerator.Create",
    "System.Security.Cryptography.RandomNumberGenerator.GetBytes",
    "System.Security.Cryptography.RandomNumberGenerator.GetInt32",
    "System.Threading.Tasks.Task.Delay",
    "System.Threading.Thread.Sleep",
    "System.Threading.Thread.Yield",
];

/// Member-access-shape entries: qualified property/field names, exact.
static MEMBER_ACCESS_RULES: Set<&'static str> = phf_set! {
    "System.Console.In",
    "System.DateTime.Now",
    "System.DateTime.Today",
    "System.DateTime.UtcNow",
    "System.DateTimeOffset.Now",
    "System.DateTimeOffset.UtcNow",
    "System.Environment.CommandLine",
    "System.Environment.CurrentDirectory",
    "System.Environment.CurrentManagedThreadId",
    "System.Environment.MachineName",
    "System.Environment.ProcessId",
    "System.Environment.TickCount",
    "System.Environment.TickCount64",
    "System.Threading.Thread.CurrentThread",
};

/// Construction-shape entries: qualified type names whose construction is
/// itself nondeterministic, exact.
static CONSTRUCTION_RULES: Set<&'static str> = phf_set! {
    "System.Random",
    "System.Security.Cryptography.RNGCryptoServiceProvider",
};

/// The rule catalog consulted by the classifier and walker.
///
/// The bare-name table shares the member-access defaults: both shapes cover
/// the same semantic set, reached with or without an explicit qualifier.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    extra_calls: Vec<String>,
    extra_member_accesses: Vec<String>,
    extra_names: Vec<String>,
    extra_constructions: Vec<String>,
}

impl Catalog {
    /// Catalog with only the built-in tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog extended with per-table config entries.
    pub fn with_extensions(
        calls: Vec<String>,
        member_accesses: Vec<String>,
        names: Vec<String>,
        constructions: Vec<String>,
    ) -> Self {
        Self {
            extra_calls: calls,
            extra_member_accesses: member_accesses,
            extra_names: names,
            extra_constructions: constructions,
        }
    }

    /// Test a resolved qualified name against the table for `shape`.
    ///
    /// Returns the matched catalog entry.
    pub fn matches(&self, shape: ShapeKind, qualified: &str) -> Option<String> {
        match shape {
            ShapeKind::Call => CALL_RULES
                .iter()
                .copied()
                .find(|entry| qualified.starts_with(entry))
                .map(str::to_string)
                .or_else(|| {
                    self.extra_calls
                        .iter()
                        .find(|entry| qualified.starts_with(entry.as_str()))
                        .cloned()
                }),
            ShapeKind::MemberAccess => lookup_exact(
                &MEMBER_ACCESS_RULES,
                &self.extra_member_accesses,
                qualified,
            ),
            ShapeKind::BareName => {
                lookup_exact(&MEMBER_ACCESS_RULES, &self.extra_names, qualified)
            }
            ShapeKind::Construction => lookup_exact(
                &CONSTRUCTION_RULES,
                &self.extra_constructions,
                qualified,
            ),
        }
    }

    /// Test each candidate in order; first match wins.
    pub fn match_candidates(&self, shape: ShapeKind, candidates: &[String]) -> Option<String> {
        candidates
            .iter()
            .find_map(|candidate| self.matches(shape, candidate))
    }
}

fn lookup_exact(
    builtin: &Set<&'static str>,
    extra: &[String],
    qualified: &str,
) -> Option<String> {
    if builtin.contains(qualified) {
        return Some(qualified.to_string());
    }
    extra
        .iter()
        .find(|entry| entry.as_str() == qualified)
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_prefix_match() {
        let catalog = Catalog::new();
        // Exact name matches.
        assert_eq!(
            catalog.matches(ShapeKind::Call, "System.Guid.NewGuid"),
            Some("System.Guid.NewGuid".to_string())
        );
        // A resolved name with a trailing suffix still matches by prefix.
        assert_eq!(
            catalog.matches(ShapeKind::Call, "System.Guid.NewGuid(string)"),
            Some("System.Guid.NewGuid".to_string())
        );
    }

    #[test]
    fn test_call_non_prefix_substring_not_matched() {
        let catalog = Catalog::new();
        assert_eq!(
            catalog.matches(ShapeKind::Call, "My.System.Guid.NewGuid"),
            None
        );
    }

    #[test]
    fn test_member_access_exact_only() {
        let catalog = Catalog::new();
        assert_eq!(
            catalog.matches(ShapeKind::MemberAccess, "System.DateTime.Now"),
            Some("System.DateTime.Now".to_string())
        );
        // Exact mode: no prefix tolerance.
        assert_eq!(
            catalog.matches(ShapeKind::MemberAccess, "System.DateTime.NowIsh"),
            None
        );
    }

    #[test]
    fn test_bare_name_shares_member_set() {
        let catalog = Catalog::new();
        assert_eq!(
            catalog.matches(ShapeKind::BareName, "System.DateTime.UtcNow"),
            Some("System.DateTime.UtcNow".to_string())
        );
    }

    #[test]
    fn test_construction_exact() {
        let catalog = Catalog::new();
        assert_eq!(
            catalog.matches(ShapeKind::Construction, "System.Random"),
            Some("System.Random".to_string())
        );
        assert_eq!(
            catalog.matches(ShapeKind::Construction, "System.RandomAccess"),
            None
        );
    }

    #[test]
    fn test_extensions_consulted_per_table() {
        let catalog = Catalog::with_extensions(
            vec!["Acme.Clock.Read".to_string()],
            vec!["Acme.Clock.Now".to_string()],
            vec![],
            vec!["Acme.Entropy".to_string()],
        );

        assert!(catalog.matches(ShapeKind::Call, "Acme.Clock.Read").is_some());
        assert!(catalog
            .matches(ShapeKind::MemberAccess, "Acme.Clock.Now")
            .is_some());
        // Extensions are per-table: the member entry does not leak into the
        // bare-name table.
        assert!(catalog.matches(ShapeKind::BareName, "Acme.Clock.Now").is_none());
        assert!(catalog
            .matches(ShapeKind::Construction, "Acme.Entropy")
            .is_some());
    }

    #[test]
    fn test_match_candidates_first_wins() {
        let catalog = Catalog::new();
        let candidates = vec![
            "Acme.DateTime.Now".to_string(),
            "System.DateTime.Now".to_string(),
        ];
        assert_eq!(
            catalog.match_candidates(ShapeKind::MemberAccess, &candidates),
            Some("System.DateTime.Now".to_string())
        );
    }

    #[test]
    fn test_match_modes() {
        assert_eq!(ShapeKind::Call.match_mode(), MatchMode::Prefix);
        assert_eq!(ShapeKind::MemberAccess.match_mode(), MatchMode::Exact);
        assert_eq!(ShapeKind::BareName.match_mode(), MatchMode::Exact);
        assert_eq!(ShapeKind::Construction.match_mode(), MatchMode::Exact);
    }
}

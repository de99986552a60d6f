//! Configuration schema for replaycheck.
//!
//! The configuration surface is deliberately small: the marker attribute
//! name, path exclusions for file collection, and additional entries for
//! the four rule tables. Everything else about the engine is fixed.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::engine::{Catalog, DEFAULT_MARKER};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Simple name of the marker attribute identifying entry points
    /// (default: "Deterministic").
    #[serde(default)]
    pub entry_point_attribute: Option<String>,
    /// Glob patterns for paths to exclude from analysis
    /// (e.g., "**/obj/**", "**/Generated/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Additional catalog entries, per rule table.
    #[serde(default)]
    pub rules: Option<RuleExtensions>,
}

/// Additional rule entries merged into the catalog before a session.
///
/// Call entries are prefix-matched; the other three tables are exact.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RuleExtensions {
    #[serde(default)]
    pub calls: Vec<String>,
    #[serde(default)]
    pub member_accesses: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub constructions: Vec<String>,
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// The marker attribute simple name.
    pub fn marker(&self) -> &str {
        self.entry_point_attribute
            .as_deref()
            .unwrap_or(DEFAULT_MARKER)
    }

    /// Build the session catalog: built-in tables plus extensions.
    pub fn catalog(&self) -> Catalog {
        match &self.rules {
            Some(rules) => Catalog::with_extensions(
                rules.calls.clone(),
                rules.member_accesses.clone(),
                rules.names.clone(),
                rules.constructions.clone(),
            ),
            None => Catalog::new(),
        }
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    /// Uses globset for matching, which supports `**` for recursive
    /// directory matching.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();

        for pattern in &self.excluded_paths {
            if let Ok(glob) = globset::Glob::new(pattern) {
                let matcher = glob.compile_matcher();
                if matcher.is_match(&*path_str) {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.marker(), "Deterministic");
        assert!(!config.is_path_excluded(&PathBuf::from("src/Workflow.cs")));
    }

    #[test]
    fn test_parse_yaml() {
        let config: Config = serde_yaml::from_str(
            r#"
version: "1"
name: orders
entry_point_attribute: Replayable
excluded_paths:
  - "**/obj/**"
rules:
  calls:
    - "Acme.Clock.Read"
  member_accesses:
    - "Acme.Clock.Now"
"#,
        )
        .unwrap();

        assert_eq!(config.marker(), "Replayable");
        assert!(config.is_path_excluded(&PathBuf::from("src/obj/Gen.cs")));
        assert!(!config.is_path_excluded(&PathBuf::from("src/Workflow.cs")));

        let catalog = config.catalog();
        assert!(catalog
            .matches(crate::engine::ShapeKind::Call, "Acme.Clock.Read")
            .is_some());
        assert!(catalog
            .matches(crate::engine::ShapeKind::MemberAccess, "Acme.Clock.Now")
            .is_some());
    }

    #[test]
    fn test_empty_rules_section() {
        let config: Config = serde_yaml::from_str("rules: {}").unwrap();
        let catalog = config.catalog();
        assert!(catalog
            .matches(crate::engine::ShapeKind::Call, "System.Guid.NewGuid")
            .is_some());
    }
}

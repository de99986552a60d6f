//! Core types for analysis findings.

use serde::{Deserialize, Serialize};

use crate::syntax::Span;

/// Severity levels for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Rule codes, one per syntactic shape the engine recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingRule {
    #[serde(rename = "nondeterministic_call")]
    NondeterministicCall,
    #[serde(rename = "nondeterministic_member_access")]
    NondeterministicMemberAccess,
    #[serde(rename = "nondeterministic_name")]
    NondeterministicName,
    #[serde(rename = "nondeterministic_construction")]
    NondeterministicConstruction,
}

impl FindingRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingRule::NondeterministicCall => "nondeterministic_call",
            FindingRule::NondeterministicMemberAccess => "nondeterministic_member_access",
            FindingRule::NondeterministicName => "nondeterministic_name",
            FindingRule::NondeterministicConstruction => "nondeterministic_construction",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "nondeterministic_call" => Some(FindingRule::NondeterministicCall),
            "nondeterministic_member_access" => Some(FindingRule::NondeterministicMemberAccess),
            "nondeterministic_name" => Some(FindingRule::NondeterministicName),
            "nondeterministic_construction" => Some(FindingRule::NondeterministicConstruction),
            _ => None,
        }
    }

    /// Message template, with exactly one substitution slot.
    fn message_for(&self, subject: &str) -> String {
        match self {
            FindingRule::NondeterministicCall => {
                format!("nondeterministic call to '{}'", subject)
            }
            FindingRule::NondeterministicMemberAccess => {
                format!("nondeterministic member access '{}'", subject)
            }
            FindingRule::NondeterministicName => {
                format!("nondeterministic reference to '{}'", subject)
            }
            FindingRule::NondeterministicConstruction => {
                format!("nondeterministic construction '{}'", subject)
            }
        }
    }
}

impl std::fmt::Display for FindingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single reported occurrence of a flagged construct.
///
/// The location always points at the offending construct itself, which may
/// sit deep inside a transitively-called declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub rule: FindingRule,
    /// The matched qualified name, or for constructions the literal source
    /// text of the expression.
    pub subject: String,
    pub message: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub severity: Severity,
}

impl Finding {
    /// Build a finding from a rule, subject, and source position.
    pub fn new(rule: FindingRule, subject: impl Into<String>, file: &str, span: &Span) -> Self {
        let subject = subject.into();
        Self {
            message: rule.message_for(&subject),
            rule,
            subject,
            file: file.to_string(),
            line: span.start_line,
            column: span.start_col,
            end_line: span.end_line,
            end_column: span.end_col,
            severity: Severity::Error,
        }
    }

    /// A unique key for this finding (for deduplication/comparison).
    pub fn key(&self) -> String {
        format!("{}|{}|{}", self.rule, self.file, self.message)
    }
}

/// Results of one analysis session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub findings: Vec<Finding>,
    /// Findings suppressed by inline comments.
    #[serde(default)]
    pub suppressed: Vec<crate::suppress::SuppressedFinding>,
    /// Number of source units scanned.
    pub scanned: usize,
    /// Number of entry points analyzed.
    pub roots: usize,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: AnalysisResult) {
        self.findings.extend(other.findings);
        self.suppressed.extend(other.suppressed);
        self.scanned += other.scanned;
        self.roots += other.roots;
    }

    pub fn suppressed_count(&self) -> usize {
        self.suppressed.len()
    }

    /// Check if there are any error-severity findings.
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }
}

//! Inline suppression of findings via comments.
//!
//! Supports suppression comments like:
//! - `// replaycheck:ignore <rule> - <reason>`
//! - `// replaycheck:ignore-next-line <rule> - <reason>`
//! - `// replaycheck:ignore-file <rule> - <reason>`
//!
//! `<rule>` is a finding rule name or `*` for all rules.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::Finding;

/// How a suppression applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuppressionType {
    /// Applies to the same line
    Line,
    /// Applies to the next line
    NextLine,
    /// Applies to the entire file
    File,
}

/// An inline suppression directive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suppression {
    /// Rule to suppress (e.g., "nondeterministic_call") or "*" for all
    pub rule: String,
    /// Human-readable reason
    pub reason: String,
    /// File containing the suppression
    pub file: String,
    /// Line number (0 for file-level)
    pub line: usize,
    /// How the suppression applies
    pub suppression_type: SuppressionType,
}

/// A finding that was suppressed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressedFinding {
    pub finding: Finding,
    pub suppression: Suppression,
}

lazy_static::lazy_static! {
    /// Patterns for matching suppression comments in C# sources.
    static ref SUPPRESSION_PATTERNS: Vec<Regex> = vec![
        // Line comment style: // replaycheck:...
        Regex::new(r"//\s*replaycheck:(ignore(?:-file|-next-line)?)\s+(\S+)\s*(?:-\s*(.*))?").unwrap(),
        // Block comment style: /* replaycheck:... */
        Regex::new(r"/\*\s*replaycheck:(ignore(?:-file|-next-line)?)\s+(\S+)\s*(?:-\s*(.*?))?\s*\*/").unwrap(),
    ];
}

/// Parse suppression directives from file content.
pub fn parse_suppressions(content: &str, file: &str) -> Vec<Suppression> {
    let mut suppressions = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let line_number = line_num + 1;

        for pattern in SUPPRESSION_PATTERNS.iter() {
            let captures = match pattern.captures(line) {
                Some(c) => c,
                None => continue,
            };

            let directive = captures.get(1).map(|m| m.as_str()).unwrap_or("");
            let rule = captures.get(2).map(|m| m.as_str()).unwrap_or("*");
            let reason = captures
                .get(3)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();

            let (suppression_type, line) = match directive {
                "ignore-file" => (SuppressionType::File, 0),
                "ignore-next-line" => (SuppressionType::NextLine, line_number),
                _ => (SuppressionType::Line, line_number),
            };

            suppressions.push(Suppression {
                rule: rule.to_string(),
                reason,
                file: file.to_string(),
                line,
                suppression_type,
            });
            break;
        }
    }

    suppressions
}

/// Collect suppressions from all files, with paths relative to `base_dir`
/// so they line up with finding locations.
pub fn collect_suppressions(
    base_dir: &Path,
    files: &[PathBuf],
) -> anyhow::Result<Vec<Suppression>> {
    let mut all = Vec::new();

    for path in files {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            // Unreadable files were already reported by the parser.
            Err(_) => continue,
        };
        let rel = path
            .strip_prefix(base_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();
        all.extend(parse_suppressions(&content, &rel));
    }

    Ok(all)
}

/// Whether a suppression covers a finding.
fn applies(suppression: &Suppression, finding: &Finding) -> bool {
    if suppression.file != finding.file {
        return false;
    }
    if suppression.rule != "*" && suppression.rule != finding.rule.as_str() {
        return false;
    }
    match suppression.suppression_type {
        SuppressionType::File => true,
        SuppressionType::Line => suppression.line == finding.line,
        SuppressionType::NextLine => suppression.line + 1 == finding.line,
    }
}

/// Split findings into (active, suppressed).
pub fn filter_suppressed(
    findings: Vec<Finding>,
    suppressions: &[Suppression],
) -> (Vec<Finding>, Vec<SuppressedFinding>) {
    let mut active = Vec::new();
    let mut suppressed = Vec::new();

    for finding in findings {
        match suppressions.iter().find(|s| applies(s, &finding)) {
            Some(suppression) => suppressed.push(SuppressedFinding {
                finding,
                suppression: suppression.clone(),
            }),
            None => active.push(finding),
        }
    }

    (active, suppressed)
}

//! Output formatting for replaycheck results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::engine::{AnalysisResult, Finding, Severity};

/// JSON report structure.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub config: String,
    pub passed: bool,
    pub files_scanned: usize,
    pub entry_points: usize,
    pub findings: Vec<JsonFinding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<JsonSuppressedFinding>,
    pub suppressed_count: usize,
}

/// JSON finding structure.
#[derive(Serialize, Deserialize)]
pub struct JsonFinding {
    pub rule: String,
    pub severity: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub subject: String,
    pub message: String,
}

/// Suppressed finding with suppression info.
#[derive(Serialize, Deserialize)]
pub struct JsonSuppressedFinding {
    pub finding: JsonFinding,
    pub suppression: JsonSuppression,
}

/// Suppression directive info.
#[derive(Serialize, Deserialize)]
pub struct JsonSuppression {
    pub rule: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reason: String,
    pub file: String,
    pub line: usize,
    #[serde(rename = "type")]
    pub suppression_type: String,
}

fn finding_to_json(finding: &Finding) -> JsonFinding {
    JsonFinding {
        rule: finding.rule.as_str().to_string(),
        severity: finding.severity.to_string(),
        file: finding.file.clone(),
        line: finding.line,
        column: finding.column,
        subject: finding.subject.clone(),
        message: finding.message.clone(),
    }
}

/// Build the JSON report structure.
pub fn build_json(path: &str, config_path: &str, result: &AnalysisResult) -> JsonReport {
    let findings: Vec<JsonFinding> = result.findings.iter().map(finding_to_json).collect();

    let suppressed: Vec<JsonSuppressedFinding> = result
        .suppressed
        .iter()
        .map(|sf| JsonSuppressedFinding {
            finding: finding_to_json(&sf.finding),
            suppression: JsonSuppression {
                rule: sf.suppression.rule.clone(),
                reason: sf.suppression.reason.clone(),
                file: sf.suppression.file.clone(),
                line: sf.suppression.line,
                suppression_type: format!("{:?}", sf.suppression.suppression_type)
                    .to_lowercase(),
            },
        })
        .collect();

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        config: config_path.to_string(),
        passed: !result.has_errors(),
        files_scanned: result.scanned,
        entry_points: result.roots,
        findings,
        suppressed,
        suppressed_count: result.suppressed_count(),
    }
}

/// Write results in JSON format to stdout.
pub fn write_json(path: &str, config_path: &str, result: &AnalysisResult) -> anyhow::Result<()> {
    let report = build_json(path, config_path, result);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Write results in pretty (colored) format to stdout.
pub fn write_pretty(path: &str, result: &AnalysisResult, show_suppressed: bool) {
    println!("{} {}", "replaycheck".bold(), path.dimmed());
    println!();

    for finding in &result.findings {
        let severity = match finding.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Info => "info".blue().bold(),
        };
        println!(
            "  {}:{}:{} {} [{}] {}",
            finding.file.cyan(),
            finding.line,
            finding.column,
            severity,
            finding.rule.as_str().dimmed(),
            finding.message
        );
    }

    if show_suppressed && !result.suppressed.is_empty() {
        println!();
        println!("{}", "Suppressed:".bold());
        for sf in &result.suppressed {
            let reason = if sf.suppression.reason.is_empty() {
                String::new()
            } else {
                format!(" ({})", sf.suppression.reason)
            };
            println!(
                "  {}:{}:{} {} {}{}",
                sf.finding.file.cyan(),
                sf.finding.line,
                sf.finding.column,
                "suppressed".dimmed(),
                sf.finding.message.dimmed(),
                reason.dimmed()
            );
        }
    }

    if !result.findings.is_empty() || (show_suppressed && !result.suppressed.is_empty()) {
        println!();
    }

    let summary = format!(
        "{} finding(s) in {} file(s), {} entry point(s) analyzed",
        result.findings.len(),
        result.scanned,
        result.roots
    );
    if result.suppressed_count() > 0 {
        println!("{} ({} suppressed)", summary, result.suppressed_count());
    } else {
        println!("{}", summary);
    }

    if result.has_errors() {
        println!("{}", "FAILED".red().bold());
    } else {
        println!("{}", "PASSED".green().bold());
    }
}

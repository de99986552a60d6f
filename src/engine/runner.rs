//! Analysis runner that orchestrates a full session.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::Config;
use crate::suppress;
use crate::syntax::Program;

use super::entry::is_entry_point;
use super::findings::{AnalysisResult, Finding};
use super::walker::Session;

/// Executes one analysis session against a set of files.
pub struct Runner {
    base_dir: PathBuf,
}

impl Runner {
    /// Create a new runner.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Parse the files, walk every entry point, and collect findings.
    ///
    /// Entry points are analyzed in parallel against shared session state;
    /// results are sorted by position for deterministic output.
    pub fn run(&self, files: &[PathBuf], config: &Config) -> anyhow::Result<AnalysisResult> {
        let program = Program::load(&self.base_dir, files)?;
        let catalog = config.catalog();
        let marker = config.marker();

        let roots: Vec<usize> = program
            .declarations()
            .iter()
            .enumerate()
            .filter(|(_, decl)| is_entry_point(decl, marker))
            .map(|(idx, _)| idx)
            .collect();

        let session = Session::new(&program, &catalog);
        let nested: Vec<Vec<Finding>> = roots
            .par_iter()
            .map(|&root| session.analyze_root(root))
            .collect();

        let mut findings: Vec<Finding> = nested.into_iter().flatten().collect();
        findings.sort_by(|a, b| {
            (&a.file, a.line, a.column, a.rule.as_str()).cmp(&(
                &b.file,
                b.line,
                b.column,
                b.rule.as_str(),
            ))
        });

        let suppressions = suppress::collect_suppressions(&self.base_dir, files)?;
        let (active, suppressed) = suppress::filter_suppressed(findings, &suppressions);

        Ok(AnalysisResult {
            findings: active,
            suppressed,
            scanned: program.unit_count(),
            roots: roots.len(),
        })
    }
}

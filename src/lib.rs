//! Replaycheck - static determinism checker for replayable code.
//!
//! Replaycheck determines whether a designated entry method - and
//! everything it transitively invokes - may perform an operation whose
//! result can differ between repeated executions given identical inputs:
//! time-of-day reads, random/unique-value generation, I/O,
//! process/environment introspection, thread scheduling primitives. Each
//! offending construct is flagged at its exact source location.
//!
//! # Architecture
//!
//! The codebase uses tree-sitter for AST-based analysis of C# sources:
//!
//! - `syntax`: parsing, declaration extraction, the whole-program index
//! - `engine`: the reachability/classification engine (rule catalog, node
//!   classifier, symbol resolver, call-graph walker)
//! - `config`: YAML configuration (marker attribute, rule extensions)
//! - `suppress`: inline suppression comments
//! - `report`: output formatting (pretty, JSON)
//!
//! # Extending the catalog
//!
//! The four rule tables are the sole configuration surface: adding a new
//! guarded operation means adding one entry to the matching table in
//! `replaycheck.yaml` (or `engine::catalog` for built-ins).

pub mod cli;
pub mod config;
pub mod engine;
pub mod report;
pub mod suppress;
pub mod syntax;

pub use config::Config;
pub use engine::{
    AnalysisResult, Catalog, Finding, FindingRule, Runner, Session, Severity, ShapeKind,
};
pub use syntax::{Declaration, Program, SourceUnit, Span};

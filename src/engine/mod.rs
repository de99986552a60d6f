//! The determinism engine.
//!
//! Given a program and a marker attribute, the engine finds every marked
//! entry point and reports each nondeterministic construct reachable from
//! it, at the construct's own source location:
//!
//! - `catalog`: the four rule tables (call / member access / bare name /
//!   construction) and their matching modes
//! - `classifier`: shape recognition over declaration bodies
//! - `entry`: marker attribute detection
//! - `resolver`: `using`-directive name resolution with session caches
//! - `walker`: the cycle-safe call-graph walk over declarations
//! - `runner`: session orchestration (parallel roots, suppressions,
//!   deterministic ordering)
//!
//! All failure modes inside the engine are silent skips: missing
//! information reduces completeness, never the correctness of what is
//! reported, and never aborts a session.

mod catalog;
mod classifier;
mod entry;
mod findings;
mod resolver;
mod runner;
mod walker;

pub use catalog::{Catalog, MatchMode, ShapeKind};
pub use classifier::Classifier;
pub use entry::{is_entry_point, DEFAULT_MARKER};
pub use findings::{AnalysisResult, Finding, FindingRule, Severity};
pub use resolver::{Resolver, UsingScope};
pub use runner::Runner;
pub use walker::{Session, VisitedSet};

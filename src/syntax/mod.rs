//! Syntax layer: parsing C# sources and indexing their declarations.
//!
//! This module owns everything the engine treats as pre-existing input:
//! - [`SourceUnit`]: one parsed file (source bytes + tree-sitter tree)
//! - [`Declaration`]: a method or local function, identified by AST node,
//!   not by name
//! - [`Program`]: the whole-program view with cross-unit declaration
//!   indexes
//!
//! The engine never constructs or mutates these; it only reads them.

mod csharp;
mod program;
mod span;

pub use csharp::{each_descendant, parse as parse_source, UsingDirective};
pub use program::{Declaration, Program, SourceUnit};
pub use span::Span;

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the parsing layer.
#[derive(Debug, Error)]
pub enum SyntaxError {
    #[error("failed to parse {}", .0.display())]
    Parse(PathBuf),
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

//! Command-line interface for replaycheck.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::engine::Runner;
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Default config file names to search for.
const DEFAULT_CONFIG_NAMES: &[&str] = &["replaycheck.yaml", ".replaycheck.yaml"];

/// Starter configuration written by `replaycheck init`.
const DEFAULT_CONFIG_TEMPLATE: &str = r#"version: "1"
name: my-project

# Simple name of the attribute marking replayable entry points.
entry_point_attribute: Deterministic

# Paths excluded from scanning.
excluded_paths:
  - "**/bin/**"
  - "**/obj/**"

# Additional catalog entries. Call entries are prefix-matched against the
# resolved qualified name; the other tables are matched exactly.
rules:
  calls: []
  member_accesses: []
  names: []
  constructions: []
"#;

/// Static determinism checker for replayable workflow code.
///
/// Replaycheck walks the call graph from every method carrying the marker
/// attribute and reports each reachable operation whose result can differ
/// between repeated executions: time-of-day reads, random and unique-value
/// generation, I/O, process/environment introspection, and thread
/// scheduling primitives.
#[derive(Parser)]
#[command(name = "replaycheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check entry points for reachable nondeterminism
    #[command(visible_alias = "lint")]
    Check(CheckArgs),
    /// Create a new replaycheck config file
    Init(InitArgs),
}

/// Arguments for the check command.
#[derive(Parser)]
pub struct CheckArgs {
    /// Path to check (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Show suppressed findings in output
    #[arg(long)]
    pub show_suppressed: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "replaycheck.yaml")]
    pub output: PathBuf,
}

/// Discover a config file near the scanned path or in the current directory.
fn discover_config(scan_path: &Path) -> Option<PathBuf> {
    let scan_dir = if scan_path.is_dir() {
        scan_path
    } else {
        scan_path.parent().unwrap_or(Path::new("."))
    };

    for dir in [scan_dir, Path::new(".")] {
        for name in DEFAULT_CONFIG_NAMES {
            let candidate = dir.join(name);
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Collect C# files under the given root.
fn collect_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            // Skip hidden and build-output directories
            if e.file_type().is_dir()
                && (name.starts_with('.') || name == "bin" || name == "obj")
            {
                return false;
            }
            true
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if ext != "cs" {
            continue;
        }
        if config.is_path_excluded(path) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    // Load config; a missing config just means defaults.
    let (config, config_path) = match &args.config {
        Some(path) => (Config::parse_file(path)?, path.clone()),
        None => match discover_config(&args.path) {
            Some(path) => (Config::parse_file(&path)?, path),
            None => (Config::default(), PathBuf::new()),
        },
    };

    // Resolve path
    let abs_path = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let (base_dir, files) = if abs_path.is_dir() {
        (abs_path.clone(), collect_files(&abs_path, &config)?)
    } else {
        let base = abs_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        (base, vec![abs_path.clone()])
    };

    let runner = Runner::new(&base_dir);
    let result = runner.run(&files, &config)?;

    match args.format.as_str() {
        "json" => report::write_json(
            &args.path.to_string_lossy(),
            &config_path.to_string_lossy(),
            &result,
        )?,
        _ => report::write_pretty(&args.path.to_string_lossy(), &result, args.show_suppressed),
    }

    if result.has_errors() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: {:?} already exists", args.output);
        return Ok(EXIT_ERROR);
    }

    std::fs::write(&args.output, DEFAULT_CONFIG_TEMPLATE)?;
    println!("Created {}", args.output.display());
    Ok(EXIT_SUCCESS)
}

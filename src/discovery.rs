//! File discovery.
//!
//! Turns command-line path arguments into the ordered list of documents to
//! check: directories are searched for `*.html`, glob patterns are expanded
//! and plain paths are kept as given.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};

fn is_glob(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in glob::glob(pattern).with_context(|| format!("Invalid glob pattern {pattern}"))? {
        match entry {
            Ok(path) if path.is_file() => found.push(path),
            Ok(_) => {}
            Err(e) => log::warn!("Skipping unreadable path: {}", e),
        }
    }
    Ok(found)
}

/// Compiled exclusion globs
#[derive(Debug, Clone, Default)]
pub struct Excludes {
    patterns: Vec<Pattern>,
}

impl Excludes {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::new(p).with_context(|| format!("Invalid exclude pattern {p}")))
            .collect::<Result<_>>()?;
        Ok(Self { patterns })
    }

    /// `*` stays within one path component, only `**` crosses directories.
    pub fn matches(&self, path: &Path) -> bool {
        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::new()
        };
        self.patterns
            .iter()
            .any(|p| p.matches_path_with(path, options))
    }
}

/// Expand inputs in order, dropping excluded and duplicate paths.
pub fn discover(inputs: &[String], excludes: &Excludes) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for input in inputs {
        let candidates = if Path::new(input).is_dir() {
            let pattern = Path::new(&Pattern::escape(input)).join("**").join("*.html");
            expand_glob(&pattern.to_string_lossy())?
        } else if is_glob(input) {
            expand_glob(input)?
        } else {
            vec![PathBuf::from(input)]
        };

        for path in candidates {
            if excludes.matches(&path) {
                log::debug!("Excluded {}", path.display());
                continue;
            }
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

//! Path filter value object
//!
//! Include/exclude glob lists attached to directory rules.
//!
//! Semantics follow rsync filter rules with includes listed first: a path
//! matching an include pattern is always transferred; otherwise a path
//! matching an exclude pattern is skipped; everything else is transferred.
//! Excluding a directory excludes its whole subtree.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Include/exclude patterns for a directory transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathFilters {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl PathFilters {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Check that a single pattern is a usable glob.
    pub fn check_pattern(pattern: &str) -> Result<(), FilterError> {
        if pattern.trim().is_empty() {
            return Err(FilterError::InvalidPattern {
                pattern: pattern.to_string(),
                message: "pattern is empty".to_string(),
            });
        }
        if pattern.starts_with('!') {
            return Err(FilterError::InvalidPattern {
                pattern: pattern.to_string(),
                message: "negation is expressed with `include`, not `!`".to_string(),
            });
        }
        let mut builder = GitignoreBuilder::new("");
        builder
            .add_line(None, pattern)
            .map_err(|e| FilterError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Build a matcher rooted at `root` for walking a local tree.
    pub fn matcher(&self, root: &Path) -> Result<PathMatcher, FilterError> {
        let mut builder = GitignoreBuilder::new(root);
        // gitignore is last-match-wins, so excludes go first and includes
        // are appended as negations.
        for pattern in &self.exclude {
            builder
                .add_line(None, pattern)
                .map_err(|e| FilterError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
        }
        for pattern in &self.include {
            builder
                .add_line(None, &format!("!{}", pattern))
                .map_err(|e| FilterError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
        }
        let matcher = builder
            .build()
            .map_err(|e| FilterError::BuildFailed(e.to_string()))?;
        Ok(PathMatcher { matcher })
    }

    /// rsync `--include`/`--exclude` arguments in first-match order.
    pub fn rsync_args(&self) -> Vec<String> {
        let includes = self.include.iter().map(|p| format!("--include={}", p));
        let excludes = self.exclude.iter().map(|p| format!("--exclude={}", p));
        includes.chain(excludes).collect()
    }
}

/// Compiled filters for a concrete local root.
#[derive(Debug)]
pub struct PathMatcher {
    matcher: Gitignore,
}

impl PathMatcher {
    /// Whether `rel_path` (relative to the root) is filtered out.
    pub fn is_excluded(&self, rel_path: &Path, is_dir: bool) -> bool {
        self.matcher
            .matched_path_or_any_parents(rel_path, is_dir)
            .is_ignore()
    }
}

/// Errors building filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    InvalidPattern { pattern: String, message: String },
    BuildFailed(String),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern { pattern, message } => {
                write!(f, "invalid pattern '{}': {}", pattern, message)
            }
            Self::BuildFailed(msg) => write!(f, "failed to build path filter: {}", msg),
        }
    }
}

impl std::error::Error for FilterError {}

//! Sync rule entity

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::domain::value_objects::{Direction, EntryKind, PathFilters};

/// One declarative transfer: a local path paired with a remote path.
///
/// Built by the manifest resolver, which guarantees both paths are
/// non-empty and well-formed and `local_path` is absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncRule {
    /// Position in the manifest (0-based)
    pub index: usize,
    /// Local path as written in the manifest (for display)
    pub local: String,
    /// Local path resolved against the manifest directory
    pub local_path: PathBuf,
    /// Absolute (or `~/`) path on the remote host
    pub remote_path: String,
    pub direction: Direction,
    pub kind: EntryKind,
    /// Failures are recorded as skipped instead of aborting the run
    pub optional: bool,
    #[serde(skip_serializing_if = "PathFilters::is_empty")]
    pub filters: PathFilters,
}

impl SyncRule {
    pub fn new(
        local: impl Into<String>,
        local_path: impl Into<PathBuf>,
        remote_path: impl Into<String>,
    ) -> Self {
        Self {
            index: 0,
            local: local.into(),
            local_path: local_path.into(),
            remote_path: remote_path.into(),
            direction: Direction::default(),
            kind: EntryKind::default(),
            optional: false,
            filters: PathFilters::default(),
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_kind(mut self, kind: EntryKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_filters(mut self, filters: PathFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// Short human label, e.g. `a.json → /opt/app/a.json`
    pub fn label(&self) -> String {
        match self.direction {
            Direction::Push => format!("{} → {}", self.local, self.remote_path),
            Direction::Pull => format!("{} ← {}", self.local, self.remote_path),
        }
    }
}

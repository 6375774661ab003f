//! Manifest entity - the ordered rule list for a run.

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::SyncRule;
use crate::domain::value_objects::Direction;

/// Ordered sequence of sync rules.
///
/// Rule order is execution order. Use the manifest resolver to build one
/// from user input; it enforces the no-conflicting-targets invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    rules: Vec<SyncRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<PathBuf>,
}

impl Manifest {
    pub fn new(rules: Vec<SyncRule>) -> Self {
        Self {
            rules,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// File the manifest was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn rules(&self) -> &[SyncRule] {
        &self.rules
    }

    /// Rules for one direction, in manifest order
    pub fn rules_for(&self, direction: Direction) -> impl Iterator<Item = &SyncRule> {
        self.rules.iter().filter(move |r| r.direction == direction)
    }

    pub fn count_for(&self, direction: Direction) -> usize {
        self.rules_for(direction).count()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

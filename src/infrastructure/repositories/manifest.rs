//! Filesystem Manifest Repository
//!
//! Reads a manifest file and resolves it relative to its own directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::entities::Manifest;
use crate::domain::services::ManifestResolver;
use crate::error::ValidationError;

pub struct FsManifestRepository {
    home_dir: Option<PathBuf>,
}

impl FsManifestRepository {
    pub fn new() -> Self {
        Self {
            home_dir: dirs::home_dir(),
        }
    }

    /// Override the home directory used for `~/` local paths
    pub fn with_home_dir(home_dir: Option<PathBuf>) -> Self {
        Self { home_dir }
    }

    /// Load and validate the manifest at `path`.
    ///
    /// Relative local paths in the manifest resolve against the manifest's
    /// directory, not the working directory.
    pub fn load(&self, path: &Path) -> Result<Manifest, ValidationError> {
        let unreadable = |message: String| ValidationError::Unreadable {
            path: path.to_path_buf(),
            message,
        };

        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| unreadable(e.to_string()))?
                .join(path)
        };

        let content = fs::read_to_string(&absolute).map_err(|e| unreadable(e.to_string()))?;
        let base_dir = absolute
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));

        tracing::debug!(manifest = %absolute.display(), "resolving manifest");
        let manifest = ManifestResolver::new(base_dir)
            .with_home_dir(self.home_dir.clone())
            .resolve(&content)?;

        Ok(manifest.with_source(absolute))
    }
}

impl Default for FsManifestRepository {
    fn default() -> Self {
        Self::new()
    }
}

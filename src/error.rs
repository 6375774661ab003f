//! Error types for courier
//!
//! Library errors use `thiserror`; the command layer wraps them in `anyhow`.
//! Transport errors live with their port in `domain::ports::transport`.

use std::path::PathBuf;
use thiserror::Error;

pub use crate::domain::ports::TransportError;

/// Manifest validation failure. Nothing is transferred when one occurs.
///
/// Rule numbers in messages are 1-based (as a human counts `[[rule]]` tables).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A rule is missing `local` or `remote`
    #[error("rule {}: missing required field '{field}'", .index + 1)]
    MissingRequiredField { index: usize, field: &'static str },

    /// A rule has a value that cannot be used
    #[error("rule {}: {message}", .index + 1)]
    MalformedRule { index: usize, message: String },

    /// Two rules conflict on the same remote path
    #[error("rules {} and {} both target '{remote}' ({reason})", .first + 1, .second + 1)]
    DuplicateTarget {
        remote: String,
        first: usize,
        second: usize,
        reason: &'static str,
    },

    /// Manifest text is not parseable
    #[error("manifest syntax error: {0}")]
    Syntax(String),

    /// Manifest file could not be read
    #[error("cannot read manifest {path}: {message}")]
    Unreadable { path: PathBuf, message: String },
}

/// Release failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeployError {
    /// Fetch / fast-forward failed; the service was not touched
    #[error("remote update failed: {detail}")]
    UpdateFailed { detail: String },

    /// Restart command failed
    #[error("restart of '{service}' failed: {detail}")]
    RestartFailed { service: String, detail: String },

    /// Service never reported active within the attempt budget
    #[error("'{service}' not healthy after {attempts} health check attempts")]
    HealthCheckTimeout { service: String, attempts: u32 },
}

impl DeployError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UpdateFailed { .. } => "update_failed",
            Self::RestartFailed { .. } => "restart_failed",
            Self::HealthCheckTimeout { .. } => "health_check_timeout",
        }
    }
}

/// Configuration loading/validation failure.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error reading a config file
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parse / type error
    #[error("invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Values parse but cannot be used
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

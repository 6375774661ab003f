//! Transport Port
//!
//! Uniform interface for remote copy and remote command execution.
//! The sync engine and release trigger only ever talk to this trait; the
//! concrete protocol (ssh + rsync/scp) lives in infrastructure.
//!
//! Implementations must not retry: one call is one attempt.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::domain::entities::SyncRule;
use crate::domain::value_objects::{Direction, EntryKind, PathFilters, RemoteTarget};

/// Transport failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Host unreachable, connection refused or reset
    #[error("connection to {host} failed: {detail}")]
    ConnectionFailed { host: String, detail: String },

    /// Host reachable but credentials rejected
    #[error("authentication to {host} failed: {detail}")]
    AuthFailed { host: String, detail: String },

    /// Source of the copy does not exist
    #[error("path not found: {path}")]
    PathNotFound { path: String },

    /// Operation exceeded its time budget and was killed
    #[error("{operation} timed out after {}s", .timeout.as_secs())]
    Timeout {
        operation: String,
        timeout: Duration,
    },

    /// The copy tool failed for another reason
    #[error("transfer failed: {0}")]
    TransferFailed(String),

    /// Post-copy verification found different content
    #[error("checksum mismatch for {path}: local {local}, remote {remote}")]
    ChecksumMismatch {
        path: String,
        local: String,
        remote: String,
    },

    /// Required tool is not installed
    #[error("not available: {0}")]
    Unavailable(String),
}

impl TransportError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionFailed { .. } => "connection_failed",
            Self::AuthFailed { .. } => "auth_failed",
            Self::PathNotFound { .. } => "path_not_found",
            Self::Timeout { .. } => "timeout",
            Self::TransferFailed(_) => "transfer_failed",
            Self::ChecksumMismatch { .. } => "checksum_mismatch",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

/// One copy between a local and a remote path.
#[derive(Debug, Clone, Copy)]
pub struct CopyRequest<'a> {
    /// Absolute local path
    pub local: &'a Path,
    /// Absolute (or `~/`) remote path
    pub remote: &'a str,
    pub direction: Direction,
    pub kind: EntryKind,
    pub filters: &'a PathFilters,
    /// Budget for the whole copy, enforced by the transport
    pub timeout: Duration,
}

impl<'a> CopyRequest<'a> {
    pub fn for_rule(rule: &'a SyncRule, timeout: Duration) -> Self {
        Self {
            local: &rule.local_path,
            remote: &rule.remote_path,
            direction: rule.direction,
            kind: rule.kind,
            filters: &rule.filters,
            timeout,
        }
    }
}

/// Captured output of a remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Remote exit status (`None` if killed by a signal)
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Best single-line description of a failure
    pub fn failure_detail(&self) -> String {
        let stderr = self.stderr.trim();
        let detail = if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        };
        match (self.status, detail.is_empty()) {
            (Some(code), true) => format!("exit status {}", code),
            (Some(code), false) => format!("exit status {}: {}", code, detail),
            (None, true) => "terminated by signal".to_string(),
            (None, false) => format!("terminated by signal: {}", detail),
        }
    }
}

/// Remote copy + remote command execution.
pub trait Transport {
    /// Name for logs (e.g. "ssh+rsync")
    fn name(&self) -> String;

    /// Copy one file or directory in the requested direction.
    ///
    /// On push, missing remote parent directories are created. Copies
    /// overwrite; they never append or delete.
    fn copy(&self, target: &RemoteTarget, request: &CopyRequest<'_>) -> Result<(), TransportError>;

    /// Run a shell command on the remote host.
    ///
    /// A non-zero remote exit status is *not* an error here; it is reported
    /// in [`CommandOutput::status`]. Errors are reserved for the channel.
    fn run_command(
        &self,
        target: &RemoteTarget,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandOutput, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn name(&self) -> String {
        (**self).name()
    }

    fn copy(&self, target: &RemoteTarget, request: &CopyRequest<'_>) -> Result<(), TransportError> {
        (**self).copy(target, request)
    }

    fn run_command(
        &self,
        target: &RemoteTarget,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandOutput, TransportError> {
        (**self).run_command(target, command, timeout)
    }
}

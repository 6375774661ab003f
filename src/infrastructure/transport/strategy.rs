//! Copy Strategy
//!
//! The copy tool behind [`SshTransport`](super::SshTransport). rsync is
//! preferred; scp is the fallback where rsync is not installed.

use std::process::{Command, Stdio};
use std::time::Duration;

use crate::config::TransferMethod;
use crate::domain::ports::{CopyRequest, TransportError};
use crate::domain::value_objects::RemoteTarget;

use super::rsync::RsyncCopy;
use super::scp::ScpCopy;
use super::ssh::SshSettings;

/// A way of moving one file or directory over ssh.
pub(crate) trait CopyStrategy: Send + Sync {
    /// Name for logs
    fn name(&self) -> &'static str;

    /// Whether the tool can be started on this machine
    fn is_available(&self) -> bool;

    /// Perform the copy. Remote parent directories already exist on push
    /// and local ones on pull.
    fn copy(
        &self,
        ssh: &SshSettings,
        target: &RemoteTarget,
        request: &CopyRequest<'_>,
        timeout: Duration,
    ) -> Result<(), TransportError>;
}

/// Programs the strategies invoke.
#[derive(Debug, Clone)]
pub struct CopyPrograms {
    pub scp: String,
    pub rsync: String,
}

impl Default for CopyPrograms {
    fn default() -> Self {
        Self {
            scp: "scp".to_string(),
            rsync: "rsync".to_string(),
        }
    }
}

/// Pick the strategy for `method`.
pub(crate) fn detect_strategy(
    method: TransferMethod,
    programs: &CopyPrograms,
) -> Result<Box<dyn CopyStrategy>, TransportError> {
    let rsync = RsyncCopy::new(&programs.rsync);
    let scp = ScpCopy::new(&programs.scp);

    match method {
        TransferMethod::Rsync if rsync.is_available() => Ok(Box::new(rsync)),
        TransferMethod::Rsync => Err(TransportError::Unavailable(format!(
            "'{}' is required by transport.method = \"rsync\"",
            programs.rsync
        ))),
        TransferMethod::Scp if scp.is_available() => Ok(Box::new(scp)),
        TransferMethod::Scp => Err(TransportError::Unavailable(format!(
            "'{}' is required by transport.method = \"scp\"",
            programs.scp
        ))),
        TransferMethod::Auto => {
            if rsync.is_available() {
                return Ok(Box::new(rsync));
            }
            if scp.is_available() {
                return Ok(Box::new(scp));
            }
            Err(TransportError::Unavailable(
                "neither rsync nor scp is installed".to_string(),
            ))
        }
    }
}

/// Whether `program` can be spawned at all.
pub(crate) fn can_spawn(program: &str, args: &[&str]) -> bool {
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

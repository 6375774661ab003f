//! Rsync Copy Strategy
//!
//! Preferred on Unix: incremental, and filters are handled by rsync itself.

use std::process::{Command, Stdio};
use std::time::Duration;

use crate::domain::ports::{CopyRequest, TransportError};
use crate::domain::value_objects::{Direction, RemoteTarget};

use super::process::{classify_failure, run_with_timeout};
use super::ssh::{copy_tool_path, SshSettings};
use super::strategy::CopyStrategy;

/// Copy strategy using `rsync -az` over ssh
pub(crate) struct RsyncCopy {
    program: String,
}

impl RsyncCopy {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    fn command(&self, ssh: &SshSettings, target: &RemoteTarget, request: &CopyRequest<'_>) -> Command {
        let remote_path = copy_tool_path(request.remote);
        let is_dir = request.kind.is_directory();

        // Trailing slashes copy directory contents instead of nesting.
        let (local, remote) = if is_dir {
            (
                format!("{}/", request.local.display()),
                target.remote_spec(&format!("{}/", remote_path.trim_end_matches('/'))),
            )
        } else {
            (request.local.display().to_string(), target.remote_spec(remote_path))
        };

        let mut cmd = Command::new(&self.program);
        cmd.arg("-az").arg("-e").arg(ssh.rsync_shell(target));
        if is_dir {
            cmd.args(request.filters.rsync_args());
        }
        match request.direction {
            Direction::Push => cmd.arg(local).arg(remote),
            Direction::Pull => cmd.arg(remote).arg(local),
        };
        if !target.auth.allows_prompt() {
            cmd.stdin(Stdio::null());
        }
        cmd
    }
}

impl CopyStrategy for RsyncCopy {
    fn name(&self) -> &'static str {
        "rsync"
    }

    fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn copy(
        &self,
        ssh: &SshSettings,
        target: &RemoteTarget,
        request: &CopyRequest<'_>,
        timeout: Duration,
    ) -> Result<(), TransportError> {
        let output = run_with_timeout(self.command(ssh, target, request), timeout, "rsync")?;
        if output.success() {
            return Ok(());
        }
        let hint = match request.direction {
            Direction::Push => request.local.display().to_string(),
            Direction::Pull => request.remote.to_string(),
        };
        Err(classify_failure(&target.host, "rsync", &output, &hint))
    }
}

//! SCP Copy Strategy
//!
//! Fallback when rsync is not available. scp cannot filter, so filtered
//! directory pushes go through a staging directory and directory pulls
//! land in a scratch directory before a filtered merge.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::domain::ports::{CopyRequest, TransportError};
use crate::domain::value_objects::{Direction, RemoteTarget};

use super::process::{classify_failure, run_with_timeout};
use super::ssh::{copy_tool_path, PortFlag, SshSettings};
use super::staging::copy_tree;
use super::strategy::{can_spawn, CopyStrategy};

/// Copy strategy using `scp -p`
pub(crate) struct ScpCopy {
    program: String,
}

impl ScpCopy {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    fn base_command(&self, ssh: &SshSettings, target: &RemoteTarget, recursive: bool) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-p").arg("-q");
        if recursive {
            cmd.arg("-r");
        }
        cmd.args(ssh.connection_args(target, PortFlag::Upper));
        if !target.auth.allows_prompt() {
            cmd.stdin(Stdio::null());
        }
        cmd
    }

    fn run(
        &self,
        cmd: Command,
        target: &RemoteTarget,
        timeout: Duration,
        path_hint: &str,
    ) -> Result<(), TransportError> {
        let output = run_with_timeout(cmd, timeout, "scp")?;
        if output.success() {
            Ok(())
        } else {
            Err(classify_failure(&target.host, "scp", &output, path_hint))
        }
    }

    fn push_directory(
        &self,
        ssh: &SshSettings,
        target: &RemoteTarget,
        request: &CopyRequest<'_>,
        timeout: Duration,
    ) -> Result<(), TransportError> {
        let started = Instant::now();
        let staging = tempfile::tempdir().map_err(scratch_error)?;

        let source: PathBuf = if request.filters.is_empty() {
            request.local.to_path_buf()
        } else {
            let staged = staging.path().join("staged");
            let count = copy_tree(request.local, &staged, request.filters).map_err(|e| {
                TransportError::TransferFailed(format!(
                    "failed to stage {}: {}",
                    request.local.display(),
                    e
                ))
            })?;
            tracing::debug!(files = count, "staged filtered directory for scp");
            staged
        };

        let entries = top_level_entries(&source)?;
        if entries.is_empty() {
            tracing::debug!(path = %source.display(), "nothing to send");
            return Ok(());
        }

        let remote_dir = copy_tool_path(request.remote).trim_end_matches('/');
        let mut cmd = self.base_command(ssh, target, true);
        cmd.args(&entries)
            .arg(target.remote_spec(&format!("{}/", remote_dir)));

        self.run(
            cmd,
            target,
            remaining(timeout, started)?,
            &request.local.display().to_string(),
        )
    }

    fn pull_directory(
        &self,
        ssh: &SshSettings,
        target: &RemoteTarget,
        request: &CopyRequest<'_>,
        timeout: Duration,
    ) -> Result<(), TransportError> {
        let started = Instant::now();
        let scratch = tempfile::tempdir().map_err(scratch_error)?;
        let fetched = scratch.path().join("fetched");

        let mut cmd = self.base_command(ssh, target, true);
        cmd.arg(target.remote_spec(copy_tool_path(request.remote)))
            .arg(&fetched);
        self.run(cmd, target, remaining(timeout, started)?, request.remote)?;

        let count = copy_tree(&fetched, request.local, request.filters).map_err(|e| {
            TransportError::TransferFailed(format!(
                "failed to write {}: {}",
                request.local.display(),
                e
            ))
        })?;
        tracing::debug!(files = count, "merged pulled directory");
        Ok(())
    }
}

impl CopyStrategy for ScpCopy {
    fn name(&self) -> &'static str {
        "scp"
    }

    fn is_available(&self) -> bool {
        can_spawn(&self.program, &[])
    }

    fn copy(
        &self,
        ssh: &SshSettings,
        target: &RemoteTarget,
        request: &CopyRequest<'_>,
        timeout: Duration,
    ) -> Result<(), TransportError> {
        let remote_spec = target.remote_spec(copy_tool_path(request.remote));

        match (request.direction, request.kind.is_directory()) {
            (Direction::Push, false) => {
                let mut cmd = self.base_command(ssh, target, false);
                cmd.arg(request.local).arg(remote_spec);
                self.run(cmd, target, timeout, &request.local.display().to_string())
            }
            (Direction::Pull, false) => {
                let mut cmd = self.base_command(ssh, target, false);
                cmd.arg(remote_spec).arg(request.local);
                self.run(cmd, target, timeout, request.remote)
            }
            (Direction::Push, true) => self.push_directory(ssh, target, request, timeout),
            (Direction::Pull, true) => self.pull_directory(ssh, target, request, timeout),
        }
    }
}

fn top_level_entries(dir: &Path) -> Result<Vec<PathBuf>, TransportError> {
    let read = fs::read_dir(dir).map_err(|e| {
        TransportError::TransferFailed(format!("failed to read {}: {}", dir.display(), e))
    })?;
    let mut entries = Vec::new();
    for entry in read {
        let entry = entry.map_err(|e| {
            TransportError::TransferFailed(format!("failed to read {}: {}", dir.display(), e))
        })?;
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

fn remaining(timeout: Duration, started: Instant) -> Result<Duration, TransportError> {
    timeout
        .checked_sub(started.elapsed())
        .filter(|d| !d.is_zero())
        .ok_or(TransportError::Timeout {
            operation: "scp".to_string(),
            timeout,
        })
}

fn scratch_error(e: std::io::Error) -> TransportError {
    TransportError::TransferFailed(format!("failed to create scratch directory: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn base_command_uses_upper_port_flag() {
        let target = RemoteTarget::new("h").with_port(2200);
        let cmd = ScpCopy::new("scp").base_command(&SshSettings::default(), &target, true);
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(&args[..3], ["-p", "-q", "-r"]);
        assert!(args.windows(2).any(|w| w[0] == "-P" && w[1] == "2200"));
    }

    #[test]
    fn top_level_entries_are_sorted() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b"), "").unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();

        let entries = top_level_entries(dir.path()).unwrap();
        assert_eq!(entries, vec![dir.path().join("a"), dir.path().join("b")]);
    }

    #[test]
    fn remaining_budget_runs_out() {
        let started = Instant::now() - Duration::from_secs(2);
        assert!(remaining(Duration::from_secs(1), started).is_err());
        assert!(remaining(Duration::from_secs(60), started).is_ok());
    }
}

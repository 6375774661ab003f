//! SSH Transport
//!
//! [`Transport`] implementation on top of the system `ssh` client with
//! rsync or scp for copies. Authentication is whatever the local ssh
//! setup provides (agent, identity file, or an interactive prompt).

mod process;
mod rsync;
mod scp;
mod ssh;
mod staging;
mod strategy;

pub use ssh::SshSettings;
pub use strategy::CopyPrograms;

use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

use crate::config::TransferMethod;
use crate::domain::ports::{CommandOutput, CopyRequest, Transport, TransportError};
use crate::domain::services::shell::quote_remote_path;
use crate::domain::value_objects::{Direction, RemoteTarget};

use process::{classify_failure, run_with_timeout, ProcessOutput};
use strategy::{detect_strategy, CopyStrategy};

/// Transport over the system ssh client.
pub struct SshTransport {
    ssh: SshSettings,
    method: TransferMethod,
    programs: CopyPrograms,
    verify_checksums: bool,
    strategy: OnceLock<Result<Box<dyn CopyStrategy>, TransportError>>,
}

impl SshTransport {
    pub fn new(ssh: SshSettings) -> Self {
        Self {
            ssh,
            method: TransferMethod::Auto,
            programs: CopyPrograms::default(),
            verify_checksums: false,
            strategy: OnceLock::new(),
        }
    }

    pub fn with_method(mut self, method: TransferMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_programs(mut self, programs: CopyPrograms) -> Self {
        self.programs = programs;
        self
    }

    /// Compare SHA-256 digests after every single-file copy
    pub fn with_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    fn strategy(&self) -> Result<&dyn CopyStrategy, TransportError> {
        let detected = self.strategy.get_or_init(|| {
            let detected = detect_strategy(self.method, &self.programs);
            match &detected {
                Ok(s) => tracing::debug!(method = s.name(), "selected copy method"),
                Err(e) => tracing::warn!(error = %e, "no copy method available"),
            }
            detected
        });
        match detected {
            Ok(strategy) => Ok(strategy.as_ref()),
            Err(e) => Err(e.clone()),
        }
    }

    /// Run `command` over ssh; only a failed channel is an error.
    fn ssh(
        &self,
        target: &RemoteTarget,
        command: &str,
        timeout: Duration,
    ) -> Result<ProcessOutput, TransportError> {
        tracing::debug!(host = %target.host, command, "ssh");
        let output = run_with_timeout(self.ssh.remote_command(target, command), timeout, "ssh")?;
        // 255 is ssh's own failure status, not the remote command's
        if output.status.code() == Some(255) {
            return Err(classify_failure(&target.host, "ssh", &output, ""));
        }
        Ok(output)
    }

    fn check_local_source(&self, request: &CopyRequest<'_>) -> Result<(), TransportError> {
        let metadata = fs::metadata(request.local).map_err(|_| TransportError::PathNotFound {
            path: request.local.display().to_string(),
        })?;
        match (request.kind.is_directory(), metadata.is_dir()) {
            (true, false) => Err(TransportError::TransferFailed(format!(
                "{} is not a directory",
                request.local.display()
            ))),
            (false, true) => Err(TransportError::TransferFailed(format!(
                "{} is a directory; declare the rule with kind = \"directory\"",
                request.local.display()
            ))),
            _ => Ok(()),
        }
    }

    fn ensure_remote_dir(
        &self,
        target: &RemoteTarget,
        request: &CopyRequest<'_>,
        timeout: Duration,
    ) -> Result<(), TransportError> {
        let Some(dir) = remote_dir_for(request) else {
            return Ok(());
        };
        let output = self.ssh(target, &format!("mkdir -p {}", quote_remote_path(dir)), timeout)?;
        if output.success() {
            Ok(())
        } else {
            Err(TransportError::TransferFailed(format!(
                "could not create remote directory {}: {}",
                dir,
                first_line(&output.stderr)
            )))
        }
    }

    fn ensure_local_dir(&self, request: &CopyRequest<'_>) -> Result<(), TransportError> {
        let dir = if request.kind.is_directory() {
            Some(request.local)
        } else {
            request.local.parent()
        };
        match dir {
            Some(dir) if !dir.as_os_str().is_empty() => {
                fs::create_dir_all(dir).map_err(|e| {
                    TransportError::TransferFailed(format!(
                        "could not create local directory {}: {}",
                        dir.display(),
                        e
                    ))
                })
            }
            _ => Ok(()),
        }
    }

    fn verify_checksum(
        &self,
        target: &RemoteTarget,
        request: &CopyRequest<'_>,
        timeout: Duration,
    ) -> Result<(), TransportError> {
        let local = sha256_file(request.local).map_err(|e| {
            TransportError::TransferFailed(format!(
                "could not hash {}: {}",
                request.local.display(),
                e
            ))
        })?;

        let output = self.ssh(
            target,
            &format!("sha256sum {}", quote_remote_path(request.remote)),
            timeout,
        )?;
        let remote = output
            .stdout
            .split_whitespace()
            .next()
            .filter(|_| output.success())
            .map(str::to_lowercase)
            .ok_or_else(|| {
                TransportError::TransferFailed(format!(
                    "checksum verification failed for {}: {}",
                    request.remote,
                    first_line(&output.stderr)
                ))
            })?;

        if local != remote {
            return Err(TransportError::ChecksumMismatch {
                path: request.remote.to_string(),
                local,
                remote,
            });
        }
        tracing::debug!(path = request.remote, "checksum verified");
        Ok(())
    }
}

impl Transport for SshTransport {
    fn name(&self) -> String {
        match self.strategy() {
            Ok(strategy) => format!("ssh+{}", strategy.name()),
            Err(_) => "ssh".to_string(),
        }
    }

    fn copy(&self, target: &RemoteTarget, request: &CopyRequest<'_>) -> Result<(), TransportError> {
        let started = Instant::now();
        let budget = || remaining(request.timeout, started);
        let strategy = self.strategy()?;

        match request.direction {
            Direction::Push => {
                self.check_local_source(request)?;
                self.ensure_remote_dir(target, request, budget()?)?;
            }
            Direction::Pull => self.ensure_local_dir(request)?,
        }

        tracing::debug!(
            method = strategy.name(),
            direction = %request.direction,
            local = %request.local.display(),
            remote = request.remote,
            "copying"
        );
        strategy.copy(&self.ssh, target, request, budget()?)?;

        if self.verify_checksums && !request.kind.is_directory() {
            self.verify_checksum(target, request, budget()?)?;
        }
        Ok(())
    }

    fn run_command(
        &self,
        target: &RemoteTarget,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandOutput, TransportError> {
        let output = self.ssh(target, command, timeout)?;
        Ok(CommandOutput {
            status: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Remote directory that must exist before a push, if any.
fn remote_dir_for<'a>(request: &CopyRequest<'a>) -> Option<&'a str> {
    let path = request.remote.trim_end_matches('/');
    let dir = if request.kind.is_directory() {
        path
    } else {
        path.rsplit_once('/').map(|(parent, _)| parent)?
    };
    match dir {
        "" | "~" => None,
        dir => Some(dir),
    }
}

fn remaining(timeout: Duration, started: Instant) -> Result<Duration, TransportError> {
    timeout
        .checked_sub(started.elapsed())
        .filter(|d| !d.is_zero())
        .ok_or(TransportError::Timeout {
            operation: "copy".to_string(),
            timeout,
        })
}

fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

fn first_line(text: &str) -> &str {
    text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("")
}

//! Child process execution with a hard time budget.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::domain::ports::TransportError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured result of a finished child process
#[derive(Debug)]
pub(crate) struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Run `cmd` to completion, killing it once `timeout` elapses.
///
/// stdout/stderr are always captured; the caller decides stdin.
pub(crate) fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    operation: &str,
) -> Result<ProcessOutput, TransportError> {
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    tracing::trace!(command = ?cmd, timeout_secs = timeout.as_secs(), "spawning");

    let program = cmd.get_program().to_string_lossy().into_owned();
    let mut child = cmd.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TransportError::Unavailable(format!("'{}' not found in PATH", program))
        } else {
            TransportError::TransferFailed(format!("failed to start '{}': {}", program, e))
        }
    })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = wait_until(&mut child, Instant::now() + timeout).map_err(|e| match e {
        WaitError::TimedOut => TransportError::Timeout {
            operation: operation.to_string(),
            timeout,
        },
        WaitError::Io(e) => TransportError::TransferFailed(format!(
            "failed waiting for '{}': {}",
            program, e
        )),
    })?;

    Ok(ProcessOutput {
        status,
        stdout: collect(stdout),
        stderr: collect(stderr),
    })
}

enum WaitError {
    TimedOut,
    Io(std::io::Error),
}

fn wait_until(child: &mut Child, deadline: Instant) -> Result<ExitStatus, WaitError> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(WaitError::TimedOut);
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(WaitError::Io(e)),
        }
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Map a failed ssh/scp/rsync invocation to a transport error.
///
/// ssh reports its own failures with exit status 255; the copy tools
/// forward ssh's stderr. `path_hint` names the path reported on
/// "No such file or directory".
pub(crate) fn classify_failure(
    host: &str,
    tool: &str,
    output: &ProcessOutput,
    path_hint: &str,
) -> TransportError {
    let stderr = output.stderr.trim();
    let lower = stderr.to_lowercase();
    let detail = first_line(stderr);

    const AUTH_MARKERS: &[&str] = &[
        "permission denied (",
        "authentication failed",
        "too many authentication failures",
        "host key verification failed",
        "no more authentication methods",
    ];
    const CONNECTION_MARKERS: &[&str] = &[
        "could not resolve hostname",
        "connection refused",
        "connection timed out",
        "operation timed out",
        "no route to host",
        "network is unreachable",
        "connection reset",
        "connection closed",
        "lost connection",
        "broken pipe",
    ];

    if AUTH_MARKERS.iter().any(|m| lower.contains(m)) {
        return TransportError::AuthFailed {
            host: host.to_string(),
            detail,
        };
    }
    if CONNECTION_MARKERS.iter().any(|m| lower.contains(m)) {
        return TransportError::ConnectionFailed {
            host: host.to_string(),
            detail,
        };
    }
    if lower.contains("no such file or directory") {
        return TransportError::PathNotFound {
            path: path_hint.to_string(),
        };
    }
    if output.status.code() == Some(255) {
        return TransportError::ConnectionFailed {
            host: host.to_string(),
            detail: if detail.is_empty() {
                "ssh exited with status 255".to_string()
            } else {
                detail
            },
        };
    }

    let status = output
        .status
        .code()
        .map(|c| format!("exit status {}", c))
        .unwrap_or_else(|| "terminated by signal".to_string());
    if detail.is_empty() {
        TransportError::TransferFailed(format!("{} failed with {}", tool, status))
    } else {
        TransportError::TransferFailed(format!("{} failed with {}: {}", tool, status, detail))
    }
}

fn first_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
        .to_string()
}

//! ssh invocation details shared by every copy method.

use std::process::{Command, Stdio};
use std::time::Duration;

use crate::domain::services::shell::quote;
use crate::domain::value_objects::{AuthMethod, RemoteTarget};

/// Connection settings applied to ssh, scp and rsync alike.
#[derive(Debug, Clone)]
pub struct SshSettings {
    pub ssh_program: String,
    pub connect_timeout: Duration,
    /// Extra `-o` options (`Key=Value`)
    pub options: Vec<String>,
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            ssh_program: "ssh".to_string(),
            connect_timeout: Duration::from_secs(10),
            options: Vec::new(),
        }
    }
}

/// Which tool the options are for; only the port flag differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PortFlag {
    /// ssh and rsync's `-e` use `-p`
    Lower,
    /// scp uses `-P`
    Upper,
}

impl SshSettings {
    /// Options common to every invocation against `target`.
    pub(crate) fn connection_args(&self, target: &RemoteTarget, port_flag: PortFlag) -> Vec<String> {
        let mut args = Vec::new();

        if !target.auth.allows_prompt() {
            args.push("-o".to_string());
            args.push("BatchMode=yes".to_string());
        }
        args.push("-o".to_string());
        args.push(format!(
            "ConnectTimeout={}",
            self.connect_timeout.as_secs().max(1)
        ));

        if let AuthMethod::Key { identity_file } = &target.auth {
            args.push("-i".to_string());
            args.push(identity_file.display().to_string());
            args.push("-o".to_string());
            args.push("IdentitiesOnly=yes".to_string());
        }

        for option in &self.options {
            args.push("-o".to_string());
            args.push(option.clone());
        }

        if let Some(port) = target.port {
            args.push(match port_flag {
                PortFlag::Lower => "-p".to_string(),
                PortFlag::Upper => "-P".to_string(),
            });
            args.push(port.to_string());
        }

        args
    }

    /// `ssh [options] destination -- command`
    pub(crate) fn remote_command(&self, target: &RemoteTarget, command: &str) -> Command {
        let mut cmd = Command::new(&self.ssh_program);
        cmd.args(self.connection_args(target, PortFlag::Lower))
            .arg(target.destination())
            .arg("--")
            .arg(command);
        if !target.auth.allows_prompt() {
            cmd.stdin(Stdio::null());
        }
        cmd
    }

    /// The remote-shell string handed to `rsync -e`.
    pub(crate) fn rsync_shell(&self, target: &RemoteTarget) -> String {
        std::iter::once(self.ssh_program.as_str())
            .map(quote)
            .chain(
                self.connection_args(target, PortFlag::Lower)
                    .iter()
                    .map(|a| quote(a)),
            )
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Path as given to scp/rsync, which resolve relative paths against the
/// login directory.
pub(crate) fn copy_tool_path(path: &str) -> &str {
    match path.strip_prefix("~/") {
        Some("") => ".",
        Some(rest) => rest,
        None => path,
    }
}

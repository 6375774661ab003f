//! Release Options
//!
//! Everything the release trigger needs, passed in explicitly.

use std::time::Duration;

use crate::domain::services::shell::{quote, quote_remote_path};

/// Options for the release trigger
#[derive(Debug, Clone)]
pub struct ReleaseOptions {
    /// Remote git working tree
    pub repo_dir: String,
    /// systemd unit to restart and probe
    pub service: String,
    /// git remote; `origin` when only a branch is given
    pub remote: Option<String>,
    pub branch: Option<String>,
    /// Prefix the restart with `sudo -n`
    pub sudo: bool,
    pub health_attempts: u32,
    /// Fixed wait between health probes
    pub health_backoff: Duration,
    /// Budget for each remote command
    pub command_timeout: Duration,
}

impl ReleaseOptions {
    pub fn new(repo_dir: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            service: service.into(),
            remote: None,
            branch: None,
            sudo: false,
            health_attempts: 10,
            health_backoff: Duration::from_secs(3),
            command_timeout: Duration::from_secs(120),
        }
    }

    pub fn with_upstream(mut self, remote: Option<String>, branch: Option<String>) -> Self {
        self.remote = remote;
        self.branch = branch;
        self
    }

    pub fn with_sudo(mut self, sudo: bool) -> Self {
        self.sudo = sudo;
        self
    }

    pub fn with_health_checks(mut self, attempts: u32, backoff: Duration) -> Self {
        self.health_attempts = attempts;
        self.health_backoff = backoff;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Fast-forward-only update of the remote working tree
    pub fn update_command(&self) -> String {
        let mut cmd = format!(
            "cd {} && git pull --ff-only",
            quote_remote_path(&self.repo_dir)
        );
        match (&self.remote, &self.branch) {
            (Some(remote), Some(branch)) => {
                cmd.push_str(&format!(" {} {}", quote(remote), quote(branch)));
            }
            (None, Some(branch)) => cmd.push_str(&format!(" origin {}", quote(branch))),
            (Some(remote), None) => cmd.push_str(&format!(" {}", quote(remote))),
            (None, None) => {}
        }
        cmd
    }

    pub fn restart_command(&self) -> String {
        let prefix = if self.sudo { "sudo -n " } else { "" };
        format!("{}systemctl restart {}", prefix, quote(&self.service))
    }

    pub fn health_command(&self) -> String {
        format!("systemctl is-active --quiet {}", quote(&self.service))
    }
}

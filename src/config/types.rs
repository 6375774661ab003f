//! Configuration type definitions

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{AuthMethod, RemoteTarget};
use crate::error::{ConfigError, ConfigResult};

use super::loader::{self, ConfigWarning};

/// Default config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "courier.toml";

/// Default manifest file name
pub const DEFAULT_MANIFEST: &str = "courier.manifest.toml";

/// How ssh may authenticate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    #[default]
    Agent,
    Key,
    Interactive,
}

/// Remote host configuration (`[target]`)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TargetConfig {
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub auth: AuthKind,

    /// Required when `auth = "key"`
    #[serde(default)]
    pub identity_file: Option<PathBuf>,
}

/// Copy tool selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransferMethod {
    /// rsync if installed, otherwise scp
    #[default]
    Auto,
    Rsync,
    Scp,
}

impl TransferMethod {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "rsync" => Some(Self::Rsync),
            "scp" => Some(Self::Scp),
            _ => None,
        }
    }
}

/// Transport configuration (`[transport]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default)]
    pub method: TransferMethod,

    /// Per-operation budget for copies
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// ssh `ConnectTimeout`
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Compare SHA-256 of local and remote file after each file copy
    #[serde(default)]
    pub verify_checksums: bool,

    /// Extra `-o` options passed to every ssh/scp/rsync invocation
    #[serde(default)]
    pub ssh_options: Vec<String>,

    #[serde(default = "default_ssh_program")]
    pub ssh_program: String,

    #[serde(default = "default_scp_program")]
    pub scp_program: String,

    #[serde(default = "default_rsync_program")]
    pub rsync_program: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            method: TransferMethod::default(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            verify_checksums: false,
            ssh_options: Vec::new(),
            ssh_program: default_ssh_program(),
            scp_program: default_scp_program(),
            rsync_program: default_rsync_program(),
        }
    }
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_ssh_program() -> String {
    "ssh".to_string()
}

fn default_scp_program() -> String {
    "scp".to_string()
}

fn default_rsync_program() -> String {
    "rsync".to_string()
}

/// Release configuration (`[release]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// Remote git working tree
    #[serde(default)]
    pub repo_dir: Option<String>,

    /// systemd unit to restart
    #[serde(default)]
    pub service: Option<String>,

    /// git remote for the fast-forward pull (defaults to the branch's upstream)
    #[serde(default)]
    pub remote: Option<String>,

    #[serde(default)]
    pub branch: Option<String>,

    /// Prefix restart with `sudo -n`
    #[serde(default)]
    pub sudo: bool,

    #[serde(default = "default_health_attempts")]
    pub health_attempts: u32,

    #[serde(default = "default_health_backoff_secs")]
    pub health_backoff_secs: u64,

    /// Budget for each remote release command
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            repo_dir: None,
            service: None,
            remote: None,
            branch: None,
            sudo: false,
            health_attempts: default_health_attempts(),
            health_backoff_secs: default_health_backoff_secs(),
            command_timeout_secs: default_command_timeout_secs(),
        }
    }
}

fn default_health_attempts() -> u32 {
    10
}

fn default_health_backoff_secs() -> u64 {
    3
}

fn default_command_timeout_secs() -> u64 {
    120
}

/// Manifest location (`[manifest]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestConfig {
    #[serde(default = "default_manifest_path")]
    pub path: PathBuf,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            path: default_manifest_path(),
        }
    }
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from(DEFAULT_MANIFEST)
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub manifest: ManifestConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        loader::load_with_warnings(path).map(|(config, _)| config)
    }

    /// Load configuration and collect unknown-key warnings
    pub fn load_with_warnings(path: &Path) -> ConfigResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Apply `COURIER_*` environment overrides
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        loader::with_env_overrides(self, |key| std::env::var(key).ok())
    }

    /// Reject values that parse but cannot work
    pub fn validate(&self) -> ConfigResult<()> {
        if self.target.port == Some(0) {
            return Err(ConfigError::Invalid("target.port must be 1-65535".to_string()));
        }
        if self.target.auth == AuthKind::Key && self.target.identity_file.is_none() {
            return Err(ConfigError::Invalid(
                "target.auth = \"key\" requires target.identity_file".to_string(),
            ));
        }
        if self.transport.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "transport.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.release.health_attempts == 0 {
            return Err(ConfigError::Invalid(
                "release.health_attempts must be at least 1".to_string(),
            ));
        }
        if self.release.command_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "release.command_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the remote target, letting a CLI `--host` win over config.
    pub fn remote_target(&self, host_override: Option<&str>) -> ConfigResult<RemoteTarget> {
        let host = host_override
            .map(str::to_string)
            .or_else(|| self.target.host.clone())
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::Invalid(
                    "no remote host configured (set [target].host, COURIER_HOST or --host)"
                        .to_string(),
                )
            })?;

        let auth = match self.target.auth {
            AuthKind::Agent => AuthMethod::Agent,
            AuthKind::Interactive => AuthMethod::Interactive,
            AuthKind::Key => AuthMethod::Key {
                identity_file: self.target.identity_file.clone().ok_or_else(|| {
                    ConfigError::Invalid(
                        "target.auth = \"key\" requires target.identity_file".to_string(),
                    )
                })?,
            },
        };

        let mut target = RemoteTarget::new(host).with_auth(auth);
        if let Some(user) = &self.target.user {
            target = target.with_user(user.clone());
        }
        if let Some(port) = self.target.port {
            target = target.with_port(port);
        }
        Ok(target)
    }
}

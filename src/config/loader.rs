//! Configuration loading
//!
//! Lookup order (highest priority first):
//! 1. CLI flags (applied by the caller)
//! 2. Environment variables (`COURIER_*`)
//! 3. `--config PATH`, or `courier.toml` in the working directory
//! 4. User config (`~/.config/courier/config.toml`)
//! 5. Built-in defaults

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

use super::types::{Config, TransferMethod, CONFIG_FILE_NAME};

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown config key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// A loaded configuration with provenance.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: Config,
    pub warnings: Vec<ConfigWarning>,
    /// File the config came from (`None` = defaults only)
    pub path: Option<PathBuf>,
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> ConfigResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Find and load configuration.
///
/// An explicit path must exist. Without one, `courier.toml` in `cwd` is
/// tried, then the user config; if neither exists, defaults are used.
pub fn discover(
    explicit: Option<&Path>,
    cwd: &Path,
    user_config_dir: Option<&Path>,
) -> ConfigResult<LoadedConfig> {
    let candidate = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let project = cwd.join(CONFIG_FILE_NAME);
            let user = user_config_dir.map(|d| d.join("courier").join("config.toml"));
            if project.is_file() {
                Some(project)
            } else {
                user.filter(|p| p.is_file())
            }
        }
    };

    match candidate {
        Some(path) => {
            let (config, warnings) = load_with_warnings(&path)?;
            Ok(LoadedConfig {
                config,
                warnings,
                path: Some(path),
            })
        }
        None => Ok(LoadedConfig::default()),
    }
}

/// Apply environment variable overrides (`COURIER_*` prefix)
///
/// `lookup` abstracts `std::env::var` so tests don't mutate process state.
pub fn with_env_overrides<F>(mut config: Config, lookup: F) -> ConfigResult<Config>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("COURIER_HOST") {
        config.target.host = Some(host);
    }

    if let Some(user) = lookup("COURIER_USER") {
        config.target.user = Some(user);
    }

    if let Some(port) = lookup("COURIER_PORT") {
        let port = port.trim().parse::<u16>().map_err(|_| {
            ConfigError::Invalid(format!("COURIER_PORT must be a port number, got '{}'", port))
        })?;
        config.target.port = Some(port);
    }

    if let Some(service) = lookup("COURIER_SERVICE") {
        config.release.service = Some(service);
    }

    if let Some(secs) = lookup("COURIER_TIMEOUT_SECS") {
        config.transport.timeout_secs = secs.trim().parse::<u64>().map_err(|_| {
            ConfigError::Invalid(format!(
                "COURIER_TIMEOUT_SECS must be a number of seconds, got '{}'",
                secs
            ))
        })?;
    }

    if let Some(method) = lookup("COURIER_TRANSFER_METHOD") {
        config.transport.method = TransferMethod::parse(&method).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "COURIER_TRANSFER_METHOD must be auto, rsync or scp, got '{}'",
                method
            ))
        })?;
    }

    Ok(config)
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "target",
        "host",
        "user",
        "port",
        "auth",
        "identity_file",
        "transport",
        "method",
        "timeout_secs",
        "connect_timeout_secs",
        "verify_checksums",
        "ssh_options",
        "ssh_program",
        "scp_program",
        "rsync_program",
        "release",
        "repo_dir",
        "service",
        "remote",
        "branch",
        "sudo",
        "health_attempts",
        "health_backoff_secs",
        "command_timeout_secs",
        "manifest",
        "path",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}

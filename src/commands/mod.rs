//! Command handlers
//!
//! Each handler loads what it needs through [`Context`], runs one use case
//! and prints the summary. Handlers return an [`Outcome`]; errors that
//! escape them are mapped to exit codes by [`error_exit_code`].

pub mod check;
pub mod deploy;
pub mod sync;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use anyhow::{Context as _, Result};

use courier::config::{self, Config};
use courier::domain::entities::Manifest;
use courier::domain::value_objects::{Direction, RemoteTarget};
use courier::error::{ConfigError, ValidationError};
use courier::infrastructure::FsManifestRepository;
use courier::presentation::{Cli, Commands, OutputFormat};

/// How a command finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// A rule, the release or the run itself failed (or was cancelled)
    Failed,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::Failed => 1,
        }
    }
}

/// Exit status for an error that escaped a command.
///
/// Bad manifests and bad configuration exit with 2, like clap's own usage
/// errors. Everything else exits with 1.
pub fn error_exit_code(err: &anyhow::Error) -> u8 {
    if error_kind(err) == "error" {
        1
    } else {
        2
    }
}

/// Short machine-readable kind for an escaped error
pub fn error_kind(err: &anyhow::Error) -> &'static str {
    if err.downcast_ref::<ValidationError>().is_some() {
        "validation"
    } else if err.downcast_ref::<ConfigError>().is_some() {
        "config"
    } else {
        "error"
    }
}

/// Everything a command needs from the environment
pub struct Context {
    pub config: Config,
    pub host: Option<String>,
    pub format: OutputFormat,
    pub cwd: PathBuf,
}

impl Context {
    /// Discover config, apply `COURIER_*` overrides and validate.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("cannot determine working directory")?;
        let user_config_dir = dirs::home_dir().map(|home| home.join(".config"));

        let loaded = config::discover(cli.config.as_deref(), &cwd, user_config_dir.as_deref())?;
        for warning in &loaded.warnings {
            tracing::warn!("{}", warning);
        }
        if let Some(path) = &loaded.path {
            tracing::debug!("loaded config from {}", path.display());
        }

        let config = loaded.config.with_env_overrides()?;
        config.validate()?;

        Ok(Self {
            config,
            host: cli.host.clone(),
            format: OutputFormat::from_json_flag(cli.json),
            cwd,
        })
    }

    pub fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Manifest path: `--manifest`, else `[manifest].path`, relative to cwd.
    pub fn manifest_path(&self, flag: Option<&Path>) -> PathBuf {
        let path = flag.unwrap_or(&self.config.manifest.path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    pub fn load_manifest(&self, flag: Option<&Path>) -> Result<Manifest> {
        let path = self.manifest_path(flag);
        tracing::debug!("loading manifest {}", path.display());
        Ok(FsManifestRepository::new().load(&path)?)
    }

    pub fn target(&self) -> Result<RemoteTarget> {
        Ok(self.config.remote_target(self.host.as_deref())?)
    }
}

/// Ctrl-C flag shared by every run in this process.
///
/// The first interrupt asks the sync engine to stop before the next rule;
/// the rule in flight is allowed to finish.
pub fn cancel_flag() -> Arc<AtomicBool> {
    static FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();
    FLAG.get_or_init(|| {
        let flag = Arc::new(AtomicBool::new(false));
        let handler_flag = Arc::clone(&flag);
        if let Err(e) = ctrlc::set_handler(move || {
            handler_flag.store(true, Ordering::SeqCst);
        }) {
            tracing::debug!("ctrl-c handler not installed: {}", e);
        }
        flag
    })
    .clone()
}

/// Run the selected subcommand
pub fn dispatch(cli: &Cli) -> Result<Outcome> {
    let ctx = Context::load(cli)?;

    match &cli.command {
        Commands::Push { manifest, dry_run } => {
            sync::cmd_sync(&ctx, Direction::Push, manifest.as_deref(), *dry_run)
        }
        Commands::Pull { manifest, dry_run } => {
            sync::cmd_sync(&ctx, Direction::Pull, manifest.as_deref(), *dry_run)
        }
        Commands::Deploy {
            service,
            push,
            manifest,
        } => deploy::cmd_deploy(&ctx, service.as_deref(), *push, manifest.as_deref()),
        Commands::Check { manifest } => check::cmd_check(&ctx, manifest.as_deref()),
    }
}

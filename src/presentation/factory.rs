//! Use Case Factory
//!
//! Creates use cases with infrastructure dependencies wired up from the
//! loaded configuration. This is the dependency injection point for the
//! application.

use std::time::Duration;

use crate::application::{ReleaseOptions, ReleaseTrigger, SyncEngine, SyncOptions};
use crate::config::Config;
use crate::domain::ports::{RunEventSink, Transport};
use crate::error::{ConfigError, ConfigResult};
use crate::infrastructure::{
    ConsoleEventSink, CopyPrograms, JsonEventSink, SshSettings, SshTransport,
};

/// Create the ssh transport described by `[transport]`
pub fn create_transport(config: &Config) -> SshTransport {
    let transport = &config.transport;
    let settings = SshSettings {
        ssh_program: transport.ssh_program.clone(),
        connect_timeout: Duration::from_secs(transport.connect_timeout_secs),
        options: transport.ssh_options.clone(),
    };
    let programs = CopyPrograms {
        scp: transport.scp_program.clone(),
        rsync: transport.rsync_program.clone(),
    };

    SshTransport::new(settings)
        .with_method(transport.method)
        .with_programs(programs)
        .with_checksums(transport.verify_checksums)
}

/// Create a sync engine over `transport`
pub fn create_sync_engine<T: Transport>(
    transport: T,
    config: &Config,
    dry_run: bool,
) -> SyncEngine<T> {
    let options = SyncOptions::new(config.transport.timeout()).with_dry_run(dry_run);
    SyncEngine::new(transport, options)
}

/// Release options from `[release]`, with an optional `--service` override.
///
/// Fails when the repository directory or the service is not configured.
pub fn release_options(config: &Config, service: Option<&str>) -> ConfigResult<ReleaseOptions> {
    let release = &config.release;
    let repo_dir = release
        .repo_dir
        .clone()
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ConfigError::Invalid("deploy requires [release].repo_dir".to_string()))?;
    let service = service
        .map(str::to_string)
        .or_else(|| release.service.clone())
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            ConfigError::Invalid(
                "deploy requires a service ([release].service, COURIER_SERVICE or --service)"
                    .to_string(),
            )
        })?;

    Ok(ReleaseOptions::new(repo_dir, service)
        .with_upstream(release.remote.clone(), release.branch.clone())
        .with_sudo(release.sudo)
        .with_health_checks(
            release.health_attempts,
            Duration::from_secs(release.health_backoff_secs),
        )
        .with_command_timeout(Duration::from_secs(release.command_timeout_secs)))
}

/// Create a release trigger over `transport`
pub fn create_release_trigger<T: Transport>(
    transport: T,
    options: ReleaseOptions,
) -> ReleaseTrigger<T> {
    ReleaseTrigger::new(transport, options)
}

/// Event sink for the chosen output mode
pub fn create_event_sink(json: bool) -> Box<dyn RunEventSink> {
    if json {
        Box::new(JsonEventSink::stdout())
    } else {
        Box::new(ConsoleEventSink::stdout())
    }
}

//! Release Trigger
//!
//! Update, restart, verify:
//! 1. Fast-forward the remote working tree (never forced)
//! 2. Restart the service, only if the update succeeded
//! 3. Poll the health check until healthy or out of attempts
//!
//! There is no rollback; a failed release is reported and left as is.

use std::thread;
use std::time::Duration;

use serde::Serialize;

use crate::domain::ports::{NoopEventSink, RunEvent, RunEventSink, Transport};
use crate::domain::value_objects::RemoteTarget;
use crate::error::DeployError;

use super::options::ReleaseOptions;

/// Result of a successful release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub service: String,
    /// Probes used, including the healthy one
    pub attempts: u32,
}

type Sleeper = Box<dyn Fn(Duration) + Send + Sync>;

/// Release trigger, parameterized by its transport
pub struct ReleaseTrigger<T: Transport> {
    transport: T,
    options: ReleaseOptions,
    sleep: Sleeper,
}

impl<T: Transport> ReleaseTrigger<T> {
    pub fn new(transport: T, options: ReleaseOptions) -> Self {
        Self {
            transport,
            options,
            sleep: Box::new(thread::sleep),
        }
    }

    /// Replace the backoff sleep (tests record instead of waiting)
    pub fn with_sleeper(mut self, sleep: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    pub fn options(&self) -> &ReleaseOptions {
        &self.options
    }

    pub fn deploy(&self, target: &RemoteTarget) -> Result<HealthStatus, DeployError> {
        self.deploy_with_events(target, &NoopEventSink)
    }

    pub fn deploy_with_events(
        &self,
        target: &RemoteTarget,
        sink: &dyn RunEventSink,
    ) -> Result<HealthStatus, DeployError> {
        sink.on_event(RunEvent::ReleaseStarted {
            target: target.to_string(),
            service: self.options.service.clone(),
        });

        let result = self.release(target, sink);

        match &result {
            Ok(status) => tracing::debug!(attempts = status.attempts, "service healthy"),
            Err(e) => tracing::error!(error = %e, "release failed"),
        }
        sink.on_event(RunEvent::ReleaseFinished {
            healthy: result.is_ok(),
            error: result.as_ref().err().map(|e| e.to_string()),
        });
        result
    }

    fn release(
        &self,
        target: &RemoteTarget,
        sink: &dyn RunEventSink,
    ) -> Result<HealthStatus, DeployError> {
        let timeout = self.options.command_timeout;

        let update = self
            .transport
            .run_command(target, &self.options.update_command(), timeout)
            .map_err(|e| DeployError::UpdateFailed {
                detail: e.to_string(),
            })?;
        if !update.success() {
            return Err(DeployError::UpdateFailed {
                detail: update.failure_detail(),
            });
        }
        let detail = update.stdout.lines().next().unwrap_or("").trim().to_string();
        tracing::debug!(%detail, "remote updated");
        sink.on_event(RunEvent::UpdateSucceeded { detail });

        let service = &self.options.service;
        let restart = self
            .transport
            .run_command(target, &self.options.restart_command(), timeout)
            .map_err(|e| DeployError::RestartFailed {
                service: service.clone(),
                detail: e.to_string(),
            })?;
        if !restart.success() {
            return Err(DeployError::RestartFailed {
                service: service.clone(),
                detail: restart.failure_detail(),
            });
        }
        sink.on_event(RunEvent::RestartIssued {
            service: service.clone(),
        });

        self.wait_healthy(target, sink)
    }

    fn wait_healthy(
        &self,
        target: &RemoteTarget,
        sink: &dyn RunEventSink,
    ) -> Result<HealthStatus, DeployError> {
        let max_attempts = self.options.health_attempts;
        let command = self.options.health_command();

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                (self.sleep)(self.options.health_backoff);
            }

            let healthy = match self
                .transport
                .run_command(target, &command, self.options.command_timeout)
            {
                Ok(output) => output.success(),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "health probe failed");
                    false
                }
            };
            tracing::debug!(attempt, max_attempts, healthy, "health probe");
            sink.on_event(RunEvent::HealthProbe {
                attempt,
                max_attempts,
                healthy,
            });

            if healthy {
                return Ok(HealthStatus {
                    service: self.options.service.clone(),
                    attempts: attempt,
                });
            }
        }

        Err(DeployError::HealthCheckTimeout {
            service: self.options.service.clone(),
            attempts: max_attempts,
        })
    }
}

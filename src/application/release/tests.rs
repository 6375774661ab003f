//! Release Trigger Tests

use super::*;
use crate::domain::ports::{
    CommandOutput, CopyRequest, RunEvent, RunEventSink, Transport, TransportError,
};
use crate::domain::value_objects::RemoteTarget;
use crate::error::DeployError;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted remote: each command kind pops its next response.
#[derive(Default)]
struct MockRemote {
    commands: RefCell<Vec<String>>,
    update: RefCell<VecDeque<Result<CommandOutput, TransportError>>>,
    restart: RefCell<VecDeque<Result<CommandOutput, TransportError>>>,
    health: RefCell<VecDeque<Result<CommandOutput, TransportError>>>,
}

fn exit(code: i32) -> Result<CommandOutput, TransportError> {
    Ok(CommandOutput {
        status: Some(code),
        ..Default::default()
    })
}

fn fails(stderr: &str) -> Result<CommandOutput, TransportError> {
    Ok(CommandOutput {
        status: Some(1),
        stdout: String::new(),
        stderr: stderr.to_string(),
    })
}

impl MockRemote {
    fn new() -> Self {
        Self::default()
    }

    fn update(self, response: Result<CommandOutput, TransportError>) -> Self {
        self.update.borrow_mut().push_back(response);
        self
    }

    fn restart(self, response: Result<CommandOutput, TransportError>) -> Self {
        self.restart.borrow_mut().push_back(response);
        self
    }

    fn health(self, responses: Vec<Result<CommandOutput, TransportError>>) -> Self {
        self.health.borrow_mut().extend(responses);
        self
    }

    fn count(&self, needle: &str) -> usize {
        self.commands
            .borrow()
            .iter()
            .filter(|c| c.contains(needle))
            .count()
    }
}

impl Transport for MockRemote {
    fn name(&self) -> String {
        "mock".to_string()
    }

    fn copy(&self, _target: &RemoteTarget, _request: &CopyRequest<'_>) -> Result<(), TransportError> {
        Ok(())
    }

    fn run_command(
        &self,
        _target: &RemoteTarget,
        command: &str,
        _timeout: Duration,
    ) -> Result<CommandOutput, TransportError> {
        self.commands.borrow_mut().push(command.to_string());
        let queue = if command.contains("git pull") {
            &self.update
        } else if command.contains("systemctl restart") {
            &self.restart
        } else {
            &self.health
        };
        queue.borrow_mut().pop_front().unwrap_or_else(|| exit(0))
    }
}

fn options(attempts: u32) -> ReleaseOptions {
    ReleaseOptions::new("/opt/bot", "bot").with_health_checks(attempts, Duration::from_secs(3))
}

fn trigger(remote: &MockRemote, attempts: u32) -> (ReleaseTrigger<&MockRemote>, Arc<Mutex<Vec<Duration>>>) {
    let sleeps = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&sleeps);
    let trigger = ReleaseTrigger::new(remote, options(attempts))
        .with_sleeper(move |d| recorded.lock().unwrap().push(d));
    (trigger, sleeps)
}

fn target() -> RemoteTarget {
    RemoteTarget::new("bot.example.org")
}

#[test]
fn healthy_release_runs_update_restart_probe_in_order() {
    let remote = MockRemote::new();
    let (trigger, sleeps) = trigger(&remote, 5);

    let status = trigger.deploy(&target()).unwrap();

    assert_eq!(
        status,
        HealthStatus {
            service: "bot".to_string(),
            attempts: 1
        }
    );
    assert_eq!(
        *remote.commands.borrow(),
        vec![
            "cd /opt/bot && git pull --ff-only",
            "systemctl restart bot",
            "systemctl is-active --quiet bot",
        ]
    );
    assert!(sleeps.lock().unwrap().is_empty());
}

#[test]
fn update_failure_never_restarts() {
    let remote = MockRemote::new().update(fails("fatal: Not possible to fast-forward, aborting."));
    let (trigger, _) = trigger(&remote, 5);

    let err = trigger.deploy(&target()).unwrap_err();

    assert!(matches!(err, DeployError::UpdateFailed { .. }));
    assert!(err.to_string().contains("Not possible to fast-forward"));
    assert_eq!(remote.count("systemctl"), 0);
}

#[test]
fn update_transport_error_is_update_failed() {
    let remote = MockRemote::new().update(Err(TransportError::ConnectionFailed {
        host: "bot.example.org".to_string(),
        detail: "Connection refused".to_string(),
    }));
    let (trigger, _) = trigger(&remote, 5);

    let err = trigger.deploy(&target()).unwrap_err();

    assert_eq!(err.kind(), "update_failed");
    assert_eq!(remote.count("systemctl"), 0);
}

#[test]
fn restart_failure_skips_health_checks() {
    let remote = MockRemote::new().restart(fails("Failed to restart bot.service: Unit not found."));
    let (trigger, _) = trigger(&remote, 5);

    let err = trigger.deploy(&target()).unwrap_err();

    assert!(matches!(err, DeployError::RestartFailed { ref service, .. } if service == "bot"));
    assert_eq!(remote.count("is-active"), 0);
}

#[test]
fn polling_stops_at_first_healthy_probe() {
    let remote = MockRemote::new().health(vec![exit(3), exit(3), exit(0), exit(3)]);
    let (trigger, sleeps) = trigger(&remote, 10);

    let status = trigger.deploy(&target()).unwrap();

    assert_eq!(status.attempts, 3);
    assert_eq!(remote.count("is-active"), 3);
    // Sleep only between attempts
    assert_eq!(*sleeps.lock().unwrap(), vec![Duration::from_secs(3); 2]);
}

#[test]
fn timeout_only_after_all_attempts() {
    let remote = MockRemote::new().health(vec![exit(3); 4]);
    let (trigger, sleeps) = trigger(&remote, 4);

    let err = trigger.deploy(&target()).unwrap_err();

    assert_eq!(
        err,
        DeployError::HealthCheckTimeout {
            service: "bot".to_string(),
            attempts: 4
        }
    );
    assert_eq!(remote.count("is-active"), 4);
    assert_eq!(sleeps.lock().unwrap().len(), 3);
}

#[test]
fn transport_error_during_probe_counts_as_unhealthy() {
    let remote = MockRemote::new().health(vec![
        Err(TransportError::Timeout {
            operation: "ssh".to_string(),
            timeout: Duration::from_secs(120),
        }),
        exit(0),
    ]);
    let (trigger, _) = trigger(&remote, 3);

    let status = trigger.deploy(&target()).unwrap();

    assert_eq!(status.attempts, 2);
}

#[test]
fn events_report_each_step() {
    struct Names(Mutex<Vec<String>>);

    impl RunEventSink for Names {
        fn on_event(&self, event: RunEvent) {
            let name = match event {
                RunEvent::ReleaseStarted { .. } => "started".to_string(),
                RunEvent::UpdateSucceeded { .. } => "updated".to_string(),
                RunEvent::RestartIssued { .. } => "restarted".to_string(),
                RunEvent::HealthProbe {
                    attempt, healthy, ..
                } => format!("probe{}:{}", attempt, healthy),
                RunEvent::ReleaseFinished { healthy, .. } => format!("finished:{}", healthy),
                _ => "other".to_string(),
            };
            self.0.lock().unwrap().push(name);
        }
    }

    let remote = MockRemote::new().health(vec![exit(3), exit(0)]);
    let (trigger, _) = trigger(&remote, 3);
    let sink = Names(Mutex::new(Vec::new()));

    trigger.deploy_with_events(&target(), &sink).unwrap();

    assert_eq!(
        *sink.0.lock().unwrap(),
        vec![
            "started",
            "updated",
            "restarted",
            "probe1:false",
            "probe2:true",
            "finished:true"
        ]
    );
}

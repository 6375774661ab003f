//! JSON Event Sink
//!
//! Outputs run events as NDJSON for CI/automation consumption.

use crate::domain::entities::SyncRule;
use crate::domain::ports::{RunEvent, RunEventSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

fn rule_fields(rule: &SyncRule) -> serde_json::Value {
    serde_json::json!({
        "index": rule.index,
        "local": rule.local,
        "remote": rule.remote_path,
        "direction": rule.direction.as_str(),
        "optional": rule.optional,
    })
}

impl RunEventSink for JsonEventSink {
    fn on_event(&self, event: RunEvent) {
        let json = match event {
            RunEvent::SyncStarted {
                direction,
                target,
                rule_count,
                dry_run,
            } => serde_json::json!({
                "event": "start",
                "command": direction.as_str(),
                "target": target,
                "rule_count": rule_count,
                "dry_run": dry_run,
            }),

            RunEvent::RuleStarted { rule } => serde_json::json!({
                "event": "rule_start",
                "rule": rule_fields(&rule),
            }),

            RunEvent::RuleSucceeded { rule } => serde_json::json!({
                "event": "rule_ok",
                "rule": rule_fields(&rule),
            }),

            RunEvent::RuleSkipped { rule, error } => serde_json::json!({
                "event": "rule_skipped",
                "rule": rule_fields(&rule),
                "error": error,
            }),

            RunEvent::RuleFailed { rule, error } => serde_json::json!({
                "event": "rule_failed",
                "rule": rule_fields(&rule),
                "error": error,
            }),

            RunEvent::RulePlanned { rule } => serde_json::json!({
                "event": "rule_planned",
                "rule": rule_fields(&rule),
            }),

            RunEvent::SyncFinished {
                status,
                ok,
                skipped,
                failed,
                planned,
            } => serde_json::json!({
                "event": "complete",
                "status": status.as_str(),
                "ok": ok,
                "skipped": skipped,
                "failed": failed,
                "planned": planned,
            }),

            RunEvent::ReleaseStarted { target, service } => serde_json::json!({
                "event": "start",
                "command": "deploy",
                "target": target,
                "service": service,
            }),

            RunEvent::UpdateSucceeded { detail } => serde_json::json!({
                "event": "updated",
                "detail": detail,
            }),

            RunEvent::RestartIssued { service } => serde_json::json!({
                "event": "restarted",
                "service": service,
            }),

            RunEvent::HealthProbe {
                attempt,
                max_attempts,
                healthy,
            } => serde_json::json!({
                "event": "health_probe",
                "attempt": attempt,
                "max_attempts": max_attempts,
                "healthy": healthy,
            }),

            RunEvent::ReleaseFinished { healthy, error } => serde_json::json!({
                "event": "complete",
                "command": "deploy",
                "status": if healthy { "healthy" } else { "failed" },
                "error": error,
            }),
        };

        self.write_event(json);
    }
}

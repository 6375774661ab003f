//! Run Event Port
//!
//! Observable interface for sync runs and releases.
//! Enables progress reporting, JSON event streams, and debugging.

use crate::domain::entities::{RunStatus, SyncRule};
use crate::domain::value_objects::Direction;

/// Event emitted during a sync run or a release
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// Sync run started
    SyncStarted {
        direction: Direction,
        target: String,
        rule_count: usize,
        dry_run: bool,
    },

    /// A rule is about to be transferred
    RuleStarted { rule: SyncRule },

    /// Rule transferred
    RuleSucceeded { rule: SyncRule },

    /// Optional rule failed, run continues
    RuleSkipped { rule: SyncRule, error: String },

    /// Required rule failed, run aborts
    RuleFailed { rule: SyncRule, error: String },

    /// Dry run: rule would be transferred
    RulePlanned { rule: SyncRule },

    /// Sync run finalized
    SyncFinished {
        status: RunStatus,
        ok: usize,
        skipped: usize,
        failed: usize,
        planned: usize,
    },

    /// Release started
    ReleaseStarted { target: String, service: String },

    /// Remote working tree fast-forwarded
    UpdateSucceeded { detail: String },

    /// Restart command issued and accepted
    RestartIssued { service: String },

    /// One health probe
    HealthProbe {
        attempt: u32,
        max_attempts: u32,
        healthy: bool,
    },

    /// Release finished (successfully or not)
    ReleaseFinished {
        healthy: bool,
        error: Option<String>,
    },
}

/// Trait for receiving run events
///
/// Implementations can be:
/// - ConsoleEventSink: human-readable lines on stdout
/// - JsonEventSink: NDJSON event stream for CI
/// - NoopEventSink: Silent operation
pub trait RunEventSink: Send + Sync {
    /// Handle a run event
    fn on_event(&self, event: RunEvent);
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl RunEventSink for NoopEventSink {
    fn on_event(&self, _event: RunEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingSink {
        events: Mutex<Vec<String>>,
    }

    impl RunEventSink for RecordingSink {
        fn on_event(&self, event: RunEvent) {
            let name = match event {
                RunEvent::SyncStarted { .. } => "sync_started",
                RunEvent::SyncFinished { .. } => "sync_finished",
                _ => "other",
            };
            if let Ok(mut events) = self.events.lock() {
                events.push(name.to_string());
            }
        }
    }

    #[test]
    fn noop_sink_accepts_events() {
        let sink = NoopEventSink;
        sink.on_event(RunEvent::RestartIssued {
            service: "app".to_string(),
        });
    }

    #[test]
    fn sink_is_object_safe() {
        let sink: Box<dyn RunEventSink> = Box::new(RecordingSink {
            events: Mutex::new(Vec::new()),
        });
        sink.on_event(RunEvent::SyncStarted {
            direction: Direction::Push,
            target: "h".to_string(),
            rule_count: 0,
            dry_run: false,
        });
    }
}

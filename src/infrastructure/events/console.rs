//! Console Event Sink
//!
//! One human-readable progress line per rule or release step.

use crate::domain::ports::{RunEvent, RunEventSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Progress lines on stdout
pub struct ConsoleEventSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleEventSink {
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn line(&self, text: String) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", text);
            let _ = writer.flush();
        }
    }
}

impl RunEventSink for ConsoleEventSink {
    fn on_event(&self, event: RunEvent) {
        let text = match event {
            RunEvent::SyncStarted {
                direction,
                target,
                rule_count,
                dry_run,
            } => {
                let plural = if rule_count == 1 { "rule" } else { "rules" };
                let suffix = if dry_run { " (dry run)" } else { "" };
                format!("{} {} {} with {}{}", direction, rule_count, plural, target, suffix)
            }
            // Completion lines carry the label; nothing to show on start.
            RunEvent::RuleStarted { .. } => return,
            RunEvent::RuleSucceeded { rule } => format!("  ✓ {}", rule.label()),
            RunEvent::RuleSkipped { rule, error } => {
                format!("  ○ {} (optional, skipped: {})", rule.label(), error)
            }
            RunEvent::RuleFailed { rule, error } => format!("  ✗ {}: {}", rule.label(), error),
            RunEvent::RulePlanned { rule } => format!("  → {}", rule.label()),
            RunEvent::SyncFinished { .. } => return,
            RunEvent::ReleaseStarted { target, service } => {
                format!("deploy {} on {}", service, target)
            }
            RunEvent::UpdateSucceeded { detail } => {
                if detail.is_empty() {
                    "  ✓ update".to_string()
                } else {
                    format!("  ✓ update: {}", detail)
                }
            }
            RunEvent::RestartIssued { service } => format!("  ✓ restart {}", service),
            RunEvent::HealthProbe {
                attempt,
                max_attempts,
                healthy,
            } => {
                let icon = if healthy { "✓" } else { "…" };
                format!("  {} health check {}/{}", icon, attempt, max_attempts)
            }
            RunEvent::ReleaseFinished { .. } => return,
        };
        self.line(text);
    }
}

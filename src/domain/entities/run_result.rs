//! Run result entity
//!
//! Created when a sync run starts, one outcome recorded per attempted rule,
//! finalized exactly once (completed, aborted or cancelled).

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use super::SyncRule;
use crate::domain::value_objects::Direction;

/// Per-rule status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    Ok,
    /// Required rule failed; the run was aborted after it
    Failed,
    /// Optional rule failed; the run continued
    Skipped,
    /// Dry run: the rule would have been transferred
    Planned,
}

impl RuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleStatus::Ok => "ok",
            RuleStatus::Failed => "failed",
            RuleStatus::Skipped => "skipped",
            RuleStatus::Planned => "planned",
        }
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    Running,
    Completed,
    CompletedWithSkips,
    Aborted,
    Cancelled,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::CompletedWithSkips => "completed-with-skips",
            RunStatus::Aborted => "aborted",
            RunStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::CompletedWithSkips)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    pub rule: SyncRule,
    pub status: RuleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RuleOutcome {
    pub fn ok(rule: SyncRule) -> Self {
        Self {
            rule,
            status: RuleStatus::Ok,
            error: None,
        }
    }

    pub fn failed(rule: SyncRule, error: impl Into<String>) -> Self {
        Self {
            rule,
            status: RuleStatus::Failed,
            error: Some(error.into()),
        }
    }

    pub fn skipped(rule: SyncRule, error: impl Into<String>) -> Self {
        Self {
            rule,
            status: RuleStatus::Skipped,
            error: Some(error.into()),
        }
    }

    pub fn planned(rule: SyncRule) -> Self {
        Self {
            rule,
            status: RuleStatus::Planned,
            error: None,
        }
    }
}

/// Result of one sync engine invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub direction: Direction,
    pub target: String,
    pub outcomes: Vec<RuleOutcome>,
    status: RunStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunResult {
    pub fn start(direction: Direction, target: impl Into<String>) -> Self {
        Self {
            direction,
            target: target.into(),
            outcomes: Vec::new(),
            status: RunStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record(&mut self, outcome: RuleOutcome) {
        self.outcomes.push(outcome);
    }

    /// Finalize after every rule was processed.
    pub fn complete(&mut self) {
        let status = if self.count(RuleStatus::Skipped) > 0 {
            RunStatus::CompletedWithSkips
        } else {
            RunStatus::Completed
        };
        self.finalize(status);
    }

    /// Finalize after a required rule failed.
    pub fn abort(&mut self) {
        self.finalize(RunStatus::Aborted);
    }

    /// Finalize after cancellation between rules.
    pub fn cancel(&mut self) {
        self.finalize(RunStatus::Cancelled);
    }

    fn finalize(&mut self, status: RunStatus) {
        if self.status == RunStatus::Running {
            self.status = status;
            self.finished_at = Some(Utc::now());
        }
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn count(&self, status: RuleStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// The required rule that aborted the run, if any
    pub fn failed_rule(&self) -> Option<&RuleOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.status == RuleStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> SyncRule {
        SyncRule::new(name, format!("/w/{}", name), format!("/r/{}", name))
    }

    #[test]
    fn new_run_is_running() {
        let run = RunResult::start(Direction::Push, "host");
        assert_eq!(run.status(), RunStatus::Running);
        assert!(run.finished_at.is_none());
        assert!(!run.is_success());
    }

    #[test]
    fn complete_without_skips() {
        let mut run = RunResult::start(Direction::Push, "host");
        run.record(RuleOutcome::ok(rule("a")));
        run.complete();
        assert_eq!(run.status(), RunStatus::Completed);
        assert!(run.is_success());
        assert!(run.finished_at.is_some());
    }

    #[test]
    fn complete_with_skips() {
        let mut run = RunResult::start(Direction::Push, "host");
        run.record(RuleOutcome::skipped(rule("a"), "boom"));
        run.complete();
        assert_eq!(run.status(), RunStatus::CompletedWithSkips);
        assert!(run.is_success());
    }

    #[test]
    fn finalize_happens_once() {
        let mut run = RunResult::start(Direction::Push, "host");
        run.record(RuleOutcome::failed(rule("a"), "boom"));
        run.abort();
        run.complete();
        assert_eq!(run.status(), RunStatus::Aborted);
        assert_eq!(run.failed_rule().map(|o| o.rule.local.as_str()), Some("a"));
    }

    #[test]
    fn status_strings() {
        assert_eq!(
            RunStatus::CompletedWithSkips.to_string(),
            "completed-with-skips"
        );
        assert_eq!(RuleStatus::Skipped.to_string(), "skipped");
    }

    #[test]
    fn serializes_status_in_kebab_case() {
        let mut run = RunResult::start(Direction::Pull, "host");
        run.cancel();
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["status"], "cancelled");
        assert_eq!(json["direction"], "pull");
    }
}

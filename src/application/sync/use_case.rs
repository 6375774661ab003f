//! Sync Engine
//!
//! Executes the rules of a manifest for one direction, in manifest order:
//! 1. Skip rules for the other direction
//! 2. Copy each rule exactly once through the transport
//! 3. Optional failures are recorded as skipped, required failures abort
//!
//! Nothing is ever deleted on either side.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::entities::{Manifest, RuleOutcome, RuleStatus, RunResult, SyncRule};
use crate::domain::ports::{CopyRequest, NoopEventSink, RunEvent, RunEventSink, Transport};
use crate::domain::value_objects::{Direction, RemoteTarget};

use super::options::SyncOptions;

/// Sync engine, parameterized by its transport
pub struct SyncEngine<T: Transport> {
    transport: T,
    options: SyncOptions,
}

impl<T: Transport> SyncEngine<T> {
    pub fn new(transport: T, options: SyncOptions) -> Self {
        Self { transport, options }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Run every `direction` rule of `manifest` against `target`.
    pub fn run(&self, manifest: &Manifest, target: &RemoteTarget, direction: Direction) -> RunResult {
        let never = AtomicBool::new(false);
        self.run_with_events(manifest, target, direction, &NoopEventSink, &never)
    }

    /// Run with progress events and a cancellation flag.
    ///
    /// `cancel` is checked before each rule; a rule in flight always runs
    /// to completion (or to its timeout).
    pub fn run_with_events(
        &self,
        manifest: &Manifest,
        target: &RemoteTarget,
        direction: Direction,
        sink: &dyn RunEventSink,
        cancel: &AtomicBool,
    ) -> RunResult {
        let mut result = RunResult::start(direction, target.to_string());

        sink.on_event(RunEvent::SyncStarted {
            direction,
            target: target.to_string(),
            rule_count: manifest.count_for(direction),
            dry_run: self.options.dry_run,
        });

        for rule in manifest.rules_for(direction) {
            if cancel.load(Ordering::SeqCst) {
                tracing::warn!(completed = result.outcomes.len(), "run cancelled");
                result.cancel();
                break;
            }

            if self.options.dry_run {
                result.record(RuleOutcome::planned(rule.clone()));
                sink.on_event(RunEvent::RulePlanned { rule: rule.clone() });
                continue;
            }

            if !self.sync_rule(rule, target, &mut result, sink) {
                result.abort();
                break;
            }
        }

        // No-op when already aborted or cancelled
        result.complete();

        sink.on_event(RunEvent::SyncFinished {
            status: result.status(),
            ok: result.count(RuleStatus::Ok),
            skipped: result.count(RuleStatus::Skipped),
            failed: result.count(RuleStatus::Failed),
            planned: result.count(RuleStatus::Planned),
        });
        result
    }

    /// Copy one rule. Returns false when the run must abort.
    fn sync_rule(
        &self,
        rule: &SyncRule,
        target: &RemoteTarget,
        result: &mut RunResult,
        sink: &dyn RunEventSink,
    ) -> bool {
        sink.on_event(RunEvent::RuleStarted { rule: rule.clone() });
        tracing::debug!(rule = rule.index + 1, label = %rule.label(), "syncing rule");

        let request = CopyRequest::for_rule(rule, self.options.timeout);
        match self.transport.copy(target, &request) {
            Ok(()) => {
                tracing::debug!(rule = rule.index + 1, "rule ok");
                result.record(RuleOutcome::ok(rule.clone()));
                sink.on_event(RunEvent::RuleSucceeded { rule: rule.clone() });
                true
            }
            Err(e) if rule.optional => {
                tracing::warn!(
                    rule = rule.index + 1,
                    label = %rule.label(),
                    error = %e,
                    "optional rule failed, skipping"
                );
                result.record(RuleOutcome::skipped(rule.clone(), e.to_string()));
                sink.on_event(RunEvent::RuleSkipped {
                    rule: rule.clone(),
                    error: e.to_string(),
                });
                true
            }
            Err(e) => {
                tracing::error!(
                    rule = rule.index + 1,
                    label = %rule.label(),
                    error = %e,
                    "required rule failed, aborting"
                );
                result.record(RuleOutcome::failed(rule.clone(), e.to_string()));
                sink.on_event(RunEvent::RuleFailed {
                    rule: rule.clone(),
                    error: e.to_string(),
                });
                false
            }
        }
    }
}

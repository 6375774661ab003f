//! Output Rendering
//!
//! Final summaries for sync runs, releases and manifest checks, as text or
//! as a single JSON object.

use crate::application::HealthStatus;
use crate::domain::entities::{Manifest, RuleStatus, RunResult, RunStatus};
use crate::domain::value_objects::Direction;
use crate::error::DeployError;

/// Output format for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Icons for output rendering
struct Icons {
    check: &'static str,
    cross: &'static str,
    planned: &'static str,
    skip: &'static str,
}

const ICONS: Icons = Icons {
    check: "✓",
    cross: "✗",
    planned: "→",
    skip: "○",
};

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

/// Text summary of a sync run
pub fn render_sync_text(result: &RunResult) -> String {
    let verb = capitalize(result.direction.as_str());
    let ok = result.count(RuleStatus::Ok);
    let skipped = result.count(RuleStatus::Skipped);
    let planned = result.count(RuleStatus::Planned);

    let mut out = match result.status() {
        RunStatus::Completed if planned > 0 => format!(
            "{} Dry run: {} would be transferred\n",
            ICONS.planned,
            plural(planned, "rule", "rules")
        ),
        RunStatus::Completed | RunStatus::Running => {
            format!("{} {} complete: {} ok\n", ICONS.check, verb, ok)
        }
        RunStatus::CompletedWithSkips => format!(
            "{} {} complete: {} ok, {} skipped\n",
            ICONS.check, verb, ok, skipped
        ),
        RunStatus::Aborted => {
            let mut line = format!("{} {} aborted", ICONS.cross, verb);
            if let Some(failed) = result.failed_rule() {
                line.push_str(&format!(
                    " at rule {} ({}): {}",
                    failed.rule.index + 1,
                    failed.rule.label(),
                    failed.error.as_deref().unwrap_or("unknown error")
                ));
            }
            line.push('\n');
            line.push_str(&format!("  {} ok, {} skipped, 1 failed\n", ok, skipped));
            line
        }
        RunStatus::Cancelled => format!(
            "{} {} cancelled after {}\n",
            ICONS.skip,
            verb,
            plural(result.outcomes.len(), "rule", "rules")
        ),
    };

    if result.status() == RunStatus::CompletedWithSkips {
        for outcome in result
            .outcomes
            .iter()
            .filter(|o| o.status == RuleStatus::Skipped)
        {
            out.push_str(&format!(
                "  {} {}: {}\n",
                ICONS.skip,
                outcome.rule.label(),
                outcome.error.as_deref().unwrap_or("")
            ));
        }
    }
    out
}

/// JSON summary of a sync run
pub fn render_sync_json(result: &RunResult) -> serde_json::Value {
    serde_json::json!({
        "event": "summary",
        "command": result.direction.as_str(),
        "status": result.status().as_str(),
        "success": result.is_success(),
        "result": result,
    })
}

pub fn print_sync_summary(result: &RunResult, format: OutputFormat) {
    match format {
        OutputFormat::Text => print!("{}", render_sync_text(result)),
        OutputFormat::Json => println!("{}", render_sync_json(result)),
    }
}

/// Text summary of a release
pub fn render_release_text(result: &Result<HealthStatus, DeployError>) -> String {
    match result {
        Ok(status) => format!(
            "{} {} is healthy ({})\n",
            ICONS.check,
            status.service,
            plural(status.attempts as usize, "health check", "health checks")
        ),
        Err(e) => format!("{} Deploy failed: {}\n", ICONS.cross, e),
    }
}

/// JSON summary of a release
pub fn render_release_json(result: &Result<HealthStatus, DeployError>) -> serde_json::Value {
    match result {
        Ok(status) => serde_json::json!({
            "event": "summary",
            "command": "deploy",
            "status": "healthy",
            "success": true,
            "service": status.service,
            "attempts": status.attempts,
        }),
        Err(e) => serde_json::json!({
            "event": "summary",
            "command": "deploy",
            "status": "failed",
            "success": false,
            "kind": e.kind(),
            "error": e.to_string(),
        }),
    }
}

pub fn print_release_summary(result: &Result<HealthStatus, DeployError>, format: OutputFormat) {
    match format {
        OutputFormat::Text => print!("{}", render_release_text(result)),
        OutputFormat::Json => println!("{}", render_release_json(result)),
    }
}

/// Text listing of a validated manifest
pub fn render_manifest_text(manifest: &Manifest) -> String {
    let source = manifest
        .source()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "manifest".to_string());
    let push = manifest.count_for(Direction::Push);
    let pull = manifest.count_for(Direction::Pull);

    let mut out = format!(
        "{} {}: {} ({} push, {} pull)\n",
        ICONS.check,
        source,
        plural(manifest.len(), "rule", "rules"),
        push,
        pull
    );
    for rule in manifest.rules() {
        let mut tags = Vec::new();
        if rule.kind.is_directory() {
            tags.push("directory".to_string());
        }
        if rule.optional {
            tags.push("optional".to_string());
        }
        if !rule.filters.include.is_empty() {
            tags.push(format!("include: {}", rule.filters.include.join(", ")));
        }
        if !rule.filters.exclude.is_empty() {
            tags.push(format!("exclude: {}", rule.filters.exclude.join(", ")));
        }
        let tags = if tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", tags.join("; "))
        };
        out.push_str(&format!(
            "  {}. {} {}{}\n",
            rule.index + 1,
            rule.direction,
            rule.label(),
            tags
        ));
    }
    out
}

pub fn render_manifest_json(manifest: &Manifest) -> serde_json::Value {
    serde_json::json!({
        "event": "check",
        "valid": true,
        "manifest": manifest.source().map(|p| p.display().to_string()),
        "rules": manifest.rules(),
    })
}

pub fn print_manifest(manifest: &Manifest, format: OutputFormat) {
    match format {
        OutputFormat::Text => print!("{}", render_manifest_text(manifest)),
        OutputFormat::Json => println!("{}", render_manifest_json(manifest)),
    }
}

/// JSON object for an error that stopped a command before it ran
pub fn render_error_json(kind: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "event": "error",
        "kind": kind,
        "success": false,
        "error": message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{RuleOutcome, SyncRule};
    use crate::domain::value_objects::{EntryKind, PathFilters};

    fn rule(index: usize, name: &str) -> SyncRule {
        SyncRule::new(name, format!("/w/{}", name), format!("/opt/app/{}", name)).with_index(index)
    }

    #[test]
    fn aborted_summary_names_failing_rule() {
        let mut result = RunResult::start(Direction::Push, "deploy@h");
        result.record(RuleOutcome::failed(
            rule(0, "a.json"),
            "path not found: /w/a.json",
        ));
        result.abort();

        insta::assert_snapshot!(render_sync_text(&result), @r"
        ✗ Push aborted at rule 1 (a.json → /opt/app/a.json): path not found: /w/a.json
          0 ok, 0 skipped, 1 failed
        ");
    }

    #[test]
    fn skipped_rules_are_listed() {
        let mut result = RunResult::start(Direction::Pull, "h");
        result.record(RuleOutcome::ok(rule(0, "a.json").with_direction(Direction::Pull)));
        result.record(RuleOutcome::skipped(
            rule(1, "b.json").with_direction(Direction::Pull).with_optional(true),
            "path not found: /opt/app/b.json",
        ));
        result.complete();

        insta::assert_snapshot!(render_sync_text(&result), @r"
        ✓ Pull complete: 1 ok, 1 skipped
          ○ b.json ← /opt/app/b.json: path not found: /opt/app/b.json
        ");
    }

    #[test]
    fn dry_run_summary() {
        let mut result = RunResult::start(Direction::Push, "h");
        result.record(RuleOutcome::planned(rule(0, "a.json")));
        result.record(RuleOutcome::planned(rule(1, "b.json")));
        result.complete();

        assert_eq!(
            render_sync_text(&result),
            "→ Dry run: 2 rules would be transferred\n"
        );
    }

    #[test]
    fn sync_json_carries_outcomes() {
        let mut result = RunResult::start(Direction::Push, "h");
        result.record(RuleOutcome::ok(rule(0, "a.json")));
        result.complete();

        let json = render_sync_json(&result);
        assert_eq!(json["status"], "completed");
        assert_eq!(json["success"], true);
        assert_eq!(json["result"]["outcomes"][0]["status"], "ok");
        assert_eq!(json["result"]["outcomes"][0]["rule"]["remote_path"], "/opt/app/a.json");
    }

    #[test]
    fn release_summaries() {
        let ok: Result<HealthStatus, DeployError> = Ok(HealthStatus {
            service: "bot".to_string(),
            attempts: 2,
        });
        assert_eq!(render_release_text(&ok), "✓ bot is healthy (2 health checks)\n");

        let err: Result<HealthStatus, DeployError> = Err(DeployError::UpdateFailed {
            detail: "exit status 1: fatal: Not possible to fast-forward".to_string(),
        });
        let json = render_release_json(&err);
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "update_failed");
    }

    #[test]
    fn manifest_listing() {
        let manifest = Manifest::new(vec![
            rule(0, "a.json"),
            rule(1, "sessions")
                .with_kind(EntryKind::Directory)
                .with_optional(true)
                .with_filters(PathFilters::new(vec![], vec!["*.session-journal".to_string()])),
            rule(2, "state.json").with_direction(Direction::Pull),
        ])
        .with_source("/w/courier.manifest.toml");

        insta::assert_snapshot!(render_manifest_text(&manifest), @r"
        ✓ /w/courier.manifest.toml: 3 rules (2 push, 1 pull)
          1. push a.json → /opt/app/a.json
          2. push sessions → /opt/app/sessions [directory; optional; exclude: *.session-journal]
          3. pull state.json ← /opt/app/state.json
        ");
    }
}

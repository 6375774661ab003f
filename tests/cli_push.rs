//! `courier push` against a fake ssh/scp pair.

#![cfg(unix)]

mod common;

use std::fs;

use common::TestEnv;

#[test]
fn test_push_aborts_at_first_missing_required_file() {
    let env = TestEnv::new();
    env.write_local("b.json", r#"{"b":1}"#);
    env.write_manifest(&format!(
        r#"
[[rule]]
local = "a.json"
remote = "{a}"

[[rule]]
local = "b.json"
remote = "{b}"
"#,
        a = env.remote("app/a.json"),
        b = env.remote("app/b.json"),
    ));

    let result = env.run(&["push"]);

    assert_eq!(result.exit_code, 1, "{}", result.combined_output());
    assert!(
        result.stdout.contains("Push aborted at rule 1"),
        "{}",
        result.stdout
    );
    assert!(result.stdout.contains("path not found"));
    assert!(!env.remote_path("app/b.json").exists());
    assert!(!env.tool_log().contains("b.json"));
}

#[test]
fn test_push_copies_files_and_filtered_directories() {
    let env = TestEnv::new();
    env.write_local("config.json", r#"{"token":"x"}"#);
    env.write_local("sessions/bot.session", "session");
    env.write_local("sessions/bot.session-journal", "journal");
    env.write_manifest(&format!(
        r#"
[[rule]]
local = "config.json"
remote = "{config}"

[[rule]]
local = "sessions"
remote = "{sessions}"
kind = "directory"
exclude = ["*.session-journal"]
"#,
        config = env.remote("app/config.json"),
        sessions = env.remote("app/sessions"),
    ));

    let result = env.run(&["push"]);

    assert!(result.success, "{}", result.combined_output());
    assert!(result.stdout.contains("Push complete: 2 ok"), "{}", result.stdout);
    assert_eq!(
        fs::read_to_string(env.remote_path("app/config.json")).unwrap(),
        r#"{"token":"x"}"#
    );
    assert!(env.remote_path("app/sessions/bot.session").is_file());
    assert!(!env.remote_path("app/sessions/bot.session-journal").exists());
}

#[test]
fn test_push_twice_leaves_same_remote_state() {
    let env = TestEnv::new();
    env.write_local("a.json", "one");
    env.write_manifest(&format!(
        "[[rule]]\nlocal = \"a.json\"\nremote = \"{}\"\n",
        env.remote("app/a.json")
    ));

    let first = env.run(&["push"]);
    let second = env.run(&["push"]);

    assert!(first.success, "{}", first.combined_output());
    assert!(second.success, "{}", second.combined_output());
    assert_eq!(
        fs::read_to_string(env.remote_path("app/a.json")).unwrap(),
        "one"
    );
}

#[test]
fn test_push_skips_missing_optional_rule() {
    let env = TestEnv::new();
    env.write_local("a.json", "a");
    env.write_manifest(&format!(
        r#"
[[rule]]
local = "secrets.env"
remote = "{secrets}"
optional = true

[[rule]]
local = "a.json"
remote = "{a}"
"#,
        secrets = env.remote("app/secrets.env"),
        a = env.remote("app/a.json"),
    ));

    let result = env.run(&["push"]);

    assert!(result.success, "{}", result.combined_output());
    assert!(
        result.stdout.contains("Push complete: 1 ok, 1 skipped"),
        "{}",
        result.stdout
    );
    assert!(env.remote_path("app/a.json").is_file());
}

#[test]
fn test_push_dry_run_runs_no_tools() {
    let env = TestEnv::new();
    env.write_local("a.json", "a");
    env.write_manifest(&format!(
        "[[rule]]\nlocal = \"a.json\"\nremote = \"{}\"\n",
        env.remote("app/a.json")
    ));

    let result = env.run(&["push", "--dry-run"]);

    assert!(result.success, "{}", result.combined_output());
    assert!(
        result.stdout.contains("Dry run: 1 rule would be transferred"),
        "{}",
        result.stdout
    );
    assert!(!env.remote_path("app/a.json").exists());
    assert_eq!(env.tool_log(), "");
}

#[test]
fn test_push_json_emits_event_stream_and_summary() {
    let env = TestEnv::new();
    env.write_local("a.json", "a");
    env.write_manifest(&format!(
        "[[rule]]\nlocal = \"a.json\"\nremote = \"{}\"\n",
        env.remote("app/a.json")
    ));

    let result = env.run(&["push", "--json"]);

    assert!(result.success, "{}", result.combined_output());
    let events: Vec<serde_json::Value> = result
        .stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(events.first().unwrap()["event"], "start");
    assert!(events.iter().any(|e| e["event"] == "rule_ok"));
    let summary = events.last().unwrap();
    assert_eq!(summary["event"], "summary");
    assert_eq!(summary["status"], "completed");
}

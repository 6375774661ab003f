//! Test environment builder for isolated courier runs.
//!
//! Provides `TestEnv` - a temp directory holding a working directory, a
//! HOME, a "remote" filesystem and a `bin/` of fake tools. The fake `ssh`
//! runs the remote command locally with `sh -c`; the fake `scp` strips the
//! `host:` prefix and copies with `cp`. Every fake tool appends its
//! arguments to `tools.log`.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

pub const HOST: &str = "fakehost";

const FAKE_SSH: &str = r#"#!/bin/sh
echo "ssh $*" >> "__LOG__"
while [ "$#" -gt 0 ] && [ "$1" != "--" ]; do shift; done
shift
exec sh -c "$*"
"#;

const FAKE_SCP: &str = r#"#!/bin/sh
[ "$#" -eq 0 ] && exit 0
echo "scp $*" >> "__LOG__"
recursive=
while [ "$#" -gt 0 ]; do
  case "$1" in
    -r) recursive=-R; shift ;;
    -p|-q) shift ;;
    -o|-P|-i) shift 2 ;;
    *) break ;;
  esac
done
n=$#
for a in "$@"; do
  case "$a" in __HOST__:*) a="${a#__HOST__:}" ;; esac
  set -- "$@" "$a"
done
shift "$n"
exec cp -p $recursive "$@"
"#;

/// Result of running the courier binary
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated environment with fake ssh tooling
pub struct TestEnv {
    pub root: TempDir,
    courier_bin: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        for dir in ["work", "home", "remote", "bin"] {
            fs::create_dir_all(root.path().join(dir)).unwrap();
        }

        let env = Self {
            root,
            courier_bin: PathBuf::from(env!("CARGO_BIN_EXE_courier")),
        };
        env.install_tool("ssh", FAKE_SSH);
        env.install_tool("scp", FAKE_SCP);
        env.write_config("");
        env
    }

    pub fn work_path(&self, relative: &str) -> PathBuf {
        self.root.path().join("work").join(relative)
    }

    pub fn remote_path(&self, relative: &str) -> PathBuf {
        self.root.path().join("remote").join(relative)
    }

    /// Absolute remote path as written into a manifest
    pub fn remote(&self, relative: &str) -> String {
        self.remote_path(relative).display().to_string()
    }

    fn bin_dir(&self) -> PathBuf {
        self.root.path().join("bin")
    }

    fn log_path(&self) -> PathBuf {
        self.root.path().join("tools.log")
    }

    /// Write an executable script into `bin/`, which is first on PATH.
    pub fn install_tool(&self, name: &str, script: &str) {
        let path = self.bin_dir().join(name);
        let script = script
            .replace("__LOG__", &self.log_path().display().to_string())
            .replace("__HOST__", HOST);
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Write `courier.toml` with the fake tools wired in, plus `extra`.
    pub fn write_config(&self, extra: &str) {
        let config = format!(
            r#"[target]
host = "{host}"

[transport]
method = "scp"
timeout_secs = 20
ssh_program = "{ssh}"
scp_program = "{scp}"

{extra}
"#,
            host = HOST,
            ssh = self.bin_dir().join("ssh").display(),
            scp = self.bin_dir().join("scp").display(),
            extra = extra,
        );
        fs::write(self.work_path("courier.toml"), config).unwrap();
    }

    pub fn write_manifest(&self, content: &str) {
        fs::write(self.work_path("courier.manifest.toml"), content).unwrap();
    }

    pub fn write_local(&self, relative: &str, content: &str) {
        write_file(&self.work_path(relative), content);
    }

    pub fn write_remote(&self, relative: &str, content: &str) {
        write_file(&self.remote_path(relative), content);
    }

    /// Everything the fake tools were invoked with
    pub fn tool_log(&self) -> String {
        fs::read_to_string(self.log_path()).unwrap_or_default()
    }

    /// Run courier from the working directory
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let path = format!(
            "{}:{}",
            self.bin_dir().display(),
            std::env::var("PATH").unwrap_or_default()
        );

        let mut cmd = Command::new(&self.courier_bin);
        cmd.current_dir(self.work_path(""))
            .args(args)
            .env("HOME", self.root.path().join("home"))
            .env("PATH", path)
            .env_remove("RUST_LOG");
        for key in [
            "COURIER_HOST",
            "COURIER_USER",
            "COURIER_PORT",
            "COURIER_SERVICE",
            "COURIER_TIMEOUT_SECS",
            "COURIER_TRANSFER_METHOD",
        ] {
            cmd.env_remove(key);
        }
        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        output_to_result(cmd.output().expect("failed to execute courier"))
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

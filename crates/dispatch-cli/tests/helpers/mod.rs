#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// Runs the `dispatch` binary against a throwaway database.
pub struct CliTestHarness {
    temp_dir: TempDir,
    db_path: PathBuf,
}

impl CliTestHarness {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");

        Self { temp_dir, db_path }
    }

    /// A command with the database redirected and write pacing disabled.
    /// Runs inside the temp dir so no stray `dispatch.toml` is picked up.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("dispatch").expect("Failed to find dispatch binary");
        cmd.current_dir(self.temp_dir.path())
            .env("DISPATCH_DATABASE_PATH", &self.db_path)
            .env("DISPATCH_SERIES__PACING_MS", "0")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Stdout of a successful run, colour codes stripped.
    pub fn stdout_of(&self, args: &[&str]) -> String {
        let output = self.run_success(args).get_output().stdout.clone();
        strip_ansi(&String::from_utf8_lossy(&output))
    }

    /// Runs an `add` and returns the short ID it printed.
    pub fn add(&self, args: &[&str]) -> String {
        let mut argv = vec!["add"];
        argv.extend_from_slice(args);
        let stdout = self.stdout_of(&argv);
        extract_id(&stdout).unwrap_or_else(|| panic!("no ID in output:\n{stdout}"))
    }
}

pub fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// The first eight-digit ID following "ID: ".
pub fn extract_id(stdout: &str) -> Option<String> {
    let start = stdout.find("ID: ")? + "ID: ".len();
    let id: String = stdout[start..].chars().take(8).collect();
    (id.len() == 8 && id.chars().all(|c| c.is_ascii_hexdigit())).then_some(id)
}

pub struct TestFixtures;

impl TestFixtures {
    /// A weekly airport run with three trips after the first.
    pub fn weekly_series_args() -> Vec<&'static str> {
        vec![
            "BA117",
            "--customer", "Acme Corp",
            "--at", "2030-03-04 07:00",
            "--pickup", "JFK Terminal 7",
            "--dropoff", "Midtown",
            "--passengers", "2",
            "--every", "weekly",
            "--until", "2030-03-25",
        ]
    }

    pub fn one_off_args() -> Vec<&'static str> {
        vec![
            "EK201",
            "--customer", "Globex",
            "--at", "2030-05-01 06:30",
            "--pickup", "Newark",
            "--dropoff", "Hoboken",
        ]
    }
}

pub mod assertions {
    use predicates::prelude::*;

    pub fn has_trip_table_headers() -> impl Predicate<str> {
        predicate::str::contains("ID")
            .and(predicate::str::contains("Job"))
            .and(predicate::str::contains("Status"))
    }

    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }
}

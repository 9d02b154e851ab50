// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Integration tests driving the `guardcheck` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn guardcheck_binary() -> PathBuf {
    // cargo test builds into target/debug or target/release
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("guardcheck");
    path
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run(args: &[&str]) -> Output {
    Command::new(guardcheck_binary())
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("FORCE_COLOR")
        .env_remove("GUARDCHECK_LOG")
        .output()
        .expect("failed to run guardcheck")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).to_string()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).to_string()
}

#[test]
fn clean_file_succeeds() {
    let path = fixture("clean/Account.java");
    let out = run(&["check", path.to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("No lock discipline issues found"));
}

#[test]
fn unguarded_access_fails_with_snippet() {
    let path = fixture("racy/Counter.java");
    let out = run(&["check", path.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));

    let err = stderr(&out);
    assert!(err.contains("error[guarded-by/unguarded-access]: access to `count` requires holding `this`"));
    assert!(err.contains("Counter.java:13:16"), "{}", err);
    assert!(err.contains("warning[guarded-by/invalid]: invalid @GuardedBy expression: `cnt`"));
    assert!(err.contains("help: did you mean `count`?"));
    assert!(err.contains("1 error(s), 1 warning(s)"));
}

#[test]
fn directories_are_checked_recursively_as_json() {
    let out = run(&["check", fixture("").to_str().unwrap(), "--format", "json"]);
    assert_eq!(out.status.code(), Some(1));

    let value: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    let reports = value.as_array().unwrap();
    assert_eq!(reports.len(), 3);
    let files: Vec<&str> = reports.iter().map(|r| r["file"].as_str().unwrap()).collect();
    assert!(files[0].ends_with("Broken.java"));
    assert!(files[1].ends_with("Account.java"));
    assert!(files[2].ends_with("Counter.java"));
    assert_eq!(reports[0]["diagnostics"][0]["code"], "E0100");
    assert_eq!(reports[1]["success"], true);
    assert_eq!(reports[2]["error_count"], 1);
}

#[test]
fn rule_flags_and_config_files_select_rules() {
    let dir = tempfile::tempdir().unwrap();
    let source = std::fs::read_to_string(fixture("racy/Counter.java")).unwrap();
    std::fs::write(dir.path().join("Counter.java"), source).unwrap();

    let target = dir.path().to_str().unwrap();
    let out = run(&["check", target, "--exclude", "guarded-by/unguarded-access"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("0 error(s), 1 warning(s)"));

    std::fs::write(
        dir.path().join("guardcheck.json"),
        r#"{ "rules": ["guarded-by/invalid"], "unresolved_as_error": true }"#,
    )
    .unwrap();
    let out = run(&["check", target]);
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("error[guarded-by/invalid]"));
    assert!(!err.contains("unguarded-access"));
}

#[test]
fn bad_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.json");
    std::fs::write(&config, "{ not json").unwrap();
    let path = fixture("clean/Account.java");
    let out = run(&["check", path.to_str().unwrap(), "--config", config.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("error: invalid config"));
}

#[test]
fn locks_prints_every_guarded_access() {
    let path = fixture("racy/Counter.java");
    let out = run(&["locks", path.to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("Counter.increment()"));
    assert!(text.contains("✓ 9:9 count requires this, held {this}"));
    assert!(text.contains("✗ 13:16 count requires this, held {}"));
    assert!(text.contains("2 guarded accesses, 1 without their lock"));
}

#[test]
fn parse_reports_syntax_errors() {
    let ok = run(&["parse", fixture("clean/Account.java").to_str().unwrap()]);
    assert!(ok.status.success());
    assert!(stdout(&ok).contains("package bank"));
    assert!(stdout(&ok).contains("Parse: 1 types OK"));

    let bad = run(&["parse", fixture("Broken.java").to_str().unwrap()]);
    assert_eq!(bad.status.code(), Some(1));
    assert!(stderr(&bad).contains("error[E0100]"));
}

#[test]
fn usage_errors_exit_nonzero() {
    assert_eq!(run(&["frobnicate"]).status.code(), Some(1));
    assert_eq!(run(&["check"]).status.code(), Some(1));
    assert_eq!(run(&["explain", "E4242"]).status.code(), Some(1));

    let explain = run(&["explain", "guarded-by/invalid"]);
    assert!(explain.status.success());
    assert!(stdout(&explain).contains("Category: Locking"));

    let version = run(&["version"]);
    assert!(stdout(&version).starts_with("guardcheck "));
    assert!(stdout(&run(&["help"])).contains("guarded-by/unguarded-access"));
}

//! vkg-publish Binary Tests
//!
//! Exit codes and what reaches the terminal, with a stand-in package tool.

#![cfg(unix)]

use std::path::PathBuf;
use std::process::{Command, Output};

fn recipe_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("recipe.json")
}

/// Run with a clean environment plus `vars`.
fn publish(vars: &[(&str, &str)], extra_args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vkg-publish"));
    cmd.env_clear()
        .arg("--recipe")
        .arg(recipe_path())
        .args(extra_args);
    if let Some(path) = std::env::var_os("PATH") {
        cmd.env("PATH", path);
    }
    for (key, value) in vars {
        cmd.env(key, value);
    }
    cmd.output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn tool_failure_exits_non_zero_with_error_text() {
    let output = publish(
        &[("CONAN_BIN", "false"), ("CONAN_SKIP_CHECK_CREDENTIALS", "1")],
        &[],
    );

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("exited with"), "{err}");
    assert!(err.contains("false export"), "{err}");
}

#[test]
fn build_failure_exits_non_zero_with_error_text() {
    let output = publish(&[("CONAN_BIN", "false"), ("CONAN_NEED_BUILD", "1")], &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("false create"), "{}", stderr(&output));
}

#[test]
fn missing_tool_reports_spawn_failure() {
    let output = publish(
        &[("CONAN_BIN", "/nonexistent/conan"), ("CONAN_NEED_BUILD", "1")],
        &[],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to run /nonexistent/conan"));
}

#[test]
fn export_without_upload_remote_succeeds() {
    let output = publish(&[("CONAN_BIN", "true"), ("CONAN_USERNAME", "wumo")], &[]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        "Exported vkg/0.0.9@wumo/testing; upload skipped: no upload remote available"
    );
}

#[test]
fn untagged_commit_is_a_successful_no_op() {
    let output = publish(
        &[("CONAN_BIN", "false"), ("CONAN_UPLOAD_ONLY_WHEN_TAG", "1")],
        &[],
    );

    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "Nothing to do: commit is not tagged");
}

#[test]
fn dry_run_invokes_nothing() {
    let output = publish(
        &[("CONAN_BIN", "false"), ("CONAN_USERNAME", "wumo"), ("CONAN_CHANNEL", "stable")],
        &["--dry-run"],
    );
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "publish vkg/0.0.9@wumo/stable");

    let output = publish(&[("CONAN_BIN", "false"), ("CONAN_NEED_BUILD", "1")], &["--dry-run"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "build vkg/0.0.9@ (1 configurations)");
}

#[test]
fn missing_recipe_fails() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vkg-publish"));
    let output = cmd
        .env_clear()
        .args(["--recipe", "/nonexistent/recipe.json", "--dry-run"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to read recipe"));
}

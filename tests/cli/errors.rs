//! Tests for error handling and CLI flags.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    let t = Test::new();

    t.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("show").and(predicate::str::contains("recipients")));
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();

    t.cmd().arg("unknown-command").assert().failure();
}

#[test]
fn test_verbose_flag_accepted() {
    let t = Test::new();

    t.cmd().args(["--verbose", "ls"]).assert().success();
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    t.cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pwdstore"));
}

#[test]
fn test_completions_bash_outputs_script() {
    let t = Test::new();

    t.cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_pwdstore"));
}

#[test]
fn test_missing_store_has_hint() {
    let t = Test::new();
    let missing = t.home.path().join("nowhere");

    t.cmd()
        .env("PWDSTORE_DIR", &missing)
        .arg("ls")
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("password store not found")
                .and(predicate::str::contains("PWDSTORE_DIR")),
        );
}

#[test]
fn test_store_flag_overrides_env() {
    let t = Test::new();
    t.write_entry("only-here", b"x");
    let other = Test::new();

    other
        .cmd()
        .arg("--store")
        .arg(t.store_path())
        .arg("ls")
        .assert()
        .success()
        .stdout(predicate::str::contains("only-here"));
}

#[test]
fn test_broken_config_reported() {
    let t = Test::new();
    t.write_config("[preferences\nbroken");

    let output = t.ls(&[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid config file");
}

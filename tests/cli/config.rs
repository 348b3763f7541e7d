//! Tests for `pwdstore config`.

use crate::support::*;

#[test]
fn test_defaults() {
    let t = Test::new();

    let output = t.config(&["get", "auto_dismiss_secs"]);
    assert_success(&output);
    assert_eq!(stdout(&output).trim(), "45");

    let output = t.config(&["get", "passphrase_cache"]);
    assert_success(&output);
    assert_eq!(stdout(&output).trim(), "true");
}

#[test]
fn test_set_then_get() {
    let t = Test::new();

    assert_pref_roundtrip(&t, "auto_dismiss_secs", "0", "0");
    assert_pref_roundtrip(&t, "copy_on_decrypt", "yes", "true");

    let saved = std::fs::read_to_string(t.config_path()).unwrap();
    assert!(saved.contains("auto_dismiss_secs = 0"));
}

#[test]
fn test_invalid_values_rejected() {
    let t = Test::new();

    let output = t.config(&["set", "auto_dismiss_secs", "-5"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid value for auto_dismiss_secs");

    let output = t.config(&["set", "show_password", "maybe"]);
    assert_failure(&output);

    let output = t.config(&["get", "colour"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "unknown preference: colour");
}

#[test]
fn test_list() {
    let t = Test::new();

    let output = t.config(&["list"]);
    assert_success(&output);
    assert_stdout_contains(&output, "passphrase_cache");
    assert_stdout_contains(&output, "show_password");
    assert_stdout_contains(&output, "store");
}

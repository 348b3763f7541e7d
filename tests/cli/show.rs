//! Tests for `pwdstore show` paths that need no keyring.

use crate::support::*;

#[test]
fn test_missing_entry() {
    let t = Test::with_marker(UNKNOWN_KEY_ID);

    let output = t.show(&["web/nothing"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "Password file not found");
    assert_stderr_contains(&output, "1 of 1 entries could not be decrypted");
}

#[test]
fn test_requires_a_name() {
    let t = Test::new();

    let output = t.cmd().arg("show").output().unwrap();
    assert_failure(&output);
}

#[test]
fn test_invalid_name() {
    let t = Test::new();

    let output = t.show(&["/"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid entry name");
}

#[test]
fn test_keyring_unavailable_counts_failures() {
    let t = Test::with_marker(UNKNOWN_KEY_ID);
    t.write_config(MISSING_GPG_CONFIG);
    t.write_entry("a", b"x");
    t.write_entry("b", b"x");

    let output = t.show(&["a", "b"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "2 of 2 entries could not be decrypted");
}

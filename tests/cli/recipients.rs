//! Tests for `pwdstore recipients`, which runs `.gpg-id` resolution.

use crate::support::*;

#[test]
fn test_short_ids_rejected() {
    let t = Test::with_marker(SHORT_IDS);
    t.write_entry("web/github", b"x");

    let output = t.recipients("web/github");
    assert_failure(&output);
    assert_stderr_contains(&output, "2 short key id(s)");
}

#[test]
fn test_placeholder_only_is_empty() {
    let t = Test::with_marker(PLACEHOLDER_MARKER);
    t.write_entry("web/github", b"x");

    let output = t.recipients("web/github");
    assert_failure(&output);
    assert_stderr_contains(&output, "lists no key ids");
}

#[test]
fn test_missing_marker() {
    let t = Test::new();
    t.write_entry("web/github", b"x");

    let output = t.recipients("web/github");
    assert_failure(&output);
    assert_stderr_contains(&output, "no .gpg-id found");
}

#[test]
fn test_nested_marker_is_used() {
    let t = Test::with_marker(PLACEHOLDER_MARKER);
    t.write_marker("team", SHORT_IDS);
    t.write_entry("team/web/github", b"x");

    // the nearer marker wins, so this is the short-id failure
    let output = t.recipients("team/web/github");
    assert_failure(&output);
    assert_stderr_contains(&output, "short key id");
}

#[test]
fn test_keyring_unavailable() {
    let t = Test::with_marker(UNKNOWN_KEY_ID);
    t.write_config(MISSING_GPG_CONFIG);
    t.write_entry("web/github", b"x");

    let output = t.recipients("web/github");
    assert_failure(&output);
    assert_stderr_contains(&output, "key store query failed");
}

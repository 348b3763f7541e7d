//! Assertions over a finished `pwdstore` process.
//!
//! Failures print the captured streams so a broken decrypt or resolver
//! run can be read straight from the test log.

use std::process::Output;

/// The run exited zero. Panics with stderr otherwise.
pub fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "pwdstore exited with {:?}:\n{}",
            output.status.code(),
            stderr(output)
        );
    }
}

/// The run exited non-zero.
pub fn assert_failure(output: &Output) {
    assert!(
        !output.status.success(),
        "pwdstore should have failed, stdout: {}",
        stdout(output)
    );
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

pub fn assert_stdout_contains(output: &Output, expected: &str) {
    let out = stdout(output);
    assert!(
        out.contains(expected),
        "stdout missing '{}', got: {}",
        expected,
        out
    );
}

/// Error messages and hints go to stderr.
pub fn assert_stderr_contains(output: &Output, expected: &str) {
    let err = stderr(output);
    assert!(
        err.contains(expected),
        "stderr missing '{}', got: {}",
        expected,
        err
    );
}

/// A decrypted secret must not reach either stream, including error text.
pub fn assert_secret_hidden(output: &Output, secret: &str) {
    let out = stdout(output);
    let err = stderr(output);
    assert!(!out.contains(secret), "secret leaked to stdout: {}", out);
    assert!(!err.contains(secret), "secret leaked to stderr: {}", err);
}

/// `config set` followed by `config get` reports the normalized value.
pub fn assert_pref_roundtrip(t: &super::Test, key: &str, value: &str, expected: &str) {
    assert_success(&t.config(&["set", key, value]));

    let output = t.config(&["get", key]);
    assert_success(&output);
    assert_eq!(stdout(&output).trim(), expected);
}

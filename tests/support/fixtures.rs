//! Test fixtures and constants.

/// A long key id that no test keyring contains.
pub const UNKNOWN_KEY_ID: &str = "0x1234567890ABCDEF";

/// Short key ids, always rejected.
pub const SHORT_IDS: &str = "DEADBEEF\n0xCAFEBABE\n";

/// Marker holding only the template placeholder.
pub const PLACEHOLDER_MARKER: &str = "gpg-id\n";

/// Config that points at a gpg binary that does not exist.
pub const MISSING_GPG_CONFIG: &str = r#"
[gpg]
binary = "pwdstore-test-no-such-gpg"
agent_binary = "pwdstore-test-no-such-agent"
"#;

/// Plaintext of a typical entry.
pub const SAMPLE_ENTRY: &str = "s3cr3t\nlogin: alice\nurl: https://example.com\nnotes: hello\n";

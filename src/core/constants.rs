//! Constants used throughout pwdstore.
//!
//! Centralizes magic strings and configuration values.

/// Recipient marker file name.
pub const GPG_ID_FILE: &str = ".gpg-id";

/// Placeholder line written by store templates; never a real recipient.
pub const GPG_ID_PLACEHOLDER: &str = "gpg-id";

/// Encrypted entry extension.
pub const ENTRY_EXTENSION: &str = "gpg";

/// Default repository directory relative to HOME.
pub const DEFAULT_STORE_DIR: &str = ".password-store";

/// Config file name inside the pwdstore config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Config directory name under the platform config dir.
pub const CONFIG_DIR: &str = "pwdstore";

/// Environment override for the repository root.
pub const STORE_DIR_ENV: &str = "PWDSTORE_DIR";

/// Environment override for the config file path.
pub const CONFIG_ENV: &str = "PWDSTORE_CONFIG";

/// Decrypt attempts allowed before giving up on a wrong passphrase.
pub const MAX_DECRYPT_ATTEMPTS: u32 = 3;

/// Default auto-dismiss countdown in seconds.
pub const DEFAULT_AUTO_DISMISS_SECS: u64 = 45;

/// Default TOTP period in seconds.
pub const DEFAULT_OTP_PERIOD: u64 = 30;

/// Default TOTP code length.
pub const DEFAULT_OTP_DIGITS: u32 = 6;

/// Clipboard tools tried in order when copying a secret.
pub const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("pbcopy", &[]),
    ("clip.exe", &[]),
];

//! Decrypted entry type.
//!
//! Parses pass-format plaintext: the first line is the secret, later lines
//! are `key: value` pairs. Parsing never fails; anything unrecognized is
//! kept as an extra field in source order.

use std::fmt::Write as _;

use tracing::trace;
use zeroize::Zeroizing;

use super::otp::OtpConfig;

/// Keys that name the username line, compared case-insensitively.
const USERNAME_KEYS: &[&str] = &["username", "login", "user"];

/// Keys that name an OTP line, compared case-insensitively.
const OTP_KEYS: &[&str] = &["otp", "totp"];

const OTPAUTH_SCHEME: &str = "otpauth://";

/// A line after the secret, in source order.
///
/// Lines without a colon keep their full text in `key` and an empty `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraField {
    pub key: String,
    pub value: String,
}

impl ExtraField {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Structured result of parsing decrypted bytes
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DecryptedEntry {
    pub secret: Option<Zeroizing<String>>,
    pub username: Option<String>,
    pub otp: Option<OtpConfig>,
    pub extra_fields: Vec<ExtraField>,
}

impl DecryptedEntry {
    /// Parse decrypted plaintext.
    ///
    /// Bytes that are not UTF-8 degrade to "no secret, no username" with
    /// every line kept as an extra field.
    pub fn parse(plaintext: &[u8]) -> Self {
        let mut entry = Self::default();

        let text = match std::str::from_utf8(plaintext) {
            Ok(text) => Zeroizing::new(text.to_string()),
            Err(_) => {
                trace!(len = plaintext.len(), "plaintext is not utf-8, degrading");
                let lossy = Zeroizing::new(String::from_utf8_lossy(plaintext).into_owned());
                entry.extra_fields = lossy
                    .lines()
                    .map(|l| l.trim_end_matches('\r'))
                    .filter(|l| !l.trim().is_empty())
                    .map(|l| ExtraField::new(l, ""))
                    .collect();
                return entry;
            }
        };

        let mut lines = text.lines().map(|l| l.trim_end_matches('\r'));

        if let Some(first) = lines.next() {
            if !first.is_empty() {
                entry.secret = Some(Zeroizing::new(first.to_string()));
            }
        }

        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            entry.absorb(line);
        }

        trace!(
            has_secret = entry.secret.is_some(),
            has_username = entry.username.is_some(),
            has_otp = entry.otp.is_some(),
            extra_fields = entry.extra_fields.len(),
            "entry parsed"
        );

        entry
    }

    /// Route one non-blank line after the secret.
    fn absorb(&mut self, line: &str) {
        let trimmed = line.trim();

        if starts_with_ignore_case(trimmed, OTPAUTH_SCHEME) {
            if self.otp.is_none() {
                if let Some(otp) = OtpConfig::from_uri(trimmed) {
                    self.otp = Some(otp);
                    return;
                }
            }
            // a URI is not a `key: value` pair; splitting it would eat the scheme
            self.extra_fields.push(ExtraField::new(line, ""));
            return;
        }

        let Some((key, value)) = line.split_once(':') else {
            self.extra_fields.push(ExtraField::new(line, ""));
            return;
        };
        let key = key.trim();
        let value = value.trim();

        if self.username.is_none() && is_one_of(key, USERNAME_KEYS) {
            self.username = Some(value.to_string());
            return;
        }

        if self.otp.is_none() {
            let otp = if starts_with_ignore_case(value, OTPAUTH_SCHEME) {
                OtpConfig::from_uri(value)
            } else if is_one_of(key, OTP_KEYS) {
                OtpConfig::from_seed(value)
            } else {
                None
            };
            if let Some(otp) = otp {
                self.otp = Some(otp);
                return;
            }
        }

        self.extra_fields.push(ExtraField::new(key, value));
    }

    /// Secret text, if the entry has one
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_ref().map(|s| s.as_str())
    }

    /// Serialize back to pass format.
    ///
    /// `parse(to_plaintext())` reproduces secret, username and extra fields.
    pub fn to_plaintext(&self) -> Zeroizing<String> {
        let mut out = Zeroizing::new(String::new());
        out.push_str(self.secret().unwrap_or_default());
        out.push('\n');

        if let Some(username) = &self.username {
            let _ = writeln!(out, "username: {}", username);
        }
        if let Some(otp) = &self.otp {
            let _ = writeln!(out, "{}", otp.to_uri());
        }
        for field in &self.extra_fields {
            let whole_line = !field.key.contains(':')
                || starts_with_ignore_case(field.key.trim(), OTPAUTH_SCHEME);
            if field.value.is_empty() && whole_line {
                let _ = writeln!(out, "{}", field.key);
            } else {
                let _ = writeln!(out, "{}: {}", field.key, field.value);
            }
        }

        out
    }
}

impl std::fmt::Debug for DecryptedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptedEntry")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("username", &self.username)
            .field("otp", &self.otp)
            .field("extra_fields", &self.extra_fields.len())
            .finish()
    }
}

fn is_one_of(key: &str, names: &[&str]) -> bool {
    names.iter().any(|name| key.eq_ignore_ascii_case(name))
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

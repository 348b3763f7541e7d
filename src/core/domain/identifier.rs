//! Recipient identifier type.
//!
//! Parses `.gpg-id` lines into key ids or user ids and classifies the
//! lines that can never be used.

use std::fmt;

use crate::core::constants;

/// Hex lengths accepted as key ids: long key id, v4 fingerprint, v5/v6 fingerprint.
const KEY_ID_LENGTHS: &[usize] = &[16, 40, 64];

/// Length of a short key id, which is rejected.
const SHORT_KEY_ID_LEN: usize = 8;

/// A fingerprint-derived key id, normalized to uppercase hex without `0x`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyId(String);

impl KeyId {
    /// Uppercase hex digits
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A PGP recipient reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// Long key id or fingerprint
    KeyId(KeyId),
    /// Free-form user id, e.g. an email address
    UserId(String),
}

impl Identifier {
    /// Parse a single identifier, rejecting short and malformed forms.
    pub fn parse(s: &str) -> Option<Self> {
        match MarkerLine::classify(s) {
            MarkerLine::Candidate(id) => Some(id),
            _ => None,
        }
    }

    /// Query string understood by the key store.
    pub fn query(&self) -> &str {
        match self {
            Self::KeyId(id) => id.as_str(),
            Self::UserId(uid) => uid,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyId(id) => write!(f, "0x{}", id),
            Self::UserId(uid) => f.write_str(uid),
        }
    }
}

/// What a single `.gpg-id` line means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerLine {
    /// Blank, comment-only or the `gpg-id` placeholder
    Ignored,
    /// An 8-hex-digit short key id
    Short(String),
    /// Syntactically unusable
    Malformed(String),
    /// Parsed; still has to be confirmed against the key store
    Candidate(Identifier),
}

impl MarkerLine {
    /// Classify one raw line of a `.gpg-id` file.
    pub fn classify(raw: &str) -> Self {
        let line = match raw.split_once('#') {
            Some((before, _)) => before,
            None => raw,
        }
        .trim();

        if line.is_empty() || line == constants::GPG_ID_PLACEHOLDER {
            return Self::Ignored;
        }

        let hex = line
            .strip_prefix("0x")
            .or_else(|| line.strip_prefix("0X"))
            .unwrap_or(line);
        let all_hex = !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());

        if all_hex && hex.len() == SHORT_KEY_ID_LEN {
            return Self::Short(line.to_string());
        }
        if all_hex && KEY_ID_LENGTHS.contains(&hex.len()) {
            return Self::Candidate(Identifier::KeyId(KeyId(hex.to_ascii_uppercase())));
        }
        // Long hex runs of the wrong length are broken key ids, not user ids.
        if all_hex && hex.len() > SHORT_KEY_ID_LEN {
            return Self::Malformed(line.to_string());
        }
        if line.chars().any(char::is_control) {
            return Self::Malformed(line.to_string());
        }

        Self::Candidate(Identifier::UserId(line.to_string()))
    }
}

//! Key store collaborator.
//!
//! Answers the questions the pipeline asks about the local keyring: is
//! there any secret key at all, is a recipient known, and does decrypting
//! for a set of recipients need a passphrase.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::core::domain::Identifier;
use crate::core::gpg::Gpg;
use crate::error::KeyStoreError;

/// Queries against the local keyring.
pub trait KeyStore: Send + Sync {
    /// True when no secret key is available at all.
    fn is_empty(&self) -> Result<bool, KeyStoreError>;

    /// True when `id` matches a key in the keyring.
    fn contains(&self, id: &Identifier) -> Result<bool, KeyStoreError>;

    /// True when at least one secret key for `ids` is passphrase-protected.
    fn requires_passphrase(&self, ids: &[Identifier]) -> Result<bool, KeyStoreError>;
}

/// Protection state reported by gpg-agent for one keygrip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    Protected,
    Clear,
    Unknown,
}

/// Keyring backed by the `gpg` CLI and gpg-agent.
#[derive(Debug, Clone, Default)]
pub struct GpgKeyring {
    gpg: Gpg,
}

impl GpgKeyring {
    pub fn new(gpg: Gpg) -> Self {
        Self { gpg }
    }

    fn list(&self, args: &[&str], ids: &[Identifier]) -> Result<Option<String>, KeyStoreError> {
        let mut cmd = self.gpg.command();
        cmd.args(["--with-colons", "--fixed-list-mode"]).args(args);
        if !ids.is_empty() {
            cmd.arg("--");
            cmd.args(ids.iter().map(Identifier::query));
        }

        let output = self
            .gpg
            .run(cmd, None)
            .map_err(|_| KeyStoreError::Unavailable("gpg".to_string()))?;

        // gpg exits non-zero when a query matches nothing
        if !output.status.success() {
            debug!(
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "key listing returned no match"
            );
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    }

    /// Import keys from an exported key file into the keyring.
    pub fn import(&self, path: &Path) -> Result<usize, KeyStoreError> {
        let mut cmd = self.gpg.command();
        cmd.args(["--status-fd", "1", "--import"]).arg(path);

        let output = self
            .gpg
            .run(cmd, None)
            .map_err(|_| KeyStoreError::Unavailable("gpg".to_string()))?;

        let status = String::from_utf8_lossy(&output.stdout);
        let imported = count_imported(&status);
        if !output.status.success() && imported == 0 {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KeyStoreError::Import(stderr.trim().to_string()));
        }
        info!(path = %path.display(), imported, "imported keys");
        Ok(imported)
    }

    fn agent_keyinfo(&self) -> Option<HashMap<String, Protection>> {
        let mut cmd = self.gpg.agent_command();
        cmd.args(["KEYINFO --list", "/bye"]);

        match self.gpg.run(cmd, None) {
            Ok(output) if output.status.success() => {
                Some(parse_keyinfo(&String::from_utf8_lossy(&output.stdout)))
            }
            Ok(output) => {
                warn!(
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "gpg-agent KEYINFO failed"
                );
                None
            }
            Err(e) => {
                warn!(error = %e, "gpg-connect-agent not runnable");
                None
            }
        }
    }
}

impl KeyStore for GpgKeyring {
    fn is_empty(&self) -> Result<bool, KeyStoreError> {
        let listing = self.list(&["--list-secret-keys"], &[])?;
        let empty = listing.map_or(true, |text| count_records(&text, "sec") == 0);
        debug!(empty, "checked for secret keys");
        Ok(empty)
    }

    fn contains(&self, id: &Identifier) -> Result<bool, KeyStoreError> {
        let listing = self.list(&["--list-keys"], std::slice::from_ref(id))?;
        let found = listing.map_or(false, |text| count_records(&text, "pub") > 0);
        debug!(id = %id, found, "looked up recipient");
        Ok(found)
    }

    fn requires_passphrase(&self, ids: &[Identifier]) -> Result<bool, KeyStoreError> {
        let grips = self
            .list(&["--list-secret-keys", "--with-keygrip"], ids)?
            .map(|text| parse_keygrips(&text))
            .unwrap_or_default();

        let required = match self.agent_keyinfo() {
            Some(info) => needs_passphrase(&grips, &info),
            None => true,
        };
        debug!(keygrips = grips.len(), required, "checked passphrase protection");
        Ok(required)
    }
}

/// Count colon-listing records of `kind` (`sec`, `pub`, ...).
fn count_records(listing: &str, kind: &str) -> usize {
    listing
        .lines()
        .filter(|line| line.split(':').next() == Some(kind))
        .count()
}

/// Number of keys reported by `IMPORT_OK` status lines.
fn count_imported(status: &str) -> usize {
    status
        .lines()
        .filter(|line| line.starts_with("[GNUPG:] IMPORT_OK "))
        .count()
}

/// Keygrips from `grp` records of a `--with-keygrip` colon listing.
pub fn parse_keygrips(listing: &str) -> Vec<String> {
    listing
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(':').collect();
            match fields.as_slice() {
                ["grp", rest @ ..] => rest.get(8).filter(|g| !g.is_empty()).map(|g| g.to_string()),
                _ => None,
            }
        })
        .collect()
}

/// Protection flags from `KEYINFO --list` status lines.
///
/// Line layout: `S KEYINFO <grip> <type> <serial> <idstr> <cached> <protection> ...`.
pub fn parse_keyinfo(output: &str) -> HashMap<String, Protection> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                ["S", "KEYINFO", grip, _, _, _, _, protection, ..] => {
                    let protection = match *protection {
                        "P" => Protection::Protected,
                        "C" => Protection::Clear,
                        _ => Protection::Unknown,
                    };
                    Some((grip.to_string(), protection))
                }
                _ => None,
            }
        })
        .collect()
}

/// A passphrase is needed unless every keygrip is known to be unprotected.
pub fn needs_passphrase(grips: &[String], info: &HashMap<String, Protection>) -> bool {
    if grips.is_empty() {
        return true;
    }
    grips
        .iter()
        .any(|grip| info.get(grip) != Some(&Protection::Clear))
}

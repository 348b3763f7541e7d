//! GnuPG engine adapter.
//!
//! Decrypts by shelling out to `gpg`. The ciphertext goes through a private
//! temporary file and the passphrase, when there is one, through stdin with
//! loopback pinentry, so neither ever appears on a command line.
//!
//! ## Requirements
//!
//! - `gpg` CLI must be installed
//! - The secret key for one of the recipients must be in the keyring

use std::io::Write;

use tempfile::NamedTempFile;
use tracing::{debug, trace, warn};
use zeroize::Zeroizing;

use super::packet::{self, Structure};
use super::Engine;
use crate::core::domain::{Identifier, Passphrase};
use crate::core::gpg::Gpg;
use crate::error::CryptoError;

const STATUS_PREFIX: &str = "[GNUPG:] ";

/// Status keywords that mean the supplied passphrase did not unlock the key.
const RETRYABLE_STATUS: &[&str] = &["BAD_PASSPHRASE", "MISSING_PASSPHRASE", "BADMDC"];

/// Engine backed by the `gpg` CLI.
#[derive(Debug, Clone, Default)]
pub struct GpgEngine {
    gpg: Gpg,
}

impl GpgEngine {
    pub fn new(gpg: Gpg) -> Self {
        Self { gpg }
    }
}

impl Engine for GpgEngine {
    fn name(&self) -> &'static str {
        "gpg"
    }

    fn decrypt(
        &self,
        passphrase: Option<&Passphrase>,
        recipients: &[Identifier],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        trace!(
            recipients = recipients.len(),
            ciphertext_len = ciphertext.len(),
            with_passphrase = passphrase.is_some(),
            "decrypting with GPG"
        );

        match packet::inspect(ciphertext) {
            Some(Structure::NonStandardAead(detail)) => {
                warn!(%detail, "refusing non-standard AEAD message");
                return Err(CryptoError::NonStandardAead(detail));
            }
            Some(Structure::Standard) => {}
            None => debug!("message did not parse as OpenPGP packets, deferring to gpg"),
        }

        self.gpg
            .check()
            .map_err(|e| CryptoError::Engine(e.to_string()))?;

        let mut file = NamedTempFile::new()
            .map_err(|e| CryptoError::Engine(format!("failed to create temp file: {}", e)))?;
        file.write_all(ciphertext)
            .and_then(|_| file.flush())
            .map_err(|e| CryptoError::Engine(format!("failed to write ciphertext: {}", e)))?;

        let mut cmd = self.gpg.command();
        cmd.args(["--quiet", "--yes", "--status-fd", "2"]);
        if passphrase.is_some() {
            cmd.args(["--pinentry-mode", "loopback", "--passphrase-fd", "0"]);
        }
        for recipient in recipients {
            cmd.args(["--try-secret-key", recipient.query()]);
        }
        cmd.arg("--decrypt").arg(file.path());

        let input = passphrase.map(|p| {
            let mut line = Zeroizing::new(Vec::with_capacity(p.expose().len() + 1));
            line.extend_from_slice(p.expose().as_bytes());
            line.push(b'\n');
            line
        });

        let output = self
            .gpg
            .run(cmd, input.as_deref().map(Vec::as_slice))
            .map_err(|e| CryptoError::Engine(format!("gpg command failed: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_status(&stderr));
        }

        trace!(plaintext_len = output.stdout.len(), "decrypted with GPG");
        Ok(Zeroizing::new(output.stdout))
    }
}

/// Classify a failed run from its stderr, status lines included.
///
/// Retryable status keywords win over everything else; otherwise the
/// human-readable lines become the engine failure detail.
pub fn classify_status(stderr: &str) -> CryptoError {
    let mut detail = Vec::new();

    for line in stderr.lines() {
        match line.strip_prefix(STATUS_PREFIX) {
            Some(status) => {
                let keyword = status.split_whitespace().next().unwrap_or_default();
                if RETRYABLE_STATUS.contains(&keyword) {
                    debug!(keyword, "gpg rejected the passphrase");
                    return CryptoError::WrongPassphrase;
                }
            }
            None if !line.trim().is_empty() => detail.push(line.trim()),
            None => {}
        }
    }

    if detail.is_empty() {
        CryptoError::Engine("gpg exited with an error".to_string())
    } else {
        CryptoError::Engine(detail.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GpgConfig;

    #[test]
    fn test_bad_passphrase_is_retryable() {
        let stderr = "\
[GNUPG:] ENC_TO 1234567890ABCDEF 18 0
[GNUPG:] NEED_PASSPHRASE 1234567890ABCDEF 1234567890ABCDEF 18 0
[GNUPG:] BAD_PASSPHRASE 1234567890ABCDEF
gpg: decryption failed: Bad passphrase
";
        assert_eq!(classify_status(stderr), CryptoError::WrongPassphrase);
    }

    #[test]
    fn test_bad_mdc_is_retryable() {
        let stderr = "[GNUPG:] BADMDC\ngpg: WARNING: encrypted message has been manipulated!\n";
        assert_eq!(classify_status(stderr), CryptoError::WrongPassphrase);
    }

    #[test]
    fn test_other_failures_keep_detail() {
        let stderr = "\
[GNUPG:] ENC_TO 1234567890ABCDEF 18 0
[GNUPG:] NO_SECKEY 1234567890ABCDEF
gpg: decryption failed: No secret key
";
        assert_eq!(
            classify_status(stderr),
            CryptoError::Engine("gpg: decryption failed: No secret key".to_string())
        );
        assert!(matches!(classify_status(""), CryptoError::Engine(_)));
    }

    #[test]
    fn test_aead_detected_before_running_gpg() {
        let config = GpgConfig {
            binary: "definitely-not-a-gpg-binary".to_string(),
            ..GpgConfig::default()
        };
        let engine = GpgEngine::new(Gpg::new(&config));
        let message = [0xc1, 0x03, 0x03, 0xaa, 0xbb, 0xd4, 0x04, 0x01, 0x09, 0x03, 0x10];

        match engine.decrypt(None, &[], &message) {
            Err(CryptoError::NonStandardAead(detail)) => assert!(detail.contains("GCM")),
            other => panic!("expected AEAD warning, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_binary_is_engine_failure() {
        let config = GpgConfig {
            binary: "definitely-not-a-gpg-binary".to_string(),
            ..GpgConfig::default()
        };
        let engine = GpgEngine::new(Gpg::new(&config));

        assert!(matches!(
            engine.decrypt(None, &[], b"not a message"),
            Err(CryptoError::Engine(_))
        ));
    }
}

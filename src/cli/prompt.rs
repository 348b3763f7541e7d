//! Terminal implementations of the interactive collaborators.
//!
//! Reads the passphrase with hidden input on a TTY, or one line per request
//! from stdin when it is piped.

use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;

use async_trait::async_trait;
use dialoguer::{Confirm, Input, Password};
use tracing::debug;
use zeroize::Zeroizing;

use crate::cli::output;
use crate::core::credential::{Prompt, PromptMode, PromptRequest, PromptResponse};
use crate::core::domain::Passphrase;
use crate::core::keystore::GpgKeyring;
use crate::core::orchestrator::KeyImporter;
use crate::error::KeyStoreError;

/// Passphrase prompt on the controlling terminal.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompt {
    /// Offer to remember the passphrase for the rest of the run
    offer_remember: bool,
}

impl TerminalPrompt {
    pub fn new(offer_remember: bool) -> Self {
        Self { offer_remember }
    }

    fn ask(self, request: PromptRequest) -> Option<PromptResponse> {
        if !io::stdin().is_terminal() {
            return self.read_piped();
        }

        if request.retry {
            output::warn("wrong passphrase, try again");
        }
        let label = match request.mode {
            PromptMode::KeyPassphrase => "Passphrase",
            PromptMode::RemoteCredential => "Remote password",
        };

        let secret = match Password::new().with_prompt(label).interact() {
            Ok(secret) => Zeroizing::new(secret),
            Err(e) => {
                debug!(error = %e, "prompt aborted");
                return None;
            }
        };

        let remember = self.offer_remember
            && Confirm::new()
                .with_prompt("Remember passphrase for this session?")
                .default(true)
                .interact()
                .unwrap_or(false);

        Some(PromptResponse {
            secret: Passphrase::new(secret.as_str()),
            remember,
        })
    }

    /// One passphrase per line; end of input cancels.
    fn read_piped(self) -> Option<PromptResponse> {
        let mut line = Zeroizing::new(String::new());
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(PromptResponse {
                secret: Passphrase::new(line.trim_end_matches(['\r', '\n'])),
                remember: self.offer_remember,
            }),
            Err(e) => {
                debug!(error = %e, "failed to read passphrase from stdin");
                None
            }
        }
    }
}

#[async_trait]
impl Prompt for TerminalPrompt {
    async fn request(&self, request: PromptRequest) -> Option<PromptResponse> {
        let prompt = *self;
        tokio::task::spawn_blocking(move || prompt.ask(request))
            .await
            .unwrap_or(None)
    }
}

/// Key import journey on the terminal.
#[derive(Debug, Clone)]
pub struct TerminalImporter {
    keyring: GpgKeyring,
}

impl TerminalImporter {
    pub fn new(keyring: GpgKeyring) -> Self {
        Self { keyring }
    }

    fn run(&self) -> Result<bool, KeyStoreError> {
        if !io::stdin().is_terminal() {
            output::error("no secret keys in the keyring");
            output::hint("pwdstore import <keyfile>");
            return Ok(false);
        }

        let proceed = Confirm::new()
            .with_prompt("No secret keys found. Import one now?")
            .default(true)
            .interact()
            .unwrap_or(false);
        if !proceed {
            return Ok(false);
        }

        let path: String = match Input::new().with_prompt("Key file").interact_text() {
            Ok(path) => path,
            Err(e) => {
                debug!(error = %e, "key file prompt aborted");
                return Ok(false);
            }
        };

        let imported = self.keyring.import(&PathBuf::from(path.trim()))?;
        output::success(&format!("imported {} key(s)", imported));
        Ok(imported > 0)
    }
}

#[async_trait]
impl KeyImporter for TerminalImporter {
    async fn import(&self) -> Result<bool, KeyStoreError> {
        let importer = self.clone();
        tokio::task::spawn_blocking(move || importer.run())
            .await
            .map_err(|e| KeyStoreError::Import(e.to_string()))?
    }
}

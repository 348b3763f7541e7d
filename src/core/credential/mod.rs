//! Credential source.
//!
//! Decides where the passphrase for a decrypt attempt comes from: nowhere
//! (unprotected keys), the process-wide cache, or the interactive prompt.
//!
//! A retry always invalidates the cache first, so a wrong cached value is
//! never offered twice.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::core::domain::{Identifier, Passphrase};
use crate::core::keystore::KeyStore;
use crate::error::KeyStoreError;

mod cache;

pub use cache::{MemoryCache, PassphraseCache};

/// What the prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Passphrase unlocking a local secret key
    KeyPassphrase,
    /// Credential for a remote repository
    RemoteCredential,
}

/// One request to the interactive prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptRequest {
    pub mode: PromptMode,
    /// The previous attempt was rejected
    pub retry: bool,
}

/// What the user entered.
#[derive(Debug, Clone)]
pub struct PromptResponse {
    pub secret: Passphrase,
    /// Keep the secret in the process-wide cache
    pub remember: bool,
}

/// Interactive prompt collaborator.
///
/// Suspends until the user answers. `None` means the user cancelled, which
/// ends the current decrypt request. Dropping the returned future abandons
/// the prompt.
#[async_trait]
pub trait Prompt: Send + Sync {
    async fn request(&self, request: PromptRequest) -> Option<PromptResponse>;
}

/// Result of a successful acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Every recipient key is unprotected
    NotRequired,
    Passphrase(Passphrase),
}

impl Credential {
    /// The passphrase to hand to the engine, if any.
    pub fn passphrase(&self) -> Option<&Passphrase> {
        match self {
            Self::NotRequired => None,
            Self::Passphrase(p) => Some(p),
        }
    }
}

/// Acquires passphrases from cache or prompt.
pub struct CredentialSource {
    keys: Arc<dyn KeyStore>,
    cache: Arc<dyn PassphraseCache>,
    prompt: Arc<dyn Prompt>,
}

impl CredentialSource {
    pub fn new(
        keys: Arc<dyn KeyStore>,
        cache: Arc<dyn PassphraseCache>,
        prompt: Arc<dyn Prompt>,
    ) -> Self {
        Self {
            keys,
            cache,
            prompt,
        }
    }

    /// The shared passphrase cache
    pub fn cache(&self) -> &Arc<dyn PassphraseCache> {
        &self.cache
    }

    /// Acquire a credential for `ids`.
    ///
    /// Returns `Ok(None)` when the user cancels the prompt.
    ///
    /// # Errors
    ///
    /// Returns `KeyStoreError` if the protection query fails.
    pub async fn acquire(
        &self,
        ids: &[Identifier],
        is_retry: bool,
    ) -> Result<Option<Credential>, KeyStoreError> {
        let keys = self.keys.clone();
        let owned = ids.to_vec();
        let required = tokio::task::spawn_blocking(move || keys.requires_passphrase(&owned))
            .await
            .map_err(|e| KeyStoreError::Query(e.to_string()))??;

        if !required {
            debug!("recipient keys are unprotected");
            return Ok(Some(Credential::NotRequired));
        }

        if is_retry {
            self.cache.invalidate();
        } else if let Some(cached) = self.cache.get() {
            debug!("using cached passphrase");
            return Ok(Some(Credential::Passphrase(cached)));
        }

        trace!(retry = is_retry, "prompting for passphrase");
        let request = PromptRequest {
            mode: PromptMode::KeyPassphrase,
            retry: is_retry,
        };
        let Some(response) = self.prompt.request(request).await else {
            debug!("passphrase prompt cancelled");
            return Ok(None);
        };

        if response.remember && self.cache.is_enabled() {
            self.cache.put(response.secret.clone());
        }
        Ok(Some(Credential::Passphrase(response.secret)))
    }
}

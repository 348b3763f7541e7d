//! Decrypt request orchestration.
//!
//! Drives one request from a password file to a presented entry:
//!
//! ```text
//! Idle -> [AwaitingKeyImport] -> ResolvingIdentifiers -> AwaitingPassphrase
//!      -> Decrypting -> Presenting -> AutoDismissArmed -> Terminated
//! ```
//!
//! Transitions happen on the calling task. Storage reads, key store queries
//! and the engine run on the blocking pool and are awaited before the
//! state changes again. Requests share nothing but the passphrase cache.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use zeroize::Zeroizing;

use crate::core::cipher::Engine;
use crate::core::constants::MAX_DECRYPT_ATTEMPTS;
use crate::core::credential::CredentialSource;
use crate::core::domain::{DecryptedEntry, Identifier, PasswordFile, Passphrase};
use crate::core::keystore::KeyStore;
use crate::core::resolver;
use crate::core::store::Storage;
use crate::error::{CryptoError, KeyStoreError, ResolveError, StoreError};

mod presentation;
mod state;

pub use presentation::{Dismissal, ExitHandle, ExitReason, Presentation};
pub use state::{Machine, State};

/// Key-import side journey, offered when the keyring has no secret keys.
#[async_trait]
pub trait KeyImporter: Send + Sync {
    /// Run the import. `Ok(false)` means the user declined.
    async fn import(&self) -> Result<bool, KeyStoreError>;
}

/// Why a request ended without presenting anything.
#[derive(Debug)]
pub enum Termination {
    Cancelled,
    ImportDeclined,
    Import(KeyStoreError),
    FileNotFound(PathBuf),
    Io(StoreError),
    Resolution(ResolveError),
    KeyStore(KeyStoreError),
    /// Every attempt was rejected as a wrong passphrase
    AttemptsExhausted {
        attempts: u32,
    },
    NonStandardAead(String),
    Engine(String),
}

impl Termination {
    /// Short user-facing message. Logs carry the full detail.
    pub fn message(&self) -> String {
        match self {
            Self::Cancelled => "Decryption cancelled".to_string(),
            Self::ImportDeclined => "No secret keys available; import a key first".to_string(),
            Self::Import(e) => e.to_string(),
            Self::FileNotFound(path) => format!("Password file not found: {}", path.display()),
            Self::Io(e) => e.to_string(),
            Self::Resolution(e) => e.to_string(),
            Self::KeyStore(e) => e.to_string(),
            Self::AttemptsExhausted { attempts } => {
                format!("Wrong passphrase ({} attempts)", attempts)
            }
            Self::NonStandardAead(detail) => format!(
                "This entry uses a non-standard AEAD encryption that cannot be decrypted safely: {}",
                detail
            ),
            Self::Engine(_) => "Decryption failed".to_string(),
        }
    }

    /// Whether this is the structural AEAD warning rather than a failure
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::NonStandardAead(_))
    }
}

/// Request result as seen by the caller: anything but a presented entry
/// counts as cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestResult {
    Success,
    Cancelled,
}

/// Final outcome of [`Orchestrator::decrypt`].
#[derive(Debug)]
pub enum Outcome {
    Presented(Presentation),
    Terminated(Termination),
}

impl Outcome {
    pub fn result(&self) -> RequestResult {
        match self {
            Self::Presented(_) => RequestResult::Success,
            Self::Terminated(_) => RequestResult::Cancelled,
        }
    }
}

/// Runs decrypt requests against a store.
pub struct Orchestrator {
    root: PathBuf,
    storage: Arc<dyn Storage>,
    keys: Arc<dyn KeyStore>,
    engine: Arc<dyn Engine>,
    credentials: CredentialSource,
    importer: Arc<dyn KeyImporter>,
    auto_dismiss: Option<Duration>,
    listener: Option<UnboundedSender<State>>,
}

impl Orchestrator {
    pub fn new(
        root: impl Into<PathBuf>,
        storage: Arc<dyn Storage>,
        keys: Arc<dyn KeyStore>,
        engine: Arc<dyn Engine>,
        credentials: CredentialSource,
        importer: Arc<dyn KeyImporter>,
    ) -> Self {
        Self {
            root: root.into(),
            storage,
            keys,
            engine,
            credentials,
            importer,
            auto_dismiss: None,
            listener: None,
        }
    }

    /// Auto-dismiss countdown for presented entries; `None` disables it.
    pub fn with_auto_dismiss(mut self, timeout: Option<Duration>) -> Self {
        self.auto_dismiss = timeout;
        self
    }

    /// Publish every state transition to `listener`.
    pub fn with_listener(mut self, listener: UnboundedSender<State>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn credentials(&self) -> &CredentialSource {
        &self.credentials
    }

    /// Run one decrypt request.
    ///
    /// `cancel` abandons the request at the next suspension point; nothing
    /// is decrypted after it fires.
    pub async fn decrypt(&self, file: &PasswordFile, cancel: CancellationToken) -> Outcome {
        let mut machine = Machine::new(file.name(), self.listener.clone());

        match self.run(&mut machine, file, &cancel).await {
            Ok(entry) => {
                info!(entry = %file, "decrypted");
                machine.advance(State::Presenting);
                Outcome::Presented(Presentation::new(
                    machine,
                    file.clone(),
                    entry,
                    self.auto_dismiss,
                ))
            }
            Err(termination) => {
                log_termination(file, &termination);
                machine.advance(State::Terminated);
                Outcome::Terminated(termination)
            }
        }
    }

    async fn run(
        &self,
        machine: &mut Machine,
        file: &PasswordFile,
        cancel: &CancellationToken,
    ) -> Result<DecryptedEntry, Termination> {
        if !self.storage.is_file(file.path()) {
            return Err(Termination::FileNotFound(file.path().to_path_buf()));
        }

        let keys = self.keys.clone();
        let empty = blocking(cancel, move || keys.is_empty())
            .await?
            .map_err(Termination::KeyStore)?;
        if empty {
            machine.advance(State::AwaitingKeyImport);
            self.import_keys(cancel).await?;
        }

        machine.advance(State::ResolvingIdentifiers);
        let ids = self.resolve(file, cancel).await?;

        let mut ciphertext: Option<Arc<Vec<u8>>> = None;
        for attempt in 1..=MAX_DECRYPT_ATTEMPTS {
            machine.advance(State::AwaitingPassphrase);
            let is_retry = attempt > 1;
            let credential = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Termination::Cancelled),
                acquired = self.credentials.acquire(&ids, is_retry) => acquired,
            };
            let credential = match credential {
                Ok(Some(credential)) => credential,
                Ok(None) => return Err(Termination::Cancelled),
                Err(e) => return Err(Termination::KeyStore(e)),
            };

            machine.advance(State::Decrypting);
            let bytes = match &ciphertext {
                Some(bytes) => bytes.clone(),
                None => {
                    let bytes = Arc::new(self.read(file, cancel).await?);
                    ciphertext = Some(bytes.clone());
                    bytes
                }
            };

            match self
                .decrypt_once(credential.passphrase().cloned(), &ids, bytes, cancel)
                .await?
            {
                Ok(plaintext) => return Ok(DecryptedEntry::parse(&plaintext)),
                Err(CryptoError::WrongPassphrase) => {
                    warn!(entry = %file, attempt, "wrong passphrase");
                    // a rejected passphrase must not outlive the attempt that proved it wrong
                    self.credentials.cache().invalidate();
                }
                Err(CryptoError::NonStandardAead(detail)) => {
                    return Err(Termination::NonStandardAead(detail));
                }
                Err(CryptoError::Engine(detail)) => return Err(Termination::Engine(detail)),
            }
        }

        Err(Termination::AttemptsExhausted {
            attempts: MAX_DECRYPT_ATTEMPTS,
        })
    }

    async fn import_keys(&self, cancel: &CancellationToken) -> Result<(), Termination> {
        info!("no secret keys found, starting key import");
        let imported = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Termination::Cancelled),
            imported = self.importer.import() => imported,
        };
        match imported {
            Ok(true) => Ok(()),
            Ok(false) => Err(Termination::ImportDeclined),
            Err(e) => Err(Termination::Import(e)),
        }
    }

    async fn resolve(
        &self,
        file: &PasswordFile,
        cancel: &CancellationToken,
    ) -> Result<Vec<Identifier>, Termination> {
        let storage = self.storage.clone();
        let keys = self.keys.clone();
        let dir = file.parent_dir().to_path_buf();
        let root = self.root.clone();

        blocking(cancel, move || {
            resolver::resolve(storage.as_ref(), keys.as_ref(), &dir, &root)
        })
        .await?
        .map_err(Termination::Resolution)
    }

    async fn read(
        &self,
        file: &PasswordFile,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, Termination> {
        let storage = self.storage.clone();
        let path = file.path().to_path_buf();

        blocking(cancel, move || storage.read(&path))
            .await?
            .map_err(|e| match e {
                StoreError::NotFound(path) => Termination::FileNotFound(path),
                other => Termination::Io(other),
            })
    }

    async fn decrypt_once(
        &self,
        passphrase: Option<Passphrase>,
        ids: &[Identifier],
        ciphertext: Arc<Vec<u8>>,
        cancel: &CancellationToken,
    ) -> Result<Result<Zeroizing<Vec<u8>>, CryptoError>, Termination> {
        let engine = self.engine.clone();
        let ids = ids.to_vec();
        debug!(engine = engine.name(), recipients = ids.len(), "invoking engine");

        blocking(cancel, move || {
            engine.decrypt(passphrase.as_ref(), &ids, &ciphertext)
        })
        .await
    }
}

/// Run `f` on the blocking pool, returning as soon as `cancel` fires.
///
/// A cancelled call detaches the blocking task; it runs to completion on
/// the pool and its result is dropped unread.
async fn blocking<T, F>(cancel: &CancellationToken, f: F) -> Result<T, Termination>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    if cancel.is_cancelled() {
        return Err(Termination::Cancelled);
    }
    let handle = tokio::task::spawn_blocking(f);
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!("cancelled while blocking work was in flight");
            Err(Termination::Cancelled)
        }
        joined = handle => {
            joined.map_err(|e| Termination::Engine(format!("background task failed: {}", e)))
        }
    }
}

fn log_termination(file: &PasswordFile, termination: &Termination) {
    match termination {
        Termination::Cancelled | Termination::ImportDeclined => {
            info!(entry = %file, reason = %termination.message(), "request ended")
        }
        Termination::Engine(detail) => {
            error!(entry = %file, %detail, "engine failure")
        }
        Termination::NonStandardAead(detail) => {
            warn!(entry = %file, %detail, "non-standard AEAD message")
        }
        other => error!(entry = %file, error = %other.message(), "decrypt failed"),
    }
}

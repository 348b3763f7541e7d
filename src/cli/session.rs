//! Wiring shared by the decrypting commands.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::cli::prompt::{TerminalImporter, TerminalPrompt};
use crate::core::cipher::GpgEngine;
use crate::core::config::Config;
use crate::core::credential::{CredentialSource, MemoryCache};
use crate::core::domain::RepositoryPath;
use crate::core::gpg::Gpg;
use crate::core::keystore::GpgKeyring;
use crate::core::orchestrator::Orchestrator;
use crate::core::store::Filesystem;
use crate::error::Result;

/// Loaded configuration plus the opened store.
pub struct Session {
    pub config: Config,
    pub repo: RepositoryPath,
    pub gpg: Gpg,
}

impl Session {
    /// Load config and open the store, `store` overriding the configured root.
    pub fn open(store: Option<PathBuf>) -> Result<Self> {
        let config = Config::load()?;
        let root = match store {
            Some(root) => root,
            None => config.store_path()?,
        };
        debug!(root = %root.display(), "opening store");

        let repo = RepositoryPath::open(root)?;
        let gpg = Gpg::new(&config.gpg);
        Ok(Self { config, repo, gpg })
    }

    pub fn keyring(&self) -> GpgKeyring {
        GpgKeyring::new(self.gpg.clone())
    }

    /// Orchestrator using the terminal for prompts and a fresh passphrase cache.
    pub fn orchestrator(&self) -> Orchestrator {
        let prefs = &self.config.preferences;
        let keys = Arc::new(self.keyring());
        let cache = Arc::new(MemoryCache::new(prefs.passphrase_cache));
        let prompt = Arc::new(TerminalPrompt::new(prefs.passphrase_cache));
        let credentials = CredentialSource::new(keys.clone(), cache, prompt);

        Orchestrator::new(
            self.repo.as_path(),
            Arc::new(Filesystem),
            keys,
            Arc::new(GpgEngine::new(self.gpg.clone())),
            credentials,
            Arc::new(TerminalImporter::new(self.keyring())),
        )
        .with_auto_dismiss(prefs.auto_dismiss())
    }
}

/// Single-threaded runtime for one command.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime)
}

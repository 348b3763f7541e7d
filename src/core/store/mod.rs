//! Storage collaborator.
//!
//! Reads ciphertext and `.gpg-id` markers from the repository. The
//! pipeline only sees the [`Storage`] trait so tests can swap in fakes.
//!
//! ## Adding a New Storage Backend
//!
//! 1. Implement the `Storage` trait
//! 2. Add the implementation in a new file
//! 3. Re-export from this module

use std::path::Path;

use crate::error::StoreError;

mod fs;

pub use fs::Filesystem;

/// Read access to the password store.
pub trait Storage: Send + Sync {
    /// Read a whole file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the file does not exist, so callers
    /// can tell a missing entry from an unreadable one.
    fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError>;

    /// Check whether `path` names an existing regular file.
    fn is_file(&self, path: &Path) -> bool;
}

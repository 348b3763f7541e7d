//! Test support utilities for pwdstore integration tests.
//!
//! Provides reusable test environment setup and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;
pub mod skip;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// Each test gets its own password store and home dir. No process-global
/// state is mutated; child processes get everything through env vars so
/// tests can safely run in parallel.
pub struct Test {
    /// Temporary password store root
    pub store: TempDir,
    /// Temporary home directory, also holding config.toml and the keyring
    pub home: TempDir,
}

impl Test {
    /// Create an empty store.
    pub fn new() -> Self {
        let store = TempDir::new().expect("failed to create temp store");
        let home = TempDir::new().expect("failed to create temp home");

        Self { store, home }
    }

    /// Create a store whose root `.gpg-id` holds `marker`.
    pub fn with_marker(marker: &str) -> Self {
        let t = Self::new();
        t.write_marker("", marker);
        t
    }

    /// Path of the config file child processes use.
    pub fn config_path(&self) -> PathBuf {
        self.home.path().join("config.toml")
    }

    /// GnuPG home for child processes.
    pub fn gnupg_home(&self) -> PathBuf {
        self.home.path().join(".gnupg")
    }

    /// Write a `.gpg-id` into `dir` (relative to the store root).
    pub fn write_marker(&self, dir: &str, marker: &str) {
        let dir = self.store.path().join(dir);
        fs::create_dir_all(&dir).expect("failed to create marker dir");
        fs::write(dir.join(".gpg-id"), marker).expect("failed to write .gpg-id");
    }

    /// Write raw entry bytes for `name` (without `.gpg`).
    pub fn write_entry(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.store.path().join(format!("{}.gpg", name));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create entry dir");
        }
        fs::write(&path, bytes).expect("failed to write entry");
        path
    }

    /// Write `config.toml` contents.
    pub fn write_config(&self, contents: &str) {
        fs::write(self.config_path(), contents).expect("failed to write config");
    }

    pub fn store_path(&self) -> &Path {
        self.store.path()
    }
}

//! Repository and password file paths.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::core::constants;
use crate::error::{PathError, Result};

/// Root directory of the password store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryPath(PathBuf);

impl RepositoryPath {
    /// Open an existing store directory.
    ///
    /// # Errors
    ///
    /// Returns `PathError::MissingRepository` if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(PathError::MissingRepository(root).into());
        }
        Ok(Self(root))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Locate the encrypted file for an entry name such as `web/github`.
    pub fn entry(&self, name: &str) -> Result<PasswordFile> {
        let name = name.trim_matches('/');
        let name = name
            .strip_suffix(&format!(".{}", constants::ENTRY_EXTENSION))
            .unwrap_or(name);
        if name.is_empty() {
            return Err(PathError::InvalidName(name.to_string()).into());
        }
        let file = format!("{}.{}", name, constants::ENTRY_EXTENSION);
        PasswordFile::new(self, self.0.join(file))
    }
}

/// A single encrypted entry strictly inside the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordFile {
    path: PathBuf,
    relative: String,
}

impl PasswordFile {
    /// Build from an absolute or root-joined path.
    ///
    /// # Errors
    ///
    /// Returns `PathError::OutsideRepository` when the path escapes the root
    /// or names the root itself.
    pub fn new(root: &RepositoryPath, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let outside = || PathError::OutsideRepository(path.clone());

        let rest = path.strip_prefix(root.as_path()).map_err(|_| outside())?;
        let mut parts = Vec::new();
        for component in rest.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                _ => return Err(outside().into()),
            }
        }
        if parts.is_empty() {
            return Err(outside().into());
        }

        let path = parts
            .iter()
            .fold(root.as_path().to_path_buf(), |acc, part| acc.join(part));

        Ok(Self {
            path,
            relative: parts.join("/"),
        })
    }

    /// Full path on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path below the repository root, `/`-separated
    pub fn relative_path(&self) -> &str {
        &self.relative
    }

    /// Directory containing the file
    pub fn parent_dir(&self) -> &Path {
        // `new` guarantees at least one component below the root
        self.path.parent().unwrap_or(&self.path)
    }

    /// Entry name: relative path without the `.gpg` extension
    pub fn name(&self) -> &str {
        self.relative
            .strip_suffix(&format!(".{}", constants::ENTRY_EXTENSION))
            .unwrap_or(&self.relative)
    }
}

impl fmt::Display for PasswordFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

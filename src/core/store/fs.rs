//! Filesystem-backed storage implementation.

use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, trace};
use walkdir::WalkDir;

use super::Storage;
use crate::core::constants;
use crate::error::StoreError;

/// Plain filesystem access.
#[derive(Debug, Default, Clone, Copy)]
pub struct Filesystem;

impl Storage for Filesystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
        match std::fs::read(path) {
            Ok(bytes) => {
                trace!(path = %path.display(), len = bytes.len(), "read file");
                Ok(bytes)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.to_path_buf()))
            }
            Err(source) => Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

impl Filesystem {
    /// List entry names below `dir`, relative to `root`, sorted.
    ///
    /// Hidden files and directories (`.git`, `.gpg-id`, ...) are skipped.
    pub fn list_entries(&self, root: &Path, dir: &Path) -> Result<Vec<String>, StoreError> {
        debug!(dir = %dir.display(), "listing entries");

        let suffix = format!(".{}", constants::ENTRY_EXTENSION);
        let mut names = Vec::new();

        let walker = WalkDir::new(dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

        for item in walker {
            let item = item.map_err(|e| StoreError::List {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })?;
            if !item.file_type().is_file() {
                continue;
            }
            let Ok(relative) = item.path().strip_prefix(root) else {
                continue;
            };
            let relative = to_slash(relative);
            if let Some(name) = relative.strip_suffix(&suffix) {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"x").unwrap();
        path
    }

    #[test]
    fn test_read_distinguishes_missing() {
        let tmp = TempDir::new().unwrap();
        let path = touch(tmp.path(), "a.gpg");

        assert_eq!(Filesystem.read(&path).unwrap(), b"x");
        assert!(matches!(
            Filesystem.read(&tmp.path().join("missing.gpg")),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_read_directory_is_read_error() {
        let tmp = TempDir::new().unwrap();
        let result = Filesystem.read(tmp.path());
        assert!(result.is_err());
        assert!(!matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_is_file() {
        let tmp = TempDir::new().unwrap();
        let path = touch(tmp.path(), ".gpg-id");

        assert!(Filesystem.is_file(&path));
        assert!(!Filesystem.is_file(tmp.path()));
    }

    #[test]
    fn test_list_entries_skips_hidden() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "email.gpg");
        touch(tmp.path(), "web/github.gpg");
        touch(tmp.path(), "web/notes.txt");
        touch(tmp.path(), ".gpg-id");
        touch(tmp.path(), ".git/objects/ab.gpg");

        let names = Filesystem.list_entries(tmp.path(), tmp.path()).unwrap();
        assert_eq!(names, vec!["email", "web/github"]);

        let web = Filesystem
            .list_entries(tmp.path(), &tmp.path().join("web"))
            .unwrap();
        assert_eq!(web, vec!["web/github"]);
    }
}

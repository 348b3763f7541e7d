//! `.gpg-id` resolution against a real directory tree.

use std::fs;
use std::path::{Path, PathBuf};

use pwdstore::core::domain::Identifier;
use pwdstore::core::keystore::KeyStore;
use pwdstore::core::resolver::{find_marker, resolve};
use pwdstore::core::store::Filesystem;
use pwdstore::error::{KeyStoreError, ResolveError};
use tempfile::TempDir;

const ALICE: &str = "0123456789ABCDEF0123456789ABCDEF01234567";
const BOB: &str = "FEDCBA9876543210";

/// Keyring that knows a fixed set of queries.
struct Keyring(Vec<&'static str>);

impl KeyStore for Keyring {
    fn is_empty(&self) -> Result<bool, KeyStoreError> {
        Ok(self.0.is_empty())
    }

    fn contains(&self, id: &Identifier) -> Result<bool, KeyStoreError> {
        Ok(self.0.iter().any(|known| known.eq_ignore_ascii_case(id.query())))
    }

    fn requires_passphrase(&self, _ids: &[Identifier]) -> Result<bool, KeyStoreError> {
        Ok(true)
    }
}

fn keyring() -> Keyring {
    Keyring(vec![ALICE, BOB, "alice@example.com"])
}

fn nested(root: &Path, depth: usize) -> PathBuf {
    let dir = (0..depth).fold(root.to_path_buf(), |acc, i| acc.join(format!("d{}", i)));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn marker(dir: &Path, contents: &str) {
    fs::write(dir.join(".gpg-id"), contents).unwrap();
}

#[test]
fn test_fingerprint_and_user_id() {
    let root = TempDir::new().unwrap();
    marker(root.path(), &format!("{}\nalice@example.com\n", ALICE));
    let dir = nested(root.path(), 2);

    let ids = resolve(&Filesystem, &keyring(), &dir, root.path()).unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(ids[0].query(), ALICE);
    assert_eq!(ids[1].query(), "alice@example.com");
}

#[test]
fn test_unknown_user_id_is_invalid() {
    let root = TempDir::new().unwrap();
    marker(root.path(), "mallory@example.com\n");

    let err = resolve(&Filesystem, &keyring(), root.path(), root.path()).unwrap_err();
    assert!(matches!(err, ResolveError::AllInvalid { count: 1, .. }));
}

#[test]
fn test_marker_above_root_is_ignored() {
    let outer = TempDir::new().unwrap();
    marker(outer.path(), ALICE);
    let root = nested(outer.path(), 1);
    let dir = nested(&root, 1);

    let err = find_marker(&Filesystem, &dir, &root).unwrap_err();
    assert!(matches!(err, ResolveError::MarkerMissing(_)));
}

#[test]
fn test_marker_directory_is_not_a_marker() {
    let root = TempDir::new().unwrap();
    marker(root.path(), BOB);
    let dir = nested(root.path(), 1);
    fs::create_dir(dir.join(".gpg-id")).unwrap();

    let found = find_marker(&Filesystem, &dir, root.path()).unwrap();
    assert_eq!(found, root.path().join(".gpg-id"));
}

#[cfg(unix)]
#[test]
fn test_unreadable_marker() {
    let root = TempDir::new().unwrap();
    // a dangling symlink is a file name that cannot be read
    std::os::unix::fs::symlink(root.path().join("missing"), root.path().join(".gpg-id")).unwrap();

    let err = find_marker(&Filesystem, root.path(), root.path()).unwrap_err();
    assert!(matches!(err, ResolveError::MarkerMissing(_)));
}

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn nearest_marker_wins(depth in 0usize..6, at in 0usize..6) {
            let at = at.min(depth);
            let root = TempDir::new().unwrap();
            marker(root.path(), ALICE);
            let marked = nested(root.path(), at);
            if at > 0 {
                marker(&marked, BOB);
            }
            let dir = nested(root.path(), depth);

            let found = find_marker(&Filesystem, &dir, root.path()).unwrap();
            prop_assert_eq!(found, marked.join(".gpg-id"));

            let ids = resolve(&Filesystem, &keyring(), &dir, root.path()).unwrap();
            let expected = if at > 0 { BOB } else { ALICE };
            prop_assert_eq!(ids.len(), 1);
            prop_assert_eq!(ids[0].query(), expected);
        }

        #[test]
        fn short_ids_never_resolve(ids in proptest::collection::vec("(0x)?[0-9A-F]{8}", 1..5)) {
            let root = TempDir::new().unwrap();
            marker(root.path(), &ids.join("\n"));

            let err = resolve(&Filesystem, &keyring(), root.path(), root.path()).unwrap_err();
            let is_all_short = matches!(err, ResolveError::AllShort { count, .. } if count == ids.len());
            prop_assert!(is_all_short);
        }

        #[test]
        fn any_bad_line_fails_closed(
            bad in prop_oneof!["[0-9A-F]{8}", "[0-9A-F]{20}", "nobody[0-9]{1,3}@example\\.com"],
            before in any::<bool>(),
        ) {
            let root = TempDir::new().unwrap();
            let lines = if before {
                format!("{}\n{}\n", bad, ALICE)
            } else {
                format!("{}\n{}\n", ALICE, bad)
            };
            marker(root.path(), &lines);

            prop_assert!(resolve(&Filesystem, &keyring(), root.path(), root.path()).is_err());
        }
    }
}

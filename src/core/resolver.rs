//! Recipient identifier resolution.
//!
//! Finds the `.gpg-id` that governs a directory by walking up toward the
//! store root, then turns its lines into identifiers the key store knows.
//!
//! Resolution is fail-closed: a single short or invalid line voids the
//! whole file, even when other lines are fine.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use crate::core::constants;
use crate::core::domain::{Identifier, MarkerLine};
use crate::core::keystore::KeyStore;
use crate::core::store::Storage;
use crate::error::{ResolveError, StoreError};

/// Counters gathered while reading one marker file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    short: usize,
    invalid: usize,
}

impl Tally {
    fn into_error(self, marker: PathBuf) -> ResolveError {
        match (self.short, self.invalid) {
            (0, 0) => ResolveError::NoIdsPresent { marker },
            (count, 0) => ResolveError::AllShort { marker, count },
            (0, count) => ResolveError::AllInvalid { marker, count },
            (short, invalid) => ResolveError::Mixed {
                marker,
                short,
                invalid,
            },
        }
    }
}

/// Locate the `.gpg-id` governing `start`.
///
/// Looks in `start` and then each ancestor, never above `root`.
///
/// # Errors
///
/// - `ResolveError::OutsideRepository` if `start` is not under `root`
/// - `ResolveError::MarkerMissing` if no marker exists up to and including `root`
pub fn find_marker(
    storage: &dyn Storage,
    start: &Path,
    root: &Path,
) -> Result<PathBuf, ResolveError> {
    if !start.starts_with(root) {
        return Err(ResolveError::OutsideRepository(start.to_path_buf()));
    }

    // The walk climbs path text, so it always ends; canonical forms only
    // keep a symlinked alias from being checked twice.
    let mut visited = HashSet::new();
    let mut dir = start;
    loop {
        let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        if visited.insert(canonical) {
            let candidate = dir.join(constants::GPG_ID_FILE);
            trace!(path = %candidate.display(), "checking for marker");
            if storage.is_file(&candidate) {
                debug!(marker = %candidate.display(), "found marker");
                return Ok(candidate);
            }
        } else {
            trace!(dir = %dir.display(), "directory already checked through an alias");
        }

        if dir == root {
            break;
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => break,
        }
    }

    Err(ResolveError::MarkerMissing(start.to_path_buf()))
}

/// Resolve the recipients for files in `parent_dir`.
///
/// The marker is re-read on every call.
///
/// # Errors
///
/// Returns a `ResolveError` naming the marker-level problem; see
/// [`find_marker`] for lookup failures.
pub fn resolve(
    storage: &dyn Storage,
    keys: &dyn KeyStore,
    parent_dir: &Path,
    root: &Path,
) -> Result<Vec<Identifier>, ResolveError> {
    let marker = find_marker(storage, parent_dir, root)?;

    let bytes = storage.read(&marker).map_err(|e| match e {
        StoreError::NotFound(_) => ResolveError::MarkerMissing(parent_dir.to_path_buf()),
        other => ResolveError::Read {
            path: marker.clone(),
            reason: other.to_string(),
        },
    })?;
    let text = String::from_utf8_lossy(&bytes);

    let mut tally = Tally::default();
    let mut accepted: Vec<Identifier> = Vec::new();

    for line in text.lines() {
        match MarkerLine::classify(line) {
            MarkerLine::Ignored => {}
            MarkerLine::Short(id) => {
                debug!(%id, "short key id rejected");
                tally.short += 1;
            }
            MarkerLine::Malformed(id) => {
                debug!(%id, "malformed key id rejected");
                tally.invalid += 1;
            }
            MarkerLine::Candidate(id) => {
                if keys.contains(&id)? {
                    if !accepted.contains(&id) {
                        accepted.push(id);
                    }
                } else {
                    debug!(%id, "recipient not in keyring");
                    tally.invalid += 1;
                }
            }
        }
    }

    if tally != Tally::default() || accepted.is_empty() {
        let err = tally.into_error(marker);
        warn!(error = %err, accepted = accepted.len(), "identifier resolution failed");
        return Err(err);
    }

    debug!(count = accepted.len(), "resolved recipients");
    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::credential::testing::FakeKeys;
    use crate::core::store::Filesystem;
    use std::fs;
    use tempfile::TempDir;

    const ALICE: &str = "1234567890ABCDEF";
    const BOB: &str = "A1B2C3D4E5F6A7B8C9D0A1B2C3D4E5F6A7B8C9D0";

    fn keys() -> FakeKeys {
        FakeKeys {
            known: vec![ALICE.to_string(), BOB.to_string(), "carol@example.com".to_string()],
            ..FakeKeys::default()
        }
    }

    fn store(marker: &str) -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".gpg-id"), marker).unwrap();
        tmp
    }

    fn run(root: &Path, dir: &Path) -> Result<Vec<Identifier>, ResolveError> {
        resolve(&Filesystem, &keys(), dir, root)
    }

    #[test]
    fn test_root_marker_found_from_nested_dir() {
        let tmp = store(&format!("{}\ncarol@example.com\n", ALICE));
        let nested = tmp.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();

        let ids = run(tmp.path(), &nested).unwrap();
        assert_eq!(
            ids.iter().map(Identifier::query).collect::<Vec<_>>(),
            vec![ALICE, "carol@example.com"]
        );
    }

    #[test]
    fn test_nearest_marker_wins() {
        let tmp = store(ALICE);
        let team = tmp.path().join("team");
        fs::create_dir_all(team.join("web")).unwrap();
        fs::write(team.join(".gpg-id"), BOB).unwrap();

        let ids = run(tmp.path(), &team.join("web")).unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].query(), BOB);
    }

    #[test]
    fn test_all_short() {
        let tmp = store("DEADBEEF\n0xCAFEBABE\n");
        match run(tmp.path(), tmp.path()) {
            Err(ResolveError::AllShort { count, .. }) => assert_eq!(count, 2),
            other => panic!("expected AllShort, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_plus_invalid_fails_closed() {
        let tmp = store(&format!("{}\nmallory@example.com\n", ALICE));
        match run(tmp.path(), tmp.path()) {
            Err(ResolveError::AllInvalid { count, .. }) => assert_eq!(count, 1),
            other => panic!("expected AllInvalid, got {:?}", other),
        }
    }

    #[test]
    fn test_short_and_invalid_is_mixed() {
        let tmp = store("DEADBEEF\n1234567890AB\n");
        assert!(matches!(
            run(tmp.path(), tmp.path()),
            Err(ResolveError::Mixed {
                short: 1,
                invalid: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_placeholder_only_is_empty_not_invalid() {
        let tmp = store("gpg-id\n\n");
        assert!(matches!(
            run(tmp.path(), tmp.path()),
            Err(ResolveError::NoIdsPresent { .. })
        ));
    }

    #[test]
    fn test_comments_and_duplicates() {
        let tmp = store(&format!("# team\n{0} # laptop\n0x{0}\n", ALICE));
        let ids = run(tmp.path(), tmp.path()).unwrap();
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn test_missing_marker_stops_at_root() {
        let outer = TempDir::new().unwrap();
        fs::write(outer.path().join(".gpg-id"), ALICE).unwrap();
        let root = outer.path().join("store");
        fs::create_dir_all(root.join("sub")).unwrap();

        assert!(matches!(
            run(&root, &root.join("sub")),
            Err(ResolveError::MarkerMissing(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_alias_still_reaches_root_marker() {
        let tmp = store(ALICE);
        let a = tmp.path().join("a");
        fs::create_dir_all(a.join("x")).unwrap();
        std::os::unix::fs::symlink(&a, a.join("link")).unwrap();

        // root/a/link/x is root/a/x, and root/a/link is root/a
        let ids = run(tmp.path(), &a.join("link/x")).unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].query(), ALICE);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_alias_finds_nearest_marker() {
        let tmp = store(ALICE);
        let a = tmp.path().join("a");
        fs::create_dir_all(&a).unwrap();
        fs::write(a.join(".gpg-id"), BOB).unwrap();
        std::os::unix::fs::symlink(&a, a.join("link")).unwrap();

        let marker = find_marker(&Filesystem, &a.join("link"), tmp.path()).unwrap();
        assert_eq!(marker, a.join("link").join(".gpg-id"));
        assert_eq!(run(tmp.path(), &a.join("link")).unwrap()[0].query(), BOB);
    }

    #[test]
    fn test_start_outside_root() {
        let tmp = store(ALICE);
        let other = TempDir::new().unwrap();
        assert!(matches!(
            run(tmp.path(), other.path()),
            Err(ResolveError::OutsideRepository(_))
        ));
    }
}

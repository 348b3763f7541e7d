//! Recipients command.
//!
//! Shows which keys an entry would be decrypted for, running the same
//! `.gpg-id` resolution as a decrypt.

use std::path::PathBuf;

use crate::cli::output;
use crate::cli::session::Session;
use crate::core::resolver;
use crate::core::store::Filesystem;
use crate::error::Result;

/// Print the resolved recipients for `name`.
pub fn execute(store: Option<PathBuf>, name: &str) -> Result<()> {
    let session = Session::open(store)?;
    let file = session.repo.entry(name)?;
    let keyring = session.keyring();

    let marker = resolver::find_marker(&Filesystem, file.parent_dir(), session.repo.as_path())?;
    let ids = resolver::resolve(
        &Filesystem,
        &keyring,
        file.parent_dir(),
        session.repo.as_path(),
    )?;

    output::header(&format!("Recipients for {}", output::path(file.name())));
    output::kv("marker", marker.display());
    output::rule();
    for id in &ids {
        output::list_item(&id.to_string());
    }
    Ok(())
}

//! List command.

use std::path::PathBuf;

use console::style;

use crate::cli::output;
use crate::cli::session::Session;
use crate::core::store::Filesystem;
use crate::error::{PathError, Result};

/// List entry names, optionally below `subdir`.
pub fn execute(store: Option<PathBuf>, subdir: Option<&str>, json: bool) -> Result<()> {
    let session = Session::open(store)?;
    let root = session.repo.as_path();

    let dir = match subdir.map(|s| s.trim_matches('/')).filter(|s| !s.is_empty()) {
        Some(sub) => {
            let dir = root.join(sub);
            if !dir.starts_with(root) || sub.split('/').any(|part| part == "..") {
                return Err(PathError::InvalidName(sub.to_string()).into());
            }
            dir
        }
        None => root.to_path_buf(),
    };

    let names = Filesystem.list_entries(root, &dir)?;

    if json {
        let output = serde_json::json!({
            "entries": names,
            "count": names.len()
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if names.is_empty() {
        output::dimmed("no entries");
    } else {
        println!("{} entries:", style(names.len()).green().bold());
        for name in &names {
            output::list_item(name);
        }
    }

    Ok(())
}

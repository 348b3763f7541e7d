//! Clipboard access through whichever system tool is installed.

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::core::constants::CLIPBOARD_TOOLS;

/// Copy `text` to the system clipboard.
///
/// Returns the tool used, or `None` if no tool is installed or it failed.
pub fn copy(text: &str) -> Option<&'static str> {
    let &(tool, args) = CLIPBOARD_TOOLS
        .iter()
        .find(|(tool, _)| which::which(tool).is_ok())?;
    debug!(tool, "copying to clipboard");

    let mut child = match Command::new(tool)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            warn!(tool, error = %e, "failed to start clipboard tool");
            return None;
        }
    };

    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(text.as_bytes()) {
            warn!(tool, error = %e, "failed to write to clipboard tool");
        }
    }

    match child.wait() {
        Ok(status) if status.success() => Some(tool),
        Ok(status) => {
            warn!(tool, %status, "clipboard tool failed");
            None
        }
        Err(e) => {
            warn!(tool, error = %e, "clipboard tool failed");
            None
        }
    }
}

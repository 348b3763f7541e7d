//! Show command.
//!
//! Decrypts one or more entries and keeps each on screen until the user
//! presses Enter or the auto-dismiss countdown runs out.

use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::cli::session::{self, Session};
use crate::cli::{clipboard, output};
use crate::core::domain::DecryptedEntry;
use crate::core::orchestrator::{
    Dismissal, ExitReason, Orchestrator, Outcome, Presentation, Termination,
};
use crate::error::{Error, Result};

/// Display options for `show`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShowOptions {
    /// Print the secret even when `show_password` is off
    pub reveal: bool,
    /// Copy the secret to the clipboard
    pub copy: bool,
}

/// Decrypt and display entries.
pub fn execute(store: Option<PathBuf>, names: &[String], options: ShowOptions) -> Result<()> {
    info!(count = names.len(), "showing entries");

    let session = Session::open(store)?;
    let orchestrator = session.orchestrator();
    let runtime = session::runtime()?;

    let failed = runtime.block_on(show_all(&session, &orchestrator, names, options))?;
    if failed > 0 {
        return Err(Error::Incomplete {
            failed,
            total: names.len(),
        });
    }
    Ok(())
}

async fn show_all(
    session: &Session,
    orchestrator: &Orchestrator,
    names: &[String],
    options: ShowOptions,
) -> Result<usize> {
    let cancel = CancellationToken::new();
    let mut enter = EnterKey::stdin();
    let mut failed = 0;

    for (i, name) in names.iter().enumerate() {
        let file = session.repo.entry(name)?;
        match orchestrator.decrypt(&file, cancel.child_token()).await {
            Outcome::Presented(presentation) => {
                let more = i + 1 < names.len();
                present(session, presentation, options, &mut enter, more).await
            }
            Outcome::Terminated(termination) => {
                report(&termination);
                failed += 1;
                if matches!(termination, Termination::Cancelled) {
                    // the user backed out; the rest count as not decrypted
                    failed += names.len() - i - 1;
                    break;
                }
            }
        }
    }

    Ok(failed)
}

async fn present(
    session: &Session,
    presentation: Presentation,
    options: ShowOptions,
    enter: &mut EnterKey,
    more: bool,
) {
    let prefs = &session.config.preferences;
    let entry = presentation.entry();

    let rendered = Zeroizing::new(render(
        presentation.file().name(),
        entry,
        prefs.show_password || options.reveal,
    ));
    print!("{}", rendered.as_str());

    if options.copy || prefs.copy_on_decrypt {
        copy_secret(entry);
    }

    let interactive = io::stdout().is_terminal() && io::stdin().is_terminal();
    if !interactive {
        debug!("not a terminal, leaving entry without countdown");
        return;
    }

    let notice = match presentation.timeout() {
        Some(timeout) => format!(
            "press Enter to close (closes in {}s)",
            timeout.as_secs()
        ),
        None => "press Enter to close".to_string(),
    };
    output::dimmed(&notice);

    let handle = presentation.exit_handle();
    let wait = presentation.wait();
    tokio::pin!(wait);
    let dismissal = tokio::select! {
        dismissal = &mut wait => dismissal,
        () = enter.pressed() => {
            handle.exit(ExitReason::Back);
            wait.await
        }
    };

    // rendered text, the notice, and the Enter keypress line
    let mut rows = output::rows(&rendered) + 1;
    if matches!(dismissal, Dismissal::Exited(_)) {
        rows += 1;
    }
    output::erase(rows);

    if dismissal == Dismissal::Expired {
        if more {
            // consume the read still waiting for Enter before the next prompt
            output::dimmed("entry closed after timeout, press Enter for the next entry");
            enter.pressed().await;
            output::erase(2);
        } else {
            output::dimmed("entry closed after timeout");
        }
    }
}

/// Waits for Enter on the terminal, with at most one read outstanding.
///
/// A read abandoned by a finished countdown stays pending and is the one
/// the next call waits on, so no stray reader competes for later input.
struct EnterKey {
    read: Arc<dyn Fn() + Send + Sync>,
    pending: Option<oneshot::Receiver<()>>,
}

impl EnterKey {
    fn new(read: Arc<dyn Fn() + Send + Sync>) -> Self {
        Self {
            read,
            pending: None,
        }
    }

    fn stdin() -> Self {
        Self::new(Arc::new(|| {
            let mut line = String::new();
            if let Err(e) = io::stdin().lock().read_line(&mut line) {
                debug!(error = %e, "failed to read Enter from stdin");
            }
        }))
    }

    /// Resolves once a line (or end of input) has been read.
    async fn pressed(&mut self) {
        let read = self.read.clone();
        let pending = self.pending.get_or_insert_with(|| {
            let (tx, rx) = oneshot::channel();
            std::thread::spawn(move || {
                read();
                let _ = tx.send(());
            });
            rx
        });
        // a dropped sender means the reader thread died; treat it as Enter
        let _ = pending.await;
        self.pending = None;
    }
}

/// Text block for one entry.
pub fn render(name: &str, entry: &DecryptedEntry, show_secret: bool) -> String {
    let mut out = format!("{}\n", output::path(name));

    match entry.secret() {
        Some(secret) if show_secret => {
            out.push_str(&format!("  password:  {}\n", output::secret(secret)))
        }
        Some(_) => out.push_str("  password:  ******** (use --reveal)\n"),
        None => {}
    }
    if let Some(username) = &entry.username {
        out.push_str(&format!("  username:  {}\n", username));
    }
    if let Some(otp) = &entry.otp {
        let code = otp.current();
        out.push_str(&format!(
            "  otp:       {} ({}s left)\n",
            code.code,
            code.remaining(Utc::now())
        ));
    }
    for field in &entry.extra_fields {
        if field.value.is_empty() {
            out.push_str(&format!("  {}\n", field.key));
        } else {
            out.push_str(&format!("  {}:  {}\n", field.key, field.value));
        }
    }

    out
}

fn copy_secret(entry: &DecryptedEntry) {
    let Some(secret) = entry.secret() else {
        output::warn("entry has no password to copy");
        return;
    };
    match clipboard::copy(secret) {
        Some(tool) => output::success(&format!("copied to clipboard ({})", tool)),
        None => output::warn("no clipboard tool available"),
    }
}

/// Print a terminated request: warnings distinct from failures.
pub fn report(termination: &Termination) {
    let message = termination.message();
    if termination.is_warning() {
        output::warn(&message);
        return;
    }

    output::error(&message);
    match termination {
        Termination::Resolution(_) => output::hint("fix the .gpg-id file for this directory"),
        Termination::ImportDeclined => output::hint("pwdstore import <keyfile>"),
        Termination::Engine(_) => output::hint("run with --verbose for details"),
        _ => {}
    }
}

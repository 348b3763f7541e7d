//! A decrypted entry on screen, with its auto-dismiss countdown.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::state::{Machine, State};
use crate::core::domain::{DecryptedEntry, PasswordFile};

/// Explicit ways the user leaves a presented entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Back,
    Edit,
    Share,
}

/// How a presentation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissal {
    /// The countdown ran out
    Expired,
    /// The user left; the countdown, if any, was cancelled
    Exited(ExitReason),
}

/// Lets the UI end a presentation from elsewhere.
#[derive(Debug, Clone)]
pub struct ExitHandle {
    tx: mpsc::UnboundedSender<ExitReason>,
}

impl ExitHandle {
    /// Request exit. Does nothing once the presentation has ended.
    pub fn exit(&self, reason: ExitReason) {
        let _ = self.tx.send(reason);
    }
}

/// Successful decrypt, waiting to be dismissed.
///
/// Dropping it wipes the entry's secret.
#[derive(Debug)]
pub struct Presentation {
    machine: Machine,
    file: PasswordFile,
    entry: DecryptedEntry,
    timeout: Option<Duration>,
    tx: mpsc::UnboundedSender<ExitReason>,
    rx: mpsc::UnboundedReceiver<ExitReason>,
}

impl Presentation {
    pub(super) fn new(
        machine: Machine,
        file: PasswordFile,
        entry: DecryptedEntry,
        timeout: Option<Duration>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            machine,
            file,
            entry,
            timeout,
            tx,
            rx,
        }
    }

    pub fn entry(&self) -> &DecryptedEntry {
        &self.entry
    }

    pub fn file(&self) -> &PasswordFile {
        &self.file
    }

    /// Countdown length, `None` when auto-dismiss is disabled
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn state(&self) -> State {
        self.machine.state()
    }

    pub fn exit_handle(&self) -> ExitHandle {
        ExitHandle {
            tx: self.tx.clone(),
        }
    }

    /// Arm the countdown and wait for it or an explicit exit.
    ///
    /// Without a timeout this waits only for an exit request.
    pub async fn wait(mut self) -> Dismissal {
        let dismissal = match self.timeout {
            Some(timeout) => {
                self.machine.advance(State::AutoDismissArmed);
                debug!(entry = %self.file, secs = timeout.as_secs(), "auto-dismiss armed");
                tokio::select! {
                    _ = tokio::time::sleep(timeout) => Dismissal::Expired,
                    reason = self.rx.recv() => Dismissal::Exited(reason.unwrap_or(ExitReason::Back)),
                }
            }
            None => Dismissal::Exited(self.rx.recv().await.unwrap_or(ExitReason::Back)),
        };

        match dismissal {
            Dismissal::Expired => info!(entry = %self.file, "entry auto-dismissed"),
            Dismissal::Exited(reason) => debug!(entry = %self.file, ?reason, "entry closed"),
        }
        self.machine.advance(State::Terminated);
        dismissal
    }
}

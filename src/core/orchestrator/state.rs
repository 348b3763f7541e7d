//! Decrypt request states.

use std::fmt;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error};

/// Where a decrypt request currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Idle,
    /// No secret keys exist; waiting on the key-import side journey
    AwaitingKeyImport,
    ResolvingIdentifiers,
    AwaitingPassphrase,
    Decrypting,
    Presenting,
    /// Presenting with the auto-dismiss countdown running
    AutoDismissArmed,
    Terminated,
}

impl State {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: State) -> bool {
        use State::*;

        matches!(
            (self, next),
            (Idle, AwaitingKeyImport)
                | (Idle, ResolvingIdentifiers)
                | (AwaitingKeyImport, ResolvingIdentifiers)
                | (ResolvingIdentifiers, AwaitingPassphrase)
                | (AwaitingPassphrase, Decrypting)
                | (Decrypting, AwaitingPassphrase)
                | (Decrypting, Presenting)
                | (Presenting, AutoDismissArmed)
                | (_, Terminated)
        ) && self != Terminated
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingKeyImport => "awaiting-key-import",
            Self::ResolvingIdentifiers => "resolving-identifiers",
            Self::AwaitingPassphrase => "awaiting-passphrase",
            Self::Decrypting => "decrypting",
            Self::Presenting => "presenting",
            Self::AutoDismissArmed => "auto-dismiss-armed",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// State holder for one request.
///
/// Every transition is logged and, when a listener is attached, published
/// in the order it happened.
#[derive(Debug)]
pub struct Machine {
    entry: String,
    state: State,
    listener: Option<UnboundedSender<State>>,
}

impl Machine {
    pub fn new(entry: impl Into<String>, listener: Option<UnboundedSender<State>>) -> Self {
        Self {
            entry: entry.into(),
            state: State::Idle,
            listener,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Move to `next`.
    pub fn advance(&mut self, next: State) {
        if !self.state.can_advance_to(next) {
            error!(entry = %self.entry, from = %self.state, to = %next, "illegal transition");
            debug_assert!(false, "illegal transition {} -> {}", self.state, next);
            return;
        }

        debug!(entry = %self.entry, from = %self.state, to = %next, "transition");
        self.state = next;
        if let Some(listener) = &self.listener {
            // a dropped receiver only means nobody is watching
            let _ = listener.send(next);
        }
    }
}

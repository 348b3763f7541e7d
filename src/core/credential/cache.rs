//! Single-slot passphrase cache.

use std::sync::Mutex;

use tracing::debug;

use crate::core::domain::Passphrase;

/// Process-wide passphrase cache: one slot, last write wins.
///
/// Shared by every decrypt request in the process. Implementations must be
/// safe to call from several threads.
pub trait PassphraseCache: Send + Sync {
    /// Cached passphrase, if caching is enabled and a value is stored.
    fn get(&self) -> Option<Passphrase>;

    /// Replace the stored value. Ignored while caching is disabled.
    fn put(&self, passphrase: Passphrase);

    /// Drop the stored value, keeping caching enabled.
    fn invalidate(&self);

    /// Drop the stored value and stop caching until re-enabled.
    fn disable(&self);

    fn enable(&self);

    fn is_enabled(&self) -> bool;
}

#[derive(Debug)]
struct Slot {
    enabled: bool,
    value: Option<Passphrase>,
}

/// In-memory cache guarded by a mutex.
#[derive(Debug)]
pub struct MemoryCache {
    slot: Mutex<Slot>,
}

impl MemoryCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            slot: Mutex::new(Slot {
                enabled,
                value: None,
            }),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PassphraseCache for MemoryCache {
    fn get(&self) -> Option<Passphrase> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if slot.enabled {
            slot.value.clone()
        } else {
            None
        }
    }

    fn put(&self, passphrase: Passphrase) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if slot.enabled {
            slot.value = Some(passphrase);
            debug!("passphrase cached");
        }
    }

    fn invalidate(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if slot.value.take().is_some() {
            debug!("cached passphrase invalidated");
        }
    }

    fn disable(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        // dropping the Passphrase zeroizes it
        slot.value = None;
        slot.enabled = false;
        debug!("passphrase cache disabled");
    }

    fn enable(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.enabled = true;
    }

    fn is_enabled(&self) -> bool {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).enabled
    }
}

//! Decryption engine adapter.
//!
//! The engine itself is an external collaborator. This module only fixes
//! the contract and the three-way failure classification the decrypt
//! pipeline branches on:
//!
//! - [`CryptoError::WrongPassphrase`]: retryable, covers bad MDC too
//! - [`CryptoError::NonStandardAead`]: structural warning, terminal
//! - [`CryptoError::Engine`]: anything else, terminal and logged
//!
//! ## Adding a New Engine
//!
//! 1. Implement the `Engine` trait
//! 2. Map every failure onto one of the three kinds above
//! 3. Re-export from this module

use zeroize::Zeroizing;

use crate::core::domain::{Identifier, Passphrase};
use crate::error::CryptoError;

mod gpg;
pub mod packet;

pub use gpg::{classify_status, GpgEngine};

/// Cryptographic engine contract.
///
/// Implementations block; callers run them off the control thread.
pub trait Engine: Send + Sync {
    /// Decrypt `ciphertext` for `recipients`.
    ///
    /// `passphrase` is `None` when the recipient keys are not protected.
    fn decrypt(
        &self,
        passphrase: Option<&Passphrase>,
        recipients: &[Identifier],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError>;

    /// Engine name for logs.
    fn name(&self) -> &'static str;
}

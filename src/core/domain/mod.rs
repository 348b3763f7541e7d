//! Domain types.

mod entry;
pub mod identifier;
pub mod otp;
mod passphrase;
mod path;

pub use entry::{DecryptedEntry, ExtraField};
pub use identifier::{Identifier, KeyId, MarkerLine};
pub use otp::{OtpCode, OtpConfig};
pub use passphrase::Passphrase;
pub use path::{PasswordFile, RepositoryPath};

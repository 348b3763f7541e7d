//! pwdstore - Decrypt entries from a GnuPG password store.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── show          # Decrypt and display entries
//! │   ├── otp           # One-time codes
//! │   ├── list          # Entry listing
//! │   ├── recipients    # .gpg-id resolution report
//! │   ├── config        # Preference get/set
//! │   ├── import        # Key import
//! │   ├── prompt        # Terminal passphrase prompt
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── config        # config.toml and preferences
//!     ├── domain/       # Identifiers, paths, entries, OTP
//!     ├── resolver      # .gpg-id lookup and classification
//!     ├── credential/   # Passphrase cache and source
//!     ├── cipher/       # Engine trait, gpg adapter, packet inspection
//!     ├── keystore      # Keyring queries
//!     ├── store/        # Storage trait and filesystem implementation
//!     └── orchestrator/ # Decrypt request state machine
//! ```
//!
//! # Features
//!
//! - Fail-closed recipient resolution from `.gpg-id` files
//! - Passphrase caching with bounded retry
//! - Refuses non-standard AEAD messages with a distinct warning
//! - pass-compatible entry parsing with TOTP support
//! - Auto-dismiss of decrypted entries

pub mod cli;
pub mod core;
pub mod error;

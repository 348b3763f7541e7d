//! Error types.
//!
//! One enum per concern, wrapped by the top-level [`Error`].

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error for library and CLI operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} has no OTP configured")]
    NoOtp(String),

    #[error("{failed} of {total} entries could not be decrypted")]
    Incomplete { failed: usize, total: usize },
}

/// Configuration file and preference errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("unknown preference: {0}")]
    UnknownPreference(String),

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("unable to determine {0} directory")]
    NoDirectory(&'static str),
}

/// Storage collaborator errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The file does not exist. Recoverable by the caller.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to list {path}: {reason}")]
    List { path: PathBuf, reason: String },
}

/// Repository path and password file errors.
#[derive(Error, Debug)]
pub enum PathError {
    #[error("password store not found at {}", .0.display())]
    MissingRepository(PathBuf),

    #[error("{} is not inside the password store", .0.display())]
    OutsideRepository(PathBuf),

    #[error("invalid entry name: {0}")]
    InvalidName(String),
}

/// `.gpg-id` resolution failures.
///
/// Each variant selects a distinct diagnostic. Resolution never partially
/// succeeds.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("{} is outside the password store", .0.display())]
    OutsideRepository(PathBuf),

    #[error("no .gpg-id found between {} and the store root", .0.display())]
    MarkerMissing(PathBuf),

    #[error("{} lists no key ids", .marker.display())]
    NoIdsPresent { marker: PathBuf },

    #[error("{} uses {count} short key id(s); use long key ids or fingerprints", .marker.display())]
    AllShort { marker: PathBuf, count: usize },

    #[error("{} has {count} invalid or unknown key id(s)", .marker.display())]
    AllInvalid { marker: PathBuf, count: usize },

    #[error("{} has {short} short and {invalid} invalid key id(s)", .marker.display())]
    Mixed {
        marker: PathBuf,
        short: usize,
        invalid: usize,
    },

    #[error("failed to read {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    #[error("key store query failed: {0}")]
    KeyStore(#[from] KeyStoreError),
}

/// Key store collaborator errors.
#[derive(Error, Debug)]
pub enum KeyStoreError {
    #[error("{0} not found. Install GnuPG from https://gnupg.org/download/")]
    Unavailable(String),

    #[error("key listing failed: {0}")]
    Query(String),

    #[error("key import failed: {0}")]
    Import(String),
}

/// Classified failures of the cryptographic engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Wrong passphrase or failed integrity check. Retryable.
    #[error("wrong passphrase")]
    WrongPassphrase,

    /// The message uses an AEAD construction the engine will not decrypt safely.
    #[error("non-standard AEAD encryption: {0}")]
    NonStandardAead(String),

    /// Any other backend failure.
    #[error("decryption failed: {0}")]
    Engine(String),
}

pub type Result<T> = std::result::Result<T, Error>;

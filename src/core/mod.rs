//! Core library components.
//!
//! The decryption pipeline and the collaborators it talks to: storage,
//! key store, passphrase source and cryptographic engine.

pub mod cipher;
pub mod config;
pub mod constants;
pub mod credential;
pub mod domain;
pub mod gpg;
pub mod keystore;
pub mod orchestrator;
pub mod resolver;
pub mod store;

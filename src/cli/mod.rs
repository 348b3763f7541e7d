//! Command-line interface.

pub mod clipboard;
pub mod completions;
pub mod config;
pub mod import;
pub mod list;
pub mod otp;
pub mod output;
pub mod prompt;
pub mod recipients;
pub mod session;
pub mod show;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::constants;

/// pwdstore - Decrypt entries from a GnuPG password store.
#[derive(Parser)]
#[command(
    name = "pwdstore",
    about = "Decrypt entries from a Git-versioned, GnuPG-encrypted password store",
    version
)]
pub struct Cli {
    /// Password store directory
    #[arg(long, global = true, env = constants::STORE_DIR_ENV)]
    pub store: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Decrypt and show one or more entries
    Show {
        /// Entry names (e.g., web/github)
        #[arg(required = true)]
        names: Vec<String>,
        /// Print the password even if show_password is off
        #[arg(short, long)]
        reveal: bool,
        /// Copy the password to the clipboard
        #[arg(short, long)]
        copy: bool,
    },

    /// Print the current one-time code of an entry
    Otp {
        /// Entry name
        name: String,
        /// Copy the code to the clipboard
        #[arg(short, long)]
        copy: bool,
    },

    /// List entries
    Ls {
        /// Only list below this directory
        subdir: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the keys an entry is encrypted for
    Recipients {
        /// Entry name
        name: String,
    },

    /// Read or change preferences
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Import a key file into the GnuPG keyring
    Import {
        /// Exported key file
        path: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print a preference
    Get {
        /// Preference name
        key: String,
    },

    /// Set a preference
    Set {
        /// Preference name
        key: String,
        /// New value
        value: String,
    },

    /// List all preferences
    List,
}

/// Execute a command.
pub fn execute(command: Command, store: Option<PathBuf>) -> crate::error::Result<()> {
    use Command::*;

    match command {
        Show {
            names,
            reveal,
            copy,
        } => show::execute(store, &names, show::ShowOptions { reveal, copy }),
        Otp { name, copy } => otp::execute(store, &name, copy),
        Ls { subdir, json } => list::execute(store, subdir.as_deref(), json),
        Recipients { name } => recipients::execute(store, &name),
        Config { action } => match action {
            ConfigAction::Get { key } => config::get(&key),
            ConfigAction::Set { key, value } => config::set(&key, &value),
            ConfigAction::List => config::list(),
        },
        Import { path } => import::execute(&path),
        Completions { shell } => completions::execute(shell),
    }
}

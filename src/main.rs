//! pwdstore - Decrypt entries from a GnuPG password store.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pwdstore::cli::output;
use pwdstore::cli::{execute, Cli};
use pwdstore::error::{Error, KeyStoreError, PathError};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env("PWDSTORE_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("pwdstore=debug")
        } else {
            EnvFilter::new("pwdstore=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(cli.command, cli.store) {
        // Format error with suggestion if available
        let suggestion = match &e {
            Error::Path(PathError::MissingRepository(_)) => {
                Some("set PWDSTORE_DIR or run: pwdstore config list")
            }
            Error::KeyStore(KeyStoreError::Unavailable(_)) => Some("install GnuPG"),
            Error::Path(PathError::InvalidName(_)) => Some("run: pwdstore ls"),
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}

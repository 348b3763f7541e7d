//! OTP command.
//!
//! Decrypts an entry and prints its current one-time code.

use std::path::PathBuf;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::cli::session::{self, Session};
use crate::cli::{clipboard, output, show};
use crate::core::orchestrator::Outcome;
use crate::error::{Error, Result};

/// Print the current code for `name`.
pub fn execute(store: Option<PathBuf>, name: &str, copy: bool) -> Result<()> {
    let session = Session::open(store)?;
    let orchestrator = session.orchestrator();
    let file = session.repo.entry(name)?;
    let runtime = session::runtime()?;

    let outcome = runtime.block_on(orchestrator.decrypt(&file, CancellationToken::new()));
    let presentation = match outcome {
        Outcome::Presented(presentation) => presentation,
        Outcome::Terminated(termination) => {
            show::report(&termination);
            return Err(Error::Incomplete {
                failed: 1,
                total: 1,
            });
        }
    };

    let otp = presentation
        .entry()
        .otp
        .as_ref()
        .ok_or_else(|| Error::NoOtp(file.name().to_string()))?;

    let now = Utc::now();
    let code = otp.code_at(now);
    println!("{}", code.code);
    output::dimmed(&format!("valid for {}s", code.remaining(now)));

    if copy {
        match clipboard::copy(&code.code) {
            Some(tool) => output::success(&format!("copied to clipboard ({})", tool)),
            None => output::warn("no clipboard tool available"),
        }
    }
    Ok(())
}

//! Import command.

use std::path::Path;

use crate::cli::output;
use crate::core::config::Config;
use crate::core::gpg::Gpg;
use crate::core::keystore::GpgKeyring;
use crate::error::Result;

/// Import keys from `path` into the keyring.
pub fn execute(path: &Path) -> Result<()> {
    let config = Config::load()?;
    let gpg = Gpg::new(&config.gpg);
    gpg.check()?;

    let imported = GpgKeyring::new(gpg).import(path)?;
    if imported == 0 {
        output::warn("no new keys imported");
    } else {
        output::success(&format!("imported {} key(s)", imported));
    }
    Ok(())
}

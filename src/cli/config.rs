//! Config command.
//!
//! Reads and writes preferences in `config.toml`.

use crate::cli::output;
use crate::core::config::{Config, PREFERENCE_KEYS};
use crate::error::Result;

/// Print one preference.
pub fn get(key: &str) -> Result<()> {
    let config = Config::load()?;
    println!("{}", config.preferences.get(key)?);
    Ok(())
}

/// Update one preference and save.
pub fn set(key: &str, value: &str) -> Result<()> {
    let path = Config::default_path()?;
    let mut config = Config::load_from(&path)?;
    config.preferences.set(key, value)?;
    config.save_to(&path)?;

    output::success(&format!("{} = {}", key, config.preferences.get(key)?));
    Ok(())
}

/// Print every preference and where the file lives.
pub fn list() -> Result<()> {
    let path = Config::default_path()?;
    let config = Config::load_from(&path)?;

    output::header("Preferences");
    output::rule();
    for key in PREFERENCE_KEYS {
        output::kv(key, config.preferences.get(key)?);
    }
    output::kv("store", config.store_path()?.display());
    output::dimmed(&path.display().to_string());
    Ok(())
}

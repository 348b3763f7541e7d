//! Configuration file management.
//!
//! Handles reading and writing `config.toml`, which doubles as the
//! preference store for the decryption pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// Settings stored in `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Password store location
    #[serde(default)]
    pub store: StoreConfig,
    /// GnuPG invocation settings
    #[serde(default)]
    pub gpg: GpgConfig,
    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

/// `[store]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Repository root. Defaults to `~/.password-store`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// `[gpg]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpgConfig {
    #[serde(default = "default_gpg_binary")]
    pub binary: String,
    #[serde(default = "default_agent_binary")]
    pub agent_binary: String,
    /// Alternate GnuPG home directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homedir: Option<PathBuf>,
}

fn default_gpg_binary() -> String {
    "gpg".to_string()
}

fn default_agent_binary() -> String {
    "gpg-connect-agent".to_string()
}

impl Default for GpgConfig {
    fn default() -> Self {
        Self {
            binary: default_gpg_binary(),
            agent_binary: default_agent_binary(),
            homedir: None,
        }
    }
}

/// `[preferences]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Keep the last passphrase in memory for the rest of the process
    #[serde(default = "default_true")]
    pub passphrase_cache: bool,
    /// Seconds a decrypted entry stays visible; 0 disables the countdown
    #[serde(default = "default_auto_dismiss")]
    pub auto_dismiss_secs: u64,
    #[serde(default = "default_true")]
    pub show_password: bool,
    #[serde(default)]
    pub copy_on_decrypt: bool,
}

fn default_true() -> bool {
    true
}

fn default_auto_dismiss() -> u64 {
    constants::DEFAULT_AUTO_DISMISS_SECS
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            passphrase_cache: true,
            auto_dismiss_secs: constants::DEFAULT_AUTO_DISMISS_SECS,
            show_password: true,
            copy_on_decrypt: false,
        }
    }
}

/// Preference names accepted by `get`/`set`.
pub const PREFERENCE_KEYS: &[&str] = &[
    "passphrase_cache",
    "auto_dismiss_secs",
    "show_password",
    "copy_on_decrypt",
];

impl Preferences {
    /// Auto-dismiss countdown, `None` when disabled.
    pub fn auto_dismiss(&self) -> Option<Duration> {
        match self.auto_dismiss_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Read a preference by name.
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "passphrase_cache" => self.passphrase_cache.to_string(),
            "auto_dismiss_secs" => self.auto_dismiss_secs.to_string(),
            "show_password" => self.show_password.to_string(),
            "copy_on_decrypt" => self.copy_on_decrypt.to_string(),
            other => return Err(ConfigError::UnknownPreference(other.to_string()).into()),
        };
        Ok(value)
    }

    /// Set a preference by name from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "passphrase_cache" => self.passphrase_cache = parse_bool("passphrase_cache", value)?,
            "auto_dismiss_secs" => {
                let secs = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "auto_dismiss_secs",
                    reason: format!("expected a non-negative integer, got '{}'", value),
                })?;
                self.auto_dismiss_secs = secs;
            }
            "show_password" => self.show_password = parse_bool("show_password", value)?,
            "copy_on_decrypt" => self.copy_on_decrypt = parse_bool("copy_on_decrypt", value)?,
            other => return Err(ConfigError::UnknownPreference(other.to_string()).into()),
        }
        debug!(key, "preference updated");
        Ok(())
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            reason: format!("expected true or false, got '{}'", value),
        }
        .into()),
    }
}

impl Config {
    /// Path to the configuration file.
    ///
    /// `$PWDSTORE_CONFIG` wins over `<config_dir>/pwdstore/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(constants::CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let dir = dirs::config_dir().ok_or(ConfigError::NoDirectory("config"))?;
        Ok(dir.join(constants::CONFIG_DIR).join(constants::CONFIG_FILE))
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load configuration from `path`, using defaults when the file is absent.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the TOML is malformed.
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");

        if !path.exists() {
            debug!("no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;

        debug!(
            passphrase_cache = config.preferences.passphrase_cache,
            auto_dismiss_secs = config.preferences.auto_dismiss_secs,
            "config loaded"
        );

        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "saving config");

        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        let write_err = |source| ConfigError::WriteFile {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, contents).map_err(write_err)?;

        Ok(())
    }

    /// Repository root: `$PWDSTORE_DIR`, then `[store] path`, then `~/.password-store`.
    pub fn store_path(&self) -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(constants::STORE_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }
        if let Some(path) = &self.store.path {
            return Ok(expand_home(path));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoDirectory("home"))?;
        Ok(home.join(constants::DEFAULT_STORE_DIR))
    }
}

/// Expand a leading `~/` against the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

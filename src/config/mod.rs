//! Configuration: the settings file and per-user default locations.

pub mod settings;

use std::path::PathBuf;

use crate::errors::{EnvRefError, Result};

pub use settings::Settings;

/// Application directory name under the platform config dir.
const APP_DIR: &str = "envref";

/// File name of the default vault database.
const VAULT_FILE: &str = "vault.db";

/// `<config dir>/envref`, e.g. `~/.config/envref` on Linux.
pub fn default_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or_else(|| {
            EnvRefError::ConfigError("cannot determine the user config directory".into())
        })
}

/// `<config dir>/envref/vault.db`.
pub fn default_vault_path() -> Result<PathBuf> {
    Ok(default_config_dir()?.join(VAULT_FILE))
}

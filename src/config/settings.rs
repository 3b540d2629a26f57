use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::Argon2Params;
use crate::errors::{EnvRefError, Result};

use super::{default_config_dir, default_vault_path};

/// User-level configuration, loaded from `<config dir>/envref/config.toml`.
///
/// Every field has a sensible default so envref works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Override for the vault database location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_path: Option<PathBuf>,

    /// Argon2 memory cost in KiB for newly sealed values (default: 19 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 2).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 1).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_argon2_memory_kib() -> u32 {
    Argon2Params::vault().memory_kib
}

fn default_argon2_iterations() -> u32 {
    Argon2Params::vault().iterations
}

fn default_argon2_parallelism() -> u32 {
    Argon2Params::vault().parallelism
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_path: None,
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file inside the config directory.
    pub const FILE_NAME: &'static str = "config.toml";

    /// Load settings from the default location.
    pub fn load_default() -> Result<Self> {
        Self::load(&default_config_dir()?.join(Self::FILE_NAME))
    }

    /// Load settings from `path`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            EnvRefError::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })?;

        settings.argon2_params().validate().map_err(|e| {
            EnvRefError::ConfigError(format!("{}: {e}", path.display()))
        })?;

        Ok(settings)
    }

    /// The configured vault path, or the per-user default.
    pub fn vault_path(&self) -> Result<PathBuf> {
        match &self.vault_path {
            Some(path) => Ok(path.clone()),
            None => default_vault_path(),
        }
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_use_vault_work_factor() {
        let s = Settings::default();
        assert!(s.vault_path.is_none());
        assert_eq!(s.argon2_params(), Argon2Params::vault());
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(settings.argon2_iterations, 2);
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
vault_path = "/srv/secrets/vault.db"
argon2_memory_kib = 32768
argon2_iterations = 3
argon2_parallelism = 2
"#;
        let path = tmp.path().join("config.toml");
        fs::write(&path, config).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(
            settings.vault_path().unwrap(),
            PathBuf::from("/srv/secrets/vault.db")
        );
        assert_eq!(settings.argon2_memory_kib, 32_768);
        assert_eq!(settings.argon2_iterations, 3);
        assert_eq!(settings.argon2_parallelism, 2);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "argon2_iterations = 4\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.argon2_iterations, 4);
        assert_eq!(settings.argon2_memory_kib, 19_456);
        assert!(settings.vault_path.is_none());
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "not valid {{toml").unwrap();
        assert!(Settings::load(&path).is_err());
    }

    #[test]
    fn load_errors_on_weak_kdf() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "argon2_memory_kib = 1024\n").unwrap();
        assert!(matches!(
            Settings::load(&path),
            Err(EnvRefError::ConfigError(_))
        ));
    }
}

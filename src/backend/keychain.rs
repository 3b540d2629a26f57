//! OS keychain backend.
//!
//! Stores values in the operating system's credential store:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring / KDE Wallet)
//!
//! Entries live under the `envref` service with the secret key as the
//! account name.  The platform stores cannot be enumerated portably, so
//! `list` is unsupported.

use crate::errors::{EnvRefError, Result};

use super::Backend;

/// Service name used in the OS keyring.
const SERVICE_NAME: &str = "envref";

/// Backend for the OS credential store.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeychainBackend;

impl KeychainBackend {
    pub fn new() -> Self {
        Self
    }

    fn entry(key: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(SERVICE_NAME, key)
            .map_err(|e| EnvRefError::KeyringError(format!("failed to create keyring entry: {e}")))
    }
}

impl Backend for KeychainBackend {
    fn name(&self) -> &str {
        "keychain"
    }

    fn get(&self, key: &str) -> Result<String> {
        match Self::entry(key)?.get_password() {
            Ok(value) => Ok(value),
            Err(keyring::Error::NoEntry) => Err(EnvRefError::SecretNotFound(key.to_string())),
            Err(e) => Err(EnvRefError::KeyringError(format!(
                "failed to read '{key}' from keyring: {e}"
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::entry(key)?.set_password(value).map_err(|e| {
            EnvRefError::KeyringError(format!("failed to store '{key}' in keyring: {e}"))
        })
    }

    fn delete(&self, key: &str) -> Result<()> {
        match Self::entry(key)?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Err(EnvRefError::SecretNotFound(key.to_string())),
            Err(e) => Err(EnvRefError::KeyringError(format!(
                "failed to delete '{key}' from keyring: {e}"
            ))),
        }
    }

    fn list(&self) -> Result<Vec<String>> {
        Err(EnvRefError::Unsupported(
            "the keychain backend cannot enumerate its entries".into(),
        ))
    }
}

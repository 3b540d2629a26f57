//! The capability contract every secret backend fulfills.
//!
//! The resolver and CLI only see `dyn Backend`; they know nothing about
//! encryption, locking, or export formats.

#[cfg(feature = "keyring-store")]
pub mod keychain;

use crate::errors::Result;
use crate::vault::Vault;

#[cfg(feature = "keyring-store")]
pub use keychain::KeychainBackend;

/// A named key-value secret source.
pub trait Backend {
    /// Name used in `ref://<name>/...` references.
    fn name(&self) -> &str;

    /// Fetch a value; `SecretNotFound` when the key is absent.
    fn get(&self, key: &str) -> Result<String>;

    /// Store a value, replacing any existing one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value; `SecretNotFound` when the key is absent.
    fn delete(&self, key: &str) -> Result<()>;

    /// Every key, sorted.
    fn list(&self) -> Result<Vec<String>>;
}

impl Backend for Vault {
    fn name(&self) -> &str {
        "vault"
    }

    fn get(&self, key: &str) -> Result<String> {
        Vault::get(self, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Vault::set(self, key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        Vault::delete(self, key)
    }

    fn list(&self) -> Result<Vec<String>> {
        Vault::list(self)
    }
}

//! The `Vault` handle: lifecycle state machine and secret operations.
//!
//! ```text
//! NotInitialized ──initialize──▶ Unlocked ◀──unlock/lock──▶ Locked
//! ```
//!
//! Passphrase correctness is proven with a verification token: at
//! `initialize` a fixed plaintext is sealed under the passphrase and
//! stored in `metadata`; `verify_passphrase` opens it and compares.  The
//! passphrase itself is never written anywhere.
//!
//! Every public method takes the single vault mutex for its whole run,
//! store I/O included.  Cross-process contention is left to SQLite's
//! WAL mode and busy timeout (see `store`).
//!
//! `close` is terminal: it wipes the passphrase and drops the
//! connection, and every later call fails with `VaultClosed`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::config::default_vault_path;
use crate::crypto::{self, Argon2Params};
use crate::errors::{EnvRefError, Result};

use super::export::VaultExport;
use super::secret_buffer::SecretBuffer;
use super::store::Store;

/// Metadata key holding the sealed verification plaintext.
const META_VERIFICATION: &str = "verification_token";

/// Metadata key holding the lock flag (`"true"` when locked, absent otherwise).
const META_LOCKED: &str = "locked";

/// The fixed plaintext sealed into the verification token.
const VERIFICATION_PLAINTEXT: &[u8] = b"envref-vault-verification-v1";

/// A passphrase-protected secret vault backed by one SQLite file.
pub struct Vault {
    path: PathBuf,
    inner: Mutex<Inner>,
}

struct Inner {
    passphrase: SecretBuffer,
    store: Store,
    kdf: Argon2Params,
}

impl Vault {
    /// Create a vault handle.  Nothing touches the disk until the first call.
    ///
    /// `path` defaults to `<config dir>/envref/vault.db`.
    pub fn new(passphrase: &[u8], path: Option<&Path>) -> Result<Self> {
        if passphrase.is_empty() {
            return Err(EnvRefError::EmptyPassphrase);
        }
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_vault_path()?,
        };

        Ok(Self {
            inner: Mutex::new(Inner {
                passphrase: SecretBuffer::new(passphrase),
                store: Store::new(&path),
                kdf: Argon2Params::vault(),
            }),
            path,
        })
    }

    /// Use `params` when sealing new values.  Existing values keep the
    /// parameters recorded in their own envelopes.
    pub fn with_kdf_params(mut self, params: Argon2Params) -> Self {
        if let Ok(inner) = self.inner.get_mut() {
            inner.kdf = params;
        }
        self
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Seal and store the verification token.  Fails if one already exists.
    pub fn initialize(&self) -> Result<()> {
        let mut inner = self.lock_inner()?;
        if inner.store.get_meta(META_VERIFICATION)?.is_some() {
            return Err(EnvRefError::AlreadyInitialized);
        }
        let token = inner.seal(VERIFICATION_PLAINTEXT)?;
        inner.store.put_meta(META_VERIFICATION, &token)?;
        tracing::info!(path = %self.path.display(), "vault initialized");
        Ok(())
    }

    /// Check that the held passphrase opens this vault.
    pub fn verify_passphrase(&self) -> Result<()> {
        self.lock_inner()?.verify()
    }

    /// Set the lock flag.  Requires the correct passphrase.
    pub fn lock(&self) -> Result<()> {
        let mut inner = self.lock_inner()?;
        inner.verify()?;
        if inner.is_locked()? {
            return Err(EnvRefError::VaultLocked);
        }
        inner.store.put_meta(META_LOCKED, "true")?;
        tracing::info!(path = %self.path.display(), "vault locked");
        Ok(())
    }

    /// Clear the lock flag.  Requires the correct passphrase.
    pub fn unlock(&self) -> Result<()> {
        let mut inner = self.lock_inner()?;
        inner.verify()?;
        if !inner.is_locked()? {
            return Err(EnvRefError::VaultNotLocked);
        }
        inner.store.delete_meta(META_LOCKED)?;
        tracing::info!(path = %self.path.display(), "vault unlocked");
        Ok(())
    }

    pub fn is_locked(&self) -> Result<bool> {
        self.lock_inner()?.is_locked()
    }

    pub fn is_initialized(&self) -> Result<bool> {
        Ok(self
            .lock_inner()?
            .store
            .get_meta(META_VERIFICATION)?
            .is_some())
    }

    /// Wipe the passphrase and release the database.  Idempotent; the
    /// handle is unusable afterwards.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock().map_err(|_| poisoned())?;
        if !inner.passphrase.is_empty() {
            tracing::debug!(path = %self.path.display(), "closing vault");
        }
        inner.passphrase.clear();
        inner.store.close();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Secrets
    // ------------------------------------------------------------------

    /// Decrypt and return the value stored under `key`.
    pub fn get(&self, key: &str) -> Result<String> {
        validate_key(key)?;
        let mut inner = self.lock_inner()?;
        inner.ensure_unlocked()?;

        let envelope = inner
            .store
            .get_secret(key)?
            .ok_or_else(|| EnvRefError::SecretNotFound(key.to_string()))?;
        inner.open_value(key, &envelope)
    }

    /// Encrypt `value` and store it under `key`, replacing any old value.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        let mut inner = self.lock_inner()?;
        inner.ensure_unlocked()?;

        let envelope = inner.seal(value.as_bytes())?;
        inner.store.put_secret(key, &envelope)?;
        tracing::debug!(key, "secret stored");
        Ok(())
    }

    /// Remove `key`.  Fails with `SecretNotFound` if nothing was deleted.
    pub fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let mut inner = self.lock_inner()?;
        inner.ensure_unlocked()?;

        if inner.store.delete_secret(key)? == 0 {
            return Err(EnvRefError::SecretNotFound(key.to_string()));
        }
        tracing::debug!(key, "secret deleted");
        Ok(())
    }

    /// All keys in lexicographic order.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut inner = self.lock_inner()?;
        inner.ensure_unlocked()?;
        inner.store.list_keys()
    }

    // ------------------------------------------------------------------
    // Export / import
    // ------------------------------------------------------------------

    /// Decrypt every secret into a plaintext export.
    pub fn export(&self) -> Result<VaultExport> {
        let mut inner = self.lock_inner()?;
        inner.verify()?;
        inner.ensure_unlocked()?;

        let rows = inner.store.all_secrets()?;
        let mut secrets = BTreeMap::new();
        for (key, envelope) in rows {
            let value = inner.open_value(&key, &envelope)?;
            secrets.insert(key, value);
        }

        tracing::info!(count = secrets.len(), "vault exported");
        Ok(VaultExport::new(secrets))
    }

    /// `export` serialized as pretty JSON.
    pub fn export_json(&self) -> Result<String> {
        self.export()?.to_json()
    }

    /// Re-encrypt and upsert every entry of `export` under this vault's
    /// passphrase.  Existing keys are overwritten.  Returns the count.
    pub fn import(&self, export: &VaultExport) -> Result<usize> {
        let mut inner = self.lock_inner()?;
        inner.ensure_unlocked()?;
        export.check_version()?;

        let mut rows = Vec::with_capacity(export.len());
        for (key, value) in &export.secrets {
            validate_key(key)?;
            rows.push((key.clone(), inner.seal(value.as_bytes())?));
        }

        let count = inner.store.put_secrets(&rows)?;
        tracing::info!(count, "vault imported");
        Ok(count)
    }

    /// Parse export JSON and `import` it.
    pub fn import_json(&self, json: &str) -> Result<usize> {
        let export = VaultExport::from_json(json)?;
        self.import(&export)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Take the vault mutex, failing if the handle has been closed.
    fn lock_inner(&self) -> Result<MutexGuard<'_, Inner>> {
        let inner = self.inner.lock().map_err(|_| poisoned())?;
        if inner.passphrase.is_empty() {
            return Err(EnvRefError::VaultClosed);
        }
        Ok(inner)
    }
}

impl Drop for Vault {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl Inner {
    fn seal(&self, plaintext: &[u8]) -> Result<String> {
        crypto::seal(plaintext, self.passphrase.as_bytes(), &self.kdf)
    }

    fn open_value(&self, key: &str, envelope: &str) -> Result<String> {
        let mut plaintext = crypto::open(envelope, self.passphrase.as_bytes())
            .map_err(|_| EnvRefError::SecretUnreadable(key.to_string()))?;

        // Move the bytes out so the String owns the only copy.
        let bytes = std::mem::take(&mut *plaintext);
        String::from_utf8(bytes).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            EnvRefError::SerializationError(format!("secret '{key}' is not valid UTF-8"))
        })
    }

    fn verify(&mut self) -> Result<()> {
        let token = self
            .store
            .get_meta(META_VERIFICATION)?
            .ok_or(EnvRefError::NotInitialized)?;

        let recovered = crypto::open(&token, self.passphrase.as_bytes())
            .map_err(|_| EnvRefError::WrongPassphrase)?;

        if bool::from(recovered.as_slice().ct_eq(VERIFICATION_PLAINTEXT)) {
            Ok(())
        } else {
            Err(EnvRefError::WrongPassphrase)
        }
    }

    fn is_locked(&mut self) -> Result<bool> {
        Ok(self.store.get_meta(META_LOCKED)?.as_deref() == Some("true"))
    }

    fn ensure_unlocked(&mut self) -> Result<()> {
        if self.is_locked()? {
            return Err(EnvRefError::VaultLocked);
        }
        Ok(())
    }
}

fn poisoned() -> EnvRefError {
    EnvRefError::Storage("vault mutex poisoned by a panicked caller".into())
}

/// The only key the vault refuses is the empty one.  Length and
/// character rules for typed keys live in the CLI, so any key another
/// producer wrote round-trips through get, delete and import.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(EnvRefError::InvalidKey("key cannot be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vault(dir: &TempDir, passphrase: &[u8]) -> Vault {
        Vault::new(passphrase, Some(&dir.path().join("vault.db")))
            .unwrap()
            .with_kdf_params(Argon2Params::minimum())
    }

    #[test]
    fn empty_passphrase_is_rejected() {
        assert!(matches!(
            Vault::new(b"", Some(Path::new("/tmp/x.db"))),
            Err(EnvRefError::EmptyPassphrase)
        ));
    }

    #[test]
    fn construction_does_no_io() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub").join("vault.db");
        let _vault = Vault::new(b"pw", Some(&path)).unwrap();
        assert!(!path.exists());
        assert!(!dir.path().join("sub").exists());
    }

    #[test]
    fn only_the_empty_key_is_invalid() {
        assert!(validate_key("api/openai").is_ok());
        assert!(validate_key("tab\tand\nnewline").is_ok());
        assert!(validate_key(&"k".repeat(4096)).is_ok());
        assert!(matches!(validate_key(""), Err(EnvRefError::InvalidKey(_))));
    }

    #[test]
    fn verify_before_initialize_reports_not_initialized() {
        let dir = TempDir::new().unwrap();
        let v = vault(&dir, b"pw");
        assert!(matches!(
            v.verify_passphrase(),
            Err(EnvRefError::NotInitialized)
        ));
        assert!(!v.is_initialized().unwrap());
    }

    #[test]
    fn lock_requires_initialization() {
        let dir = TempDir::new().unwrap();
        let v = vault(&dir, b"pw");
        assert!(matches!(v.lock(), Err(EnvRefError::NotInitialized)));
    }

    #[test]
    fn close_is_terminal_and_idempotent() {
        let dir = TempDir::new().unwrap();
        let v = vault(&dir, b"pw");
        v.initialize().unwrap();
        v.close().unwrap();
        v.close().unwrap();
        assert!(matches!(v.get("x"), Err(EnvRefError::VaultClosed)));
        assert!(matches!(v.list(), Err(EnvRefError::VaultClosed)));
        assert!(matches!(v.is_locked(), Err(EnvRefError::VaultClosed)));
    }

    #[test]
    fn close_before_open_is_fine() {
        let dir = TempDir::new().unwrap();
        let v = vault(&dir, b"pw");
        v.close().unwrap();
        assert!(!dir.path().join("vault.db").exists());
    }

    #[test]
    fn verification_token_is_not_the_plaintext() {
        let dir = TempDir::new().unwrap();
        let v = vault(&dir, b"pw");
        v.initialize().unwrap();

        let mut store = Store::new(&dir.path().join("vault.db"));
        let token = store.get_meta(META_VERIFICATION).unwrap().unwrap();
        assert!(token.starts_with("envref:1:"));
        assert!(!token.contains("verification"));
    }

    #[test]
    fn vault_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Vault>();
    }
}

use thiserror::Error;

/// All errors that can occur in envref.
#[derive(Debug, Error)]
pub enum EnvRefError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: wrong passphrase or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Vault lifecycle errors ---
    #[error("Wrong passphrase for this vault")]
    WrongPassphrase,

    #[error("Vault is not initialized")]
    NotInitialized,

    #[error("Vault is already initialized")]
    AlreadyInitialized,

    #[error("Vault is locked")]
    VaultLocked,

    #[error("Vault is not locked")]
    VaultNotLocked,

    #[error("Vault has been closed")]
    VaultClosed,

    #[error("Passphrase cannot be empty")]
    EmptyPassphrase,

    // --- Secret errors ---
    #[error("Secret '{0}' not found")]
    SecretNotFound(String),

    #[error("Invalid secret key: {0}")]
    InvalidKey(String),

    #[error("Secret '{0}' cannot be decrypted with this passphrase")]
    SecretUnreadable(String),

    // --- Storage errors ---
    #[error("Vault storage error: {0}")]
    Storage(String),

    // --- Export errors ---
    #[error("Unsupported export version {found} (expected {expected})")]
    UnsupportedExportVersion { found: u32, expected: u32 },

    #[error("Invalid export: {0}")]
    InvalidExport(String),

    // --- Backend / reference errors ---
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("No backend named '{0}' is registered")]
    BackendNotFound(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Keyring error: {0}")]
    KeyringError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

impl EnvRefError {
    /// Remediation hint shown by the CLI under the error message.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `envref init` to create the vault."),
            Self::VaultLocked => Some("Run `envref unlock` to unlock the vault."),
            Self::VaultNotLocked => Some("Nothing to do; the vault is already unlocked."),
            Self::AlreadyInitialized => Some("The vault already exists; use `envref set` to add secrets."),
            Self::WrongPassphrase | Self::SecretUnreadable(_) => {
                Some("Check the passphrase (or ENVREF_PASSPHRASE) and try again.")
            }
            Self::VaultClosed => Some("Open a new vault handle to continue."),
            Self::SecretNotFound(_) => Some("Run `envref list` to see stored keys."),
            _ => None,
        }
    }
}

/// Convenience type alias for envref results.
pub type Result<T> = std::result::Result<T, EnvRefError>;

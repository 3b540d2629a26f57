//! Vault module: the local encrypted secret store.
//!
//! This module provides:
//! - `SecretBuffer`, a zero-on-clear byte buffer for the passphrase (`secret_buffer`)
//! - The SQLite persistence layer (`store`)
//! - The plaintext export format (`export`)
//! - The `Vault` handle tying them together (`handle`)

pub mod export;
pub mod handle;
pub mod secret_buffer;
pub mod store;

// Re-export the most commonly used items.
pub use export::{VaultExport, EXPORT_VERSION};
pub use handle::Vault;
pub use secret_buffer::SecretBuffer;
pub use store::Store;

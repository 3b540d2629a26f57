//! Cryptographic primitives for envref.
//!
//! This module provides:
//! - Argon2id passphrase-based key derivation (`kdf`)
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - Self-describing text envelopes built from the two (`envelope`)

pub mod encryption;
pub mod envelope;
pub mod kdf;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{seal, open, Argon2Params};
pub use envelope::{open, seal};
pub use kdf::{derive_key, generate_salt, Argon2Params};

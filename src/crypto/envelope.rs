//! Self-describing text envelopes for single values.
//!
//! Every value is sealed on its own: a fresh salt, a fresh Argon2id
//! derivation and a fresh AES-256-GCM nonce.  The envelope carries
//! everything except the passphrase, so any envelope can be opened in
//! isolation:
//!
//! ```text
//! envref:1:argon2id:m=19456,t=2,p=1:<salt base64>:<nonce||ciphertext base64>
//! ```
//!
//! The text is ASCII only and safe both as an SQLite column and as a
//! JSON string.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use zeroize::{Zeroize, Zeroizing};

use super::encryption::{decrypt, encrypt};
use super::kdf::{derive_key, generate_salt, Argon2Params, SALT_LEN};
use crate::errors::{EnvRefError, Result};

/// Leading tag identifying an envref envelope.
const TAG: &str = "envref";

/// Envelope format version.
const ENVELOPE_VERSION: &str = "1";

/// KDF identifier (the only one supported).
const KDF_NAME: &str = "argon2id";

/// Encrypt `plaintext` under `passphrase`, returning envelope text.
pub fn seal(plaintext: &[u8], passphrase: &[u8], params: &Argon2Params) -> Result<String> {
    let salt = generate_salt();
    let mut key = derive_key(passphrase, &salt, params)?;
    let sealed = encrypt(&key, plaintext);
    key.zeroize();
    let sealed = sealed?;

    Ok(format!(
        "{TAG}:{ENVELOPE_VERSION}:{KDF_NAME}:m={},t={},p={}:{}:{}",
        params.memory_kib,
        params.iterations,
        params.parallelism,
        BASE64.encode(salt),
        BASE64.encode(sealed),
    ))
}

/// Decrypt envelope text produced by `seal`.
///
/// A malformed envelope, out-of-range KDF parameters, a wrong passphrase
/// and a tampered ciphertext all yield the same `DecryptionFailed`.
pub fn open(envelope: &str, passphrase: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let parsed = parse(envelope).ok_or(EnvRefError::DecryptionFailed)?;

    let mut key = derive_key(passphrase, &parsed.salt, &parsed.params)
        .map_err(|_| EnvRefError::DecryptionFailed)?;
    let plaintext = decrypt(&key, &parsed.sealed);
    key.zeroize();

    plaintext.map(Zeroizing::new)
}

struct Parsed {
    params: Argon2Params,
    salt: Vec<u8>,
    sealed: Vec<u8>,
}

fn parse(envelope: &str) -> Option<Parsed> {
    let mut parts = envelope.split(':');
    if parts.next()? != TAG || parts.next()? != ENVELOPE_VERSION || parts.next()? != KDF_NAME {
        return None;
    }
    let params = parse_params(parts.next()?)?;
    let salt = BASE64.decode(parts.next()?).ok()?;
    let sealed = BASE64.decode(parts.next()?).ok()?;
    if parts.next().is_some() || salt.len() != SALT_LEN {
        return None;
    }
    Some(Parsed {
        params,
        salt,
        sealed,
    })
}

fn parse_params(field: &str) -> Option<Argon2Params> {
    let mut memory_kib = None;
    let mut iterations = None;
    let mut parallelism = None;

    for pair in field.split(',') {
        let (name, value) = pair.split_once('=')?;
        let value: u32 = value.parse().ok()?;
        match name {
            "m" => memory_kib = Some(value),
            "t" => iterations = Some(value),
            "p" => parallelism = Some(value),
            _ => return None,
        }
    }

    Some(Argon2Params {
        memory_kib: memory_kib?,
        iterations: iterations?,
        parallelism: parallelism?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> Argon2Params {
        Argon2Params::minimum()
    }

    #[test]
    fn seal_open_roundtrip() {
        let env = seal(b"sk-123", b"pass", &fast()).unwrap();
        assert_eq!(open(&env, b"pass").unwrap().as_slice(), b"sk-123");
    }

    #[test]
    fn envelope_embeds_params_and_is_ascii() {
        let env = seal(b"value", b"pass", &fast()).unwrap();
        assert!(env.starts_with("envref:1:argon2id:m=8192,t=1,p=1:"));
        assert!(env.is_ascii());
        assert_eq!(env.split(':').count(), 6);
    }

    #[test]
    fn same_plaintext_seals_differently() {
        let a = seal(b"value", b"pass", &fast()).unwrap();
        let b = seal(b"value", b"pass", &fast()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_passphrase_and_garbage_fail_identically() {
        let env = seal(b"value", b"right", &fast()).unwrap();
        assert!(matches!(
            open(&env, b"wrong"),
            Err(EnvRefError::DecryptionFailed)
        ));
        assert!(matches!(
            open("not an envelope", b"right"),
            Err(EnvRefError::DecryptionFailed)
        ));
    }

    #[test]
    fn weak_params_in_envelope_are_refused() {
        let env = seal(b"value", b"pass", &fast()).unwrap();
        let weakened = env.replacen("m=8192", "m=8", 1);
        assert!(matches!(
            open(&weakened, b"pass"),
            Err(EnvRefError::DecryptionFailed)
        ));
    }

    #[test]
    fn excessive_work_factor_in_envelope_is_refused_quickly() {
        let env = seal(b"value", b"pass", &fast()).unwrap();

        let slow = env.replacen("t=1", "t=4000000000", 1);
        let started = std::time::Instant::now();
        assert!(matches!(
            open(&slow, b"pass"),
            Err(EnvRefError::DecryptionFailed)
        ));
        assert!(started.elapsed() < std::time::Duration::from_secs(5));

        let wide = env.replacen("p=1", "p=100000", 1);
        assert!(matches!(
            open(&wide, b"pass"),
            Err(EnvRefError::DecryptionFailed)
        ));
    }

    #[test]
    fn parse_params_rejects_unknown_fields() {
        assert!(parse_params("m=8192,t=1,p=1").is_some());
        assert!(parse_params("m=8192,t=1").is_none());
        assert!(parse_params("m=8192,t=1,p=1,x=2").is_none());
        assert!(parse_params("m=abc,t=1,p=1").is_none());
    }
}

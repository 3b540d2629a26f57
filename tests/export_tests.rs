//! Integration tests for plaintext export and import between vaults.

use std::path::Path;

use envref::crypto::Argon2Params;
use envref::{EnvRefError, Vault, VaultExport};
use tempfile::TempDir;

fn initialized(path: &Path, passphrase: &[u8]) -> Vault {
    let vault = Vault::new(passphrase, Some(path))
        .unwrap()
        .with_kdf_params(Argon2Params::minimum());
    vault.initialize().unwrap();
    vault
}

#[test]
fn export_then_import_into_vault_with_other_passphrase() {
    let dir = TempDir::new().unwrap();
    let source = initialized(&dir.path().join("a.db"), b"passphrase-one");
    source.set("api_key", "sk-123").unwrap();
    source.set("db/password", "p@ss word\nwith newline").unwrap();
    source.set("empty", "").unwrap();

    let json = source.export_json().unwrap();

    let target = initialized(&dir.path().join("b.db"), b"passphrase-two");
    target.set("api_key", "old").unwrap();
    target.set("untouched", "keep").unwrap();

    assert_eq!(target.import_json(&json).unwrap(), 3);

    assert_eq!(target.get("api_key").unwrap(), "sk-123");
    assert_eq!(target.get("db/password").unwrap(), "p@ss word\nwith newline");
    assert_eq!(target.get("empty").unwrap(), "");
    assert_eq!(target.get("untouched").unwrap(), "keep");
    assert_eq!(
        target.list().unwrap(),
        vec!["api_key", "db/password", "empty", "untouched"]
    );
}

#[test]
fn export_contains_plaintext_values() {
    let dir = TempDir::new().unwrap();
    let vault = initialized(&dir.path().join("v.db"), b"pw");
    vault.set("api_key", "sk-123").unwrap();

    let export = vault.export().unwrap();
    assert_eq!(export.version, 1);
    assert_eq!(export.len(), 1);
    assert_eq!(export.secrets["api_key"], "sk-123");

    let value: serde_json::Value = serde_json::from_str(&export.to_json().unwrap()).unwrap();
    assert_eq!(value["secrets"]["api_key"], "sk-123");
}

#[test]
fn export_of_empty_vault_is_empty() {
    let dir = TempDir::new().unwrap();
    let vault = initialized(&dir.path().join("v.db"), b"pw");
    assert!(vault.export().unwrap().is_empty());
}

#[test]
fn unsupported_version_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let vault = initialized(&dir.path().join("v.db"), b"pw");

    let json = r#"{"version":2,"exported_at":"2026-01-01T00:00:00Z","secrets":{"a":"1","b":"2"}}"#;
    assert!(matches!(
        vault.import_json(json),
        Err(EnvRefError::UnsupportedExportVersion {
            found: 2,
            expected: 1
        })
    ));
    assert!(vault.list().unwrap().is_empty());
}

#[test]
fn invalid_key_in_import_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let vault = initialized(&dir.path().join("v.db"), b"pw");

    let json = r#"{"version":1,"exported_at":"2026-01-01T00:00:00Z","secrets":{"":"x","good":"y"}}"#;
    assert!(matches!(
        vault.import_json(json),
        Err(EnvRefError::InvalidKey(_))
    ));
    assert!(vault.list().unwrap().is_empty());
}

#[test]
fn import_keeps_keys_the_cli_would_not_accept() {
    let dir = TempDir::new().unwrap();
    let vault = initialized(&dir.path().join("v.db"), b"pw");

    let long = "x".repeat(1000);
    let json = format!(
        r#"{{"version":1,"exported_at":"2026-01-01T00:00:00Z","secrets":{{"with\nnewline":"a","{long}":"b"}}}}"#
    );

    assert_eq!(vault.import_json(&json).unwrap(), 2);
    assert_eq!(vault.get("with\nnewline").unwrap(), "a");
    assert_eq!(vault.get(&long).unwrap(), "b");
}

#[test]
fn malformed_import_is_rejected() {
    let dir = TempDir::new().unwrap();
    let vault = initialized(&dir.path().join("v.db"), b"pw");

    for json in ["null", "{", r#"{"version":1}"#, "[]"] {
        assert!(
            matches!(vault.import_json(json), Err(EnvRefError::InvalidExport(_))),
            "input {json:?}"
        );
    }
}

#[test]
fn export_requires_the_right_passphrase() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("v.db");
    {
        let vault = initialized(&path, b"right");
        vault.set("k", "v").unwrap();
    }

    let intruder = Vault::new(b"wrong", Some(&path))
        .unwrap()
        .with_kdf_params(Argon2Params::minimum());
    assert!(matches!(intruder.export(), Err(EnvRefError::WrongPassphrase)));
}

#[test]
fn import_accepts_a_constructed_export() {
    let dir = TempDir::new().unwrap();
    let vault = initialized(&dir.path().join("v.db"), b"pw");

    let mut secrets = std::collections::BTreeMap::new();
    secrets.insert("one".to_string(), "1".to_string());
    secrets.insert("two".to_string(), "2".to_string());

    assert_eq!(vault.import(&VaultExport::new(secrets)).unwrap(), 2);
    assert_eq!(vault.get("two").unwrap(), "2");
}

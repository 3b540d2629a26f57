//! Resolution of `ref://<backend>/<path>` placeholders.
//!
//! A `.env` value that starts with `ref://` names a backend and a key
//! inside it; anything else is a literal and passes through untouched.

use std::fmt;

use crate::backend::Backend;
use crate::errors::{EnvRefError, Result};

/// URI scheme prefix for references.
pub const SCHEME: &str = "ref://";

/// A parsed `ref://backend/path` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub backend: String,
    pub path: String,
}

impl Reference {
    /// Parse `value` as a reference.
    ///
    /// Returns `Ok(None)` for literals, `Err(InvalidReference)` for a
    /// `ref://` value that is malformed.
    pub fn parse(value: &str) -> Result<Option<Self>> {
        let Some(rest) = value.strip_prefix(SCHEME) else {
            return Ok(None);
        };

        let (backend, path) = rest.split_once('/').ok_or_else(|| {
            EnvRefError::InvalidReference(format!("'{value}' has no path after the backend"))
        })?;

        if backend.is_empty()
            || !backend
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(EnvRefError::InvalidReference(format!(
                "'{value}' has an invalid backend name; use lowercase letters, digits, and hyphens"
            )));
        }
        if path.is_empty() {
            return Err(EnvRefError::InvalidReference(format!(
                "'{value}' has an empty path"
            )));
        }

        Ok(Some(Self {
            backend: backend.to_string(),
            path: path.to_string(),
        }))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{}/{}", self.backend, self.path)
    }
}

/// Backends available for resolution, looked up by name.
#[derive(Default)]
pub struct Registry<'a> {
    backends: Vec<&'a dyn Backend>,
}

impl<'a> Registry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a backend.  A later backend with the same name never shadows
    /// an earlier one.
    pub fn register(&mut self, backend: &'a dyn Backend) {
        self.backends.push(backend);
    }

    pub fn get(&self, name: &str) -> Result<&'a dyn Backend> {
        self.backends
            .iter()
            .copied()
            .find(|b| b.name() == name)
            .ok_or_else(|| EnvRefError::BackendNotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }
}

/// Replace every reference value with the secret it points at.
///
/// Order is preserved.  The first failing reference aborts the whole
/// resolution.
pub fn resolve_entries(
    entries: &[(String, String)],
    registry: &Registry<'_>,
) -> Result<Vec<(String, String)>> {
    let mut resolved = Vec::with_capacity(entries.len());

    for (name, value) in entries {
        let value = match Reference::parse(value)? {
            Some(reference) => {
                tracing::debug!(variable = %name, reference = %reference, "resolving");
                registry.get(&reference.backend)?.get(&reference.path)?
            }
            None => value.clone(),
        };
        resolved.push((name.clone(), value));
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// In-memory backend for resolver tests.
    struct MapBackend {
        name: &'static str,
        values: BTreeMap<String, String>,
    }

    impl Backend for MapBackend {
        fn name(&self) -> &str {
            self.name
        }
        fn get(&self, key: &str) -> Result<String> {
            self.values
                .get(key)
                .cloned()
                .ok_or_else(|| EnvRefError::SecretNotFound(key.to_string()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(EnvRefError::Unsupported("read-only".into()))
        }
        fn delete(&self, _key: &str) -> Result<()> {
            Err(EnvRefError::Unsupported("read-only".into()))
        }
        fn list(&self) -> Result<Vec<String>> {
            Ok(self.values.keys().cloned().collect())
        }
    }

    fn backend() -> MapBackend {
        let mut values = BTreeMap::new();
        values.insert("db/password".to_string(), "hunter2".to_string());
        MapBackend {
            name: "vault",
            values,
        }
    }

    #[test]
    fn parse_reference() {
        assert_eq!(
            Reference::parse("ref://vault/db/password").unwrap(),
            Some(Reference {
                backend: "vault".into(),
                path: "db/password".into()
            })
        );
        assert_eq!(Reference::parse("plain-value").unwrap(), None);
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(Reference::parse("ref://vault").is_err());
        assert!(Reference::parse("ref://vault/").is_err());
        assert!(Reference::parse("ref:///path").is_err());
        assert!(Reference::parse("ref://Vault/path").is_err());
    }

    #[test]
    fn display_roundtrips() {
        let r = Reference::parse("ref://aws-ssm/prod/key").unwrap().unwrap();
        assert_eq!(r.to_string(), "ref://aws-ssm/prod/key");
    }

    #[test]
    fn resolves_refs_and_keeps_literals_in_order() {
        let b = backend();
        let mut registry = Registry::new();
        registry.register(&b);

        let entries = vec![
            ("DB_PASSWORD".to_string(), "ref://vault/db/password".to_string()),
            ("PORT".to_string(), "5432".to_string()),
        ];
        let resolved = resolve_entries(&entries, &registry).unwrap();
        assert_eq!(
            resolved,
            vec![
                ("DB_PASSWORD".to_string(), "hunter2".to_string()),
                ("PORT".to_string(), "5432".to_string()),
            ]
        );
    }

    #[test]
    fn unknown_backend_and_missing_key_fail() {
        let b = backend();
        let mut registry = Registry::new();
        registry.register(&b);

        let unknown = vec![("X".to_string(), "ref://nope/a".to_string())];
        assert!(matches!(
            resolve_entries(&unknown, &registry),
            Err(EnvRefError::BackendNotFound(_))
        ));

        let missing = vec![("X".to_string(), "ref://vault/absent".to_string())];
        assert!(matches!(
            resolve_entries(&missing, &registry),
            Err(EnvRefError::SecretNotFound(_))
        ));
    }

    #[test]
    fn registry_names_in_registration_order() {
        let a = backend();
        let b = MapBackend {
            name: "keychain",
            values: BTreeMap::new(),
        };
        let mut registry = Registry::new();
        registry.register(&a);
        registry.register(&b);
        assert_eq!(registry.names(), vec!["vault", "keychain"]);
    }
}

//! Plaintext bulk export format.
//!
//! ```json
//! { "version": 1, "exported_at": "2026-10-19T12:00:00Z", "secrets": { "KEY": "value" } }
//! ```
//!
//! An export holds every secret in the clear.  Its values are wiped
//! when the struct is dropped, but the JSON text produced from it is
//! the caller's to protect.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::errors::{EnvRefError, Result};

/// The only export format version this build reads and writes.
pub const EXPORT_VERSION: u32 = 1;

/// A full plaintext snapshot of a vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultExport {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub secrets: BTreeMap<String, String>,
}

impl VaultExport {
    /// Stamp a new export with the current version and time.
    pub fn new(secrets: BTreeMap<String, String>) -> Self {
        Self {
            version: EXPORT_VERSION,
            exported_at: Utc::now(),
            secrets,
        }
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    /// Fail closed on any version other than `EXPORT_VERSION`.
    pub fn check_version(&self) -> Result<()> {
        if self.version == EXPORT_VERSION {
            Ok(())
        } else {
            Err(EnvRefError::UnsupportedExportVersion {
                found: self.version,
                expected: EXPORT_VERSION,
            })
        }
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| EnvRefError::SerializationError(format!("export JSON: {e}")))
    }

    /// Parse export JSON.  `null` counts as a missing export.
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: Option<Self> = serde_json::from_str(json)
            .map_err(|e| EnvRefError::InvalidExport(format!("invalid JSON: {e}")))?;
        parsed.ok_or_else(|| EnvRefError::InvalidExport("export is missing".into()))
    }
}

impl Drop for VaultExport {
    fn drop(&mut self) {
        for value in self.secrets.values_mut() {
            value.zeroize();
        }
    }
}

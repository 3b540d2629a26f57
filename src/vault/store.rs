//! SQLite-backed persistence for the vault.
//!
//! Two tables live in one file:
//! - `secrets(key, value)`: one sealed envelope per secret.
//! - `metadata(key, value)`: the verification token and the lock flag.
//!
//! The connection is opened lazily on first use.  WAL mode plus a busy
//! timeout let a concurrent `envref` process against the same file wait
//! briefly instead of failing with `SQLITE_BUSY`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::{EnvRefError, Result};

/// How long SQLite retries on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS secrets (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS metadata (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );";

/// Lazily-opened handle on the vault database file.
pub struct Store {
    path: PathBuf,
    conn: Option<Connection>,
}

impl Store {
    /// Create a handle for `path`.  No I/O happens until `open`.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            conn: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Open the database if it is not open yet.  Idempotent.
    pub fn open(&mut self) -> Result<&mut Connection> {
        if self.conn.is_none() {
            let conn = self.connect()?;
            self.conn = Some(conn);
        }
        self.conn
            .as_mut()
            .ok_or_else(|| EnvRefError::Storage("connection unavailable".into()))
    }

    /// Drop the connection.  Closing twice, or before opening, is fine.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, e)) = conn.close() {
                tracing::warn!(path = %self.path.display(), "closing vault database: {e}");
            }
            tracing::debug!(path = %self.path.display(), "vault database closed");
        }
    }

    fn connect(&self) -> Result<Connection> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                create_private_dir(parent)?;
            }
        }

        let conn = Connection::open(&self.path)
            .map_err(|e| storage_err("open", None, &e))?;

        // Restrict the database file to its owner.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| storage_err("enable WAL", None, &e))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| storage_err("set busy timeout", None, &e))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| storage_err("create schema", None, &e))?;

        tracing::debug!(path = %self.path.display(), "vault database opened");
        Ok(conn)
    }

    // ------------------------------------------------------------------
    // secrets table
    // ------------------------------------------------------------------

    pub fn get_secret(&mut self, key: &str) -> Result<Option<String>> {
        self.open()?
            .query_row(
                "SELECT value FROM secrets WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| storage_err("get", Some(key), &e))
    }

    /// Insert or replace a secret's envelope.
    pub fn put_secret(&mut self, key: &str, envelope: &str) -> Result<()> {
        self.open()?
            .execute(
                "INSERT INTO secrets (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, envelope],
            )
            .map_err(|e| storage_err("set", Some(key), &e))?;
        Ok(())
    }

    /// Upsert many rows in a single transaction: all of them or none.
    pub fn put_secrets(&mut self, rows: &[(String, String)]) -> Result<usize> {
        let conn = self.open()?;
        let tx = conn
            .transaction()
            .map_err(|e| storage_err("begin import", None, &e))?;
        for (key, envelope) in rows {
            tx.execute(
                "INSERT INTO secrets (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, envelope],
            )
            .map_err(|e| storage_err("import", Some(key), &e))?;
        }
        tx.commit()
            .map_err(|e| storage_err("commit import", None, &e))?;
        Ok(rows.len())
    }

    /// Remove a secret, returning how many rows were deleted (0 or 1).
    pub fn delete_secret(&mut self, key: &str) -> Result<usize> {
        self.open()?
            .execute("DELETE FROM secrets WHERE key = ?1", params![key])
            .map_err(|e| storage_err("delete", Some(key), &e))
    }

    /// All keys, sorted.
    pub fn list_keys(&mut self) -> Result<Vec<String>> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare("SELECT key FROM secrets ORDER BY key")
            .map_err(|e| storage_err("list", None, &e))?;
        let keys = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e| storage_err("list", None, &e))?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(|e| storage_err("list", None, &e))?;
        Ok(keys)
    }

    /// Every `(key, envelope)` row, sorted by key.
    pub fn all_secrets(&mut self) -> Result<Vec<(String, String)>> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare("SELECT key, value FROM secrets ORDER BY key")
            .map_err(|e| storage_err("export", None, &e))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| storage_err("export", None, &e))?
            .collect::<rusqlite::Result<Vec<(String, String)>>>()
            .map_err(|e| storage_err("export", None, &e))?;
        Ok(rows)
    }

    // ------------------------------------------------------------------
    // metadata table
    // ------------------------------------------------------------------

    pub fn get_meta(&mut self, key: &str) -> Result<Option<String>> {
        self.open()?
            .query_row(
                "SELECT value FROM metadata WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| storage_err("read metadata", Some(key), &e))
    }

    pub fn put_meta(&mut self, key: &str, value: &str) -> Result<()> {
        self.open()?
            .execute(
                "INSERT INTO metadata (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(|e| storage_err("write metadata", Some(key), &e))?;
        Ok(())
    }

    pub fn delete_meta(&mut self, key: &str) -> Result<()> {
        self.open()?
            .execute("DELETE FROM metadata WHERE key = ?1", params![key])
            .map_err(|e| storage_err("delete metadata", Some(key), &e))?;
        Ok(())
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        self.close();
    }
}

/// Create `dir` (and its parents) readable by the owner only.
fn create_private_dir(dir: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)?;
    Ok(())
}

fn storage_err(op: &str, key: Option<&str>, e: &rusqlite::Error) -> EnvRefError {
    match key {
        Some(key) => EnvRefError::Storage(format!("{op} '{key}': {e}")),
        None => EnvRefError::Storage(format!("{op}: {e}")),
    }
}

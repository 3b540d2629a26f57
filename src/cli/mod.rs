//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod env_parser;
pub mod output;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{EnvRefError, Result};
use crate::vault::Vault;

/// Minimum passphrase length accepted when creating a vault.
const MIN_PASSPHRASE_LEN: usize = 8;

/// Longest key `envref set` accepts, in bytes.
const MAX_KEY_LEN: usize = 512;

/// Environment variable consulted before prompting for the passphrase.
pub const PASSPHRASE_ENV: &str = "ENVREF_PASSPHRASE";

/// envref: resolve ref:// placeholders in .env files from secret backends.
#[derive(Parser)]
#[command(
    name = "envref",
    about = "Resolve ref:// secrets in .env files, backed by an encrypted local vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault database path (default: <config dir>/envref/vault.db)
    #[arg(long, global = true, env = "ENVREF_VAULT_PATH")]
    pub vault_path: Option<PathBuf>,

    /// Config file path (default: <config dir>/envref/config.toml)
    #[arg(long, global = true, env = "ENVREF_CONFIG")]
    pub config: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Initialize the vault with a new passphrase
    Init,

    /// Set a secret (add or update)
    Set {
        /// Secret key (e.g. db/password)
        key: String,
        /// Secret value (omit for stdin or an interactive prompt)
        value: Option<String>,
    },

    /// Print a secret's value
    Get {
        /// Secret key
        key: String,
    },

    /// List all secret keys
    List,

    /// Delete a secret
    Delete {
        /// Secret key
        key: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Lock the vault (blocks reads and writes until unlocked)
    Lock,

    /// Unlock a locked vault
    Unlock,

    /// Show vault location and state
    Status,

    /// Export all secrets as plaintext JSON
    Export {
        /// Output file path (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import secrets from an export JSON file
    Import {
        /// Path to the export file
        file: PathBuf,
    },

    /// Resolve ref:// placeholders in a .env file
    Resolve {
        /// The .env file to read
        #[arg(default_value = ".env")]
        file: PathBuf,
        /// Output file path (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum, ignore_case = true)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load settings from `--config` or the default location.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    match &cli.config {
        Some(path) => Settings::load(path),
        None => Settings::load_default(),
    }
}

/// Vault path: `--vault-path`, then the config file, then the default.
pub fn vault_path(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    match &cli.vault_path {
        Some(path) => Ok(path.clone()),
        None => settings.vault_path(),
    }
}

/// Build a vault handle for an existing vault and check the passphrase
/// against its verification token.
///
/// Fails with `NotInitialized` or `WrongPassphrase` before any command
/// touches a secret, so nothing is ever sealed under a wrong passphrase.
pub fn open_vault(cli: &Cli) -> Result<Vault> {
    let vault = open_vault_unverified(cli)?;
    vault.verify_passphrase()?;
    Ok(vault)
}

/// Build a vault handle without checking the passphrase (`status`).
pub fn open_vault_unverified(cli: &Cli) -> Result<Vault> {
    let passphrase = prompt_passphrase()?;
    build_vault(cli, &passphrase)
}

/// Build a vault handle for a fresh vault, asking for a new passphrase.
pub fn open_new_vault(cli: &Cli) -> Result<Vault> {
    let passphrase = prompt_new_passphrase()?;
    build_vault(cli, &passphrase)
}

fn build_vault(cli: &Cli, passphrase: &str) -> Result<Vault> {
    let settings = load_settings(cli)?;
    let path = vault_path(cli, &settings)?;
    tracing::debug!(path = %path.display(), "using vault");
    Ok(Vault::new(passphrase.as_bytes(), Some(&path))?.with_kdf_params(settings.argon2_params()))
}

/// Get the vault passphrase, trying in order:
/// 1. `ENVREF_PASSPHRASE` env var (CI/CD)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the passphrase is wiped from memory on drop.
pub fn prompt_passphrase() -> Result<Zeroizing<String>> {
    if let Some(pw) = passphrase_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter vault passphrase")
        .interact()
        .map_err(|e| EnvRefError::CommandFailed(format!("passphrase prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new passphrase with confirmation (used during `init`).
///
/// Also respects `ENVREF_PASSPHRASE` for scripted/CI usage.
/// Enforces a minimum passphrase length.
pub fn prompt_new_passphrase() -> Result<Zeroizing<String>> {
    if let Some(pw) = passphrase_from_env() {
        if pw.len() < MIN_PASSPHRASE_LEN {
            return Err(EnvRefError::CommandFailed(format!(
                "passphrase must be at least {MIN_PASSPHRASE_LEN} characters"
            )));
        }
        return Ok(pw);
    }

    loop {
        let passphrase = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Choose vault passphrase")
                .with_confirmation(
                    "Confirm vault passphrase",
                    "Passphrases do not match, try again",
                )
                .interact()
                .map_err(|e| EnvRefError::CommandFailed(format!("passphrase prompt: {e}")))?,
        );

        if passphrase.len() < MIN_PASSPHRASE_LEN {
            output::warning(&format!(
                "Passphrase must be at least {MIN_PASSPHRASE_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(passphrase);
    }
}

/// Reject keys typed on the command line that would be awkward in a
/// `.env` reference: over-long or containing control characters.
pub fn validate_new_key(key: &str) -> Result<()> {
    if key.len() > MAX_KEY_LEN {
        return Err(EnvRefError::InvalidKey(format!(
            "key cannot exceed {MAX_KEY_LEN} bytes"
        )));
    }
    if key.chars().any(char::is_control) {
        return Err(EnvRefError::InvalidKey(
            "key cannot contain control characters".into(),
        ));
    }
    Ok(())
}

/// Write `bytes` to `path`, readable by the owner only on unix.
///
/// The mode is applied to an existing file too, not just on creation.
pub fn write_private(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|e| {
        EnvRefError::CommandFailed(format!("failed to write {}: {e}", path.display()))
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(bytes)?;
    Ok(())
}

fn passphrase_from_env() -> Option<Zeroizing<String>> {
    std::env::var(PASSPHRASE_ENV)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

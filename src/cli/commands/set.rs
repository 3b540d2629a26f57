//! `envref set`: add or update a secret in the vault.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_vault, validate_new_key, Cli};
use crate::errors::{EnvRefError, Result};

/// Execute the `set` command.
pub fn execute(cli: &Cli, key: &str, value: Option<&str>) -> Result<()> {
    validate_new_key(key)?;

    // Verified before the value is read, so a bad passphrase never
    // costs the user a typed secret.
    let vault = open_vault(cli)?;

    let secret_value = Zeroizing::new(if let Some(v) = value {
        output::warning("Value provided on command line; it may appear in shell history.");
        v.to_string()
    } else if !io::stdin().is_terminal() {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim_end_matches(['\r', '\n']).to_string();
        zeroize::Zeroize::zeroize(&mut buf);
        trimmed
    } else {
        dialoguer::Password::new()
            .with_prompt(format!("Enter value for {key}"))
            .allow_empty_password(true)
            .interact()
            .map_err(|e| EnvRefError::CommandFailed(format!("input prompt: {e}")))?
    });

    vault.set(key, &secret_value)?;
    output::success(&format!("Secret '{key}' stored"));
    output::tip(&format!("Reference it as ref://vault/{key}"));

    vault.close()
}

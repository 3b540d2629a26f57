//! `envref status`: report where the vault lives and what state it is in.

use crate::cli::output;
use crate::cli::{open_vault_unverified, Cli};
use crate::errors::{EnvRefError, Result};

/// Execute the `status` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let vault = open_vault_unverified(cli)?;

    output::info(&format!("Vault: {}", vault.path().display()));

    if !vault.is_initialized()? {
        output::warning("Not initialized");
        output::tip("Run `envref init` to create the vault.");
        return vault.close();
    }

    match vault.verify_passphrase() {
        Ok(()) => output::success("Passphrase accepted"),
        Err(EnvRefError::WrongPassphrase) => output::warning("Passphrase does not match this vault"),
        Err(e) => return Err(e),
    }

    if vault.is_locked()? {
        output::warning("Locked");
    } else {
        output::success("Unlocked");
    }

    vault.close()
}

//! `envref init`: create the vault and its verification token.

use crate::cli::output;
use crate::cli::{open_new_vault, Cli};
use crate::errors::Result;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let vault = open_new_vault(cli)?;
    vault.initialize()?;

    output::success(&format!("Vault initialized at {}", vault.path().display()));
    output::tip("Run `envref set <KEY>` to add a secret.");
    output::tip("Reference it from .env as ref://vault/<KEY> and run `envref resolve`.");

    vault.close()
}

//! `envref lock` / `envref unlock`: toggle the vault's lock flag.
//!
//! Both verify the passphrase first.  The flag is a soft guard against
//! accidental use, not an access-control boundary.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `lock` command.
pub fn execute_lock(cli: &Cli) -> Result<()> {
    let vault = open_vault(cli)?;
    vault.lock()?;
    output::success("Vault locked");
    output::tip("Run `envref unlock` to use it again.");
    vault.close()
}

/// Execute the `unlock` command.
pub fn execute_unlock(cli: &Cli) -> Result<()> {
    let vault = open_vault(cli)?;
    vault.unlock()?;
    output::success("Vault unlocked");
    vault.close()
}

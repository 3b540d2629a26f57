//! `envref list`: display all secret keys in a table.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let vault = open_vault(cli)?;
    let keys = vault.list()?;

    output::info(&format!(
        "{}: {} secret(s)",
        vault.path().display(),
        keys.len()
    ));
    output::print_keys_table(&keys);

    vault.close()
}

//! `envref import`: load secrets from an export JSON file.

use std::fs;
use std::path::Path;

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{EnvRefError, Result};

/// Execute the `import` command.
pub fn execute(cli: &Cli, file_path: &Path) -> Result<()> {
    if !file_path.exists() {
        return Err(EnvRefError::CommandFailed(format!(
            "import file not found: {}",
            file_path.display()
        )));
    }

    let json = Zeroizing::new(fs::read_to_string(file_path)?);

    let vault = open_vault(cli)?;
    let count = vault.import_json(&json)?;

    if count == 0 {
        output::warning("No secrets found in the import file.");
    } else {
        output::success(&format!(
            "Imported {count} secrets from {} into {}",
            file_path.display(),
            vault.path().display()
        ));
    }

    vault.close()
}

//! `envref export`: dump every secret as plaintext JSON.
//!
//! The output is the versioned export format read by `envref import`,
//! so it doubles as the passphrase-rotation path: export from the old
//! vault, import into a new one under a new passphrase.

use std::path::Path;

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{load_settings, open_vault, vault_path, write_private, Cli};
use crate::errors::{EnvRefError, Result};

/// Execute the `export` command.
pub fn execute(cli: &Cli, output_path: Option<&Path>) -> Result<()> {
    if let Some(dest) = output_path {
        check_destination(cli, dest)?;
    }

    let vault = open_vault(cli)?;
    let export = vault.export()?;
    let content = Zeroizing::new(export.to_json()?);

    match output_path {
        Some(dest) => {
            let file_content = Zeroizing::new(format!("{}\n", content.as_str()));
            write_private(dest, file_content.as_bytes())?;
            output::success(&format!(
                "Exported {} secrets to {}",
                export.len(),
                dest.display()
            ));
            output::warning("The export file contains plaintext secrets. Delete it when done.");
        }
        None => {
            println!("{}", content.as_str());
        }
    }

    vault.close()
}

/// Refuse to write over the vault database or anything that looks like one.
fn check_destination(cli: &Cli, dest: &Path) -> Result<()> {
    let settings = load_settings(cli)?;
    let db = vault_path(cli, &settings)?;
    let is_db_extension = dest
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("db"));

    if dest == db || is_db_extension {
        return Err(EnvRefError::CommandFailed(
            "refusing to export over a vault database".into(),
        ));
    }
    Ok(())
}

//! `envref resolve`: replace ref:// placeholders in a .env file.
//!
//! The vault is only opened (and the passphrase only asked for) when at
//! least one value references it.

use std::path::Path;

use zeroize::Zeroize;

use crate::cli::env_parser;
use crate::cli::output;
use crate::cli::{open_vault, write_private, Cli};
use crate::errors::Result;
use crate::resolve::{resolve_entries, Reference, Registry};

/// Execute the `resolve` command.
pub fn execute(cli: &Cli, file: &Path, output_path: Option<&Path>) -> Result<()> {
    let entries = env_parser::parse_env_file(file)?;

    let needs_vault = entries.iter().any(|(_, value)| {
        matches!(Reference::parse(value), Ok(Some(ref r)) if r.backend == "vault")
    });
    let vault = if needs_vault {
        Some(open_vault(cli)?)
    } else {
        None
    };

    #[cfg(feature = "keyring-store")]
    let keychain = crate::backend::KeychainBackend::new();

    let mut registry = Registry::new();
    if let Some(v) = &vault {
        registry.register(v);
    }
    #[cfg(feature = "keyring-store")]
    registry.register(&keychain);

    let mut resolved = resolve_entries(&entries, &registry)?;
    let mut content = env_parser::format_env(&resolved);
    for (_, value) in &mut resolved {
        value.zeroize();
    }

    let result = match output_path {
        Some(dest) => write_private(dest, content.as_bytes()).map(|()| {
            output::success(&format!(
                "Resolved {} variables into {}",
                entries.len(),
                dest.display()
            ));
        }),
        None => {
            print!("{content}");
            Ok(())
        }
    };
    content.zeroize();
    result?;

    if let Some(v) = &vault {
        v.close()?;
    }
    Ok(())
}

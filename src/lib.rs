pub mod backend;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod resolve;
pub mod vault;

pub use backend::Backend;
pub use errors::{EnvRefError, Result};
pub use vault::{Vault, VaultExport};

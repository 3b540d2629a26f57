//! One module per subcommand, each exposing an `execute` function.

pub mod completions;
pub mod delete;
pub mod export;
pub mod get;
pub mod import_cmd;
pub mod init;
pub mod list;
pub mod lock;
pub mod resolve;
pub mod set;
pub mod status;

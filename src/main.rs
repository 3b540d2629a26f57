use clap::Parser;
use envref::cli::commands;
use envref::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    // Log to stderr so stdout stays clean for `get`, `export` and `resolve`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("ENVREF_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(&cli),
        Commands::Set { ref key, ref value } => {
            commands::set::execute(&cli, key, value.as_deref())
        }
        Commands::Get { ref key } => commands::get::execute(&cli, key),
        Commands::List => commands::list::execute(&cli),
        Commands::Delete { ref key, force } => commands::delete::execute(&cli, key, force),
        Commands::Lock => commands::lock::execute_lock(&cli),
        Commands::Unlock => commands::lock::execute_unlock(&cli),
        Commands::Status => commands::status::execute(&cli),
        Commands::Export { ref output } => commands::export::execute(&cli, output.as_deref()),
        Commands::Import { ref file } => commands::import_cmd::execute(&cli, file),
        Commands::Resolve {
            ref file,
            ref output,
        } => commands::resolve::execute(&cli, file, output.as_deref()),
        Commands::Completions { shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        envref::cli::output::report(&e);
        std::process::exit(1);
    }
}

//! Styled terminal output.
//!
//! Status lines go to stderr except `success`, `info` and `tip`, which
//! share stdout with command output. `get`, `export` and `resolve` print
//! their payload with plain `println!` so it can be piped.

use comfy_table::{ContentArrangement, Table};
use console::{style, StyledObject};

use crate::errors::EnvRefError;
use crate::resolve::SCHEME;

enum Stream {
    Out,
    Err,
}

fn emit(stream: Stream, mark: StyledObject<&str>, msg: &str) {
    match stream {
        Stream::Out => println!("{mark} {msg}"),
        Stream::Err => eprintln!("{mark} {msg}"),
    }
}

pub fn success(msg: &str) {
    emit(Stream::Out, style("\u{2713}").green().bold(), msg);
}

pub fn error(msg: &str) {
    emit(Stream::Err, style("\u{2717}").red().bold(), msg);
}

pub fn warning(msg: &str) {
    emit(Stream::Err, style("\u{26a0}").yellow().bold(), msg);
}

pub fn info(msg: &str) {
    emit(Stream::Out, style("\u{2139}").blue().bold(), msg);
}

/// Dimmed follow-up suggestion.
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print an error followed by its remediation hint, both on stderr.
pub fn report(err: &EnvRefError) {
    error(&err.to_string());
    if let Some(hint) = err.hint() {
        eprintln!("{} {}", style("\u{2192}").dim(), style(hint).dim());
    }
}

/// Table of stored keys next to the reference that resolves each one.
pub fn print_keys_table(keys: &[String]) {
    if keys.is_empty() {
        info("The vault is empty.");
        tip("Add one with `envref set <KEY>`.");
        return;
    }

    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Key", "Reference"]);

    for key in keys {
        table.add_row(vec![key.clone(), format!("{SCHEME}vault/{key}")]);
    }

    println!("{table}");
}

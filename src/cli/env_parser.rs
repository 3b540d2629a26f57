//! Minimal `.env` reading and writing for the `resolve` command.

use std::fmt::Write;
use std::fs;
use std::path::Path;

use crate::errors::{EnvRefError, Result};

/// Parse a single `.env` line into a (key, value) pair.
///
/// Returns `None` for blank lines, comments, and lines without `=`.
/// Handles: `export` prefix, double/single quotes, values with `=`.
pub fn parse_env_line(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();

    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);

    let (key, value) = trimmed.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);

    if key.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse `.env` content into ordered (key, value) pairs.
///
/// A repeated key keeps its first position and its last value.
pub fn parse_env(content: &str) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = Vec::new();

    for (key, value) in content.lines().filter_map(parse_env_line) {
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value.to_string(),
            None => entries.push((key.to_string(), value.to_string())),
        }
    }

    entries
}

/// Parse a `.env` file into ordered (key, value) pairs.
pub fn parse_env_file(path: &Path) -> Result<Vec<(String, String)>> {
    let content = fs::read_to_string(path).map_err(|e| {
        EnvRefError::CommandFailed(format!("failed to read {}: {e}", path.display()))
    })?;
    Ok(parse_env(&content))
}

/// Format pairs as `.env` file content, quoting where needed.
pub fn format_env(entries: &[(String, String)]) -> String {
    let mut out = String::new();
    for (key, value) in entries {
        if needs_quotes(value) {
            let escaped = value
                .replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('\n', "\\n");
            let _ = writeln!(out, "{key}=\"{escaped}\"");
        } else {
            let _ = writeln!(out, "{key}={value}");
        }
    }
    out
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| matches!(c, ' ' | '#' | '"' | '\'' | '\n' | '$' | '\\'))
}

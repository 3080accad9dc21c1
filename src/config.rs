//! Environment files.
//!
//! Reads the subset of shell syntax commonly found in `.env`-style files:
//!
//! ```text
//! # comment
//! export PATH=/usr/local/bin:/usr/bin
//! GREETING="hello world"
//! LOGDIR=$HOME/logs
//! ```
//!
//! Values may reference variables assigned earlier in the same file.
//! Malformed lines are logged and skipped.
use std::fs;
use std::path::Path;

use log::warn;

use crate::environment::Environment;
use crate::error::{ErrorKind, ShellError, ShellResult};
use crate::utils::is_valid_var_name;

pub fn load_env_file(path: impl AsRef<Path>) -> ShellResult<Environment> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|err| ShellError::from_io(ErrorKind::Io, path.display(), err))?;
    Ok(parse_env_file(&content))
}

pub fn parse_env_file(content: &str) -> Environment {
    let mut env = Environment::new();
    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let assignment = line.strip_prefix("export ").unwrap_or(line);
        match parse_assignment(assignment, idx + 1) {
            Ok((name, value)) => {
                let value = env.expand(value);
                env.set(name, value);
            }
            Err(err) => warn!("config:{}: {}", idx + 1, err.display_simple()),
        }
    }
    env
}

fn parse_assignment(input: &str, line: usize) -> ShellResult<(&str, &str)> {
    let (name, value) = input.trim().split_once('=').ok_or_else(|| {
        ShellError::new(
            ErrorKind::Config,
            format!("assignment missing '=' on line {line}"),
        )
    })?;
    let name = name.trim();
    if !is_valid_var_name(name) {
        return Err(ShellError::new(
            ErrorKind::Config,
            format!("invalid variable name '{name}' on line {line}"),
        )
        .with_context("Variable names must start with a letter or underscore, followed by letters, digits, or underscores"));
    }
    Ok((name, strip_quotes(value.trim())))
}

fn strip_quotes(input: &str) -> &str {
    let bytes = input.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &input[1..bytes.len() - 1];
        }
    }
    input
}

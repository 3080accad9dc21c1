//! Shell-style command lines bound to a virtual root and a private
//! environment.
//!
//! A [`Context`] turns a line such as `ls -l ${DIR}/*.log` into an argument
//! vector by expanding variables from its own [`Environment`], splitting the
//! result into words and globbing each word below the context's root. It can
//! then resolve the command through the context's `PATH` and run it.
//!
//! Building without the `context` feature leaves only the tokenizer, the
//! environment and the env-file loader, so fuzz targets and unit tests can
//! link the parsing logic without the filesystem and process layers.

mod config;
mod environment;
mod error;
mod file;
mod parse;
mod utils;

#[cfg(feature = "context")]
mod context;
#[cfg(feature = "context")]
mod execution;

pub use config::{load_env_file, parse_env_file};
pub use environment::{default_environment, Environment};
pub use error::{ErrorKind, ShellError, ShellResult};
pub use file::File;
pub use parse::{shell_escape, shell_split};

#[cfg(feature = "context")]
pub use context::Context;
#[cfg(feature = "context")]
pub use execution::{
    build_command, exit_status_code, CommandOutput, Invocation, ProcessRunner, SystemRunner,
};

/// Fuzz helper for tokenizer-only targets.
pub fn fuzz_split_bytes(data: &[u8]) {
    let input = String::from_utf8_lossy(data);
    if let Ok(tokens) = shell_split(&input) {
        for token in tokens {
            let escaped = shell_escape(&token);
            let _ = shell_split(&escaped);
        }
    }
}

/// Fuzz helper for expansion+tokenizer targets.
pub fn fuzz_expand_bytes(data: &[u8]) {
    let input = String::from_utf8_lossy(data);
    let env = Environment::from_iter([("A", "x y"), ("EMPTY", ""), ("QUOTE", "\"")]);
    let _ = shell_split(&env.expand(&input));
}

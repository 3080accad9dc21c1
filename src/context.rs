//! A context mimics a separate process environment for execution: it is
//! bound to a root directory and owns its own set of environment variables.
//!
//! Relative paths, glob patterns and `PATH` entries are all resolved against
//! the root instead of the process working directory, so several contexts
//! can coexist in one process without touching global state.
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::environment::Environment;
use crate::error::{ErrorKind, ShellError, ShellResult};
use crate::execution::{Invocation, ProcessRunner, SystemRunner};
use crate::parse::shell_split;
use crate::utils::clean_path;

mod glob;
mod lookup;

#[derive(Debug, Clone)]
pub struct Context {
    root: PathBuf,
    env: Environment,
}

impl Context {
    /// Create a context bound to `root` with an empty environment. Relative
    /// roots are resolved against the process working directory.
    pub fn new(root: impl AsRef<Path>) -> ShellResult<Context> {
        let cwd = env::current_dir()
            .map_err(|err| ShellError::from_io(ErrorKind::Io, "current directory", err))?;
        let root = resolve_root(&cwd, root.as_ref())?;
        debug!("context event=create root={}", root.display());
        Ok(Context {
            root,
            env: Environment::new(),
        })
    }

    /// Create a new context with an empty environment whose root is `path`
    /// interpreted relative to this context's root.
    pub fn context_at(&self, path: impl AsRef<Path>) -> ShellResult<Context> {
        let root = resolve_root(&self.root, path.as_ref())?;
        debug!("context event=create root={}", root.display());
        Ok(Context {
            root,
            env: Environment::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Change the root. Relative paths are interpreted relative to the old
    /// root; on failure the context is left unchanged.
    pub fn cd(&mut self, path: impl AsRef<Path>) -> ShellResult<()> {
        let root = resolve_root(&self.root, path.as_ref())?;
        debug!(
            "context event=cd from={} to={}",
            self.root.display(),
            root.display()
        );
        self.root = root;
        Ok(())
    }

    /// Expand variables and split into words, without globbing.
    pub fn split(&self, line: &str) -> ShellResult<Vec<String>> {
        shell_split(&self.env.expand(line))
    }

    /// Expand variables, split into words and replace every word that
    /// matches filesystem entries with those matches. Words without matches
    /// are kept verbatim; a word that is not a valid pattern fails the whole
    /// line with a `Glob` error.
    pub fn parse(&self, line: &str) -> ShellResult<Vec<String>> {
        let words = self.split(line)?;
        self.ensure_root()?;
        let mut args = Vec::with_capacity(words.len());
        for word in words {
            let matches = if word.is_empty() {
                Vec::new()
            } else {
                self.glob_unchecked(&word)?
            };
            if matches.is_empty() {
                args.push(word);
                continue;
            }
            args.extend(matches.into_iter().map(|file| file.path().to_string()));
        }
        debug!("context event=parse args={}", args.len());
        Ok(args)
    }

    /// Parse `line` and run it with the context's root as working directory
    /// and its environment as the child's entire environment. Returns the
    /// interleaved stdout/stderr of the child.
    pub fn run(&self, line: &str) -> ShellResult<String> {
        self.run_with(&SystemRunner, line)
    }

    pub fn run_with<R: ProcessRunner + ?Sized>(&self, runner: &R, line: &str) -> ShellResult<String> {
        let args = self.parse(line)?;
        let Some(command) = args.first().cloned() else {
            return Err(ShellError::new(ErrorKind::Parse, "empty command")
                .with_context("The line contains no words after expansion"));
        };
        let program = clean_path(&self.root.join(self.look_path(&command)?));
        let invocation = Invocation {
            program,
            args,
            env: self.env.to_array(),
            dir: self.root.clone(),
        };
        let result = runner.run(&invocation)?;
        debug!(
            "context event=exit program={} status={}",
            invocation.program.display(),
            result.status_code
        );
        if result.status_code != 0 {
            return Err(ShellError::new(
                ErrorKind::Execution,
                format!("{command}: exit status {}", result.status_code),
            )
            .with_exit_code(result.status_code)
            .with_output(result.output));
        }
        Ok(result.output)
    }

    fn ensure_root(&self) -> ShellResult<()> {
        check_dir(&self.root)
    }
}

/// Clean `candidate`, make it absolute against `base` and require it to be
/// an existing directory.
fn resolve_root(base: &Path, candidate: &Path) -> ShellResult<PathBuf> {
    let root = clean_path(&base.join(candidate));
    check_dir(&root)?;
    Ok(root)
}

fn check_dir(path: &Path) -> ShellResult<()> {
    let meta = fs::metadata(path)
        .map_err(|err| ShellError::from_io(ErrorKind::Root, path.display(), err))?;
    if !meta.is_dir() {
        return Err(ShellError::new(
            ErrorKind::Root,
            format!("{}: not a directory", path.display()),
        )
        .with_context("Contexts can only be created on directories"));
    }
    Ok(())
}

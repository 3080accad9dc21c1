//! Process execution for contexts.
//!
//! `Context::run` only assembles an [`Invocation`]; the actual spawn goes
//! through a [`ProcessRunner`] so callers can substitute their own (for
//! timeouts, sandboxing, or tests). [`SystemRunner`] is the default.
use std::fs;
use std::io::{self, Read};
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use log::debug;
use nix::unistd::pipe;

use crate::error::{ErrorKind, ShellError, ShellResult};

/// Everything needed to start one child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Resolved executable.
    pub program: PathBuf,
    /// Full argument vector; `args[0]` is the command as written.
    pub args: Vec<String>,
    /// `KEY=VALUE` entries making up the child's whole environment.
    pub env: Vec<String>,
    /// Working directory of the child.
    pub dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output and standard error, interleaved as written.
    pub output: String,
    pub status_code: i32,
}

pub trait ProcessRunner {
    /// Run the invocation to completion. Blocks for the child's lifetime.
    fn run(&self, invocation: &Invocation) -> ShellResult<CommandOutput>;
}

/// Spawns real processes with stdout and stderr sharing one pipe.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> ShellResult<CommandOutput> {
        let program = invocation.program.display().to_string();
        let (read_fd, write_fd) = pipe()
            .map_err(|err| ShellError::from_io(ErrorKind::Execution, &program, io::Error::from(err)))?;
        let err_fd = write_fd
            .try_clone()
            .map_err(|err| ShellError::from_io(ErrorKind::Execution, &program, err))?;

        let mut child = {
            let mut command = build_command(invocation);
            command
                .stdin(Stdio::null())
                .stdout(Stdio::from(write_fd))
                .stderr(Stdio::from(err_fd));
            // The command owns our copies of the write end; dropping it at the
            // end of this block lets the read below see EOF.
            command.spawn().map_err(|err| wrap_spawn_error(&program, err))?
        };
        debug!("context event=spawn pid={} program={}", child.id(), program);

        let mut raw = Vec::new();
        let read_result = fs::File::from(read_fd).read_to_end(&mut raw);
        let status = child
            .wait()
            .map_err(|err| ShellError::from_io(ErrorKind::Execution, &program, err))?;
        let output = String::from_utf8_lossy(&raw).into_owned();
        if let Err(err) = read_result {
            return Err(ShellError::from_io(ErrorKind::Execution, &program, err).with_output(output));
        }
        Ok(CommandOutput {
            output,
            status_code: exit_status_code(status),
        })
    }
}

pub fn build_command(invocation: &Invocation) -> Command {
    let mut command = Command::new(&invocation.program);
    if let Some((arg0, rest)) = invocation.args.split_first() {
        command.arg0(arg0).args(rest);
    }
    command.env_clear();
    for entry in &invocation.env {
        if let Some((key, value)) = entry.split_once('=') {
            command.env(key, value);
        }
    }
    command.current_dir(&invocation.dir);
    command
}

pub fn exit_status_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        code
    } else if let Some(sig) = status.signal() {
        128 + sig
    } else {
        1
    }
}

fn wrap_spawn_error(cmd: &str, err: io::Error) -> ShellError {
    let message = match err.kind() {
        io::ErrorKind::NotFound => format!("{cmd}: command not found"),
        io::ErrorKind::PermissionDenied => format!("{cmd}: permission denied"),
        _ => format!("{cmd}: {err}"),
    };
    ShellError::new(ErrorKind::Execution, message).with_source(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sh_invocation(script: &str, dir: PathBuf, env: Vec<String>) -> Option<Invocation> {
        let program = PathBuf::from("/bin/sh");
        if !program.exists() {
            eprintln!("/bin/sh not found; skipping test");
            return None;
        }
        Some(Invocation {
            program,
            args: vec!["sh".to_string(), "-c".to_string(), script.to_string()],
            env,
            dir,
        })
    }

    #[test]
    fn captures_stdout_and_stderr_together() {
        let dir = tempdir().unwrap();
        let Some(invocation) = sh_invocation(
            "echo out; echo err 1>&2; echo done",
            dir.path().to_path_buf(),
            Vec::new(),
        ) else {
            return;
        };
        let result = SystemRunner.run(&invocation).unwrap();
        assert_eq!(result.output, "out\nerr\ndone\n");
        assert_eq!(result.status_code, 0);
    }

    #[test]
    fn child_sees_only_given_env_and_dir() {
        let dir = tempdir().unwrap();
        let Some(invocation) = sh_invocation(
            "printf '%s|%s|%s' \"$GREETING\" \"${HOME:-unset}\" \"$(pwd)\"",
            dir.path().to_path_buf(),
            vec!["GREETING=hello=world".to_string()],
        ) else {
            return;
        };
        let result = SystemRunner.run(&invocation).unwrap();
        let expected_dir = dir.path().canonicalize().unwrap();
        assert_eq!(
            result.output,
            format!("hello=world|unset|{}", expected_dir.display())
        );
    }

    #[test]
    fn exit_codes_are_reported() {
        let dir = tempdir().unwrap();
        let Some(invocation) =
            sh_invocation("echo partial; exit 7", dir.path().to_path_buf(), Vec::new())
        else {
            return;
        };
        let result = SystemRunner.run(&invocation).unwrap();
        assert_eq!(result.status_code, 7);
        assert_eq!(result.output, "partial\n");
    }

    #[test]
    fn spawn_failure_is_execution_error() {
        let dir = tempdir().unwrap();
        let invocation = Invocation {
            program: dir.path().join("missing"),
            args: vec!["missing".to_string()],
            env: Vec::new(),
            dir: dir.path().to_path_buf(),
        };
        let err = SystemRunner.run(&invocation).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Execution);
        assert!(err.message.ends_with("command not found"));
        assert_eq!(err.io_kind(), Some(io::ErrorKind::NotFound));
    }
}

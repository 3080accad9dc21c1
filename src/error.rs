//! Error types and reporting for command-line contexts.
//!
//! Every fallible operation returns a `ShellError` which carries:
//! - Error kind (root validation, parsing, lookup, execution, etc.)
//! - Human-readable message
//! - Optional hint about what input caused the error
//! - Optional character position for pointing to the problem location
//! - For execution failures, the exit code and any captured output

use std::fmt;
use std::io;
use std::sync::Arc;

/// Categorized error types for better diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Root directory missing, unreadable or not a directory
    Root,
    /// Malformed quoting/escaping or an empty command line
    Parse,
    /// Invalid glob pattern
    Glob,
    /// Executable not found or not executable
    Lookup,
    /// Process could not be spawned or exited unsuccessfully
    Execution,
    /// Error loading an environment file
    Config,
    /// Any other filesystem failure
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Root => write!(f, "Root error"),
            ErrorKind::Parse => write!(f, "Parse error"),
            ErrorKind::Glob => write!(f, "Glob error"),
            ErrorKind::Lookup => write!(f, "Lookup error"),
            ErrorKind::Execution => write!(f, "Execution error"),
            ErrorKind::Config => write!(f, "Config error"),
            ErrorKind::Io => write!(f, "I/O error"),
        }
    }
}

/// Rich error type with context information
#[derive(Debug, Clone)]
pub struct ShellError {
    pub kind: ErrorKind,
    pub message: String,
    /// Additional context explaining what was being processed
    pub context: Option<String>,
    /// Character position in input where the error occurred
    pub position: Option<usize>,
    /// Exit code of a child that ran but failed
    pub exit_code: Option<i32>,
    /// Combined output captured before the failure
    pub output: Option<String>,
    source: Option<Arc<io::Error>>,
}

impl ShellError {
    /// Create a new error with just the kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ShellError {
            kind,
            message: message.into(),
            context: None,
            position: None,
            exit_code: None,
            output: None,
            source: None,
        }
    }

    /// Wrap an I/O error, keeping it reachable through `Error::source`.
    pub fn from_io(kind: ErrorKind, subject: impl fmt::Display, err: io::Error) -> Self {
        ShellError::new(kind, format!("{subject}: {err}")).with_source(err)
    }

    /// Add context string (e.g., "Missing closing quote")
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add character position in input where error occurred
    pub fn with_position(mut self, pos: usize) -> Self {
        self.position = Some(pos);
        self
    }

    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_source(mut self, err: io::Error) -> Self {
        self.source = Some(Arc::new(err));
        self
    }

    /// Kind of the underlying I/O error, if there is one.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        self.source.as_ref().map(|err| err.kind())
    }

    /// Format error with a snippet of the input showing where the problem is
    pub fn display_with_input(&self, input: &str) -> String {
        let mut msg = format!("{}: {}", self.kind, self.message);

        if let Some(pos) = self.position {
            if pos < input.len() && input.is_char_boundary(pos) {
                let start = floor_char_boundary(input, pos.saturating_sub(15));
                let end = floor_char_boundary(input, (pos + 15).min(input.len()));
                let snippet = &input[start..end];

                msg.push_str(&format!("\n  near: '{}'", snippet.replace('\n', "↵")));
                msg.push('\n');

                // Pointer lines up with the snippet after the "  near: '" prefix.
                let offset = input[start..pos].chars().count();
                msg.push_str(&format!("  {}{}", " ".repeat(offset + 7), "^"));
            } else {
                msg.push_str(&format!("\n  at position {} (end of input)", pos));
            }
        } else if let Some(context) = &self.context {
            msg.push_str(&format!("\n  hint: {}", context));
        }

        msg
    }

    /// Simplified display without input context
    pub fn display_simple(&self) -> String {
        let mut msg = format!("{}: {}", self.kind, self.message);
        if let Some(context) = &self.context {
            msg.push_str(&format!("\n  hint: {}", context));
        }
        msg
    }
}

fn floor_char_boundary(input: &str, mut idx: usize) -> usize {
    while idx > 0 && !input.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_simple())
    }
}

impl std::error::Error for ShellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

/// Convenience type alias for Results with ShellError
pub type ShellResult<T> = Result<T, ShellError>;

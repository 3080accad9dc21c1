//! Absolute file paths with shell-safe accessors.
//!
//! Methods starting with `shell_` escape their result so it can be spliced
//! back into a command line and split as a single word.
use std::env;
use std::fmt;
use std::io;
use std::path::Path;

use crate::parse::shell_escape;
use crate::utils::clean_path;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct File {
    path: String,
}

impl File {
    /// Create a file from `path`, resolving relative paths against the
    /// process working directory. Fails only if that directory is unknown.
    pub fn new(path: impl AsRef<Path>) -> io::Result<File> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            clean_path(path)
        } else {
            clean_path(&env::current_dir()?.join(path))
        };
        Ok(File::from(absolute.to_string_lossy().into_owned()))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Final path element, extension included.
    pub fn fullname(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[idx + 1..],
            None => &self.path,
        }
    }

    /// Final path element without its extension.
    pub fn name(&self) -> &str {
        let fullname = self.fullname();
        &fullname[..fullname.len() - self.extension().len()]
    }

    /// Suffix of the final element starting at its last dot, or `""`.
    pub fn extension(&self) -> &str {
        let fullname = self.fullname();
        match fullname.rfind('.') {
            Some(idx) => &fullname[idx..],
            None => "",
        }
    }

    pub fn shell_path(&self) -> String {
        shell_escape(self.path())
    }

    pub fn shell_fullname(&self) -> String {
        shell_escape(self.fullname())
    }

    pub fn shell_name(&self) -> String {
        shell_escape(self.name())
    }

    pub fn shell_extension(&self) -> String {
        shell_escape(self.extension())
    }
}

impl From<String> for File {
    fn from(path: String) -> Self {
        File { path }
    }
}

impl From<&str> for File {
    fn from(path: &str) -> Self {
        File::from(path.to_string())
    }
}

impl AsRef<Path> for File {
    fn as_ref(&self) -> &Path {
        Path::new(&self.path)
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.path)
    }
}

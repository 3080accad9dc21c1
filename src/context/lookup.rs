use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use log::debug;

use super::Context;
use crate::error::{ErrorKind, ShellError, ShellResult};
use crate::utils::clean_path;

impl Context {
    /// Resolve `file` to an executable using the context's own `PATH`.
    ///
    /// A name containing `/` is taken as already located: it is returned
    /// unchanged if it is an executable regular file (relative names are
    /// checked below the root). Otherwise each `PATH` entry is tried in
    /// order, with empty entries meaning the root itself.
    pub fn look_path(&self, file: &str) -> ShellResult<PathBuf> {
        self.ensure_root()?;
        if file.contains('/') {
            return match find_executable(&self.root.join(file)) {
                Ok(()) => Ok(PathBuf::from(file)),
                Err(err) => Err(ShellError::from_io(ErrorKind::Lookup, file, err)),
            };
        }

        let path_env = self.env.get("PATH");
        for dir in path_env.split(':') {
            let dir = if dir.is_empty() { "." } else { dir };
            let candidate = clean_path(&self.root.join(dir).join(file));
            if find_executable(&candidate).is_ok() {
                debug!(
                    "context event=lookup name={} path={}",
                    file,
                    candidate.display()
                );
                return Ok(candidate);
            }
        }
        Err(ShellError::new(
            ErrorKind::Lookup,
            format!("{file}: executable file not found in $PATH"),
        )
        .with_context(format!("PATH={path_env}")))
    }
}

fn find_executable(path: &Path) -> io::Result<()> {
    let meta = fs::metadata(path)?;
    if meta.is_file() && meta.permissions().mode() & 0o111 != 0 {
        return Ok(());
    }
    Err(io::Error::new(
        io::ErrorKind::PermissionDenied,
        "not an executable file",
    ))
}

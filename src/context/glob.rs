use std::env;
use std::path::{Path, PathBuf};

use glob::{glob_with, MatchOptions, Pattern};
use log::{debug, warn};

use super::Context;
use crate::error::{ErrorKind, ShellError, ShellResult};
use crate::file::File;
use crate::utils::clean_path;

// `*` and `?` never cross a `/` but do match a leading dot.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

impl Context {
    /// Match `pattern` against the filesystem. Relative patterns are matched
    /// below the root; results are absolute and sorted. No matches is an
    /// empty list, not an error.
    pub fn glob(&self, pattern: &str) -> ShellResult<Vec<File>> {
        self.ensure_root()?;
        self.glob_unchecked(pattern)
    }

    /// Like [`Context::glob`], but evaluates relative patterns by switching
    /// the process working directory to the root for the duration of the
    /// call. The previous directory is restored on every exit path.
    ///
    /// The working directory is process-global: concurrent callers must
    /// serialize around this method. Prefer [`Context::glob`].
    pub fn glob_in_working_dir(&self, pattern: &str) -> ShellResult<Vec<File>> {
        self.ensure_root()?;
        if Path::new(pattern).is_absolute() {
            return collect_matches(pattern, None);
        }
        let _guard = WorkingDirGuard::enter(&self.root)?;
        collect_matches(pattern, Some(&self.root))
    }

    pub(super) fn glob_unchecked(&self, pattern: &str) -> ShellResult<Vec<File>> {
        if Path::new(pattern).is_absolute() {
            return collect_matches(pattern, None);
        }
        match self.root.to_str() {
            Some(root) => {
                let anchored = format!("{}/{}", Pattern::escape(root), pattern);
                collect_matches(&anchored, None)
            }
            // A root that is not UTF-8 cannot be spliced into a pattern.
            None => self.glob_in_working_dir(pattern),
        }
    }
}

/// Run the glob and turn matches into absolute files. Relative matches are
/// joined onto `base`.
fn collect_matches(pattern: &str, base: Option<&Path>) -> ShellResult<Vec<File>> {
    let paths = glob_with(pattern, MATCH_OPTIONS).map_err(|err| {
        ShellError::new(ErrorKind::Glob, format!("{pattern}: {}", err.msg)).with_position(err.pos)
    })?;
    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => files.push(to_file(path, base)),
            // Unreadable directories simply contribute no matches.
            Err(err) => debug!(
                "context event=glob skip path={} error={}",
                err.path().display(),
                err.error()
            ),
        }
    }
    debug!("context event=glob pattern={} matches={}", pattern, files.len());
    Ok(files)
}

fn to_file(path: PathBuf, base: Option<&Path>) -> File {
    let absolute = match base {
        Some(base) if !path.is_absolute() => base.join(path),
        _ => path,
    };
    File::from(clean_path(&absolute).to_string_lossy().into_owned())
}

/// Switches the process working directory and switches it back on drop.
struct WorkingDirGuard {
    saved: PathBuf,
}

impl WorkingDirGuard {
    fn enter(dir: &Path) -> ShellResult<Self> {
        let saved = env::current_dir()
            .map_err(|err| ShellError::from_io(ErrorKind::Io, "current directory", err))?;
        env::set_current_dir(dir)
            .map_err(|err| ShellError::from_io(ErrorKind::Root, dir.display(), err))?;
        debug!("context event=chdir to={}", dir.display());
        Ok(Self { saved })
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(err) = env::set_current_dir(&self.saved) {
            warn!(
                "context event=chdir restore={} error={}",
                self.saved.display(),
                err
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::tempdir;

    fn populated() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        for name in ["a1", "a2", "a3", "a4", "b1", ".hidden"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/a5"), "a5").unwrap();
        dir
    }

    fn names(files: &[File]) -> Vec<&str> {
        files.iter().map(File::fullname).collect()
    }

    #[test]
    fn glob_matches_relative_to_root() {
        let dir = populated();
        let ctx = Context::new(dir.path()).unwrap();
        let files = ctx.glob("a*").unwrap();
        assert_eq!(names(&files), vec!["a1", "a2", "a3", "a4"]);
        for file in &files {
            assert!(Path::new(file.path()).is_absolute());
            assert!(file.path().starts_with(ctx.root().to_str().unwrap()));
        }
        assert_eq!(names(&ctx.glob("*/a?").unwrap()), vec!["a5"]);
        assert_eq!(names(&ctx.glob(".h*").unwrap()), vec![".hidden"]);
    }

    #[test]
    fn no_matches_is_empty_not_error() {
        let dir = populated();
        let ctx = Context::new(dir.path()).unwrap();
        assert!(ctx.glob("nomatch*").unwrap().is_empty());
    }

    #[test]
    fn absolute_patterns_ignore_root() {
        let dir = populated();
        let other = tempdir().unwrap();
        let ctx = Context::new(other.path()).unwrap();
        let pattern = format!("{}/b*", dir.path().display());
        assert_eq!(names(&ctx.glob(&pattern).unwrap()), vec!["b1"]);
    }

    #[test]
    fn root_with_glob_characters_is_literal() {
        let dir = tempdir().unwrap();
        let odd = dir.path().join("[x]");
        fs::create_dir(&odd).unwrap();
        fs::write(odd.join("a1"), "a1").unwrap();
        let ctx = Context::new(&odd).unwrap();
        assert_eq!(names(&ctx.glob("a*").unwrap()), vec!["a1"]);
    }

    #[test]
    fn invalid_pattern_is_a_glob_error() {
        let dir = populated();
        let ctx = Context::new(dir.path()).unwrap();
        let err = ctx.glob("a[").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Glob);
    }

    #[test]
    #[serial]
    fn working_dir_variant_restores_cwd() {
        let dir = populated();
        let ctx = Context::new(dir.path()).unwrap();
        let before = env::current_dir().unwrap();

        let files = ctx.glob_in_working_dir("a*").unwrap();
        assert_eq!(names(&files), vec!["a1", "a2", "a3", "a4"]);
        assert!(files.iter().all(|f| Path::new(f.path()).is_absolute()));
        assert_eq!(env::current_dir().unwrap(), before);

        assert!(ctx.glob_in_working_dir("a[").is_err());
        assert_eq!(env::current_dir().unwrap(), before);
    }
}

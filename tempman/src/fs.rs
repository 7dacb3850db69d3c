//! Filesystem collaborator for the manager.
//!
//! Everything the manager needs from its environment sits behind
//! [`FileSystem`], so a test suite can substitute an in-memory
//! implementation. [`OsFileSystem`] is the real one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The filesystem operations the manager consumes.
pub trait FileSystem {
    /// Whether `path` exists and is a directory.
    fn dir_exists(&self, path: &Path) -> bool;

    /// Atomically create a new empty file with a unique name under `dir`,
    /// seeded with `prefix`, and return its pathname. The file must survive
    /// the call; removal is the caller's responsibility.
    fn create_unique_file(&self, dir: &Path, prefix: &str) -> io::Result<PathBuf>;

    /// Rename `from` to `to`.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Whether `path` exists and is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Delete `path` if it currently exists. A missing file is success, not
    /// an error.
    fn remove_if_present(&self, path: &Path) -> io::Result<()>;
}

/// [`FileSystem`] backed by the OS.
///
/// Unique names come from [`tempfile::Builder`], which creates with
/// exclusive semantics and retries on collision, so managers in separate
/// processes pointed at the same directory cannot race each other into the
/// same name.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_unique_file(&self, dir: &Path, prefix: &str) -> io::Result<PathBuf> {
        let file = tempfile::Builder::new().prefix(prefix).tempfile_in(dir)?;
        // Detach from RAII deletion; the manager owns removal from here on.
        let (_, pathname) = file.keep().map_err(|err| err.error)?;
        Ok(pathname)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn remove_if_present(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

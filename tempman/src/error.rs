//! Error types for temp-file management.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The directory handed to [`TempFileManager::new`] does not exist.
///
/// Fatal to construction; no manager is produced.
///
/// [`TempFileManager::new`]: crate::TempFileManager::new
#[derive(Debug, Error)]
#[error("the directory `{}` does not exist", .path.display())]
pub struct ConfigurationError {
    path: PathBuf,
}

impl ConfigurationError {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The directory that failed the existence check.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A temp file could not be created.
///
/// Nothing is registered when this is returned; the manager holds no partial
/// state for the failed file.
#[derive(Debug, Error)]
pub enum TempFileCreationError {
    /// The unique-creation primitive failed (unwritable directory, exhausted
    /// inodes, ...).
    #[error("failed to create a temp file in `{}`", .dir.display())]
    Create {
        /// The directory the file was to be created in.
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The rename that appends the requested extension failed. The transient
    /// unsuffixed file has already been removed.
    #[error("failed to attach extension `{extension}` to `{}`", .pathname.display())]
    AttachExtension {
        /// The pathname the file was created under.
        pathname: PathBuf,
        /// The extension that was to be appended.
        extension: String,
        #[source]
        source: io::Error,
    },
}

//! Temp-file lifecycle management within a single directory.

use std::collections::HashSet;
use std::mem;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ConfigurationError, TempFileCreationError};
use crate::fs::{FileSystem, OsFileSystem};

/// Basename prefix for every file a manager creates. Namespaces generated
/// names so stray files are identifiable in a shared directory.
const BASENAME_PREFIX: &str = "TempFileManager_";

/// Creates, tracks, and removes temp files inside one pre-existing directory.
///
/// Files are created empty under collision-resistant unique names of the form
/// `TempFileManager_<random>[.<extension>]`. Every pathname handed out by
/// [`create_file`] stays registered until this manager removes it, one by one
/// through scoped consumption ([`consume_file`]) or in bulk ([`clean_up`]).
/// The manager never touches files it did not create itself.
///
/// All operations are synchronous. A manager is single-owner state (`&mut
/// self` throughout); for concurrent use, give each flow of control its own
/// instance -- instances are independent even over the same directory.
///
/// [`create_file`]: Self::create_file
/// [`consume_file`]: Self::consume_file
/// [`clean_up`]: Self::clean_up
#[derive(Debug)]
pub struct TempFileManager<F: FileSystem = OsFileSystem> {
    dir: PathBuf,
    registry: HashSet<PathBuf>,
    fs: F,
}

impl TempFileManager {
    /// Build a manager over the OS filesystem.
    ///
    /// Fails with [`ConfigurationError`] if `dir` does not exist. The
    /// directory is validated once, here, and never re-checked.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ConfigurationError> {
        Self::with_filesystem(dir, OsFileSystem)
    }
}

impl<F: FileSystem> TempFileManager<F> {
    /// Build a manager over a caller-supplied [`FileSystem`].
    pub fn with_filesystem(dir: impl Into<PathBuf>, fs: F) -> Result<Self, ConfigurationError> {
        let dir = dir.into();
        if !fs.dir_exists(&dir) {
            return Err(ConfigurationError::new(dir));
        }
        Ok(Self {
            dir,
            registry: HashSet::new(),
            fs,
        })
    }

    /// The directory this manager creates temp files in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create, register, and return a new empty uniquely-named temp file.
    pub fn create_file(&mut self) -> Result<PathBuf, TempFileCreationError> {
        self.create_registered(None)
    }

    /// Like [`create_file`], with `.<extension>` appended to the generated
    /// name. `extension` is a plain suffix (`"jpg"`), no leading dot.
    ///
    /// [`create_file`]: Self::create_file
    pub fn create_file_with_extension(
        &mut self,
        extension: &str,
    ) -> Result<PathBuf, TempFileCreationError> {
        self.create_registered(Some(extension))
    }

    /// Create a temp file, hand its pathname to `action`, and remove it again
    /// before returning -- on every exit path, an unwinding panic included.
    ///
    /// `action`'s return value passes through unchanged; the manager never
    /// inspects or wraps it. If creation itself fails, `action` is not
    /// invoked.
    pub fn consume_file<T>(
        &mut self,
        action: impl FnOnce(&Path) -> T,
    ) -> Result<T, TempFileCreationError> {
        self.consume_registered(None, action)
    }

    /// Like [`consume_file`], with `.<extension>` appended to the generated
    /// name.
    ///
    /// [`consume_file`]: Self::consume_file
    pub fn consume_file_with_extension<T>(
        &mut self,
        extension: &str,
        action: impl FnOnce(&Path) -> T,
    ) -> Result<T, TempFileCreationError> {
        self.consume_registered(Some(extension), action)
    }

    /// Remove every remaining tracked temp file.
    ///
    /// Files already gone from disk are forgotten silently. Idempotent; the
    /// registry is empty on return.
    pub fn clean_up(&mut self) {
        let remaining = mem::take(&mut self.registry);
        if !remaining.is_empty() {
            debug!(count = remaining.len(), "removing remaining temp files");
        }
        for pathname in remaining {
            remove_if_present(&self.fs, &pathname);
        }
    }

    fn create_registered(
        &mut self,
        extension: Option<&str>,
    ) -> Result<PathBuf, TempFileCreationError> {
        let pathname = self.create_unregistered(extension)?;
        self.registry.insert(pathname.clone());
        Ok(pathname)
    }

    /// Creates the file on disk without touching the registry.
    fn create_unregistered(
        &self,
        extension: Option<&str>,
    ) -> Result<PathBuf, TempFileCreationError> {
        let pathname = self
            .fs
            .create_unique_file(&self.dir, BASENAME_PREFIX)
            .map_err(|source| TempFileCreationError::Create {
                dir: self.dir.clone(),
                source,
            })?;

        let Some(extension) = extension else {
            debug!(path = %pathname.display(), "created temp file");
            return Ok(pathname);
        };

        let mut suffixed = pathname.clone().into_os_string();
        suffixed.push(".");
        suffixed.push(extension);
        let suffixed = PathBuf::from(suffixed);

        if let Err(source) = self.fs.rename(&pathname, &suffixed) {
            // A failed rename must not leak the transient unsuffixed file.
            remove_if_present(&self.fs, &pathname);
            return Err(TempFileCreationError::AttachExtension {
                pathname,
                extension: extension.to_owned(),
                source,
            });
        }

        debug!(path = %suffixed.display(), "created temp file");
        Ok(suffixed)
    }

    fn consume_registered<T>(
        &mut self,
        extension: Option<&str>,
        action: impl FnOnce(&Path) -> T,
    ) -> Result<T, TempFileCreationError> {
        let pathname = self.create_registered(extension)?;
        let guard = RemoveOnDrop {
            manager: self,
            pathname,
        };
        Ok(action(&guard.pathname))
    }
}

/// Removes and unregisters one pathname when dropped, so a panicking consumer
/// closure cannot skip removal.
struct RemoveOnDrop<'a, F: FileSystem> {
    manager: &'a mut TempFileManager<F>,
    pathname: PathBuf,
}

impl<F: FileSystem> Drop for RemoveOnDrop<'_, F> {
    fn drop(&mut self) {
        remove_if_present(&self.manager.fs, &self.pathname);
        self.manager.registry.remove(&self.pathname);
    }
}

/// Best-effort removal: a missing file is fine, anything else is logged and
/// otherwise ignored so cleanup stays infallible.
fn remove_if_present<F: FileSystem>(fs: &F, pathname: &Path) {
    if let Err(err) = fs.remove_if_present(pathname) {
        warn!(path = %pathname.display(), "failed to remove temp file: {err}");
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeSet;
    use std::io;
    use std::path::{Path, PathBuf};

    use super::{FileSystem, TempFileManager};
    use crate::error::TempFileCreationError;

    /// In-memory stand-in for the OS filesystem, with per-operation failure
    /// switches for the error paths the real filesystem can't produce on
    /// demand.
    #[derive(Debug, Default)]
    struct StubFs {
        dirs: BTreeSet<PathBuf>,
        files: RefCell<BTreeSet<PathBuf>>,
        next_id: Cell<u32>,
        fail_create: bool,
        fail_rename: bool,
        fail_remove: bool,
    }

    impl StubFs {
        fn rooted_at(dir: &str) -> Self {
            Self {
                dirs: BTreeSet::from([PathBuf::from(dir)]),
                ..Self::default()
            }
        }

        fn file_count(&self) -> usize {
            self.files.borrow().len()
        }
    }

    impl FileSystem for StubFs {
        fn dir_exists(&self, path: &Path) -> bool {
            self.dirs.contains(path)
        }

        fn create_unique_file(&self, dir: &Path, prefix: &str) -> io::Result<PathBuf> {
            if self.fail_create {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "create refused",
                ));
            }
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            let pathname = dir.join(format!("{prefix}{id:06}"));
            self.files.borrow_mut().insert(pathname.clone());
            Ok(pathname)
        }

        fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
            if self.fail_rename {
                return Err(io::Error::other("rename refused"));
            }
            let mut files = self.files.borrow_mut();
            if !files.remove(from) {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no such file"));
            }
            files.insert(to.to_path_buf());
            Ok(())
        }

        fn is_file(&self, path: &Path) -> bool {
            self.files.borrow().contains(path)
        }

        fn remove_if_present(&self, path: &Path) -> io::Result<()> {
            if self.fail_remove {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "remove refused",
                ));
            }
            self.files.borrow_mut().remove(path);
            Ok(())
        }
    }

    #[test]
    fn construction_rejects_a_missing_directory() {
        let err = TempFileManager::with_filesystem("/elsewhere", StubFs::rooted_at("/scratch"))
            .expect_err("missing directory must be rejected");

        assert_eq!(err.path(), Path::new("/elsewhere"));
    }

    #[test]
    fn creation_failure_registers_nothing() {
        let fs = StubFs {
            fail_create: true,
            ..StubFs::rooted_at("/scratch")
        };
        let mut manager = TempFileManager::with_filesystem("/scratch", fs).expect("manager");

        let err = manager.create_file().expect_err("create must fail");

        assert!(matches!(err, TempFileCreationError::Create { .. }));
        assert!(manager.registry.is_empty());
    }

    #[test]
    fn extension_is_attached_via_rename() {
        let mut manager =
            TempFileManager::with_filesystem("/scratch", StubFs::rooted_at("/scratch"))
                .expect("manager");

        let pathname = manager.create_file_with_extension("jpg").expect("create");

        assert_eq!(pathname, Path::new("/scratch/TempFileManager_000000.jpg"));
        assert!(manager.fs.is_file(&pathname));
        // The transient unsuffixed file is gone.
        assert_eq!(manager.fs.file_count(), 1);
        assert!(manager.registry.contains(&pathname));
    }

    #[test]
    fn rename_failure_is_a_creation_error_and_leaks_nothing() {
        let fs = StubFs {
            fail_rename: true,
            ..StubFs::rooted_at("/scratch")
        };
        let mut manager = TempFileManager::with_filesystem("/scratch", fs).expect("manager");

        let err = manager
            .create_file_with_extension("jpg")
            .expect_err("rename must fail");

        assert!(matches!(
            err,
            TempFileCreationError::AttachExtension { extension, .. } if extension == "jpg"
        ));
        assert_eq!(manager.fs.file_count(), 0);
        assert!(manager.registry.is_empty());
    }

    #[test]
    fn consume_file_removes_and_unregisters_on_success() {
        let mut manager =
            TempFileManager::with_filesystem("/scratch", StubFs::rooted_at("/scratch"))
                .expect("manager");

        let value = manager.consume_file(|_| 42).expect("consume");

        assert_eq!(value, 42);
        assert_eq!(manager.fs.file_count(), 0);
        assert!(manager.registry.is_empty());
    }

    #[test]
    fn clean_up_unregisters_even_when_removal_fails() {
        let fs = StubFs {
            fail_remove: true,
            ..StubFs::rooted_at("/scratch")
        };
        let mut manager = TempFileManager::with_filesystem("/scratch", fs).expect("manager");
        manager.create_file().expect("create");

        manager.clean_up();

        assert!(manager.registry.is_empty());
    }
}

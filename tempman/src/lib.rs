//! Temp-file lifecycle management.
//!
//! [`TempFileManager`] creates uniquely-named empty temp files inside one
//! pre-existing directory, remembers which ones are still outstanding, and
//! guarantees their removal:
//!
//! - **`create_file`** / **`create_file_with_extension`**: create and track a
//!   file; remove everything still tracked later with **`clean_up`**.
//! - **`consume_file`** / **`consume_file_with_extension`**: scoped use --
//!   the file is handed to a closure and removed on every exit path,
//!   panics included.
//!
//! The manager deals in pathnames and existence only, never file contents,
//! and never touches files it did not create.
//!
//! ```
//! use tempman::TempFileManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let scratch = tempfile::tempdir()?;
//! let mut manager = TempFileManager::new(scratch.path())?;
//!
//! let pathname = manager.create_file_with_extension("log")?;
//! assert!(pathname.is_file());
//!
//! manager.clean_up();
//! assert!(!pathname.exists());
//! # Ok(())
//! # }
//! ```

mod error;
mod fs;
mod manager;

pub use error::{ConfigurationError, TempFileCreationError};
pub use fs::{FileSystem, OsFileSystem};
pub use manager::TempFileManager;

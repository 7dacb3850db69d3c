//! Scoped consumption: the file is gone the moment the closure returns.

use std::path::PathBuf;

use tempman::TempFileManager;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempfile::tempdir()?;
    let mut manager = TempFileManager::new(scratch.path())?;

    let mut seen = PathBuf::new();
    manager.consume_file(|pathname| {
        seen = pathname.to_path_buf();
        println!("inside closure: {} (exists: {})", pathname.display(), pathname.is_file());
    })?;
    println!("after consume_file, exists: {}", seen.exists());

    manager.consume_file_with_extension("jpg", |pathname| {
        seen = pathname.to_path_buf();
        println!("inside closure: {} (exists: {})", pathname.display(), pathname.is_file());
    })?;
    println!("after consume_file, exists: {}", seen.exists());

    Ok(())
}

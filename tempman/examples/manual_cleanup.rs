//! Create temp files by hand, then remove everything in one call.

use tempman::TempFileManager;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempfile::tempdir()?;
    let mut manager = TempFileManager::new(scratch.path())?;

    let plain = manager.create_file()?;
    println!("created {} (exists: {})", plain.display(), plain.is_file());

    let image = manager.create_file_with_extension("jpg")?;
    println!("created {} (exists: {})", image.display(), image.is_file());

    manager.clean_up();

    println!("after clean_up, {} exists: {}", plain.display(), plain.exists());
    println!("after clean_up, {} exists: {}", image.display(), image.exists());

    Ok(())
}

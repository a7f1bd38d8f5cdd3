//! Atomic file writes via a temp file in the target's directory

use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn staged(path: &Path, data: &[u8]) -> io::Result<NamedTempFile> {
    let mut tmp = NamedTempFile::new_in(parent_dir(path))?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

/// Replace `path` with `data`
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    staged(path, data)?.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create `path` with `data`, failing with `AlreadyExists` if it is present
pub fn create_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    staged(path, data)?
        .persist_noclobber(path)
        .map_err(|e| e.error)?;
    Ok(())
}

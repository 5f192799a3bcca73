//! Atomic file replacement
//!
//! Content is written to a temporary file in a staging directory on the same
//! filesystem, flushed to disk, then renamed over the destination. Readers
//! observe either the old file or the complete new one.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Result, storage};

/// Write `dest` atomically, staging the temporary file in `staging_dir`.
///
/// If `write` fails, the temporary file is removed and `dest` is untouched.
pub fn write_atomic<F>(dest: &Path, staging_dir: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let display = dest.display().to_string();
    fs::create_dir_all(staging_dir).map_err(|e| storage::write_failed(&display, e.to_string()))?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| storage::write_failed(&display, e.to_string()))?;
    }

    let mut tmp = NamedTempFile::new_in(staging_dir)
        .map_err(|e| storage::write_failed(&display, e.to_string()))?;
    write(tmp.as_file_mut()).map_err(|e| storage::write_failed(&display, e.to_string()))?;
    tmp.as_file_mut()
        .flush()
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| storage::write_failed(&display, e.to_string()))?;

    tmp.persist(dest)
        .map_err(|e| storage::write_failed(&display, e.error.to_string()))?;
    Ok(())
}

/// Write `bytes` to `dest` atomically, staging next to the destination
pub fn write_bytes_atomic(dest: &Path, bytes: &[u8]) -> Result<()> {
    let staging = dest.parent().unwrap_or_else(|| Path::new("."));
    write_atomic(dest, staging, |w| w.write_all(bytes))
}

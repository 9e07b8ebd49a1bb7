//! Atomic file writes for slotline state.
//!
//! The whole slot store is serialized and written in one operation, so a
//! crash mid-mutation must never leave `slots.json` half-written. Writes
//! follow the temp-file pattern:
//!
//! 1. Write content to a temporary file in the same directory
//! 2. Sync the file to disk (fsync)
//! 3. Rename over the target file
//!
//! On POSIX the rename is atomic when source and destination share a
//! filesystem; the temp file is created next to the target to guarantee
//! that. On crash a stray `.{filename}.tmp` may remain and is overwritten by
//! the next write.

use crate::error::{Result, SlotlineError};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically write bytes to a file.
///
/// Parent directories are created as needed. The target file is either left
/// untouched (on failure) or fully replaced (on success), never partial.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            SlotlineError::StorageError(format!(
                "failed to create parent directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = temp_path_for(path)?;
    write_and_sync(&temp_path, content)?;
    replace_file(&temp_path, path)?;

    Ok(())
}

/// Atomically write a string to a file.
///
/// Convenience wrapper around [`atomic_write`] for string content.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Temporary file path in the same directory as the target.
fn temp_path_for(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SlotlineError::StorageError("invalid file path".to_string()))?;
    Ok(parent.join(format!(".{}.tmp", filename)))
}

/// Write content to a file and fsync it.
fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        SlotlineError::StorageError(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    file.write_all(content).map_err(|e| {
        let _ = fs::remove_file(path);
        SlotlineError::StorageError(format!("failed to write to temporary file: {}", e))
    })?;

    file.sync_all().map_err(|e| {
        let _ = fs::remove_file(path);
        SlotlineError::StorageError(format!("failed to sync temporary file to disk: {}", e))
    })?;

    Ok(())
}

/// Rename the temp file over the target.
fn replace_file(source: &Path, target: &Path) -> Result<()> {
    #[cfg(windows)]
    if target.exists() {
        // Windows rename refuses to replace an existing file; remove first.
        // This narrows atomicity on that platform to the rename itself.
        fs::remove_file(target).map_err(|e| {
            let _ = fs::remove_file(source);
            SlotlineError::StorageError(format!(
                "failed to replace '{}': {}",
                target.display(),
                e
            ))
        })?;
    }

    fs::rename(source, target).map_err(|e| {
        let _ = fs::remove_file(source);
        SlotlineError::StorageError(format!(
            "failed to atomically replace '{}': {}",
            target.display(),
            e
        ))
    })?;

    // Sync the parent directory so the rename itself is durable.
    if let Some(parent) = target.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

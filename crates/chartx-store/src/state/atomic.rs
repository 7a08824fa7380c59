//! Atomic write primitives
//!
//! Uses temp→fsync→rename so a reader sees the old file or the new one,
//! never a partial write.

#![allow(clippy::result_large_err)]

use crate::errors::{io_error, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Atomically write bytes to a file
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error("create_state_dir", e))?;
    }

    let temp_path = target_path.with_extension("tmp");

    let mut file = File::create(&temp_path).map_err(|e| io_error("write_state_temp", e))?;
    file.write_all(content)
        .map_err(|e| io_error("write_state_temp", e))?;
    file.sync_all().map_err(|e| io_error("sync_state_temp", e))?;
    drop(file);

    fs::rename(&temp_path, target_path).map_err(|e| io_error("rename_state_temp", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("ops").join("a.json");

        atomic_write(&target, b"{}").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"{}");
    }

    #[test]
    fn test_overwrite_leaves_no_tmp_files() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("a.json");

        atomic_write(&target, b"first").unwrap();
        atomic_write(&target, b"second").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"second");
        let tmp_count = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .count();
        assert_eq!(tmp_count, 0);
    }
}

//! File-per-operation state store
//!
//! Layout: `<root>/<operation_id>.json`, one pretty-printed
//! [`OperationState`] per file.

#![allow(clippy::result_large_err)]

use crate::errors::{io_error, state_format_error, Result};
use crate::state::atomic::atomic_write;
use crate::state::StateStore;
use chartx_core::model::OperationState;
use chartx_core_types::OperationId;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Filesystem-backed operation state store
#[derive(Debug, Clone)]
pub struct FsStateStore {
    root: PathBuf,
}

impl FsStateStore {
    /// Create a store rooted at `root`; the directory is created on first save
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding one operation's state
    pub fn path_for(&self, operation_id: OperationId) -> PathBuf {
        self.root.join(format!("{}.json", operation_id))
    }
}

impl StateStore for FsStateStore {
    fn save(&self, state: &OperationState) -> Result<()> {
        let path = self.path_for(state.operation_id);
        let bytes = serde_json::to_vec_pretty(state).map_err(|e| state_format_error(&path, e))?;
        atomic_write(&path, &bytes)?;

        tracing::debug!(
            operation_id = %state.operation_id,
            failed = state.is_failed(),
            "Saved operation state"
        );
        Ok(())
    }

    fn load(&self, operation_id: OperationId) -> Result<Option<OperationState>> {
        let path = self.path_for(operation_id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error("read_state", e)),
        };
        let state = serde_json::from_slice(&bytes).map_err(|e| state_format_error(&path, e))?;
        Ok(Some(state))
    }

    fn delete(&self, operation_id: OperationId) -> Result<()> {
        match fs::remove_file(self.path_for(operation_id)) {
            Ok(()) => {
                tracing::debug!(operation_id = %operation_id, "Deleted operation state");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("delete_state", e)),
        }
    }

    fn list(&self) -> Result<Vec<OperationId>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("list_state", e)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| io_error("list_state", e))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match stem.parse::<OperationId>() {
                Ok(id) => ids.push(id),
                Err(_) => tracing::warn!(path = %path.display(), "Ignoring stray file in state directory"),
            }
        }
        ids.sort();
        Ok(ids)
    }
}

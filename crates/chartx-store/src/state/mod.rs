//! Operation State Store
//!
//! Snapshots are saved before a reconcile call mutates anything, deleted on
//! commit, and left behind (with the error attached) when the call fails.

#![allow(clippy::result_large_err)]

mod atomic;
mod fs_store;

use crate::errors::Result;
use chartx_core::model::OperationState;
use chartx_core_types::OperationId;

pub use fs_store::FsStateStore;

/// Durable keyed storage for operation snapshots
pub trait StateStore: Send + Sync {
    /// Write or overwrite the snapshot for `state.operation_id`
    fn save(&self, state: &OperationState) -> Result<()>;

    /// `None` when no snapshot exists
    fn load(&self, operation_id: OperationId) -> Result<Option<OperationState>>;

    /// Deleting a missing snapshot succeeds
    fn delete(&self, operation_id: OperationId) -> Result<()>;

    /// Ids of retained snapshots, sorted
    fn list(&self) -> Result<Vec<OperationId>>;
}

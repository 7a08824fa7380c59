//! ChartX Store - SQLite persistence for patient records
//!
//! Provides:
//! - Connection setup and immediate write transactions
//! - Checksummed migrations for the patient schema
//! - Identity resolution, document writes, and read-back verification
//! - Pre-image and patient summary reads
//! - File-per-operation state snapshots

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;
pub mod sqlvalue;
pub mod state;

// Re-export key types
pub use errors::Result;
pub use repo::AppliedWrite;
pub use state::{FsStateStore, StateStore};

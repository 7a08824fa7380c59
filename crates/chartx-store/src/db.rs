//! Database connection management
//!
//! Provides utilities for opening and managing SQLite connections

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, io_error, Result};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

/// Default wait for a competing writer's lock
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Open a SQLite database at the given path, creating its directory
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| io_error("create_db_dir", e))?;
        }
    }
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Configure a connection for patient writes
pub fn configure(conn: &Connection, busy_timeout_ms: u64) -> Result<()> {
    // Dependent rows cascade with their patient
    conn.execute_batch("PRAGMA foreign_keys = ON")
        .map_err(from_rusqlite)?;

    // journal_mode returns a row, so it cannot go through execute
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
        .map_err(from_rusqlite)?;

    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))
        .map_err(from_rusqlite)?;

    Ok(())
}

/// Begin a write transaction that takes the write lock immediately
///
/// Two callers reconciling the same email serialize here, so identity
/// resolution and the writes that depend on it see one consistent state.
pub fn begin_immediate(conn: &mut Connection) -> Result<Transaction<'_>> {
    conn.transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(from_rusqlite)
}

/// Current wall-clock time as unix milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

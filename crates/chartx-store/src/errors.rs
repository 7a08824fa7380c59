//! Error handling for chartx-store
//!
//! Wraps chartx-core CxError with store-specific helpers

use chartx_core::errors::{CxError, CxErrorKind};

/// Result type alias using CxError
pub type Result<T> = std::result::Result<T, CxError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> CxError {
    CxError::new(CxErrorKind::Database)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error for an already-applied migration
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> CxError {
    CxError::new(CxErrorKind::Database)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> CxError {
    CxError::new(CxErrorKind::Database)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create a database error scoped to one table
pub fn table_error(table: &str, err: rusqlite::Error) -> CxError {
    from_rusqlite(err).with_table(table)
}

/// Create a verification error
pub fn verification_failed(table: &str, detail: impl Into<String>) -> CxError {
    CxError::new(CxErrorKind::Verification)
        .with_op("verify")
        .with_table(table)
        .with_message(detail)
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> CxError {
    CxError::new(CxErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a serialization error for a state file
pub fn state_format_error(path: &std::path::Path, err: serde_json::Error) -> CxError {
    CxError::new(CxErrorKind::Serialization)
        .with_op("state_decode")
        .with_message(format!("{}: {}", path.display(), err))
}

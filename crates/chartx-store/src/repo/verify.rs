//! Verifier
//!
//! Reads back every write of the current transaction. Read-only.

#![allow(clippy::result_large_err)]

use crate::errors::{table_error, verification_failed, Result};
use crate::repo::upsert::AppliedWrite;
use crate::sqlvalue::quote_ident;
use chartx_core::model::TableName;
use rusqlite::{Connection, OptionalExtension};

/// Verify all writes; stops at the first one that cannot be observed
///
/// # Errors
/// Returns a verification error naming the table, or a database error if a
/// check query itself fails.
pub fn verify(conn: &Connection, writes: &[AppliedWrite]) -> Result<()> {
    for write in writes {
        verify_one(conn, write)?;
    }
    tracing::debug!(checked = writes.len(), "Verified writes");
    Ok(())
}

/// Verify a single write
///
/// # Errors
/// Returns a verification error if the write is not visible as recorded.
pub fn verify_one(conn: &Connection, write: &AppliedWrite) -> Result<()> {
    match write {
        AppliedWrite::PatientInserted { patient_id, stamp }
        | AppliedWrite::PatientUpdated { patient_id, stamp } => {
            verify_patient_stamp(conn, *patient_id, *stamp)
        }
        AppliedWrite::RowInserted { table, id } => verify_row(conn, *table, *id),
        AppliedWrite::SetReplaced {
            table,
            patient_id,
            count,
        } => verify_count(conn, *table, *patient_id, *count),
    }
}

fn verify_patient_stamp(conn: &Connection, patient_id: i64, stamp: i64) -> Result<()> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM \"patients\" WHERE \"patient_id\" = ?1 AND \"last_updated\" = ?2",
            [patient_id, stamp],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| table_error("patients", e).with_op("verify"))?;

    match found {
        Some(_) => Ok(()),
        None => Err(verification_failed(
            "patients",
            format!("patient {} does not carry stamp {}", patient_id, stamp),
        )
        .with_patient_id(patient_id)),
    }
}

fn verify_row(conn: &Connection, table: TableName, id: i64) -> Result<()> {
    let sql = format!(
        "SELECT 1 FROM {} WHERE {} = ?1",
        quote_ident(table.as_str()),
        quote_ident(table.primary_key())
    );
    let found: Option<i64> = conn
        .query_row(&sql, [id], |row| row.get(0))
        .optional()
        .map_err(|e| table_error(table.as_str(), e).with_op("verify"))?;

    match found {
        Some(_) => Ok(()),
        None => Err(verification_failed(
            table.as_str(),
            format!("inserted row {} = {} not found", table.primary_key(), id),
        )),
    }
}

fn verify_count(conn: &Connection, table: TableName, patient_id: i64, expected: usize) -> Result<()> {
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE \"patient_id\" = ?1",
        quote_ident(table.as_str())
    );
    let actual: i64 = conn
        .query_row(&sql, [patient_id], |row| row.get(0))
        .map_err(|e| table_error(table.as_str(), e).with_op("verify"))?;

    if actual > 0 && usize::try_from(actual).ok() == Some(expected) {
        Ok(())
    } else {
        Err(verification_failed(
            table.as_str(),
            format!("expected {} rows, found {}", expected, actual),
        )
        .with_patient_id(patient_id))
    }
}

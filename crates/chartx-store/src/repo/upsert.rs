//! Upsert Executor
//!
//! Writes one Table Operation Document inside the caller's transaction. Every
//! write reports an [`AppliedWrite`] describing what the verifier must find.

#![allow(clippy::result_large_err)]

use crate::errors::{table_error, Result};
use crate::sqlvalue::{quote_ident, to_sql};
use chartx_core::model::{
    ColumnMap, OperationPayload, OperationRecord, PatientIdentity, TableName,
    TableOperationDocument,
};
use chartx_core::rules::validation::{without_nulls, ENGINE_OWNED_COLUMNS};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Transaction};

/// A write that succeeded inside the current transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppliedWrite {
    /// New patient row, stamped with `stamp`
    PatientInserted { patient_id: i64, stamp: i64 },
    /// Existing patient row; the row must now carry `stamp`
    PatientUpdated { patient_id: i64, stamp: i64 },
    /// One dependent row appended
    RowInserted { table: TableName, id: i64 },
    /// Dependent set replaced by `count` rows
    SetReplaced {
        table: TableName,
        patient_id: i64,
        count: usize,
    },
}

impl AppliedWrite {
    pub fn table(&self) -> TableName {
        match self {
            AppliedWrite::PatientInserted { .. } | AppliedWrite::PatientUpdated { .. } => {
                TableName::Patients
            }
            AppliedWrite::RowInserted { table, .. } | AppliedWrite::SetReplaced { table, .. } => {
                *table
            }
        }
    }

    /// Result-entry form
    pub fn record(&self) -> OperationRecord {
        match self {
            AppliedWrite::PatientInserted { patient_id, .. } => OperationRecord::Single {
                table: TableName::Patients,
                id: *patient_id,
            },
            AppliedWrite::PatientUpdated { patient_id, .. } => OperationRecord::Update {
                table: TableName::Patients,
                id: *patient_id,
            },
            AppliedWrite::RowInserted { table, id } => OperationRecord::Single {
                table: *table,
                id: *id,
            },
            AppliedWrite::SetReplaced { table, count, .. } => OperationRecord::Multiple {
                table: *table,
                count: *count,
            },
        }
    }
}

/// Stamp for the next write to a row last stamped `previous`
///
/// Never equal to `previous`, even when the clock has not moved on.
pub fn next_stamp(previous: i64, now_ms: i64) -> i64 {
    now_ms.max(previous.saturating_add(1))
}

/// Apply a document, collecting results
///
/// # Errors
/// Returns a database error for the first statement that fails.
pub fn apply(
    tx: &Transaction<'_>,
    doc: &TableOperationDocument,
    identity: Option<&PatientIdentity>,
    now_ms: i64,
) -> Result<Vec<AppliedWrite>> {
    let mut writes = Vec::new();
    apply_into(tx, doc, identity, now_ms, &mut writes)?;
    Ok(writes)
}

/// Apply a document, appending each successful write to `writes`
///
/// On error `writes` holds everything that succeeded before the failure.
/// Returns the patient id the dependents were written under.
///
/// # Errors
/// Returns a database error for the first statement that fails.
pub fn apply_into(
    tx: &Transaction<'_>,
    doc: &TableOperationDocument,
    identity: Option<&PatientIdentity>,
    now_ms: i64,
    writes: &mut Vec<AppliedWrite>,
) -> Result<i64> {
    let (patient_id, parent) = match identity {
        None => {
            let patient_id = insert_patient_row(tx, doc.patient_columns(), now_ms)?;
            let write = AppliedWrite::PatientInserted {
                patient_id,
                stamp: now_ms,
            };
            (patient_id, write)
        }
        Some(identity) => {
            let write = update_patient(
                tx,
                identity.patient_id,
                doc.patient_columns(),
                next_stamp(identity.stamp(), now_ms),
            )?;
            (identity.patient_id, write)
        }
    };
    writes.push(parent);

    for op in doc.dependents() {
        let write = match &op.payload {
            OperationPayload::Records(records) if records.is_empty() => {
                tracing::debug!(table = %op.table, "Empty records, leaving set unchanged");
                continue;
            }
            OperationPayload::Records(records) => {
                replace_set(tx, op.table, patient_id, records)?
            }
            OperationPayload::Columns(columns) => insert_row(tx, op.table, patient_id, columns)?,
        };
        writes.push(write);
    }

    Ok(patient_id)
}

fn insert_patient_row(tx: &Transaction<'_>, columns: &ColumnMap, stamp: i64) -> Result<i64> {
    let mut columns = writable(columns);
    columns.insert("last_updated".to_string(), stamp.into());
    let patient_id = insert(tx, TableName::Patients, &columns)?;

    tracing::debug!(patient_id, "Inserted patient");
    Ok(patient_id)
}

/// Update an existing patient row; `last_updated` is always set to `stamp`
///
/// Null values and engine-owned keys are skipped. A missing row is not an
/// error here; the verifier reports it.
///
/// # Errors
/// Returns a database error if the update fails.
pub fn update_patient(
    tx: &Transaction<'_>,
    patient_id: i64,
    columns: &ColumnMap,
    stamp: i64,
) -> Result<AppliedWrite> {
    let mut columns = writable(columns);
    columns.remove("email");

    let mut assignments: Vec<String> = columns
        .keys()
        .map(|column| format!("{} = ?", quote_ident(column)))
        .collect();
    assignments.push("\"last_updated\" = ?".to_string());

    let sql = format!(
        "UPDATE \"patients\" SET {} WHERE \"patient_id\" = ?",
        assignments.join(", ")
    );
    let params: Vec<SqlValue> = columns
        .values()
        .map(to_sql)
        .chain([SqlValue::Integer(stamp), SqlValue::Integer(patient_id)])
        .collect();

    let changed = tx
        .execute(&sql, params_from_iter(params))
        .map_err(|e| write_error(TableName::Patients, patient_id, e))?;

    tracing::debug!(patient_id, changed, "Updated patient");
    Ok(AppliedWrite::PatientUpdated { patient_id, stamp })
}

/// Append one dependent row
fn insert_row(
    tx: &Transaction<'_>,
    table: TableName,
    patient_id: i64,
    columns: &ColumnMap,
) -> Result<AppliedWrite> {
    let mut columns = writable(columns);
    columns.insert("patient_id".to_string(), patient_id.into());
    let id = insert(tx, table, &columns)?;

    tracing::debug!(table = %table, id, "Inserted row");
    Ok(AppliedWrite::RowInserted { table, id })
}

/// Delete the patient's set, then insert every record through one statement
fn replace_set(
    tx: &Transaction<'_>,
    table: TableName,
    patient_id: i64,
    records: &[ColumnMap],
) -> Result<AppliedWrite> {
    let deleted = tx
        .execute(
            &format!(
                "DELETE FROM {} WHERE \"patient_id\" = ?1",
                quote_ident(table.as_str())
            ),
            [patient_id],
        )
        .map_err(|e| write_error(table, patient_id, e))?;

    let Some(first) = records.first() else {
        return Ok(AppliedWrite::SetReplaced {
            table,
            patient_id,
            count: 0,
        });
    };
    let columns: Vec<&String> = first
        .keys()
        .filter(|k| !ENGINE_OWNED_COLUMNS.contains(&k.as_str()))
        .collect();
    let column_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .chain(std::iter::once(quote_ident("patient_id")))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; columns.len() + 1].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table.as_str()),
        column_list,
        placeholders
    );

    let mut stmt = tx
        .prepare_cached(&sql)
        .map_err(|e| write_error(table, patient_id, e))?;
    for record in records {
        let params = columns
            .iter()
            .map(|c| record.get(c.as_str()).map_or(SqlValue::Null, to_sql))
            .chain(std::iter::once(SqlValue::Integer(patient_id)));
        stmt.execute(params_from_iter(params))
            .map_err(|e| write_error(table, patient_id, e))?;
    }

    tracing::debug!(table = %table, deleted, inserted = records.len(), "Replaced set");
    Ok(AppliedWrite::SetReplaced {
        table,
        patient_id,
        count: records.len(),
    })
}

fn insert(tx: &Transaction<'_>, table: TableName, columns: &ColumnMap) -> Result<i64> {
    let column_list = columns
        .keys()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table.as_str()),
        column_list,
        placeholders
    );

    tx.execute(&sql, params_from_iter(columns.values().map(to_sql)))
        .map_err(|e| table_error(table.as_str(), e).with_op("apply_writes"))?;
    Ok(tx.last_insert_rowid())
}

/// Non-null columns minus engine-owned keys
fn writable(columns: &ColumnMap) -> ColumnMap {
    let mut columns = without_nulls(columns);
    for key in ENGINE_OWNED_COLUMNS {
        columns.remove(key);
    }
    columns
}

fn write_error(table: TableName, patient_id: i64, err: rusqlite::Error) -> chartx_core::CxError {
    table_error(table.as_str(), err)
        .with_op("apply_writes")
        .with_patient_id(patient_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_stamp_strictly_increases() {
        assert_eq!(next_stamp(100, 500), 500);
        assert_eq!(next_stamp(500, 500), 501);
        assert_eq!(next_stamp(900, 500), 901);
    }

    #[test]
    fn test_applied_write_records() {
        let w = AppliedWrite::SetReplaced {
            table: TableName::Symptoms,
            patient_id: 1,
            count: 3,
        };
        assert_eq!(
            w.record(),
            OperationRecord::Multiple {
                table: TableName::Symptoms,
                count: 3
            }
        );
        assert_eq!(
            AppliedWrite::PatientUpdated {
                patient_id: 4,
                stamp: 1
            }
            .record(),
            OperationRecord::Update {
                table: TableName::Patients,
                id: 4
            }
        );
    }
}
